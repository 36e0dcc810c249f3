use serde::Deserialize;

use crate::model::AnswerOption;

const CHECK_MARK: char = '✓';
const CHECK_MARK_PAREN: &str = "(✓)";

/// Answer options decoded from a question's raw answer field.
///
/// The field carries no version marker, so the variant records which of the
/// two known encodings was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnswers {
    /// JSON array of `{ "text": .., "isCorrect": .. }`.
    Json(Vec<AnswerOption>),
    /// Newline-delimited, numbered lines with a `(✓)` suffix on correct ones.
    Legacy(Vec<AnswerOption>),
}

impl ParsedAnswers {
    pub fn options(&self) -> &[AnswerOption] {
        match self {
            ParsedAnswers::Json(opts) | ParsedAnswers::Legacy(opts) => opts,
        }
    }

    pub fn into_options(self) -> Vec<AnswerOption> {
        match self {
            ParsedAnswers::Json(opts) | ParsedAnswers::Legacy(opts) => opts,
        }
    }
}

#[derive(Deserialize)]
struct CardAnswer {
    text: String,
    #[serde(rename = "isCorrect", default)]
    is_correct: bool,
}

/// Decode a raw answer field: JSON first, line-based on any JSON failure.
pub fn parse_answer_options(raw: &str) -> ParsedAnswers {
    match serde_json::from_str::<Vec<CardAnswer>>(raw) {
        Ok(answers) => ParsedAnswers::Json(
            answers
                .into_iter()
                .enumerate()
                .map(|(i, a)| {
                    let marker = if a.is_correct { CHECK_MARK_PAREN } else { "" };
                    AnswerOption {
                        text: strip_check_marks(&format!("{}. {} {}", i + 1, a.text, marker)),
                        is_correct: a.is_correct,
                    }
                })
                .collect(),
        ),
        Err(e) => {
            tracing::debug!("answer field is not JSON ({}), using line format", e);
            ParsedAnswers::Legacy(parse_legacy_lines(raw))
        }
    }
}

fn parse_legacy_lines(raw: &str) -> Vec<AnswerOption> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| AnswerOption {
            text: strip_check_marks(line),
            is_correct: line.contains(CHECK_MARK),
        })
        .collect()
}

/// Remove the correctness markers from a display line.
pub fn strip_check_marks(line: &str) -> String {
    line.replacen(CHECK_MARK_PAREN, "", 1)
        .replacen(CHECK_MARK, "", 1)
        .trim()
        .to_string()
}
