use std::collections::BTreeMap;

use serde::Serialize;

use crate::marks::AnswerTracker;
use crate::model::{Question, QuestionId};

/// Grading payload: question id (as a string key) to the answer texts
/// marked yes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Submission {
    answers: BTreeMap<String, Vec<String>>,
}

impl Submission {
    pub fn answers_for(&self, question_id: QuestionId) -> Option<&[String]> {
        self.answers
            .get(&question_id.to_string())
            .map(|v| v.as_slice())
    }

    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    pub fn yes_count(&self) -> usize {
        self.answers.values().map(Vec::len).sum()
    }

    pub fn empty_count(&self) -> usize {
        self.answers.values().filter(|v| v.is_empty()).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} questions, {} answers marked yes, {} submitted empty",
            self.question_count(),
            self.yes_count(),
            self.empty_count()
        )
    }
}

/// Every question gets an entry, even when nothing was marked yes.
pub fn build_submission(questions: &[Question], tracker: &AnswerTracker) -> Submission {
    let answers = questions
        .iter()
        .map(|q| (q.id.to_string(), tracker.yes_answers(q)))
        .collect();
    Submission { answers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn question(id: QuestionId, options: &[&str]) -> Question {
        Question {
            id,
            title: "Question".into(),
            prompt: String::new(),
            category: "General".into(),
            difficulty: 1,
            options: options
                .iter()
                .map(|t| AnswerOption {
                    text: t.to_string(),
                    is_correct: false,
                })
                .collect(),
            legacy_format: true,
        }
    }

    #[test]
    fn only_yes_marks_are_sent() {
        let qs = vec![question(1, &["a", "b", "c"]), question(2, &["d"])];
        let mut tracker = AnswerTracker::new();
        tracker.reset(&qs);
        tracker.toggle(1, "a"); // no
        tracker.toggle(1, "b");
        tracker.toggle(1, "b"); // yes
        tracker.toggle(2, "d"); // no

        let sub = build_submission(&qs, &tracker);
        assert_eq!(sub.answers_for(1), Some(&["b".to_string()][..]));
        assert_eq!(sub.answers_for(2), Some(&Vec::<String>::new()[..]));
        assert_eq!(sub.answers_for(3), None);
        assert_eq!(
            sub.summary(),
            "2 questions, 1 answers marked yes, 1 submitted empty"
        );
    }

    #[test]
    fn serializes_as_flat_map() {
        let qs = vec![question(7, &["1. Yes"]), question(12, &["x"])];
        let mut tracker = AnswerTracker::new();
        tracker.reset(&qs);
        tracker.toggle(7, "1. Yes");
        tracker.toggle(7, "1. Yes");

        let json = serde_json::to_value(build_submission(&qs, &tracker)).unwrap();
        assert_eq!(json, serde_json::json!({ "7": ["1. Yes"], "12": [] }));
    }
}
