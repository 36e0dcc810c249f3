use std::collections::HashMap;

use crate::model::{Question, QuestionId};

/// Per-option confidence mark, cycled by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Unknown,
    No,
    Yes,
}

impl Mark {
    /// unknown → no → yes → unknown
    pub fn next(self) -> Mark {
        match self {
            Mark::Unknown => Mark::No,
            Mark::No => Mark::Yes,
            Mark::Yes => Mark::Unknown,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Mark::Unknown => "❓",
            Mark::No => "❌",
            Mark::Yes => "✅",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::Unknown => "unknown",
            Mark::No => "no",
            Mark::Yes => "yes",
        }
    }
}

/// Tri-state marks keyed by (question id, option text).
#[derive(Debug, Clone, Default)]
pub struct AnswerTracker {
    marks: HashMap<(QuestionId, String), Mark>,
}

impl AnswerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every mark and set all options of `questions` to unknown.
    pub fn reset(&mut self, questions: &[Question]) {
        self.marks.clear();
        for q in questions {
            for opt in &q.options {
                self.marks.insert((q.id, opt.text.clone()), Mark::Unknown);
            }
        }
    }

    pub fn mark(&self, question_id: QuestionId, answer_text: &str) -> Mark {
        // Borrowed lookup would need a custom key type; option texts are short.
        self.marks
            .get(&(question_id, answer_text.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Advance the mark one step and return the new value.
    pub fn toggle(&mut self, question_id: QuestionId, answer_text: &str) -> Mark {
        let entry = self
            .marks
            .entry((question_id, answer_text.to_string()))
            .or_default();
        *entry = entry.next();
        *entry
    }

    /// At least one option of the question is not unknown.
    pub fn is_question_touched(&self, question: &Question) -> bool {
        question
            .options
            .iter()
            .any(|opt| self.mark(question.id, &opt.text) != Mark::Unknown)
    }

    pub fn all_questions_touched(&self, questions: &[Question]) -> bool {
        questions.iter().all(|q| self.is_question_touched(q))
    }

    pub fn untouched_count(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| !self.is_question_touched(q))
            .count()
    }

    /// Option texts of `question` currently marked yes, in option order.
    pub fn yes_answers(&self, question: &Question) -> Vec<String> {
        question
            .options
            .iter()
            .filter(|opt| self.mark(question.id, &opt.text) == Mark::Yes)
            .map(|opt| opt.text.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn question(id: QuestionId, options: &[&str]) -> Question {
        Question {
            id,
            title: format!("Q{}", id),
            prompt: String::new(),
            category: "General".into(),
            difficulty: 3,
            options: options
                .iter()
                .map(|t| AnswerOption {
                    text: t.to_string(),
                    is_correct: false,
                })
                .collect(),
            legacy_format: false,
        }
    }

    #[test]
    fn toggle_cycles_through_three_states() {
        let mut tracker = AnswerTracker::new();
        assert_eq!(tracker.toggle(1, "a"), Mark::No);
        assert_eq!(tracker.toggle(1, "a"), Mark::Yes);
        assert_eq!(tracker.toggle(1, "a"), Mark::Unknown);
        assert_eq!(tracker.mark(1, "a"), Mark::Unknown);
    }

    #[test]
    fn marks_are_independent_per_question() {
        let mut tracker = AnswerTracker::new();
        tracker.toggle(1, "same text");
        assert_eq!(tracker.mark(1, "same text"), Mark::No);
        assert_eq!(tracker.mark(2, "same text"), Mark::Unknown);
    }

    #[test]
    fn touched_means_any_option_marked() {
        let qs = vec![question(1, &["a", "b"]), question(2, &["c"])];
        let mut tracker = AnswerTracker::new();
        tracker.reset(&qs);
        assert!(!tracker.all_questions_touched(&qs));
        assert_eq!(tracker.untouched_count(&qs), 2);

        tracker.toggle(1, "b");
        assert!(tracker.is_question_touched(&qs[0]));
        assert!(!tracker.all_questions_touched(&qs));

        tracker.toggle(2, "c");
        assert!(tracker.all_questions_touched(&qs));

        // back to unknown: untouched again
        tracker.toggle(2, "c");
        tracker.toggle(2, "c");
        assert!(!tracker.is_question_touched(&qs[1]));
    }

    #[test]
    fn reset_clears_previous_marks() {
        let qs = vec![question(1, &["a"])];
        let mut tracker = AnswerTracker::new();
        tracker.toggle(1, "a");
        tracker.toggle(1, "a");
        tracker.reset(&qs);
        assert_eq!(tracker.mark(1, "a"), Mark::Unknown);
    }

    #[test]
    fn yes_answers_keep_option_order() {
        let qs = vec![question(1, &["a", "b", "c"])];
        let mut tracker = AnswerTracker::new();
        tracker.reset(&qs);
        for text in ["c", "a"] {
            tracker.toggle(1, text);
            tracker.toggle(1, text);
        }
        tracker.toggle(1, "b");
        assert_eq!(tracker.yes_answers(&qs[0]), vec!["a", "c"]);
    }

    #[test]
    fn question_without_options_is_never_touched() {
        let qs = vec![question(5, &[])];
        let tracker = AnswerTracker::new();
        assert!(!tracker.all_questions_touched(&qs));
    }
}
