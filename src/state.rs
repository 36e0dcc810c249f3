use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::marks::Mark;
use crate::model::*;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    List,
    Working,
    Busy,
    Result,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmStart,
    ConfirmResume,
    ConfirmPause,
    ConfirmSubmit,
    ConfirmQuit,
    Notice { title: String, message: String },
    Help,
}

/// What Enter does on the selected list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Start,
    Resume,
    ViewResult,
    None,
}

impl ListAction {
    pub fn for_state(state: DisplayState) -> ListAction {
        match state {
            DisplayState::Available => ListAction::Start,
            DisplayState::InProgress | DisplayState::Paused => ListAction::Resume,
            DisplayState::Completed => ListAction::ViewResult,
            _ => ListAction::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListAction::Start => "start",
            ListAction::Resume => "continue",
            ListAction::ViewResult => "show result",
            ListAction::None => "",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MarkCounts {
    pub yes: usize,
    pub no: usize,
    pub unknown: usize,
    pub untouched_questions: usize,
}

pub struct AppState {
    pub screen: Screen,
    pub clock: Clock,
    pub assignments: Vec<AssessmentAssignment>,
    pub list_cursor: usize,
    pub session: Option<Session>,
    pub current_question: usize,
    pub option_cursor: usize,
    pub dialog_stack: Vec<Dialog>,
    pub result: Option<AssessmentResult>,
    pub result_title: String,
    pub busy_message: String,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(assignments: Vec<AssessmentAssignment>, clock: Clock) -> Self {
        Self {
            screen: Screen::List,
            clock,
            assignments,
            list_cursor: 0,
            session: None,
            current_question: 0,
            option_cursor: 0,
            dialog_stack: Vec::new(),
            result: None,
            result_title: String::new(),
            busy_message: String::new(),
            should_quit: false,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match &self.session {
            Some(session) => session.now(),
            None => self.clock.now(),
        }
    }

    pub fn set_assignments(&mut self, assignments: Vec<AssessmentAssignment>) {
        self.assignments = assignments;
        self.list_cursor = self
            .list_cursor
            .min(self.assignments.len().saturating_sub(1));
    }

    pub fn selected_assignment(&self) -> Option<&AssessmentAssignment> {
        self.assignments.get(self.list_cursor)
    }

    pub fn selected_action(&self) -> ListAction {
        self.selected_assignment()
            .map(|a| ListAction::for_state(a.display_state(self.now())))
            .unwrap_or(ListAction::None)
    }

    pub fn stats(&self) -> ListingStats {
        ListingStats::from_assignments(&self.assignments, self.now())
    }

    pub fn move_list_cursor(&mut self, delta: isize) {
        if self.assignments.is_empty() {
            return;
        }
        let last = self.assignments.len() - 1;
        self.list_cursor = self.list_cursor.saturating_add_signed(delta).min(last);
    }

    pub fn questions(&self) -> &[Question] {
        self.session.as_ref().map(|s| s.questions()).unwrap_or(&[])
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.current_question)
    }

    pub fn navigate_to(&mut self, idx: usize) {
        if idx < self.questions().len() {
            self.current_question = idx;
            self.option_cursor = 0;
        }
    }

    pub fn next_question(&mut self) {
        self.navigate_to(self.current_question + 1);
    }

    pub fn prev_question(&mut self) {
        if self.current_question > 0 {
            self.navigate_to(self.current_question - 1);
        }
    }

    pub fn move_option_cursor(&mut self, delta: isize) {
        let count = self.current_question().map(|q| q.options.len()).unwrap_or(0);
        if count == 0 {
            return;
        }
        self.option_cursor = self.option_cursor.saturating_add_signed(delta).min(count - 1);
    }

    /// (question id, option text) under the cursor.
    pub fn selected_option(&self) -> Option<(QuestionId, String)> {
        let q = self.current_question()?;
        let opt = q.options.get(self.option_cursor)?;
        Some((q.id, opt.text.clone()))
    }

    pub fn is_question_touched(&self, question: &Question) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.tracker().is_question_touched(question))
    }

    pub fn mark_counts(&self) -> MarkCounts {
        let mut counts = MarkCounts::default();
        let Some(session) = &self.session else {
            return counts;
        };
        let tracker = session.tracker();
        for q in session.questions() {
            if !tracker.is_question_touched(q) {
                counts.untouched_questions += 1;
            }
            for opt in &q.options {
                match tracker.mark(q.id, &opt.text) {
                    Mark::Yes => counts.yes += 1,
                    Mark::No => counts.no += 1,
                    Mark::Unknown => counts.unknown += 1,
                }
            }
        }
        counts
    }

    /// Enter the working screen for a freshly started or resumed session.
    pub fn enter_session(&mut self, session: Session) {
        self.session = Some(session);
        self.current_question = 0;
        self.option_cursor = 0;
        self.screen = Screen::Working;
    }

    /// Leave the working screen; returns the session's final assignment.
    pub fn leave_session(&mut self) -> Option<AssessmentAssignment> {
        let session = self.session.take()?;
        let assignment = session.assignment().clone();
        if let Some(slot) = self.assignments.iter_mut().find(|a| a.id == assignment.id) {
            *slot = assignment.clone();
        }
        self.current_question = 0;
        self.option_cursor = 0;
        Some(assignment)
    }

    pub fn show_result(&mut self, title: String, result: AssessmentResult) {
        self.result_title = title;
        self.result = Some(result);
        self.screen = Screen::Result;
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }

    pub fn notice(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push_dialog(Dialog::Notice {
            title: title.into(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assignment(id: AssessmentId, status: AssignmentStatus, now: DateTime<Utc>) -> AssessmentAssignment {
        AssessmentAssignment {
            id,
            name: format!("Assessment {}", id),
            exam_id: 1,
            exam_name: "Exam".into(),
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            status,
            duration: 1800,
            question_count: 4,
            actual_start_time: None,
            time_spent_seconds: 0,
        }
    }

    #[test]
    fn list_cursor_is_clamped() {
        let now = Utc::now();
        let mut state = AppState::new(
            vec![
                assignment(1, AssignmentStatus::Assigned, now),
                assignment(2, AssignmentStatus::Paused, now),
            ],
            Clock::Fixed(now),
        );
        state.move_list_cursor(-1);
        assert_eq!(state.list_cursor, 0);
        state.move_list_cursor(5);
        assert_eq!(state.list_cursor, 1);
        assert_eq!(state.selected_action(), ListAction::Resume);

        state.set_assignments(vec![assignment(3, AssignmentStatus::Completed, now)]);
        assert_eq!(state.list_cursor, 0);
        assert_eq!(state.selected_action(), ListAction::ViewResult);
    }

    #[test]
    fn actions_follow_display_state() {
        assert_eq!(ListAction::for_state(DisplayState::Available), ListAction::Start);
        assert_eq!(ListAction::for_state(DisplayState::InProgress), ListAction::Resume);
        assert_eq!(ListAction::for_state(DisplayState::Expired), ListAction::None);
        assert_eq!(ListAction::for_state(DisplayState::Scheduled), ListAction::None);
    }

    #[test]
    fn dialogs_stack() {
        let mut state = AppState::new(Vec::new(), Clock::System);
        assert!(!state.has_dialog());
        state.push_dialog(Dialog::ConfirmSubmit);
        state.notice("Error", "network down");
        assert!(matches!(state.top_dialog(), Some(Dialog::Notice { .. })));
        state.pop_dialog();
        assert_eq!(state.top_dialog(), Some(&Dialog::ConfirmSubmit));
        assert_eq!(state.selected_action(), ListAction::None);
    }
}
