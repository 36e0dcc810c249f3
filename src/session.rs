//! One active assessment attempt.
//!
//! `Session` owns the assignment, its questions, the answer marks and the
//! countdown for as long as the user works on it. The presentation layer
//! reads snapshots and issues commands; nothing else mutates this state.
//! Every command takes `&mut self`, so two submissions can never overlap.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::AssessmentApi;
use crate::clock::Clock;
use crate::error::{ApiError, SessionError};
use crate::marks::{AnswerTracker, Mark};
use crate::model::{
    AssessmentAssignment, AssessmentResult, AssignmentStatus, DisplayState, Question, QuestionId,
};
use crate::reconcile::{reconcile, ReconcileInput, Reconciled};
use crate::submit::{build_submission, Submission};
use crate::timer::{CountdownScheduler, Severity, TimerEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub remaining_seconds: i64,
    pub current_segment_start: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub severity: Severity,
    pub untouched_questions: usize,
}

#[derive(Debug)]
pub enum SessionEvent {
    Tick { remaining: i64, severity: Severity },
    /// The countdown hit zero; carries the outcome of the forced submission.
    Expired(Result<AssessmentResult, SessionError>),
}

#[derive(Debug)]
pub enum PauseOutcome {
    Recorded { segment_secs: i64 },
    /// The service did not confirm; the session is paused locally anyway.
    Unrecorded { segment_secs: i64, error: ApiError },
}

impl PauseOutcome {
    pub fn segment_secs(&self) -> i64 {
        match self {
            PauseOutcome::Recorded { segment_secs } | PauseOutcome::Unrecorded { segment_secs, .. } => {
                *segment_secs
            }
        }
    }
}

pub struct Session {
    api: Arc<dyn AssessmentApi>,
    clock: Clock,
    assignment: AssessmentAssignment,
    questions: Vec<Question>,
    tracker: AnswerTracker,
    scheduler: CountdownScheduler,
    segment_start: Option<DateTime<Utc>>,
    expired: bool,
    result: Option<AssessmentResult>,
}

impl Session {
    pub fn new(
        api: Arc<dyn AssessmentApi>,
        assignment: AssessmentAssignment,
        questions: Vec<Question>,
        clock: Clock,
    ) -> Self {
        let mut tracker = AnswerTracker::new();
        tracker.reset(&questions);
        Self {
            api,
            clock,
            assignment,
            questions,
            tracker,
            scheduler: CountdownScheduler::new(),
            segment_start: None,
            expired: false,
            result: None,
        }
    }

    /// Fetch the questions of `assignment` and build a session around them.
    pub async fn open(
        api: Arc<dyn AssessmentApi>,
        assignment: AssessmentAssignment,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let questions = api.fetch_questions(assignment.id).await?;
        tracing::info!(
            id = assignment.id,
            questions = questions.len(),
            status = %assignment.status,
            "session opened"
        );
        Ok(Self::new(api, assignment, questions, clock))
    }

    pub fn assignment(&self) -> &AssessmentAssignment {
        &self.assignment
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn tracker(&self) -> &AnswerTracker {
        &self.tracker
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn display_state(&self) -> DisplayState {
        self.assignment.display_state(self.clock.now())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The next `tick` will expire the countdown and submit.
    pub fn expiry_due(&self) -> bool {
        self.scheduler.expires_by(self.clock.now())
    }

    /// The countdown reached zero during this session.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let remaining = if self.expired {
            0
        } else if self.assignment.status == AssignmentStatus::Started && self.scheduler.is_running() {
            self.scheduler.remaining()
        } else if self.assignment.status.is_terminal() {
            0
        } else {
            self.reconcile_now().remaining_secs
        };
        SessionSnapshot {
            remaining_seconds: remaining,
            current_segment_start: self.segment_start,
            status: self.assignment.status,
            severity: Severity::for_remaining(remaining),
            untouched_questions: self.tracker.untouched_count(&self.questions),
        }
    }

    fn reconcile_now(&self) -> Reconciled {
        reconcile(&ReconcileInput::for_assignment(
            &self.assignment,
            self.clock.now(),
        ))
    }

    /// Begin a fresh attempt. Only an available assignment can be started;
    /// if the service refuses, nothing changes locally.
    pub async fn start(&mut self) -> Result<SessionSnapshot, SessionError> {
        let state = self.display_state();
        if !state.can_start() {
            return Err(SessionError::NotAvailable { state });
        }

        let updated = self.api.start(self.assignment.id).await?;
        let now = self.clock.now();

        if let Some(server) = updated {
            self.assignment.time_spent_seconds = self
                .assignment
                .time_spent_seconds
                .max(server.time_spent_seconds);
        }
        self.assignment.actual_start_time = Some(now.to_rfc3339());
        self.assignment.status = AssignmentStatus::Started;

        tracing::info!(id = self.assignment.id, "assessment started");
        Ok(self.begin_segment(now, now))
    }

    /// Continue a started or paused attempt inside its window.
    pub async fn resume(&mut self) -> Result<SessionSnapshot, SessionError> {
        let status = self.assignment.status;
        if !matches!(status, AssignmentStatus::Started | AssignmentStatus::Paused) {
            return Err(SessionError::InvalidTransition {
                action: "resume",
                status,
            });
        }
        let now = self.clock.now();
        if !self.assignment.window_contains(now) {
            return Err(SessionError::OutsideWindow);
        }

        // A started attempt keeps its running segment; a paused one opens a
        // new segment now.
        let segment_start = match status {
            AssignmentStatus::Started => match self.assignment.actual_start() {
                Some(started) => started.min(now),
                None => {
                    tracing::warn!(
                        id = self.assignment.id,
                        raw = ?self.assignment.actual_start_time,
                        "unusable actual start time, counting from stored time only"
                    );
                    now
                }
            },
            _ => now,
        };
        self.assignment.actual_start_time = Some(segment_start.to_rfc3339());
        self.assignment.status = AssignmentStatus::Started;

        tracing::info!(
            id = self.assignment.id,
            from = %status,
            time_spent = self.assignment.time_spent_seconds,
            "assessment resumed"
        );
        Ok(self.begin_segment(now, segment_start))
    }

    fn begin_segment(
        &mut self,
        now: DateTime<Utc>,
        segment_start: DateTime<Utc>,
    ) -> SessionSnapshot {
        self.tracker.reset(&self.questions);
        self.expired = false;
        let reconciled = self.reconcile_now();
        if reconciled.limited_by_window {
            tracing::info!(
                remaining = reconciled.remaining_secs,
                "remaining time bounded by window end"
            );
        }
        self.segment_start = Some(segment_start);
        self.scheduler.start(reconciled.remaining_secs, now);
        self.snapshot()
    }

    /// Close the current segment. The countdown stops and the session is
    /// paused even when the service does not confirm.
    pub async fn pause(&mut self) -> Result<PauseOutcome, SessionError> {
        let status = self.assignment.status;
        if status != AssignmentStatus::Started {
            return Err(SessionError::InvalidTransition {
                action: "pause",
                status,
            });
        }

        let now = self.clock.now();
        let segment_secs = self
            .segment_start
            .map(|start| (now - start).num_seconds().max(0))
            .unwrap_or(0);
        self.scheduler.cancel();

        let outcome = match self.api.pause(self.assignment.id, segment_secs).await {
            Ok(updated) => {
                let mut spent = self
                    .assignment
                    .time_spent_seconds
                    .saturating_add(segment_secs);
                if let Some(server) = updated {
                    spent = spent.max(server.time_spent_seconds);
                }
                self.assignment.time_spent_seconds = spent;
                tracing::info!(id = self.assignment.id, segment_secs, spent, "assessment paused");
                PauseOutcome::Recorded { segment_secs }
            }
            Err(error) => {
                tracing::warn!(
                    id = self.assignment.id,
                    segment_secs,
                    %error,
                    "pause not recorded by service, closing locally"
                );
                PauseOutcome::Unrecorded {
                    segment_secs,
                    error,
                }
            }
        };

        self.assignment.status = AssignmentStatus::Paused;
        self.segment_start = None;
        Ok(outcome)
    }

    /// Cycle the mark of one option. Only while the attempt is running.
    pub fn toggle_mark(
        &mut self,
        question_id: QuestionId,
        answer_text: &str,
    ) -> Result<Mark, SessionError> {
        let status = self.assignment.status;
        if status != AssignmentStatus::Started || self.expired {
            return Err(SessionError::InvalidTransition {
                action: "answer",
                status,
            });
        }
        Ok(self.tracker.toggle(question_id, answer_text))
    }

    pub fn pending_submission(&self) -> Submission {
        build_submission(&self.questions, &self.tracker)
    }

    /// Send the marked answers for grading.
    ///
    /// A manual submission (`forced == false`) requires every question to be
    /// touched. The countdown is cancelled before the request goes out.
    pub async fn submit(&mut self, forced: bool) -> Result<AssessmentResult, SessionError> {
        let status = self.assignment.status;
        if status != AssignmentStatus::Started {
            return Err(SessionError::InvalidTransition {
                action: "submit",
                status,
            });
        }
        if !forced && !self.tracker.all_questions_touched(&self.questions) {
            return Err(SessionError::Incomplete {
                untouched: self.tracker.untouched_count(&self.questions),
            });
        }

        self.scheduler.cancel();
        if forced {
            self.expired = true;
        }

        let submission = self.pending_submission();
        tracing::info!(
            id = self.assignment.id,
            forced,
            summary = %submission.summary(),
            "submitting assessment"
        );

        match self.api.submit(self.assignment.id, &submission).await {
            Ok(result) => {
                self.assignment.status = AssignmentStatus::Completed;
                self.assignment.time_spent_seconds = self
                    .assignment
                    .time_spent_seconds
                    .max(result.time_spent_seconds);
                self.segment_start = None;
                self.result = Some(result.clone());
                tracing::info!(
                    id = self.assignment.id,
                    score = result.score_percentage,
                    "assessment completed"
                );
                Ok(result)
            }
            Err(error) => {
                if forced {
                    tracing::warn!(id = self.assignment.id, %error, "automatic submission failed");
                } else {
                    let now = self.clock.now();
                    let remaining = self.reconcile_now().remaining_secs;
                    self.scheduler.start(remaining, now);
                    tracing::warn!(
                        id = self.assignment.id,
                        %error,
                        remaining,
                        "submission failed, countdown resumed"
                    );
                }
                Err(error.into())
            }
        }
    }

    /// Advance the countdown to the clock's current time.
    ///
    /// Expiry triggers the forced submission exactly once.
    pub async fn tick(&mut self) -> Option<SessionEvent> {
        match self.scheduler.poll(self.clock.now())? {
            TimerEvent::Tick {
                remaining,
                severity,
            } => Some(SessionEvent::Tick {
                remaining,
                severity,
            }),
            TimerEvent::Expired => {
                tracing::info!(id = self.assignment.id, "time expired, submitting");
                Some(SessionEvent::Expired(self.submit(true).await))
            }
        }
    }
}
