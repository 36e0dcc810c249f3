use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::{parse_answer_options, ParsedAnswers};

pub type AssessmentId = i64;
pub type QuestionId = i64;

/// Stored lifecycle status of one user's assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Assigned,
    Started,
    Paused,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Started => "started",
            AssignmentStatus::Paused => "paused",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Cancelled)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation state derived from status and window; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Scheduled,
    Available,
    InProgress,
    Paused,
    Expired,
    Completed,
    Cancelled,
}

impl DisplayState {
    pub fn label(self) -> &'static str {
        match self {
            DisplayState::Scheduled => "scheduled",
            DisplayState::Available => "available",
            DisplayState::InProgress => "in progress",
            DisplayState::Paused => "paused",
            DisplayState::Expired => "expired",
            DisplayState::Completed => "completed",
            DisplayState::Cancelled => "cancelled",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            DisplayState::Scheduled => "📅",
            DisplayState::Available => "🎯",
            DisplayState::InProgress => "⏳",
            DisplayState::Paused => "⏸",
            DisplayState::Expired => "⏰",
            DisplayState::Completed => "✅",
            DisplayState::Cancelled => "❌",
        }
    }

    pub fn can_start(self) -> bool {
        self == DisplayState::Available
    }

    pub fn can_resume(self) -> bool {
        matches!(self, DisplayState::InProgress | DisplayState::Paused)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A time-boxed exam instance assigned to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAssignment {
    pub id: AssessmentId,
    pub name: String,
    pub exam_id: i64,
    #[serde(default)]
    pub exam_name: String,
    #[serde(with = "instant_format")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "instant_format")]
    pub end_time: DateTime<Utc>,
    pub status: AssignmentStatus,
    /// Nominal duration in seconds.
    pub duration: i64,
    #[serde(rename = "cardCount", default)]
    pub question_count: u32,
    /// Kept raw: a malformed value must not reject the whole record.
    #[serde(default)]
    pub actual_start_time: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: i64,
}

impl AssessmentAssignment {
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time && now <= self.end_time
    }

    pub fn display_state(&self, now: DateTime<Utc>) -> DisplayState {
        match self.status {
            AssignmentStatus::Completed => DisplayState::Completed,
            AssignmentStatus::Cancelled => DisplayState::Cancelled,
            _ if now > self.end_time => DisplayState::Expired,
            _ if now < self.start_time => DisplayState::Scheduled,
            AssignmentStatus::Assigned => DisplayState::Available,
            AssignmentStatus::Started => DisplayState::InProgress,
            AssignmentStatus::Paused => DisplayState::Paused,
        }
    }

    /// The parsed `actualStartTime`, if present and well-formed.
    pub fn actual_start(&self) -> Option<DateTime<Utc>> {
        self.actual_start_time.as_deref().and_then(parse_instant)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListingStats {
    pub total: usize,
    pub available: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl ListingStats {
    pub fn from_assignments(assignments: &[AssessmentAssignment], now: DateTime<Utc>) -> Self {
        let mut stats = ListingStats {
            total: assignments.len(),
            ..Default::default()
        };
        for a in assignments {
            match a.status {
                AssignmentStatus::Assigned if a.window_contains(now) => stats.available += 1,
                AssignmentStatus::Started => stats.in_progress += 1,
                AssignmentStatus::Completed => stats.completed += 1,
                _ => {}
            }
        }
        stats
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    /// Display text; also the key for marks and the submitted string.
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub prompt: String,
    pub category: String,
    pub difficulty: u8,
    pub options: Vec<AnswerOption>,
    pub legacy_format: bool,
}

impl Question {
    pub fn difficulty_label(&self) -> &'static str {
        difficulty_label(self.difficulty)
    }
}

/// A question as the service sends it, answers still in their raw field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    #[serde(default)]
    pub title: Option<String>,
    pub question: String,
    #[serde(rename = "answer", default)]
    pub raw_answers: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: u8,
}

impl QuestionRecord {
    pub fn into_question(self) -> Question {
        let parsed = parse_answer_options(&self.raw_answers);
        let legacy_format = matches!(parsed, ParsedAnswers::Legacy(_));
        Question {
            id: self.id,
            title: self.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| "Question".to_string()),
            prompt: self.question,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "General".to_string()),
            difficulty: self.difficulty,
            options: parsed.into_options(),
            legacy_format,
        }
    }
}

pub fn difficulty_label(difficulty: u8) -> &'static str {
    match difficulty {
        1 => "very easy",
        2 => "easy",
        3 => "medium",
        4 => "hard",
        5 => "very hard",
        _ => "unknown",
    }
}

/// Grading outcome, produced by the service and shown as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub assessment_id: AssessmentId,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub score_percentage: f64,
    pub time_spent_seconds: i64,
}

/// Parse an instant in any of the shapes the service emits.
///
/// Accepts RFC 3339, offsets without seconds, a trailing `[Zone/Id]`
/// suffix, and naive date-times (read as local time).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let cleaned = match trimmed.find('[') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    let with_offset = match cleaned.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => cleaned.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_str(&with_offset, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    None
}

mod instant_format {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_instant(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid instant: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn assignment(status: AssignmentStatus) -> AssessmentAssignment {
        AssessmentAssignment {
            id: 1,
            name: "Midterm".into(),
            exam_id: 10,
            exam_name: "Accounting basics".into(),
            start_time: at("2025-03-01T09:00:00Z"),
            end_time: at("2025-03-01T11:00:00Z"),
            status,
            duration: 1800,
            question_count: 3,
            actual_start_time: None,
            time_spent_seconds: 0,
        }
    }

    #[test]
    fn parses_zoned_instant_with_bracket_suffix() {
        let dt = parse_instant("2025-03-01T10:00+01:00[Europe/Vienna]").unwrap();
        assert_eq!(dt, at("2025-03-01T09:00:00Z"));

        let dt = parse_instant("2025-03-01T10:00:30.123456789+01:00[Europe/Vienna]").unwrap();
        assert_eq!(dt.timestamp(), at("2025-03-01T09:00:30Z").timestamp());
    }

    #[test]
    fn parses_zulu_without_seconds() {
        assert_eq!(
            parse_instant("2025-03-01T09:00Z"),
            Some(at("2025-03-01T09:00:00Z"))
        );
    }

    #[test]
    fn naive_instants_parse() {
        assert!(parse_instant("2025-03-01T09:00").is_some());
        assert!(parse_instant("2025-03-01T09:00:15").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("not-a-date"), None);
        assert_eq!(parse_instant("[Europe/Vienna]"), None);
    }

    #[test]
    fn display_state_follows_window() {
        let a = assignment(AssignmentStatus::Assigned);
        assert_eq!(
            a.display_state(a.start_time - Duration::minutes(1)),
            DisplayState::Scheduled
        );
        assert_eq!(
            a.display_state(a.start_time + Duration::minutes(1)),
            DisplayState::Available
        );
        assert_eq!(
            a.display_state(a.end_time + Duration::seconds(1)),
            DisplayState::Expired
        );

        let started = assignment(AssignmentStatus::Started);
        assert_eq!(
            started.display_state(started.start_time),
            DisplayState::InProgress
        );
        assert_eq!(
            started.display_state(started.end_time + Duration::seconds(1)),
            DisplayState::Expired
        );
    }

    #[test]
    fn completed_never_expires() {
        let a = assignment(AssignmentStatus::Completed);
        assert_eq!(
            a.display_state(a.end_time + Duration::days(30)),
            DisplayState::Completed
        );
    }

    #[test]
    fn deserializes_wire_assignment() {
        let json = r#"{
            "id": 4,
            "name": "Final",
            "examId": 2,
            "examName": "Ledger",
            "startTime": "2025-03-01T10:00+01:00[Europe/Vienna]",
            "endTime": "2025-03-01T12:00+01:00[Europe/Vienna]",
            "status": "paused",
            "duration": 3600,
            "cardCount": 12,
            "actualStartTime": "garbage",
            "timeSpentSeconds": 240
        }"#;
        let a: AssessmentAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(a.status, AssignmentStatus::Paused);
        assert_eq!(a.question_count, 12);
        assert_eq!(a.time_spent_seconds, 240);
        assert_eq!(a.actual_start(), None);
        assert_eq!(a.start_time, at("2025-03-01T09:00:00Z"));
    }

    #[test]
    fn listing_stats_count_by_state() {
        let now = at("2025-03-01T10:00:00Z");
        let mut late = assignment(AssignmentStatus::Assigned);
        late.end_time = at("2025-03-01T09:30:00Z");
        let list = vec![
            assignment(AssignmentStatus::Assigned),
            late,
            assignment(AssignmentStatus::Started),
            assignment(AssignmentStatus::Completed),
        ];
        let stats = ListingStats::from_assignments(&list, now);
        assert_eq!(
            stats,
            ListingStats {
                total: 4,
                available: 1,
                in_progress: 1,
                completed: 1
            }
        );
    }

    #[test]
    fn question_record_defaults() {
        let record = QuestionRecord {
            id: 9,
            title: Some("  ".into()),
            question: "What is a ledger?".into(),
            raw_answers: "A book (✓)\nA fish".into(),
            category: None,
            difficulty: 4,
        };
        let q = record.into_question();
        assert_eq!(q.title, "Question");
        assert_eq!(q.category, "General");
        assert_eq!(q.difficulty_label(), "hard");
        assert!(q.legacy_format);
        assert_eq!(q.options.len(), 2);
    }
}
