//! REST client for the assessment service.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::model::{AssessmentAssignment, AssessmentId, AssessmentResult, Question, QuestionRecord};
use crate::submit::Submission;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The calls the session engine makes against the assessment service.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    async fn list_available(&self) -> Result<Vec<AssessmentAssignment>, ApiError>;

    async fn fetch_questions(&self, id: AssessmentId) -> Result<Vec<Question>, ApiError>;

    /// `Ok(None)` when the service acknowledged without returning the record.
    async fn start(&self, id: AssessmentId) -> Result<Option<AssessmentAssignment>, ApiError>;

    /// `segment_secs` covers the current running segment only.
    async fn pause(
        &self,
        id: AssessmentId,
        segment_secs: i64,
    ) -> Result<Option<AssessmentAssignment>, ApiError>;

    async fn submit(
        &self,
        id: AssessmentId,
        submission: &Submission,
    ) -> Result<AssessmentResult, ApiError>;

    async fn fetch_result(&self, id: AssessmentId) -> Result<AssessmentResult, ApiError>;
}

/// Bearer-authenticated HTTP implementation.
pub struct HttpAssessmentApi {
    base_url: String,
    token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpAssessmentApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssessmentApi")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PauseRequest {
    time_spent_seconds: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpAssessmentApi {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout_secs,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.header("Authorization", format!("Bearer {}", token)),
            None => req,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Send the request and turn non-success statuses into typed errors.
    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        tracing::warn!(status, %message, "{} failed", what);

        Err(match status {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(if message.is_empty() {
                what.to_string()
            } else {
                message
            }),
            _ => ApiError::Http { status, message },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Start and pause may answer with a message object instead of the record.
    async fn decode_lenient(response: reqwest::Response) -> Option<AssessmentAssignment> {
        let body = response.text().await.ok()?;
        serde_json::from_str(&body).ok()
    }
}

#[async_trait]
impl AssessmentApi for HttpAssessmentApi {
    #[instrument(skip(self))]
    async fn list_available(&self) -> Result<Vec<AssessmentAssignment>, ApiError> {
        let req = self.client.get(self.url("/assessments/available"));
        let response = self.send(req, "list assessments").await?;
        let list: Vec<AssessmentAssignment> = Self::decode(response).await?;
        tracing::debug!(count = list.len(), "assessments loaded");
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn fetch_questions(&self, id: AssessmentId) -> Result<Vec<Question>, ApiError> {
        let req = self
            .client
            .get(self.url(&format!("/assessments/{}/questions", id)));
        let response = self.send(req, "fetch questions").await?;
        let records: Vec<QuestionRecord> = Self::decode(response).await?;
        let questions: Vec<Question> = records.into_iter().map(QuestionRecord::into_question).collect();
        let legacy = questions.iter().filter(|q| q.legacy_format).count();
        tracing::debug!(count = questions.len(), legacy, "questions loaded");
        Ok(questions)
    }

    #[instrument(skip(self))]
    async fn start(&self, id: AssessmentId) -> Result<Option<AssessmentAssignment>, ApiError> {
        let req = self
            .client
            .post(self.url(&format!("/assessments/{}/start", id)));
        let response = self.send(req, "start assessment").await?;
        Ok(Self::decode_lenient(response).await)
    }

    #[instrument(skip(self))]
    async fn pause(
        &self,
        id: AssessmentId,
        segment_secs: i64,
    ) -> Result<Option<AssessmentAssignment>, ApiError> {
        let req = self
            .client
            .post(self.url(&format!("/assessments/{}/pause", id)))
            .json(&PauseRequest {
                time_spent_seconds: segment_secs,
            });
        let response = self.send(req, "pause assessment").await?;
        Ok(Self::decode_lenient(response).await)
    }

    #[instrument(skip(self, submission), fields(summary = %submission.summary()))]
    async fn submit(
        &self,
        id: AssessmentId,
        submission: &Submission,
    ) -> Result<AssessmentResult, ApiError> {
        let req = self
            .client
            .post(self.url(&format!("/assessments/{}/submit", id)))
            .json(submission);
        let response = self.send(req, "submit assessment").await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn fetch_result(&self, id: AssessmentId) -> Result<AssessmentResult, ApiError> {
        let req = self
            .client
            .get(self.url(&format!("/assessments/{}/result", id)));
        let response = self.send(req, "fetch result").await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::AnswerTracker;
    use crate::model::{AnswerOption, AssignmentStatus, Question};
    use crate::submit::build_submission;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assignment_json(status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 3,
            "name": "Quarterly check",
            "examId": 1,
            "examName": "Bookkeeping",
            "startTime": "2025-03-01T10:00+01:00[Europe/Vienna]",
            "endTime": "2025-03-01T12:00+01:00[Europe/Vienna]",
            "status": status,
            "duration": 1800,
            "cardCount": 2,
            "timeSpentSeconds": 0
        })
    }

    fn api(server: &MockServer) -> HttpAssessmentApi {
        HttpAssessmentApi::new(&server.uri(), Some("test-token".into()), 5).unwrap()
    }

    #[tokio::test]
    async fn lists_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assessments/available"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([assignment_json("assigned")])),
            )
            .mount(&server)
            .await;

        let list = api(&server).list_available().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, AssignmentStatus::Assigned);
        assert_eq!(list[0].exam_name, "Bookkeeping");
    }

    #[tokio::test]
    async fn questions_are_parsed_in_both_formats() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {
                "id": 11,
                "question": "Which side increases assets?",
                "answer": "[{\"text\":\"Debit\",\"isCorrect\":true},{\"text\":\"Credit\",\"isCorrect\":false}]",
                "category": "Basics",
                "difficulty": 2,
                "title": "Sides"
            },
            {
                "id": 12,
                "question": "Pick the liability",
                "answer": "1. Loan (✓)\n2. Cash",
                "difficulty": 3
            }
        ]);
        Mock::given(method("GET"))
            .and(path("/assessments/3/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let questions = api(&server).fetch_questions(3).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options[0].text, "1. Debit");
        assert!(!questions[0].legacy_format);
        assert_eq!(questions[1].options[0].text, "1. Loan");
        assert!(questions[1].legacy_format);
        assert_eq!(questions[1].category, "General");
    }

    #[tokio::test]
    async fn start_accepts_message_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assessments/3/start"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "Assessment started successfully"})),
            )
            .mount(&server)
            .await;

        assert!(api(&server).start(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn start_decodes_returned_assignment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assessments/3/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(assignment_json("started")))
            .mount(&server)
            .await;

        let updated = api(&server).start(3).await.unwrap().unwrap();
        assert_eq!(updated.status, AssignmentStatus::Started);
    }

    #[tokio::test]
    async fn pause_sends_segment_seconds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assessments/3/pause"))
            .and(body_json(serde_json::json!({"timeSpentSeconds": 600})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        api(&server).pause(3, 600).await.unwrap();
    }

    #[tokio::test]
    async fn submit_posts_answer_map() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assessments/3/submit"))
            .and(body_json(serde_json::json!({
                "41": ["1. Cash"],
                "42": []
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "assessmentId": 3,
                "userId": 9,
                "startedAt": "2025-03-01T10:00:00",
                "completedAt": "2025-03-01T10:25:00",
                "totalQuestions": 2,
                "correctAnswers": 1,
                "incorrectAnswers": 1,
                "scorePercentage": 50.0,
                "timeSpentSeconds": 1500
            })))
            .mount(&server)
            .await;

        let question = |id, texts: &[&str]| Question {
            id,
            title: String::new(),
            prompt: String::new(),
            category: String::new(),
            difficulty: 1,
            options: texts
                .iter()
                .map(|t| AnswerOption {
                    text: t.to_string(),
                    is_correct: false,
                })
                .collect(),
            legacy_format: false,
        };
        let questions = vec![
            question(41, &["1. Cash", "2. Stock"]),
            question(42, &["1. Debit"]),
        ];
        let mut tracker = AnswerTracker::new();
        tracker.reset(&questions);
        tracker.toggle(41, "1. Cash"); // no
        tracker.toggle(41, "1. Cash"); // yes
        tracker.toggle(42, "1. Debit"); // no

        let submission = build_submission(&questions, &tracker);
        let result = api(&server).submit(3, &submission).await.unwrap();
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.time_spent_seconds, 1500);
    }

    #[tokio::test]
    async fn fetches_stored_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assessments/8/result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 21,
                "assessmentId": 8,
                "userId": 4,
                "startedAt": "2025-03-01T10:02:00",
                "completedAt": null,
                "totalQuestions": 12,
                "correctAnswers": 9,
                "incorrectAnswers": 3,
                "scorePercentage": 75.0,
                "timeSpentSeconds": 1710
            })))
            .mount(&server)
            .await;

        let result = api(&server).fetch_result(8).await.unwrap();
        assert_eq!(result.assessment_id, 8);
        assert_eq!(result.total_questions, 12);
        assert_eq!(result.score_percentage, 75.0);
        assert!(result.completed_at.is_none());
    }

    #[tokio::test]
    async fn error_statuses_are_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assessments/available"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assessments/4/result"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "Result not found or no access"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/assessments/4/start"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = api(&server);
        assert!(matches!(
            api.list_available().await,
            Err(ApiError::Unauthorized(m)) if m == "Invalid token"
        ));
        assert!(matches!(
            api.fetch_result(4).await,
            Err(ApiError::NotFound(m)) if m == "Result not found or no access"
        ));
        let err = api.start(4).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assessments/available"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(matches!(
            api(&server).list_available().await,
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn debug_masks_token() {
        let api = HttpAssessmentApi::new("http://localhost:8080/", Some("secret".into()), 30).unwrap();
        let printed = format!("{:?}", api);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("http://localhost:8080\""));
    }
}
