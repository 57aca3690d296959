use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::test_dto::{QuestionView, TestSummary};
use crate::models::question::QuestionType;
use crate::models::test_attempt::TestAttempt;

#[derive(Debug, Clone, Serialize)]
pub struct StartAttemptResponse {
    pub attempt: TestAttempt,
    pub test: TestSummary,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptRequest {
    /// Selected option keyed by question id. Missing keys are unanswered.
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
    #[serde(default)]
    pub confirm_unanswered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: Uuid,
    pub completed: bool,
    pub score: f64,
    pub display_score: i64,
    pub earned_points: i64,
    pub total_points: i64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerBreakdown {
    pub question_id: Uuid,
    pub position: i32,
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub choices: Vec<String>,
    pub selected_option: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub attempt: TestAttempt,
    pub test: TestSummary,
    pub display_score: Option<i64>,
    pub correct_count: usize,
    pub total_count: usize,
    pub answers: Vec<AnswerBreakdown>,
}
