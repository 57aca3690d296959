use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{Question, QuestionType};
use crate::models::test::Test;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestion {
    #[validate(length(min = 1, message = "Question content is required"))]
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[validate(length(min = 1, message = "Correct answer is required"))]
    pub correct_answer: String,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, message = "Points must be at least 1"))]
    pub points: i32,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<CreateQuestion>,
}

// Trims and turns empty strings into None
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Test> for TestSummary {
    fn from(test: Test) -> Self {
        Self {
            id: test.id,
            title: test.title,
            description: test.description,
            created_by: test.created_by,
            created_at: test.created_at,
        }
    }
}

/// What a student sees while taking a test: no correct answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub position: i32,
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub choices: Vec<String>,
    pub points: i32,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            position: q.position,
            content: q.content.clone(),
            question_type: q.question_type,
            choices: q.choices(),
            points: q.points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTestResponse {
    pub test: TestSummary,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TestQuestions {
    Authoring(Vec<Question>),
    Taking(Vec<QuestionView>),
}

#[derive(Debug, Clone, Serialize)]
pub struct TestDetailResponse {
    pub test: TestSummary,
    pub total_points: i64,
    pub questions: TestQuestions,
}
