use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TRUE_OPTION: &str = "True";
pub const FALSE_OPTION: &str = "False";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "question_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub position: i32,
    pub content: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: i32,
}

impl Question {
    /// Options a student picks from. True/false questions store no options.
    pub fn choices(&self) -> Vec<String> {
        match self.question_type {
            QuestionType::MultipleChoice => self.options.clone(),
            QuestionType::TrueFalse => vec![TRUE_OPTION.to_string(), FALSE_OPTION.to_string()],
        }
    }

    pub fn is_correct(&self, selected_option: &str) -> bool {
        selected_option == self.correct_answer
    }
}

/// A question that has passed authoring validation, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub content: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: i32,
}
