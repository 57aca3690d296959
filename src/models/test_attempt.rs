use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `score` and `end_time` stay `None` until `completed` flips to true, and are
/// written together exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestAttempt {
    pub id: Uuid,
    pub test_id: Uuid,
    pub student_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub completed: bool,
}

impl TestAttempt {
    pub fn status(&self) -> &'static str {
        if self.completed {
            "submitted"
        } else {
            "in_progress"
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttemptCompletion {
    pub score: f64,
    pub end_time: DateTime<Utc>,
}
