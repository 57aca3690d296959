use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::dto::test_dto::TestSummary;
use crate::models::user::User;

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub dashboard: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TutorDashboard {
    pub created_tests: Vec<TestSummary>,
    pub students: Vec<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub status: &'static str,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub display_score: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub assigned_tests: Vec<TestSummary>,
    pub attempts: Vec<AttemptSummary>,
}
