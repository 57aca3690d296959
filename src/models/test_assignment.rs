use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One student holding one test. A test may have many of these.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestAssignment {
    pub id: Uuid,
    pub test_id: Uuid,
    pub student_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}
