use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::test_assignment::TestAssignment;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignTestPayload {
    #[validate(length(min = 1, message = "Please select at least one student"))]
    pub student_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentsResponse {
    pub test_id: Uuid,
    pub assignments: Vec<TestAssignment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentOption {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub assigned: bool,
}
