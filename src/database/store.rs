//! Persistence seam for every workflow.
//!
//! Workflows never talk to a database directly; they go through [`Store`].
//! Operations that write more than one row (`create_test_with_questions`,
//! `assign_test`, `complete_attempt`) are all-or-nothing in every
//! implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{NewQuestion, Question};
use crate::models::test::{NewTest, Test};
use crate::models::test_assignment::TestAssignment;
use crate::models::test_attempt::{AttemptCompletion, TestAttempt};
use crate::models::user::{NewUser, Role, User};

pub type SharedStore = Arc<dyn Store>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_user(&self, id: Uuid) -> Result<User>;

    /// Inserts the user unless one with the same email exists; returns the stored row.
    async fn create_user_if_absent(&self, user: NewUser) -> Result<User>;

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>>;

    /// Questions are stored in the given order.
    async fn create_test_with_questions(
        &self,
        test: NewTest,
        questions: Vec<NewQuestion>,
    ) -> Result<(Test, Vec<Question>)>;

    async fn get_test(&self, id: Uuid) -> Result<Test>;

    /// Newest first.
    async fn list_tests_created_by(&self, user_id: Uuid) -> Result<Vec<Test>>;

    async fn list_tests_assigned_to(&self, student_id: Uuid) -> Result<Vec<Test>>;

    /// Ordered by authoring position.
    async fn list_questions(&self, test_id: Uuid) -> Result<Vec<Question>>;

    async fn get_question(&self, id: Uuid) -> Result<Question>;

    /// Adds one assignment per student; existing pairs are kept as they are.
    /// Returns every assignment the test holds afterwards.
    async fn assign_test(
        &self,
        test_id: Uuid,
        student_ids: Vec<Uuid>,
        assigned_by: Uuid,
    ) -> Result<Vec<TestAssignment>>;

    async fn list_assignments(&self, test_id: Uuid) -> Result<Vec<TestAssignment>>;

    async fn is_assigned(&self, test_id: Uuid, student_id: Uuid) -> Result<bool>;

    async fn create_attempt(
        &self,
        test_id: Uuid,
        student_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<TestAttempt>;

    async fn get_attempt(&self, id: Uuid) -> Result<TestAttempt>;

    /// Newest first.
    async fn list_attempts_by_student(&self, student_id: Uuid) -> Result<Vec<TestAttempt>>;

    /// Writes the answers and finalizes the attempt in one step.
    /// Fails with `Error::Conflict` if the attempt is already completed.
    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        answers: Vec<NewAnswer>,
        completion: AttemptCompletion,
    ) -> Result<TestAttempt>;

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>>;
}

pub(crate) fn already_submitted(attempt_id: Uuid) -> crate::error::Error {
    crate::error::Error::Conflict(format!("Attempt {} has already been submitted", attempt_id))
}
