use chrono::Utc;
use uuid::Uuid;

use crate::database::SharedStore;
use crate::dto::attempt_dto::{StartAttemptResponse, SubmitAttemptRequest, SubmitAttemptResponse};
use crate::dto::test_dto::QuestionView;
use crate::error::{Error, Result};
use crate::middleware::auth::Session;
use crate::models::test::Test;
use crate::models::test_attempt::{AttemptCompletion, TestAttempt};
use crate::models::user::{Role, User};
use crate::services::grading_service::{display_score, GradingService};
use crate::services::user_service::UserService;

#[derive(Clone)]
pub struct AttemptService {
    store: SharedStore,
    users: UserService,
}

impl AttemptService {
    pub fn new(store: SharedStore) -> Self {
        let users = UserService::new(store.clone());
        Self { store, users }
    }

    /// Opens a test: creates exactly one incomplete attempt for this session.
    pub async fn start_attempt(&self, session: &Session, test_id: Uuid) -> Result<StartAttemptResponse> {
        session.require_role(Role::Student)?;
        let student = self.users.ensure_user(session, Role::Student).await?;
        let test = self.store.get_test(test_id).await?;

        if !self.store.is_assigned(test.id, student.id).await? {
            return Err(Error::Forbidden(
                "This test has not been assigned to you".to_string(),
            ));
        }

        let questions = self.store.list_questions(test.id).await?;
        if questions.is_empty() {
            return Err(Error::NotFound(
                "Test not found or no questions available".to_string(),
            ));
        }

        let attempt = self
            .store
            .create_attempt(test.id, student.id, Utc::now())
            .await?;
        tracing::info!(
            attempt_id = %attempt.id,
            test_id = %test.id,
            student_id = %student.id,
            "attempt started"
        );

        Ok(StartAttemptResponse {
            attempt,
            test: test.into(),
            questions: questions.iter().map(QuestionView::from).collect(),
        })
    }

    /// Grades and finalizes an attempt. Answers and the completed attempt are
    /// written together, and a second submission is rejected.
    pub async fn submit_attempt(
        &self,
        session: &Session,
        attempt_id: Uuid,
        req: SubmitAttemptRequest,
    ) -> Result<SubmitAttemptResponse> {
        session.require_role(Role::Student)?;
        let attempt = self.store.get_attempt(attempt_id).await?;
        let student = self.users.current_user(session).await?;
        if student.map(|s| s.id) != Some(attempt.student_id) {
            return Err(Error::Forbidden(
                "You can only submit your own attempts".to_string(),
            ));
        }
        if attempt.completed {
            return Err(Error::Conflict(format!(
                "Attempt {} has already been submitted",
                attempt.id
            )));
        }

        let questions = self.store.list_questions(attempt.test_id).await?;
        if let Some(stray) = req
            .answers
            .keys()
            .find(|id| !questions.iter().any(|q| q.id == **id))
        {
            return Err(Error::BadRequest(format!(
                "Question {} does not belong to this test",
                stray
            )));
        }

        let unanswered = GradingService::unanswered_count(&questions, &req.answers);
        if unanswered > 0 && !req.confirm_unanswered {
            return Err(Error::UnansweredQuestions { count: unanswered });
        }

        let outcome = GradingService::grade(&questions, &req.answers);
        let correct_count = outcome.correct_count();
        let completed = self
            .store
            .complete_attempt(
                attempt.id,
                outcome.answers,
                AttemptCompletion {
                    score: outcome.score,
                    end_time: Utc::now(),
                },
            )
            .await?;

        tracing::info!(
            attempt_id = %completed.id,
            score = outcome.score,
            unanswered,
            "attempt submitted"
        );

        Ok(SubmitAttemptResponse {
            attempt_id: completed.id,
            completed: completed.completed,
            score: outcome.score,
            display_score: display_score(outcome.score),
            earned_points: outcome.earned_points,
            total_points: outcome.total_points,
            correct_count,
            total_questions: questions.len(),
            end_time: completed.end_time,
        })
    }

    pub async fn get_attempt(&self, session: &Session, attempt_id: Uuid) -> Result<TestAttempt> {
        let (attempt, _) = self.visible_attempt(session, attempt_id).await?;
        Ok(attempt)
    }

    /// An attempt is visible to the student who took it and to the test's author.
    pub(crate) async fn visible_attempt(
        &self,
        session: &Session,
        attempt_id: Uuid,
    ) -> Result<(TestAttempt, Test)> {
        let attempt = self.store.get_attempt(attempt_id).await?;
        let test = self.store.get_test(attempt.test_id).await?;
        let caller: Option<User> = self.users.current_user(session).await?;

        let allowed = caller
            .map(|u| u.id == attempt.student_id || u.id == test.created_by)
            .unwrap_or(false);
        if !allowed {
            return Err(Error::Forbidden(
                "You do not have access to this attempt".to_string(),
            ));
        }
        Ok((attempt, test))
    }
}
