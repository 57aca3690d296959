use std::collections::HashMap;

use crate::database::SharedStore;
use crate::dto::dashboard_dto::{AttemptSummary, MeResponse, StudentDashboard, TutorDashboard};
use crate::dto::test_dto::TestSummary;
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::user::Role;
use crate::services::grading_service::display_score;
use crate::services::user_service::UserService;

#[derive(Clone)]
pub struct DashboardService {
    store: SharedStore,
    users: UserService,
}

impl DashboardService {
    pub fn new(store: SharedStore) -> Self {
        let users = UserService::new(store.clone());
        Self { store, users }
    }

    /// Registers the caller on first visit and tells the client where to land.
    pub async fn me(&self, session: &Session) -> Result<MeResponse> {
        let user = self.users.ensure_user(session, session.role).await?;
        Ok(MeResponse {
            dashboard: user.role.dashboard_path(),
            user,
        })
    }

    pub async fn tutor(&self, session: &Session) -> Result<TutorDashboard> {
        session.require_role(Role::Tutor)?;
        let created_tests = match self.users.current_user(session).await? {
            Some(user) => self.store.list_tests_created_by(user.id).await?,
            None => Vec::new(),
        };
        let students = self.store.list_users_by_role(Role::Student).await?;

        Ok(TutorDashboard {
            created_tests: created_tests.into_iter().map(TestSummary::from).collect(),
            students,
        })
    }

    pub async fn student(&self, session: &Session) -> Result<StudentDashboard> {
        session.require_role(Role::Student)?;
        let Some(user) = self.users.current_user(session).await? else {
            return Ok(StudentDashboard {
                assigned_tests: Vec::new(),
                attempts: Vec::new(),
            });
        };

        let assigned = self.store.list_tests_assigned_to(user.id).await?;
        let attempts = self.store.list_attempts_by_student(user.id).await?;

        let mut titles: HashMap<_, String> =
            assigned.iter().map(|t| (t.id, t.title.clone())).collect();
        let mut summaries = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            let test_title = match titles.get(&attempt.test_id) {
                Some(title) => title.clone(),
                None => {
                    let title = self.store.get_test(attempt.test_id).await?.title;
                    titles.insert(attempt.test_id, title.clone());
                    title
                }
            };
            summaries.push(AttemptSummary {
                id: attempt.id,
                test_id: attempt.test_id,
                test_title,
                status: attempt.status(),
                start_time: attempt.start_time,
                end_time: attempt.end_time,
                display_score: attempt.score.map(display_score),
            });
        }

        Ok(StudentDashboard {
            assigned_tests: assigned.into_iter().map(TestSummary::from).collect(),
            attempts: summaries,
        })
    }
}
