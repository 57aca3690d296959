use std::collections::HashSet;

use uuid::Uuid;
use validator::Validate;

use crate::database::SharedStore;
use crate::dto::assignment_dto::{AssignTestPayload, AssignmentsResponse, StudentOption};
use crate::error::{Error, Result};
use crate::middleware::auth::Session;
use crate::models::test::Test;
use crate::models::user::{Role, User};
use crate::services::user_service::UserService;

#[derive(Clone)]
pub struct AssignmentService {
    store: SharedStore,
    users: UserService,
}

impl AssignmentService {
    pub fn new(store: SharedStore) -> Self {
        let users = UserService::new(store.clone());
        Self { store, users }
    }

    /// Gives every selected student the test. Earlier assignees keep it.
    pub async fn assign(
        &self,
        session: &Session,
        test_id: Uuid,
        payload: AssignTestPayload,
    ) -> Result<AssignmentsResponse> {
        session.require_role(Role::Tutor)?;
        payload.validate()?;

        let mut seen = HashSet::new();
        let student_ids: Vec<Uuid> = payload
            .student_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let (tutor, test) = self.owned_test(session, test_id).await?;

        for id in &student_ids {
            let user = self.store.get_user(*id).await.map_err(|err| match err {
                Error::NotFound(_) => Error::BadRequest(format!("Unknown student {}", id)),
                other => other,
            })?;
            if user.role != Role::Student {
                return Err(Error::BadRequest(format!("User {} is not a student", id)));
            }
        }

        let assignments = self
            .store
            .assign_test(test.id, student_ids, tutor.id)
            .await?;
        tracing::info!(
            test_id = %test.id,
            assignees = assignments.len(),
            "test assignments written"
        );

        Ok(AssignmentsResponse {
            test_id: test.id,
            assignments,
        })
    }

    pub async fn list_assignments(
        &self,
        session: &Session,
        test_id: Uuid,
    ) -> Result<AssignmentsResponse> {
        let (_, test) = self.owned_test(session, test_id).await?;
        let assignments = self.store.list_assignments(test.id).await?;
        Ok(AssignmentsResponse {
            test_id: test.id,
            assignments,
        })
    }

    /// Every student, flagged with whether they already hold the test.
    pub async fn list_students(&self, session: &Session, test_id: Uuid) -> Result<Vec<StudentOption>> {
        let (_, test) = self.owned_test(session, test_id).await?;
        let assigned: HashSet<Uuid> = self
            .store
            .list_assignments(test.id)
            .await?
            .into_iter()
            .map(|a| a.student_id)
            .collect();

        let students = self.store.list_users_by_role(Role::Student).await?;
        Ok(students
            .into_iter()
            .map(|s| StudentOption {
                assigned: assigned.contains(&s.id),
                id: s.id,
                name: s.name,
                email: s.email,
            })
            .collect())
    }

    /// Only the tutor who authored a test may manage its assignments.
    async fn owned_test(&self, session: &Session, test_id: Uuid) -> Result<(User, Test)> {
        session.require_role(Role::Tutor)?;
        let test = self.store.get_test(test_id).await?;
        let tutor = self
            .users
            .current_user(session)
            .await?
            .filter(|u| u.id == test.created_by)
            .ok_or_else(|| Error::Forbidden("Only the test's author can assign it".to_string()))?;
        Ok((tutor, test))
    }
}
