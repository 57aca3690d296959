use crate::database::SharedStore;
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::user::{NewUser, Role, User};

#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn current_user(&self, session: &Session) -> Result<Option<User>> {
        self.store.find_user_by_email(&session.email).await
    }

    /// Looks the caller up by email and creates the row on first use.
    pub async fn ensure_user(&self, session: &Session, role: Role) -> Result<User> {
        if let Some(user) = self.store.find_user_by_email(&session.email).await? {
            return Ok(user);
        }

        let user = self
            .store
            .create_user_if_absent(NewUser {
                email: session.email.clone(),
                name: session.name.clone(),
                role,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = role.as_str(), "created user record");
        Ok(user)
    }
}
