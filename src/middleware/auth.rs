use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::user::Role;
use crate::AppState;

/// Claims issued by the identity provider. Only `email`, `name` and `role`
/// are consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// The authenticated caller, handed explicitly to every workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn from_claims(claims: Claims) -> Result<Self> {
        let role = claims
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or_else(|| Error::Unauthorized("invalid_role".to_string()))?;
        if claims.email.trim().is_empty() {
            return Err(Error::Unauthorized("missing_email".to_string()));
        }
        let name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| claims.sub.clone());

        Ok(Self {
            subject: claims.sub,
            email: claims.email,
            name,
            role,
        })
    }

    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "This action requires the {} role",
                role.as_str()
            )))
        }
    }
}

pub fn decode_session(token: &str, secret: &str) -> Result<Session> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;
    Session::from_claims(data.claims)
}

fn bearer_token(req: &Request) -> Result<&str> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))
}

pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = match bearer_token(&req).and_then(|t| decode_session(t, &state.jwt_secret)) {
        Ok(session) => session,
        Err(err) => return err.into_response(),
    };
    req.extensions_mut().insert(session);
    next.run(req).await
}
