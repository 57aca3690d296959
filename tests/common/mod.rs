#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use tutoring_backend::{
    database::{MemoryStore, SharedStore},
    middleware::auth::Claims,
    routes, AppState,
};

pub const TEST_SECRET: &str = "test_secret_key";

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

pub fn setup_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let shared: SharedStore = store.clone();
    let state = AppState::new(shared, TEST_SECRET);
    TestApp {
        app: routes::build_router(state),
        store,
    }
}

pub fn token_for(email: &str, name: &str, role: &str) -> String {
    let claims = Claims {
        sub: format!("sub-{}", email),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        email: email.to_string(),
        name: Some(name.to_string()),
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign token")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}
