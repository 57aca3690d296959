use axum::extract::FromRequest;

use crate::error::Error;

/// `Json` that rejects unreadable bodies with the crate's `{"error": ...}` 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
