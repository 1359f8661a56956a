use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render as a 400 `{message}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
