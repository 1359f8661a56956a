use axum::extract::FromRequestParts;

use crate::error::AppError;

/// `axum::extract::Path` with rejections rendered as a 400 `{message}` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// `axum::extract::Query` with rejections rendered as a 400 `{message}` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
