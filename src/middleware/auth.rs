use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
};

use crate::{config::AppConfig, error::AppError, state::AppState};

/// The logged-in user behind the request's session cookie. Role is read
/// from the store on every request, so role changes apply immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub is_admin: bool,
    pub session_id: String,
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Admins may act on any order, everyone else only on their own.
pub fn ensure_owner_or_admin(user: &AuthUser, owner_id: i64) -> Result<(), AppError> {
    if user.user_id != owner_id && !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from_headers(&parts.headers, &state.config.session_cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let user = state
            .store
            .session_user(&session_id)
            .await
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id: user.id,
            is_admin: user.is_admin,
            session_id,
        })
    }
}

pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(config: &AppConfig, session_id: &str) -> Result<HeaderValue, AppError> {
    let max_age = config.session_ttl().num_seconds();
    build_cookie(config, session_id, max_age)
}

pub fn clear_session_cookie(config: &AppConfig) -> Result<HeaderValue, AppError> {
    build_cookie(config, "", 0)
}

fn build_cookie(config: &AppConfig, value: &str, max_age: i64) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie_name, value, max_age
    );
    if config.session_cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid session cookie: {e}")))
}
