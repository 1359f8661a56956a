use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::{
    audit::log_audit,
    dto::auth::{LoginRequest, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Session, User},
    response::ApiResponse,
    state::AppState,
    store::NewUser,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// Constant-time comparison against a PHC-formatted Argon2 hash.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<(ApiResponse<User>, Session)> {
    let RegisterRequest {
        username,
        password,
        first_name,
        last_name,
    } = payload;
    let username = username.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".into(),
        ));
    }
    if state.store.get_user_by_username(&username).await.is_some() {
        return Err(AppError::BadRequest("Username already exists".into()));
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .store
        .create_user(NewUser {
            username,
            password_hash,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            is_admin: false,
            points: state.config.starting_points,
        })
        .await?;

    let session = state
        .store
        .create_session(user.id, state.config.session_ttl())
        .await;

    log_audit(
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "username": user.username })),
    );

    Ok((ApiResponse::success("User created", user, None), session))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<(ApiResponse<User>, Session)> {
    let LoginRequest { username, password } = payload;
    let user = state
        .store
        .get_user_by_username(username.trim())
        .await
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let session = state
        .store
        .create_session(user.id, state.config.session_ttl())
        .await;

    log_audit(Some(user.id), "user_login", Some("sessions"), None);

    Ok((ApiResponse::success("Logged in", user, None), session))
}

pub async fn logout_user(state: &AppState, session_id: Option<&str>) -> ApiResponse<()> {
    if let Some(session_id) = session_id {
        if state.store.delete_session(session_id).await {
            log_audit(None, "user_logout", Some("sessions"), None);
        }
    }
    ApiResponse::message_only("Logged out")
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = state
        .store
        .get_user(user.user_id)
        .await
        .ok_or(AppError::Unauthorized)?;
    Ok(ApiResponse::success("OK", user, None))
}
