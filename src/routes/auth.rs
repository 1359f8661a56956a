use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppResult,
    middleware::{
        auth::{AuthUser, clear_session_cookie, session_cookie, session_id_from_headers},
        json::AppJson,
    },
    models::User,
    response::ApiResponse,
    services::auth_service::{current_user as load_current_user, login_user, logout_user, register_user},
    state::AppState,
};

type WithCookie<T> = (StatusCode, [(header::HeaderName, HeaderValue); 1], Json<ApiResponse<T>>);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and logged in", body = ApiResponse<User>),
        (status = 400, description = "Username already exists or invalid input")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<WithCookie<User>> {
    let (resp, session) = register_user(&state, payload).await?;
    let cookie = session_cookie(&state.config, &session.id)?;
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<User>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<WithCookie<User>> {
    let (resp, session) = login_user(&state, payload).await?;
    let cookie = session_cookie(&state.config, &session.id)?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Session destroyed and cookie cleared")
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<WithCookie<()>> {
    let session_id = session_id_from_headers(&headers, &state.config.session_cookie_name);
    let resp = logout_user(&state, session_id.as_deref()).await;
    let cookie = clear_session_cookie(&state.config)?;
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = load_current_user(&state, &user).await?;
    Ok(Json(resp))
}
