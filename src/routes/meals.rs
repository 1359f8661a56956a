use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::meals::{CreateMealRequest, MealList, UpdateMealRequest},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppPath, AppQuery},
        json::AppJson,
    },
    models::Meal,
    response::ApiResponse,
    routes::params::MealQuery,
    services::meal_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meals).post(create_meal))
        .route("/category/{category}", get(list_meals_by_category))
        .route(
            "/{id}",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

#[utoipa::path(
    get,
    path = "/api/meals",
    params(MealQuery),
    responses(
        (status = 200, description = "List meals", body = ApiResponse<MealList>)
    ),
    tag = "Meals"
)]
pub async fn list_meals(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<MealQuery>,
) -> AppResult<Json<ApiResponse<MealList>>> {
    let resp = meal_service::list_meals(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/meals/category/{category}",
    params(
        ("category" = String, Path, description = "Meal category, e.g. Lunch")
    ),
    responses(
        (status = 200, description = "Meals in one category", body = ApiResponse<MealList>)
    ),
    tag = "Meals"
)]
pub async fn list_meals_by_category(
    State(state): State<AppState>,
    AppPath(category): AppPath<String>,
) -> AppResult<Json<ApiResponse<MealList>>> {
    let resp = meal_service::list_by_category(&state, &category).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/meals/{id}",
    params(
        ("id" = i64, Path, description = "Meal ID")
    ),
    responses(
        (status = 200, description = "Get meal", body = ApiResponse<Meal>),
        (status = 404, description = "Meal not found"),
    ),
    tag = "Meals"
)]
pub async fn get_meal(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<Meal>>> {
    let resp = meal_service::get_meal(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/meals",
    request_body = CreateMealRequest,
    responses(
        (status = 201, description = "Create meal", body = ApiResponse<Meal>),
        (status = 400, description = "Invalid meal"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("session_cookie" = [])),
    tag = "Meals"
)]
pub async fn create_meal(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateMealRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Meal>>)> {
    let resp = meal_service::create_meal(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/meals/{id}",
    params(
        ("id" = i64, Path, description = "Meal ID")
    ),
    request_body = UpdateMealRequest,
    responses(
        (status = 200, description = "Updated meal", body = ApiResponse<Meal>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meal not found"),
    ),
    security(("session_cookie" = [])),
    tag = "Meals"
)]
pub async fn update_meal(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateMealRequest>,
) -> AppResult<Json<ApiResponse<Meal>>> {
    let resp = meal_service::update_meal(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/meals/{id}",
    params(
        ("id" = i64, Path, description = "Meal ID")
    ),
    responses(
        (status = 200, description = "Deleted meal"),
        (status = 400, description = "Meal is referenced by existing orders"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Meal not found"),
    ),
    security(("session_cookie" = [])),
    tag = "Meals"
)]
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = meal_service::delete_meal(&state, &user, id).await?;
    Ok(Json(resp))
}
