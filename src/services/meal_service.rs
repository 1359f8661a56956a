use std::cmp::Ordering;

use crate::{
    audit::log_audit,
    dto::meals::{CreateMealRequest, MealList, UpdateMealRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Meal,
    response::{ApiResponse, Meta},
    routes::params::{MealQuery, MealSortBy, SortOrder},
    state::AppState,
    store::NewMeal,
};

/// Upper bound on a meal price. Keeps any cart total far inside `i64`.
pub const MAX_POINT_COST: i64 = 100_000;

pub async fn list_meals(state: &AppState, query: MealQuery) -> AppResult<ApiResponse<MealList>> {
    let mut meals = state.store.list_meals().await;

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        meals.retain(|meal| &meal.category == category);
    }
    if let Some(search) = query.q.as_ref().map(|q| q.trim().to_lowercase()) {
        if !search.is_empty() {
            meals.retain(|meal| matches_search(meal, &search));
        }
    }
    if let Some(available) = query.available {
        meals.retain(|meal| meal.is_available == available);
    }

    let sort_by = query.sort_by.unwrap_or(MealSortBy::Id);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    meals.sort_by(|a, b| {
        let ord = compare_meals(a, b, sort_by);
        match sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let (items, meta) = query.pagination().apply(meals);
    Ok(ApiResponse::success("Meals", MealList { items }, Some(meta)))
}

pub async fn list_by_category(
    state: &AppState,
    category: &str,
) -> AppResult<ApiResponse<MealList>> {
    let items = state.store.meals_by_category(category).await;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Meals", MealList { items }, Some(meta)))
}

pub async fn get_meal(state: &AppState, id: i64) -> AppResult<ApiResponse<Meal>> {
    let meal = state
        .store
        .get_meal(id)
        .await
        .ok_or(AppError::NotFound("Meal"))?;
    Ok(ApiResponse::success("Meal", meal, None))
}

pub async fn create_meal(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMealRequest,
) -> AppResult<ApiResponse<Meal>> {
    ensure_admin(user)?;
    let new_meal: NewMeal = payload.into();
    validate_required(&[
        ("name", &new_meal.name),
        ("description", &new_meal.description),
        ("imageUrl", &new_meal.image_url),
        ("category", &new_meal.category),
        ("restaurantName", &new_meal.restaurant_name),
        ("prepTime", &new_meal.prep_time),
    ])?;
    validate_point_cost(new_meal.point_cost)?;

    let meal = state.store.create_meal(new_meal).await;

    log_audit(
        Some(user.user_id),
        "meal_create",
        Some("meals"),
        Some(serde_json::json!({ "meal_id": meal.id })),
    );

    Ok(ApiResponse::success("Meal created", meal, None))
}

pub async fn update_meal(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateMealRequest,
) -> AppResult<ApiResponse<Meal>> {
    ensure_admin(user)?;
    if let Some(point_cost) = payload.point_cost {
        validate_point_cost(point_cost)?;
    }
    let text_fields = [
        ("name", payload.name.as_ref()),
        ("description", payload.description.as_ref()),
        ("imageUrl", payload.image_url.as_ref()),
        ("category", payload.category.as_ref()),
        ("restaurantName", payload.restaurant_name.as_ref()),
        ("prepTime", payload.prep_time.as_ref()),
    ];
    let present: Vec<(&str, &String)> = text_fields
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect();
    validate_required(&present)?;

    let meal = state.store.update_meal(id, payload.into()).await?;

    log_audit(
        Some(user.user_id),
        "meal_update",
        Some("meals"),
        Some(serde_json::json!({ "meal_id": meal.id, "point_cost": meal.point_cost })),
    );

    Ok(ApiResponse::success("Updated", meal, None))
}

pub async fn delete_meal(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    state.store.delete_meal(id).await?;

    log_audit(
        Some(user.user_id),
        "meal_delete",
        Some("meals"),
        Some(serde_json::json!({ "meal_id": id })),
    );

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        None,
    ))
}

fn matches_search(meal: &Meal, needle: &str) -> bool {
    meal.name.to_lowercase().contains(needle)
        || meal.description.to_lowercase().contains(needle)
        || meal.restaurant_name.to_lowercase().contains(needle)
        || meal.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

fn compare_meals(a: &Meal, b: &Meal, sort_by: MealSortBy) -> Ordering {
    match sort_by {
        MealSortBy::Id => a.id.cmp(&b.id),
        MealSortBy::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id)),
        MealSortBy::PointCost => a.point_cost.cmp(&b.point_cost).then(a.id.cmp(&b.id)),
    }
}

fn validate_point_cost(point_cost: i64) -> Result<(), AppError> {
    if !(1..=MAX_POINT_COST).contains(&point_cost) {
        return Err(AppError::BadRequest(format!(
            "pointCost must be between 1 and {MAX_POINT_COST}"
        )));
    }
    Ok(())
}

fn validate_required(fields: &[(&str, &String)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(AppError::BadRequest(format!("{field} must not be empty"))),
        None => Ok(()),
    }
}
