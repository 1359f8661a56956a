use crate::{
    audit::log_audit,
    dto::{
        admin::{AdjustPointsRequest, UpdateRoleRequest, UserList},
        orders::OrderList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::order_service::filter_and_page,
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let orders = state.store.all_orders().await;
    let (items, meta) = filter_and_page(orders, &query);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let items = state.store.list_users().await;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn update_user_role(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if id == user.user_id && !payload.is_admin {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin role".into(),
        ));
    }

    let updated = state.store.set_user_admin(id, payload.is_admin).await?;

    log_audit(
        Some(user.user_id),
        "user_role_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": id, "is_admin": payload.is_admin })),
    );

    Ok(ApiResponse::success("User updated", updated, None))
}

pub async fn adjust_user_points(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: AdjustPointsRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let updated = state.store.adjust_user_points(id, payload.delta).await?;

    log_audit(
        Some(user.user_id),
        "user_points_adjust",
        Some("users"),
        Some(serde_json::json!({ "user_id": id, "delta": payload.delta, "points": updated.points })),
    );

    Ok(ApiResponse::success("Points updated", updated, None))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }

    state.store.delete_user(id).await?;

    log_audit(
        Some(user.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    );

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        None,
    ))
}
