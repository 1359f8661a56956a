use std::str::FromStr;

use crate::{
    audit::log_audit,
    dto::orders::{OrderLineList, OrderList, PlaceOrderRequest, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{Order, OrderReceipt, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    store::NewOrder,
};

/// Places an order from the caller's cart. An empty cart or a balance below
/// the cart total is a 400 and leaves both untouched.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderReceipt>> {
    let pickup_time = payload.pickup_time.trim().to_string();
    if pickup_time.is_empty() {
        return Err(AppError::BadRequest("Invalid order data".into()));
    }
    let special_instructions = payload
        .special_instructions
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let receipt = state
        .store
        .place_order(
            user.user_id,
            NewOrder {
                pickup_time,
                special_instructions,
            },
        )
        .await?;

    log_audit(
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": receipt.order.id,
            "total_points": receipt.order.total_points,
        })),
    );

    Ok(ApiResponse::success("Order placed", receipt, None))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let orders = state.store.orders_for_user(user.user_id).await;
    let (items, meta) = filter_and_page(orders, &query);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Order>> {
    let order = find_visible_order(state, user, id).await?;
    Ok(ApiResponse::success("OK", order, None))
}

pub async fn get_order_items(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<OrderLineList>> {
    let order = find_visible_order(state, user, id).await?;
    let items = state.store.order_items(order.id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", OrderLineList { items }, Some(meta)))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let status = OrderStatus::from_str(payload.status.trim())
        .map_err(|_| AppError::BadRequest("Invalid status".into()))?;

    let order = state.store.update_order_status(id, status).await?;

    log_audit(
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    );

    Ok(ApiResponse::success("Order updated", order, None))
}

/// Applies the status filter, sort direction and page window. Input is
/// expected newest first.
pub(crate) fn filter_and_page(orders: Vec<Order>, query: &OrderListQuery) -> (Vec<Order>, Meta) {
    let mut orders: Vec<Order> = match query.status {
        Some(status) => orders
            .into_iter()
            .filter(|order| order.status == status)
            .collect(),
        None => orders,
    };
    if let Some(SortOrder::Asc) = query.sort_order {
        orders.reverse();
    }
    query.pagination().apply(orders)
}

async fn find_visible_order(state: &AppState, user: &AuthUser, id: i64) -> AppResult<Order> {
    let order = state
        .store
        .get_order(id)
        .await
        .ok_or(AppError::NotFound("Order"))?;
    ensure_owner_or_admin(user, order.user_id)?;
    Ok(order)
}
