use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, CartView},
    response::ApiResponse,
    state::AppState,
    store::MAX_CART_QUANTITY,
};

fn quantity_in_range(quantity: i32) -> bool {
    (1..=MAX_CART_QUANTITY).contains(&quantity)
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let cart = state.store.cart_for_user(user.user_id).await?;
    Ok(ApiResponse::success("OK", cart, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if !quantity_in_range(payload.quantity) {
        return Err(AppError::BadRequest("Invalid input".into()));
    }

    let cart_item = state
        .store
        .add_to_cart(user.user_id, payload.meal_id, payload.quantity)
        .await?;

    log_audit(
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "meal_id": payload.meal_id,
            "quantity": payload.quantity,
            "line_quantity": cart_item.quantity,
        })),
    );

    Ok(ApiResponse::success("Added to cart", cart_item, None))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    item_id: i64,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if !quantity_in_range(payload.quantity) {
        return Err(AppError::BadRequest("Invalid quantity".into()));
    }
    ensure_own_item(state, user, item_id).await?;

    let cart_item = state
        .store
        .update_cart_item(item_id, payload.quantity)
        .await?;

    log_audit(
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": item_id, "quantity": payload.quantity })),
    );

    Ok(ApiResponse::success("Updated", cart_item, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    item_id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_own_item(state, user, item_id).await?;
    state.store.remove_cart_item(item_id).await?;

    log_audit(
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": item_id })),
    );

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        None,
    ))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.store.clear_cart(user.user_id).await;

    log_audit(Some(user.user_id), "cart_clear", Some("cart_items"), None);

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        None,
    ))
}

/// Cart item ids are global, so a foreign item looks exactly like a missing one.
async fn ensure_own_item(state: &AppState, user: &AuthUser, item_id: i64) -> AppResult<()> {
    let item = state
        .store
        .get_cart_item(item_id)
        .await
        .ok_or(AppError::NotFound("Cart item"))?;
    let cart = state.store.cart_for_user(user.user_id).await?;
    if item.cart_id != cart.cart.id {
        return Err(AppError::NotFound("Cart item"));
    }
    Ok(())
}
