mod common;

use campus_meals_api::{
    dto::{
        admin::AdjustPointsRequest,
        cart::{AddToCartRequest, UpdateCartItemRequest},
        meals::UpdateMealRequest,
        orders::{PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    error::AppError,
    models::OrderStatus,
    routes::params::{MealQuery, MealSortBy, OrderListQuery, SortOrder},
    services::{
        admin_service, cart_service, meal_service, meal_service::MAX_POINT_COST, order_service,
    },
};

use common::{create_user, new_meal, test_state};

fn order_request() -> PlaceOrderRequest {
    PlaceOrderRequest {
        pickup_time: "12:30".into(),
        special_instructions: Some("  extra napkins ".into()),
    }
}

// Student fills a cart, places an order, and an admin moves it along.
#[tokio::test]
async fn cart_to_order_to_ready_flow() -> anyhow::Result<()> {
    let state = test_state();
    let student = create_user(&state.store, "student", 500, false).await;
    let admin = create_user(&state.store, "admin", 1000, true).await;
    let bowl = state.store.create_meal(new_meal("Bowl", 150)).await;
    let wrap = state.store.create_meal(new_meal("Wrap", 120)).await;

    cart_service::add_to_cart(
        &state,
        &student,
        AddToCartRequest {
            meal_id: bowl.id,
            quantity: 2,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &student,
        AddToCartRequest {
            meal_id: wrap.id,
            quantity: 1,
        },
    )
    .await?;

    let cart = cart_service::get_cart(&state, &student).await?.data.unwrap();
    assert_eq!(cart.total_points, 420);

    let receipt = order_service::place_order(&state, &student, order_request())
        .await?
        .data
        .unwrap();
    assert_eq!(receipt.order.total_points, 420);
    assert_eq!(receipt.order.status, OrderStatus::Pending);
    assert_eq!(
        receipt.order.special_instructions.as_deref(),
        Some("extra napkins")
    );
    assert_eq!(receipt.items.len(), 2);

    let after = state.store.get_user(student.user_id).await.unwrap();
    assert_eq!(after.points, 80);
    let cart = cart_service::get_cart(&state, &student).await?.data.unwrap();
    assert!(cart.items.is_empty());

    let lines = order_service::get_order_items(&state, &student, receipt.order.id)
        .await?
        .data
        .unwrap();
    let summed: i64 = lines
        .items
        .iter()
        .map(|line| line.item.point_cost * i64::from(line.item.quantity))
        .sum();
    assert_eq!(summed, receipt.order.total_points);

    let updated = order_service::update_order_status(
        &state,
        &admin,
        receipt.order.id,
        UpdateOrderStatusRequest {
            status: "ready".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.status, OrderStatus::Ready);

    let bad = order_service::update_order_status(
        &state,
        &admin,
        receipt.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await;
    assert!(matches!(bad, Err(AppError::BadRequest(msg)) if msg == "Invalid status"));

    let forbidden = order_service::update_order_status(
        &state,
        &student,
        receipt.order.id,
        UpdateOrderStatusRequest {
            status: "completed".into(),
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    Ok(())
}

#[tokio::test]
async fn order_beyond_balance_is_rejected_without_side_effects() -> anyhow::Result<()> {
    let state = test_state();
    let student = create_user(&state.store, "student", 200, false).await;
    let paneer = state.store.create_meal(new_meal("Paneer Tikka Bowl", 150)).await;
    let rajma = state.store.create_meal(new_meal("Rajma Chawal Bowl", 100)).await;

    for meal_id in [paneer.id, rajma.id] {
        cart_service::add_to_cart(&state, &student, AddToCartRequest { meal_id, quantity: 1 })
            .await?;
    }

    let err = order_service::place_order(&state, &student, order_request())
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg == "Not enough points"));

    assert_eq!(state.store.get_user(student.user_id).await.unwrap().points, 200);
    let cart = cart_service::get_cart(&state, &student).await?.data.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert!(state.store.orders_for_user(student.user_id).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn invalid_order_and_cart_input_is_rejected() -> anyhow::Result<()> {
    let state = test_state();
    let student = create_user(&state.store, "student", 500, false).await;
    let meal = state.store.create_meal(new_meal("Bowl", 100)).await;

    let empty = order_service::place_order(&state, &student, order_request()).await;
    assert!(matches!(empty, Err(AppError::BadRequest(msg)) if msg == "Cart is empty"));

    let no_pickup = order_service::place_order(
        &state,
        &student,
        PlaceOrderRequest {
            pickup_time: "   ".into(),
            special_instructions: None,
        },
    )
    .await;
    assert!(matches!(no_pickup, Err(AppError::BadRequest(msg)) if msg == "Invalid order data"));

    for quantity in [0, 11, -1] {
        let res = cart_service::add_to_cart(
            &state,
            &student,
            AddToCartRequest {
                meal_id: meal.id,
                quantity,
            },
        )
        .await;
        assert!(matches!(res, Err(AppError::BadRequest(msg)) if msg == "Invalid input"));
    }

    let missing = cart_service::add_to_cart(
        &state,
        &student,
        AddToCartRequest {
            meal_id: 999,
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound("Meal"))));

    let item = cart_service::add_to_cart(
        &state,
        &student,
        AddToCartRequest {
            meal_id: meal.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .unwrap();
    let too_many = cart_service::update_cart_item(
        &state,
        &student,
        item.id,
        UpdateCartItemRequest { quantity: 11 },
    )
    .await;
    assert!(matches!(too_many, Err(AppError::BadRequest(msg)) if msg == "Invalid quantity"));

    let updated = cart_service::update_cart_item(
        &state,
        &student,
        item.id,
        UpdateCartItemRequest { quantity: 4 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.quantity, 4);

    Ok(())
}

#[tokio::test]
async fn other_users_resources_are_hidden() -> anyhow::Result<()> {
    let state = test_state();
    let alice = create_user(&state.store, "alice", 500, false).await;
    let bob = create_user(&state.store, "bob", 500, false).await;
    let admin = create_user(&state.store, "admin", 500, true).await;
    let meal = state.store.create_meal(new_meal("Bowl", 100)).await;

    let item = cart_service::add_to_cart(
        &state,
        &alice,
        AddToCartRequest {
            meal_id: meal.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .unwrap();

    let foreign_update = cart_service::update_cart_item(
        &state,
        &bob,
        item.id,
        UpdateCartItemRequest { quantity: 2 },
    )
    .await;
    assert!(matches!(foreign_update, Err(AppError::NotFound("Cart item"))));
    let foreign_remove = cart_service::remove_from_cart(&state, &bob, item.id).await;
    assert!(matches!(foreign_remove, Err(AppError::NotFound("Cart item"))));

    let receipt = order_service::place_order(&state, &alice, order_request())
        .await?
        .data
        .unwrap();

    let peek = order_service::get_order(&state, &bob, receipt.order.id).await;
    assert!(matches!(peek, Err(AppError::Forbidden)));
    let peek_items = order_service::get_order_items(&state, &bob, receipt.order.id).await;
    assert!(matches!(peek_items, Err(AppError::Forbidden)));

    let as_admin = order_service::get_order(&state, &admin, receipt.order.id).await?;
    assert_eq!(as_admin.data.unwrap().user_id, alice.user_id);

    let missing = order_service::get_order(&state, &alice, 999).await;
    assert!(matches!(missing, Err(AppError::NotFound("Order"))));

    let bobs_orders = order_service::list_orders(&state, &bob, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(bobs_orders.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn meal_price_change_keeps_order_snapshot() -> anyhow::Result<()> {
    let state = test_state();
    let student = create_user(&state.store, "student", 500, false).await;
    let admin = create_user(&state.store, "admin", 500, true).await;
    let meal = state.store.create_meal(new_meal("Bowl", 150)).await;

    cart_service::add_to_cart(
        &state,
        &student,
        AddToCartRequest {
            meal_id: meal.id,
            quantity: 2,
        },
    )
    .await?;
    let receipt = order_service::place_order(&state, &student, order_request())
        .await?
        .data
        .unwrap();

    meal_service::update_meal(
        &state,
        &admin,
        meal.id,
        UpdateMealRequest {
            point_cost: Some(175),
            ..UpdateMealRequest::default()
        },
    )
    .await?;

    let lines = order_service::get_order_items(&state, &student, receipt.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(lines.items[0].item.point_cost, 150);
    assert_eq!(lines.items[0].meal.point_cost, 175);

    let order = order_service::get_order(&state, &student, receipt.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(order.total_points, 300);

    let referenced = meal_service::delete_meal(&state, &admin, meal.id).await;
    assert!(matches!(referenced, Err(AppError::BadRequest(_))));

    let rejected = meal_service::update_meal(
        &state,
        &admin,
        meal.id,
        UpdateMealRequest {
            point_cost: Some(0),
            ..UpdateMealRequest::default()
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn meal_listing_filters_sorts_and_pages() -> anyhow::Result<()> {
    let state = test_state();
    let mut salad = new_meal("Green Salad", 90);
    salad.category = "Dinner".into();
    salad.tags = vec!["Vegetarian".into()];
    state.store.create_meal(salad).await;
    state.store.create_meal(new_meal("Bowl", 150)).await;
    let mut wrap = new_meal("Wrap", 120);
    wrap.is_available = false;
    state.store.create_meal(wrap).await;

    let lunch_by_cost = meal_service::list_meals(
        &state,
        MealQuery {
            category: Some("Lunch".into()),
            sort_by: Some(MealSortBy::PointCost),
            sort_order: Some(SortOrder::Desc),
            ..MealQuery::default()
        },
    )
    .await?;
    let names: Vec<String> = lunch_by_cost
        .data
        .unwrap()
        .items
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Bowl".to_string(), "Wrap".to_string()]);

    let available = meal_service::list_meals(
        &state,
        MealQuery {
            available: Some(true),
            ..MealQuery::default()
        },
    )
    .await?;
    assert_eq!(available.meta.unwrap().total, Some(2));

    let search = meal_service::list_meals(
        &state,
        MealQuery {
            q: Some("vegetarian".into()),
            ..MealQuery::default()
        },
    )
    .await?;
    let found = search.data.unwrap().items;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Green Salad");

    let paged = meal_service::list_meals(
        &state,
        MealQuery {
            page: Some(2),
            per_page: Some(2),
            ..MealQuery::default()
        },
    )
    .await?;
    assert_eq!(paged.data.unwrap().items.len(), 1);
    let meta = paged.meta.unwrap();
    assert_eq!((meta.page, meta.per_page, meta.total), (Some(2), Some(2), Some(3)));

    let dinner = meal_service::list_by_category(&state, "Dinner").await?;
    assert_eq!(dinner.data.unwrap().items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn admin_manages_points_and_users() -> anyhow::Result<()> {
    let state = test_state();
    let admin = create_user(&state.store, "admin", 1000, true).await;
    let student = create_user(&state.store, "student", 100, false).await;

    let topped_up = admin_service::adjust_user_points(
        &state,
        &admin,
        student.user_id,
        AdjustPointsRequest { delta: 250 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(topped_up.points, 350);

    let overdraw = admin_service::adjust_user_points(
        &state,
        &admin,
        student.user_id,
        AdjustPointsRequest { delta: -1000 },
    )
    .await;
    assert!(matches!(overdraw, Err(AppError::BadRequest(_))));

    let zero = admin_service::adjust_user_points(
        &state,
        &admin,
        student.user_id,
        AdjustPointsRequest { delta: 0 },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let not_admin = admin_service::list_users(&state, &student).await;
    assert!(matches!(not_admin, Err(AppError::Forbidden)));

    let self_delete = admin_service::delete_user(&state, &admin, admin.user_id).await;
    assert!(matches!(self_delete, Err(AppError::BadRequest(_))));

    admin_service::delete_user(&state, &admin, student.user_id).await?;
    let users = admin_service::list_users(&state, &admin).await?.data.unwrap();
    assert_eq!(users.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn meal_price_is_bounded() -> anyhow::Result<()> {
    let state = test_state();
    let admin = create_user(&state.store, "admin", 500, true).await;
    let meal = state.store.create_meal(new_meal("Bowl", 150)).await;

    let too_expensive = meal_service::update_meal(
        &state,
        &admin,
        meal.id,
        UpdateMealRequest {
            point_cost: Some(MAX_POINT_COST + 1),
            ..UpdateMealRequest::default()
        },
    )
    .await;
    assert!(matches!(too_expensive, Err(AppError::BadRequest(_))));

    let at_limit = meal_service::update_meal(
        &state,
        &admin,
        meal.id,
        UpdateMealRequest {
            point_cost: Some(MAX_POINT_COST),
            ..UpdateMealRequest::default()
        },
    )
    .await?;
    assert_eq!(at_limit.data.unwrap().point_cost, MAX_POINT_COST);

    Ok(())
}
