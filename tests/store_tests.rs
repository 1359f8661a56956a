mod common;

use std::sync::Arc;

use campus_meals_api::{
    models::OrderStatus,
    store::{MAX_CART_QUANTITY, MealChanges, MemStore, NewOrder, StoreError},
};
use chrono::{Duration, Utc};

use common::{create_user, new_meal};

fn pickup() -> NewOrder {
    NewOrder {
        pickup_time: "12:30".to_string(),
        special_instructions: None,
    }
}

#[tokio::test]
async fn ids_are_sequential_per_table() {
    let store = MemStore::new();
    let a = store.create_meal(new_meal("A", 10)).await;
    let b = store.create_meal(new_meal("B", 20)).await;
    let user = create_user(&store, "alice", 100, false).await;

    assert_eq!((a.id, b.id), (1, 2));
    assert_eq!(user.user_id, 1);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let store = MemStore::new();
    create_user(&store, "alice", 100, false).await;

    let err = store
        .create_user(campus_meals_api::store::NewUser {
            username: "alice".into(),
            password_hash: "x".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            is_admin: false,
            points: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UsernameTaken));
}

#[tokio::test]
async fn cart_is_created_lazily_and_reused() {
    let store = MemStore::new();
    let first = store.cart_for_user(42).await.unwrap();
    let second = store.cart_for_user(42).await.unwrap();

    assert_eq!(first.cart.id, second.cart.id);
    assert_eq!(first.cart.user_id, 42);
    assert!(first.items.is_empty());
    assert_eq!(first.total_points, 0);
}

#[tokio::test]
async fn adding_same_meal_twice_merges_lines() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let meal = store.create_meal(new_meal("Bowl", 100)).await;

    let first = store.add_to_cart(user.user_id, meal.id, 3).await.unwrap();
    let second = store.add_to_cart(user.user_id, meal.id, 4).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 7);

    let cart = store.cart_for_user(user.user_id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total_points, 700);
}

#[tokio::test]
async fn merged_quantity_is_capped() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let meal = store.create_meal(new_meal("Bowl", 100)).await;

    store.add_to_cart(user.user_id, meal.id, 8).await.unwrap();
    let merged = store.add_to_cart(user.user_id, meal.id, 5).await.unwrap();

    assert_eq!(merged.quantity, MAX_CART_QUANTITY);
}

#[tokio::test]
async fn unknown_or_unavailable_meal_cannot_be_added() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let meal = store.create_meal(new_meal("Bowl", 100)).await;
    store
        .update_meal(
            meal.id,
            MealChanges {
                is_available: Some(false),
                ..MealChanges::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        store.add_to_cart(user.user_id, 99, 1).await,
        Err(StoreError::NotFound("Meal"))
    ));
    assert!(matches!(
        store.add_to_cart(user.user_id, meal.id, 1).await,
        Err(StoreError::MealUnavailable)
    ));
}

#[tokio::test]
async fn order_total_matches_item_snapshots() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let bowl = store.create_meal(new_meal("Bowl", 150)).await;
    let wrap = store.create_meal(new_meal("Wrap", 120)).await;
    store.add_to_cart(user.user_id, bowl.id, 2).await.unwrap();
    store.add_to_cart(user.user_id, wrap.id, 1).await.unwrap();

    let receipt = store.place_order(user.user_id, pickup()).await.unwrap();

    let summed: i64 = receipt
        .items
        .iter()
        .map(|item| item.point_cost * i64::from(item.quantity))
        .sum();
    assert_eq!(receipt.order.total_points, 420);
    assert_eq!(receipt.order.total_points, summed);
    assert_eq!(receipt.order.status, OrderStatus::Pending);

    let user_after = store.get_user(user.user_id).await.unwrap();
    assert_eq!(user_after.points, 580);
    assert!(store.cart_for_user(user.user_id).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn insufficient_points_leaves_state_untouched() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 200, false).await;
    let paneer = store.create_meal(new_meal("Paneer Tikka Bowl", 150)).await;
    let rajma = store.create_meal(new_meal("Rajma Chawal Bowl", 100)).await;
    store.add_to_cart(user.user_id, paneer.id, 1).await.unwrap();
    store.add_to_cart(user.user_id, rajma.id, 1).await.unwrap();

    let err = store.place_order(user.user_id, pickup()).await.unwrap_err();
    assert!(matches!(err, StoreError::InsufficientPoints));
    assert_eq!(err.to_string(), "Not enough points");

    assert_eq!(store.get_user(user.user_id).await.unwrap().points, 200);
    assert_eq!(store.cart_for_user(user.user_id).await.unwrap().items.len(), 2);
    assert!(store.all_orders().await.is_empty());
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 200, false).await;

    let err = store.place_order(user.user_id, pickup()).await.unwrap_err();
    assert!(matches!(err, StoreError::EmptyCart));
}

#[tokio::test]
async fn order_for_missing_user_is_a_dangling_reference() {
    let store = MemStore::new();
    let err = store.place_order(7, pickup()).await.unwrap_err();
    assert!(matches!(err, StoreError::Dangling { entity: "user", id: 7, .. }));
}

#[tokio::test]
async fn price_change_does_not_rewrite_history() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let meal = store.create_meal(new_meal("Bowl", 150)).await;
    store.add_to_cart(user.user_id, meal.id, 2).await.unwrap();
    let receipt = store.place_order(user.user_id, pickup()).await.unwrap();

    store
        .update_meal(
            meal.id,
            MealChanges {
                point_cost: Some(400),
                ..MealChanges::default()
            },
        )
        .await
        .unwrap();

    let lines = store.order_items(receipt.order.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item.point_cost, 150);
    assert_eq!(lines[0].meal.point_cost, 400);
    assert_eq!(store.get_order(receipt.order.id).await.unwrap().total_points, 300);
}

#[tokio::test]
async fn meal_delete_respects_order_history() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let ordered = store.create_meal(new_meal("Ordered", 100)).await;
    let carted = store.create_meal(new_meal("Carted", 100)).await;
    let unused = store.create_meal(new_meal("Unused", 100)).await;

    store.add_to_cart(user.user_id, ordered.id, 1).await.unwrap();
    store.place_order(user.user_id, pickup()).await.unwrap();
    store.add_to_cart(user.user_id, carted.id, 1).await.unwrap();

    assert!(store.delete_meal(unused.id).await.is_ok());
    assert!(matches!(
        store.delete_meal(ordered.id).await,
        Err(StoreError::MealInUse)
    ));

    store.delete_meal(carted.id).await.unwrap();
    assert!(store.cart_for_user(user.user_id).await.unwrap().items.is_empty());
    assert!(matches!(
        store.delete_meal(unused.id).await,
        Err(StoreError::NotFound("Meal"))
    ));
}

#[tokio::test]
async fn orders_are_listed_newest_first() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 1000, false).await;
    let other = create_user(&store, "bob", 1000, false).await;
    let meal = store.create_meal(new_meal("Bowl", 10)).await;

    let mut placed = Vec::new();
    for buyer in [&user, &other, &user] {
        store.add_to_cart(buyer.user_id, meal.id, 1).await.unwrap();
        placed.push(store.place_order(buyer.user_id, pickup()).await.unwrap().order.id);
    }

    let mine: Vec<i64> = store
        .orders_for_user(user.user_id)
        .await
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(mine, vec![placed[2], placed[0]]);
    assert_eq!(store.all_orders().await.len(), 3);
}

#[tokio::test]
async fn points_adjustment_never_goes_negative() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 100, false).await;

    let topped_up = store.adjust_user_points(user.user_id, 50).await.unwrap();
    assert_eq!(topped_up.points, 150);
    assert!(matches!(
        store.adjust_user_points(user.user_id, -151).await,
        Err(StoreError::InsufficientPoints)
    ));
    assert_eq!(store.get_user(user.user_id).await.unwrap().points, 150);
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_purged() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 100, false).await;

    let live = store.create_session(user.user_id, Duration::hours(1)).await;
    let stale = store.create_session(user.user_id, Duration::seconds(-1)).await;

    assert_eq!(
        store.session_user(&live.id).await.map(|u| u.id),
        Some(user.user_id)
    );
    assert!(store.session_user(&stale.id).await.is_none());

    let removed = store
        .purge_expired_sessions(Utc::now() + Duration::hours(2))
        .await;
    assert_eq!(removed, 1);
    assert!(store.session_user(&live.id).await.is_none());
}

#[tokio::test]
async fn deleting_user_drops_cart_and_sessions() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 100, false).await;
    let meal = store.create_meal(new_meal("Bowl", 10)).await;
    let item = store.add_to_cart(user.user_id, meal.id, 1).await.unwrap();
    let session = store.create_session(user.user_id, Duration::hours(1)).await;

    store.delete_user(user.user_id).await.unwrap();

    assert!(store.get_user(user.user_id).await.is_none());
    assert!(store.get_cart_item(item.id).await.is_none());
    assert!(store.session_user(&session.id).await.is_none());
    assert!(matches!(
        store.delete_user(user.user_id).await,
        Err(StoreError::NotFound("User"))
    ));
}

#[tokio::test]
async fn overflowing_point_total_is_rejected() {
    let store = MemStore::new();
    let user = create_user(&store, "alice", 100, false).await;
    let meal = store.create_meal(new_meal("Gold Plated Bowl", i64::MAX)).await;
    store.add_to_cart(user.user_id, meal.id, 2).await.unwrap();

    assert!(matches!(
        store.cart_for_user(user.user_id).await,
        Err(StoreError::PointsOverflow)
    ));
    let err = store.place_order(user.user_id, pickup()).await.unwrap_err();
    assert!(matches!(err, StoreError::PointsOverflow));

    assert_eq!(store.get_user(user.user_id).await.unwrap().points, 100);
    assert!(store.get_cart_item(1).await.is_some());
    assert!(store.all_orders().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_orders_spend_the_cart_once() {
    let store = Arc::new(MemStore::new());
    let user = create_user(&store, "alice", 500, false).await;
    let meal = store.create_meal(new_meal("Bowl", 150)).await;
    store.add_to_cart(user.user_id, meal.id, 2).await.unwrap();
    let user_id = user.user_id;

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.place_order(user_id, pickup()).await }
    });
    let second = tokio::spawn({
        let store = store.clone();
        async move { store.place_order(user_id, pickup()).await }
    });
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(StoreError::EmptyCart)))
    );
    assert_eq!(store.get_user(user.user_id).await.unwrap().points, 200);
    assert_eq!(store.orders_for_user(user.user_id).await.len(), 1);
}
