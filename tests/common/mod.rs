#![allow(dead_code)]

use campus_meals_api::{
    config::AppConfig,
    middleware::auth::AuthUser,
    state::AppState,
    store::{MemStore, NewMeal, NewUser},
};

pub fn test_config() -> AppConfig {
    AppConfig {
        seed_sample_data: false,
        ..AppConfig::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config())
}

pub fn new_meal(name: &str, point_cost: i64) -> NewMeal {
    NewMeal {
        name: name.to_string(),
        description: format!("{name} for testing"),
        image_url: "https://example.com/meal.jpg".to_string(),
        point_cost,
        category: "Lunch".to_string(),
        tags: vec!["Test".to_string()],
        restaurant_name: "Test Kitchen".to_string(),
        prep_time: "10 min".to_string(),
        nutrition_info: None,
        allergens: Vec::new(),
        is_available: true,
    }
}

pub async fn create_user(store: &MemStore, username: &str, points: i64, is_admin: bool) -> AuthUser {
    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            is_admin,
            points,
        })
        .await
        .expect("create user");

    AuthUser {
        user_id: user.id,
        is_admin,
        session_id: String::new(),
    }
}
