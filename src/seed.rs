use crate::{
    config::AppConfig,
    models::NutritionInfo,
    services::auth_service::hash_password,
    store::{MemStore, NewMeal, NewUser, StoreError},
};

const ADMIN_POINTS: i64 = 1000;

/// Inserts the admin account and the sample campus menu into a fresh store.
pub async fn seed_sample_data(store: &MemStore, config: &AppConfig) -> anyhow::Result<()> {
    let password_hash = hash_password(&config.admin_password)?;
    match store
        .create_user(NewUser {
            username: config.admin_username.clone(),
            password_hash,
            first_name: "Admin".into(),
            last_name: "User".into(),
            is_admin: true,
            points: ADMIN_POINTS,
        })
        .await
    {
        Ok(admin) => tracing::info!(user_id = admin.id, username = %admin.username, "seeded admin"),
        Err(StoreError::UsernameTaken) => {
            tracing::debug!(username = %config.admin_username, "admin already present")
        }
        Err(err) => return Err(err.into()),
    }

    let meals = sample_meals();
    let count = meals.len();
    for meal in meals {
        store.create_meal(meal).await;
    }
    tracing::info!(count, "seeded meals");

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn meal(
    name: &str,
    description: &str,
    image_url: &str,
    point_cost: i64,
    category: &str,
    tags: &[&str],
    restaurant_name: &str,
    prep_time: &str,
    (calories, protein, carbs, fat): (i32, i32, i32, i32),
    allergens: &[&str],
) -> NewMeal {
    NewMeal {
        name: name.into(),
        description: description.into(),
        image_url: image_url.into(),
        point_cost,
        category: category.into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        restaurant_name: restaurant_name.into(),
        prep_time: prep_time.into(),
        nutrition_info: Some(NutritionInfo {
            calories,
            protein,
            carbs,
            fat,
        }),
        allergens: allergens.iter().map(|a| a.to_string()).collect(),
        is_available: true,
    }
}

pub fn sample_meals() -> Vec<NewMeal> {
    vec![
        meal(
            "Paneer Tikka Bowl",
            "Grilled paneer cubes with bell peppers, onions, mint chutney over brown rice",
            "https://naturallynidhi.com/wp-content/uploads/2020/04/TandooriPaneerBowl_Cover.jpg",
            150,
            "Lunch",
            &["Vegetarian", "Gluten-Free", "Popular"],
            "Tandoori Express",
            "10-15 min",
            (410, 22, 35, 18),
            &["Milk"],
        ),
        meal(
            "Rajma Chawal Bowl",
            "Kidney beans cooked in a tomato-based curry served with brown basmati rice",
            "https://images.news18.com/webstories/uploads/2024/11/Screenshot-2024-11-15-at-11.13.15-PM-2024-11-d263b8d75f70dc81e4774f7721852dd4.png",
            100,
            "Lunch",
            &["Popular", "Gluten-Free", "Student Favorite"],
            "Spice Junction",
            "10-15 min",
            (390, 14, 55, 10),
            &["None"],
        ),
        meal(
            "Chole Quinoa Bowl",
            "Spiced chickpeas tossed with quinoa, cucumber, onion and lemon",
            "https://vegecravings.com/wp-content/uploads/2024/09/Quinoa-Chickpea-Salad-Recipe-Step-By-Step-Instructions-scaled.jpg.webp",
            150,
            "Breakfast",
            &["Salad", "High Protein", "Gluten-Free"],
            "Curry Bowl Co.",
            "10 min",
            (430, 20, 44, 14),
            &["None"],
        ),
        meal(
            "Margherita Pizza",
            "Traditional pizza with tomato sauce, fresh mozzarella, and basil",
            "https://images.unsplash.com/photo-1565299624946-b28f40a0ae38?ixlib=rb-1.2.1&auto=format&fit=crop&w=800&q=80",
            180,
            "Dinner",
            &["Italian", "Pizza"],
            "Pizza Corner",
            "20-25 min",
            (520, 22, 60, 26),
            &["Gluten", "Milk"],
        ),
        meal(
            "Tofu Bhurji Wrap",
            "Scrambled tofu with Indian spices in a whole wheat wrap",
            "https://cookingforpeanuts.com/wp-content/uploads/2022/07/Vegan-High-Protein-Tofu-Scramble-Breakfast-Burritos.jpg",
            140,
            "Breakfast",
            &["Vegan", "Healthy"],
            "Urban Dabba",
            "10 min",
            (360, 18, 38, 14),
            &["Gluten"],
        ),
        meal(
            "Palak Paneer Bowl",
            "Spinach curry with paneer cubes served over millet",
            "https://ministryofcurry.com/wp-content/uploads/2017/04/Instant-Pot-Palak-Paneer-SQ.jpg",
            160,
            "Dinner",
            &["Indian Style", "Bowl"],
            "The Green Bowl",
            "15-20 min",
            (450, 22, 30, 20),
            &["Milk"],
        ),
        meal(
            "Curd Rice Bowl",
            "Creamy yogurt rice tempered with mustard seeds, curry leaves & ginger",
            "https://thespicerackatlanta.com/wp-content/uploads/2021/09/curd-rice.jpg",
            120,
            "Dinner",
            &["Comfort Food", "Vegetarian", "Cool & Soothing"],
            "Southern Spoon",
            "10 min",
            (340, 9, 38, 14),
            &["Milk"],
        ),
        meal(
            "Vegetable Upma",
            "Semolina porridge with sautéed veggies and mustard seeds",
            "https://www.archanaskitchen.com//images/archanaskitchen/1-Author/Jyothi_Rajesh/Vegetable_Rice_Upma.jpg",
            100,
            "Breakfast",
            &["Vegetarian", "Healthy"],
            "Morning Stop",
            "5 min",
            (320, 8, 42, 10),
            &["Gluten"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::verify_password;

    #[tokio::test]
    async fn seeding_twice_keeps_a_single_admin() {
        let store = MemStore::new();
        let config = AppConfig::default();

        seed_sample_data(&store, &config).await.unwrap();
        seed_sample_data(&store, &config).await.unwrap();

        let users = store.list_users().await;
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin);
        assert!(verify_password(&config.admin_password, &users[0].password_hash).unwrap());
    }

    #[test]
    fn sample_menu_is_orderable() {
        let meals = sample_meals();
        assert_eq!(meals.len(), 8);
        assert!(meals.iter().all(|m| m.point_cost > 0 && m.is_available));
    }
}
