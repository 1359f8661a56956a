use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{Meal, NutritionInfo},
    store::{MealChanges, NewMeal},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub point_cost: i64,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub restaurant_name: String,
    pub prep_time: String,
    pub nutrition_info: Option<NutritionInfo>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl From<CreateMealRequest> for NewMeal {
    fn from(req: CreateMealRequest) -> Self {
        NewMeal {
            name: req.name,
            description: req.description,
            image_url: req.image_url,
            point_cost: req.point_cost,
            category: req.category,
            tags: req.tags,
            restaurant_name: req.restaurant_name,
            prep_time: req.prep_time,
            nutrition_info: req.nutrition_info,
            allergens: req.allergens,
            is_available: req.is_available,
        }
    }
}

/// Partial update. Unknown fields such as `id` are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub point_cost: Option<i64>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub restaurant_name: Option<String>,
    pub prep_time: Option<String>,
    pub nutrition_info: Option<NutritionInfo>,
    pub allergens: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

impl From<UpdateMealRequest> for MealChanges {
    fn from(req: UpdateMealRequest) -> Self {
        MealChanges {
            name: req.name,
            description: req.description,
            image_url: req.image_url,
            point_cost: req.point_cost,
            category: req.category,
            tags: req.tags,
            restaurant_name: req.restaurant_name,
            prep_time: req.prep_time,
            nutrition_info: req.nutrition_info,
            allergens: req.allergens,
            is_available: req.is_available,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MealList {
    #[schema(value_type = Vec<Meal>)]
    pub items: Vec<Meal>,
}
