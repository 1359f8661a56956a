use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Cart, CartItem, CartLine, CartView, Meal, NutritionInfo, Order, OrderItem, OrderLine,
    OrderReceipt, OrderStatus, Session, User,
};

/// Largest quantity a single cart line may hold.
pub const MAX_CART_QUANTITY: i32 = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Not enough points")]
    InsufficientPoints,

    #[error("Meal is not available")]
    MealUnavailable,

    #[error("Meal is referenced by existing orders")]
    MealInUse,

    #[error("Point total out of range")]
    PointsOverflow,

    #[error("{entity} {id} referenced by {owner} does not exist")]
    Dangling {
        entity: &'static str,
        id: i64,
        owner: String,
    },
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub points: i64,
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub point_cost: i64,
    pub category: String,
    pub tags: Vec<String>,
    pub restaurant_name: String,
    pub prep_time: String,
    pub nutrition_info: Option<NutritionInfo>,
    pub allergens: Vec<String>,
    pub is_available: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MealChanges {
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

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub pickup_time: String,
    pub special_instructions: Option<String>,
}

#[derive(Debug)]
struct Sequence(i64);

impl Default for Sequence {
    fn default() -> Self {
        Sequence(1)
    }
}

impl Sequence {
    fn next(&mut self) -> i64 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

#[derive(Debug, Default)]
struct Sequences {
    user: Sequence,
    meal: Sequence,
    cart: Sequence,
    cart_item: Sequence,
    order: Sequence,
    order_item: Sequence,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    meals: BTreeMap<i64, Meal>,
    carts: BTreeMap<i64, Cart>,
    cart_items: BTreeMap<i64, CartItem>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    sessions: HashMap<String, Session>,
    seq: Sequences,
}

impl Tables {
    fn cart_id_of(&self, user_id: i64) -> Option<i64> {
        self.carts
            .values()
            .find(|cart| cart.user_id == user_id)
            .map(|cart| cart.id)
    }

    fn ensure_cart(&mut self, user_id: i64) -> Cart {
        if let Some(cart) = self.carts.values().find(|cart| cart.user_id == user_id) {
            return cart.clone();
        }
        let cart = Cart {
            id: self.seq.cart.next(),
            user_id,
        };
        self.carts.insert(cart.id, cart.clone());
        cart
    }

    fn cart_lines(&self, cart_id: i64) -> Result<Vec<CartLine>, StoreError> {
        self.cart_items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| {
                let meal = self.meals.get(&item.meal_id).ok_or_else(|| StoreError::Dangling {
                    entity: "meal",
                    id: item.meal_id,
                    owner: format!("cart item {}", item.id),
                })?;
                Ok(CartLine {
                    item: item.clone(),
                    meal: meal.clone(),
                })
            })
            .collect()
    }

    fn cart_view(&self, cart: Cart) -> Result<CartView, StoreError> {
        let items = self.cart_lines(cart.id)?;
        let total_points = lines_total(&items)?;
        Ok(CartView {
            cart,
            items,
            total_points,
        })
    }

    fn clear_cart_items(&mut self, cart_id: i64) {
        self.cart_items.retain(|_, item| item.cart_id != cart_id);
    }
}

/// Volatile entity store shared by every request. Each method holds the lock
/// for its whole body, so a single call is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Users

    pub async fn get_user(&self, id: i64) -> Option<User> {
        self.tables.read().await.users.get(&id).cloned()
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.tables.read().await.users.values().cloned().collect()
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(StoreError::UsernameTaken);
        }

        let user = User {
            id: tables.seq.user.next(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            is_admin: new_user.is_admin,
            points: new_user.points,
        };
        tables.users.insert(user.id, user.clone());
        tables.ensure_cart(user.id);
        Ok(user)
    }

    pub async fn set_user_admin(&self, id: i64, is_admin: bool) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(StoreError::NotFound("User"))?;
        user.is_admin = is_admin;
        Ok(user.clone())
    }

    /// Adds `delta` to the balance. The balance never drops below zero.
    pub async fn adjust_user_points(&self, id: i64, delta: i64) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(StoreError::NotFound("User"))?;
        let points = user
            .points
            .checked_add(delta)
            .filter(|points| *points >= 0)
            .ok_or(StoreError::InsufficientPoints)?;
        user.points = points;
        Ok(user.clone())
    }

    /// Removes the user together with their cart and sessions. Placed orders
    /// stay as history.
    pub async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(StoreError::NotFound("User"));
        }
        if let Some(cart_id) = tables.cart_id_of(id) {
            tables.clear_cart_items(cart_id);
            tables.carts.remove(&cart_id);
        }
        tables.sessions.retain(|_, session| session.user_id != id);
        Ok(())
    }

    // Meals

    pub async fn list_meals(&self) -> Vec<Meal> {
        self.tables.read().await.meals.values().cloned().collect()
    }

    pub async fn get_meal(&self, id: i64) -> Option<Meal> {
        self.tables.read().await.meals.get(&id).cloned()
    }

    pub async fn meals_by_category(&self, category: &str) -> Vec<Meal> {
        self.tables
            .read()
            .await
            .meals
            .values()
            .filter(|meal| meal.category == category)
            .cloned()
            .collect()
    }

    pub async fn create_meal(&self, new_meal: NewMeal) -> Meal {
        let mut tables = self.tables.write().await;
        let meal = Meal {
            id: tables.seq.meal.next(),
            name: new_meal.name,
            description: new_meal.description,
            image_url: new_meal.image_url,
            point_cost: new_meal.point_cost,
            category: new_meal.category,
            tags: new_meal.tags,
            restaurant_name: new_meal.restaurant_name,
            prep_time: new_meal.prep_time,
            nutrition_info: new_meal.nutrition_info,
            allergens: new_meal.allergens,
            is_available: new_meal.is_available,
        };
        tables.meals.insert(meal.id, meal.clone());
        meal
    }

    /// Price changes only affect carts and future orders; order items keep
    /// their own snapshot.
    pub async fn update_meal(&self, id: i64, changes: MealChanges) -> Result<Meal, StoreError> {
        let mut tables = self.tables.write().await;
        let meal = tables
            .meals
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Meal"))?;

        if let Some(name) = changes.name {
            meal.name = name;
        }
        if let Some(description) = changes.description {
            meal.description = description;
        }
        if let Some(image_url) = changes.image_url {
            meal.image_url = image_url;
        }
        if let Some(point_cost) = changes.point_cost {
            meal.point_cost = point_cost;
        }
        if let Some(category) = changes.category {
            meal.category = category;
        }
        if let Some(tags) = changes.tags {
            meal.tags = tags;
        }
        if let Some(restaurant_name) = changes.restaurant_name {
            meal.restaurant_name = restaurant_name;
        }
        if let Some(prep_time) = changes.prep_time {
            meal.prep_time = prep_time;
        }
        if let Some(nutrition_info) = changes.nutrition_info {
            meal.nutrition_info = Some(nutrition_info);
        }
        if let Some(allergens) = changes.allergens {
            meal.allergens = allergens;
        }
        if let Some(is_available) = changes.is_available {
            meal.is_available = is_available;
        }

        Ok(meal.clone())
    }

    /// Deletes a meal and any cart lines pointing at it. Meals that appear in
    /// placed orders are kept so order history stays resolvable.
    pub async fn delete_meal(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.meals.contains_key(&id) {
            return Err(StoreError::NotFound("Meal"));
        }
        if tables.order_items.values().any(|item| item.meal_id == id) {
            return Err(StoreError::MealInUse);
        }
        tables.cart_items.retain(|_, item| item.meal_id != id);
        tables.meals.remove(&id);
        Ok(())
    }

    // Carts

    /// Returns the user's cart joined with meal data, creating the cart on
    /// first access.
    pub async fn cart_for_user(&self, user_id: i64) -> Result<CartView, StoreError> {
        let mut tables = self.tables.write().await;
        let cart = tables.ensure_cart(user_id);
        tables.cart_view(cart)
    }

    pub async fn get_cart_item(&self, id: i64) -> Option<CartItem> {
        self.tables.read().await.cart_items.get(&id).cloned()
    }

    /// Adds a meal to the user's cart. A second add of the same meal merges
    /// into the existing line, capped at [`MAX_CART_QUANTITY`].
    pub async fn add_to_cart(
        &self,
        user_id: i64,
        meal_id: i64,
        quantity: i32,
    ) -> Result<CartItem, StoreError> {
        let mut tables = self.tables.write().await;
        let meal = tables
            .meals
            .get(&meal_id)
            .ok_or(StoreError::NotFound("Meal"))?;
        if !meal.is_available {
            return Err(StoreError::MealUnavailable);
        }

        let cart = tables.ensure_cart(user_id);
        if let Some(existing) = tables
            .cart_items
            .values_mut()
            .find(|item| item.cart_id == cart.id && item.meal_id == meal_id)
        {
            existing.quantity = existing
                .quantity
                .saturating_add(quantity)
                .min(MAX_CART_QUANTITY);
            return Ok(existing.clone());
        }

        let item = CartItem {
            id: tables.seq.cart_item.next(),
            cart_id: cart.id,
            meal_id,
            quantity,
        };
        tables.cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    pub async fn update_cart_item(&self, id: i64, quantity: i32) -> Result<CartItem, StoreError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .cart_items
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Cart item"))?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    pub async fn remove_cart_item(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .cart_items
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Cart item"))
    }

    pub async fn clear_cart(&self, user_id: i64) {
        let mut tables = self.tables.write().await;
        let cart = tables.ensure_cart(user_id);
        tables.clear_cart_items(cart.id);
    }

    // Orders

    /// Turns the user's cart into an order. Validation, the points debit, the
    /// price snapshot and the cart clear all happen under one write lock, so
    /// either everything is applied or nothing is.
    pub async fn place_order(
        &self,
        user_id: i64,
        new_order: NewOrder,
    ) -> Result<OrderReceipt, StoreError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let balance = tables
            .users
            .get(&user_id)
            .map(|user| user.points)
            .ok_or_else(|| StoreError::Dangling {
                entity: "user",
                id: user_id,
                owner: "order".to_string(),
            })?;

        let lines = match tables.cart_id_of(user_id) {
            Some(cart_id) => tables.cart_lines(cart_id)?,
            None => Vec::new(),
        };
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        if lines.iter().any(|line| !line.meal.is_available) {
            return Err(StoreError::MealUnavailable);
        }

        let total_points = lines_total(&lines)?;
        if balance < total_points {
            return Err(StoreError::InsufficientPoints);
        }

        let order = Order {
            id: tables.seq.order.next(),
            user_id,
            order_date: Utc::now(),
            status: OrderStatus::Pending,
            total_points,
            pickup_time: new_order.pickup_time,
            special_instructions: new_order.special_instructions,
        };
        tables.orders.insert(order.id, order.clone());

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = OrderItem {
                id: tables.seq.order_item.next(),
                order_id: order.id,
                meal_id: line.meal.id,
                quantity: line.item.quantity,
                point_cost: line.meal.point_cost,
            };
            tables.order_items.insert(item.id, item.clone());
            items.push(item);
        }

        if let Some(user) = tables.users.get_mut(&user_id) {
            user.points -= total_points;
        }
        let cart_id = lines[0].item.cart_id;
        tables.clear_cart_items(cart_id);

        Ok(OrderReceipt { order, items })
    }

    pub async fn get_order(&self, id: i64) -> Option<Order> {
        self.tables.read().await.orders.get(&id).cloned()
    }

    /// Orders of one user, newest first.
    pub async fn orders_for_user(&self, user_id: i64) -> Vec<Order> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut orders);
        orders
    }

    pub async fn all_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.tables.read().await.orders.values().cloned().collect();
        sort_newest_first(&mut orders);
        orders
    }

    pub async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Order"))?;
        order.status = status;
        Ok(order.clone())
    }

    pub async fn order_items(&self, order_id: i64) -> Result<Vec<OrderLine>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .map(|item| {
                let meal = tables.meals.get(&item.meal_id).ok_or_else(|| StoreError::Dangling {
                    entity: "meal",
                    id: item.meal_id,
                    owner: format!("order item {}", item.id),
                })?;
                Ok(OrderLine {
                    item: item.clone(),
                    meal: meal.clone(),
                })
            })
            .collect()
    }

    // Sessions

    pub async fn create_session(&self, user_id: i64, ttl: Duration) -> Session {
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at: Utc::now() + ttl,
        };
        self.tables
            .write()
            .await
            .sessions
            .insert(session.id.clone(), session.clone());
        session
    }

    /// Resolves a session id to its user. Expired sessions are dropped on
    /// the way.
    pub async fn session_user(&self, session_id: &str) -> Option<User> {
        let mut tables = self.tables.write().await;
        let (user_id, expires_at) = tables
            .sessions
            .get(session_id)
            .map(|session| (session.user_id, session.expires_at))?;
        if expires_at <= Utc::now() {
            tables.sessions.remove(session_id);
            return None;
        }
        tables.users.get(&user_id).cloned()
    }

    pub async fn delete_session(&self, session_id: &str) -> bool {
        self.tables
            .write()
            .await
            .sessions
            .remove(session_id)
            .is_some()
    }

    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> usize {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, session| session.expires_at > now);
        before - tables.sessions.len()
    }
}

/// Sum of `pointCost * quantity` over the lines, rejecting totals that do
/// not fit in an `i64`.
fn lines_total(lines: &[CartLine]) -> Result<i64, StoreError> {
    lines.iter().try_fold(0i64, |total, line| {
        line.meal
            .point_cost
            .checked_mul(i64::from(line.item.quantity))
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or(StoreError::PointsOverflow)
    })
}

fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
}
