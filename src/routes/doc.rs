use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{AdjustPointsRequest, UpdateRoleRequest, UserList},
        auth::{LoginRequest, RegisterRequest},
        cart::{AddToCartRequest, UpdateCartItemRequest},
        meals::{CreateMealRequest, MealList, UpdateMealRequest},
        orders::{OrderLineList, OrderList, PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    models::{
        Cart, CartItem, CartLine, CartView, Meal, NutritionInfo, Order, OrderItem, OrderLine,
        OrderReceipt, OrderStatus, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, meals, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("sid"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::current_user,
        meals::list_meals,
        meals::list_meals_by_category,
        meals::get_meal,
        meals::create_meal,
        meals::update_meal,
        meals::delete_meal,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        orders::get_order_items,
        orders::update_order_status,
        admin::list_all_orders,
        admin::list_users,
        admin::update_user_role,
        admin::adjust_user_points,
        admin::delete_user
    ),
    components(
        schemas(
            User,
            Meal,
            NutritionInfo,
            Cart,
            CartItem,
            CartLine,
            CartView,
            Order,
            OrderStatus,
            OrderItem,
            OrderLine,
            OrderReceipt,
            RegisterRequest,
            LoginRequest,
            CreateMealRequest,
            UpdateMealRequest,
            AddToCartRequest,
            UpdateCartItemRequest,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            UpdateRoleRequest,
            AdjustPointsRequest,
            MealList,
            OrderList,
            OrderLineList,
            UserList,
            health::HealthData,
            Meta,
            ApiResponse<Meal>,
            ApiResponse<MealList>,
            ApiResponse<CartView>,
            ApiResponse<OrderReceipt>,
            ApiResponse<OrderList>,
            ApiResponse<User>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Session endpoints"),
        (name = "Meals", description = "Meal catalog"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
