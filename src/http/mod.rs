//! HTTP surface: the `/api` router, auth extractors and the error boundary.

mod error;
mod extract;
mod orders;
mod products;
mod users;

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::app_system::StoreSystem;
use crate::auth::TokenIssuer;
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::Config;

pub use error::ApiError;
pub use extract::{AdminUser, CurrentUser, DocumentId};

/// Shared by every handler. Cloning is cheap: clients are channel handles.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductClient,
    pub orders: OrderClient,
    pub users: UserClient,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(system: &StoreSystem, config: Arc<Config>) -> Self {
        Self {
            products: system.product_client.clone(),
            orders: system.order_client.clone(),
            users: system.user_client.clone(),
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret)),
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/top", get(products::top_products))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/reviews", post(products::create_review))
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route("/orders/myorders", get(orders::my_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/pay", put(orders::pay_order))
        .route("/orders/:id/deliver", put(orders::deliver_order))
        .route("/users", post(users::register).get(users::list_users))
        .route("/users/auth", post(users::login))
        .route("/users/logout", post(users::logout))
        .route("/users/profile", get(users::profile).put(users::update_profile))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/config/paypal", get(paypal_config));

    Router::new()
        .route("/", get(ready))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), error::render_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ready() -> &'static str {
    "Server is ready"
}

async fn paypal_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "clientId": state.config.paypal_client_id }))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::route_not_found(&uri)
}
