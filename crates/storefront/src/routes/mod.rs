//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Catalog
//! GET  /api/products              - Product listing (?category=&color=&size=)
//! GET  /api/products/{slug}       - Product detail
//! GET  /api/categories            - Top-level categories
//!
//! # Cart (session)
//! GET  /api/cart                  - Cart, totals and recommendations
//! POST /api/cart/add              - Add a product (triggers cart-updated)
//! POST /api/cart/update           - Change a line's quantity (triggers cart-updated)
//! POST /api/cart/remove           - Remove a line (triggers cart-updated)
//! GET  /api/cart/count            - Cart count badge
//!
//! # Checkout (requires sign-in)
//! GET  /api/checkout              - Checkout summary
//! POST /api/checkout              - Place the order
//! GET  /api/checkout/confirmation - Last placed order
//! GET  /api/orders                - Order history
//!
//! # Auth
//! GET  /auth/login                - Redirect to Google
//! GET  /auth/callback             - Handle OAuth callback
//! POST /auth/logout               - Sign out (clears the cart)
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::index))
        .route("/products/{slug}", get(catalog::show))
        .route("/categories", get(catalog::categories))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/checkout/confirmation", get(checkout::confirmation))
        .route("/orders", get(orders::index))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .nest("/auth", auth_routes())
}
