//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET    /api/products                  - Product listing (filters, sort, paging)
//! GET    /api/products/featured         - Featured shelf
//! GET    /api/products/new-arrivals     - New arrivals shelf
//! GET    /api/products/search           - Name search
//! GET    /api/products/id/{id}          - Product detail by ID
//! GET    /api/products/{slug}           - Product detail
//! GET    /api/products/{slug}/related   - Same-category products
//! GET    /api/products/{slug}/reviews   - Reviews
//! POST   /api/products/{slug}/reviews   - Leave a review (auth)
//! GET    /api/categories                - Categories (?parent&gender)
//! GET    /api/categories/women          - Top-level women's categories
//! GET    /api/categories/men            - Top-level men's categories
//! GET    /api/categories/{slug}         - Category
//! GET    /api/categories/{slug}/children
//!
//! # Cart (user or anonymous session)
//! GET    /api/cart                      - Cart with totals
//! DELETE /api/cart                      - Empty cart
//! GET    /api/cart/count                - Badge count
//! POST   /api/cart/items                - Add item
//! PATCH  /api/cart/items/{id}           - Change quantity
//! DELETE /api/cart/items/{id}           - Remove item
//!
//! # Wishlist, checkout (auth)
//! GET|POST|DELETE /api/wishlist
//! GET|DELETE      /api/wishlist/{product_id}
//! POST   /api/checkout
//!
//! # Newsletter, setup
//! POST   /api/newsletter/subscribe
//! POST   /api/newsletter/unsubscribe
//! POST   /api/init-db                   - Migrate and seed (when enabled)
//!
//! # Auth
//! POST   /auth/register
//! POST   /auth/login
//! POST   /auth/logout
//!
//! # Account (auth)
//! GET|PATCH        /account
//! POST             /account/password
//! GET|PUT          /account/preferences
//! GET|POST         /account/addresses
//! GET              /account/addresses/default
//! GET|PUT|DELETE   /account/addresses/{id}
//! POST             /account/addresses/{id}/default
//! GET              /account/orders
//! GET              /account/orders/{id}
//!
//! # Back-office (admin)
//! /admin/...                            - see [`admin`]
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod init_db;
pub mod newsletter;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/new-arrivals", get(products::new_arrivals))
        .route("/search", get(products::search))
        .route("/id/{id}", get(products::show_by_id))
        .route("/{slug}", get(products::show))
        .route("/{slug}/related", get(products::related))
        .route(
            "/{slug}/reviews",
            get(products::reviews).post(products::create_review),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/women", get(categories::women))
        .route("/men", get(categories::men))
        .route("/{slug}", get(categories::show))
        .route("/{slug}/children", get(categories::children))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            patch(cart::update).delete(cart::remove),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(wishlist::index)
                .post(wishlist::add)
                .delete(wishlist::clear),
        )
        .route(
            "/{product_id}",
            get(wishlist::contains).delete(wishlist::remove),
        )
}

/// Create the JSON API router (everything under `/api`).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/checkout", post(checkout::checkout))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/newsletter/unsubscribe", post(newsletter::unsubscribe))
        .route("/init-db", post(init_db::init_db))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile).patch(account::update_profile))
        .route("/password", post(account::change_password))
        .route(
            "/preferences",
            get(account::preferences).put(account::update_preferences),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/default", get(account::default_address))
        .route(
            "/addresses/{id}",
            get(account::address)
                .put(account::update_address)
                .delete(account::delete_address),
        )
        .route("/addresses/{id}/default", post(account::set_default_address))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create all routes for the storefront.
///
/// Rate limiters key on the client IP, so the server must be run with
/// `into_make_service_with_connect_info` or behind a proxy that sets
/// `X-Forwarded-For`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes().layer(api_rate_limiter()))
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/account", account_routes())
        .nest("/admin", admin::routes())
}
