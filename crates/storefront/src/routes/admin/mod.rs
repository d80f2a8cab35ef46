//! Back-office route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin),
//! which re-reads the caller's role from the database on each request.
//!
//! ```text
//! GET    /admin                              - Dashboard stats
//! GET    /admin/products                     - All products (published or not)
//! POST   /admin/products                     - Create product
//! GET    /admin/products/{id}                - Product with images and variants
//! PATCH  /admin/products/{id}                - Partial update
//! DELETE /admin/products/{id}                - Delete (409 if ordered)
//! POST   /admin/products/{id}/images         - Attach image
//! DELETE /admin/products/{id}/images/{image} - Remove image
//! GET    /admin/categories                   - All categories
//! POST   /admin/categories                   - Create category
//! GET    /admin/categories/{id}              - Category by ID
//! PUT    /admin/categories/{id}              - Replace category
//! DELETE /admin/categories/{id}              - Delete (409 if in use)
//! GET    /admin/orders                       - Orders (?status&sort&limit&offset)
//! GET    /admin/orders/recent                - Latest orders
//! GET    /admin/orders/status/{status}       - Orders in one status
//! GET    /admin/orders/{id}                  - Order with items
//! PATCH  /admin/orders/{id}                  - Change status
//! GET    /admin/users                        - Users (?role&q&limit&offset)
//! POST   /admin/users                        - Create customer (no password)
//! PATCH  /admin/users/{id}/role              - Change role
//! POST   /admin/coupons                      - Create coupon
//! GET    /admin/coupons/{code}               - Look up coupon
//! ```

pub mod categories;
pub mod coupons;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the back-office router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::stats))
        .route("/dashboard", get(dashboard::stats))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/products/{id}/images", post(products::add_image))
        .route(
            "/products/{id}/images/{image_id}",
            delete(products::delete_image),
        )
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/orders", get(orders::index))
        .route("/orders/recent", get(orders::recent))
        .route("/orders/status/{status}", get(orders::by_status))
        .route("/orders/{id}", get(orders::show).patch(orders::update_status))
        .route("/users", get(users::index).post(users::create))
        .route("/users/{id}/role", patch(users::update_role))
        .route("/coupons", post(coupons::create))
        .route("/coupons/{code}", get(coupons::show))
}
