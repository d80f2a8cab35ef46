//! Integration tests for the AbaMade storefront.
//!
//! The tests talk HTTP to a running server and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! aba-cli seed --migrate
//! cargo run -p abamade-storefront &
//! cargo test -p abamade-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Server under test (default `http://localhost:3000`)
//! - `STOREFRONT_ADMIN_EMAIL` / `STOREFRONT_ADMIN_PASSWORD` - An admin account
//!   for back-office tests (see `aba-cli admin create`)

use reqwest::{Client, StatusCode, redirect::Policy};
use serde_json::{Value, json};
use uuid::Uuid;

/// Password used for throwaway accounts.
pub const TEST_PASSWORD: &str = "integration-test-pw";

/// Base URL for the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_owned())
        .unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Absolute URL for `path`.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client that keeps the session cookie and does not follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email for a throwaway account.
#[must_use]
pub fn unique_email() -> String {
    format!("integration-{}@example.com", Uuid::new_v4())
}

/// Register a new customer on `client` (which is then signed in).
///
/// # Panics
///
/// Panics if the request fails or registration is rejected.
pub async fn register(client: &Client) -> Value {
    let email = unique_email();
    let resp = client
        .post(url("/auth/register"))
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "first_name": "Integration",
            "last_name": "Test",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse registration")
}

/// Sign in an existing account on `client`.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn login(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(url("/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in")
}

/// First product of the catalog listing.
///
/// # Panics
///
/// Panics if the catalog cannot be fetched or is empty.
pub async fn any_product(client: &Client) -> Value {
    let products: Vec<Value> = client
        .get(url("/api/products?limit=1"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse products");
    products
        .into_iter()
        .next()
        .expect("Catalog is empty; run `aba-cli seed`")
}

/// Add one unit of `product` to the cart on `client`.
///
/// # Panics
///
/// Panics if the request fails or is rejected.
pub async fn add_to_cart(client: &Client, product: &Value, quantity: i64) -> Value {
    let resp = client
        .post(url("/api/cart/items"))
        .json(&json!({ "product_id": product["id"], "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse cart")
}
