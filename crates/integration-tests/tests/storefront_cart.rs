//! Integration tests for the cart, sign-in merge and checkout.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`aba-cli seed --migrate`)
//! - The storefront server running (`cargo run -p abamade-storefront`)

use abamade_integration_tests::{
    TEST_PASSWORD, add_to_cart, any_product, client, login, register, url,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn product_detail(client: &reqwest::Client, product: &Value) -> Value {
    let slug = product["slug"].as_str().expect("slug");
    client
        .get(url(&format!("/api/products/{slug}")))
        .send()
        .await
        .expect("Failed to get product")
        .json()
        .await
        .expect("Failed to parse product")
}

fn decimal(value: &Value) -> f64 {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("decimal string")
}

async fn add_default_address(client: &reqwest::Client) {
    let resp = client
        .post(url("/account/addresses"))
        .json(&json!({
            "address_line1": "1 Market Street",
            "city": "Lagos",
            "state": "Lagos",
            "postal_code": "100001",
            "country": "NG",
            "is_default": true,
        }))
        .send()
        .await
        .expect("address");
    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// Current `WELCOME10` usage count, when admin credentials are configured.
async fn welcome_coupon_uses() -> Option<i64> {
    let email = std::env::var("STOREFRONT_ADMIN_EMAIL").ok()?;
    let password = std::env::var("STOREFRONT_ADMIN_PASSWORD").ok()?;
    let admin = client();
    let resp = login(&admin, &email, &password).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let coupon: Value = admin
        .get(url("/admin/coupons/WELCOME10"))
        .send()
        .await
        .expect("coupon")
        .json()
        .await
        .expect("parse");
    coupon["usage_count"].as_i64()
}

async fn cart(client: &reqwest::Client) -> Value {
    client
        .get(url("/api/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart")
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_anonymous_cart_adds_sum_quantities() {
    let client = client();
    let product = any_product(&client).await;

    add_to_cart(&client, &product, 1).await;
    let view = add_to_cart(&client, &product, 2).await;

    let items = view["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(view["totals"]["item_count"], 3);

    let count: Value = client
        .get(url("/api/cart/count"))
        .send()
        .await
        .expect("count")
        .json()
        .await
        .expect("parse");
    assert_eq!(count["count"], 3);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_repeated_adds_stop_at_line_limit() {
    let client = client();
    let product = any_product(&client).await;

    add_to_cart(&client, &product, 60).await;
    let view = add_to_cart(&client, &product, 60).await;
    assert_eq!(view["items"][0]["quantity"], 99);

    let item_id = view["items"][0]["id"].as_str().expect("item id").to_owned();
    let resp = client
        .patch(url(&format!("/api/cart/items/{item_id}")))
        .json(&json!({ "quantity": 100 }))
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(cart(&client).await["items"][0]["quantity"], 99);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_merge_stops_at_line_limit() {
    let user = client();
    let registered = register(&user).await;
    let email = registered["user"]["email"].as_str().expect("email");
    let product = any_product(&user).await;
    add_to_cart(&user, &product, 70).await;

    let shopper = client();
    add_to_cart(&shopper, &product, 70).await;
    let resp = login(&shopper, email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let view = cart(&shopper).await;
    assert_eq!(view["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(view["items"][0]["quantity"], 99);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_quantity_update_and_remove() {
    let client = client();
    let product = any_product(&client).await;
    let view = add_to_cart(&client, &product, 1).await;
    let item_id = view["items"][0]["id"].as_str().expect("item id").to_owned();

    let resp = client
        .patch(url(&format!("/api/cart/items/{item_id}")))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cart(&client).await["totals"]["item_count"], 5);

    let resp = client
        .patch(url(&format!("/api/cart/items/{item_id}")))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("remove via zero");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cart(&client).await["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_invalid_quantity_rejected() {
    let client = client();
    let product = any_product(&client).await;
    let resp = client
        .post(url("/api/cart/items"))
        .json(&json!({ "product_id": product["id"], "quantity": 0 }))
        .send()
        .await
        .expect("add");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_merges_anonymous_cart() {
    // Register on one client, then shop anonymously on another and sign in.
    let registered = register(&client()).await;
    let email = registered["user"]["email"].as_str().expect("email");

    let shopper = client();
    let product = any_product(&shopper).await;
    add_to_cart(&shopper, &product, 2).await;

    let resp = login(&shopper, email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let signed_in: Value = resp.json().await.expect("parse");
    assert_eq!(signed_in["merged_cart_items"], 1);

    let view = cart(&shopper).await;
    assert_eq!(view["totals"]["item_count"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_creates_order_and_empties_cart() {
    let client = client();
    register(&client).await;
    add_default_address(&client).await;

    let product = any_product(&client).await;
    add_to_cart(&client, &product, 1).await;

    let resp = client
        .post(url("/api/checkout"))
        .json(&json!({}))
        .send()
        .await
        .expect("checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("order");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"].as_array().map(Vec::len), Some(1));
    assert!(order["shipping_address_id"].is_string());

    assert_eq!(cart(&client).await["items"], json!([]));

    let orders: Vec<Value> = client
        .get(url("/account/orders"))
        .send()
        .await
        .expect("orders")
        .json()
        .await
        .expect("parse");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order["id"]);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_with_empty_cart_is_rejected() {
    let client = client();
    register(&client).await;

    let resp = client
        .post(url("/api/checkout"))
        .json(&json!({}))
        .send()
        .await
        .expect("checkout");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_short_on_stock_changes_nothing() {
    let client = client();
    register(&client).await;
    add_default_address(&client).await;

    let product = any_product(&client).await;
    let stock_before = product_detail(&client, &product).await["stock_quantity"]
        .as_i64()
        .expect("stock");
    assert!(stock_before < 99, "pick a product stocked below the line limit");
    let view = add_to_cart(&client, &product, stock_before + 1).await;
    let uses_before = welcome_coupon_uses().await;

    let resp = client
        .post(url("/api/checkout"))
        .json(&json!({ "coupon_code": "WELCOME10" }))
        .send()
        .await
        .expect("checkout");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("error");
    let message = body["error"].as_str().expect("error message");
    let name = product["name"].as_str().expect("name");
    assert!(message.contains(name), "{message} should name {name}");

    assert_eq!(cart(&client).await["items"], view["items"]);
    let orders: Vec<Value> = client
        .get(url("/account/orders"))
        .send()
        .await
        .expect("orders")
        .json()
        .await
        .expect("parse");
    assert!(orders.is_empty());
    assert_eq!(
        product_detail(&client, &product).await["stock_quantity"],
        stock_before
    );
    assert_eq!(welcome_coupon_uses().await, uses_before);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_applies_welcome_coupon() {
    let client = client();
    register(&client).await;
    add_default_address(&client).await;

    // WELCOME10 needs a subtotal over $50.
    let product = any_product(&client).await;
    let unit = if product["sale_price"].is_null() {
        decimal(&product["price"])
    } else {
        decimal(&product["sale_price"])
    };
    let quantity = (60.0 / unit).ceil().max(1.0) as i64;
    add_to_cart(&client, &product, quantity).await;

    let resp = client
        .post(url("/api/checkout"))
        .json(&json!({ "coupon_code": "welcome10" }))
        .send()
        .await
        .expect("checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("order");
    assert!(order["coupon_id"].is_string());

    let subtotal = decimal(&order["subtotal"]);
    let discount = decimal(&order["discount"]);
    assert!((discount - subtotal * 0.1).abs() < 0.01);
    let expected =
        subtotal - discount + decimal(&order["shipping"]) + decimal(&order["tax"]);
    assert!((decimal(&order["total"]) - expected).abs() < 0.01);
}
