//! Integration tests for auth, account pages, wishlist and the back-office.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`aba-cli seed --migrate`)
//! - The storefront server running (`cargo run -p abamade-storefront`)
//! - For admin tests, `STOREFRONT_ADMIN_EMAIL` / `STOREFRONT_ADMIN_PASSWORD`

use abamade_integration_tests::{TEST_PASSWORD, any_product, client, login, register, url};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

fn address(line1: &str, is_default: bool) -> Value {
    json!({
        "address_line1": line1,
        "city": "Accra",
        "state": "Greater Accra",
        "postal_code": "00233",
        "country": "GH",
        "is_default": is_default,
    })
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_account_redirects_when_signed_out() {
    let resp = client().get(url("/account/orders")).send().await.expect("get");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()[header::LOCATION],
        "/auth/login?callbackUrl=%2Faccount%2Forders"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let registered = register(&client).await;
    let email = registered["user"]["email"].as_str().expect("email");

    let resp = client
        .post(url("/auth/register"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_rejects_wrong_password_and_honours_callback() {
    let registered = register(&client()).await;
    let email = registered["user"]["email"].as_str().expect("email");

    let resp = login(&client(), email, "wrong-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let client = client();
    let resp = client
        .post(url("/auth/login"))
        .json(&json!({
            "email": email.to_uppercase(),
            "password": TEST_PASSWORD,
            "callbackUrl": "/account/orders",
        }))
        .send()
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["redirect"], "/account/orders");

    let resp = client.post(url("/auth/logout")).send().await.expect("logout");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = client.get(url("/account")).send().await.expect("account");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_single_default_address() {
    let client = client();
    register(&client).await;

    for (line, is_default) in [("1 First Rd", true), ("2 Second Rd", true), ("3 Third Rd", false)] {
        let resp = client
            .post(url("/account/addresses"))
            .json(&address(line, is_default))
            .send()
            .await
            .expect("create address");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let addresses: Vec<Value> = client
        .get(url("/account/addresses"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("parse");
    assert_eq!(addresses.len(), 3);
    let defaults: Vec<&Value> = addresses.iter().filter(|a| a["is_default"] == true).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["address_line1"], "2 Second Rd");

    let third = addresses
        .iter()
        .find(|a| a["address_line1"] == "3 Third Rd")
        .expect("third");
    let id = third["id"].as_str().expect("id");
    let resp = client
        .post(url(&format!("/account/addresses/{id}/default")))
        .send()
        .await
        .expect("set default");
    assert_eq!(resp.status(), StatusCode::OK);

    let default: Value = client
        .get(url("/account/addresses/default"))
        .send()
        .await
        .expect("default")
        .json()
        .await
        .expect("parse");
    assert_eq!(default["id"], third["id"]);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_preferences_default_then_update() {
    let client = client();
    register(&client).await;

    let prefs: Value = client
        .get(url("/account/preferences"))
        .send()
        .await
        .expect("get")
        .json()
        .await
        .expect("parse");
    assert_eq!(prefs["marketing_emails"], true);

    let resp = client
        .put(url("/account/preferences"))
        .json(&json!({
            "marketing_emails": false,
            "order_updates": true,
            "newsletter": false,
            "product_updates": true,
        }))
        .send()
        .await
        .expect("put");
    assert_eq!(resp.status(), StatusCode::OK);
    let prefs: Value = resp.json().await.expect("parse");
    assert_eq!(prefs["marketing_emails"], false);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_change_password_requires_current() {
    let client = client();
    register(&client).await;

    let resp = client
        .post(url("/account/password"))
        .json(&json!({ "current_password": "nope-nope", "new_password": "brand-new-pw" }))
        .send()
        .await
        .expect("change");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(url("/account/password"))
        .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "brand-new-pw" }))
        .send()
        .await
        .expect("change");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wishlist_add_is_idempotent() {
    let client = client();
    register(&client).await;
    let product = any_product(&client).await;
    let body = json!({ "product_id": product["id"] });

    let first = client.post(url("/api/wishlist")).json(&body).send().await.expect("add");
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = client.post(url("/api/wishlist")).json(&body).send().await.expect("add");
    assert_eq!(second.status(), StatusCode::OK);

    let items: Vec<Value> = client
        .get(url("/api/wishlist"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("parse");
    assert_eq!(items.len(), 1);

    let id = product["id"].as_str().expect("id");
    let resp = client
        .delete(url(&format!("/api/wishlist/{id}")))
        .send()
        .await
        .expect("remove");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// ============================================================================
// Back-office
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_customer_cannot_open_back_office() {
    let client = client();
    register(&client).await;
    let resp = client.get(url("/admin/dashboard")).send().await.expect("get");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server, database and an admin account"]
async fn test_admin_dashboard_and_orders() {
    let email = std::env::var("STOREFRONT_ADMIN_EMAIL").expect("STOREFRONT_ADMIN_EMAIL");
    let password = std::env::var("STOREFRONT_ADMIN_PASSWORD").expect("STOREFRONT_ADMIN_PASSWORD");
    let client = client();
    let resp = login(&client, &email, &password).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stats: Value = client
        .get(url("/admin/dashboard"))
        .send()
        .await
        .expect("dashboard")
        .json()
        .await
        .expect("parse");
    assert!(stats["product_count"].as_i64().unwrap_or_default() > 0);
    assert!(stats["daily_sales"].is_array());

    let resp = client
        .get(url("/admin/orders?sort=highest&limit=5"))
        .send()
        .await
        .expect("orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(url("/admin/orders/status/teleported"))
        .send()
        .await
        .expect("bad status");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
