//! Integration tests for catalog browsing.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`aba-cli seed --migrate`)
//! - The storefront server running (`cargo run -p abamade-storefront`)

use abamade_integration_tests::{any_product, client, url};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health_endpoints() {
    let client = client();

    let resp = client.get(url("/health")).send().await.expect("health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = client.get(url("/health/ready")).send().await.expect("ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_product_listing_and_detail() {
    let client = client();
    let product = any_product(&client).await;
    let slug = product["slug"].as_str().expect("slug");

    let resp = client
        .get(url(&format!("/api/products/{slug}")))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: Value = resp.json().await.expect("detail");
    assert_eq!(detail["id"], product["id"]);
    assert!(detail["rating"].is_object());

    let id = product["id"].as_str().expect("id");
    let resp = client
        .get(url(&format!("/api/products/id/{id}")))
        .send()
        .await
        .expect("Failed to get product by id");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_product_filters_and_sort() {
    let client = client();

    let products: Vec<Value> = client
        .get(url("/api/products?sort=price_asc&limit=20"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("parse");
    let prices: Vec<f64> = products
        .iter()
        .filter_map(|p| {
            p["sale_price"]
                .as_str()
                .or_else(|| p["price"].as_str())?
                .parse()
                .ok()
        })
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));

    let featured: Vec<Value> = client
        .get(url("/api/products/featured"))
        .send()
        .await
        .expect("featured")
        .json()
        .await
        .expect("parse");
    assert!(featured.len() <= 4);
    assert!(featured.iter().all(|p| p["is_featured"] == true));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_search_blank_query_is_empty() {
    let client = client();
    let results: Vec<Value> = client
        .get(url("/api/products/search?q=%20"))
        .send()
        .await
        .expect("search")
        .json()
        .await
        .expect("parse");
    assert!(results.is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_product_is_not_found() {
    let resp = client()
        .get(url("/api/products/this-shoe-does-not-exist"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("parse");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_categories_by_gender() {
    let client = client();
    let women: Vec<Value> = client
        .get(url("/api/categories/women"))
        .send()
        .await
        .expect("women")
        .json()
        .await
        .expect("parse");
    assert!(women.iter().all(|c| c["gender"] == "women"));
    assert!(women.iter().all(|c| c["parent_id"].is_null()));

    if let Some(category) = women.first() {
        let slug = category["slug"].as_str().expect("slug");
        let resp = client
            .get(url(&format!("/api/categories/{slug}/children")))
            .send()
            .await
            .expect("children");
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
