//! Product route handlers.
//!
//! Public catalog reads go through [`crate::services::CatalogService`], which
//! caches results and serves the built-in catalog when the database is down.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use abamade_core::{ProductId, Rating};

use crate::db::ReviewRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::catalog::MAX_PAGE_SIZE;
use crate::models::review::NewReview;
use crate::models::{ProductDetail, ProductListing, ProductQuery, Review, ReviewQuery};
use crate::state::AppState;

/// `?limit=` for the fixed product shelves.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn or(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Search parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

/// Review submission body.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: i64,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ReviewForm {
    fn validated(self) -> Result<NewReview> {
        let rating =
            Rating::new(self.rating).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
        };
        Ok(NewReview {
            rating,
            title: clean(self.title),
            content: clean(self.content),
        })
    }
}

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".to_owned())
}

/// List published products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    Ok(Json(state.catalog().list_products(&query).await?))
}

/// Featured products (default 4).
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    Ok(Json(state.catalog().featured(query.or(4)).await?))
}

/// Newest products flagged as new (default 8).
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    Ok(Json(state.catalog().new_arrivals(query.or(8)).await?))
}

/// Case-insensitive name search.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    Ok(Json(state.catalog().search(q, limit).await?))
}

/// Product page by ID.
pub async fn show_by_id(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = state
        .catalog()
        .product_by_id(id)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(Json(ProductDetail::clone(&product)))
}

/// Product page by slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(Json(ProductDetail::clone(&product)))
}

/// Other products from the same category (default 4).
pub async fn related(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    let catalog = state.catalog();
    let product = catalog
        .product_by_slug(&slug)
        .await?
        .ok_or_else(product_not_found)?;
    let related = catalog
        .related(product.product.id, product.product.category_id, query.or(4))
        .await?;
    Ok(Json(related))
}

/// Reviews for a product.
pub async fn reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<Review>>> {
    let product = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(product_not_found)?;
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product.product.id, query)
        .await?;
    Ok(Json(reviews))
}

/// Leave a review. One review per customer and product.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create_review(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = form.validated()?;
    let product = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(product_not_found)?;

    let created = ReviewRepository::new(state.pool())
        .create(user.id, product.product.id, &review)
        .await?;

    // Product pages embed the rating summary.
    state.catalog().invalidate().await;
    add_breadcrumb("review", "Review submitted", Some(&[("product", slug.as_str())]));

    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_query_defaults_and_clamps() {
        assert_eq!(LimitQuery::default().or(4), 4);
        assert_eq!(LimitQuery { limit: Some(0) }.or(4), 1);
        assert_eq!(LimitQuery { limit: Some(10_000) }.or(4), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_review_form_validation() {
        let form = ReviewForm {
            rating: 6,
            title: None,
            content: None,
        };
        assert!(matches!(form.validated(), Err(AppError::BadRequest(_))));

        let review = ReviewForm {
            rating: 4,
            title: Some("  Comfy  ".into()),
            content: Some("   ".into()),
        }
        .validated()
        .unwrap();
        assert_eq!(review.rating.value(), 4);
        assert_eq!(review.title.as_deref(), Some("Comfy"));
        assert!(review.content.is_none());
    }
}
