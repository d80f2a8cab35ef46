//! Back-office product management.
//!
//! Every write drops the catalog cache so storefront reads see it at once.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use abamade_core::{ImageId, ProductId, Slug};

use crate::db::ProductRepository;
use crate::db::products::{NewImage, NewProduct, ProductPatch};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::catalog::MAX_PAGE_SIZE;
use crate::models::{Product, ProductImage, ProductListing, ProductVariant};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Back-office product view.
#[derive(Debug, Serialize)]
pub struct AdminProduct {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
}

fn check_prices(price: Option<Decimal>, sale_price: Option<Decimal>) -> Result<()> {
    if price.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::BadRequest("price must not be negative".to_owned()));
    }
    if let Some(sale) = sale_price {
        if sale.is_sign_negative() {
            return Err(AppError::BadRequest(
                "sale_price must not be negative".to_owned(),
            ));
        }
        if price.is_some_and(|p| sale > p) {
            return Err(AppError::BadRequest(
                "sale_price must not exceed price".to_owned(),
            ));
        }
    }
    Ok(())
}

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".to_owned())
}

/// All products, including unpublished ones.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    let limit = page.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
    let offset = page.offset.unwrap_or(0).max(0);
    Ok(Json(
        ProductRepository::new(state.pool())
            .list_all(limit, offset)
            .await?,
    ))
}

/// One product with images and variants.
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<AdminProduct>> {
    let products = ProductRepository::new(state.pool());
    let product = products.get(id).await?.ok_or_else(product_not_found)?;
    Ok(Json(AdminProduct {
        images: products.images(id).await?,
        variants: products.variants(id).await?,
        product,
    }))
}

/// Create a product. The slug is derived from the name when omitted.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    check_prices(Some(input.price), input.sale_price)?;
    let slug = match &input.slug {
        Some(slug) => slug.clone(),
        None => Slug::from_name(&input.name).map_err(|e| AppError::BadRequest(e.to_string()))?,
    };

    let product = ProductRepository::new(state.pool())
        .create(&input, &slug)
        .await?;
    state.catalog().invalidate().await;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partial update.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    check_prices(patch.price, patch.sale_price)?;
    let product = ProductRepository::new(state.pool())
        .update(id, &patch)
        .await?;
    state.catalog().invalidate().await;
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    state.catalog().invalidate().await;
    tracing::info!("Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image. A primary image replaces the previous primary.
pub async fn add_image(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(image): Json<NewImage>,
) -> Result<(StatusCode, Json<ProductImage>)> {
    if image.url.trim().is_empty() {
        return Err(AppError::BadRequest("url is required".to_owned()));
    }
    let image = ProductRepository::new(state.pool())
        .add_image(id, &image)
        .await?;
    state.catalog().invalidate().await;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Remove an image.
pub async fn delete_image(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(ProductId, ImageId)>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .delete_image(id, image_id)
        .await?;
    state.catalog().invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_prices() {
        assert!(check_prices(Some(Decimal::from(100)), Some(Decimal::from(80))).is_ok());
        assert!(check_prices(None, Some(Decimal::from(80))).is_ok());
        assert!(check_prices(Some(Decimal::from(-1)), None).is_err());
        assert!(check_prices(Some(Decimal::from(50)), Some(Decimal::from(80))).is_err());
        assert!(check_prices(None, Some(Decimal::from(-5))).is_err());
    }
}
