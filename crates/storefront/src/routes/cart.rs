//! Cart route handlers.
//!
//! Signed-in users own their account cart. Anonymous visitors get a cart
//! token in their session on the first add; reads without a token see an
//! empty cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use abamade_core::{CartItemId, ProductId, VariantId};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, cart_owner, cart_owner_or_create};
use crate::models::CartView;
use crate::services::{CartError, CartService};
use crate::state::AppState;

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

/// Body of `PATCH /api/cart/items/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
}

fn service(state: &AppState) -> CartService<'_> {
    CartService::new(state.pool(), state.pricing())
}

/// Current cart with totals.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let Some(owner) = cart_owner(&session, user.as_ref()).await else {
        return Ok(Json(CartView::empty()));
    };
    Ok(Json(service(&state).view(owner).await?))
}

/// Total quantity across all lines.
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartCount>> {
    let count = match cart_owner(&session, user.as_ref()).await {
        Some(owner) => service(&state).count(owner).await?,
        None => 0,
    };
    Ok(Json(CartCount { count }))
}

/// Add a product (or one of its variants). Repeated adds sum quantities.
#[instrument(skip(state, user, session))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let owner = cart_owner_or_create(&session, user.as_ref()).await?;
    let cart = service(&state)
        .add(owner, body.product_id, body.variant_id, body.quantity)
        .await?;

    let product_id = body.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

    Ok((StatusCode::CREATED, Json(cart)))
}

/// Change a line's quantity; zero or less removes it.
#[instrument(skip(state, user, session))]
pub async fn update(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(item_id): Path<CartItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let owner = cart_owner(&session, user.as_ref())
        .await
        .ok_or(CartError::ItemNotFound)?;
    Ok(Json(
        service(&state)
            .update_quantity(owner, item_id, body.quantity)
            .await?,
    ))
}

/// Remove one line.
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let owner = cart_owner(&session, user.as_ref())
        .await
        .ok_or(CartError::ItemNotFound)?;
    Ok(Json(service(&state).remove(owner, item_id).await?))
}

/// Empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Json<CartView>> {
    match cart_owner(&session, user.as_ref()).await {
        Some(owner) => Ok(Json(service(&state).clear(owner).await?)),
        None => Ok(Json(CartView::empty())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_defaults_quantity() {
        let body: AddItemRequest = serde_json::from_str(
            r#"{"product_id":"00000000-0000-0000-0000-000000000001"}"#,
        )
        .unwrap();
        assert_eq!(body.quantity, 1);
        assert!(body.variant_id.is_none());
    }
}
