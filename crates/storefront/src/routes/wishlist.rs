//! Wishlist route handlers. All require a signed-in user.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use abamade_core::ProductId;

use crate::db::WishlistRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::WishlistEntry;
use crate::state::AppState;

/// Body of `POST /api/wishlist`.
#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct WishlistAdded {
    pub added: bool,
}

#[derive(Debug, Serialize)]
pub struct WishlistMembership {
    pub in_wishlist: bool,
}

#[derive(Debug, Serialize)]
pub struct WishlistCleared {
    pub removed: u64,
}

/// Saved products, newest first.
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<WishlistEntry>>> {
    Ok(Json(WishlistRepository::new(state.pool()).list(user.id).await?))
}

/// Save a product. Saving it twice is a no-op (`added: false`).
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<WishlistRequest>,
) -> Result<(StatusCode, Json<WishlistAdded>)> {
    let added = WishlistRepository::new(state.pool())
        .add(user.id, body.product_id)
        .await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(WishlistAdded { added })))
}

/// Whether a product is saved.
pub async fn contains(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<WishlistMembership>> {
    let in_wishlist = WishlistRepository::new(state.pool())
        .contains(user.id, product_id)
        .await?;
    Ok(Json(WishlistMembership { in_wishlist }))
}

/// Remove a saved product.
pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove everything.
pub async fn clear(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<WishlistCleared>> {
    let removed = WishlistRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(WishlistCleared { removed }))
}
