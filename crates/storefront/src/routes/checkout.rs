//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::OrderWithItems;
use crate::services::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Turn the signed-in user's cart into a pending order.
///
/// The body is optional: without one the order ships to the default
/// address and no coupon is applied.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn checkout(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: Option<Json<CheckoutRequest>>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let order = CheckoutService::new(state.pool(), state.pricing())
        .checkout(user.id, &request)
        .await?;

    let order_id = order.order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok((StatusCode::CREATED, Json(order)))
}
