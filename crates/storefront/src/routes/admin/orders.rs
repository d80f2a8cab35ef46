//! Back-office order management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use abamade_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::admin::{AdminOrderQuery, OrderStatusUpdate};
use crate::models::catalog::MAX_PAGE_SIZE;
use crate::models::{Order, OrderWithItems};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Orders, filtered by status and sorted.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminOrderQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list(&query).await?))
}

/// Most recent orders (default 10).
pub async fn recent(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Order>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    Ok(Json(OrderRepository::new(state.pool()).recent(limit).await?))
}

/// Orders currently in one status.
pub async fn by_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let status = status
        .parse::<OrderStatus>()
        .map_err(|_| AppError::BadRequest(format!("unknown order status: {status}")))?;
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_by_status(status)
            .await?,
    ))
}

/// One order with its items.
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))
}

/// Move an order to a new status. Terminal orders cannot change (409).
#[instrument(skip_all, fields(admin_id = %admin.id, order_id = %id))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<OrderStatusUpdate>,
) -> Result<Json<Order>> {
    let payment_intent_id = update
        .payment_intent_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let order = OrderRepository::new(state.pool())
        .update_status(id, update.status, payment_intent_id)
        .await?;

    tracing::info!(status = %order.status, "Order status updated");
    add_breadcrumb(
        "admin",
        "Order status updated",
        Some(&[("status", order.status.as_str())]),
    );
    Ok(Json(order))
}
