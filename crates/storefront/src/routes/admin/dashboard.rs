//! Dashboard statistics.

use axum::{Json, extract::State};

use crate::db::AdminRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::admin::DashboardStats;
use crate::state::AppState;

/// Sales, counts, recent orders, best sellers and daily sales.
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(
        AdminRepository::new(state.pool()).dashboard_stats().await?,
    ))
}
