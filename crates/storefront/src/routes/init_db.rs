//! Database initialization route.
//!
//! `POST /api/init-db` applies migrations and seeds the demo catalog. It
//! answers 404 unless `STOREFRONT_ALLOW_DB_INIT=true`.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::{self, SeedReport};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InitDbResponse {
    pub message: &'static str,
    /// False when the catalog already had data and seeding was skipped.
    pub seeded: bool,
    pub report: Option<SeedReport>,
}

/// Run migrations, then seed an empty catalog.
pub async fn init_db(State(state): State<AppState>) -> Result<Json<InitDbResponse>> {
    if !state.config().allow_db_init {
        return Err(AppError::NotFound("Not found".to_owned()));
    }

    db::run_migrations(state.pool()).await?;
    let report = db::seed(state.pool()).await?;
    state.catalog().invalidate().await;

    match &report {
        Some(report) => tracing::info!(?report, "Database initialized and seeded"),
        None => tracing::info!("Database initialized; catalog already present"),
    }

    Ok(Json(InitDbResponse {
        message: "Database initialization complete",
        seeded: report.is_some(),
        report,
    }))
}
