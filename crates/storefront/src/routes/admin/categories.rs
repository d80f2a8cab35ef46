//! Back-office category management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use abamade_core::CategoryId;

use crate::db::CategoryRepository;
use crate::db::categories::CategoryInput;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryFilter};
use crate::state::AppState;

fn check_name(input: &CategoryInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    Ok(())
}

/// Every category, ordered by name.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(
        CategoryRepository::new(state.pool())
            .list(CategoryFilter::default())
            .await?,
    ))
}

/// One category by ID.
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))
}

/// Create a category. The slug is derived from the name when omitted.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    check_name(&input)?;
    let category = CategoryRepository::new(state.pool()).create(&input).await?;
    state.catalog().invalidate().await;
    tracing::info!(category_id = %category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category.
#[instrument(skip_all, fields(admin_id = %admin.id, category_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    check_name(&input)?;
    if input.parent_id == Some(id) {
        return Err(AppError::BadRequest(
            "a category cannot be its own parent".to_owned(),
        ));
    }
    let category = CategoryRepository::new(state.pool())
        .update(id, &input)
        .await?;
    state.catalog().invalidate().await;
    Ok(Json(category))
}

/// Delete a category. Categories that still hold products are kept (409).
#[instrument(skip_all, fields(admin_id = %admin.id, category_id = %id))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    state.catalog().invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}
