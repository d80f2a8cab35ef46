//! Category route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use abamade_core::Gender;

use crate::error::{AppError, Result};
use crate::models::{Category, CategoryFilter};
use crate::state::AppState;

/// Categories ordered by name, optionally filtered by parent and gender.
///
/// `?parent=root` returns top-level categories, `?parent=<uuid>` the
/// children of that category.
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().categories(filter).await?;
    Ok(Json(categories.as_ref().clone()))
}

/// Top-level women's categories.
pub async fn women(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().main_categories(Some(Gender::Women)).await?))
}

/// Top-level men's categories.
pub async fn men(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().main_categories(Some(Gender::Men)).await?))
}

async fn by_slug(state: &AppState, slug: &str) -> Result<Category> {
    state
        .catalog()
        .category_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))
}

/// A single category.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>> {
    Ok(Json(by_slug(&state, &slug).await?))
}

/// Direct children of a category.
pub async fn children(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Category>>> {
    let parent = by_slug(&state, &slug).await?;
    Ok(Json(state.catalog().subcategories(parent.id).await?))
}
