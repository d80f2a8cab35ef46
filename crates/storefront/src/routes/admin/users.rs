//! Back-office user management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use abamade_core::{Email, UserId};

use crate::db::{AdminRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::models::admin::{CustomerSummary, RoleUpdate, UserQuery};
use crate::state::AppState;

/// Users with order totals, filtered by role and a name/email search.
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<CustomerSummary>>> {
    Ok(Json(
        AdminRepository::new(state.pool()).list_users(&query).await?,
    ))
}

/// Body of `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct NewCustomer {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Create a customer account without a password (e.g. phone orders).
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<NewCustomer>,
) -> Result<(StatusCode, Json<User>)> {
    let email = Email::parse_normalized(&body.email)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user = UserRepository::new(state.pool())
        .create_customer(
            &email,
            blank_to_none(body.first_name.as_deref()),
            blank_to_none(body.last_name.as_deref()),
        )
        .await?;
    tracing::info!(user_id = %user.id, "Customer created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Change a user's role. Admins cannot change their own role.
#[instrument(skip_all, fields(admin_id = %admin.id, user_id = %id))]
pub async fn update_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(update): Json<RoleUpdate>,
) -> Result<Json<User>> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "you cannot change your own role".to_owned(),
        ));
    }
    let user = UserRepository::new(state.pool())
        .set_role(id, update.role)
        .await?;
    tracing::info!(role = %user.role, "User role changed");
    Ok(Json(user))
}
