//! Account route handlers.
//!
//! Everything here requires a signed-in user. Unauthenticated requests are
//! redirected to `/auth/login?callbackUrl=...`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use abamade_core::{AddressId, OrderId};

use crate::db::{AddressRepository, OrderRepository, PreferencesRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressInput, OrderWithItems, Preferences, ProfileUpdate, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Body of `POST /account/password`.
#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

fn address_not_found() -> AppError {
    AppError::NotFound("Address not found".to_owned())
}

// =============================================================================
// Profile
// =============================================================================

/// The signed-in user's profile.
pub async fn profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

/// Update name and phone.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let updated = UserRepository::new(state.pool())
        .update_profile(user.id, &update.normalized())
        .await?;
    Ok(Json(updated))
}

/// Change password after confirming the current one.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<PasswordChange>,
) -> Result<StatusCode> {
    AuthService::new(state.pool())
        .change_password(user.id, &body.current_password, &body.new_password)
        .await?;
    tracing::info!("Password changed");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Preferences
// =============================================================================

/// Notification preferences (all enabled until first saved).
pub async fn preferences(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Preferences>> {
    Ok(Json(PreferencesRepository::new(state.pool()).get(user.id).await?))
}

/// Replace notification preferences.
pub async fn update_preferences(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(prefs): Json<Preferences>,
) -> Result<Json<Preferences>> {
    Ok(Json(
        PreferencesRepository::new(state.pool())
            .upsert(user.id, prefs)
            .await?,
    ))
}

// =============================================================================
// Addresses
// =============================================================================

/// Saved addresses, default first.
pub async fn addresses(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(AddressRepository::new(state.pool()).list(user.id).await?))
}

/// The default address.
pub async fn default_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Address>> {
    AddressRepository::new(state.pool())
        .default_address(user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No default address".to_owned()))
}

/// One saved address.
pub async fn address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>> {
    AddressRepository::new(state.pool())
        .get(id, user.id)
        .await?
        .map(Json)
        .ok_or_else(address_not_found)
}

/// Save a new address. `is_default` moves the default flag to it.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    let input = input.validated().map_err(AppError::BadRequest)?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Replace an address.
#[instrument(skip_all, fields(user_id = %user.id, address_id = %id))]
pub async fn update_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>> {
    let input = input.validated().map_err(AppError::BadRequest)?;
    let address = AddressRepository::new(state.pool())
        .update(id, user.id, &input)
        .await?;
    Ok(Json(address))
}

/// Make an address the default.
pub async fn set_default_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>> {
    Ok(Json(
        AddressRepository::new(state.pool())
            .set_default(id, user.id)
            .await?,
    ))
}

/// Delete an address. Deleting the default leaves no default.
pub async fn delete_address(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

/// Order history, newest first.
pub async fn orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithItems>>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_for_user(user.id)
            .await?,
    ))
}

/// One of the user's orders.
pub async fn order(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    OrderRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))
}
