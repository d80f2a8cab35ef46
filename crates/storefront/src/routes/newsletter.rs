//! Newsletter subscription route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::models::SubscribeOutcome;
use crate::services::NewsletterService;
use crate::services::newsletter::UNSUBSCRIBED_MESSAGE;
use crate::state::AppState;

/// Newsletter form body. A missing email is reported as "Email is required".
#[derive(Debug, Default, Deserialize)]
pub struct NewsletterForm {
    pub email: Option<String>,
}

/// Success body shown under the form.
#[derive(Debug, Serialize)]
pub struct NewsletterResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubscribeOutcome>,
}

/// Subscribe an address, reactivating it if it had unsubscribed.
#[instrument(skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(form): Json<NewsletterForm>,
) -> Result<(StatusCode, Json<NewsletterResponse>)> {
    let outcome = NewsletterService::new(state.pool())
        .subscribe(form.email.as_deref())
        .await?;
    tracing::info!(?outcome, "Newsletter subscription");

    let status = match outcome {
        SubscribeOutcome::Subscribed => StatusCode::CREATED,
        SubscribeOutcome::Resubscribed | SubscribeOutcome::AlreadySubscribed => StatusCode::OK,
    };
    Ok((
        status,
        Json(NewsletterResponse {
            success: true,
            message: outcome.message(),
            outcome: Some(outcome),
        }),
    ))
}

/// Unsubscribe an address.
#[instrument(skip_all)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(form): Json<NewsletterForm>,
) -> Result<Json<NewsletterResponse>> {
    NewsletterService::new(state.pool())
        .unsubscribe(form.email.as_deref())
        .await?;
    Ok(Json(NewsletterResponse {
        success: true,
        message: UNSUBSCRIBED_MESSAGE,
        outcome: None,
    }))
}
