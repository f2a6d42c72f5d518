//! Authenticated billing surface: attach, cancel, and inspect the caller's
//! subscription.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    domain::entities::subscription::{SubscriptionRecord, SubscriptionStatus},
};

use super::current_account;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscription", get(get_subscription).post(attach_subscription))
        .route("/subscription/cancel", post(cancel_subscription))
}

#[derive(Deserialize)]
struct AttachRequest {
    subscription_id: String,
}

#[derive(Deserialize)]
struct CancelRequest {
    subscription_id: String,
    reason: Option<String>,
}

/// The caller's record verbatim, including `past_due`. This is the one
/// surface where the grace period is reported as such.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResponse {
    status: SubscriptionStatus,
    provider_subscription_id: Option<String>,
    last_payment_at: Option<NaiveDateTime>,
    cancelled_at: Option<NaiveDateTime>,
}

impl From<SubscriptionRecord> for SubscriptionResponse {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            status: record.status,
            provider_subscription_id: record.provider_subscription_id,
            last_payment_at: record.last_payment_at,
            cancelled_at: record.cancelled_at,
        }
    }
}

#[derive(Serialize)]
struct BillingSurfaceResponse {
    subscription: Option<SubscriptionResponse>,
}

async fn get_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let account_id = current_account(&headers, &app_state)?;
    let record = app_state
        .billing_use_cases
        .subscription_for_account(account_id)
        .await?;
    Ok(Json(BillingSurfaceResponse {
        subscription: record.map(SubscriptionResponse::from),
    }))
}

async fn attach_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<AttachRequest>,
) -> AppResult<impl IntoResponse> {
    let account_id = current_account(&headers, &app_state)?;
    let now = Utc::now().naive_utc();
    let record = app_state
        .billing_use_cases
        .attach_subscription(account_id, &input.subscription_id, now)
        .await?;
    Ok(Json(SubscriptionResponse::from(record)))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CancelRequest>,
) -> AppResult<impl IntoResponse> {
    let account_id = current_account(&headers, &app_state)?;
    let now = Utc::now().naive_utc();
    let record = app_state
        .billing_use_cases
        .cancel_subscription(
            account_id,
            &input.subscription_id,
            input.reason.as_deref(),
            now,
        )
        .await?;
    Ok(Json(SubscriptionResponse::from(record)))
}
