//! PayPal webhook endpoint.

use axum::{Router, extract::State, http::StatusCode, routing::post};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    domain::entities::billing_event::normalize,
    use_cases::billing::WebhookOutcome,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/paypal", post(handle_paypal_webhook))
}

/// Determines if a webhook processing error should trigger a processor retry.
///
/// Returns `true` if the error is transient, meaning we should return 5xx so
/// the processor redelivers the event. Expected conditions return `false`
/// and are acknowledged with 2xx.
fn is_retryable_error(error: &AppError) -> bool {
    match error {
        // Transient errors - retry may succeed
        AppError::Database(_) => true,
        AppError::Internal(_) => true,
        AppError::RateLimited => true,
        AppError::Provider(_) => true,

        // Expected conditions - won't change with retry
        AppError::NotFound => false,
        AppError::InvalidInput(_) => false,
        AppError::InvalidCredentials => false,
        AppError::Conflict(_) => false,
    }
}

/// POST /api/webhooks/paypal
///
/// Always acknowledges events it chooses not to act on. Anything but a
/// genuine persistence failure returns 200, otherwise the processor would
/// build up a retry backlog for events we will never apply.
async fn handle_paypal_webhook(
    State(app_state): State<AppState>,
    body: String,
) -> AppResult<StatusCode> {
    let event: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "unparseable webhook body acknowledged");
            return Ok(StatusCode::OK);
        }
    };

    let event_type = event["event_type"]
        .as_str()
        .or_else(|| event["eventType"].as_str())
        .unwrap_or("");
    let now = Utc::now().naive_utc();
    let normalized = normalize(event_type, &event["resource"], now);

    match app_state
        .billing_use_cases
        .apply_webhook_event(&normalized, now)
        .await
    {
        Ok(WebhookOutcome::Applied(status)) => {
            info!(event_type, new_status = %status, "webhook applied");
            Ok(StatusCode::OK)
        }
        Ok(WebhookOutcome::Ignored) => {
            debug!(event_type, "unhandled webhook event type acknowledged");
            Ok(StatusCode::OK)
        }
        // Unmatched and stale events are logged where they are detected.
        Ok(WebhookOutcome::Unmatched) | Ok(WebhookOutcome::Stale) => Ok(StatusCode::OK),
        Err(err) if is_retryable_error(&err) => {
            error!(
                error = %err,
                event_type,
                retryable = true,
                "Webhook processing failed, returning 500 for redelivery"
            );
            Err(err)
        }
        Err(err) => {
            warn!(
                error = %err,
                event_type,
                retryable = false,
                "Webhook processing failed, acknowledging"
            );
            Ok(StatusCode::OK)
        }
    }
}
