pub mod billing;
pub mod dashboard;
pub mod profile;
pub mod webhooks;

use axum::{
    Router,
    http::{HeaderMap, StatusCode, header},
    routing::get,
};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/sitemap", get(profile::sitemap))
        .nest("/billing", billing::router())
        .nest("/dashboard", dashboard::router())
        .nest("/profiles", profile::router())
        .nest("/webhooks", webhooks::router())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Resolve the calling account from the bearer token.
pub(crate) fn current_account(headers: &HeaderMap, app_state: &AppState) -> AppResult<Uuid> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidCredentials)?;
    let claims = jwt::verify(token, &app_state.config.jwt_secret)?;
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidCredentials)
}
