//! Public profile surface: page data, state queries, and the visibility feed.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    domain::entities::{
        account::{Account, ProfileLink},
        account_state::AccountState,
    },
    use_cases::account::ProfileGate,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(get_profile))
        .route("/{slug}/state", get(get_profile_state))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    slug: String,
    display_name: String,
    trade: Option<String>,
    headline: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    links: Vec<ProfileLink>,
}

impl From<Account> for ProfileResponse {
    fn from(account: Account) -> Self {
        Self {
            slug: account.slug,
            display_name: account.display_name,
            trade: account.trade,
            headline: account.headline,
            phone: account.phone,
            location: account.location,
            links: account.links,
        }
    }
}

/// GET /api/profiles/{slug}
async fn get_profile(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let now = Utc::now().naive_utc();
    match app_state.account_use_cases.public_profile(&slug, now).await? {
        ProfileGate::Visible { account, .. } => {
            Ok(Json(ProfileResponse::from(account)).into_response())
        }
        ProfileGate::Unavailable { .. } => Ok(unavailable_response(&app_state)),
    }
}

/// 503 with a retry hint and a noindex directive: the slug must drop out of
/// search results while suspended, but recover on its own once the owner is
/// back in good standing. Deliberately not a 404.
fn unavailable_response(app_state: &AppState) -> Response {
    let body = serde_json::json!({
        "code": "PROFILE_UNAVAILABLE",
        "message": "This page is temporarily unavailable. The owner's trial may have \
                    ended or their subscription may have lapsed.",
        "contact": app_state.config.support_url.as_str(),
    });
    let mut headers = HeaderMap::new();
    headers.insert(
        header::RETRY_AFTER,
        HeaderValue::from(app_state.config.unavailable_retry_after_secs),
    );
    headers.insert("x-robots-tag", HeaderValue::from_static("noindex"));
    (StatusCode::SERVICE_UNAVAILABLE, headers, Json(body)).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileStateResponse {
    state: AccountState,
    days_left: i64,
}

/// GET /api/profiles/{slug}/state
///
/// General state surface: `past_due` folds into `active` here; the grace
/// period is only reported on the authed billing surface.
async fn get_profile_state(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now().naive_utc();
    let derived = app_state
        .billing_use_cases
        .account_state_by_slug(&slug, now)
        .await?;

    let state = derived.state.as_public_state();
    let days_left = if state == AccountState::Trial {
        derived.days_left
    } else {
        0
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok((headers, Json(ProfileStateResponse { state, days_left })))
}

#[derive(Serialize)]
struct SitemapResponse {
    slugs: Vec<String>,
}

/// GET /api/sitemap
pub(crate) async fn sitemap(
    State(app_state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now().naive_utc();
    let slugs = app_state.billing_use_cases.visible_slugs(now).await?;
    Ok(Json(SitemapResponse { slugs }))
}
