//! Authenticated dashboard: the caller's own profile.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    domain::entities::account::{Account, ProfileLink},
    use_cases::account::ProfileUpdate,
};

use super::current_account;

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_own_profile).put(update_own_profile))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardProfileResponse {
    slug: String,
    display_name: String,
    trade: Option<String>,
    headline: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    links: Vec<ProfileLink>,
    trial_days: i32,
}

impl From<Account> for DashboardProfileResponse {
    fn from(account: Account) -> Self {
        Self {
            slug: account.slug,
            display_name: account.display_name,
            trade: account.trade,
            headline: account.headline,
            phone: account.phone,
            location: account.location,
            links: account.links,
            trial_days: account.trial_days,
        }
    }
}

async fn get_own_profile(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let account_id = current_account(&headers, &app_state)?;
    let account = app_state.account_use_cases.get_profile(account_id).await?;
    Ok(Json(DashboardProfileResponse::from(account)))
}

async fn update_own_profile(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ProfileUpdate>,
) -> AppResult<impl IntoResponse> {
    let account_id = current_account(&headers, &app_state)?;
    let account = app_state
        .account_use_cases
        .update_profile(account_id, &input)
        .await?;
    Ok(Json(DashboardProfileResponse::from(account)))
}
