use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        account::{Account, ProfileLink},
        account_state::DerivedState,
        subscription::SubscriptionRecord,
    },
    use_cases::billing::SubscriptionRepo,
};

const MAX_PROFILE_LINKS: usize = 20;

#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;
    /// Slug lookup is case-insensitive.
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Account>>;
    async fn update_profile(&self, id: Uuid, input: &ProfileUpdate) -> AppResult<Account>;
    /// Every account joined with its subscription record, for the
    /// visibility feed.
    async fn list_with_subscriptions(
        &self,
    ) -> AppResult<Vec<(Account, Option<SubscriptionRecord>)>>;
}

/// Full replacement of the editable profile fields. The slug and the trial
/// window are not editable through this path.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub trade: Option<String>,
    pub headline: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<ProfileLink>,
}

/// Gate decision for a public page request.
#[derive(Debug, Clone)]
pub enum ProfileGate {
    Visible {
        account: Account,
        state: DerivedState,
    },
    Unavailable {
        state: DerivedState,
    },
}

#[derive(Clone)]
pub struct AccountUseCases {
    accounts: Arc<dyn AccountRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
}

impl AccountUseCases {
    pub fn new(accounts: Arc<dyn AccountRepo>, subscriptions: Arc<dyn SubscriptionRepo>) -> Self {
        Self {
            accounts,
            subscriptions,
        }
    }

    /// Decide whether the page at `slug` is served.
    #[instrument(skip(self))]
    pub async fn public_profile(&self, slug: &str, now: NaiveDateTime) -> AppResult<ProfileGate> {
        let Some(account) = self.accounts.get_by_slug(slug).await? else {
            return Ok(ProfileGate::Unavailable {
                state: DerivedState::not_found(),
            });
        };
        let record = self.subscriptions.get_by_account_id(account.id).await?;
        let state = DerivedState::derive(&account, record.as_ref(), now);
        if state.state.is_publicly_visible() {
            Ok(ProfileGate::Visible { account, state })
        } else {
            Ok(ProfileGate::Unavailable { state })
        }
    }

    pub async fn get_profile(&self, account_id: Uuid) -> AppResult<Account> {
        self.accounts
            .get_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_profile(
        &self,
        account_id: Uuid,
        input: &ProfileUpdate,
    ) -> AppResult<Account> {
        validate_profile(input)?;
        self.accounts.update_profile(account_id, input).await
    }
}

fn validate_profile(input: &ProfileUpdate) -> AppResult<()> {
    if input.display_name.trim().is_empty() {
        return Err(AppError::InvalidInput("Display name must not be empty".into()));
    }
    if input.links.len() > MAX_PROFILE_LINKS {
        return Err(AppError::InvalidInput(format!(
            "At most {MAX_PROFILE_LINKS} profile links are allowed"
        )));
    }
    for link in &input.links {
        if link.label.trim().is_empty() || link.url.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Profile links need both a label and a URL".into(),
            ));
        }
    }
    Ok(())
}
