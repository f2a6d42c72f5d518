use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::account::Account;
use super::subscription::{SubscriptionRecord, SubscriptionStatus};

/// Read-time classification of an account, derived from the persisted
/// subscription record and the trial window. Never stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccountState {
    Active,
    Trial,
    PastDue,
    Expired,
    NotFound,
}

impl AccountState {
    /// Whether the public page is served. `past_due` stays visible while the
    /// processor retries the payment; only a lapsed trial or a dead
    /// agreement suspends the page.
    pub fn is_publicly_visible(&self) -> bool {
        matches!(
            self,
            AccountState::Active | AccountState::Trial | AccountState::PastDue
        )
    }

    /// Vocabulary of the unauthenticated state endpoint. Billing detail such
    /// as `past_due` lives on the authed billing surface, so it folds into
    /// `active` here: the paid agreement is still on foot.
    pub fn as_public_state(&self) -> AccountState {
        match self {
            AccountState::PastDue => AccountState::Active,
            other => *other,
        }
    }
}

/// Derived state plus the trial remainder it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedState {
    pub state: AccountState,
    pub days_left: i64,
}

impl DerivedState {
    pub fn not_found() -> Self {
        Self {
            state: AccountState::NotFound,
            days_left: 0,
        }
    }

    /// The single derivation shared by page views, the state endpoint, and
    /// the visibility feed, so no two surfaces can disagree about what
    /// "active" means.
    ///
    /// A paid `active` record wins over trial math even when the trial
    /// window has separately lapsed.
    pub fn derive(
        account: &Account,
        record: Option<&SubscriptionRecord>,
        now: NaiveDateTime,
    ) -> Self {
        let days_left = account.trial_days_left(now);
        match record.map(|r| r.status) {
            Some(SubscriptionStatus::Active) => Self {
                state: AccountState::Active,
                days_left: 0,
            },
            Some(SubscriptionStatus::PastDue) => Self {
                state: AccountState::PastDue,
                days_left,
            },
            _ if days_left > 0 => Self {
                state: AccountState::Trial,
                days_left,
            },
            _ => Self {
                state: AccountState::Expired,
                days_left: 0,
            },
        }
    }
}
