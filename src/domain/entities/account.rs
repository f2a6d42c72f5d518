use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trial;

/// A single entry on a public profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    pub label: String,
    pub url: String,
}

/// A registered user owning exactly one public profile slug.
///
/// Identity (sign-up, login, password reset) lives with the external auth
/// provider; this row carries the profile content and the trial window. The
/// trial fields are written once at provisioning time and treated as
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    /// Unique, matched case-insensitively.
    pub slug: String,
    pub display_name: String,
    pub trade: Option<String>,
    pub headline: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<ProfileLink>,
    pub trial_started_at: Option<NaiveDateTime>,
    pub trial_days: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Account {
    /// Days remaining in this account's trial window at `now`.
    pub fn trial_days_left(&self, now: NaiveDateTime) -> i64 {
        let start = trial::trial_start(self.trial_started_at, self.created_at, now);
        trial::days_left(self.trial_days, start, now)
    }
}
