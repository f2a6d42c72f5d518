//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible
//! defaults. Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    account::Account,
    payment_provider::PaymentProvider,
    subscription::{SubscriptionRecord, SubscriptionStatus},
    trial,
};

/// Fixed reference time so trial math in tests is deterministic.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-03-10 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn test_datetime_offset_days(days: i64) -> NaiveDateTime {
    test_datetime() + chrono::Duration::days(days)
}

/// Create a test account with sensible defaults.
pub fn create_test_account(overrides: impl FnOnce(&mut Account)) -> Account {
    let now = test_datetime();
    let mut account = Account {
        id: Uuid::new_v4(),
        slug: "bobs-plumbing".to_string(),
        display_name: "Bob's Plumbing".to_string(),
        trade: Some("Plumber".to_string()),
        headline: Some("Fast, tidy emergency call-outs".to_string()),
        phone: Some("+44 7700 900123".to_string()),
        location: Some("Leeds".to_string()),
        links: vec![],
        trial_started_at: Some(now),
        trial_days: trial::DEFAULT_TRIAL_DAYS,
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut account);
    account
}

/// Account whose trial started just now. For tests that go through HTTP
/// handlers, which derive state against the real clock rather than
/// `test_datetime`.
pub fn create_live_trial_account(overrides: impl FnOnce(&mut Account)) -> Account {
    create_test_account(|account| {
        let now = chrono::Utc::now().naive_utc();
        account.trial_started_at = Some(now);
        account.created_at = Some(now);
        account.updated_at = Some(now);
        overrides(account);
    })
}

/// Create a test subscription record with sensible defaults (active).
pub fn create_test_subscription_record(
    account_id: Uuid,
    overrides: impl FnOnce(&mut SubscriptionRecord),
) -> SubscriptionRecord {
    let now = test_datetime();
    let mut record = SubscriptionRecord {
        id: Uuid::new_v4(),
        account_id,
        provider: PaymentProvider::Paypal,
        provider_subscription_id: Some(format!("I-{}", Uuid::new_v4().simple())),
        payer_id: Some(format!("PAYER{}", Uuid::new_v4().simple())),
        status: SubscriptionStatus::Active,
        last_payment_at: Some(now),
        last_event_at: Some(now),
        cancelled_at: None,
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut record);
    record
}
