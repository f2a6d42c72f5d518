use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use super::payment_provider::PaymentProvider;

/// Persisted status of a subscription record.
///
/// Deliberately smaller than the processor's own status vocabulary: webhook
/// normalization folds everything into these three before anything is stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    /// Paid and in good standing.
    Active,
    /// A payment was denied or refunded; grace period while the processor retries.
    PastDue,
    /// Cancelled, suspended, or expired at the processor.
    Inactive,
}

impl SubscriptionStatus {
    /// Fold a processor-reported status string into the persisted vocabulary.
    ///
    /// Unknown strings land on `Inactive` so a surprising processor value can
    /// never grant access.
    pub fn from_provider(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "past_due" | "incomplete" | "suspended" => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::Inactive,
        }
    }

    /// Whether this status alone grants access, regardless of trial state.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Whether the subscriber is in the payment-retry grace period.
    pub fn is_grace_period(&self) -> bool {
        matches!(self, SubscriptionStatus::PastDue)
    }
}

/// Locally persisted mirror of the processor's view of a recurring payment
/// agreement. At most one per account; never hard-deleted (cancellation is a
/// status transition).
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub provider: PaymentProvider,
    /// Processor-side subscription id. Absent on records created from payment
    /// events that carried no agreement reference.
    pub provider_subscription_id: Option<String>,
    /// Processor-side payer id, kept as a fallback correlation key.
    pub payer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub last_payment_at: Option<NaiveDateTime>,
    /// Processor timestamp of the newest event applied to this record.
    /// Guards against out-of-order webhook delivery regressing the status.
    pub last_event_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_provider_maps_active() {
        assert_eq!(
            SubscriptionStatus::from_provider("active"),
            SubscriptionStatus::Active
        );
        assert_eq!(
            SubscriptionStatus::from_provider("ACTIVE"),
            SubscriptionStatus::Active
        );
    }

    #[test]
    fn from_provider_folds_grace_statuses_into_past_due() {
        for s in ["past_due", "incomplete", "suspended"] {
            assert_eq!(
                SubscriptionStatus::from_provider(s),
                SubscriptionStatus::PastDue,
                "expected {s} to fold into past_due"
            );
        }
    }

    #[test]
    fn from_provider_defaults_unknown_to_inactive() {
        assert_eq!(
            SubscriptionStatus::from_provider("approval_pending"),
            SubscriptionStatus::Inactive
        );
        assert_eq!(
            SubscriptionStatus::from_provider(""),
            SubscriptionStatus::Inactive
        );
    }

    #[test]
    fn display_matches_as_ref() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Inactive,
        ] {
            assert_eq!(format!("{}", status), status.as_ref());
        }
    }

    #[test]
    fn only_active_grants_access_on_its_own() {
        assert!(SubscriptionStatus::Active.is_active());
        assert!(!SubscriptionStatus::PastDue.is_active());
        assert!(!SubscriptionStatus::Inactive.is_active());
        assert!(SubscriptionStatus::PastDue.is_grace_period());
    }
}
