use chrono::NaiveDateTime;
use serde_json::Value;
use uuid::Uuid;

use super::subscription::SubscriptionStatus;

/// What a processor webhook asks us to do to the local subscription record.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingIntent {
    /// The agreement is (back) in good standing.
    Activate {
        last_payment_at: Option<NaiveDateTime>,
    },
    /// The agreement ended at the processor (cancelled, suspended, expired).
    Deactivate,
    /// A payment was denied or refunded while the agreement stays on foot.
    Degrade,
    /// Event family we do not act on. Acknowledged and dropped.
    Ignore,
}

impl BillingIntent {
    /// Record status this intent writes, if any.
    pub fn target_status(&self) -> Option<SubscriptionStatus> {
        match self {
            BillingIntent::Activate { .. } => Some(SubscriptionStatus::Active),
            BillingIntent::Deactivate => Some(SubscriptionStatus::Inactive),
            BillingIntent::Degrade => Some(SubscriptionStatus::PastDue),
            BillingIntent::Ignore => None,
        }
    }
}

/// How an event ties back to an account.
#[derive(Debug, Clone, PartialEq)]
pub enum EventCorrelation {
    /// The account UUID stamped into `custom_id` at subscription creation.
    AccountId(Uuid),
    /// Processor payer id, resolved through a previously stored record.
    PayerId(String),
}

/// A processor event reduced to the vocabulary the reconciler understands.
///
/// Nothing beyond this boundary sees the raw event JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub event_type: String,
    pub intent: BillingIntent,
    pub correlation: Option<EventCorrelation>,
    /// Processor-side subscription id, when the resource carries one.
    pub provider_subscription_id: Option<String>,
    /// Payer id, stored so later events can correlate through it.
    pub payer_id: Option<String>,
    /// Processor timestamp of the event, used to skip out-of-order delivery.
    pub occurred_at: Option<NaiveDateTime>,
}

/// Map a raw PayPal event into a `NormalizedEvent`. Pure; never fails.
///
/// Unknown event types come back as `Ignore` so the webhook endpoint can
/// still acknowledge receipt: a non-2xx response would make the processor
/// redeliver an event we will never act on.
pub fn normalize(event_type: &str, resource: &Value, now: NaiveDateTime) -> NormalizedEvent {
    let intent = match event_type {
        "BILLING.SUBSCRIPTION.ACTIVATED" | "BILLING.SUBSCRIPTION.RE-ACTIVATED" => {
            BillingIntent::Activate {
                last_payment_at: parse_time(&resource["billing_info"]["last_payment"]["time"]),
            }
        }
        "PAYMENT.SALE.COMPLETED" => BillingIntent::Activate {
            last_payment_at: parse_time(&resource["create_time"]).or(Some(now)),
        },
        "BILLING.SUBSCRIPTION.CANCELLED"
        | "BILLING.SUBSCRIPTION.SUSPENDED"
        | "BILLING.SUBSCRIPTION.EXPIRED" => BillingIntent::Deactivate,
        "PAYMENT.SALE.DENIED" | "PAYMENT.SALE.REFUNDED" => BillingIntent::Degrade,
        _ => BillingIntent::Ignore,
    };

    let payer_id = resource["subscriber"]["payer_id"]
        .as_str()
        .or_else(|| resource["payer"]["payer_info"]["payer_id"].as_str())
        .map(str::to_owned);

    // custom_id is authoritative when it parses as an account id; the payer
    // id only correlates through a record we already stored.
    let correlation = resource["custom_id"]
        .as_str()
        .or_else(|| resource["custom"].as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(EventCorrelation::AccountId)
        .or_else(|| payer_id.clone().map(EventCorrelation::PayerId));

    // Subscription resources carry their own id; sale resources reference
    // the agreement they were charged under.
    let provider_subscription_id = if event_type.starts_with("BILLING.SUBSCRIPTION.") {
        resource["id"].as_str().map(str::to_owned)
    } else {
        resource["billing_agreement_id"].as_str().map(str::to_owned)
    };

    let occurred_at =
        parse_time(&resource["update_time"]).or_else(|| parse_time(&resource["create_time"]));

    NormalizedEvent {
        event_type: event_type.to_owned(),
        intent,
        correlation,
        provider_subscription_id,
        payer_id,
        occurred_at,
    }
}

fn parse_time(value: &Value) -> Option<NaiveDateTime> {
    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.naive_utc())
}
