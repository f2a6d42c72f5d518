use async_trait::async_trait;

use crate::app_error::AppResult;
use crate::domain::entities::payment_provider::PaymentProvider;

/// Unique identifier for a subscription at the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound operations this service performs against the payment processor.
#[async_trait]
pub trait PaymentProviderPort: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    /// Cancel the agreement at the processor. Returns Ok only on a confirmed
    /// cancellation; a timeout or non-success response surfaces as a provider
    /// error so the caller can decide to retry.
    async fn cancel_subscription(&self, id: &SubscriptionId, reason: &str) -> AppResult<()>;
}
