use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{PaymentProviderPort, SubscriptionId},
    domain::entities::{
        account_state::DerivedState,
        billing_event::{BillingIntent, EventCorrelation, NormalizedEvent},
        payment_provider::PaymentProvider,
        subscription::{SubscriptionRecord, SubscriptionStatus},
    },
    use_cases::account::AccountRepo,
};

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_account_id(&self, account_id: Uuid) -> AppResult<Option<SubscriptionRecord>>;
    /// Fallback correlation for events that carry no account reference.
    async fn get_by_payer_id(&self, payer_id: &str) -> AppResult<Option<SubscriptionRecord>>;
    /// Upsert keyed by account id. The incoming record wins whole (storage
    /// level last-write-wins; ordering is enforced by the caller).
    async fn upsert(&self, record: &SubscriptionRecord) -> AppResult<SubscriptionRecord>;
    /// Conditional claim: attaches only while the subscription id is not held
    /// by any other account. The loser of a race gets a conflict.
    async fn attach(
        &self,
        account_id: Uuid,
        provider: PaymentProvider,
        provider_subscription_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<SubscriptionRecord>;
    /// Cancellation is a status transition scoped to the owning account and
    /// subscription id. Rows are never deleted.
    async fn mark_cancelled(
        &self,
        account_id: Uuid,
        provider_subscription_id: &str,
        cancelled_at: NaiveDateTime,
    ) -> AppResult<Option<SubscriptionRecord>>;
}

/// What applying a webhook actually did, for acknowledgment logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WebhookOutcome {
    /// Record upserted with the given status.
    Applied(SubscriptionStatus),
    /// Event family we do not act on.
    Ignored,
    /// No account could be resolved; accepted without mutation.
    Unmatched,
    /// Carried a processor timestamp older than the newest applied event.
    Stale,
}

#[derive(Clone)]
pub struct BillingUseCases {
    accounts: Arc<dyn AccountRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    provider: Arc<dyn PaymentProviderPort>,
}

impl BillingUseCases {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        provider: Arc<dyn PaymentProviderPort>,
    ) -> Self {
        Self {
            accounts,
            subscriptions,
            provider,
        }
    }

    /// Write path of the reconciler.
    ///
    /// Applying the same event twice leaves the record unchanged. An event
    /// whose processor timestamp is older than the newest applied one is
    /// skipped instead of regressing the status; events without a processor
    /// timestamp apply in arrival order.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn apply_webhook_event(
        &self,
        event: &NormalizedEvent,
        now: NaiveDateTime,
    ) -> AppResult<WebhookOutcome> {
        let Some(status) = event.intent.target_status() else {
            return Ok(WebhookOutcome::Ignored);
        };

        let Some((account_id, existing)) = self.resolve_account(event).await? else {
            warn!(
                event_type = %event.event_type,
                "webhook event matches no account; accepting without mutation"
            );
            return Ok(WebhookOutcome::Unmatched);
        };

        if let Some(occurred_at) = event.occurred_at
            && let Some(last_event_at) = existing.as_ref().and_then(|r| r.last_event_at)
            && occurred_at < last_event_at
        {
            warn!(
                %account_id,
                %occurred_at,
                %last_event_at,
                "out-of-order webhook event skipped"
            );
            return Ok(WebhookOutcome::Stale);
        }

        let record = next_record(
            existing.as_ref(),
            event,
            status,
            account_id,
            self.provider.provider(),
            now,
        );
        self.subscriptions.upsert(&record).await?;
        Ok(WebhookOutcome::Applied(status))
    }

    async fn resolve_account(
        &self,
        event: &NormalizedEvent,
    ) -> AppResult<Option<(Uuid, Option<SubscriptionRecord>)>> {
        match &event.correlation {
            Some(EventCorrelation::AccountId(account_id)) => {
                if self.accounts.get_by_id(*account_id).await?.is_none() {
                    return Ok(None);
                }
                let existing = self.subscriptions.get_by_account_id(*account_id).await?;
                Ok(Some((*account_id, existing)))
            }
            Some(EventCorrelation::PayerId(payer_id)) => Ok(self
                .subscriptions
                .get_by_payer_id(payer_id)
                .await?
                .map(|record| (record.account_id, Some(record)))),
            None => Ok(None),
        }
    }

    /// Attach an externally created subscription to the caller's account.
    /// Exactly one of two racing callers wins; the other gets a conflict.
    #[instrument(skip(self))]
    pub async fn attach_subscription(
        &self,
        account_id: Uuid,
        subscription_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<SubscriptionRecord> {
        let subscription_id = subscription_id.trim();
        if subscription_id.is_empty() {
            return Err(AppError::InvalidInput("subscription_id is required".into()));
        }
        if self.accounts.get_by_id(account_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        self.subscriptions
            .attach(account_id, self.provider.provider(), subscription_id, now)
            .await
    }

    /// Cancel at the processor, then mark the local record.
    ///
    /// The processor call goes first and a failure aborts the whole request:
    /// marking the record inactive while the agreement keeps billing would be
    /// worse than asking the caller to retry.
    #[instrument(skip(self))]
    pub async fn cancel_subscription(
        &self,
        account_id: Uuid,
        subscription_id: &str,
        reason: Option<&str>,
        now: NaiveDateTime,
    ) -> AppResult<SubscriptionRecord> {
        let subscription_id = subscription_id.trim();
        if subscription_id.is_empty() {
            return Err(AppError::InvalidInput("subscription_id is required".into()));
        }

        // Ownership check before touching the processor.
        self.subscriptions
            .get_by_account_id(account_id)
            .await?
            .filter(|r| r.provider_subscription_id.as_deref() == Some(subscription_id))
            .ok_or(AppError::NotFound)?;

        let reason = reason.unwrap_or("Cancelled by the account holder");
        self.provider
            .cancel_subscription(&SubscriptionId::new(subscription_id), reason)
            .await?;

        self.subscriptions
            .mark_cancelled(account_id, subscription_id, now)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Billing surface: the caller's record verbatim, `past_due` included.
    pub async fn subscription_for_account(
        &self,
        account_id: Uuid,
    ) -> AppResult<Option<SubscriptionRecord>> {
        self.subscriptions.get_by_account_id(account_id).await
    }

    /// Read path of the reconciler. An unknown slug comes back as the
    /// `not_found` state; storage failures propagate as errors and are never
    /// conflated with it.
    pub async fn account_state_by_slug(
        &self,
        slug: &str,
        now: NaiveDateTime,
    ) -> AppResult<DerivedState> {
        let Some(account) = self.accounts.get_by_slug(slug).await? else {
            return Ok(DerivedState::not_found());
        };
        let record = self.subscriptions.get_by_account_id(account.id).await?;
        Ok(DerivedState::derive(&account, record.as_ref(), now))
    }

    /// Slugs whose derived state passes the visibility predicate. Runs
    /// through the same derivation as page views so the feed cannot drift
    /// from what a request for the page would decide.
    pub async fn visible_slugs(&self, now: NaiveDateTime) -> AppResult<Vec<String>> {
        let accounts = self.accounts.list_with_subscriptions().await?;
        Ok(accounts
            .into_iter()
            .filter(|(account, record)| {
                DerivedState::derive(account, record.as_ref(), now)
                    .state
                    .is_publicly_visible()
            })
            .map(|(account, _)| account.slug)
            .collect())
    }
}

/// Fold a normalized event into the record that should be persisted.
fn next_record(
    existing: Option<&SubscriptionRecord>,
    event: &NormalizedEvent,
    status: SubscriptionStatus,
    account_id: Uuid,
    provider: PaymentProvider,
    now: NaiveDateTime,
) -> SubscriptionRecord {
    let last_payment_at = match &event.intent {
        BillingIntent::Activate {
            last_payment_at: Some(t),
        } => Some(*t),
        _ => existing.and_then(|r| r.last_payment_at),
    };

    let cancelled_at = match status {
        // Reactivation clears the cancellation mark.
        SubscriptionStatus::Active => None,
        SubscriptionStatus::Inactive => existing
            .filter(|r| r.status == SubscriptionStatus::Inactive)
            .and_then(|r| r.cancelled_at)
            .or(event.occurred_at)
            .or(Some(now)),
        SubscriptionStatus::PastDue => existing.and_then(|r| r.cancelled_at),
    };

    SubscriptionRecord {
        id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
        account_id,
        provider: existing.map(|r| r.provider).unwrap_or(provider),
        provider_subscription_id: event
            .provider_subscription_id
            .clone()
            .or_else(|| existing.and_then(|r| r.provider_subscription_id.clone())),
        payer_id: event
            .payer_id
            .clone()
            .or_else(|| existing.and_then(|r| r.payer_id.clone())),
        status,
        last_payment_at,
        last_event_at: event
            .occurred_at
            .or_else(|| existing.and_then(|r| r.last_event_at)),
        cancelled_at,
        created_at: existing.and_then(|r| r.created_at).or(Some(now)),
        updated_at: Some(now),
    }
}
