//! In-memory mock implementations for repository and provider traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{PaymentProviderPort, SubscriptionId},
    domain::entities::{
        account::Account,
        payment_provider::PaymentProvider,
        subscription::{SubscriptionRecord, SubscriptionStatus},
    },
    infra::rate_limit::RateLimiterTrait,
    use_cases::{
        account::{AccountRepo, ProfileUpdate},
        billing::SubscriptionRepo,
    },
};

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

/// In-memory subscription store keyed by account id, mirroring the upsert
/// and conditional-claim semantics of the Postgres implementation. Can be
/// switched into an "unavailable" mode to exercise storage-failure paths.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub records: Mutex<HashMap<Uuid, SubscriptionRecord>>,
    unavailable: Mutex<bool>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SubscriptionRecord>) -> Self {
        let map: HashMap<Uuid, SubscriptionRecord> =
            records.into_iter().map(|r| (r.account_id, r)).collect();
        Self {
            records: Mutex::new(map),
            unavailable: Mutex::new(false),
        }
    }

    /// Make every subsequent operation fail like an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// Direct read for test assertions.
    pub fn stored(&self, account_id: Uuid) -> Option<SubscriptionRecord> {
        self.records.lock().unwrap().get(&account_id).cloned()
    }

    fn guard(&self) -> AppResult<()> {
        if *self.unavailable.lock().unwrap() {
            Err(AppError::Database("Database operation failed".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn get_by_account_id(&self, account_id: Uuid) -> AppResult<Option<SubscriptionRecord>> {
        self.guard()?;
        Ok(self.records.lock().unwrap().get(&account_id).cloned())
    }

    async fn get_by_payer_id(&self, payer_id: &str) -> AppResult<Option<SubscriptionRecord>> {
        self.guard()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.payer_id.as_deref() == Some(payer_id))
            .cloned())
    }

    async fn upsert(&self, record: &SubscriptionRecord) -> AppResult<SubscriptionRecord> {
        self.guard()?;
        self.records
            .lock()
            .unwrap()
            .insert(record.account_id, record.clone());
        Ok(record.clone())
    }

    async fn attach(
        &self,
        account_id: Uuid,
        provider: PaymentProvider,
        provider_subscription_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<SubscriptionRecord> {
        self.guard()?;
        let mut records = self.records.lock().unwrap();

        let claimed_by_other = records.values().any(|r| {
            r.account_id != account_id
                && r.provider_subscription_id.as_deref() == Some(provider_subscription_id)
        });
        if claimed_by_other {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }

        let record = match records.get(&account_id) {
            Some(existing) => SubscriptionRecord {
                provider,
                provider_subscription_id: Some(provider_subscription_id.to_string()),
                status: SubscriptionStatus::Active,
                cancelled_at: None,
                updated_at: Some(now),
                ..existing.clone()
            },
            None => SubscriptionRecord {
                id: Uuid::new_v4(),
                account_id,
                provider,
                provider_subscription_id: Some(provider_subscription_id.to_string()),
                payer_id: None,
                status: SubscriptionStatus::Active,
                last_payment_at: None,
                last_event_at: None,
                cancelled_at: None,
                created_at: Some(now),
                updated_at: Some(now),
            },
        };
        records.insert(account_id, record.clone());
        Ok(record)
    }

    async fn mark_cancelled(
        &self,
        account_id: Uuid,
        provider_subscription_id: &str,
        cancelled_at: NaiveDateTime,
    ) -> AppResult<Option<SubscriptionRecord>> {
        self.guard()?;
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&account_id) else {
            return Ok(None);
        };
        if record.provider_subscription_id.as_deref() != Some(provider_subscription_id) {
            return Ok(None);
        }
        record.status = SubscriptionStatus::Inactive;
        record.cancelled_at = Some(cancelled_at);
        record.updated_at = Some(cancelled_at);
        Ok(Some(record.clone()))
    }
}

// ============================================================================
// InMemoryAccountRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryAccountRepo {
    pub accounts: Mutex<HashMap<Uuid, Account>>,
    subscriptions: Option<Arc<InMemorySubscriptionRepo>>,
}

impl InMemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let map: HashMap<Uuid, Account> = accounts.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: Mutex::new(map),
            subscriptions: None,
        }
    }

    /// Link a subscription store so `list_with_subscriptions` can answer the
    /// join the Postgres implementation does in SQL.
    pub fn linked_to(mut self, subscriptions: Arc<InMemorySubscriptionRepo>) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }
}

#[async_trait]
impl AccountRepo for InMemoryAccountRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.slug.eq_ignore_ascii_case(slug))
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, input: &ProfileUpdate) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&id).ok_or(AppError::NotFound)?;
        account.display_name = input.display_name.clone();
        account.trade = input.trade.clone();
        account.headline = input.headline.clone();
        account.phone = input.phone.clone();
        account.location = input.location.clone();
        account.links = input.links.clone();
        Ok(account.clone())
    }

    async fn list_with_subscriptions(
        &self,
    ) -> AppResult<Vec<(Account, Option<SubscriptionRecord>)>> {
        let accounts: Vec<Account> = self.accounts.lock().unwrap().values().cloned().collect();
        Ok(accounts
            .into_iter()
            .map(|account| {
                let record = self
                    .subscriptions
                    .as_ref()
                    .and_then(|s| s.stored(account.id));
                (account, record)
            })
            .collect())
    }
}

// ============================================================================
// MockPaymentProvider
// ============================================================================

/// Recording mock for the payment provider port.
#[derive(Default)]
pub struct MockPaymentProvider {
    cancelled: Mutex<Vec<String>>,
    fail_cancellations: bool,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose cancel call always fails, as if the processor were
    /// down or timing out.
    pub fn failing() -> Self {
        Self {
            cancelled: Mutex::new(vec![]),
            fail_cancellations: true,
        }
    }

    /// Subscription ids the use cases asked to cancel, in order.
    pub fn cancelled_ids(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProviderPort for MockPaymentProvider {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Paypal
    }

    async fn cancel_subscription(&self, id: &SubscriptionId, _reason: &str) -> AppResult<()> {
        if self.fail_cancellations {
            return Err(AppError::Provider(
                "PayPal cancel returned 500 Internal Server Error".into(),
            ));
        }
        self.cancelled.lock().unwrap().push(id.as_str().to_owned());
        Ok(())
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

/// Rate limiter double with a fixed decision.
pub struct InMemoryRateLimiter {
    allow: bool,
}

impl InMemoryRateLimiter {
    pub fn permissive() -> Self {
        Self { allow: true }
    }

    pub fn exhausted() -> Self {
        Self { allow: false }
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, _ip: &str) -> AppResult<()> {
        if self.allow {
            Ok(())
        } else {
            Err(AppError::RateLimited)
        }
    }
}
