//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates a minimal
//! `AppState` with in-memory mocks for testing HTTP endpoints.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::jwt,
    application::ports::payment_provider::PaymentProviderPort,
    domain::entities::{account::Account, subscription::SubscriptionRecord},
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    test_utils::{
        InMemoryAccountRepo, InMemoryRateLimiter, InMemorySubscriptionRepo, MockPaymentProvider,
    },
    use_cases::{account::AccountUseCases, billing::BillingUseCases},
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let account = create_test_account(|a| a.slug = "bobs-plumbing".to_string());
/// let app_state = TestAppStateBuilder::new()
///     .with_account(account)
///     .build();
/// ```
pub struct TestAppStateBuilder {
    accounts: Vec<Account>,
    records: Vec<SubscriptionRecord>,
    provider: Option<Arc<dyn PaymentProviderPort>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            accounts: vec![],
            records: vec![],
            provider: None,
        }
    }

    /// Add an account to the test state.
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Add a subscription record to the test state.
    pub fn with_record(mut self, record: SubscriptionRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Swap in a custom payment provider (e.g. a failing one).
    pub fn with_provider(mut self, provider: Arc<dyn PaymentProviderPort>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }

    /// Build and also hand back the mock repos for direct assertions.
    pub fn build_with_mocks(
        self,
    ) -> (
        AppState,
        Arc<InMemoryAccountRepo>,
        Arc<InMemorySubscriptionRepo>,
    ) {
        let subscription_repo = Arc::new(InMemorySubscriptionRepo::with_records(self.records));
        let account_repo = Arc::new(
            InMemoryAccountRepo::with_accounts(self.accounts).linked_to(subscription_repo.clone()),
        );
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(MockPaymentProvider::new()));

        let account_use_cases = Arc::new(AccountUseCases::new(
            account_repo.clone(),
            subscription_repo.clone(),
        ));
        let billing_use_cases = Arc::new(BillingUseCases::new(
            account_repo.clone(),
            subscription_repo.clone(),
            provider,
        ));

        let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(InMemoryRateLimiter::permissive());

        let app_state = AppState {
            config: Arc::new(test_config()),
            account_use_cases,
            billing_use_cases,
            rate_limiter,
        };
        (app_state, account_repo, subscription_repo)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal config matching what the builder wires up.
pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: SecretString::new("test_jwt_secret".into()),
        access_token_ttl: Duration::hours(24),
        app_origin: Url::parse("http://localhost:3000").unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr: "127.0.0.1:3001".parse().unwrap(),
        redis_url: String::new(),
        rate_limit_window_secs: 60,
        rate_limit_per_ip: 120,
        database_url: String::new(),
        trust_proxy: false,
        paypal_api_base: Url::parse("https://api-m.sandbox.paypal.com").unwrap(),
        paypal_client_id: "test_client_id".to_string(),
        paypal_client_secret: SecretString::new("test_client_secret".into()),
        support_url: Url::parse("https://tradepage.test/support").unwrap(),
        unavailable_retry_after_secs: 3600,
    }
}

/// Issue a bearer token accepted by routers built from `test_config`.
pub fn test_bearer_token(account_id: Uuid) -> String {
    let secret = SecretString::new("test_jwt_secret".into());
    jwt::issue(account_id, &secret, Duration::hours(1)).unwrap()
}
