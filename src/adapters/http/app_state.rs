use std::sync::Arc;

use crate::{
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    use_cases::{account::AccountUseCases, billing::BillingUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub account_use_cases: Arc<AccountUseCases>,
    pub billing_use_cases: Arc<BillingUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
