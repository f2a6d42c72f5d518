use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::ports::payment_provider::PaymentProviderPort,
    infra::{
        config::AppConfig,
        db::init_db,
        paypal_client::PayPalClient,
        rate_limit::{RateLimiterTrait, RedisRateLimiter},
    },
    use_cases::{
        account::{AccountRepo, AccountUseCases},
        billing::{BillingUseCases, SubscriptionRepo},
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let pool = init_db(&config.database_url).await?;
    let postgres_arc = Arc::new(PostgresPersistence::new(pool));

    let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
        )
        .await?,
    );

    let account_repo = postgres_arc.clone() as Arc<dyn AccountRepo>;
    let subscription_repo = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;

    let paypal = Arc::new(PayPalClient::new(
        config.paypal_api_base.clone(),
        config.paypal_client_id.clone(),
        config.paypal_client_secret.clone(),
    )) as Arc<dyn PaymentProviderPort>;

    let account_use_cases =
        AccountUseCases::new(account_repo.clone(), subscription_repo.clone());
    let billing_use_cases = BillingUseCases::new(account_repo, subscription_repo, paypal);

    Ok(AppState {
        config: Arc::new(config),
        account_use_cases: Arc::new(account_use_cases),
        billing_use_cases: Arc::new(billing_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tradepage_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
