use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub redis_url: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    pub database_url: String,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy (Caddy, nginx).
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    /// PayPal REST base, switchable to the sandbox host for test environments.
    pub paypal_api_base: Url,
    pub paypal_client_id: String,
    pub paypal_client_secret: SecretString,
    /// Shown on suspended public pages so visitors can reach support.
    pub support_url: Url,
    /// Retry-After hint on suspended public pages, in seconds.
    pub unavailable_retry_after_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 86_400);

        let app_origin: Url = get_env("APP_ORIGIN");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 120);
        let database_url: String = get_env("DATABASE_URL");
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        let paypal_api_base: Url = get_env_default(
            "PAYPAL_API_BASE",
            Url::parse("https://api-m.paypal.com").unwrap(),
        );
        let paypal_client_id: String = get_env("PAYPAL_CLIENT_ID");
        let paypal_client_secret: SecretString =
            SecretString::new(get_env::<String>("PAYPAL_CLIENT_SECRET").into());

        let support_url: Url = get_env_default(
            "SUPPORT_URL",
            Url::parse("https://tradepage.app/support").unwrap(),
        );
        let unavailable_retry_after_secs: u64 =
            get_env_default("UNAVAILABLE_RETRY_AFTER_SECS", 3600);

        Self {
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            app_origin,
            cors_origin,
            bind_addr,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            database_url,
            trust_proxy,
            paypal_api_base,
            paypal_client_id,
            paypal_client_secret,
            support_url,
            unavailable_retry_after_secs,
        }
    }
}
