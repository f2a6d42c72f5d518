//! HTTP client factory with consistent timeout configuration.
//!
//! All HTTP clients in the API should use this module to ensure proper timeout
//! behavior. New HTTP clients MUST use `build_client()` rather than
//! constructing `reqwest::Client` directly.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
///
/// This is appropriate for external API calls (PayPal) which are expected to
/// complete within seconds. An unresponsive processor must not be able to
/// hold a cancellation request open past this bound.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client with default timeouts.
///
/// Panics if the client cannot be built (e.g., TLS misconfiguration).
/// This is acceptable for singleton constructors (PayPalClient) since the
/// app cannot function without HTTP clients.
pub fn build_client() -> Client {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}
