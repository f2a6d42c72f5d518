use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{PaymentProviderPort, SubscriptionId},
    domain::entities::payment_provider::PaymentProvider,
    infra::http_client::build_client,
};

#[derive(Clone)]
pub struct PayPalClient {
    client: Client,
    api_base: Url,
    client_id: String,
    client_secret: SecretString,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl PayPalClient {
    pub fn new(api_base: Url, client_id: String, client_secret: SecretString) -> Self {
        Self {
            client: build_client(),
            api_base,
            client_id,
            client_secret,
        }
    }

    /// Client-credentials token exchange. The shared client timeouts bound
    /// this call; a slow or unreachable processor surfaces as a provider
    /// error instead of holding the caller's request open.
    async fn fetch_access_token(&self) -> AppResult<String> {
        let url = endpoint(&self.api_base, "v1/oauth2/token")?;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("PayPal token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "PayPal token request returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("PayPal token response unreadable: {e}")))?;
        Ok(token.access_token)
    }
}

fn endpoint(base: &Url, path: &str) -> AppResult<Url> {
    base.join(path)
        .map_err(|e| AppError::Internal(format!("Invalid PayPal API URL: {e}")))
}

#[async_trait]
impl PaymentProviderPort for PayPalClient {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Paypal
    }

    async fn cancel_subscription(&self, id: &SubscriptionId, reason: &str) -> AppResult<()> {
        let token = self.fetch_access_token().await?;
        let url = endpoint(&self.api_base, &format!("v1/billing/subscriptions/{id}/cancel"))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "reason": reason }))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("PayPal cancel request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "PayPal cancel returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
