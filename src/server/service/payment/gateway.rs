//! Thin client for the external payment gateway.
//!
//! The gateway itself is an external collaborator; this client only performs
//! the outbound reference verification call when a gateway base URL is
//! configured. Any failure here is a transient condition (the caller may
//! retry), never a payment state decision.

use url::Url;

use crate::server::{config::Config, error::AppError};

#[derive(Clone)]
pub struct PaymentGatewayClient {
    http: reqwest::Client,
    base_url: Option<Url>,
    secret: Option<String>,
}

impl PaymentGatewayClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.payment_gateway_url.clone(),
            secret: config.payment_gateway_secret.clone(),
        }
    }

    /// Verifies a transaction reference with the gateway.
    ///
    /// A no-op when no gateway is configured (local/test deployments).
    ///
    /// # Arguments
    /// - `reference`: Gateway transaction reference
    ///
    /// # Returns
    /// - `Ok(())`: Gateway confirmed the reference (or no gateway configured)
    /// - `Err(AppError::Transient)`: Gateway unreachable or returned an error
    pub async fn verify_reference(&self, reference: &str) -> Result<(), AppError> {
        let Some(base_url) = &self.base_url else {
            return Ok(());
        };

        let url = base_url
            .join(&format!("transaction/verify/{}", reference))
            .map_err(|e| AppError::InternalError(format!("Invalid gateway URL: {}", e)))?;

        let mut request = self.http.get(url);
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(AppError::Transient(format!(
                "Payment gateway returned {} for reference {}",
                response.status(),
                reference
            )));
        }

        Ok(())
    }
}
