//! # Stripe Payment Intents
//!
//! `PaymentProcessor` backed by Stripe's Customers and PaymentIntents APIs.
//! Every call is a single form-encoded request; nothing is retried.

use crate::config::StripeConfig;
use async_trait::async_trait;
use intent_core::{
    validate_intent_id, CreateIntentParams, Customer, PaymentError, PaymentIntent, PaymentProcessor,
    PaymentResult,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe PaymentIntents processor
pub struct StripeIntentsProcessor {
    config: StripeConfig,
    client: Client,
}

impl StripeIntentsProcessor {
    /// Create a new processor with its own HTTP client
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// API URL under `/v1`. Each segment is percent-encoded on its own, so
    /// an id can never climb into another resource.
    fn url(&self, segments: &[&str]) -> PaymentResult<Url> {
        let invalid_base = || {
            PaymentError::Configuration(format!(
                "Invalid Stripe API base URL: {}",
                self.config.api_base_url
            ))
        };

        let mut url = Url::parse(&self.config.api_base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn intent_url(&self, intent_id: &str, action: Option<&str>) -> PaymentResult<Url> {
        validate_intent_id(intent_id)?;
        match action {
            Some(action) => self.url(&["payment_intents", intent_id, action]),
            None => self.url(&["payment_intents", intent_id]),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
    }

    /// Build form data for the create call
    fn create_form(params: &CreateIntentParams) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("amount", params.amount.to_string()),
            ("currency", params.currency.clone()),
        ];

        if let Some(ref pm) = params.payment_method {
            form.push(("payment_method", pm.clone()));
        }
        if params.confirm_manually {
            form.push(("confirmation_method", "manual".to_string()));
            form.push(("confirm", "true".to_string()));
        }
        if let Some(ref customer) = params.customer {
            form.push(("customer", customer.clone()));
        }
        if let Some(usage) = params.setup_future_usage {
            form.push(("setup_future_usage", usage.as_str().to_string()));
        }

        form
    }

    /// Send a request and decode the success body, mapping Stripe errors.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(parse_error_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeIntentsProcessor {
    #[instrument(skip(self))]
    async fn create_customer(&self) -> PaymentResult<Customer> {
        let empty: [(&str, &str); 0] = [];
        let customer: Customer = self
            .send(self.client.post(self.url(&["customers"])?).form(&empty))
            .await?;

        debug!("Created Stripe customer: id={}", customer.id);
        Ok(customer)
    }

    #[instrument(skip(self, params), fields(amount = params.amount, currency = %params.currency))]
    async fn create_payment_intent(
        &self,
        params: &CreateIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        if params.currency.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Missing required param: currency.".to_string(),
            ));
        }

        let form = Self::create_form(params);
        let intent: PaymentIntent = self
            .send(self.client.post(self.url(&["payment_intents"])?).form(&form))
            .await?;

        info!(
            "Created payment intent: id={}, status={}",
            intent.id, intent.status
        );
        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn retrieve_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
        let url = self.intent_url(intent_id, None)?;
        let intent: PaymentIntent = self.send(self.client.get(url)).await?;

        debug!("Retrieved payment intent: status={}", intent.status);
        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn confirm_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
        let url = self.intent_url(intent_id, Some("confirm"))?;
        let empty: [(&str, &str); 0] = [];
        let intent: PaymentIntent = self.send(self.client.post(url).form(&empty)).await?;

        info!("Confirmed payment intent: status={}", intent.status);
        Ok(intent)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    decline_code: Option<String>,
}

/// Turn a non-2xx Stripe body into a `PaymentError`.
fn parse_error_body(status: u16, body: &str) -> PaymentError {
    let Ok(StripeErrorResponse { error }) = serde_json::from_str::<StripeErrorResponse>(body)
    else {
        return PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("HTTP {}: {}", status, body),
        };
    };

    let message = error
        .message
        .or(error.code)
        .unwrap_or_else(|| format!("HTTP {}", status));

    match error.error_type.as_deref() {
        Some("card_error") => PaymentError::PaymentDeclined {
            reason: message,
            decline_code: error.decline_code,
        },
        _ => PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message,
        },
    }
}
