//! # Pay Flow
//!
//! The browser posts a cart (first attempt) or an intent id (after 3D Secure)
//! to `/pay`. This module turns that request into processor calls and maps
//! the resulting intent status onto the response shape the client expects.

use crate::error::PaymentError;
use crate::intent::{CreateIntentParams, IntentStatus, PaymentIntent};
use crate::processor::PaymentProcessor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Amount charged for any cart, in minor units.
pub const ORDER_AMOUNT: i64 = 1400;

pub const CARD_DENIED_MESSAGE: &str = "Your card was denied, please provide a new payment method";
pub const UNRECOGNIZED_STATUS_MESSAGE: &str = "Unrecognized status";

/// Item in the client's cart. Only the id is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub id: String,
}

/// Body of `POST /pay`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Present only on the second call, after client-side authentication
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub is_saving_card: bool,
}

/// Body returned from `POST /pay`. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PayResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

impl From<PaymentError> for PayResponse {
    fn from(err: PaymentError) -> Self {
        PayResponse::error(err.client_message())
    }
}

/// Server-side order total. Carts are not priced; every order costs the same.
pub fn calculate_order_amount(_items: &[CartItem]) -> i64 {
    ORDER_AMOUNT
}

/// Map an intent's status onto the client response.
pub fn generate_response(intent: &PaymentIntent) -> PayResponse {
    match &intent.status {
        status if status.needs_customer_action() => PayResponse {
            client_secret: intent.client_secret.clone(),
            payment_intent_id: Some(intent.id.clone()),
            requires_action: Some(true),
            error: None,
        },
        status if status.needs_new_payment_method() => PayResponse::error(CARD_DENIED_MESSAGE),
        IntentStatus::Succeeded => {
            info!(payment_intent = %intent.id, "💰 Payment received!");
            PayResponse {
                client_secret: intent.client_secret.clone(),
                ..Default::default()
            }
        }
        other => {
            warn!(payment_intent = %intent.id, status = %other, "Unrecognized intent status");
            PayResponse::error(UNRECOGNIZED_STATUS_MESSAGE)
        }
    }
}

/// Run one `/pay` exchange against the processor.
///
/// Never fails: processor errors are folded into `PayResponse::error`.
#[instrument(skip(processor, request), fields(provider = processor.provider_name()))]
pub async fn process_payment(processor: &dyn PaymentProcessor, request: &PayRequest) -> PayResponse {
    let result = match request.payment_intent_id.as_deref() {
        Some(intent_id) if !intent_id.is_empty() => confirm_existing(processor, intent_id).await,
        _ => create_and_confirm(processor, request).await,
    };

    match result {
        Ok(intent) => generate_response(&intent),
        Err(e) => {
            warn!("Payment failed: {}", e);
            PayResponse::from(e)
        }
    }
}

async fn create_and_confirm(
    processor: &dyn PaymentProcessor,
    request: &PayRequest,
) -> Result<PaymentIntent, PaymentError> {
    let currency = normalize_currency(&request.currency)?;
    let amount = calculate_order_amount(&request.items);
    let mut params =
        CreateIntentParams::new(amount, currency).confirm_with(request.payment_method_id.clone());

    if request.is_saving_card {
        let customer = processor.create_customer().await?;
        debug!(customer = %customer.id, "Created customer to save card");
        params = params.save_for_customer(customer.id);
    }

    processor.create_payment_intent(&params).await
}

/// Retrieve then confirm. Confirmation is unconditional so the processor
/// reports replays and bad states in its own words.
async fn confirm_existing(
    processor: &dyn PaymentProcessor,
    intent_id: &str,
) -> Result<PaymentIntent, PaymentError> {
    validate_intent_id(intent_id)?;

    let intent = processor.retrieve_payment_intent(intent_id).await?;
    debug!(status = %intent.status, "Confirming payment intent");

    processor.confirm_payment_intent(intent_id).await
}

/// Lowercase the client's currency, rejecting a blank one before any
/// remote call is made.
pub fn normalize_currency(currency: &str) -> Result<String, PaymentError> {
    let currency = currency.trim();
    if currency.is_empty() {
        return Err(PaymentError::InvalidRequest(
            "Missing required param: currency.".to_string(),
        ));
    }
    Ok(currency.to_lowercase())
}

/// Intent ids come from the browser and end up in processor URLs; only
/// `pi_` followed by alphanumerics or underscores is accepted.
pub fn validate_intent_id(intent_id: &str) -> Result<(), PaymentError> {
    let valid = intent_id
        .strip_prefix("pi_")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(PaymentError::InvalidRequest(format!(
            "Invalid payment intent id: {}",
            intent_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentResult;
    use crate::intent::{Customer, SetupFutureUsage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and replies with a canned intent or error
    struct ScriptedProcessor {
        status: &'static str,
        fail_with: Option<&'static str>,
        calls: Mutex<Vec<String>>,
        created: Mutex<Option<CreateIntentParams>>,
    }

    impl ScriptedProcessor {
        fn returning(status: &'static str) -> Self {
            Self {
                status,
                fail_with: None,
                calls: Mutex::new(Vec::new()),
                created: Mutex::new(None),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                fail_with: Some(message),
                ..Self::returning("succeeded")
            }
        }

        fn intent(&self, id: &str) -> PaymentResult<PaymentIntent> {
            match self.fail_with {
                Some(msg) => Err(PaymentError::PaymentDeclined {
                    reason: msg.to_string(),
                    decline_code: None,
                }),
                None => Ok(PaymentIntent::new(id, self.status)
                    .with_client_secret(format!("{}_secret", id))),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentProcessor for ScriptedProcessor {
        async fn create_customer(&self) -> PaymentResult<Customer> {
            self.calls.lock().unwrap().push("create_customer".into());
            Ok(Customer { id: "cus_test".into() })
        }

        async fn create_payment_intent(
            &self,
            params: &CreateIntentParams,
        ) -> PaymentResult<PaymentIntent> {
            self.calls.lock().unwrap().push("create_intent".into());
            *self.created.lock().unwrap() = Some(params.clone());
            self.intent("pi_new")
        }

        async fn retrieve_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
            self.calls.lock().unwrap().push(format!("retrieve:{}", intent_id));
            self.intent(intent_id)
        }

        async fn confirm_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
            self.calls.lock().unwrap().push(format!("confirm:{}", intent_id));
            self.intent(intent_id)
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn cart_request() -> PayRequest {
        PayRequest {
            items: vec![CartItem { id: "photo-subscription".into() }],
            payment_method_id: Some("pm_card_visa".into()),
            currency: "USD".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_response_succeeded() {
        let intent = PaymentIntent::new("pi_1", "succeeded").with_client_secret("sec_1");
        let response = generate_response(&intent);

        assert_eq!(
            response,
            PayResponse {
                client_secret: Some("sec_1".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_generate_response_requires_action() {
        for status in ["requires_action", "requires_source_action"] {
            let intent = PaymentIntent::new("pi_1", status).with_client_secret("sec_1");
            let response = generate_response(&intent);

            assert_eq!(response.client_secret.as_deref(), Some("sec_1"));
            assert_eq!(response.payment_intent_id.as_deref(), Some("pi_1"));
            assert_eq!(response.requires_action, Some(true));
            assert!(response.error.is_none());
        }
    }

    #[test]
    fn test_generate_response_card_denied() {
        for status in ["requires_payment_method", "requires_source"] {
            let intent = PaymentIntent::new("pi_1", status).with_client_secret("sec_1");
            assert_eq!(generate_response(&intent), PayResponse::error(CARD_DENIED_MESSAGE));
        }
    }

    #[test]
    fn test_generate_response_unrecognized() {
        for status in ["processing", "canceled", "something_new"] {
            let intent = PaymentIntent::new("pi_1", status);
            assert_eq!(
                generate_response(&intent),
                PayResponse::error(UNRECOGNIZED_STATUS_MESSAGE)
            );
        }
    }

    #[test]
    fn test_response_serializes_only_present_fields() {
        let json = serde_json::to_value(PayResponse {
            client_secret: Some("sec".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "clientSecret": "sec" }));
    }

    #[test]
    fn test_request_accepts_client_json() {
        let request: PayRequest = serde_json::from_str(
            r#"{"items":[{"id":"photo-subscription"}],"currency":"usd",
                "paymentMethodId":"pm_1","isSavingCard":true}"#,
        )
        .unwrap();

        assert_eq!(request.items.len(), 1);
        assert_eq!(request.payment_method_id.as_deref(), Some("pm_1"));
        assert!(request.is_saving_card);
        assert!(request.payment_intent_id.is_none());
    }

    #[test]
    fn test_order_amount_is_fixed() {
        assert_eq!(calculate_order_amount(&[]), 1400);
        assert_eq!(
            calculate_order_amount(&[CartItem { id: "a".into() }, CartItem { id: "b".into() }]),
            1400
        );
    }

    #[tokio::test]
    async fn test_new_payment_without_saving_card() {
        let processor = ScriptedProcessor::returning("succeeded");
        let response = process_payment(&processor, &cart_request()).await;

        assert_eq!(response.client_secret.as_deref(), Some("pi_new_secret"));
        assert_eq!(processor.calls(), vec!["create_intent"]);

        let params = processor.created.lock().unwrap().clone().unwrap();
        assert_eq!(params.amount, ORDER_AMOUNT);
        assert_eq!(params.currency, "usd");
        assert!(params.confirm_manually);
        assert!(params.customer.is_none());
    }

    #[tokio::test]
    async fn test_new_payment_saving_card_creates_customer() {
        let processor = ScriptedProcessor::returning("requires_action");
        let request = PayRequest {
            is_saving_card: true,
            ..cart_request()
        };
        let response = process_payment(&processor, &request).await;

        assert_eq!(response.requires_action, Some(true));
        assert_eq!(processor.calls(), vec!["create_customer", "create_intent"]);

        let params = processor.created.lock().unwrap().clone().unwrap();
        assert_eq!(params.customer.as_deref(), Some("cus_test"));
        assert_eq!(params.setup_future_usage, Some(SetupFutureUsage::OffSession));
    }

    #[tokio::test]
    async fn test_existing_intent_is_confirmed() {
        let processor = ScriptedProcessor::returning("succeeded");
        let request = PayRequest {
            payment_intent_id: Some("pi_existing".into()),
            ..Default::default()
        };
        let response = process_payment(&processor, &request).await;

        assert_eq!(response.client_secret.as_deref(), Some("pi_existing_secret"));
        assert_eq!(
            processor.calls(),
            vec!["retrieve:pi_existing", "confirm:pi_existing"]
        );
    }

    #[tokio::test]
    async fn test_existing_intent_is_confirmed_whatever_its_status() {
        let processor = ScriptedProcessor::returning("requires_payment_method");
        let request = PayRequest {
            payment_intent_id: Some("pi_existing".into()),
            ..Default::default()
        };
        let response = process_payment(&processor, &request).await;

        assert_eq!(response, PayResponse::error(CARD_DENIED_MESSAGE));
        assert_eq!(
            processor.calls(),
            vec!["retrieve:pi_existing", "confirm:pi_existing"]
        );
    }

    #[tokio::test]
    async fn test_path_traversal_intent_id_is_rejected_before_any_call() {
        let processor = ScriptedProcessor::returning("requires_confirmation");
        for bad_id in ["../setup_intents/seti_victim", "pi_1/../../customers", "seti_1", "pi_", "pi_a%2Fb"] {
            let request = PayRequest {
                payment_intent_id: Some(bad_id.into()),
                ..Default::default()
            };
            let response = process_payment(&processor, &request).await;

            assert!(response.client_secret.is_none());
            assert!(response
                .error
                .as_deref()
                .unwrap()
                .starts_with("Invalid request: Invalid payment intent id"));
        }
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_currency_rejected_before_customer_is_created() {
        let processor = ScriptedProcessor::returning("succeeded");
        let request = PayRequest {
            is_saving_card: true,
            currency: "  ".into(),
            ..cart_request()
        };
        let response = process_payment(&processor, &request).await;

        assert_eq!(
            response,
            PayResponse::error("Invalid request: Missing required param: currency.")
        );
        assert!(processor.calls().is_empty());
    }

    #[test]
    fn test_validate_intent_id() {
        assert!(validate_intent_id("pi_3MtwBwLkdIwHu7ix28a3tqPa").is_ok());
        assert!(validate_intent_id("pi_after_3ds").is_ok());
        assert!(validate_intent_id("../setup_intents/seti_victim").is_err());
        assert!(validate_intent_id("pi_x?expand[]=customer").is_err());
    }

    #[tokio::test]
    async fn test_empty_intent_id_starts_new_payment() {
        let processor = ScriptedProcessor::returning("succeeded");
        let request = PayRequest {
            payment_intent_id: Some(String::new()),
            ..cart_request()
        };
        process_payment(&processor, &request).await;

        assert_eq!(processor.calls(), vec!["create_intent"]);
    }

    #[tokio::test]
    async fn test_processor_error_becomes_error_only_response() {
        let processor = ScriptedProcessor::failing("Your card has insufficient funds.");
        let response = process_payment(&processor, &cart_request()).await;

        assert_eq!(
            response,
            PayResponse::error("Your card has insufficient funds.")
        );
    }
}
