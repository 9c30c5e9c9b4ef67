//! # Payment Intent Types
//!
//! Processor-neutral view of a payment intent and the parameters used to
//! create one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a payment intent.
///
/// Statuses the relay does not know about are kept verbatim in `Other`
/// so they can be logged and reported as unrecognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    /// Pre-2019 API name for `requires_payment_method`
    RequiresSource,
    /// Pre-2019 API name for `requires_action`
    RequiresSourceAction,
    Other(String),
}

impl IntentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::RequiresSource => "requires_source",
            IntentStatus::RequiresSourceAction => "requires_source_action",
            IntentStatus::Other(s) => s.as_str(),
        }
    }

    /// True when the customer must complete an authentication step (3DS)
    pub fn needs_customer_action(&self) -> bool {
        matches!(
            self,
            IntentStatus::RequiresAction | IntentStatus::RequiresSourceAction
        )
    }

    /// True when the attached card was rejected and a new one is needed
    pub fn needs_new_payment_method(&self) -> bool {
        matches!(
            self,
            IntentStatus::RequiresPaymentMethod | IntentStatus::RequiresSource
        )
    }
}

impl From<&str> for IntentStatus {
    fn from(s: &str) -> Self {
        match s {
            "requires_payment_method" => IntentStatus::RequiresPaymentMethod,
            "requires_confirmation" => IntentStatus::RequiresConfirmation,
            "requires_action" => IntentStatus::RequiresAction,
            "processing" => IntentStatus::Processing,
            "requires_capture" => IntentStatus::RequiresCapture,
            "canceled" => IntentStatus::Canceled,
            "succeeded" => IntentStatus::Succeeded,
            "requires_source" => IntentStatus::RequiresSource,
            "requires_source_action" => IntentStatus::RequiresSourceAction,
            other => IntentStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for IntentStatus {
    fn from(s: String) -> Self {
        IntentStatus::from(s.as_str())
    }
}

impl From<IntentStatus> for String {
    fn from(status: IntentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment intent as returned by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor id (pi_...)
    pub id: String,

    /// Lifecycle status
    pub status: IntentStatus,

    /// Secret handed to the browser so Stripe.js can act on the intent
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Amount in minor currency units
    #[serde(default)]
    pub amount: i64,

    /// ISO currency code, lowercase
    #[serde(default)]
    pub currency: String,

    /// Customer the intent is attached to
    #[serde(default)]
    pub customer: Option<String>,

    /// Set when the card is being saved for later charges
    #[serde(default)]
    pub setup_future_usage: Option<String>,
}

impl PaymentIntent {
    /// Convenience constructor used mostly by tests and mocks
    pub fn new(id: impl Into<String>, status: impl Into<IntentStatus>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            client_secret: None,
            amount: 0,
            currency: String::new(),
            customer: None,
            setup_future_usage: None,
        }
    }

    /// Builder: set client secret
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }
}

/// How a saved card will be charged in future
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupFutureUsage {
    /// Charge while the customer is present
    OnSession,
    /// Charge while the customer is away
    OffSession,
}

impl SetupFutureUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupFutureUsage::OnSession => "on_session",
            SetupFutureUsage::OffSession => "off_session",
        }
    }
}

/// Parameters for creating a payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntentParams {
    pub amount: i64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub customer: Option<String>,
    /// Create with `confirmation_method=manual` and confirm immediately
    pub confirm_manually: bool,
    pub setup_future_usage: Option<SetupFutureUsage>,
}

impl CreateIntentParams {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            payment_method: None,
            customer: None,
            confirm_manually: false,
            setup_future_usage: None,
        }
    }

    /// Builder: attach a payment method and confirm on creation
    pub fn confirm_with(mut self, payment_method: Option<String>) -> Self {
        self.payment_method = payment_method;
        self.confirm_manually = true;
        self
    }

    /// Builder: attach to a customer
    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer = Some(customer_id.into());
        self
    }

    /// Builder: attach to a customer and save the card for off-session use
    pub fn save_for_customer(self, customer_id: impl Into<String>) -> Self {
        let mut params = self.for_customer(customer_id);
        params.setup_future_usage = Some(SetupFutureUsage::OffSession);
        params
    }
}

/// A processor-side customer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
}
