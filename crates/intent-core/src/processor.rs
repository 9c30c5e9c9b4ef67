//! # Payment Processor Trait
//!
//! The seam between the HTTP handlers and the remote payment API.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          PaymentProcessor (trait)            │
//! │  ├── create_customer()                       │
//! │  ├── create_payment_intent()                 │
//! │  ├── retrieve_payment_intent()               │
//! │  ├── confirm_payment_intent()                │
//! │  └── provider_name()                         │
//! └──────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴────────┐     ┌────────┴───────┐
//!  │ StripeIntents  │     │  test mocks    │
//!  └────────────────┘     └────────────────┘
//! ```

use crate::error::PaymentResult;
use crate::intent::{CreateIntentParams, Customer, PaymentIntent};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote operations the relay needs from a payment processor.
///
/// Every method is a single remote call; implementations must not retry.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create an empty customer record to attach a saved card to.
    async fn create_customer(&self) -> PaymentResult<Customer>;

    /// Create a payment intent. When `params.confirm_manually` is set the
    /// processor also attempts the charge in the same call.
    async fn create_payment_intent(
        &self,
        params: &CreateIntentParams,
    ) -> PaymentResult<PaymentIntent>;

    /// Fetch the current state of an intent.
    async fn retrieve_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent>;

    /// Confirm an intent after the customer completed authentication.
    async fn confirm_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
