//! # intent-core
//!
//! Core types and traits for the card payment relay.
//!
//! This crate provides:
//! - `PaymentProcessor` trait implemented by remote payment APIs
//! - `PaymentIntent` and `IntentStatus` describing processor state
//! - `PayRequest` / `PayResponse` and the status-to-response mapping
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use intent_core::{process_payment, PayRequest};
//!
//! let request: PayRequest = serde_json::from_slice(&body)?;
//! let response = process_payment(processor.as_ref(), &request).await;
//!
//! // response is ready to be serialized back to the browser
//! ```

pub mod error;
pub mod intent;
pub mod pay;
pub mod processor;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use intent::{CreateIntentParams, Customer, IntentStatus, PaymentIntent, SetupFutureUsage};
pub use pay::{
    calculate_order_amount, generate_response, normalize_currency, process_payment,
    validate_intent_id, CartItem, PayRequest, PayResponse, CARD_DENIED_MESSAGE, ORDER_AMOUNT, UNRECOGNIZED_STATUS_MESSAGE,
};
pub use processor::{BoxedPaymentProcessor, PaymentProcessor};
