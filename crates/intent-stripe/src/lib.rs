//! # intent-stripe
//!
//! Stripe implementation of [`intent_core::PaymentProcessor`].
//!
//! Uses the PaymentIntents API with manual confirmation: the intent is
//! created and confirmed in one call, and when the card needs 3D Secure the
//! browser completes `handleCardAction` before the server confirms again.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use intent_stripe::StripeIntentsProcessor;
//! use intent_core::{CreateIntentParams, PaymentProcessor};
//!
//! let processor = StripeIntentsProcessor::from_env()?;
//!
//! let params = CreateIntentParams::new(1400, "usd")
//!     .confirm_with(Some("pm_card_visa".to_string()));
//! let intent = processor.create_payment_intent(&params).await?;
//! ```

pub mod config;
pub mod intents;

// Re-exports
pub use config::StripeConfig;
pub use intents::StripeIntentsProcessor;
