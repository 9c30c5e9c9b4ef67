//! # Payment Error Types
//!
//! Typed errors for every call the relay makes to a payment processor.
//! Handlers flatten these into a single `error` string for the browser.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Card was declined by the issuer or failed authentication
    #[error("Payment declined: {reason}")]
    PaymentDeclined {
        reason: String,
        decline_code: Option<String>,
    },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::PaymentDeclined { .. } => 402,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Serialization(_) => 500,
        }
    }

    /// Message suitable for showing to the paying customer.
    ///
    /// Provider and decline errors return the processor's own wording
    /// verbatim; everything else falls back to the display text.
    pub fn client_message(&self) -> String {
        match self {
            PaymentError::ProviderError { message, .. } => message.clone(),
            PaymentError::PaymentDeclined { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
