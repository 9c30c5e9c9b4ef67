//! # Application State
//!
//! Shared state for the Axum application: the payment processor, the
//! publishable key handed to the browser, and server configuration.

use intent_core::BoxedPaymentProcessor;
use intent_stripe::StripeIntentsProcessor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors in server (non-Stripe) configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid listen address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the demo frontend
    pub static_dir: PathBuf,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup, applying defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(4242),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_json: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddress { addr, source })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Remote payment processor
    pub processor: BoxedPaymentProcessor,
    /// Publishable key served at `/stripe-key`
    pub publishable_key: String,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by Stripe, reading keys from the environment
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let stripe = StripeIntentsProcessor::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        if !stripe.config().is_test_mode() {
            tracing::warn!("Using live Stripe keys");
        }

        let publishable_key = stripe.config().publishable_key.clone();

        Ok(Self::with_processor(config, Arc::new(stripe), publishable_key))
    }

    /// Create state around any processor (used by tests)
    pub fn with_processor(
        config: AppConfig,
        processor: BoxedPaymentProcessor,
        publishable_key: impl Into<String>,
    ) -> Self {
        Self {
            processor,
            publishable_key: publishable_key.into(),
            config,
        }
    }
}
