//! # Request Handlers
//!
//! Axum request handlers. Each one is a thin translation between the
//! browser's JSON and the payment processor.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use intent_core::{
    calculate_order_amount, normalize_currency, process_payment, CartItem, CreateIntentParams, PayRequest,
    PayResponse, PaymentError, PaymentProcessor,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Publishable key response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeKeyResponse {
    pub public_key: String,
}

/// Create payment intent request
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub currency: String,
}

/// Create payment intent response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub public_key: String,
    pub client_secret: Option<String>,
    pub id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.client_message(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "intent-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Send the publishable key to the browser
pub async fn stripe_key(State(state): State<AppState>) -> Json<StripeKeyResponse> {
    Json(StripeKeyResponse {
        public_key: state.publishable_key.clone(),
    })
}

/// Create-and-confirm a payment, or confirm one after 3D Secure.
///
/// Always answers 200; failures travel in the `error` field.
#[instrument(
    skip(state, request),
    fields(items = request.items.len(), confirming = request.payment_intent_id.is_some())
)]
pub async fn pay(
    State(state): State<AppState>,
    Json(request): Json<PayRequest>,
) -> Json<PayResponse> {
    let response = process_payment(state.processor.as_ref(), &request).await;

    if let Some(ref message) = response.error {
        info!("Payment not completed: {}", message);
    }

    Json(response)
}

/// Create an unconfirmed intent for a customer; the browser confirms it
/// directly with Stripe.js.
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let processor = state.processor.as_ref();
    let currency = normalize_currency(&request.currency).map_err(payment_error_to_response)?;

    let customer = processor.create_customer().await.map_err(|e| {
        error!("Failed to create customer: {}", e);
        payment_error_to_response(e)
    })?;

    let params = CreateIntentParams::new(calculate_order_amount(&request.items), currency)
        .for_customer(customer.id);

    let intent = processor
        .create_payment_intent(&params)
        .await
        .map_err(|e| {
            error!("Failed to create payment intent: {}", e);
            payment_error_to_response(e)
        })?;

    info!("Created payment intent: {}", intent.id);

    Ok(Json(CreatePaymentIntentResponse {
        public_key: state.publishable_key.clone(),
        client_secret: intent.client_secret,
        id: intent.id,
    }))
}
