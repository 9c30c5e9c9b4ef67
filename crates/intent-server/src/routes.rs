//! # Routes
//!
//! Axum router configuration.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Create the main application router
///
/// Routes:
/// - GET  /stripe-key - Publishable key for Stripe.js
/// - POST /pay - Create-and-confirm or confirm a payment
/// - POST /create-payment-intent - Create an unconfirmed intent
/// - GET  /health - Health check
/// - everything else - static files from `config.static_dir` (`/` serves index.html)
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    api_routes()
        .fallback_service(static_files)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stripe-key", get(handlers::stripe_key))
        .route("/pay", post(handlers::pay))
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
}
