//! # intent-server
//!
//! HTTP layer for the card payment relay.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/stripe-key` | Publishable key for the browser |
//! | POST | `/pay` | Create-and-confirm, or confirm after 3D Secure |
//! | POST | `/create-payment-intent` | Unconfirmed intent for a new customer |
//! | GET | `/health` | Health check |
//! | GET | `/*` | Demo frontend from `STATIC_DIR` |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
