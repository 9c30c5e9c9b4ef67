#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use intent_core::{
    CreateIntentParams, Customer, PaymentError, PaymentIntent, PaymentProcessor, PaymentResult,
};
use intent_server::{create_router, AppConfig, AppState};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const PUBLISHABLE_KEY: &str = "pk_test_fixture";

/// What the mock processor answers with
#[derive(Clone)]
pub enum Reply {
    Status(&'static str),
    Fail(&'static str),
}

/// Processor double: every intent operation returns the same reply
pub struct MockProcessor {
    reply: Reply,
    pub calls: Mutex<Vec<String>>,
    pub last_params: Mutex<Option<CreateIntentParams>>,
}

impl MockProcessor {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
            last_params: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn reply(&self, id: &str) -> PaymentResult<PaymentIntent> {
        match self.reply {
            Reply::Status(status) => {
                Ok(PaymentIntent::new(id, status).with_client_secret(format!("{}_secret_123", id)))
            }
            Reply::Fail(message) => Err(PaymentError::PaymentDeclined {
                reason: message.to_string(),
                decline_code: Some("generic_decline".to_string()),
            }),
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_customer(&self) -> PaymentResult<Customer> {
        self.record("create_customer");
        Ok(Customer {
            id: "cus_mock".to_string(),
        })
    }

    async fn create_payment_intent(
        &self,
        params: &CreateIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        self.record("create_payment_intent");
        *self.last_params.lock().unwrap() = Some(params.clone());
        self.reply("pi_mock")
    }

    async fn retrieve_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
        self.record(format!("retrieve_payment_intent:{}", intent_id));
        self.reply(intent_id)
    }

    async fn confirm_payment_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
        self.record(format!("confirm_payment_intent:{}", intent_id));
        self.reply(intent_id)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub fn fixture_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/static")
}

pub fn create_test_state(processor: Arc<MockProcessor>) -> AppState {
    let config = AppConfig {
        static_dir: fixture_static_dir(),
        ..AppConfig::default()
    };
    AppState::with_processor(config, processor, PUBLISHABLE_KEY)
}

pub fn create_test_server(reply: Reply) -> (TestServer, Arc<MockProcessor>) {
    let processor = Arc::new(MockProcessor::new(reply));
    let app = create_router(create_test_state(processor.clone()));
    (TestServer::new(app).unwrap(), processor)
}
