#![allow(dead_code)]

use herald::{HandleResult, Handler, Message};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Test Message Types
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct OrderCreated {
    pub id: u64,
}

impl Message for OrderCreated {}

#[derive(Clone, Debug, PartialEq)]
pub struct PaymentReceived {
    pub order: u64,
    pub cents: u64,
}

impl Message for PaymentReceived {}

// ============================================================================
// Test Handlers
// ============================================================================

/// Pushes its `id` onto a shared log, to assert invocation order.
pub struct OrderRecordingHandler {
    pub id: usize,
    pub order: Arc<Mutex<Vec<usize>>>,
}

impl<M: Message> Handler<M> for OrderRecordingHandler {
    fn handle(&self, _message: &M) -> HandleResult {
        self.order.lock().unwrap().push(self.id);
        Ok(())
    }
}

/// Adds every payment to a running total.
#[derive(Default)]
pub struct PaymentTotal {
    pub cents: AtomicUsize,
}

impl PaymentTotal {
    pub fn total(&self) -> usize {
        self.cents.load(Ordering::SeqCst)
    }
}

impl Handler<PaymentReceived> for PaymentTotal {
    fn handle(&self, payment: &PaymentReceived) -> HandleResult {
        self.cents.fetch_add(payment.cents as usize, Ordering::SeqCst);
        Ok(())
    }
}

/// Panics on every message.
pub struct PanickingHandler;

impl<M: Message> Handler<M> for PanickingHandler {
    fn handle(&self, _message: &M) -> HandleResult {
        panic!("handler blew up");
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Install a fmt subscriber writing to the test harness, honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn order_log() -> Arc<Mutex<Vec<usize>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn recorder(id: usize, order: &Arc<Mutex<Vec<usize>>>) -> Arc<OrderRecordingHandler> {
    Arc::new(OrderRecordingHandler {
        id,
        order: order.clone(),
    })
}
