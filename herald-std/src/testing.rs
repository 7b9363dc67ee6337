//! Testing utilities for Herald.
//!
//! This module provides handlers and observers that make it easy to assert
//! what a dispatcher did.
//!
//! # Features
//!
//! - [`RecordingObserver`]: records every lifecycle notification
//! - [`CountingHandler`]: counts invocations for any message type
//! - [`RecordingHandler`]: keeps a copy of every message it receives
//! - [`FailingHandler`]: always returns an error

use herald_core::{
    DispatchContext, DispatchObserver, DispatchPhase, HandleResult, Handler, HandlerError,
    HandlerId, Message, MessageType,
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Observer
// ============================================================================

/// One lifecycle notification as seen by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Which lifecycle point fired.
    pub phase: DispatchPhase,
    /// Exact type of the dispatched message.
    pub message_type: MessageType,
    /// Concrete type name of the handler.
    pub handler_type: &'static str,
    /// Identity of the handler instance.
    pub handler_id: HandlerId,
    /// Rendered error, for `DispatchFailed` only.
    pub error: Option<String>,
}

/// An observer that records every notification it receives.
///
/// Clones share the same record, so keep one clone and hand the other to
/// the dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingObserver::new();
/// let dispatcher = Dispatcher::builder().observer(recorder.clone()).build();
///
/// dispatcher.dispatch(&event);
///
/// assert_eq!(recorder.phases(), vec![DispatchPhase::Dispatching, DispatchPhase::Dispatched]);
/// ```
#[derive(Clone, Default)]
pub struct RecordingObserver {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far, in the order they fired.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// The phases of all notifications, in order.
    pub fn phases(&self) -> Vec<DispatchPhase> {
        self.notifications.lock().iter().map(|n| n.phase).collect()
    }

    /// Notifications of one phase.
    pub fn with_phase(&self, phase: DispatchPhase) -> Vec<Notification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.phase == phase)
            .cloned()
            .collect()
    }

    /// Phases recorded for one handler instance.
    pub fn phases_for(&self, handler: HandlerId) -> Vec<DispatchPhase> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.handler_id == handler)
            .map(|n| n.phase)
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.notifications.lock().clear();
    }

    fn record(&self, phase: DispatchPhase, ctx: &DispatchContext<'_>, error: Option<&HandlerError>) {
        self.notifications.lock().push(Notification {
            phase,
            message_type: ctx.message_type(),
            handler_type: ctx.handler_type(),
            handler_id: ctx.handler_id(),
            error: error.map(ToString::to_string),
        });
    }
}

impl DispatchObserver for RecordingObserver {
    fn on_dispatching(&self, ctx: &DispatchContext<'_>) {
        self.record(DispatchPhase::Dispatching, ctx, None);
    }

    fn on_dispatched(&self, ctx: &DispatchContext<'_>) {
        self.record(DispatchPhase::Dispatched, ctx, None);
    }

    fn on_dispatch_failed(&self, ctx: &DispatchContext<'_>, error: &HandlerError) {
        self.record(DispatchPhase::DispatchFailed, ctx, Some(error));
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations, for any message type.
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<M: Message> Handler<M> for CountingHandler {
    fn handle(&self, _message: &M) -> HandleResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that keeps a clone of every message it handles.
pub struct RecordingHandler<M> {
    messages: Mutex<Vec<M>>,
}

impl<M: Clone> RecordingHandler<M> {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Messages handled so far, in order.
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().clone()
    }

    /// Number of messages handled.
    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl<M: Clone> Default for RecordingHandler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message + Clone> Handler<M> for RecordingHandler<M> {
    fn handle(&self, message: &M) -> HandleResult {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that always fails with the given reason.
pub struct FailingHandler {
    reason: &'static str,
    attempts: AtomicUsize,
}

impl FailingHandler {
    /// Create a handler that fails with `reason`.
    pub fn new(reason: &'static str) -> Self {
        Self {
            reason,
            attempts: AtomicUsize::new(0),
        }
    }

    /// How many times it was invoked.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<M: Message> Handler<M> for FailingHandler {
    fn handle(&self, _message: &M) -> HandleResult {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.reason.into())
    }
}
