//! Logging observer - dispatch lifecycle as `tracing` events.

use herald_core::{DispatchContext, DispatchObserver, HandlerError};

/// An observer that logs every handler invocation.
///
/// `Dispatching` and `Dispatched` are logged at `debug`, `DispatchFailed`
/// at `warn`.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::builder()
///     .observer(LoggingObserver::named("billing"))
///     .build();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingObserver {
    name: &'static str,
}

impl LoggingObserver {
    /// Create a new `LoggingObserver` with a default name.
    pub fn new() -> Self {
        Self { name: "dispatcher" }
    }

    /// Create a new `LoggingObserver` with a custom name.
    ///
    /// The name is attached to every log line to tell dispatchers apart.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name attached to log lines.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchObserver for LoggingObserver {
    fn on_dispatching(&self, ctx: &DispatchContext<'_>) {
        tracing::debug!(
            name = %self.name,
            message_type = %ctx.message_type(),
            handler = ctx.handler_type(),
            "dispatching"
        );
    }

    fn on_dispatched(&self, ctx: &DispatchContext<'_>) {
        tracing::debug!(
            name = %self.name,
            message_type = %ctx.message_type(),
            handler = ctx.handler_type(),
            "dispatched"
        );
    }

    fn on_dispatch_failed(&self, ctx: &DispatchContext<'_>, error: &HandlerError) {
        tracing::warn!(
            name = %self.name,
            message_type = %ctx.message_type(),
            handler = ctx.handler_type(),
            panicked = error.is_panic(),
            error = %error,
            "dispatch failed"
        );
    }
}
