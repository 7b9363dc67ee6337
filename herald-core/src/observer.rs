//! # Lifecycle Notifications
//!
//! Observers watch each handler invocation during a dispatch. Three points
//! are reported, always in this order for a given handler:
//!
//! 1. [`DispatchObserver::on_dispatching`] before the handler runs
//! 2. [`DispatchObserver::on_dispatched`] if it returned `Ok`
//! 3. [`DispatchObserver::on_dispatch_failed`] if it returned `Err` or panicked
//!
//! Observers are a side channel for logging, metrics and tracing. They
//! cannot change the outcome of a dispatch, and a panicking observer is
//! skipped without affecting delivery.

use crate::{
    error::HandlerError,
    handler::HandlerId,
    message::{Message, MessageType},
};
use std::{any::Any, fmt, sync::Arc};

/// The data carried by every lifecycle notification.
///
/// Holds the message being dispatched and the handler instance it is being
/// delivered to. Both are type-erased; downcast with [`message`] and
/// [`handler`].
///
/// [`message`]: DispatchContext::message
/// [`handler`]: DispatchContext::handler
pub struct DispatchContext<'a> {
    message: &'a (dyn Any + Send + Sync),
    message_type: MessageType,
    handler: &'a (dyn Any + Send + Sync),
    handler_type: &'static str,
    handler_id: HandlerId,
}

impl<'a> DispatchContext<'a> {
    /// Create a context for delivering `message` to `handler`.
    pub fn new<M: Message>(
        message: &'a M,
        handler: &'a (dyn Any + Send + Sync),
        handler_type: &'static str,
        handler_id: HandlerId,
    ) -> Self {
        Self {
            message,
            message_type: MessageType::of::<M>(),
            handler,
            handler_type,
            handler_id,
        }
    }

    /// The message, if it is an `M`.
    pub fn message<M: Message>(&self) -> Option<&'a M> {
        self.message.downcast_ref::<M>()
    }

    /// The exact type of the message.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// The handler instance, if it is an `H`.
    pub fn handler<H: Any>(&self) -> Option<&'a H> {
        self.handler.downcast_ref::<H>()
    }

    /// The concrete type name of the handler.
    pub fn handler_type(&self) -> &'static str {
        self.handler_type
    }

    /// Identity of the handler instance.
    pub fn handler_id(&self) -> HandlerId {
        self.handler_id
    }
}

impl fmt::Debug for DispatchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("message_type", &self.message_type)
            .field("handler_type", &self.handler_type)
            .field("handler_id", &self.handler_id)
            .finish()
    }
}

/// The three lifecycle notification points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchPhase {
    /// A handler is about to be invoked.
    Dispatching,
    /// A handler completed successfully.
    Dispatched,
    /// A handler returned an error or panicked.
    DispatchFailed,
}

/// Observes handler invocations made by a dispatcher.
///
/// All methods default to no-ops; implement only the ones you need.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a DispatchObserver",
    label = "missing `DispatchObserver` implementation",
    note = "Observers must be `Send + Sync + 'static`."
)]
pub trait DispatchObserver: Send + Sync + 'static {
    /// Called before a handler is invoked.
    fn on_dispatching(&self, ctx: &DispatchContext<'_>) {
        let _ = ctx;
    }

    /// Called after a handler returned `Ok`.
    fn on_dispatched(&self, ctx: &DispatchContext<'_>) {
        let _ = ctx;
    }

    /// Called after a handler returned `Err` or panicked.
    fn on_dispatch_failed(&self, ctx: &DispatchContext<'_>, error: &HandlerError) {
        let _ = (ctx, error);
    }
}

impl<T: DispatchObserver + ?Sized> DispatchObserver for Arc<T> {
    fn on_dispatching(&self, ctx: &DispatchContext<'_>) {
        (**self).on_dispatching(ctx)
    }

    fn on_dispatched(&self, ctx: &DispatchContext<'_>) {
        (**self).on_dispatched(ctx)
    }

    fn on_dispatch_failed(&self, ctx: &DispatchContext<'_>, error: &HandlerError) {
        (**self).on_dispatch_failed(ctx, error)
    }
}

/// Adapts a single closure taking a [`DispatchPhase`] into an observer.
///
/// The error argument is `Some` only for [`DispatchPhase::DispatchFailed`].
///
/// # Example
///
/// ```rust,ignore
/// let observer = FnObserver::new(|phase, ctx, _err| {
///     println!("{phase:?} {}", ctx.handler_type());
/// });
/// dispatcher.add_observer(Arc::new(observer));
/// ```
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(DispatchPhase, &DispatchContext<'_>, Option<&HandlerError>) + Send + Sync + 'static,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> DispatchObserver for FnObserver<F>
where
    F: Fn(DispatchPhase, &DispatchContext<'_>, Option<&HandlerError>) + Send + Sync + 'static,
{
    fn on_dispatching(&self, ctx: &DispatchContext<'_>) {
        (self.f)(DispatchPhase::Dispatching, ctx, None)
    }

    fn on_dispatched(&self, ctx: &DispatchContext<'_>) {
        (self.f)(DispatchPhase::Dispatched, ctx, None)
    }

    fn on_dispatch_failed(&self, ctx: &DispatchContext<'_>, error: &HandlerError) {
        (self.f)(DispatchPhase::DispatchFailed, ctx, Some(error))
    }
}
