//! # Handler
//!
//! The unit of behavior bound to one message type. A handler exposes a
//! single operation, [`Handler::handle`], which may fail. Failures are
//! isolated by the dispatcher: one failing handler never prevents delivery
//! to the handlers registered after it.
//!
//! # Usage Patterns
//!
//! 1. **Struct implementation**: `impl Handler<OrderCreated> for Mailer`
//! 2. **Closure**: `|msg: &OrderCreated| -> Result<(), BoxError> { ... }`
//! 3. **Several capabilities**: one struct implementing `Handler<A>` and
//!    `Handler<B>`, registered once per message type

use crate::{error::BoxError, message::Message};
use std::{fmt, sync::Arc};

/// Result of a single handler invocation.
pub type HandleResult = Result<(), BoxError>;

/// Handles messages of type `M`.
///
/// Handlers are shared (`Arc`) between the registry and their owner and are
/// invoked through `&self`; use interior mutability for state.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle messages of type `{M}`",
    label = "missing `Handler<{M}>` implementation",
    note = "Handlers must implement `handle` for the message type `{M}`."
)]
pub trait Handler<M: Message>: Send + Sync + 'static {
    /// Process one message.
    fn handle(&self, message: &M) -> HandleResult;
}

// Blanket impl for closures
impl<F, M, E> Handler<M> for F
where
    M: Message,
    E: Into<BoxError>,
    F: Fn(&M) -> Result<(), E> + Send + Sync + 'static,
{
    fn handle(&self, message: &M) -> HandleResult {
        (self)(message).map_err(Into::into)
    }
}

/// Identity of a handler instance.
///
/// Derived from the address of the shared allocation, so every `Arc` clone
/// of one instance has the same id and separately constructed instances
/// never collide while both are alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

impl HandlerId {
    /// The id of the instance behind `handler`.
    pub fn of<H: ?Sized>(handler: &Arc<H>) -> Self {
        HandlerId(Arc::as_ptr(handler).cast::<()>() as usize)
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({:#x})", self.0)
    }
}
