//! Handler manifests collected at link time via `inventory`.
//!
//! A handler module opts its handlers into discovery with
//! [`register_handler!`] (or the `#[auto_register]` attribute from
//! `herald-macros`) and announces itself with [`declare_module!`]. Nothing
//! is inspected at runtime: each marked (handler, message) pair becomes one
//! [`HandlerRegistration`] in a distributed static list.
//!
//! [`register_handler!`]: crate::register_handler
//! [`declare_module!`]: crate::declare_module

use crate::Dispatcher;
use herald_core::{BoxError, DiscoveryError, Handler, Message, MessageType};
use std::{any::type_name, fmt, sync::Arc};

/// Announces that a handler module exists, even if it marks no handlers.
pub struct ModuleDescriptor {
    /// Module name, usually the crate name.
    pub name: &'static str,
}

impl ModuleDescriptor {
    /// Describe the module `name`.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

inventory::collect!(ModuleDescriptor);

/// One handler type marked for auto-registration under one message type.
///
/// A handler declared for several message types produces one registration
/// per message type, and each registration constructs its own instance.
pub struct HandlerRegistration {
    /// Module the handler belongs to.
    pub module: &'static str,
    /// Type name of the handler.
    pub handler_type: fn() -> &'static str,
    /// Message type the handler is registered under.
    pub message_type: fn() -> MessageType,
    /// Construct a fresh instance and register it with the dispatcher.
    pub install: fn(&Dispatcher) -> Result<(), BoxError>,
}

inventory::collect!(HandlerRegistration);

impl HandlerRegistration {
    /// A registration that constructs `H` with `Default`.
    pub const fn new<M, H>(module: &'static str) -> Self
    where
        M: Message,
        H: Handler<M> + Default,
    {
        Self {
            module,
            handler_type: type_name::<H>,
            message_type: MessageType::of::<M>,
            install: install_default::<M, H>,
        }
    }

    /// Type name of the handler.
    pub fn handler_type(&self) -> &'static str {
        (self.handler_type)()
    }

    /// Message type the handler is registered under.
    pub fn message_type(&self) -> MessageType {
        (self.message_type)()
    }

    /// Construct a fresh instance and register it with `dispatcher`.
    pub fn register(&self, dispatcher: &Dispatcher) -> Result<(), DiscoveryError> {
        (self.install)(dispatcher).map_err(|source| DiscoveryError::Instantiation {
            handler: self.handler_type(),
            message: self.message_type().name(),
            source,
        })?;
        tracing::debug!(
            module = self.module,
            handler = self.handler_type(),
            message_type = %self.message_type(),
            "auto-registered handler"
        );
        Ok(())
    }
}

impl fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("module", &self.module)
            .field("handler_type", &self.handler_type())
            .field("message_type", &self.message_type())
            .finish()
    }
}

/// Build `H` with `construct` and register it for `M`.
///
/// Used by [`register_handler!`](crate::register_handler) for handlers with
/// a fallible constructor.
pub fn install_with<M, H, E, C>(dispatcher: &Dispatcher, construct: C) -> Result<(), BoxError>
where
    M: Message,
    H: Handler<M>,
    E: Into<BoxError>,
    C: FnOnce() -> Result<H, E>,
{
    let handler = construct().map_err(Into::into)?;
    dispatcher.register::<M, H>(Arc::new(handler));
    Ok(())
}

fn install_default<M, H>(dispatcher: &Dispatcher) -> Result<(), BoxError>
where
    M: Message,
    H: Handler<M> + Default,
{
    install_with::<M, H, BoxError, _>(dispatcher, || Ok(H::default()))
}

/// Mark a handler type for auto-registration.
///
/// One registration is submitted per listed message type. The module name
/// defaults to the crate name of the invoking crate. Handlers are built with
/// `Default` unless a `constructor` returning `Result<Handler, E>` is given.
///
/// # Example
///
/// ```rust,ignore
/// register_handler!(Mailer => OrderCreated);
/// register_handler!(AuditTrail => OrderCreated, PaymentReceived; module = "audit");
/// register_handler!(Ledger => PaymentReceived; constructor = Ledger::connect);
/// ```
#[macro_export]
macro_rules! register_handler {
    ($handler:ty => $($message:ty),+ ; module = $module:expr, constructor = $ctor:path) => {
        $(
            $crate::inventory::submit! {
                $crate::discovery::HandlerRegistration {
                    module: $module,
                    handler_type: ::core::any::type_name::<$handler>,
                    message_type: $crate::MessageType::of::<$message>,
                    install: {
                        fn install(
                            dispatcher: &$crate::Dispatcher,
                        ) -> ::core::result::Result<(), $crate::BoxError> {
                            $crate::discovery::install_with::<$message, $handler, _, _>(
                                dispatcher, $ctor,
                            )
                        }
                        install
                    },
                }
            }
        )+
    };
    ($handler:ty => $($message:ty),+ ; constructor = $ctor:path) => {
        $crate::register_handler!(
            $handler => $($message),+ ;
            module = ::core::env!("CARGO_CRATE_NAME"),
            constructor = $ctor
        );
    };
    ($handler:ty => $($message:ty),+ ; module = $module:expr) => {
        $(
            $crate::inventory::submit! {
                $crate::discovery::HandlerRegistration::new::<$message, $handler>($module)
            }
        )+
    };
    ($handler:ty => $($message:ty),+ $(,)?) => {
        $crate::register_handler!(
            $handler => $($message),+ ;
            module = ::core::env!("CARGO_CRATE_NAME")
        );
    };
}

/// Announce a handler module so that discovering it succeeds even when it
/// marks no handlers.
///
/// Without an argument the module is named after the invoking crate.
///
/// # Example
///
/// ```rust,ignore
/// declare_module!();
/// declare_module!("billing");
/// ```
#[macro_export]
macro_rules! declare_module {
    () => {
        $crate::declare_module!(::core::env!("CARGO_CRATE_NAME"));
    };
    ($name:expr) => {
        $crate::inventory::submit! {
            $crate::discovery::ModuleDescriptor::new($name)
        }
    };
}
