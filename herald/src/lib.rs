//! # herald - In-Process Message Dispatch
//!
//! `herald` routes messages to the handlers registered for their exact
//! type. Dispatch is synchronous and runs on the caller's thread: every
//! handler is invoked in registration order, each one isolated from the
//! failures of the others, with lifecycle notifications sent to observers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Message)]
//! struct OrderCreated { id: u64 }
//!
//! struct Mailer;
//! impl Handler<OrderCreated> for Mailer {
//!     fn handle(&self, order: &OrderCreated) -> HandleResult {
//!         println!("order {} created", order.id);
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register::<OrderCreated, _>(Arc::new(Mailer));
//! dispatcher.dispatch(&OrderCreated { id: 7 });
//! ```
//!
//! ## Discovery
//!
//! Handler modules can mark handlers for auto-registration instead of
//! wiring them by hand:
//!
//! ```rust,ignore
//! #[derive(Default)]
//! #[herald::auto_register(OrderCreated)]
//! struct Mailer;
//!
//! let dispatcher = Dispatcher::create_and_register(env!("CARGO_CRATE_NAME"))?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use herald_core::{
    // Errors
    BoxError,
    // Observers
    DispatchContext,
    DiscoveryError,
    DispatchObserver,
    DispatchPhase,
    FnObserver,
    // Handler
    HandleResult,
    Handler,
    HandlerError,
    HandlerId,
    // Message
    Message,
    MessageType,
    panic_message,
};

pub use herald_std::{
    // Dispatch
    Dispatcher,
    DispatcherBuilder,
    // Registry
    HandlerEntry,
    HandlerList,
    HandlerRegistry,
    ObserverId,
    // Discovery
    declare_module,
    register_handler,
};

/// Auto-registration of handler modules.
pub mod discovery {
    pub use herald_std::discovery::{
        Discovery, HandlerRegistration, InventoryLoader, ModuleDescriptor, ModuleLoader,
        StaticCatalog, install_with,
    };
}

/// Standard observer implementations.
pub mod observers {
    pub use herald_std::observers::LoggingObserver;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::testing::*;
}

/// Prelude module - common imports for Herald.
///
/// # Usage
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        DiscoveryError,
        // Observers
        DispatchContext,
        DispatchObserver,
        DispatchPhase,
        // Dispatch
        Dispatcher,
        // Core traits
        HandleResult,
        Handler,
        HandlerError,
        Message,
    };

    #[cfg(feature = "macros")]
    pub use crate::auto_register;
}

#[cfg(feature = "macros")]
pub use herald_macros::{Message, auto_register};

pub use herald_std::inventory;
