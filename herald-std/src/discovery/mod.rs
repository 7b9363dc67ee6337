//! # Handler Discovery
//!
//! Registers every handler that a named module marked for
//! auto-registration. Marking happens at compile time with
//! [`register_handler!`](crate::register_handler) and
//! [`declare_module!`](crate::declare_module); discovery only walks the
//! collected manifest.
//!
//! Registrations are processed in a stable order, sorted by handler type
//! name and then message type name. Each (handler, message) pair gets its own
//! freshly constructed instance. If a constructor fails, discovery stops
//! and reports the failure; registrations made before it stay in place.
//!
//! # Example
//!
//! ```rust,ignore
//! register_handler!(Mailer => OrderCreated);
//! declare_module!();
//!
//! let dispatcher = Dispatcher::create_and_register(env!("CARGO_CRATE_NAME"))?;
//! dispatcher.dispatch(&OrderCreated { id: 7 });
//! ```

mod loader;
mod registration;

pub use loader::{InventoryLoader, ModuleLoader, StaticCatalog};
pub use registration::{HandlerRegistration, ModuleDescriptor, install_with};

use crate::Dispatcher;
use herald_core::DiscoveryError;

/// Registers the handlers of a module with a dispatcher.
#[derive(Debug, Default, Clone)]
pub struct Discovery<L = InventoryLoader> {
    loader: L,
}

impl Discovery {
    /// Discovery over the link-time manifest.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: ModuleLoader> Discovery<L> {
    /// Discovery over a custom source of registrations.
    pub fn with_loader(loader: L) -> Self {
        Self { loader }
    }

    /// The underlying loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Construct and register every handler marked in `module`.
    ///
    /// Returns how many registrations were processed. A registration whose
    /// instance turns out to be a duplicate is still counted.
    pub fn register_module(
        &self,
        dispatcher: &Dispatcher,
        module: &str,
    ) -> Result<usize, DiscoveryError> {
        let mut registrations = self.loader.load(module)?;
        registrations.sort_by_key(|registration| {
            (
                registration.handler_type(),
                registration.message_type().name(),
            )
        });

        for registration in &registrations {
            registration.register(dispatcher)?;
        }

        tracing::info!(
            module,
            handlers = registrations.len(),
            "registered handler module"
        );
        Ok(registrations.len())
    }

    /// A new dispatcher with every handler of `module` registered.
    pub fn create_dispatcher(&self, module: &str) -> Result<Dispatcher, DiscoveryError> {
        let dispatcher = Dispatcher::new();
        self.register_module(&dispatcher, module)?;
        Ok(dispatcher)
    }
}

impl Dispatcher {
    /// A new dispatcher with every handler marked in `module` registered.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::ModuleNotFound`] if nothing names `module`, and
    /// [`DiscoveryError::Instantiation`] if a handler could not be built.
    pub fn create_and_register(module: &str) -> Result<Dispatcher, DiscoveryError> {
        Discovery::new().create_dispatcher(module)
    }

    /// Register every handler marked in `module` with this dispatcher.
    pub fn discover(&self, module: &str) -> Result<usize, DiscoveryError> {
        Discovery::new().register_module(self, module)
    }
}
