//! Sources of handler registrations.

use super::registration::{HandlerRegistration, ModuleDescriptor};
use herald_core::{DiscoveryError, Handler, Message, MessageType};
use std::{
    any::type_name,
    collections::{BTreeSet, HashMap},
};

/// Resolves a module name to the registrations it contains.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a ModuleLoader",
    label = "missing `ModuleLoader` implementation"
)]
pub trait ModuleLoader {
    /// Registrations belonging to `module`, in any order.
    ///
    /// Returns [`DiscoveryError::ModuleNotFound`] if the module is unknown.
    /// A known module without handlers yields an empty list.
    fn load<'a>(&'a self, module: &str) -> Result<Vec<&'a HandlerRegistration>, DiscoveryError>;
}

/// Loads registrations submitted with `register_handler!` and
/// `declare_module!` anywhere in the final binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryLoader;

impl InventoryLoader {
    /// Names of all modules known to the binary, sorted.
    pub fn modules(&self) -> Vec<&'static str> {
        let declared = inventory::iter::<ModuleDescriptor>
            .into_iter()
            .map(|descriptor| descriptor.name);
        let referenced = inventory::iter::<HandlerRegistration>
            .into_iter()
            .map(|registration| registration.module);

        declared
            .chain(referenced)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Message types `H` is marked for, sorted by name.
    ///
    /// Empty if `H` carries no auto-registration marker. A handler type
    /// listed in several modules reports each message type once.
    pub fn capabilities<H: ?Sized + 'static>(&self) -> Vec<MessageType> {
        let handler = type_name::<H>();
        let mut capabilities: Vec<MessageType> = inventory::iter::<HandlerRegistration>
            .into_iter()
            .filter(|registration| registration.handler_type() == handler)
            .map(HandlerRegistration::message_type)
            .collect();
        capabilities.sort_by_key(|message_type| message_type.name());
        capabilities.dedup();
        capabilities
    }

    /// Whether `H` is marked for auto-registration at all.
    pub fn is_marked<H: ?Sized + 'static>(&self) -> bool {
        let handler = type_name::<H>();
        inventory::iter::<HandlerRegistration>
            .into_iter()
            .any(|registration| registration.handler_type() == handler)
    }
}

impl ModuleLoader for InventoryLoader {
    fn load<'a>(&'a self, module: &str) -> Result<Vec<&'a HandlerRegistration>, DiscoveryError> {
        let registrations: Vec<&'static HandlerRegistration> =
            inventory::iter::<HandlerRegistration>
                .into_iter()
                .filter(|registration| registration.module == module)
                .collect();

        if registrations.is_empty()
            && !inventory::iter::<ModuleDescriptor>
                .into_iter()
                .any(|descriptor| descriptor.name == module)
        {
            return Err(DiscoveryError::ModuleNotFound(module.to_owned()));
        }

        Ok(registrations)
    }
}

/// An explicit, in-memory catalog of modules.
///
/// Useful in tests and wherever link-time collection is unavailable.
///
/// # Example
///
/// ```rust,ignore
/// let catalog = StaticCatalog::new()
///     .module("empty")
///     .handler::<OrderCreated, Mailer>("billing");
///
/// let discovery = Discovery::with_loader(catalog);
/// ```
#[derive(Debug, Default)]
pub struct StaticCatalog {
    modules: HashMap<&'static str, Vec<HandlerRegistration>>,
}

impl StaticCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as a module, with or without handlers.
    pub fn module(mut self, name: &'static str) -> Self {
        self.modules.entry(name).or_default();
        self
    }

    /// Add a `Default`-constructed handler `H` for `M` to `module`.
    pub fn handler<M, H>(self, module: &'static str) -> Self
    where
        M: Message,
        H: Handler<M> + Default,
    {
        self.registration(HandlerRegistration::new::<M, H>(module))
    }

    /// Add a prebuilt registration to its module.
    pub fn registration(mut self, registration: HandlerRegistration) -> Self {
        self.modules
            .entry(registration.module)
            .or_default()
            .push(registration);
        self
    }

    /// Names of all modules in the catalog, sorted.
    pub fn modules(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.modules.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl ModuleLoader for StaticCatalog {
    fn load<'a>(&'a self, module: &str) -> Result<Vec<&'a HandlerRegistration>, DiscoveryError> {
        self.modules
            .get(module)
            .map(|registrations| registrations.iter().collect())
            .ok_or_else(|| DiscoveryError::ModuleNotFound(module.to_owned()))
    }
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn load<'a>(&'a self, module: &str) -> Result<Vec<&'a HandlerRegistration>, DiscoveryError> {
        (**self).load(module)
    }
}
