//! Synchronous, type-routed message dispatcher.
//!
//! A [`Dispatcher`] owns one [`HandlerRegistry`] and a list of
//! [`DispatchObserver`]s. [`Dispatcher::dispatch`] delivers a message to
//! every handler registered for its exact type, in registration order, on
//! the caller's thread.
//!
//! # Failure isolation
//!
//! Each handler invocation is its own failure domain. An `Err` (or a panic,
//! unless disabled with [`DispatcherBuilder::isolate_panics`]) is reported
//! through `on_dispatch_failed` and delivery moves on to the next handler.
//! Nothing is returned to the caller. Observer panics are always caught.

use crate::registry::{HandlerEntry, HandlerRegistry};
use herald_core::{
    DispatchContext, DispatchObserver, Handler, HandlerError, HandlerId, Message, MessageType,
    panic_message,
};
use parking_lot::RwLock;
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Handle returned by [`Dispatcher::add_observer`], used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Clone)]
struct ObserverSlot {
    id: ObserverId,
    observer: Arc<dyn DispatchObserver>,
}

/// Routes messages to the handlers registered for their exact type.
///
/// `Dispatcher` is `Send + Sync`. Share it behind an `Arc` to register and
/// dispatch from several threads; an in-flight dispatch always works on a
/// snapshot of the handler sequence taken when it started.
///
/// # Example
/// ```ignore
/// let dispatcher = Dispatcher::builder()
///     .observer(LoggingObserver::new())
///     .build();
///
/// let mailer = Arc::new(Mailer::default());
/// dispatcher.register::<OrderCreated, _>(mailer.clone());
///
/// dispatcher.dispatch(&OrderCreated { id: 7 });
/// ```
pub struct Dispatcher {
    registry: HandlerRegistry,
    observers: RwLock<Arc<[ObserverSlot]>>,
    next_observer: AtomicU64,
    isolate_panics: bool,
}

impl Dispatcher {
    /// Create a dispatcher with default settings and no observers.
    pub fn new() -> Self {
        DispatcherBuilder::new().build()
    }

    /// Start configuring a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Register `handler` for messages of type `M`.
    ///
    /// Registering an instance that is already registered for `M` is a
    /// no-op and returns `false`.
    pub fn register<M: Message, H: Handler<M>>(&self, handler: Arc<H>) -> bool {
        self.registry.register::<M, H>(handler)
    }

    /// Register a type-erased handler for messages of type `M`.
    pub fn register_shared<M: Message>(&self, handler: Arc<dyn Handler<M>>) -> bool {
        self.registry.register_shared::<M>(handler)
    }

    /// Unregister `handler` from messages of type `M`.
    ///
    /// Returns `false` if it was not registered.
    pub fn unregister<M: Message, H: Handler<M>>(&self, handler: &Arc<H>) -> bool {
        self.registry.unregister::<M, H>(handler)
    }

    /// Unregister the handler identified by `id` from messages of type `M`.
    pub fn unregister_id<M: Message>(&self, id: HandlerId) -> bool {
        self.registry.unregister_id::<M>(id)
    }

    /// Remove every registered handler.
    pub fn clear(&self) {
        tracing::debug!("clearing all handler registrations");
        self.registry.clear();
    }

    /// Whether `handler` is registered for `M`.
    pub fn contains<M: Message, H: Handler<M>>(&self, handler: &Arc<H>) -> bool {
        self.registry.contains::<M, H>(handler)
    }

    /// Number of handlers registered for `M`.
    pub fn handler_count<M: Message>(&self) -> usize {
        self.registry.handler_count::<M>()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Deliver `message` to every handler registered for `M`, in order.
    ///
    /// Handler failures are reported to observers and never returned. With
    /// no handlers registered this returns immediately without notifying
    /// anyone.
    pub fn dispatch<M: Message>(&self, message: &M) {
        let handlers = self.registry.lookup::<M>();
        if handlers.is_empty() {
            tracing::trace!(message_type = %MessageType::of::<M>(), "no handlers registered");
            return;
        }

        let span = tracing::debug_span!(
            "dispatch",
            message_type = %MessageType::of::<M>(),
            handlers = handlers.len()
        );
        let _enter = span.enter();

        let observers = self.observers.read().clone();
        for entry in handlers.iter() {
            let ctx =
                DispatchContext::new(message, entry.instance(), entry.handler_type(), entry.id());

            notify(&observers, |o| o.on_dispatching(&ctx));
            match self.invoke(entry, message) {
                Ok(()) => notify(&observers, |o| o.on_dispatched(&ctx)),
                Err(error) => {
                    tracing::warn!(
                        handler = entry.handler_type(),
                        error = %error,
                        "handler failed"
                    );
                    notify(&observers, |o| o.on_dispatch_failed(&ctx, &error));
                }
            }
        }
    }

    fn invoke<M: Message>(&self, entry: &HandlerEntry<M>, message: &M) -> Result<(), HandlerError> {
        if !self.isolate_panics {
            return entry.handler().handle(message).map_err(HandlerError::Failed);
        }
        match catch_unwind(AssertUnwindSafe(|| entry.handler().handle(message))) {
            Ok(result) => result.map_err(HandlerError::Failed),
            Err(payload) => Err(HandlerError::from_panic(&*payload)),
        }
    }

    /// Subscribe `observer` to lifecycle notifications.
    ///
    /// Takes effect for dispatches that start after this call.
    pub fn add_observer<O: DispatchObserver>(&self, observer: O) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        let slot = ObserverSlot {
            id,
            observer: Arc::new(observer),
        };
        let mut observers = self.observers.write();
        let mut next = observers.to_vec();
        next.push(slot);
        *observers = next.into();
        id
    }

    /// Unsubscribe an observer. Returns `false` if `id` is unknown.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        if !observers.iter().any(|slot| slot.id == id) {
            return false;
        }
        let next: Vec<_> = observers.iter().filter(|slot| slot.id != id).cloned().collect();
        *observers = next.into();
        true
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Whether handler panics are caught and reported as failures.
    pub fn isolates_panics(&self) -> bool {
        self.isolate_panics
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("observers", &self.observer_count())
            .field("isolate_panics", &self.isolate_panics)
            .finish()
    }
}

fn notify(observers: &[ObserverSlot], f: impl Fn(&dyn DispatchObserver)) {
    for slot in observers {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(&*slot.observer))) {
            tracing::warn!(
                observer = ?slot.id,
                panic = %panic_message(&*payload),
                "observer panicked"
            );
        }
    }
}

/// Builder for [`Dispatcher`].
///
/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .observer(LoggingObserver::named("billing"))
///     .isolate_panics(false)
///     .build();
/// ```
pub struct DispatcherBuilder {
    observers: Vec<Arc<dyn DispatchObserver>>,
    isolate_panics: bool,
}

impl DispatcherBuilder {
    /// Defaults: no observers, panics isolated.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            isolate_panics: true,
        }
    }

    /// Subscribe an observer from the start.
    pub fn observer<O: DispatchObserver>(mut self, observer: O) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Whether to catch handler panics and report them as
    /// [`HandlerError::Panicked`]. When disabled, a panicking handler
    /// unwinds through `dispatch`.
    pub fn isolate_panics(mut self, enabled: bool) -> Self {
        self.isolate_panics = enabled;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        let observers: Vec<_> = self
            .observers
            .into_iter()
            .enumerate()
            .map(|(n, observer)| ObserverSlot {
                id: ObserverId(n as u64),
                observer,
            })
            .collect();
        Dispatcher {
            registry: HandlerRegistry::new(),
            next_observer: AtomicU64::new(observers.len() as u64),
            observers: RwLock::new(observers.into()),
            isolate_panics: self.isolate_panics,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
