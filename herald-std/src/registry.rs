//! Handler registry: exact message type to an ordered handler sequence.
//!
//! Sequences are copy-on-write. Every mutation builds a new slice and swaps
//! it in under the write lock, and [`HandlerRegistry::lookup`] hands out the
//! current slice as an `Arc`. A dispatch iterating a snapshot is therefore
//! never affected by registrations made while it runs.

use herald_core::{Handler, HandlerId, Message, MessageType};
use parking_lot::RwLock;
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// A stable snapshot of the handlers registered for `M`, in order.
pub type HandlerList<M> = Arc<[HandlerEntry<M>]>;

/// A handler instance bound to one message type.
pub struct HandlerEntry<M: Message> {
    handler: Arc<dyn Handler<M>>,
    instance: Arc<dyn Any + Send + Sync>,
    handler_type: &'static str,
    id: HandlerId,
}

impl<M: Message> HandlerEntry<M> {
    /// Bind `handler` to `M`.
    pub fn new<H: Handler<M>>(handler: Arc<H>) -> Self {
        Self {
            id: HandlerId::of(&handler),
            instance: handler.clone(),
            handler,
            handler_type: type_name::<H>(),
        }
    }

    /// Bind an already type-erased handler to `M`.
    ///
    /// Observers see the instance as an `Arc<dyn Handler<M>>`.
    pub fn from_shared(handler: Arc<dyn Handler<M>>) -> Self {
        Self {
            id: HandlerId::of(&handler),
            instance: Arc::new(Arc::clone(&handler)),
            handler,
            handler_type: type_name::<dyn Handler<M>>(),
        }
    }

    /// The typed handler.
    pub fn handler(&self) -> &dyn Handler<M> {
        &*self.handler
    }

    /// A shared reference to the handler, e.g. to keep it past `unregister`.
    pub fn shared(&self) -> Arc<dyn Handler<M>> {
        Arc::clone(&self.handler)
    }

    /// The same instance, type-erased for observers.
    pub fn instance(&self) -> &(dyn Any + Send + Sync) {
        &*self.instance
    }

    /// Concrete type name of the handler.
    pub fn handler_type(&self) -> &'static str {
        self.handler_type
    }

    /// Identity of the handler instance.
    pub fn id(&self) -> HandlerId {
        self.id
    }
}

impl<M: Message> Clone for HandlerEntry<M> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            instance: Arc::clone(&self.instance),
            handler_type: self.handler_type,
            id: self.id,
        }
    }
}

impl<M: Message> fmt::Debug for HandlerEntry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("handler_type", &self.handler_type)
            .field("id", &self.id)
            .finish()
    }
}

/// One message type's sequence. `handlers` always holds a `HandlerList<M>`
/// for the `M` the slot is keyed by.
struct Slot {
    message_type: MessageType,
    len: usize,
    handlers: Box<dyn Any + Send + Sync>,
}

impl Slot {
    fn new<M: Message>() -> Self {
        Self {
            message_type: MessageType::of::<M>(),
            len: 0,
            handlers: Box::new(empty_list::<M>()),
        }
    }

    fn list<M: Message>(&self) -> HandlerList<M> {
        self.handlers
            .downcast_ref::<HandlerList<M>>()
            .cloned()
            .unwrap_or_else(empty_list)
    }

    fn replace<M: Message>(&mut self, entries: Vec<HandlerEntry<M>>) {
        self.len = entries.len();
        self.handlers = Box::new(HandlerList::<M>::from(entries));
    }
}

fn empty_list<M: Message>() -> HandlerList<M> {
    Arc::from(Vec::new())
}

/// Maps each message type to the handlers registered for it.
///
/// Within one message type a handler instance appears at most once; the
/// same instance may be registered under several message types.
///
/// # Example
/// ```ignore
/// let registry = HandlerRegistry::new();
/// let mailer = Arc::new(Mailer::default());
///
/// assert!(registry.register::<OrderCreated, _>(mailer.clone()));
/// assert!(!registry.register::<OrderCreated, _>(mailer.clone())); // duplicate
///
/// for entry in registry.lookup::<OrderCreated>().iter() {
///     entry.handler().handle(&order)?;
/// }
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the sequence for `M`.
    ///
    /// Returns `false` without changing anything if this instance is
    /// already registered for `M`.
    pub fn register<M: Message, H: Handler<M>>(&self, handler: Arc<H>) -> bool {
        self.insert(HandlerEntry::new(handler))
    }

    /// Append a type-erased handler to the sequence for `M`.
    ///
    /// Identity is the same as for [`register`](Self::register): an
    /// instance already registered through its concrete type is not added
    /// again.
    pub fn register_shared<M: Message>(&self, handler: Arc<dyn Handler<M>>) -> bool {
        self.insert(HandlerEntry::from_shared(handler))
    }

    fn insert<M: Message>(&self, entry: HandlerEntry<M>) -> bool {
        let mut slots = self.slots.write();
        let slot = slots
            .entry(TypeId::of::<M>())
            .or_insert_with(Slot::new::<M>);

        let current = slot.list::<M>();
        if current.iter().any(|e| e.id == entry.id) {
            tracing::trace!(
                message_type = %slot.message_type,
                handler = entry.handler_type,
                "handler already registered"
            );
            return false;
        }

        tracing::trace!(
            message_type = %slot.message_type,
            handler = entry.handler_type,
            "handler registered"
        );
        let mut next = current.to_vec();
        next.push(entry);
        slot.replace(next);
        true
    }

    /// Remove `handler` from the sequence for `M`.
    ///
    /// Returns `false` if the message type is unknown or the instance is not
    /// registered for it.
    pub fn unregister<M: Message, H: Handler<M>>(&self, handler: &Arc<H>) -> bool {
        self.unregister_id::<M>(HandlerId::of(handler))
    }

    /// Remove the handler instance identified by `id` from the sequence for
    /// `M`.
    ///
    /// Works for handlers the caller holds no `Arc` to, such as discovered
    /// ones; take the id from [`lookup`](Self::lookup).
    pub fn unregister_id<M: Message>(&self, id: HandlerId) -> bool {
        let key = TypeId::of::<M>();
        let mut slots = self.slots.write();
        let Some(slot) = slots.get_mut(&key) else {
            return false;
        };

        // Outlives the guard, so a handler's last reference is never
        // dropped while the lock is held.
        let current = slot.list::<M>();
        let Some(removed) = current.iter().find(|e| e.id == id) else {
            return false;
        };

        tracing::trace!(
            message_type = %slot.message_type,
            handler = removed.handler_type,
            "handler unregistered"
        );
        let next: Vec<_> = current.iter().filter(|e| e.id != id).cloned().collect();
        let emptied = if next.is_empty() {
            slots.remove(&key)
        } else {
            slot.replace(next);
            None
        };
        drop(slots);
        drop(emptied);
        true
    }

    /// Remove every handler for every message type.
    ///
    /// Handlers are dropped after the lock is released, so a `Drop` impl may
    /// call back into the registry.
    pub fn clear(&self) {
        let cleared = std::mem::take(&mut *self.slots.write());
        drop(cleared);
    }

    /// Snapshot of the handlers for `M`, in registration order.
    pub fn lookup<M: Message>(&self) -> HandlerList<M> {
        self.slots
            .read()
            .get(&TypeId::of::<M>())
            .map(Slot::list::<M>)
            .unwrap_or_else(empty_list)
    }

    /// Whether `handler` is registered for `M`.
    pub fn contains<M: Message, H: Handler<M>>(&self, handler: &Arc<H>) -> bool {
        let id = HandlerId::of(handler);
        self.lookup::<M>().iter().any(|e| e.id == id)
    }

    /// Number of handlers registered for `M`.
    pub fn handler_count<M: Message>(&self) -> usize {
        self.slots
            .read()
            .get(&TypeId::of::<M>())
            .map_or(0, |slot| slot.len)
    }

    /// Message types that currently have at least one handler.
    pub fn message_types(&self) -> Vec<MessageType> {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.len > 0)
            .map(|slot| slot.message_type)
            .collect()
    }

    /// Whether no handler is registered for any message type.
    pub fn is_empty(&self) -> bool {
        self.slots.read().values().all(|slot| slot.len == 0)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read();
        f.debug_map()
            .entries(slots.values().map(|slot| (slot.message_type, slot.len)))
            .finish()
    }
}
