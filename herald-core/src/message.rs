//! Message trait and exact message type identity.

use std::{
    any::{TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
};

/// A marker trait for values that can be dispatched.
///
/// Messages must be `Send + Sync + 'static` so that a dispatcher can be
/// shared across threads and observers can inspect them as `dyn Any`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct OrderCreated { id: u64 }
///
/// impl Message for OrderCreated {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Implement `Message` (or derive it) for every type passed to `dispatch`."
)]
pub trait Message: Send + Sync + 'static {}

impl Message for () {}
impl Message for String {}
impl Message for &'static str {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for std::sync::Arc<T> {}
impl<T: Message> Message for Vec<T> {}
impl<T: Message> Message for Option<T> {}
impl<T: Message, E: Message> Message for Result<T, E> {}

/// Identity of a message's exact Rust type.
///
/// Two `MessageType`s are equal only when they describe the same type.
/// Wrappers are distinct: `MessageType::of::<Arc<M>>()` never equals
/// `MessageType::of::<M>()`.
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// The message type of `M`.
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: type_name::<M>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.name).finish()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Ping;
    impl Message for Ping {}

    struct Pong;
    impl Message for Pong {}

    #[test]
    fn test_same_type_is_equal() {
        assert_eq!(MessageType::of::<Ping>(), MessageType::of::<Ping>());
        assert_ne!(MessageType::of::<Ping>(), MessageType::of::<Pong>());
    }

    #[test]
    fn test_wrappers_are_distinct() {
        assert_ne!(MessageType::of::<Ping>(), MessageType::of::<Arc<Ping>>());
        assert_ne!(MessageType::of::<Ping>(), MessageType::of::<Box<Ping>>());
    }

    #[test]
    fn test_display_uses_type_name() {
        let ty = MessageType::of::<String>();
        assert_eq!(ty.to_string(), std::any::type_name::<String>());
        assert!(ty.name().ends_with("String"));
    }
}
