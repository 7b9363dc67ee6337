//! # herald-core
//!
//! Core traits for the Herald message dispatch framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! handler modules that only need to declare messages and handlers, without
//! pulling in the dispatcher implementation from `herald-std`.
//!
//! # Building Blocks
//!
//! - [`Message`]: marker for dispatchable values; [`MessageType`] is the
//!   exact-type key used for routing
//! - [`Handler`]: the single `handle` capability a handler exposes for one
//!   message type
//! - [`DispatchObserver`]: the lifecycle side channel (Dispatching,
//!   Dispatched, DispatchFailed)
//!
//! # Error Types
//!
//! - [`HandlerError`] - A failed or panicked handler invocation
//! - [`DiscoveryError`] - Module discovery failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handler;
mod message;
mod observer;

// Re-exports
pub use error::{BoxError, DiscoveryError, HandlerError, panic_message};
pub use handler::{HandleResult, Handler, HandlerId};
pub use message::{Message, MessageType};
pub use observer::{DispatchContext, DispatchObserver, DispatchPhase, FnObserver};
