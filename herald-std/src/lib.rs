//! # herald-std
//!
//! Standard implementations for the Herald message dispatch framework.
//!
//! This crate provides:
//! - **Registry**: [`HandlerRegistry`], copy-on-write handler lists keyed by
//!   exact message type
//! - **Dispatch**: [`Dispatcher`] and [`DispatcherBuilder`]
//! - **Discovery**: [`discovery::Discovery`], [`register_handler!`] and
//!   [`declare_module!`]
//! - **Standard observers**: [`observers::LoggingObserver`]
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use herald_core;
pub use herald_core::{BoxError, MessageType};

// Modules
pub mod discovery;
pub mod dispatcher;
pub mod observers;
pub mod registry;
pub mod testing;

pub use dispatcher::{Dispatcher, DispatcherBuilder, ObserverId};
pub use registry::{HandlerEntry, HandlerList, HandlerRegistry};

pub use inventory;
