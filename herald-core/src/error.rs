//! Error types for Herald.
//!
//! - [`HandlerError`] - A handler invocation that did not complete
//! - [`DiscoveryError`] - Failures while auto-registering handler modules

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a single handler invocation failed.
///
/// Handler failures never reach the caller of `dispatch`; they are only
/// reported to observers through `on_dispatch_failed`.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("handler returned an error: {0}")]
    Failed(#[source] BoxError),

    /// The handler panicked and the panic was caught.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Build a `Panicked` error from a payload returned by `catch_unwind`.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        HandlerError::Panicked(panic_message(payload))
    }

    /// Whether the handler panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked(_))
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Failed(err)
    }
}

/// Errors raised while discovering and registering handler modules.
///
/// Discovery errors are fatal: they are returned to the caller and stop
/// the discovery run. Registrations made before the error are kept.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// No handler module with this name is known to the loader.
    #[error("handler module not found: {0}")]
    ModuleNotFound(String),

    /// A marked handler could not be constructed.
    #[error("failed to instantiate handler `{handler}` for message `{message}`")]
    Instantiation {
        /// Type name of the handler.
        handler: &'static str,
        /// Type name of the message the instance was meant for.
        message: &'static str,
        /// The constructor's error.
        #[source]
        source: BoxError,
    },
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
