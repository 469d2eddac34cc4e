//! Error types used by the bus and by handlers.
//!
//! This module defines two enums:
//!
//! - [`HandlerError`] — failures raised by a single handler invocation.
//! - [`BusError`] — errors raised while constructing the bus itself.
//!
//! Both provide `as_label` / `as_message` helpers for logs.
//! Handler errors never leave the dispatch boundary; they only reach the
//! configured [`DiagnosticSink`](crate::DiagnosticSink).

use std::any::Any;
use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by handler execution.
///
/// A handler reports failure by returning `Err(HandlerError)`; a panic inside a handler is
/// caught by the dispatcher and converted into [`HandlerError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("{error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked while running.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use membus::HandlerError;
    ///
    /// let err = HandlerError::fail("smtp unreachable");
    /// assert_eq!(err.to_string(), "smtp unreachable");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        HandlerError::Failed {
            error: error.to_string(),
        }
    }

    /// Converts a caught panic payload into [`HandlerError::Panicked`].
    ///
    /// `&'static str` and `String` payloads are kept verbatim; anything else becomes `"unknown panic"`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        HandlerError::Panicked { info }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use membus::HandlerError;
    ///
    /// assert_eq!(HandlerError::fail("boom").as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Returns `true` if the handler panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}

/// # Errors produced while building a bus.
///
/// Publishing, subscribing and unsubscribing are infallible; only construction can fail.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// No tokio runtime was available to run handlers on.
    #[error("no tokio runtime available; build inside a runtime or pass one via `with_runtime`")]
    NoRuntime,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::NoRuntime => "bus_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::NoRuntime => "no tokio runtime in context".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_str() {
        let err = HandlerError::from_panic(Box::new("boom"));
        assert_eq!(
            err,
            HandlerError::Panicked {
                info: "boom".into()
            }
        );
        assert!(err.is_panic());
        assert_eq!(err.as_label(), "handler_panicked");
    }

    #[test]
    fn test_panic_payload_string() {
        let err = HandlerError::from_panic(Box::new(String::from("formatted 42")));
        assert_eq!(err.to_string(), "panicked: formatted 42");
    }

    #[test]
    fn test_panic_payload_other() {
        let err = HandlerError::from_panic(Box::new(17_u32));
        assert_eq!(err.as_message(), "panic: unknown panic");
    }

    #[test]
    fn test_fail_keeps_message() {
        let err = HandlerError::fail(format_args!("code={}", 7));
        assert_eq!(err.to_string(), "code=7");
        assert_eq!(err.as_message(), "error: code=7");
        assert!(!err.is_panic());
    }

    #[test]
    fn test_bus_error_label() {
        assert_eq!(BusError::NoRuntime.as_label(), "bus_no_runtime");
    }
}
