//! # Bus diagnostics.
//!
//! The bus reports exactly two conditions, neither of which is returned to callers:
//!
//! | Variant                          | Raised by  | Message                                   |
//! |----------------------------------|------------|-------------------------------------------|
//! | [`Diagnostic::NoSubscribers`]    | `publish`  | `no subscribers for event type 'String'`  |
//! | [`Diagnostic::HandlerFailed`]    | dispatcher | `handler error (background): <detail>`    |

use std::fmt;

use crate::error::HandlerError;
use crate::key::EventKey;

/// Out-of-band report produced by the bus.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// A payload was published with zero registered handlers.
    NoSubscribers {
        /// Payload type.
        event: EventKey,
    },

    /// A handler returned an error or panicked.
    HandlerFailed {
        /// Payload type.
        event: EventKey,
        /// Name of the failing handler.
        handler: String,
        /// What went wrong.
        error: HandlerError,
    },
}

impl Diagnostic {
    /// Event type the diagnostic refers to.
    pub fn event(&self) -> EventKey {
        match self {
            Diagnostic::NoSubscribers { event } | Diagnostic::HandlerFailed { event, .. } => *event,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Diagnostic::NoSubscribers { .. } => "no_subscribers",
            Diagnostic::HandlerFailed { error, .. } => error.as_label(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoSubscribers { event } => {
                write!(f, "no subscribers for event type '{}'", event.short_name())
            }
            Diagnostic::HandlerFailed { error, .. } => {
                write!(f, "handler error (background): {error}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subscribers_message() {
        let d = Diagnostic::NoSubscribers {
            event: EventKey::of::<i32>(),
        };
        assert_eq!(d.to_string(), "no subscribers for event type 'i32'");
        assert_eq!(d.as_label(), "no_subscribers");
    }

    #[test]
    fn test_handler_failed_message() {
        let d = Diagnostic::HandlerFailed {
            event: EventKey::of::<String>(),
            handler: "email".into(),
            error: HandlerError::fail("Simulated exception in EmailService"),
        };
        assert_eq!(
            d.to_string(),
            "handler error (background): Simulated exception in EmailService"
        );
        assert_eq!(d.as_label(), "handler_failed");
        assert_eq!(d.event(), EventKey::of::<String>());
    }
}
