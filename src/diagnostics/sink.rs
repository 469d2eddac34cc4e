//! # Diagnostic sinks.
//!
//! [`DiagnosticSink`] receives every [`Diagnostic`] the bus produces. The default
//! [`TracingSink`] forwards them to `tracing`; tests and applications can inject their own.
//!
//! ## Rules
//! - `report` is called from the publisher (no-subscriber case) or from a handler's
//!   background unit (failure case); keep it short and non-blocking.
//! - Sinks must not panic. A panicking sink inside a handler unit only kills that unit.

use crate::diagnostics::diagnostic::Diagnostic;

/// Receiver of bus diagnostics.
pub trait DiagnosticSink: Send + Sync + 'static {
    /// Handles one diagnostic. `bus` is the configured bus name.
    fn report(&self, bus: &str, diagnostic: &Diagnostic);
}

/// Sink that logs through `tracing`.
///
/// - `NoSubscribers` → `warn`
/// - `HandlerFailed` → `error`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Construct a new [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&self, bus: &str, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::NoSubscribers { event } => {
                tracing::warn!(
                    bus,
                    event = event.name(),
                    label = diagnostic.as_label(),
                    "{diagnostic}"
                );
            }
            Diagnostic::HandlerFailed {
                event,
                handler,
                error,
            } => {
                tracing::error!(
                    bus,
                    event = event.name(),
                    handler = handler.as_str(),
                    error = %error,
                    label = diagnostic.as_label(),
                    "{diagnostic}"
                );
            }
        }
    }
}
