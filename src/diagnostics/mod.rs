//! Diagnostic channel of the bus.
//!
//! ## Contents
//! - [`Diagnostic`] what the bus reports (no subscribers, handler failure)
//! - [`DiagnosticSink`] where reports go
//! - [`TracingSink`] default sink backed by `tracing`

mod diagnostic;
mod sink;

pub use diagnostic::Diagnostic;
pub use sink::{DiagnosticSink, TracingSink};
