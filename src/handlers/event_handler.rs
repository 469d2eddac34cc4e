//! # Asynchronous event handler trait.
//!
//! [`EventHandler`] is the extension point for struct-backed handlers. Closures are usually
//! simpler; see [`Handler::future`](crate::Handler::future) and
//! [`Handler::blocking`](crate::Handler::blocking).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use membus::{EventHandler, Handler, HandlerError};
//!
//! struct Mailer;
//!
//! #[async_trait]
//! impl EventHandler<String> for Mailer {
//!     async fn handle(&self, text: Arc<String>) -> Result<(), HandlerError> {
//!         if text.is_empty() {
//!             return Err(HandlerError::fail("empty body"));
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "mailer" }
//! }
//!
//! let h: Handler<String> = Handler::from_arc(Arc::new(Mailer));
//! assert_eq!(h.name(), "mailer");
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;

/// Handler for events of type `T`, run as a tokio task.
///
/// Each publish spawns a fresh invocation:
/// - **Own task**: never runs on the publisher's thread.
/// - **No ordering**: invocations for different publishes may overlap.
/// - **Failure boundary**: `Err` and panics are reported to the diagnostic sink only.
///
/// ### Implementation requirements
/// - Use async I/O; blocking work belongs in [`Handler::blocking`](crate::Handler::blocking).
/// - Shared state needs its own synchronization (`&self` is shared by concurrent invocations).
#[async_trait]
pub trait EventHandler<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Processes a single event.
    ///
    /// The payload is shared by every handler of the same publish.
    async fn handle(&self, event: Arc<T>) -> Result<(), HandlerError>;

    /// Returns the handler name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
