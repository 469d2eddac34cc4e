//! # Subscription handle (`Handler<T>`)
//!
//! A [`Handler`] is what callers subscribe and unsubscribe. It comes in two shapes:
//!
//! | Shape        | Constructor                          | Runs on                    |
//! |--------------|--------------------------------------|----------------------------|
//! | blocking     | [`Handler::blocking`]                | tokio blocking pool        |
//! | asynchronous | [`Handler::future`], [`Handler::from_arc`] | tokio task           |
//!
//! ## Identity
//! Handlers are compared by identity, not behaviour: clones of one handler are the same
//! handler, two separately built handlers never are (even from the same closure).
//! Keep a clone of the handler you subscribed if you intend to unsubscribe it later.
//!
//! ```rust
//! use membus::{Handler, HandlerError};
//!
//! let a: Handler<u32> = Handler::blocking("count", |_n: &u32| Ok::<(), HandlerError>(()));
//! let b = a.clone();
//! let c: Handler<u32> = Handler::blocking("count", |_n: &u32| Ok::<(), HandlerError>(()));
//!
//! assert!(a.same_as(&b));
//! assert!(!a.same_as(&c));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::handlers::event_handler::EventHandler;
use crate::handlers::handler_fn::HandlerFn;

/// Synchronous callback plus its name.
pub(crate) struct BlockingFn<T> {
    name: Cow<'static, str>,
    f: Box<dyn Fn(&T) -> Result<(), HandlerError> + Send + Sync>,
}

impl<T> BlockingFn<T> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, event: &T) -> Result<(), HandlerError> {
        (self.f)(event)
    }
}

/// Shared callback behind a [`Handler`].
pub(crate) enum Callback<T: Send + Sync + 'static> {
    Blocking(Arc<BlockingFn<T>>),
    Async(Arc<dyn EventHandler<T>>),
}

/// Cheap-to-clone handle to an event handler for payloads of type `T`.
pub struct Handler<T: Send + Sync + 'static> {
    callback: Callback<T>,
}

impl<T: Send + Sync + 'static> Handler<T> {
    /// Creates a synchronous handler.
    ///
    /// The closure may block; every invocation gets its own slot on the blocking pool
    /// (see [`BusConfig::blocking_pool`](crate::BusConfig::blocking_pool)).
    pub fn blocking<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&T) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            callback: Callback::Blocking(Arc::new(BlockingFn {
                name: name.into(),
                f: Box::new(f),
            })),
        }
    }

    /// Creates an asynchronous handler from a closure returning a future.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use membus::{Handler, HandlerError};
    ///
    /// let h: Handler<String> = Handler::future("email", |text: Arc<String>| async move {
    ///     if text.is_empty() {
    ///         return Err(HandlerError::fail("nothing to send"));
    ///     }
    ///     Ok(())
    /// });
    /// assert_eq!(h.name(), "email");
    /// assert!(!h.is_blocking());
    /// ```
    pub fn future<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::from_arc(Arc::new(HandlerFn::new(name, f)))
    }

    /// Wraps a shared [`EventHandler`] implementation.
    ///
    /// Identity follows the `Arc`: wrapping two clones of one `Arc` yields the same handler.
    pub fn from_arc(handler: Arc<dyn EventHandler<T>>) -> Self {
        Self {
            callback: Callback::Async(handler),
        }
    }

    /// Returns the handler name used in diagnostics.
    pub fn name(&self) -> &str {
        match &self.callback {
            Callback::Blocking(b) => &b.name,
            Callback::Async(a) => a.name(),
        }
    }

    /// Returns `true` for handlers built with [`Handler::blocking`].
    pub fn is_blocking(&self) -> bool {
        matches!(self.callback, Callback::Blocking(_))
    }

    /// Identity comparison: `true` iff both values are clones of one handler.
    pub fn same_as(&self, other: &Handler<T>) -> bool {
        self.addr() == other.addr()
    }

    /// Address of the shared callback allocation.
    ///
    /// Stable while any clone is alive, which the registry guarantees for registered handlers.
    pub(crate) fn addr(&self) -> usize {
        match &self.callback {
            Callback::Blocking(b) => Arc::as_ptr(b) as *const () as usize,
            Callback::Async(a) => Arc::as_ptr(a) as *const () as usize,
        }
    }

    pub(crate) fn callback(&self) -> &Callback<T> {
        &self.callback
    }
}

impl<T: Send + Sync + 'static> Clone for Handler<T> {
    fn clone(&self) -> Self {
        let callback = match &self.callback {
            Callback::Blocking(b) => Callback::Blocking(Arc::clone(b)),
            Callback::Async(a) => Callback::Async(Arc::clone(a)),
        };
        Self { callback }
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .field("blocking", &self.is_blocking())
            .finish()
    }
}

impl<T, H> From<Arc<H>> for Handler<T>
where
    T: Send + Sync + 'static,
    H: EventHandler<T>,
{
    fn from(handler: Arc<H>) -> Self {
        Self::from_arc(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named;

    #[async_trait]
    impl EventHandler<u8> for Named {
        async fn handle(&self, _event: Arc<u8>) -> Result<(), HandlerError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "named"
        }
    }

    #[test]
    fn test_clone_keeps_identity() {
        let h: Handler<u8> = Handler::future("f", |_e: Arc<u8>| async { Ok(()) });
        let c = h.clone();
        assert!(h.same_as(&c));
        assert_eq!(h.addr(), c.addr());
    }

    #[test]
    fn test_separate_constructions_differ() {
        let f = |_e: &u8| Ok(());
        let a: Handler<u8> = Handler::blocking("x", f);
        let b: Handler<u8> = Handler::blocking("x", f);
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_from_arc_identity_follows_arc() {
        let shared = Arc::new(Named);
        let a: Handler<u8> = Handler::from(Arc::clone(&shared));
        let b: Handler<u8> = Handler::from(shared);
        let c: Handler<u8> = Handler::from(Arc::new(Named));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        assert_eq!(a.name(), "named");
    }

    #[test]
    fn test_shapes() {
        let blocking: Handler<u8> = Handler::blocking("b", |_e: &u8| Ok(()));
        let future: Handler<u8> = Handler::future("f", |_e: Arc<u8>| async { Ok(()) });
        assert!(blocking.is_blocking());
        assert!(!future.is_blocking());
        assert_eq!(blocking.name(), "b");
        assert_eq!(future.name(), "f");
    }
}
