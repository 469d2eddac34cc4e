//! # Event bus facade.
//!
//! [`EventBus`] is the public surface: it turns typed `subscribe` / `unsubscribe` /
//! `publish` calls into key-based registry and dispatcher operations.
//!
//! ## Event flow
//! ```text
//! subscribe(&Handler<T>)   ──► registry.add(EventKey::of::<T>(), handler)
//! unsubscribe(&Handler<T>) ──► registry.remove(EventKey::of::<T>(), handler)
//!
//! publish(payload: T)
//!     ├─► key      = EventKey::of::<T>()
//!     ├─► snapshot = registry.snapshot(key)          (taken once)
//!     ├─ empty ──► sink.report(NoSubscribers), return
//!     └─ else  ──► dispatcher.dispatch(key, snapshot, Arc::new(payload)), return
//! ```
//!
//! ## Rules
//! - No call ever fails or panics because of a handler.
//! - Every call is safe from any thread, including from inside a running handler.
//! - A handler subscribed while a publish is being dispatched may or may not see it.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::bus::subscription::Subscription;
use crate::config::BusConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::dispatch::{Dispatcher, Reporter};
use crate::error::BusError;
use crate::handlers::Handler;
use crate::key::EventKey;
use crate::registry::HandlerRegistry;

pub(crate) struct Inner {
    config: BusConfig,
    registry: HandlerRegistry,
    dispatcher: Dispatcher,
}

impl Inner {
    pub(crate) fn unsubscribe<T: Send + Sync + 'static>(&self, handler: &Handler<T>) {
        let key = EventKey::of::<T>();
        let removed = self.registry.remove(key, handler);
        tracing::debug!(
            bus = %self.config.name,
            event = %key,
            handler = handler.name(),
            removed,
            "unsubscribe"
        );
    }
}

/// In-process, type-keyed publish/subscribe bus.
///
/// Cheap to clone: clones share one registry and one dispatcher. Construct it once in the
/// hosting application and hand clones to collaborators.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use membus::{EventBus, Handler, HandlerError};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let bus = EventBus::new()?;
///
///     let greet: Handler<String> = Handler::future("greet", |name: Arc<String>| async move {
///         println!("hello, {name}");
///         Ok::<(), HandlerError>(())
///     });
///     bus.subscribe(&greet);
///
///     bus.publish(String::from("world"));
///     bus.publish(42_i32); // no subscriber: reported as a diagnostic
///
///     bus.wait_idle().await;
///     bus.unsubscribe(&greet);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Returns a builder with default configuration and the [`TracingSink`].
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    /// Builds a default bus on the current tokio runtime.
    ///
    /// # Errors
    /// [`BusError::NoRuntime`] when called outside a runtime.
    pub fn new() -> Result<Self, BusError> {
        Self::builder().build()
    }

    /// Configuration the bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Read access to the underlying registry; writes go through [`subscribe`](Self::subscribe).
    pub fn registry(&self) -> &HandlerRegistry {
        &self.inner.registry
    }

    /// Registers `handler` for payloads of type `T`.
    ///
    /// Subscribing the same handler twice registers it twice (it then runs twice per publish).
    pub fn subscribe<T: Send + Sync + 'static>(&self, handler: &Handler<T>) {
        let key = EventKey::of::<T>();
        self.inner.registry.add(key, handler);
        tracing::debug!(
            bus = %self.inner.config.name,
            event = %key,
            handler = handler.name(),
            "subscribe"
        );
    }

    /// Registers `handler` and returns a guard that unsubscribes it when dropped.
    ///
    /// ## Example
    /// ```rust
    /// use membus::{EventBus, Handler};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let bus = EventBus::new().unwrap();
    /// {
    ///     let _sub = bus.subscribe_scoped(Handler::blocking("log", |_n: &u64| Ok(())));
    ///     assert_eq!(bus.handler_count::<u64>(), 1);
    /// }
    /// assert_eq!(bus.handler_count::<u64>(), 0);
    /// # }
    /// ```
    #[must_use = "dropping the subscription unsubscribes the handler immediately"]
    pub fn subscribe_scoped<T: Send + Sync + 'static>(&self, handler: Handler<T>) -> Subscription {
        self.subscribe(&handler);
        Subscription::new(Arc::downgrade(&self.inner), handler)
    }

    /// Removes the first registration of `handler` for `T`.
    ///
    /// Unknown handlers are ignored. Identity matters: pass a clone of the subscribed handler.
    pub fn unsubscribe<T: Send + Sync + 'static>(&self, handler: &Handler<T>) {
        self.inner.unsubscribe(handler);
    }

    /// Publishes `payload` to every handler currently registered for `T`.
    ///
    /// Returns immediately; handlers run in the background.
    pub fn publish<T: Send + Sync + 'static>(&self, payload: T) {
        self.publish_arc(Arc::new(payload));
    }

    /// Same as [`publish`](Self::publish) for an already shared payload.
    pub fn publish_arc<T: Send + Sync + 'static>(&self, payload: Arc<T>) {
        let key = EventKey::of::<T>();
        let snapshot = self.inner.registry.snapshot(key);

        if snapshot.is_empty() {
            tracing::trace!(bus = %self.inner.config.name, event = %key, "publish without subscribers");
            self.inner
                .dispatcher
                .reporter()
                .report(&Diagnostic::NoSubscribers { event: key });
            return;
        }

        tracing::trace!(
            bus = %self.inner.config.name,
            event = %key,
            handlers = snapshot.len(),
            "publish"
        );
        self.inner.dispatcher.dispatch(key, &snapshot, payload);
    }

    /// Number of registrations for `T`.
    pub fn handler_count<T: 'static>(&self) -> usize {
        self.inner.registry.len(EventKey::of::<T>())
    }

    /// Number of handler invocations still running.
    pub fn in_flight(&self) -> usize {
        self.inner.dispatcher.in_flight()
    }

    /// Waits until handler invocations started before this call have finished.
    ///
    /// Useful before process exit or in tests; publishing never requires it.
    pub async fn wait_idle(&self) {
        self.inner.dispatcher.wait_idle().await;
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.inner.config.name)
            .field("events", &self.inner.registry.keys())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Builder for [`EventBus`].
pub struct EventBusBuilder {
    config: BusConfig,
    sink: Arc<dyn DiagnosticSink>,
    runtime: Option<Handle>,
}

impl EventBusBuilder {
    /// Creates a builder with default configuration and the [`TracingSink`].
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
            sink: Arc::new(TracingSink::new()),
            runtime: None,
        }
    }

    /// Sets the bus configuration.
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runs handlers on `runtime` instead of the runtime current at [`build`](Self::build).
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the bus.
    ///
    /// # Errors
    /// [`BusError::NoRuntime`] if no runtime was given and none is current.
    pub fn build(self) -> Result<EventBus, BusError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BusError::NoRuntime)?,
        };

        let reporter = Reporter::new(&self.config.name, self.sink);
        let dispatcher = Dispatcher::new(runtime, reporter, self.config.blocking_pool);

        Ok(EventBus {
            inner: Arc::new(Inner {
                config: self.config,
                registry: HandlerRegistry::new(),
                dispatcher,
            }),
        })
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
