//! # Scoped subscriptions.
//!
//! A [`Subscription`] unsubscribes its handler when dropped, which ties a handler's
//! registration to the lifetime of the component that owns it.
//!
//! The guard holds only a weak reference to the bus: it never keeps the bus alive, and
//! dropping it after the bus is gone does nothing.

use std::fmt;
use std::sync::Weak;

use crate::bus::event_bus::Inner;
use crate::handlers::Handler;
use crate::key::EventKey;

type Release = Box<dyn FnOnce() + Send + Sync>;

/// RAII guard returned by [`EventBus::subscribe_scoped`](crate::EventBus::subscribe_scoped).
pub struct Subscription {
    event: EventKey,
    name: String,
    release: Option<Release>,
}

impl Subscription {
    pub(crate) fn new<T: Send + Sync + 'static>(bus: Weak<Inner>, handler: Handler<T>) -> Self {
        let name = handler.name().to_string();
        let release: Release = Box::new(move || {
            if let Some(inner) = bus.upgrade() {
                inner.unsubscribe(&handler);
            }
        });

        Self {
            event: EventKey::of::<T>(),
            name,
            release: Some(release),
        }
    }

    /// Event type this subscription listens to.
    pub fn event(&self) -> EventKey {
        self.event
    }

    /// Name of the subscribed handler.
    pub fn handler_name(&self) -> &str {
        &self.name
    }

    /// Releases the guard without unsubscribing; the handler stays registered.
    pub fn detach(mut self) {
        self.release = None;
    }

    /// Unsubscribes now (same as dropping the guard).
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("handler", &self.name)
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{EventBus, Handler};

    fn noop() -> Handler<u64> {
        Handler::blocking("noop", |_n: &u64| Ok(()))
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bus = EventBus::new().unwrap();
        let sub = bus.subscribe_scoped(noop());
        assert_eq!(bus.handler_count::<u64>(), 1);
        assert_eq!(sub.handler_name(), "noop");

        drop(sub);
        assert_eq!(bus.handler_count::<u64>(), 0);
    }

    #[tokio::test]
    async fn test_detach_keeps_registration() {
        let bus = EventBus::new().unwrap();
        bus.subscribe_scoped(noop()).detach();
        assert_eq!(bus.handler_count::<u64>(), 1);
    }

    #[tokio::test]
    async fn test_only_own_registration_is_released() {
        let bus = EventBus::new().unwrap();
        let h = noop();
        bus.subscribe(&h);
        let sub = bus.subscribe_scoped(h.clone());
        let other = bus.subscribe_scoped(noop());
        assert_eq!(bus.handler_count::<u64>(), 3);

        sub.cancel();
        assert_eq!(bus.registry().snapshot(crate::EventKey::of::<u64>()).count_of(&h), 1);
        assert_eq!(bus.handler_count::<u64>(), 2);
        drop(other);
        assert_eq!(bus.handler_count::<u64>(), 1);
    }

    #[tokio::test]
    async fn test_outliving_the_bus_is_harmless() {
        let bus = EventBus::new().unwrap();
        let sub = bus.subscribe_scoped(noop());
        drop(bus);
        drop(sub);
    }
}
