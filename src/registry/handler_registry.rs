//! # Lock-free handler registry.
//!
//! [`HandlerRegistry`] maps an [`EventKey`] to the current [`HandlerList`]. The whole table is
//! an immutable value behind an [`ArcSwap`]; writers never mutate it in place.
//!
//! ## Update protocol
//! ```text
//! loop {
//!   ├─► current = table.load_full()
//!   ├─► next    = copy of current with the key's list rebuilt
//!   │             (untouched keys share their list Arc)
//!   ├─► table.compare_and_swap(current, next)
//!   │       ├─ swapped  ─► done
//!   │       └─ lost race ─► retry from the top
//! }
//! ```
//!
//! ## Rules
//! - Readers (`snapshot`) never block and never observe a partially updated list.
//! - Duplicate adds are kept; `remove` drops the first matching registration only.
//! - A key whose last handler is removed disappears from the table.
//! - Retries are unbounded; contention only occurs between concurrent writers.
//! - Writes are crate-private. Outside callers only read; they register through
//!   [`EventBus::subscribe`](crate::EventBus::subscribe), which derives the key from the
//!   payload type, so a handler can never sit under a key it cannot receive.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::handlers::Handler;
use crate::key::EventKey;
use crate::registry::list::{HandlerEntry, HandlerList};

type Table = HashMap<EventKey, HandlerList>;

/// Concurrent `EventKey -> HandlerList` map with copy-on-write updates.
///
/// Read-only outside the crate:
/// ```compile_fail
/// use membus::{EventBus, EventKey, Handler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus = EventBus::new().unwrap();
/// let h: Handler<String> = Handler::blocking("h", |_s: &String| Ok(()));
/// bus.registry().add(EventKey::of::<u32>(), &h);
/// # }
/// ```
pub struct HandlerRegistry {
    table: ArcSwap<Table>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(Table::new()),
        }
    }

    /// Appends `handler` to the list for `key`.
    ///
    /// Safe to call from any number of threads at once; no registration is lost.
    pub(crate) fn add<T: Send + Sync + 'static>(&self, key: EventKey, handler: &Handler<T>) {
        let entry = HandlerEntry::new(handler);
        let mut retries = 0u32;

        loop {
            let current = self.table.load_full();
            let list = current.get(&key).cloned().unwrap_or_default();

            let mut next = Table::clone(&current);
            next.insert(key, list.with_appended(entry.clone()));

            if self.try_swap(&current, next) {
                if retries > 0 {
                    tracing::trace!(event = %key, retries, "registry add settled after contention");
                }
                return;
            }
            retries += 1;
        }
    }

    /// Removes the first registration of `handler` under `key`.
    ///
    /// Returns `false` (and changes nothing) when the key is absent or the handler is not
    /// registered under it.
    pub(crate) fn remove<T: Send + Sync + 'static>(&self, key: EventKey, handler: &Handler<T>) -> bool {
        let mut retries = 0u32;

        loop {
            let current = self.table.load_full();
            let Some(list) = current.get(&key) else {
                return false;
            };
            if list.is_empty() {
                return false;
            }
            let Some(updated) = list.without_first(handler) else {
                return false;
            };

            let mut next = Table::clone(&current);
            if updated.is_empty() {
                next.remove(&key);
            } else {
                next.insert(key, updated);
            }

            if self.try_swap(&current, next) {
                if retries > 0 {
                    tracing::trace!(event = %key, retries, "registry remove settled after contention");
                }
                return true;
            }
            retries += 1;
        }
    }

    /// Point-in-time copy of the handlers for `key` (empty if none).
    pub fn snapshot(&self, key: EventKey) -> HandlerList {
        self.table.load().get(&key).cloned().unwrap_or_default()
    }

    /// Number of registrations under `key`.
    pub fn len(&self, key: EventKey) -> usize {
        self.table.load().get(&key).map_or(0, HandlerList::len)
    }

    /// Returns `true` if no key has any handler.
    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }

    /// Keys with at least one handler, sorted by type name.
    pub fn keys(&self) -> Vec<EventKey> {
        let mut keys: Vec<EventKey> = self.table.load().keys().copied().collect();
        keys.sort_unstable_by_key(EventKey::name);
        keys
    }

    /// Publishes `next` only if the table is still `current`.
    fn try_swap(&self, current: &Arc<Table>, next: Table) -> bool {
        let prev = self.table.compare_and_swap(current, Arc::new(next));
        Arc::ptr_eq(&*prev, current)
    }
}
