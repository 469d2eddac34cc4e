//! # Immutable handler lists.
//!
//! A [`HandlerList`] is the value stored per event key. It is never mutated after
//! construction: adding or removing a handler allocates a new list, so a list handed out as
//! a snapshot stays valid for as long as the holder keeps it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::handlers::Handler;

/// Type-erased registration of one [`Handler`].
#[derive(Clone)]
pub struct HandlerEntry {
    addr: usize,
    name: Arc<str>,
    handler: Arc<dyn Any + Send + Sync>,
}

impl HandlerEntry {
    pub(crate) fn new<T: Send + Sync + 'static>(handler: &Handler<T>) -> Self {
        Self {
            addr: handler.addr(),
            name: Arc::from(handler.name()),
            handler: Arc::new(handler.clone()),
        }
    }

    /// Handler name captured at registration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this entry registers exactly `handler` (identity comparison).
    pub fn is<T: Send + Sync + 'static>(&self, handler: &Handler<T>) -> bool {
        self.addr == handler.addr()
    }

    /// Recovers the typed handler; `None` if the entry holds a handler for another type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<&Handler<T>> {
        self.handler.downcast_ref::<Handler<T>>()
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered, immutable snapshot of the handlers registered for one key.
///
/// Cloning is an `Arc` bump; iteration needs no locking.
#[derive(Clone)]
pub struct HandlerList {
    entries: Arc<[HandlerEntry]>,
}

impl HandlerList {
    /// Number of registrations (duplicates counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, HandlerEntry> {
        self.entries.iter()
    }

    /// Handler names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(HandlerEntry::name).collect()
    }

    /// Number of times `handler` is registered in this list.
    pub fn count_of<T: Send + Sync + 'static>(&self, handler: &Handler<T>) -> usize {
        self.entries.iter().filter(|e| e.is(handler)).count()
    }

    /// New list equal to `self` with `entry` appended.
    pub(crate) fn with_appended(&self, entry: HandlerEntry) -> HandlerList {
        let mut updated = Vec::with_capacity(self.entries.len() + 1);
        updated.extend(self.entries.iter().cloned());
        updated.push(entry);
        HandlerList {
            entries: updated.into(),
        }
    }

    /// New list without the first registration of `handler`; `None` if it is not present.
    pub(crate) fn without_first<T: Send + Sync + 'static>(
        &self,
        handler: &Handler<T>,
    ) -> Option<HandlerList> {
        let pos = self.entries.iter().position(|e| e.is(handler))?;
        let mut updated = Vec::with_capacity(self.entries.len() - 1);
        updated.extend(self.entries[..pos].iter().cloned());
        updated.extend(self.entries[pos + 1..].iter().cloned());
        Some(HandlerList {
            entries: updated.into(),
        })
    }
}

impl Default for HandlerList {
    fn default() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }
}

impl fmt::Debug for HandlerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a HandlerList {
    type Item = &'a HandlerEntry;
    type IntoIter = std::slice::Iter<'a, HandlerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
