//! # Event type keys.
//!
//! [`EventKey`] partitions the registry by payload type. It is derived statically from the
//! payload type via [`EventKey::of`], so two values of one type always share a key and
//! distinct types never collide (identity is the [`TypeId`]).
//!
//! The type name is carried only for diagnostics.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identifier of an event type.
#[derive(Clone, Copy)]
pub struct EventKey {
    id: TypeId,
    name: &'static str,
}

impl EventKey {
    /// Returns the key for payload type `T`.
    ///
    /// # Example
    /// ```
    /// use membus::EventKey;
    ///
    /// assert_eq!(EventKey::of::<String>(), EventKey::of::<String>());
    /// assert_ne!(EventKey::of::<String>(), EventKey::of::<&'static str>());
    /// ```
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified type name (as reported by [`std::any::type_name`]).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with every module path stripped, generics and tuples included.
    ///
    /// `alloc::string::String` → `String`, `app::Pair<i32, alloc::string::String>` →
    /// `Pair<i32, String>`, `(i32, alloc::string::String)` → `(i32, String)`.
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        // Start of the path segment currently being written to `out`.
        let mut segment = 0;
        let mut chars = self.name.chars().peekable();

        while let Some(c) = chars.next() {
            if c == ':' && chars.peek() == Some(&':') {
                chars.next();
                out.truncate(segment);
            } else if c.is_alphanumeric() || c == '_' {
                out.push(c);
            } else {
                out.push(c);
                segment = out.len();
            }
        }
        out
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventKey {}

impl Hash for EventKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventKey").field(&self.name).finish()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[allow(dead_code)]
    struct Pair<A, B>(A, B);

    #[test]
    fn test_same_type_same_key() {
        let a = EventKey::of::<Pair<i32, String>>();
        let b = EventKey::of::<Pair<i32, String>>();
        assert_eq!(a, b);

        let set: HashSet<EventKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_distinct_types_never_collide() {
        let keys = [
            EventKey::of::<String>(),
            EventKey::of::<i32>(),
            EventKey::of::<i64>(),
            EventKey::of::<Pair<i32, String>>(),
            EventKey::of::<Pair<String, i32>>(),
        ];
        let set: HashSet<EventKey> = keys.iter().copied().collect();
        assert_eq!(set.len(), keys.len());
    }

    #[test]
    fn test_short_name_strips_module_path() {
        assert_eq!(EventKey::of::<String>().short_name(), "String");
        assert_eq!(EventKey::of::<i32>().short_name(), "i32");

        let pair = EventKey::of::<Pair<i32, String>>();
        assert_eq!(pair.short_name(), "Pair<i32, String>");
        assert!(pair.name().contains("::Pair<"));
    }

    #[test]
    fn test_short_name_of_tuples_refs_and_arrays() {
        assert_eq!(EventKey::of::<(i32, String)>().short_name(), "(i32, String)");
        assert_eq!(EventKey::of::<&'static str>().short_name(), "&str");
        assert_eq!(EventKey::of::<[u8; 4]>().short_name(), "[u8; 4]");
        assert_eq!(
            EventKey::of::<Vec<(u8, Pair<String, i64>)>>().short_name(),
            "Vec<(u8, Pair<String, i64>)>"
        );
    }
}
