//! Handler storage.
//!
//! - [`HandlerRegistry`] - concurrent key → list map, updated by compare-and-swap
//! - [`HandlerList`] / [`HandlerEntry`] - immutable snapshot and its type-erased entries

mod handler_registry;
mod list;

pub use handler_registry::HandlerRegistry;
pub use list::{HandlerEntry, HandlerList};
