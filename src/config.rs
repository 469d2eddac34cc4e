//! # Bus configuration.
//!
//! Provides [`BusConfig`] settings applied when an [`EventBus`](crate::EventBus) is built.
//! There are no capacity or handler-count limits to configure, and a publish that finds no
//! handler is always reported.

use std::borrow::Cow;

/// Configuration for an event bus.
///
/// ## Field semantics
/// - `name`: label attached to every diagnostic (useful with several buses in one process)
/// - `blocking_pool`: run [`Handler::blocking`](crate::Handler::blocking) handlers on tokio's
///   blocking pool (`false` runs them as ordinary tasks; only safe for short callbacks)
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Bus label used in diagnostics.
    pub name: Cow<'static, str>,

    /// Whether blocking handlers get a blocking-pool thread.
    pub blocking_pool: bool,
}

impl BusConfig {
    /// Default configuration with a custom bus name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `name = "membus"`
    /// - `blocking_pool = true`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("membus"),
            blocking_pool: true,
        }
    }
}
