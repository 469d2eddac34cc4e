//! # Event handlers.
//!
//! This module provides the handler-related types:
//! - [`Handler`] - cloneable subscription handle, compared by identity
//! - [`EventHandler`] - trait for struct-backed asynchronous handlers
//! - [`HandlerFn`] - closure-backed [`EventHandler`]

mod event_handler;
mod handler;
mod handler_fn;

pub(crate) use handler::Callback;

pub use event_handler::EventHandler;
pub use handler::Handler;
pub use handler_fn::HandlerFn;
