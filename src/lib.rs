//! # membus
//!
//! **membus** is an in-process, type-keyed publish/subscribe bus for tokio applications.
//!
//! Handlers subscribe to a payload *type*; publishing a value of that type starts every
//! registered handler in the background and returns immediately. Registration is lock-free
//! (copy-on-write lists swapped in by compare-and-swap), and a failing or panicking handler
//! never affects the publisher or its siblings.
//!
//! ## Architecture
//! ```text
//!   subscribe(&Handler<T>)         publish(payload: T)          unsubscribe(&Handler<T>)
//!            │                            │                              │
//!            ▼                            ▼                              ▼
//! ┌───────────────────────────────────────────────────────────────────────────────┐
//! │  EventBus (facade)            key = EventKey::of::<T>()                      │
//! └──────┬──────────────────────────────┬────────────────────────────────┬───────┘
//!        ▼                              ▼                                ▼
//! ┌──────────────────────────────────────────────────────────────────────────────┐
//! │  HandlerRegistry   ArcSwap<HashMap<EventKey, HandlerList>>                   │
//! │    add / remove : load ─► copy ─► compare_and_swap ─► retry on conflict     │
//! │    snapshot     : immutable HandlerList (Arc<[HandlerEntry]>)               │
//! └──────────────────────────────┬───────────────────────────────────────────────┘
//!                                │ snapshot (empty ─► Diagnostic::NoSubscribers)
//!                                ▼
//!                    ┌────────────────────────┐
//!                    │       Dispatcher       │  one unit per handler, not joined
//!                    └───┬────────┬───────┬───┘
//!                        ▼        ▼       ▼
//!                     tokio    blocking  ...     catch_unwind + Err
//!                     task     pool              ─► Diagnostic::HandlerFailed
//!                                                          │
//!                                                          ▼
//!                                                   DiagnosticSink
//!                                                 (TracingSink default)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Bus**           | Subscribe, unsubscribe, publish; scoped subscriptions.   | [`EventBus`], [`Subscription`]          |
//! | **Handlers**      | Blocking closures, async closures, struct handlers.      | [`Handler`], [`EventHandler`], [`HandlerFn`] |
//! | **Registry**      | Lock-free per-type handler lists with snapshots.         | [`HandlerRegistry`], [`HandlerList`]    |
//! | **Diagnostics**   | Out-of-band reports for unrouted events and failures.    | [`Diagnostic`], [`DiagnosticSink`]      |
//! | **Errors**        | Typed handler and construction errors.                   | [`HandlerError`], [`BusError`]          |
//! | **Configuration** | Bus name, unrouted reporting, blocking pool usage.       | [`BusConfig`]                           |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use membus::{EventBus, Handler, HandlerError};
//!
//! #[derive(Debug)]
//! struct Payload(i32, String);
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new()?;
//!
//!     let email: Handler<String> = Handler::future("email", |text: Arc<String>| async move {
//!         println!("sending email with text: {text}");
//!         Err(HandlerError::fail("smtp down"))   // reported, never raised to the publisher
//!     });
//!     let log: Handler<Payload> = Handler::blocking("log", |p: &Payload| {
//!         println!("log entry: {p:?}");
//!         Ok(())
//!     });
//!
//!     bus.subscribe(&email);
//!     let _log = bus.subscribe_scoped(log);
//!
//!     bus.publish(String::from("10"));
//!     bus.publish(Payload(10, "10".into()));
//!     bus.publish(42_i32);                      // no subscribers: diagnostic only
//!
//!     bus.wait_idle().await;
//!     bus.unsubscribe(&email);
//!     Ok(())
//! }
//! ```
mod bus;
mod config;
mod diagnostics;
mod dispatch;
mod error;
mod handlers;
mod key;
mod registry;

// ---- Public re-exports ----

pub use bus::{EventBus, EventBusBuilder, Subscription};
pub use config::BusConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
pub use error::{BusError, HandlerError};
pub use handlers::{EventHandler, Handler, HandlerFn};
pub use key::EventKey;
pub use registry::{HandlerEntry, HandlerList, HandlerRegistry};
