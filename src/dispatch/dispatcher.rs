//! # Fire-and-forget handler dispatch.
//!
//! [`Dispatcher`] takes a [`HandlerList`] snapshot plus one payload and starts every handler
//! in its own unit of execution, then returns.
//!
//! ## Architecture
//! ```text
//! dispatch(key, snapshot, payload)
//!     │
//!     ├──► handler 1 (async)    ──► tracker.spawn_on ──► catch_unwind(handle(payload))
//!     ├──► handler 2 (blocking) ──► tracker.spawn_blocking_on ──► catch_unwind(call(&payload))
//!     └──► handler N ...                 │
//!                                        └─ Err / panic ──► sink.report(HandlerFailed)
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `dispatch()` never awaits a handler.
//! - **Start order** follows the snapshot; completion order is unspecified.
//! - **Isolation**: a failing or panicking handler ends only its own unit.
//! - **Runtime**: units run on the runtime handle captured when the bus was built, so
//!   publishing from a plain OS thread works.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler panics while holding a lock on state it shares with other handlers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::HandlerError;
use crate::handlers::{Callback, Handler};
use crate::key::EventKey;
use crate::registry::HandlerList;

/// Routes handler failures to the diagnostic sink.
#[derive(Clone)]
pub(crate) struct Reporter {
    bus: Arc<str>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Reporter {
    pub(crate) fn new(bus: &str, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            bus: Arc::from(bus),
            sink,
        }
    }

    pub(crate) fn report(&self, diagnostic: &Diagnostic) {
        self.sink.report(&self.bus, diagnostic);
    }

    fn handler_failed(&self, event: EventKey, handler: &str, error: HandlerError) {
        self.report(&Diagnostic::HandlerFailed {
            event,
            handler: handler.to_string(),
            error,
        });
    }
}

/// Spawns one background unit per handler invocation.
pub(crate) struct Dispatcher {
    runtime: Handle,
    tracker: TaskTracker,
    /// Serializes `wait_idle`; the tracker's closed flag is shared by all waiters.
    idle: Mutex<()>,
    reporter: Reporter,
    blocking_pool: bool,
}

impl Dispatcher {
    pub(crate) fn new(runtime: Handle, reporter: Reporter, blocking_pool: bool) -> Self {
        Self {
            runtime,
            tracker: TaskTracker::new(),
            idle: Mutex::new(()),
            reporter,
            blocking_pool,
        }
    }

    pub(crate) fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Starts every handler in `handlers` with a shared `payload`; returns immediately.
    pub(crate) fn dispatch<T: Send + Sync + 'static>(
        &self,
        event: EventKey,
        handlers: &HandlerList,
        payload: Arc<T>,
    ) {
        if handlers.is_empty() {
            return;
        }

        for entry in handlers {
            let Some(handler) = entry.downcast::<T>() else {
                tracing::debug!(
                    event = %event,
                    handler = entry.name(),
                    "skipping handler registered for another payload type"
                );
                continue;
            };
            self.spawn_one(event, handler, Arc::clone(&payload));
        }
    }

    fn spawn_one<T: Send + Sync + 'static>(
        &self,
        event: EventKey,
        handler: &Handler<T>,
        payload: Arc<T>,
    ) {
        let reporter = self.reporter.clone();

        match handler.callback() {
            Callback::Async(h) => {
                let h = Arc::clone(h);
                let _ = self.tracker.spawn_on(
                    async move {
                        let fut = h.handle(payload);
                        let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                            Ok(res) => res,
                            Err(panic_err) => Err(HandlerError::from_panic(panic_err)),
                        };
                        if let Err(error) = outcome {
                            reporter.handler_failed(event, h.name(), error);
                        }
                    },
                    &self.runtime,
                );
            }
            Callback::Blocking(b) => {
                let b = Arc::clone(b);
                let run = move || {
                    let outcome =
                        match std::panic::catch_unwind(AssertUnwindSafe(|| b.call(&payload))) {
                            Ok(res) => res,
                            Err(panic_err) => Err(HandlerError::from_panic(panic_err)),
                        };
                    if let Err(error) = outcome {
                        reporter.handler_failed(event, b.name(), error);
                    }
                };

                if self.blocking_pool {
                    let _ = self.tracker.spawn_blocking_on(run, &self.runtime);
                } else {
                    let _ = self.tracker.spawn_on(async move { run() }, &self.runtime);
                }
            }
        }
    }

    /// Number of handler units still running.
    pub(crate) fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every unit spawned before the call has finished.
    ///
    /// Units spawned while waiting may or may not be included. Concurrent callers take
    /// turns, so no caller can reopen the tracker under another one's pending wait.
    pub(crate) async fn wait_idle(&self) {
        let _turn = self.idle.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::mpsc;

    use crate::registry::HandlerRegistry;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl DiagnosticSink for Recorder {
        fn report(&self, _bus: &str, diagnostic: &Diagnostic) {
            self.seen
                .lock()
                .expect("recorder poisoned")
                .push(diagnostic.to_string());
        }
    }

    fn dispatcher(sink: Arc<Recorder>) -> Dispatcher {
        Dispatcher::new(Handle::current(), Reporter::new("test", sink), true)
    }

    fn list_of<T: Send + Sync + 'static>(handlers: &[&Handler<T>]) -> HandlerList {
        let reg = HandlerRegistry::new();
        for h in handlers {
            reg.add(EventKey::of::<T>(), h);
        }
        reg.snapshot(EventKey::of::<T>())
    }

    #[tokio::test]
    async fn test_empty_snapshot_spawns_nothing() {
        let sink = Arc::new(Recorder::default());
        let d = dispatcher(Arc::clone(&sink));

        d.dispatch(EventKey::of::<u32>(), &HandlerList::default(), Arc::new(1u32));

        assert_eq!(d.in_flight(), 0);
        d.wait_idle().await;
        assert!(sink.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_reported() {
        let sink = Arc::new(Recorder::default());
        let d = dispatcher(Arc::clone(&sink));
        let ran = Arc::new(AtomicUsize::new(0));

        let failing: Handler<u32> =
            Handler::future("failing", |_n: Arc<u32>| async { Err(HandlerError::fail("boom")) });
        let panicking: Handler<u32> = Handler::blocking("panicking", |_n: &u32| panic!("kaput"));
        let counter = {
            let ran = Arc::clone(&ran);
            Handler::blocking("counter", move |n: &u32| {
                ran.fetch_add(*n as usize, Ordering::SeqCst);
                Ok(())
            })
        };

        let list = list_of(&[&failing, &panicking, &counter]);
        d.dispatch(EventKey::of::<u32>(), &list, Arc::new(5u32));
        d.wait_idle().await;

        assert_eq!(ran.load(Ordering::SeqCst), 5);
        let mut seen = sink.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                "handler error (background): boom".to_string(),
                "handler error (background): panicked: kaput".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_does_not_wait_for_handlers() {
        let sink = Arc::new(Recorder::default());
        let d = dispatcher(sink);
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let slow: Handler<u32> = Handler::future("slow", move |_n: Arc<u32>| {
            let tx = tx.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = tx.send(());
                Ok(())
            }
        });

        d.dispatch(EventKey::of::<u32>(), &list_of(&[&slow]), Arc::new(0u32));
        assert!(rx.try_recv().is_err());
        assert_eq!(d.in_flight(), 1);

        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("handler never ran");
    }

    #[tokio::test]
    async fn test_cooperative_blocking_mode() {
        let sink = Arc::new(Recorder::default());
        let d = Dispatcher::new(Handle::current(), Reporter::new("test", sink), false);
        let ran = Arc::new(AtomicUsize::new(0));
        let h: Handler<u32> = {
            let ran = Arc::clone(&ran);
            Handler::blocking("inline", move |_n: &u32| {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        d.dispatch(EventKey::of::<u32>(), &list_of(&[&h, &h]), Arc::new(0u32));
        d.wait_idle().await;

        assert_eq!(ran.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_wait_idle_callers_all_return() {
        const WAITERS: usize = 8;
        const ROUNDS: usize = 200;

        let sink = Arc::new(Recorder::default());
        let d = Arc::new(dispatcher(sink));
        let ran = Arc::new(AtomicUsize::new(0));
        let h: Handler<u32> = {
            let ran = Arc::clone(&ran);
            Handler::future("tick", move |_n: Arc<u32>| {
                let ran = Arc::clone(&ran);
                async move {
                    tokio::task::yield_now().await;
                    ran.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        let list = list_of(&[&h]);

        let waiters: Vec<_> = (0..WAITERS)
            .map(|_| {
                let d = Arc::clone(&d);
                let list = list.clone();
                tokio::spawn(async move {
                    for _ in 0..ROUNDS {
                        d.dispatch(EventKey::of::<u32>(), &list, Arc::new(0u32));
                        d.wait_idle().await;
                    }
                })
            })
            .collect();

        for w in waiters {
            tokio::time::timeout(Duration::from_secs(30), w)
                .await
                .expect("wait_idle caller hung")
                .expect("waiter panicked");
        }
        d.wait_idle().await;
        assert_eq!(ran.load(Ordering::SeqCst), WAITERS * ROUNDS);
        assert_eq!(d.in_flight(), 0);
    }
}
