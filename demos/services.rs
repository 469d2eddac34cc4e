//! # Example: services
//!
//! Two services share one bus and subscribe for their lifetime.
//!
//! Demonstrates how to:
//! - Build an [`EventBus`] and hand clones to collaborators.
//! - Subscribe an async handler that fails (`EmailService`) and a slow one (`LogService`).
//! - Tie registrations to service lifetime with [`Subscription`].
//! - Observe the two diagnostics through `tracing`.
//!
//! ## Flow
//! ```text
//! EmailService::new(bus) ──► subscribe_scoped(Handler<String>)
//! LogService::new(bus)   ──► subscribe_scoped(Handler<EventPayload>)
//!
//! publish("10")                  ──► email handler ──► Err ──► "handler error (background): ..."
//! publish(EventPayload(10,"10")) ──► log handler (sleeps, then prints)
//! publish(42)                    ──► "no subscribers for event type 'i32'"
//!
//! wait_idle() ──► drop services ──► handlers unsubscribed
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example services
//! ```

use std::sync::Arc;
use std::time::Duration;

use membus::{BusConfig, EventBus, Handler, HandlerError, Subscription};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
struct EventPayload {
    integer_value: i32,
    string_value: String,
}

struct EmailService {
    _sub: Subscription,
}

impl EmailService {
    fn new(bus: &EventBus) -> Self {
        let handler = Handler::future("email", |text: Arc<String>| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("[EmailService] Sending email with text: {text}");
            Err(HandlerError::fail("Simulated exception in EmailService"))
        });
        Self {
            _sub: bus.subscribe_scoped(handler),
        }
    }
}

struct LogService {
    _sub: Subscription,
}

impl LogService {
    fn new(bus: &EventBus) -> Self {
        let handler = Handler::future("log", |payload: Arc<EventPayload>| async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            println!(
                "[LogService] Log entry: {} / {}",
                payload.integer_value, payload.string_value
            );
            Ok(())
        });
        Self {
            _sub: bus.subscribe_scoped(handler),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let bus = EventBus::builder()
        .with_config(BusConfig::named("services"))
        .build()?;

    let email = EmailService::new(&bus);
    let log = LogService::new(&bus);

    println!("Publishing events...");
    bus.publish(String::from("10"));
    bus.publish(EventPayload {
        integer_value: 10,
        string_value: "10".into(),
    });
    bus.publish(42_i32);

    bus.wait_idle().await;

    drop(email);
    drop(log);
    println!(
        "Done. handlers left: {}",
        bus.handler_count::<String>() + bus.handler_count::<EventPayload>()
    );
    Ok(())
}
