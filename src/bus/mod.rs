//! Public bus surface: [`EventBus`], its builder and scoped [`Subscription`]s.

mod event_bus;
mod subscription;

pub use event_bus::{EventBus, EventBusBuilder};
pub use subscription::Subscription;
