pub mod events;
pub mod services;

// Re-export key types for convenience
pub use events::{create_event_bus, Event, EventBus, EventBusListener, EventSubscriber, SharedEventBus};
pub use services::{PushConfig, StatusPushService};
