//! Application services

mod status_push;

pub use status_push::{PushConfig, StatusPushService};
