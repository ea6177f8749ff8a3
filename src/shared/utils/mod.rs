pub mod retry;

pub use retry::{retry_rejected, RetryConfig};
