//! Domain ports
//!
//! Capability traits implemented by collaborators outside the core.

pub mod push_target;

pub use push_target::PushTarget;
