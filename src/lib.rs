//! # emobility-core
//!
//! Status and admin-status propagation for an e-mobility roaming platform.
//!
//! ## Architecture
//!
//! - **domain**: identifiers, timestamped status ledgers, push outcomes,
//!   providers and the capability traits towards remote backends
//! - **application**: event bus and the status push service
//! - **shared**: errors, paging and the retry helper
//! - **config** / **logging**: TOML settings and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use logging::{init_tracing, LogFormat};

pub use domain::{DomainError, DomainResult};
