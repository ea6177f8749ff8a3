//! E-mobility provider aggregate
//!
//! Contains the provider entity and the registry of a roaming network's
//! providers.

pub mod model;
pub mod registry;

pub use model::{AdminStatusLedger, EMobilityProvider, OperationalStatusLedger};
pub use registry::ProviderRegistry;
