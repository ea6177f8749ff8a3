//! Entity identifiers
//!
//! Provider ids are parsed and validated; all other entity ids are opaque.

pub mod country;
pub mod entity_id;
pub mod provider_id;

pub use country::CountryCode;
pub use entity_id::EntityId;
pub use provider_id::{ProviderId, ProviderIdFormat};
