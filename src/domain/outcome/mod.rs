//! Push outcome taxonomy
//!
//! Every push against a collaborator is classified into a [`PushOutcome`];
//! batches of outcomes are folded with [`flatten`].

pub mod aggregator;
pub mod kind;
pub mod push_outcome;

pub use aggregator::{flatten, EMPTY_FLATTEN_DESCRIPTION};
pub use kind::PushResultKind;
pub use push_outcome::{PushOutcome, Warning};
