//! Value types passed between the matching engine, the verifier and the
//! report writers.

pub mod types;

pub use types::{ConfirmedResult, Match};
