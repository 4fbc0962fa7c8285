//! Search layer.
//!
//! - **[`engine`]**: first-phase enumeration against the LHS table.
//! - **[`verify`]**: high-precision confirmation of first-phase hits.
//! - **[`orchestrator`]**: one run through both phases, with its [`Phase`].
//! - **[`partition`]**: tiling of the `a_n` coefficient space across workers.
//! - **[`pool`]**: the worker pool and [`run_search`], the top-level entry point.

pub mod engine;
pub mod orchestrator;
pub mod partition;
pub mod pool;
pub mod verify;

pub use engine::MatchingEngine;
pub use orchestrator::{Phase, SearchOrchestrator};
pub use partition::{coverage, default_tile_sizes, partition, validate_partition};
pub use pool::{WorkerPool, run_search};
pub use verify::{Verdict, Verifier, values_agree};
