//! Running one orchestrator per tile and gathering the results.
//!
//! Workers are tasks on a dedicated rayon pool with one thread per worker.
//! They share a single read-only `Arc<LhsTable>`. A panicking worker fails
//! the whole run; nothing is retried.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, info_span};

use super::orchestrator::SearchOrchestrator;
use super::partition::{default_tile_sizes, partition, validate_partition};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::lhs::{LhsTable, TableParams};
use crate::model::ConfirmedResult;

/// Fixed-size pool of search workers.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, SearchError> {
        if workers == 0 {
            return Err(SearchError::MisconfiguredPartition("worker count must be > 0".into()));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task(i)` for every worker index and concatenate the outputs in
    /// index order. A single worker runs on the calling thread.
    pub fn run<T, F>(&self, task: F) -> Result<Vec<T>, SearchError>
    where
        T: Send,
        F: Fn(usize) -> Result<Vec<T>, SearchError> + Sync,
    {
        if self.workers == 1 {
            return guarded(0, &task);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("gcf-worker-{i}"))
            .build()
            .map_err(|e| SearchError::PoolSetup(e.to_string()))?;
        let per_worker: Vec<Result<Vec<T>, SearchError>> = pool.install(|| {
            (0..self.workers)
                .into_par_iter()
                .map(|index| guarded(index, &task))
                .collect()
        });

        let mut out = Vec::new();
        for result in per_worker {
            out.extend(result?);
        }
        Ok(out)
    }
}

fn guarded<T, F>(index: usize, task: &F) -> Result<Vec<T>, SearchError>
where
    F: Fn(usize) -> Result<Vec<T>, SearchError>,
{
    match catch_unwind(AssertUnwindSafe(|| task(index))) {
        Ok(result) => result,
        Err(payload) => Err(SearchError::WorkerFailure {
            index,
            reason: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Search the configured space with `config.workers` workers.
///
/// The LHS table is built (or loaded from `config.snapshot`) once and shared
/// by every worker. An empty result means no identity exists in the space.
pub fn run_search(config: &SearchConfig) -> Result<Vec<ConfirmedResult>, SearchError> {
    config.validate()?;
    let (poly_a, poly_b) = config.polynomials()?;
    let pool = WorkerPool::new(config.workers)?;
    let tile_sizes = config
        .tile_sizes
        .clone()
        .unwrap_or_else(|| default_tile_sizes(poly_a, pool.workers()));
    validate_partition(poly_a, &tile_sizes, pool.workers())?;

    let _span = info_span!("search", constant = %config.constant, workers = pool.workers()).entered();
    let started = Instant::now();

    let params = TableParams::from_config(config);
    let table = Arc::new(match &config.snapshot {
        Some(path) => LhsTable::build_or_load(path, &params)?,
        None => LhsTable::from_params(&params)?,
    });

    let results = pool.run(|index| {
        let slice = partition(poly_a, &tile_sizes, pool.workers(), index);
        debug!(worker = index, assignments = slice.assignment_count(), "worker starting");
        let mut orchestrator = SearchOrchestrator::new(config, Some(Arc::clone(&table)))?;
        orchestrator.find_hits(&slice, poly_b, config.progress && index == 0)
    })?;

    info!(
        results = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search finished"
    );
    Ok(results)
}
