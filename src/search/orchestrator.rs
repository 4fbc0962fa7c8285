//! One search run: table, first-phase enumeration, then verification.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span};

use super::engine::MatchingEngine;
use super::verify::Verifier;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::lhs::{LhsTable, TableParams};
use crate::model::{ConfirmedResult, Match};
use crate::series::{CompactPolynomial, Generators};

/// Where an orchestrator is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Building or loading the LHS table.
    Initializing,
    Enumerating,
    Verifying,
    Done,
}

/// Owns a table (or a shared handle to one) and drives a
/// (poly_a, poly_b) request through both precision levels.
pub struct SearchOrchestrator {
    config: SearchConfig,
    table: Arc<LhsTable>,
    generators: Generators,
    phase: Phase,
}

impl SearchOrchestrator {
    /// Use `shared_table` when given; otherwise build-or-load the configured
    /// snapshot, or build a private table in memory.
    pub fn new(config: &SearchConfig, shared_table: Option<Arc<LhsTable>>) -> Result<Self, SearchError> {
        let table = match shared_table {
            Some(table) => table,
            None => {
                let params = TableParams::from_config(config);
                let table = match &config.snapshot {
                    Some(path) => LhsTable::build_or_load(path, &params)?,
                    None => LhsTable::from_params(&params)?,
                };
                Arc::new(table)
            }
        };
        Ok(Self {
            config: config.clone(),
            table,
            generators: Generators::new(config.an_generator, config.bn_generator),
            phase: Phase::Initializing,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn table(&self) -> &Arc<LhsTable> {
        &self.table
    }

    /// Run the whole pipeline for one request.
    pub fn find_hits(
        &mut self,
        poly_a: &CompactPolynomial,
        poly_b: &CompactPolynomial,
        show_progress: bool,
    ) -> Result<Vec<ConfirmedResult>, SearchError> {
        let matches = self.first_enumeration(poly_a, poly_b, show_progress);
        self.refine(&matches)
    }

    /// First phase at enumeration precision.
    pub fn first_enumeration(
        &mut self,
        poly_a: &CompactPolynomial,
        poly_b: &CompactPolynomial,
        show_progress: bool,
    ) -> Vec<Match> {
        self.phase = Phase::Enumerating;
        let _span = info_span!(
            "enumerate",
            a_side = poly_a.assignment_count(),
            b_side = poly_b.assignment_count().saturating_mul(2)
        )
        .entered();
        let started = Instant::now();

        let engine = MatchingEngine::new(&self.table, &self.generators, self.config.enum_terms)
            .with_progress(show_progress);
        let matches = engine.find_matches(poly_a, poly_b);
        info!(
            matches = matches.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "first enumeration finished"
        );
        matches
    }

    /// Second phase at verification precision. The constant is only
    /// evaluated to `verify_dps` digits when there is something to verify.
    pub fn refine(&mut self, matches: &[Match]) -> Result<Vec<ConfirmedResult>, SearchError> {
        self.phase = Phase::Verifying;
        if matches.is_empty() {
            self.phase = Phase::Done;
            return Ok(Vec::new());
        }
        let _span = info_span!("verify", candidates = matches.len()).entered();
        let started = Instant::now();

        let constant = self.config.constant.approximate(self.config.verify_dps)?;
        let verifier = Verifier::new(
            &constant,
            &self.generators,
            self.config.verify_terms,
            self.config.verify_independence_digits(),
            self.config.confirm_digits,
        );
        let confirmed = verifier.verify(matches);
        info!(
            candidates = matches.len(),
            confirmed = confirmed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "verification finished"
        );
        self.phase = Phase::Done;
        Ok(confirmed)
    }
}
