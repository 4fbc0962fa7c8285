//! First-phase enumeration.
//!
//! Every `(a_n, b_n)` assignment pair is evaluated as a continued fraction
//! with a short sequence length, truncated to the table's key granularity
//! and probed in the LHS table. The side with fewer assignments is
//! materialised up front; the other side is streamed against it.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use num_bigint::BigInt;
use tracing::{debug, info};

use crate::lhs::LhsTable;
use crate::model::Match;
use crate::numeric::truncated_gcf_key;
use crate::series::{CompactPolynomial, Generators, SeriesGenerator};

/// Candidates between two progress events.
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// One materialised assignment and its sequence.
struct Cached {
    coefficients: Vec<i64>,
    sequence: Vec<i64>,
}

/// Sequence of `coefficients`, or `None` if it overflows or contains a zero
/// term (a zero partial term makes the fraction ill-defined).
fn usable_sequence(
    generator: &dyn SeriesGenerator,
    coefficients: &[i64],
    length: usize,
) -> Option<Vec<i64>> {
    generator
        .generate(coefficients, length)
        .filter(|seq| !seq.contains(&0))
}

/// Assignments of `poly` followed by those of its negation.
fn signed_assignments<'p>(
    poly: &'p CompactPolynomial,
    negated: &'p CompactPolynomial,
) -> impl Iterator<Item = Vec<i64>> + 'p {
    poly.assignments().chain(negated.assignments())
}

fn materialize(
    assignments: impl Iterator<Item = Vec<i64>>,
    generator: &dyn SeriesGenerator,
    length: usize,
) -> Vec<Cached> {
    assignments
        .filter_map(|coefficients| {
            let sequence = usable_sequence(generator, &coefficients, length)?;
            Some(Cached {
                coefficients,
                sequence,
            })
        })
        .collect()
}

/// Probes the LHS table with continued fractions built from two compact
/// polynomials.
pub struct MatchingEngine<'a> {
    table: &'a LhsTable,
    generators: &'a Generators,
    enum_terms: usize,
    show_progress: bool,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(table: &'a LhsTable, generators: &'a Generators, enum_terms: usize) -> Self {
        Self {
            table,
            generators,
            enum_terms,
            show_progress: false,
        }
    }

    /// Draw a progress bar when stderr is a terminal.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// All first-phase hits, in enumeration order.
    ///
    /// `poly_b` is searched both as given and term-wise negated. The output
    /// is deterministic for fixed inputs.
    pub fn find_matches(&self, poly_a: &CompactPolynomial, poly_b: &CompactPolynomial) -> Vec<Match> {
        let negated_b = poly_b.negated();
        let size_a = poly_a.assignment_count();
        let size_b = poly_b.assignment_count().saturating_mul(2);

        let scale = self.table.key_scale();
        let mut matches = Vec::new();
        let an_gen = self.generators.an.as_ref();
        let bn_gen = self.generators.bn.as_ref();

        if size_a > size_b {
            let cached_b = materialize(signed_assignments(poly_b, &negated_b), bn_gen, self.enum_terms);
            debug!(streamed = "a_n", size_a, cached = cached_b.len(), "enumerating");
            let mut progress = Progress::new(size_a.saturating_mul(cached_b.len() as u64), self.show_progress);
            for a in poly_a.assignments() {
                let Some(an) = usable_sequence(an_gen, &a, self.enum_terms) else {
                    progress.skip(cached_b.len() as u64, matches.len());
                    continue;
                };
                for b in &cached_b {
                    if let Some(m) = self.probe(&an, &b.sequence, &scale, &a, &b.coefficients) {
                        matches.push(m);
                    }
                    progress.tick(matches.len());
                }
            }
            progress.finish(matches.len());
        } else {
            let cached_a = materialize(poly_a.assignments(), an_gen, self.enum_terms);
            debug!(streamed = "b_n", size_b, cached = cached_a.len(), "enumerating");
            let mut progress = Progress::new(size_b.saturating_mul(cached_a.len() as u64), self.show_progress);
            for b in signed_assignments(poly_b, &negated_b) {
                let Some(bn) = usable_sequence(bn_gen, &b, self.enum_terms) else {
                    progress.skip(cached_a.len() as u64, matches.len());
                    continue;
                };
                for a in &cached_a {
                    if let Some(m) = self.probe(&a.sequence, &bn, &scale, &a.coefficients, &b) {
                        matches.push(m);
                    }
                    progress.tick(matches.len());
                }
            }
            progress.finish(matches.len());
        }
        matches
    }

    fn probe(
        &self,
        an: &[i64],
        bn: &[i64],
        scale: &BigInt,
        an_coefficients: &[i64],
        bn_coefficients: &[i64],
    ) -> Option<Match> {
        let key = truncated_gcf_key(an, bn, scale)?;
        let lhs = *self.table.lookup(key)?;
        debug!(key, %lhs, ?an_coefficients, ?bn_coefficients, "table hit");
        Some(Match {
            lhs,
            an_coefficients: an_coefficients.to_vec(),
            bn_coefficients: bn_coefficients.to_vec(),
        })
    }
}

/// Candidate counter with periodic `info!` events and an optional bar.
struct Progress {
    bar: Option<ProgressBar>,
    total: u64,
    processed: u64,
    next_report: u64,
}

impl Progress {
    fn new(total: u64, show: bool) -> Self {
        let bar = show.then(|| {
            let pb = ProgressBar::new(total);
            if std::io::stderr().is_terminal() {
                let style = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} candidates ({msg})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar());
                pb.set_style(style);
            } else {
                pb.set_draw_target(ProgressDrawTarget::hidden());
            }
            pb
        });
        Self {
            bar,
            total,
            processed: 0,
            next_report: PROGRESS_INTERVAL,
        }
    }

    fn tick(&mut self, hits: usize) {
        self.advance(1, hits);
    }

    /// Account for candidates dropped together with a degenerate sequence.
    fn skip(&mut self, count: u64, hits: usize) {
        self.advance(count, hits);
    }

    fn advance(&mut self, count: u64, hits: usize) {
        self.processed += count;
        if self.processed >= self.next_report {
            self.next_report = (self.processed / PROGRESS_INTERVAL + 1) * PROGRESS_INTERVAL;
            info!(processed = self.processed, total = self.total, hits, "enumeration progress");
            if let Some(bar) = &self.bar {
                bar.set_position(self.processed);
                bar.set_message(format!("{hits} hits"));
            }
        }
    }

    fn finish(self, hits: usize) {
        if let Some(bar) = self.bar {
            bar.set_position(self.processed);
            bar.finish_with_message(format!("{hits} hits"));
        }
    }
}
