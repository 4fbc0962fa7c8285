//! High-precision refinement of first-phase hits.
//!
//! A hit is only a bucket collision at key granularity. Here the transform
//! is re-evaluated with thousands of digits of the constant, the continued
//! fraction is regenerated with a long sequence, and the two values must
//! agree on every one of `confirm_digits` significant digits.

use rayon::prelude::*;
use tracing::debug;

use crate::model::{ConfirmedResult, Match};
use crate::numeric::{Fraction, evaluate_gcf};
use crate::series::Generators;

/// Outcome of checking one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Confirmed,
    /// The transform has a pole at the constant.
    Undefined,
    /// The transform's value does not depend on the constant.
    ConstantIndependent,
    /// The sequences overflow or the continued fraction's denominator vanishes.
    DegenerateRhs,
    /// The values disagree within the confirmation length.
    Mismatch,
}

/// `true` when both values render identically at `digits` significant
/// digits. Differences past that length are tolerated.
#[must_use]
pub fn values_agree(lhs: &Fraction, rhs: &Fraction, digits: u32) -> bool {
    lhs.to_significant(digits) == rhs.to_significant(digits)
}

pub struct Verifier<'a> {
    constant: &'a Fraction,
    generators: &'a Generators,
    verify_terms: usize,
    independence_digits: u32,
    confirm_digits: u32,
}

impl<'a> Verifier<'a> {
    /// `constant` must carry the verification precision.
    pub fn new(
        constant: &'a Fraction,
        generators: &'a Generators,
        verify_terms: usize,
        independence_digits: u32,
        confirm_digits: u32,
    ) -> Self {
        Self {
            constant,
            generators,
            verify_terms,
            independence_digits,
            confirm_digits,
        }
    }

    pub fn check(&self, candidate: &Match) -> Verdict {
        let Some(lhs) = candidate.lhs.apply(self.constant) else {
            return Verdict::Undefined;
        };
        if candidate
            .lhs
            .is_constant_independent(&lhs, self.independence_digits)
        {
            return Verdict::ConstantIndependent;
        }
        let Some(rhs) = candidate
            .sequences(self.verify_terms, self.generators)
            .and_then(|(an, bn)| evaluate_gcf(&an, &bn))
        else {
            return Verdict::DegenerateRhs;
        };
        if values_agree(&lhs, &rhs, self.confirm_digits) {
            Verdict::Confirmed
        } else {
            Verdict::Mismatch
        }
    }

    /// The confirmed subset of `matches`, in input order.
    pub fn verify(&self, matches: &[Match]) -> Vec<ConfirmedResult> {
        matches
            .par_iter()
            .filter_map(|candidate| match self.check(candidate) {
                Verdict::Confirmed => Some(ConfirmedResult::from(candidate.clone())),
                verdict => {
                    debug!(lhs = %candidate.lhs, ?verdict, "rejected candidate");
                    None
                }
            })
            .collect()
    }
}
