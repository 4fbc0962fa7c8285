//! Candidate and confirmed identities.

use serde::{Deserialize, Serialize};

use crate::numeric::{Fraction, MobiusTransform, evaluate_gcf};
use crate::series::Generators;

/// A first-phase hit: the truncated GCF value landed in the bucket of `lhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub lhs: MobiusTransform,
    pub an_coefficients: Vec<i64>,
    pub bn_coefficients: Vec<i64>,
}

/// A match that survived high-precision verification.
///
/// The coefficient assignments are enough to regenerate the sequences of any
/// length, so a consumer can re-evaluate the continued fraction on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfirmedResult {
    pub lhs: MobiusTransform,
    pub an_coefficients: Vec<i64>,
    pub bn_coefficients: Vec<i64>,
}

impl From<Match> for ConfirmedResult {
    fn from(m: Match) -> Self {
        Self {
            lhs: m.lhs,
            an_coefficients: m.an_coefficients,
            bn_coefficients: m.bn_coefficients,
        }
    }
}

impl Match {
    /// The `(a_n, b_n)` sequences of length `length`.
    pub fn sequences(&self, length: usize, generators: &Generators) -> Option<(Vec<i64>, Vec<i64>)> {
        Some((
            generators.an.generate(&self.an_coefficients, length)?,
            generators.bn.generate(&self.bn_coefficients, length)?,
        ))
    }
}

impl ConfirmedResult {
    /// The `(a_n, b_n)` sequences of length `length`.
    pub fn sequences(&self, length: usize, generators: &Generators) -> Option<(Vec<i64>, Vec<i64>)> {
        Some((
            generators.an.generate(&self.an_coefficients, length)?,
            generators.bn.generate(&self.bn_coefficients, length)?,
        ))
    }

    /// Value of the continued fraction truncated to `length` terms.
    pub fn evaluate(&self, length: usize, generators: &Generators) -> Option<Fraction> {
        let (an, bn) = self.sequences(length, generators)?;
        evaluate_gcf(&an, &bn)
    }
}
