//! Integer sequences generated from compact polynomials.
//!
//! A compact polynomial is an ordered list of coefficient choices, one list
//! per term. Each concrete assignment (one value per term) defines a
//! sequence through a [`SeriesGenerator`]. The default [`Horner`] generator
//! reads an assignment `[c_0, c_1, …, c_k]` as
//! `n(n(…(n·c_0 + c_1)…) + c_{k-1}) + c_k`, evaluated at `n = 0, 1, 2, …`.
//!
//! Generators are picked once, when an orchestrator is built, through
//! [`GeneratorKind`]; they never change during a run.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Produces the integer sequence of one coefficient assignment.
pub trait SeriesGenerator: Send + Sync + fmt::Debug {
    /// First `length` terms, or `None` if a term overflows `i64`.
    fn generate(&self, coefficients: &[i64], length: usize) -> Option<Vec<i64>>;
}

fn horner(coefficients: &[i64], n: i64) -> Option<i64> {
    coefficients
        .iter()
        .try_fold(0i64, |acc, &c| acc.checked_mul(n)?.checked_add(c))
}

/// Polynomial in `n`, highest-order coefficient first, starting at `n = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Horner;

impl SeriesGenerator for Horner {
    fn generate(&self, coefficients: &[i64], length: usize) -> Option<Vec<i64>> {
        (0..length as i64).map(|n| horner(coefficients, n)).collect()
    }
}

/// The [`Horner`] polynomial evaluated at `n + offset`.
#[derive(Debug, Clone, Copy)]
pub struct Shifted {
    pub offset: i64,
}

impl SeriesGenerator for Shifted {
    fn generate(&self, coefficients: &[i64], length: usize) -> Option<Vec<i64>> {
        (0..length as i64)
            .map(|n| horner(coefficients, n.checked_add(self.offset)?))
            .collect()
    }
}

/// Serializable choice of generator (`horner` or `shifted:<offset>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GeneratorKind {
    #[default]
    Horner,
    Shifted {
        offset: i64,
    },
}

impl GeneratorKind {
    pub fn build(self) -> Arc<dyn SeriesGenerator> {
        match self {
            Self::Horner => Arc::new(Horner),
            Self::Shifted { offset } => Arc::new(Shifted { offset }),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horner => write!(f, "horner"),
            Self::Shifted { offset } => write!(f, "shifted:{offset}"),
        }
    }
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("horner") {
            return Ok(Self::Horner);
        }
        if let Some(offset) = s.strip_prefix("shifted:") {
            let offset = offset
                .trim()
                .parse()
                .map_err(|e| format!("invalid shift offset `{offset}`: {e}"))?;
            return Ok(Self::Shifted { offset });
        }
        Err(format!("unknown series generator `{s}` (expected `horner` or `shifted:<n>`)"))
    }
}

impl TryFrom<String> for GeneratorKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GeneratorKind> for String {
    fn from(value: GeneratorKind) -> Self {
        value.to_string()
    }
}

/// The pair of generators used for the `a_n` and `b_n` sides.
#[derive(Debug, Clone)]
pub struct Generators {
    pub an: Arc<dyn SeriesGenerator>,
    pub bn: Arc<dyn SeriesGenerator>,
}

impl Generators {
    pub fn new(an: GeneratorKind, bn: GeneratorKind) -> Self {
        Self {
            an: an.build(),
            bn: bn.build(),
        }
    }
}

impl Default for Generators {
    fn default() -> Self {
        Self::new(GeneratorKind::Horner, GeneratorKind::Horner)
    }
}

/// One term of a compact polynomial: the values a coefficient may take.
/// Upper bound on the values one parsed term may expand to.
pub const MAX_TERM_VALUES: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientTerm(pub Vec<i64>);

impl FromStr for CoefficientTerm {
    type Err = String;

    /// Accepts `3`, `1,2,5`, `0..4`, `-2..=2`, or comma-separated mixes.
    /// A term holds at most [`MAX_TERM_VALUES`] values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = Vec::new();
        for piece in s.split(',').map(str::trim) {
            if piece.is_empty() {
                return Err(format!("empty coefficient in `{s}`"));
            }
            let (lo, hi, inclusive) = if let Some((lo, hi)) = piece.split_once("..=") {
                (parse_int(lo)?, parse_int(hi)?, true)
            } else if let Some((lo, hi)) = piece.split_once("..") {
                (parse_int(lo)?, parse_int(hi)?, false)
            } else {
                let value = parse_int(piece)?;
                (value, value, true)
            };
            let len = (i128::from(hi) - i128::from(lo) + i128::from(inclusive)).max(0);
            if values.len() as i128 + len > MAX_TERM_VALUES as i128 {
                return Err(format!("coefficient range `{piece}` has too many values"));
            }
            if inclusive {
                values.extend(lo..=hi);
            } else {
                values.extend(lo..hi);
            }
        }
        if values.is_empty() {
            return Err(format!("coefficient term `{s}` has no values"));
        }
        Ok(Self(values))
    }
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.trim()
        .parse()
        .map_err(|e| format!("invalid coefficient `{}`: {e}", s.trim()))
}

/// An ordered list of coefficient ranges defining a family of sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactPolynomial(Vec<Vec<i64>>);

impl CompactPolynomial {
    pub fn new(terms: Vec<Vec<i64>>) -> Self {
        Self(terms)
    }

    pub fn terms(&self) -> &[Vec<i64>] {
        &self.0
    }

    pub fn into_terms(self) -> Vec<Vec<i64>> {
        self.0
    }

    /// Number of concrete assignments (product of the term sizes).
    pub fn assignment_count(&self) -> u64 {
        self.0
            .iter()
            .map(|t| t.len() as u64)
            .fold(1u64, u64::saturating_mul)
    }

    /// Term-wise negation: every coefficient choice `c` becomes `-c`.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|t| t.iter().map(|c| -c).collect())
                .collect(),
        )
    }

    /// All assignments in lexicographic order, last term varying fastest.
    pub fn assignments(&self) -> impl Iterator<Item = Vec<i64>> + '_ {
        self.0
            .iter()
            .map(|t| t.iter().copied())
            .multi_cartesian_product()
    }

    /// Copy with term `index` replaced by `values`.
    #[must_use]
    pub fn with_term(&self, index: usize, values: Vec<i64>) -> Self {
        let mut terms = self.0.clone();
        terms[index] = values;
        Self(terms)
    }

    /// Empty polynomials and empty terms enumerate nothing useful.
    pub fn check_non_empty(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("compact polynomial has no terms".into());
        }
        if let Some(i) = self.0.iter().position(Vec::is_empty) {
            return Err(format!("compact polynomial term {i} has no values"));
        }
        Ok(())
    }
}

impl From<Vec<CoefficientTerm>> for CompactPolynomial {
    fn from(terms: Vec<CoefficientTerm>) -> Self {
        Self(terms.into_iter().map(|t| t.0).collect())
    }
}

impl FromStr for CompactPolynomial {
    type Err = String;

    /// Terms separated by `;` or whitespace, e.g. `"0..=2; 1,3 -1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let terms = s
            .split(|c: char| c == ';' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<CoefficientTerm>().map(|t| t.0))
            .collect::<Result<Vec<_>, _>>()?;
        let poly = Self(terms);
        poly.check_non_empty()?;
        Ok(poly)
    }
}

impl fmt::Display for CompactPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .0
            .iter()
            .map(|t| format!("[{}]", t.iter().join(", ")))
            .join(", ");
        write!(f, "[{terms}]")
    }
}
