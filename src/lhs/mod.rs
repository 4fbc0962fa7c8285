//! The LHS table: every small Möbius transform of the constant, indexed by
//! its truncated value.
//!
//! A key is `trunc(value · 10^key_digits)`. On key collision the first
//! inserted transform wins, in `(a, b, c, d)` lexicographic order, so the
//! table is deterministic for a given set of parameters. Once built the
//! table is never mutated; workers share it behind an `Arc`.
//!
//! - **[`snapshot`]**: MessagePack persistence and build-or-load.

pub mod snapshot;

use std::ops::RangeInclusive;
use std::time::Instant;

use num_bigint::BigInt;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::numeric::{Constant, Fraction, MobiusTransform, pow10};

/// Largest key granularity whose keys still fit in an `i64`.
pub const MAX_KEY_DIGITS: u32 = 18;

/// Everything that determines the contents of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableParams {
    pub constant: Constant,
    pub lhs_limit: i64,
    pub key_digits: u32,
    pub enum_dps: u32,
}

impl TableParams {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            constant: config.constant.clone(),
            lhs_limit: config.lhs_limit,
            key_digits: config.key_digits(),
            enum_dps: config.enum_dps,
        }
    }

    /// Range of the numerator coefficients `a, b` (non-negative).
    pub fn numerator_range(&self) -> RangeInclusive<i64> {
        0..=self.lhs_limit
    }

    /// Range of the denominator coefficients `c, d` (signed).
    pub fn denominator_range(&self) -> RangeInclusive<i64> {
        -self.lhs_limit..=self.lhs_limit
    }

    /// Tolerance digits for the constant-independence filter at build time.
    pub fn independence_digits(&self) -> u32 {
        self.enum_dps.saturating_sub(2).max(1)
    }

    /// Stable short hash of the parameters, used to name snapshot files.
    pub fn fingerprint(&self) -> String {
        let text = format!(
            "{}|{}|{}|{}",
            self.constant, self.lhs_limit, self.key_digits, self.enum_dps
        );
        blake3::hash(text.as_bytes()).to_hex()[..16].to_string()
    }

    /// Default snapshot file name, e.g. `lhs-pi-5-3f1c0e2ab4d59e71.lhs`.
    pub fn snapshot_file_name(&self) -> String {
        let label: String = self
            .constant
            .to_string()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(12)
            .collect();
        format!("lhs-{label}-{}-{}.lhs", self.lhs_limit, self.fingerprint())
    }
}

/// Immutable map from truncated key to the transform that produced it.
#[derive(Debug, Clone)]
pub struct LhsTable {
    key_digits: u32,
    entries: FxHashMap<i64, MobiusTransform>,
}

impl LhsTable {
    /// Build the table for `params`, evaluating the constant at `enum_dps`.
    pub fn from_params(params: &TableParams) -> Result<Self, SearchError> {
        let started = Instant::now();
        let constant = params.constant.approximate(params.enum_dps)?;
        let table = Self::build(
            params.numerator_range(),
            params.denominator_range(),
            &constant,
            params.key_digits,
            params.independence_digits(),
        );
        info!(
            constant = %params.constant,
            lhs_limit = params.lhs_limit,
            entries = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built LHS table"
        );
        Ok(table)
    }

    /// Enumerate `(a, b) ∈ numerator_range²`, `(c, d) ∈ denominator_range²`
    /// and keep every reduced transform whose value at `constant` is defined,
    /// non-zero and genuinely depends on the constant.
    ///
    /// Keys are computed in parallel per `a`, then inserted in enumeration
    /// order so that the first-inserted-wins rule is deterministic.
    pub fn build(
        numerator_range: RangeInclusive<i64>,
        denominator_range: RangeInclusive<i64>,
        constant: &Fraction,
        key_digits: u32,
        independence_digits: u32,
    ) -> Self {
        let scale = pow10(key_digits);
        let a_values: Vec<i64> = numerator_range.clone().collect();

        let per_a: Vec<Vec<(i64, MobiusTransform)>> = a_values
            .par_iter()
            .map(|&a| {
                let mut accepted = Vec::new();
                for b in numerator_range.clone() {
                    for c in denominator_range.clone() {
                        for d in denominator_range.clone() {
                            let transform = MobiusTransform::new(a, b, c, d);
                            if let Some(key) =
                                candidate_key(&transform, constant, &scale, independence_digits)
                            {
                                accepted.push((key, transform));
                            }
                        }
                    }
                }
                accepted
            })
            .collect();

        let mut entries = FxHashMap::default();
        for (key, transform) in per_a.into_iter().flatten() {
            entries.entry(key).or_insert(transform);
        }
        Self {
            key_digits,
            entries,
        }
    }

    pub(crate) fn from_entries(key_digits: u32, entries: FxHashMap<i64, MobiusTransform>) -> Self {
        Self {
            key_digits,
            entries,
        }
    }

    pub fn contains(&self, key: i64) -> bool {
        self.entries.contains_key(&key)
    }

    /// The transform stored under `key`; `None` means "no match".
    pub fn lookup(&self, key: i64) -> Option<&MobiusTransform> {
        self.entries.get(&key)
    }

    pub fn key_digits(&self) -> u32 {
        self.key_digits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &MobiusTransform)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// `10^key_digits`, the multiplier that turns a value into its key.
    pub fn key_scale(&self) -> BigInt {
        pow10(self.key_digits)
    }
}

/// Two tables are equal when their thresholds and key sets agree; the
/// stored transforms are not compared. This answers "can this cached table
/// be reused", not "are these tables semantically identical".
impl PartialEq for LhsTable {
    fn eq(&self, other: &Self) -> bool {
        self.key_digits == other.key_digits
            && self.entries.len() == other.entries.len()
            && self.entries.keys().all(|k| other.entries.contains_key(k))
    }
}

/// Key of one candidate transform, or `None` if it must not be stored.
fn candidate_key(
    transform: &MobiusTransform,
    constant: &Fraction,
    scale: &BigInt,
    independence_digits: u32,
) -> Option<i64> {
    if !transform.is_reduced() {
        return None;
    }
    let value = transform.apply(constant)?;
    if value.is_zero() || transform.is_constant_independent(&value, independence_digits) {
        return None;
    }
    value.key_with_scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    fn params(constant: Constant, lhs_limit: i64) -> TableParams {
        TableParams {
            constant,
            lhs_limit,
            key_digits: 10,
            enum_dps: 50,
        }
    }

    #[test]
    fn e_table_contains_known_transform() {
        let table = LhsTable::from_params(&params(Constant::E, 2)).unwrap();
        // 1/(e - 2) = 1.3922111911773...
        let key = 13_922_111_911;
        assert!(table.contains(key));
        assert_eq!(table.lookup(key), Some(&MobiusTransform::new(0, 1, 1, -2)));
        assert_eq!(table.len(), 146);
    }

    #[test]
    fn lookup_of_missing_key_is_none() {
        let table = LhsTable::from_params(&params(Constant::Pi, 1)).unwrap();
        assert!(!table.contains(0));
        assert!(table.lookup(0).is_none());
    }

    #[test]
    fn filters_hold_for_every_entry() {
        let p = params(Constant::Pi, 3);
        let table = LhsTable::from_params(&p).unwrap();
        let x = p.constant.approximate(p.enum_dps).unwrap();
        for (key, t) in table.iter() {
            assert!(t.is_reduced(), "{t} is not reduced");
            let value = t.apply(&x).expect("denominator non-zero");
            assert!(!value.is_zero());
            assert!(!t.is_constant_independent(&value, p.independence_digits()));
            assert_eq!(value.truncated_key(10), Some(key));
        }
    }

    #[test]
    fn first_inserted_transform_wins() {
        // A rational "constant" makes many distinct transforms collide.
        let half = Fraction::new(BigInt::from(1), BigInt::from(2)).unwrap();
        let scale = pow10(6);
        let table = LhsTable::build(0..=1, -2..=2, &half, 6, 20);
        assert!(!table.is_empty());

        let enumeration_order: Vec<MobiusTransform> = iproduct!(0..=1, 0..=1, -2..=2, -2..=2)
            .map(|(a, b, c, d)| MobiusTransform::new(a, b, c, d))
            .collect();
        for (key, stored) in table.iter() {
            let first = enumeration_order
                .iter()
                .find(|cand| candidate_key(cand, &half, &scale, 20) == Some(key))
                .expect("some candidate produces the key");
            assert_eq!(first, stored);
        }
    }

    #[test]
    fn equality_ignores_values() {
        let a = LhsTable::from_params(&params(Constant::E, 2)).unwrap();
        let mut entries: FxHashMap<i64, MobiusTransform> =
            a.iter().map(|(k, _)| (k, MobiusTransform::new(9, 9, 9, 9))).collect();
        let b = LhsTable::from_entries(a.key_digits(), entries.clone());
        assert_eq!(a, b);

        entries.remove(&13_922_111_911);
        let c = LhsTable::from_entries(a.key_digits(), entries);
        assert_ne!(a, c);

        let d = LhsTable::from_entries(8, a.iter().map(|(k, t)| (k, *t)).collect());
        assert_ne!(a, d);
    }

    #[test]
    fn snapshot_names_are_parameter_specific() {
        let p = params(Constant::Pi, 5);
        let q = TableParams {
            key_digits: 8,
            ..p.clone()
        };
        assert_ne!(p.fingerprint(), q.fingerprint());
        assert!(p.snapshot_file_name().starts_with("lhs-pi-5-"));
        assert_eq!(p.fingerprint(), params(Constant::Pi, 5).fingerprint());
    }
}
