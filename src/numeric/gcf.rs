//! Generalized continued fractions `a_0 + b_0/(a_1 + b_1/(a_2 + …))`.
//!
//! Evaluated with the forward (Wallis) recurrence
//!
//! ```text
//! p_i = a_i·p_{i-1} + b_{i-1}·p_{i-2}      p_{-1} = 1, p_0 = a_0
//! q_i = a_i·q_{i-1} + b_{i-1}·q_{i-2}      q_{-1} = 0, q_0 = 1
//! ```
//!
//! which costs two big-integer multiply-adds per term instead of one
//! division per nesting level.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use super::Fraction;

/// Last convergent `(p, q)` of the fraction defined by `an` and `bn`.
///
/// `bn[i]` is the partial numerator sitting above `an[i + 1]`; extra `bn`
/// terms are ignored. `None` for an empty `an`.
#[must_use]
pub fn convergent(an: &[i64], bn: &[i64]) -> Option<(BigInt, BigInt)> {
    let (first, rest) = an.split_first()?;
    let mut prev_p = BigInt::one();
    let mut p = BigInt::from(*first);
    let mut prev_q = BigInt::zero();
    let mut q = BigInt::one();
    for (&a, &b) in rest.iter().zip(bn) {
        let next_p = &p * a + &prev_p * b;
        let next_q = &q * a + &prev_q * b;
        prev_p = std::mem::replace(&mut p, next_p);
        prev_q = std::mem::replace(&mut q, next_q);
    }
    Some((p, q))
}

/// Value of the continued fraction; `None` if empty or if the final
/// denominator vanishes.
#[must_use]
pub fn evaluate_gcf(an: &[i64], bn: &[i64]) -> Option<Fraction> {
    let (p, q) = convergent(an, bn)?;
    Fraction::new(p, q)
}

/// `trunc(value · scale)` without materialising a [`Fraction`].
///
/// `scale` is `10^key_digits`. `None` when the value is undefined or its key
/// does not fit in an `i64`.
#[must_use]
pub fn truncated_gcf_key(an: &[i64], bn: &[i64], scale: &BigInt) -> Option<i64> {
    let (p, q) = convergent(an, bn)?;
    if q.is_zero() {
        return None;
    }
    (p * scale / q).to_i64()
}
