//! Exact numeric layer.
//!
//! All values are quotients of big integers. The constant enters as a
//! decimal truncation `M / 10^digits`; Möbius transforms and continued
//! fraction convergents stay exact from there on, so the only precision
//! knob is how many digits of the constant are carried.
//!
//! - **[`constants`]**: fixed-point evaluation of the supported constants.
//! - **[`mobius`]**: integer Möbius transforms `x ↦ (ax + b)/(cx + d)`.
//! - **[`gcf`]**: forward-recurrence evaluation of generalized continued fractions.

pub mod constants;
pub mod gcf;
pub mod mobius;

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

pub use constants::Constant;
pub use gcf::{evaluate_gcf, truncated_gcf_key};
pub use mobius::MobiusTransform;

/// `10^exp` as a big integer.
#[must_use]
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

/// An exact, unreduced quotient `num / den` with `den > 0`.
///
/// A zero denominator cannot be represented: constructors return `None`
/// instead, which is how undefined evaluations are signalled.
#[derive(Clone)]
pub struct Fraction {
    num: BigInt,
    den: BigInt,
}

impl Fraction {
    /// Build `num / den`, or `None` when `den == 0`.
    #[must_use]
    pub fn new(num: BigInt, den: BigInt) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        if den.is_negative() {
            Some(Self {
                num: -num,
                den: -den,
            })
        } else {
            Some(Self { num, den })
        }
    }

    /// The integer `n` as a fraction.
    #[must_use]
    pub fn from_integer(n: i64) -> Self {
        Self {
            num: BigInt::from(n),
            den: BigInt::from(1),
        }
    }

    /// A decimal fixed-point value `mantissa / 10^digits`.
    #[must_use]
    pub fn from_fixed(mantissa: BigInt, digits: u32) -> Self {
        Self {
            num: mantissa,
            den: pow10(digits),
        }
    }

    pub fn numerator(&self) -> &BigInt {
        &self.num
    }

    pub fn denominator(&self) -> &BigInt {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// `trunc(self · 10^key_digits)`, the approximate-hash key.
    ///
    /// Returns `None` when the key does not fit in an `i64`; such a value can
    /// never be present in a table.
    #[must_use]
    pub fn truncated_key(&self, key_digits: u32) -> Option<i64> {
        self.key_with_scale(&pow10(key_digits))
    }

    /// Same as [`Fraction::truncated_key`] with a precomputed `10^key_digits`.
    #[must_use]
    pub fn key_with_scale(&self, scale: &BigInt) -> Option<i64> {
        // BigInt division truncates toward zero.
        (&self.num * scale / &self.den).to_i64()
    }

    /// Closeness test with `eps = 10^-eps_digits`, accepted either as an
    /// absolute or as a relative bound (the larger magnitude is the reference).
    ///
    /// Evaluated exactly: `|n1·d2 − n2·d1| · 10^eps_digits ≤ max(d1·d2, |n1·d2|, |n2·d1|)`.
    #[must_use]
    pub fn almost_eq(&self, other: &Self, eps_digits: u32) -> bool {
        let left = &self.num * &other.den;
        let right = &other.num * &self.den;
        let diff = (&left - &right).abs() * pow10(eps_digits);
        let reference = (&self.den * &other.den).max(left.abs()).max(right.abs());
        diff <= reference
    }

    /// Decimal rendering with exactly `digits` significant digits, rounded
    /// half-up, in scientific form with trailing zeros trimmed
    /// (`1.2732395e0`, `-3e-4`). Zero renders as `0`.
    #[must_use]
    pub fn to_significant(&self, digits: u32) -> String {
        let digits = digits.max(1);
        if self.num.is_zero() {
            return "0".to_string();
        }
        let magnitude = self.num.abs();
        let upper = pow10(digits);
        let lower = pow10(digits - 1);

        let mut exponent = estimate_exponent(&magnitude, &self.den);
        loop {
            let leading = shift_quotient(&magnitude, &self.den, i64::from(digits) - 1 - exponent);
            if leading >= upper {
                exponent += 1;
            } else if leading < lower {
                exponent -= 1;
            } else {
                break;
            }
        }

        let extended = shift_quotient(&magnitude, &self.den, i64::from(digits) - exponent);
        let mut mantissa = (extended + 5) / 10;
        if mantissa >= upper {
            mantissa = lower;
            exponent += 1;
        }

        let text = mantissa.to_string();
        let (head, tail) = text.split_at(1);
        let tail = tail.trim_end_matches('0');
        let sign = if self.num.is_negative() { "-" } else { "" };
        if tail.is_empty() {
            format!("{sign}{head}e{exponent}")
        } else {
            format!("{sign}{head}.{tail}e{exponent}")
        }
    }

    /// Lossy conversion for human-readable previews.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_significant(17).parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Debug for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fraction({})", self.to_significant(30))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().map_or(20, |p| p as u32);
        f.write_str(&self.to_significant(digits))
    }
}

/// Rough `floor(log10(num / den))` from bit lengths; off by at most one.
fn estimate_exponent(num: &BigInt, den: &BigInt) -> i64 {
    let bits = num.bits() as f64 - den.bits() as f64;
    (bits * std::f64::consts::LOG10_2).floor() as i64
}

/// `trunc(num · 10^shift / den)` for a possibly negative `shift`.
fn shift_quotient(num: &BigInt, den: &BigInt, shift: i64) -> BigInt {
    if shift >= 0 {
        num * pow10(shift as u32) / den
    } else {
        num / (den * pow10(shift.unsigned_abs() as u32))
    }
}
