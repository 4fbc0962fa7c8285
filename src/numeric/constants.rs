//! Target constants evaluated to an arbitrary number of decimal digits.
//!
//! Every series runs in fixed point at `10^(digits + GUARD_DIGITS)` and is
//! truncated back to `digits` at the end, so the returned value is the
//! constant truncated (not rounded) to the requested precision.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Fraction, pow10};
use crate::error::SearchError;

const GUARD_DIGITS: u32 = 12;

/// A constant to search identities for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Constant {
    Pi,
    E,
    /// The golden ratio (1 + √5)/2.
    Phi,
    Sqrt2,
    Ln2,
    /// Apéry's constant ζ(3).
    Zeta3,
    /// A user-supplied decimal literal such as `0.5772156649`.
    Decimal(String),
}

impl Constant {
    /// Names accepted by [`FromStr`], for help text.
    pub const NAMES: &'static [&'static str] = &["pi", "e", "phi", "sqrt2", "ln2", "zeta3"];

    /// The constant truncated to `digits` decimal places, as `M / 10^digits`.
    pub fn approximate(&self, digits: u32) -> Result<Fraction, SearchError> {
        let work = digits
            .checked_add(GUARD_DIGITS)
            .ok_or_else(|| SearchError::Constant(format!("{digits} digits is out of range")))?;
        let mantissa = match self {
            Self::Pi => pi_fixed(work),
            Self::E => e_fixed(work),
            Self::Phi => {
                let scale = pow10(work);
                (&scale + (BigInt::from(5) * &scale * &scale).sqrt()) / 2u32
            }
            Self::Sqrt2 => {
                let scale = pow10(work);
                (BigInt::from(2) * &scale * &scale).sqrt()
            }
            Self::Ln2 => BigInt::from(2) * inverse_odd_series(3, false, &pow10(work)),
            Self::Zeta3 => zeta3_fixed(work),
            Self::Decimal(text) => {
                return decimal_fixed(text, digits).map(|m| Fraction::from_fixed(m, digits));
            }
        };
        Ok(Fraction::from_fixed(mantissa / pow10(GUARD_DIGITS), digits))
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pi => write!(f, "pi"),
            Self::E => write!(f, "e"),
            Self::Phi => write!(f, "phi"),
            Self::Sqrt2 => write!(f, "sqrt2"),
            Self::Ln2 => write!(f, "ln2"),
            Self::Zeta3 => write!(f, "zeta3"),
            Self::Decimal(text) => write!(f, "{text}"),
        }
    }
}

impl FromStr for Constant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "pi" => Ok(Self::Pi),
            "e" => Ok(Self::E),
            "phi" => Ok(Self::Phi),
            "sqrt2" => Ok(Self::Sqrt2),
            "ln2" => Ok(Self::Ln2),
            "zeta3" => Ok(Self::Zeta3),
            _ if is_decimal_literal(trimmed) => Ok(Self::Decimal(trimmed.to_string())),
            _ => Err(format!(
                "unknown constant `{trimmed}` (expected one of {} or a decimal literal)",
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl TryFrom<String> for Constant {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Constant> for String {
    fn from(value: Constant) -> Self {
        value.to_string()
    }
}

fn is_decimal_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
        && !(unsigned.contains('.') && frac_part.is_empty())
}

/// Mantissa of a decimal literal rescaled to `digits` places.
fn decimal_fixed(text: &str, digits: u32) -> Result<BigInt, SearchError> {
    if !is_decimal_literal(text) {
        return Err(SearchError::Constant(format!("`{text}` is not a decimal literal")));
    }
    let negative = text.starts_with('-');
    let unsigned = text.trim_start_matches('-');
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let given = frac_part.len() as u32;
    let raw: BigInt = format!("{int_part}{frac_part}")
        .parse()
        .map_err(|e| SearchError::Constant(format!("`{text}`: {e}")))?;

    let mantissa = if given >= digits {
        raw / pow10(given - digits)
    } else {
        warn!(
            constant = text,
            given_digits = given,
            requested_digits = digits,
            "decimal constant is shorter than the working precision; padding with zeros"
        );
        raw * pow10(digits - given)
    };
    Ok(if negative { -mantissa } else { mantissa })
}

/// Σ_k (±1)^k · scale / ((2k+1) · x^(2k+1)), i.e. `scale·arctan(1/x)` when
/// alternating and `scale·atanh(1/x)` otherwise.
fn inverse_odd_series(x: u32, alternating: bool, scale: &BigInt) -> BigInt {
    let x_squared = BigInt::from(x) * BigInt::from(x);
    let mut power = scale / x;
    let mut sum = BigInt::zero();
    let mut k = 0u32;
    while !power.is_zero() {
        let term = &power / (2 * k + 1);
        if alternating && k % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }
        power /= &x_squared;
        k += 1;
    }
    sum
}

/// Machin: π = 16·arctan(1/5) − 4·arctan(1/239).
fn pi_fixed(work: u32) -> BigInt {
    let scale = pow10(work);
    BigInt::from(16) * inverse_odd_series(5, true, &scale)
        - BigInt::from(4) * inverse_odd_series(239, true, &scale)
}

fn e_fixed(work: u32) -> BigInt {
    let mut term = pow10(work);
    let mut sum = BigInt::zero();
    let mut k = 1u32;
    while !term.is_zero() {
        sum += &term;
        term /= k;
        k += 1;
    }
    sum
}

/// ζ(3) = 5/2 · Σ_{k≥1} (−1)^(k+1) / (k³ · C(2k, k)).
fn zeta3_fixed(work: u32) -> BigInt {
    let scale = pow10(work);
    let mut sum = BigInt::zero();
    let mut binomial = BigInt::one();
    let mut k = 1u64;
    loop {
        // C(2k, k) = C(2k-2, k-1) · (2k)(2k-1) / k²
        binomial = binomial * (2 * k) * (2 * k - 1) / (k * k);
        let term = &scale / (binomial.clone() * k * k * k);
        if term.is_zero() {
            break;
        }
        if k % 2 == 1 {
            sum += term;
        } else {
            sum -= term;
        }
        k += 1;
    }
    sum * 5u32 / 2u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_of(constant: Constant, digits: u32) -> String {
        constant
            .approximate(digits)
            .expect("constant evaluates")
            .numerator()
            .to_string()
    }

    #[test]
    fn pi_matches_known_digits() {
        assert_eq!(
            digits_of(Constant::Pi, 40),
            "31415926535897932384626433832795028841971"
        );
    }

    #[test]
    fn e_matches_known_digits() {
        assert_eq!(
            digits_of(Constant::E, 30),
            "2718281828459045235360287471352"
        );
    }

    #[test]
    fn algebraic_constants_match_known_digits() {
        assert_eq!(digits_of(Constant::Phi, 20), "161803398874989484820");
        assert_eq!(digits_of(Constant::Sqrt2, 20), "141421356237309504880");
    }

    #[test]
    fn series_constants_match_known_digits() {
        assert_eq!(digits_of(Constant::Ln2, 20), "69314718055994530941");
        assert_eq!(digits_of(Constant::Zeta3, 20), "120205690315959428539");
    }

    #[test]
    fn decimal_literal_is_truncated_or_padded() {
        let c: Constant = "0.5772156649".parse().unwrap();
        assert_eq!(digits_of(c.clone(), 4), "5772");
        assert_eq!(digits_of(c, 12), "577215664900");
        let neg: Constant = "-1.25".parse().unwrap();
        assert_eq!(digits_of(neg, 3), "-1250");
    }

    #[test]
    fn out_of_range_precision_is_an_error() {
        let err = Constant::Pi.approximate(u32::MAX - 5).unwrap_err();
        assert!(matches!(err, SearchError::Constant(_)), "{err:?}");
    }

    #[test]
    fn parse_accepts_names_case_insensitively() {
        assert_eq!("PI".parse::<Constant>().unwrap(), Constant::Pi);
        assert_eq!(" zeta3 ".parse::<Constant>().unwrap(), Constant::Zeta3);
        assert!("tau".parse::<Constant>().is_err());
        assert!("1.".parse::<Constant>().is_err());
        assert!("1.2.3".parse::<Constant>().is_err());
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Constant::Zeta3).unwrap();
        assert_eq!(json, "\"zeta3\"");
        let back: Constant = serde_json::from_str("\"e\"").unwrap();
        assert_eq!(back, Constant::E);
    }
}
