//! Integer Möbius transforms `x ↦ (a·x + b)/(c·x + d)`.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use serde::{Deserialize, Serialize};

use super::Fraction;

/// The coefficient matrix `[[a, b], [c, d]]` of a Möbius transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MobiusTransform {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub d: i64,
}

impl MobiusTransform {
    #[must_use]
    pub const fn new(a: i64, b: i64, c: i64, d: i64) -> Self {
        Self { a, b, c, d }
    }

    #[must_use]
    pub fn from_matrix(matrix: [[i64; 2]; 2]) -> Self {
        Self::new(matrix[0][0], matrix[0][1], matrix[1][0], matrix[1][1])
    }

    #[must_use]
    pub fn matrix(&self) -> [[i64; 2]; 2] {
        [[self.a, self.b], [self.c, self.d]]
    }

    /// `gcd(a, b, c, d) == 1`. The zero matrix is not reduced.
    #[must_use]
    pub fn is_reduced(&self) -> bool {
        self.a.gcd(&self.b).gcd(&self.c.gcd(&self.d)) == 1
    }

    /// Evaluate at `x`; `None` when `c·x + d` vanishes.
    #[must_use]
    pub fn apply(&self, x: &Fraction) -> Option<Fraction> {
        let (n, d) = (x.numerator(), x.denominator());
        let numerator = n * self.a + d * self.b;
        let denominator = n * self.c + d * self.d;
        Fraction::new(numerator, denominator)
    }

    /// Evaluate at `x = 1`; `None` when `c + d == 0`.
    #[must_use]
    pub fn at_one(&self) -> Option<Fraction> {
        Fraction::new(
            BigInt::from(self.a) + self.b,
            BigInt::from(self.c) + self.d,
        )
    }

    /// Whether `value` (this transform applied to the constant) is within
    /// `10^-eps_digits` of the transform at `x = 1`, which means the value
    /// does not really depend on the constant.
    #[must_use]
    pub fn is_constant_independent(&self, value: &Fraction, eps_digits: u32) -> bool {
        self.at_one()
            .is_some_and(|at_one| value.almost_eq(&at_one, eps_digits))
    }
}

impl fmt::Display for MobiusTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}·x {} {})/({}·x {} {})",
            self.a,
            if self.b < 0 { '-' } else { '+' },
            self.b.unsigned_abs(),
            self.c,
            if self.d < 0 { '-' } else { '+' },
            self.d.unsigned_abs()
        )
    }
}
