//! Reduced rational numbers for exact arithmetic in result transformers.

use std::fmt;

use serde::Serialize;

use crate::value::ValueError;

/// A rational in lowest terms. The denominator is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    /// Construct and reduce. A zero denominator is a divide-by-zero error.
    pub fn new(numerator: i64, denominator: i64) -> Result<Rational, ValueError> {
        if denominator == 0 {
            return Err(ValueError::DivideByZero);
        }
        let g = gcd(numerator.unsigned_abs(), denominator.unsigned_abs()) as i64;
        let sign = if denominator < 0 { -1 } else { 1 };
        Ok(Rational {
            numerator: sign * numerator / g,
            denominator: sign * denominator / g,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a.max(1) } else { gcd(b, a % b) }
}
