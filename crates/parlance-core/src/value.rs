//! Parse result payloads and the semantic errors their operations raise.
//!
//! A [`ParseValue`] is what a successful match produces and what rule
//! transformers operate on. `Clone` is a deep copy; repeat and
//! concatenation enumerators rely on that to keep partial results
//! independent across backtracking branches.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::rational::Rational;

/// Errors raised by value operations inside result transformers.
///
/// These are recoverable at the match level: the engine converts them into
/// match failures so surrounding alternatives can still be tried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("divide by zero")]
    DivideByZero,
    #[error("infinity in power operation")]
    InfinitePower,
    #[error("NaN in power operation")]
    NanPower,
    #[error("`{0}` is not numeric")]
    NotNumeric(String),
    #[error("`{0}` is not an integer")]
    BadInt(String),
    #[error("`{0}` is not a list")]
    NotAList(String),
    #[error("index {index} out of bounds for list of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// A tagged parse result value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParseValue {
    Str(String),
    List(Vec<ParseValue>),
    Int(i64),
    Rational(Rational),
    Double(f64),
}

impl ParseValue {
    pub fn empty_str() -> ParseValue {
        ParseValue::Str(String::new())
    }

    pub fn wrap_in_list(self) -> ParseValue {
        ParseValue::List(vec![self])
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ParseValue::List(_))
    }

    /// The elements of a list value.
    pub fn as_list(&self) -> Result<&[ParseValue], ValueError> {
        match self {
            ParseValue::List(items) => Ok(items),
            other => Err(ValueError::NotAList(other.to_string())),
        }
    }

    /// Deep-flatten nested lists into a single list of non-list leaves,
    /// in order. A non-list value flattens to a one-element list.
    pub fn flatten(&self) -> ParseValue {
        let mut leaves = Vec::new();
        collect_leaves(self, &mut leaves);
        ParseValue::List(leaves)
    }

    /// Parse the display form of this value as an integer.
    pub fn to_int(&self) -> Result<ParseValue, ValueError> {
        let text = self.to_string();
        text.parse::<i64>()
            .map(ParseValue::Int)
            .map_err(|_| ValueError::BadInt(text))
    }

    fn numeric(&self) -> Result<Numeric, ValueError> {
        match self {
            ParseValue::Int(i) => Ok(Numeric::Int(*i)),
            ParseValue::Rational(r) => Ok(Numeric::Rational(*r)),
            ParseValue::Double(d) => Ok(Numeric::Double(*d)),
            other => Err(ValueError::NotNumeric(other.to_string())),
        }
    }

    pub fn add(&self, other: &ParseValue) -> Result<ParseValue, ValueError> {
        self.numeric()?.add(other.numeric()?)
    }

    pub fn sub(&self, other: &ParseValue) -> Result<ParseValue, ValueError> {
        let negated = other.neg()?;
        self.add(&negated)
    }

    pub fn mul(&self, other: &ParseValue) -> Result<ParseValue, ValueError> {
        self.numeric()?.mul(other.numeric()?)
    }

    pub fn div(&self, other: &ParseValue) -> Result<ParseValue, ValueError> {
        self.numeric()?.div(other.numeric()?)
    }

    pub fn neg(&self) -> Result<ParseValue, ValueError> {
        self.numeric()?.neg()
    }

    /// Exponentiation. Integer and rational bases with integer exponents
    /// stay exact; everything else goes through `f64::powf`. Results that
    /// land on infinity or NaN are semantic errors, not values.
    pub fn pow(&self, other: &ParseValue) -> Result<ParseValue, ValueError> {
        self.numeric()?.pow(other.numeric()?)
    }
}

impl fmt::Display for ParseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseValue::Str(s) => write!(f, "{s}"),
            ParseValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ParseValue::Int(i) => write!(f, "{i}"),
            ParseValue::Rational(r) => write!(f, "{r}"),
            ParseValue::Double(d) => write!(f, "{d}"),
        }
    }
}

fn collect_leaves(value: &ParseValue, out: &mut Vec<ParseValue>) {
    match value {
        ParseValue::List(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        leaf => out.push(leaf.clone()),
    }
}

/// Numeric view with int → rational → double promotion.
#[derive(Clone, Copy)]
enum Numeric {
    Int(i64),
    Rational(Rational),
    Double(f64),
}

impl Numeric {
    fn to_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Rational(r) => r.to_f64(),
            Numeric::Double(d) => d,
        }
    }

    fn parts(self) -> (i64, i64) {
        match self {
            Numeric::Int(i) => (i, 1),
            Numeric::Rational(r) => (r.numerator(), r.denominator()),
            Numeric::Double(_) => unreachable!("doubles have no exact parts"),
        }
    }

    fn is_double(self) -> bool {
        matches!(self, Numeric::Double(_))
    }

    fn is_rational(self) -> bool {
        matches!(self, Numeric::Rational(_))
    }

    fn add(self, other: Numeric) -> Result<ParseValue, ValueError> {
        if self.is_double() || other.is_double() {
            return Ok(ParseValue::Double(self.to_f64() + other.to_f64()));
        }
        if self.is_rational() || other.is_rational() {
            let (an, ad) = self.parts();
            let (bn, bd) = other.parts();
            let rational = Rational::new(an * bd + bn * ad, ad * bd)?;
            return Ok(ParseValue::Rational(rational));
        }
        let (a, _) = self.parts();
        let (b, _) = other.parts();
        Ok(ParseValue::Int(a + b))
    }

    fn mul(self, other: Numeric) -> Result<ParseValue, ValueError> {
        if self.is_double() || other.is_double() {
            return Ok(ParseValue::Double(self.to_f64() * other.to_f64()));
        }
        if self.is_rational() || other.is_rational() {
            let (an, ad) = self.parts();
            let (bn, bd) = other.parts();
            let rational = Rational::new(an * bn, ad * bd)?;
            return Ok(ParseValue::Rational(rational));
        }
        let (a, _) = self.parts();
        let (b, _) = other.parts();
        Ok(ParseValue::Int(a * b))
    }

    fn neg(self) -> Result<ParseValue, ValueError> {
        self.mul(Numeric::Int(-1))
    }

    fn div(self, other: Numeric) -> Result<ParseValue, ValueError> {
        if self.is_double() || other.is_double() {
            if other.to_f64() == 0.0 {
                return Err(ValueError::DivideByZero);
            }
            return Ok(ParseValue::Double(self.to_f64() / other.to_f64()));
        }
        // Integer division produces a rational; Rational::new reports the
        // divide-by-zero.
        let (an, ad) = self.parts();
        let (bn, bd) = other.parts();
        Ok(ParseValue::Rational(Rational::new(an * bd, ad * bn)?))
    }

    fn pow(self, other: Numeric) -> Result<ParseValue, ValueError> {
        let integral_exponent = match other {
            Numeric::Int(i) => Some(i),
            Numeric::Rational(r) if r.is_integer() => Some(r.numerator()),
            _ => None,
        };
        if let (false, Some(exp)) = (self.is_double(), integral_exponent) {
            let (num, den) = self.parts();
            let (new_num, new_den) = if exp < 0 {
                let p = (-exp) as i32;
                ((den as f64).powi(p), (num as f64).powi(p))
            } else {
                let p = exp as i32;
                ((num as f64).powi(p), (den as f64).powi(p))
            };
            sanity_check(new_num)?;
            sanity_check(new_den)?;
            if new_den as i64 == 1 {
                return Ok(ParseValue::Int(new_num as i64));
            }
            return Ok(ParseValue::Rational(Rational::new(
                new_num as i64,
                new_den as i64,
            )?));
        }
        let result = self.to_f64().powf(other.to_f64());
        sanity_check(result)?;
        Ok(ParseValue::Double(result))
    }
}

fn sanity_check(result: f64) -> Result<(), ValueError> {
    if result.is_infinite() {
        Err(ValueError::InfinitePower)
    } else if result.is_nan() {
        Err(ValueError::NanPower)
    } else {
        Ok(())
    }
}
