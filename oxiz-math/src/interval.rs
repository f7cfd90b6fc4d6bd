//! Closed rational intervals with optional infinite endpoints.
//!
//! `None` stands for an infinite endpoint (`-inf` for `lower`, `+inf` for
//! `upper`). Products follow the convention `0 * inf = 0`, which keeps the
//! enclosure sound for the closed intervals used by the Horner and Gröbner
//! heuristics.

use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Interval for interval arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    /// Lower endpoint, `None` is `-inf`.
    pub lower: Option<BigRational>,
    /// Upper endpoint, `None` is `+inf`.
    pub upper: Option<BigRational>,
}

/// Extended rational used for endpoint products.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Ext {
    NegInf,
    Fin(BigRational),
    PosInf,
}

impl Ext {
    fn sign(&self) -> i8 {
        match self {
            Ext::NegInf => -1,
            Ext::PosInf => 1,
            Ext::Fin(q) if q.is_zero() => 0,
            Ext::Fin(q) if q.is_positive() => 1,
            Ext::Fin(_) => -1,
        }
    }

    fn mul(&self, other: &Ext) -> Ext {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => Ext::Fin(a * b),
            _ => match self.sign() * other.sign() {
                0 => Ext::Fin(BigRational::zero()),
                s if s > 0 => Ext::PosInf,
                _ => Ext::NegInf,
            },
        }
    }
}

impl PartialOrd for Ext {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ext {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => a.cmp(b),
            (Ext::NegInf, Ext::NegInf) | (Ext::PosInf, Ext::PosInf) => Ordering::Equal,
            (Ext::NegInf, _) | (_, Ext::PosInf) => Ordering::Less,
            (Ext::PosInf, _) | (_, Ext::NegInf) => Ordering::Greater,
        }
    }
}

impl Interval {
    /// Create an unbounded interval.
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Create a point interval.
    pub fn point(value: BigRational) -> Self {
        Self {
            lower: Some(value.clone()),
            upper: Some(value),
        }
    }

    /// Create an interval from optional endpoints.
    pub fn new(lower: Option<BigRational>, upper: Option<BigRational>) -> Self {
        Self { lower, upper }
    }

    /// Whether both endpoints are finite and equal.
    pub fn is_point(&self) -> bool {
        matches!((&self.lower, &self.upper), (Some(l), Some(u)) if l == u)
    }

    /// Whether the interval contains no value.
    pub fn is_empty(&self) -> bool {
        matches!((&self.lower, &self.upper), (Some(l), Some(u)) if l > u)
    }

    /// Whether `value` lies in the interval.
    pub fn contains(&self, value: &BigRational) -> bool {
        self.lower.as_ref().is_none_or(|l| l <= value)
            && self.upper.as_ref().is_none_or(|u| value <= u)
    }

    /// Whether zero lies in the interval.
    pub fn contains_zero(&self) -> bool {
        self.contains(&BigRational::zero())
    }

    /// Add two intervals.
    pub fn add(&self, other: &Interval) -> Self {
        Self {
            lower: match (&self.lower, &other.lower) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            },
            upper: match (&self.upper, &other.upper) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            },
        }
    }

    /// Subtract two intervals.
    pub fn sub(&self, other: &Interval) -> Self {
        self.add(&other.neg())
    }

    /// Negate an interval.
    pub fn neg(&self) -> Self {
        Self {
            lower: self.upper.as_ref().map(|u| -u),
            upper: self.lower.as_ref().map(|l| -l),
        }
    }

    /// Multiply by a scalar.
    pub fn scale(&self, c: &BigRational) -> Self {
        if c.is_zero() {
            return Self::point(BigRational::zero());
        }
        let lower = self.lower.as_ref().map(|l| l * c);
        let upper = self.upper.as_ref().map(|u| u * c);
        if c.is_negative() {
            Self { lower: upper, upper: lower }
        } else {
            Self { lower, upper }
        }
    }

    /// Multiply two intervals.
    pub fn mul(&self, other: &Interval) -> Self {
        let a = [self.lower_ext(), self.upper_ext()];
        let b = [other.lower_ext(), other.upper_ext()];
        let products = [
            a[0].mul(&b[0]),
            a[0].mul(&b[1]),
            a[1].mul(&b[0]),
            a[1].mul(&b[1]),
        ];
        let min = products.iter().min().cloned().unwrap_or(Ext::NegInf);
        let max = products.iter().max().cloned().unwrap_or(Ext::PosInf);
        Self {
            lower: match min {
                Ext::Fin(q) => Some(q),
                _ => None,
            },
            upper: match max {
                Ext::Fin(q) => Some(q),
                _ => None,
            },
        }
    }

    /// Raise to a positive power. Even powers of intervals spanning zero
    /// start at zero.
    pub fn pow(&self, n: u32) -> Self {
        if n == 0 {
            return Self::point(num_traits::one());
        }
        let mut acc = self.clone();
        for _ in 1..n {
            acc = acc.mul(self);
        }
        if n.is_multiple_of(2) && self.contains_zero() {
            acc.lower = Some(BigRational::zero());
        }
        acc
    }

    fn lower_ext(&self) -> Ext {
        self.lower.clone().map(Ext::Fin).unwrap_or(Ext::NegInf)
    }

    fn upper_ext(&self) -> Ext {
        self.upper.clone().map(Ext::Fin).unwrap_or(Ext::PosInf)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Some(l) => write!(f, "[{}", l)?,
            None => write!(f, "(-oo")?,
        }
        match &self.upper {
            Some(u) => write!(f, ", {}]", u),
            None => write!(f, ", +oo)"),
        }
    }
}
