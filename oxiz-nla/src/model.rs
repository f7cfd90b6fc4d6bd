//! Per-round input: the linear relaxation's model and variable bounds.

use num_rational::BigRational;
use num_traits::Zero;
use oxiz_core::{OxizError, Result};
use oxiz_math::{Interval, Var};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Rational values of variables, including monomial abstraction variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: FxHashMap<Var, BigRational>,
}

impl Assignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of `var`.
    pub fn set(&mut self, var: Var, value: BigRational) -> &mut Self {
        self.values.insert(var, value);
        self
    }

    /// Set the value of `var` to an integer.
    pub fn set_int(&mut self, var: Var, value: i64) -> &mut Self {
        self.set(var, BigRational::from_integer(value.into()))
    }

    /// Value of `var`, if any.
    pub fn get(&self, var: Var) -> Option<&BigRational> {
        self.values.get(&var)
    }

    /// Value of `var`; a missing value is a malformed model.
    pub fn value(&self, var: Var) -> Result<BigRational> {
        self.get(var).cloned().ok_or(OxizError::MissingValue { var })
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable is assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in variable order.
    pub fn to_sorted(&self) -> BTreeMap<Var, BigRational> {
        self.values.iter().map(|(v, x)| (*v, x.clone())).collect()
    }
}

impl FromIterator<(Var, BigRational)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (Var, BigRational)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Closed bounds of one variable; `None` is infinite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bounds {
    /// Lower bound.
    pub lower: Option<BigRational>,
    /// Upper bound.
    pub upper: Option<BigRational>,
}

impl Bounds {
    /// The value both bounds agree on, if the variable is fixed.
    pub fn fixed_value(&self) -> Option<&BigRational> {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) if l == u => Some(l),
            _ => None,
        }
    }

    /// The bounds as an interval.
    pub fn interval(&self) -> Interval {
        Interval::new(self.lower.clone(), self.upper.clone())
    }
}

/// Bounds of every variable the outer core knows bounds for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarBounds {
    bounds: FxHashMap<Var, Bounds>,
}

impl VarBounds {
    /// No bounds at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower bound of `var`.
    pub fn set_lower(&mut self, var: Var, value: BigRational) -> &mut Self {
        self.bounds.entry(var).or_default().lower = Some(value);
        self
    }

    /// Set the upper bound of `var`.
    pub fn set_upper(&mut self, var: Var, value: BigRational) -> &mut Self {
        self.bounds.entry(var).or_default().upper = Some(value);
        self
    }

    /// Fix `var` to `value`.
    pub fn fix(&mut self, var: Var, value: BigRational) -> &mut Self {
        self.set_lower(var, value.clone()).set_upper(var, value)
    }

    /// Bounds of `var`; unbounded if none were set.
    pub fn get(&self, var: Var) -> Bounds {
        self.bounds.get(&var).cloned().unwrap_or_default()
    }

    /// Lower bound of `var`.
    pub fn lower(&self, var: Var) -> Option<&BigRational> {
        self.bounds.get(&var).and_then(|b| b.lower.as_ref())
    }

    /// Upper bound of `var`.
    pub fn upper(&self, var: Var) -> Option<&BigRational> {
        self.bounds.get(&var).and_then(|b| b.upper.as_ref())
    }

    /// Fixed value of `var`.
    pub fn fixed_value(&self, var: Var) -> Option<&BigRational> {
        self.bounds.get(&var).and_then(Bounds::fixed_value)
    }

    /// Whether `var` is fixed to zero.
    pub fn is_fixed_zero(&self, var: Var) -> bool {
        self.fixed_value(var).is_some_and(Zero::is_zero)
    }

    /// Interval of `var`.
    pub fn interval(&self, var: Var) -> Interval {
        self.bounds
            .get(&var)
            .map(Bounds::interval)
            .unwrap_or_else(Interval::unbounded)
    }

    /// Bounds in variable order.
    pub fn to_sorted(&self) -> BTreeMap<Var, Bounds> {
        self.bounds.iter().map(|(v, b)| (*v, b.clone())).collect()
    }
}

/// Model of the linear relaxation for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearModel {
    /// Current values.
    pub assignment: Assignment,
    /// Current bounds.
    pub bounds: VarBounds,
}

impl LinearModel {
    /// Model with the given values and no bounds.
    pub fn new(assignment: Assignment) -> Self {
        Self {
            assignment,
            bounds: VarBounds::new(),
        }
    }

    /// Attach bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: VarBounds) -> Self {
        self.bounds = bounds;
        self
    }
}
