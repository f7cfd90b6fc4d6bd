//! Gröbner Basis Computation
//!
//! Budgeted Buchberger saturation with dependency tracking. Every equation
//! carries the set of facts it was derived from, so a contradiction found
//! during saturation can be traced back to the input constraints.

pub mod buchberger;

pub use buchberger::{
    BudgetedBuchberger, CriticalPair, GrobnerConfig, GrobnerStats, Saturation, StopReason,
};

use crate::polynomial::Polynomial;
use std::collections::BTreeSet;
use std::fmt;

/// A polynomial equation `poly = 0` with the facts it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation<D: Ord> {
    /// Left-hand side; the equation states `poly = 0`.
    pub poly: Polynomial,
    /// Facts this equation was derived from.
    pub deps: BTreeSet<D>,
}

impl<D: Ord + Clone> Equation<D> {
    /// Create an equation.
    pub fn new(poly: Polynomial, deps: impl IntoIterator<Item = D>) -> Self {
        Self {
            poly,
            deps: deps.into_iter().collect(),
        }
    }

    /// Whether the equation reads `c = 0` for a non-zero constant `c`.
    pub fn is_constant_conflict(&self) -> bool {
        self.poly.is_constant()
    }

    /// Merge the dependencies of `other` into this equation.
    pub fn absorb_deps(&mut self, other: &Equation<D>) {
        self.deps.extend(other.deps.iter().cloned());
    }
}

impl<D: Ord> fmt::Display for Equation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = 0", self.poly)
    }
}
