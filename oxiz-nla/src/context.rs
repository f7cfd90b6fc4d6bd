//! Read-only view of one round shared by the heuristics.

use crate::detector::Violation;
use crate::lemma::{ArithLit, CmpOp, Lemma, Premise};
use crate::model::{LinearModel, VarBounds};
use crate::monomial::{MonomialDef, MonomialTable};
use crate::params::FixedSubstitution;
use crate::row::Row;
use num_rational::BigRational;
use num_traits::Zero;
use oxiz_core::{OxizError, Result};
use oxiz_math::{Monomial, Polynomial, Var};
use std::collections::BTreeSet;

/// Everything a heuristic may look at during a round.
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    /// Round number, starting at 0.
    pub round_index: u64,
    /// Monomial definitions.
    pub table: &'a MonomialTable,
    /// Rows sorted by id.
    pub rows: &'a [Row],
    /// Current model.
    pub model: &'a LinearModel,
    /// Violated monomials in detector order.
    pub violations: &'a [Violation],
}

impl<'a> RoundContext<'a> {
    /// Value of `var` in the linear model.
    pub fn value(&self, var: Var) -> Result<BigRational> {
        self.model.assignment.value(var)
    }

    /// Current bounds.
    pub fn bounds(&self) -> &'a VarBounds {
        &self.model.bounds
    }

    /// Definition of a violated monomial.
    pub fn definition(&self, violation: &Violation) -> Result<&'a MonomialDef> {
        self.table.get(violation.var).ok_or_else(|| {
            OxizError::internal(format!("violated x{} has no definition", violation.var))
        })
    }

    /// Keep `lemma` only if it excludes the current model.
    pub fn excluding(&self, lemma: Lemma) -> Result<Option<Lemma>> {
        Ok(lemma
            .is_false_under(&self.model.assignment)?
            .then_some(lemma))
    }

    /// Premises for a lemma derived from `rows`: the rows themselves and the
    /// definitions of the abstraction variables they mention.
    pub fn row_premises<'r>(&self, rows: impl IntoIterator<Item = &'r Row>) -> BTreeSet<Premise> {
        let mut out = BTreeSet::new();
        for row in rows {
            out.insert(Premise::Row(row.id()));
            out.extend(
                row.linear()
                    .vars()
                    .into_iter()
                    .filter(|v| self.table.is_abstraction(*v))
                    .map(Premise::Definition),
            );
        }
        out
    }
}

/// Binary splits `m = x * r` of a definition, where `r` is a single variable
/// or another registered monomial. Factors are tried in ascending order.
pub fn binary_splits(table: &MonomialTable, def: &MonomialDef) -> Vec<(Var, Var)> {
    let mut out = Vec::new();
    for x in def.factor_vars() {
        let Some(rest) = def.factors.div(&Monomial::from_var(x)) else {
            continue;
        };
        let r = if rest.total_degree() == 1 {
            rest.vars().first().map(|vp| vp.var)
        } else {
            table.find(&rest)
        };
        if let Some(r) = r {
            out.push((x, r));
        }
    }
    out
}

/// Replace fixed variables of `poly` by their values according to `mode`.
/// Returns the result and the substituted variables with their values.
pub fn substitute_fixed(
    poly: &Polynomial,
    bounds: &VarBounds,
    mode: FixedSubstitution,
) -> (Polynomial, Vec<(Var, BigRational)>) {
    let mut out = poly.clone();
    let mut used = Vec::new();
    for var in poly.vars() {
        let Some(value) = bounds.fixed_value(var) else {
            continue;
        };
        if mode.applies(value.is_zero()) {
            out = out.substitute_value(var, value);
            used.push((var, value.clone()));
        }
    }
    (out, used)
}

/// Literals negating the finite bounds of `var`: `var < lower`, `var > upper`.
pub fn bound_literals(bounds: &VarBounds, var: Var) -> Vec<ArithLit> {
    let b = bounds.get(var);
    let mut out = Vec::new();
    if let Some(l) = b.lower {
        out.push(ArithLit::var(var, CmpOp::Lt, l));
    }
    if let Some(u) = b.upper {
        out.push(ArithLit::var(var, CmpOp::Gt, u));
    }
    out
}

/// Literals negating `var = value`.
pub fn fixed_literals(var: Var, value: &BigRational) -> [ArithLit; 2] {
    [
        ArithLit::var(var, CmpOp::Lt, value.clone()),
        ArithLit::var(var, CmpOp::Gt, value.clone()),
    ]
}
