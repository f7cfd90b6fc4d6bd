//! Monomial definitions `m = x1 * ... * xk` and the table holding them.

use crate::model::Assignment;
use num_rational::BigRational;
use oxiz_core::{OxizError, Result};
use oxiz_math::{Monomial, Polynomial, Term, Var};
use rustc_hash::FxHashMap;
use std::fmt;

/// Definition of a linear abstraction variable as a product of factors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonomialDef {
    /// Abstraction variable standing for the product.
    pub var: Var,
    /// The product.
    pub factors: Monomial,
}

impl MonomialDef {
    /// `var = factors[0] * factors[1] * ...`; repeated factors become powers.
    pub fn new(var: Var, factors: &[Var]) -> Self {
        Self {
            var,
            factors: Monomial::from_factors(factors),
        }
    }

    /// Total degree of the product.
    pub fn degree(&self) -> u32 {
        self.factors.total_degree()
    }

    /// True value of the product under `assignment`.
    pub fn product(&self, assignment: &Assignment) -> Result<BigRational> {
        self.factors.eval_with(&mut |v| assignment.value(v))
    }

    /// Distinct factor variables, ascending.
    pub fn factor_vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.factors.vars().iter().map(|vp| vp.var)
    }
}

impl fmt::Display for MonomialDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{} = {}", self.var, self.factors)
    }
}

/// All monomial definitions of a session, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MonomialTable {
    defs: Vec<MonomialDef>,
    by_var: FxHashMap<Var, usize>,
    by_factors: FxHashMap<Monomial, Var>,
}

impl MonomialTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, validating every definition.
    pub fn from_defs(defs: impl IntoIterator<Item = MonomialDef>) -> Result<Self> {
        let mut table = Self::new();
        for def in defs {
            table.register(def)?;
        }
        Ok(table)
    }

    /// Register a definition.
    ///
    /// Rejected: degree below two, a second definition for the same variable,
    /// and nesting (a factor that is itself an abstraction variable, or a
    /// new abstraction variable already used as a factor).
    pub fn register(&mut self, def: MonomialDef) -> Result<()> {
        let reject = |message: String| Err(OxizError::config("nla", "monomial", message));
        if def.degree() < 2 {
            return reject(format!("{} has degree below 2", def));
        }
        if self.by_var.contains_key(&def.var) {
            return reject(format!("x{} is defined twice", def.var));
        }
        if let Some(v) = def.factor_vars().find(|v| *v == def.var || self.by_var.contains_key(v)) {
            return reject(format!("{} uses abstraction variable x{} as a factor", def, v));
        }
        if let Some(other) = self.defs.iter().find(|d| d.factors.degree(def.var) > 0) {
            return reject(format!("x{} is a factor of {}", def.var, other));
        }

        self.by_factors.entry(def.factors.clone()).or_insert(def.var);
        self.by_var.insert(def.var, self.defs.len());
        self.defs.push(def);
        Ok(())
    }

    /// Definition of abstraction variable `var`.
    pub fn get(&self, var: Var) -> Option<&MonomialDef> {
        self.by_var.get(&var).map(|&i| &self.defs[i])
    }

    /// Whether `var` is an abstraction variable.
    pub fn is_abstraction(&self, var: Var) -> bool {
        self.by_var.contains_key(&var)
    }

    /// Abstraction variable defined as exactly `factors`, if any.
    pub fn find(&self, factors: &Monomial) -> Option<Var> {
        self.by_factors.get(factors).copied()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &MonomialDef> {
        self.defs.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Replace every abstraction variable in `poly` by its product.
    pub fn expand(&self, poly: &Polynomial) -> Polynomial {
        let terms = poly.terms().iter().map(|t| {
            let mut m = Monomial::unit();
            for vp in t.monomial.vars() {
                let factor = match self.get(vp.var) {
                    Some(def) => def.factors.pow(vp.power),
                    None => Monomial::from_var_power(vp.var, vp.power),
                };
                m = m.mul(&factor);
            }
            Term::new(t.coeff.clone(), m)
        });
        Polynomial::from_terms(terms)
    }

    /// Value of `var` under the true product semantics: abstraction variables
    /// evaluate to the product of their factors.
    pub fn true_value(&self, var: Var, assignment: &Assignment) -> Result<BigRational> {
        match self.get(var) {
            Some(def) => def.product(assignment),
            None => assignment.value(var),
        }
    }
}
