//! Horner (nested) forms of multivariate polynomials.
//!
//! A polynomial is rewritten by repeatedly factoring out the variable that
//! occurs in the most terms, e.g. `x^2*y + x*z + 3` becomes
//! `x*(x*y + z) + 3`. Evaluating the nested form with interval arithmetic
//! gives tighter enclosures than evaluating the expanded sum, since each
//! shared factor is only counted once.

use crate::interval::Interval;
use crate::polynomial::{Monomial, Polynomial, Term, Var};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;

/// A polynomial in nested form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HornerForm {
    /// A single term `c * m`.
    Leaf(Term),
    /// Sum of sub-forms; the empty sum is zero.
    Sum(Vec<HornerForm>),
    /// `var^power * inner`.
    Factored {
        /// Factored-out variable.
        var: Var,
        /// Its power.
        power: u32,
        /// The cofactor.
        inner: Box<HornerForm>,
    },
}

impl HornerForm {
    /// Build the nested form of `poly`.
    pub fn build(poly: &Polynomial) -> Self {
        Self::from_terms(poly.terms().to_vec())
    }

    fn from_terms(terms: Vec<Term>) -> Self {
        match terms.len() {
            0 => return HornerForm::Sum(Vec::new()),
            1 => return HornerForm::Leaf(terms[0].clone()),
            _ => {}
        }

        let Some(var) = most_frequent_var(&terms) else {
            return HornerForm::Sum(terms.into_iter().map(HornerForm::Leaf).collect());
        };

        let (with, rest): (Vec<Term>, Vec<Term>) =
            terms.into_iter().partition(|t| t.monomial.degree(var) > 0);
        let power = with
            .iter()
            .map(|t| t.monomial.degree(var))
            .min()
            .unwrap_or(1);
        let divisor = Monomial::from_var_power(var, power);
        let quotient: Vec<Term> = with
            .into_iter()
            .map(|t| {
                let m = t.monomial.div(&divisor).unwrap_or_else(Monomial::unit);
                Term::new(t.coeff, m)
            })
            .collect();
        let inner = Polynomial::from_terms(quotient);

        let factored = HornerForm::Factored {
            var,
            power,
            inner: Box::new(Self::build(&inner)),
        };
        if rest.is_empty() {
            factored
        } else {
            let mut parts = vec![factored];
            match Self::from_terms(rest) {
                HornerForm::Sum(more) => parts.extend(more),
                other => parts.push(other),
            }
            HornerForm::Sum(parts)
        }
    }

    /// Evaluate the form over intervals; `bounds` gives each variable's range.
    pub fn eval(&self, bounds: &impl Fn(Var) -> Interval) -> Interval {
        match self {
            HornerForm::Leaf(term) => {
                let mut acc = Interval::point(term.coeff.clone());
                for vp in term.monomial.vars() {
                    acc = acc.mul(&bounds(vp.var).pow(vp.power));
                }
                acc
            }
            HornerForm::Sum(parts) => parts
                .iter()
                .fold(Interval::point(num_traits::zero()), |acc, p| {
                    acc.add(&p.eval(bounds))
                }),
            HornerForm::Factored { var, power, inner } => {
                bounds(*var).pow(*power).mul(&inner.eval(bounds))
            }
        }
    }

    /// Variables occurring in the form.
    pub fn vars(&self) -> BTreeSet<Var> {
        let mut out = BTreeSet::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut BTreeSet<Var>) {
        match self {
            HornerForm::Leaf(term) => out.extend(term.monomial.vars().iter().map(|vp| vp.var)),
            HornerForm::Sum(parts) => parts.iter().for_each(|p| p.collect_vars(out)),
            HornerForm::Factored { var, inner, .. } => {
                out.insert(*var);
                inner.collect_vars(out);
            }
        }
    }
}

/// Variable occurring in the most terms, if it occurs in at least two.
/// Ties go to the smallest variable.
fn most_frequent_var(terms: &[Term]) -> Option<Var> {
    let mut counts: FxHashMap<Var, usize> = FxHashMap::default();
    for t in terms {
        for vp in t.monomial.vars() {
            *counts.entry(vp.var).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .filter(|&(_, c)| c >= 2)
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(v, _)| v)
}

impl fmt::Display for HornerForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HornerForm::Leaf(t) => write!(f, "{:?}", t),
            HornerForm::Sum(parts) if parts.is_empty() => write!(f, "0"),
            HornerForm::Sum(parts) => {
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
            HornerForm::Factored { var, power, inner } => {
                if *power == 1 {
                    write!(f, "x{}*({})", var, inner)
                } else {
                    write!(f, "x{}^{}*({})", var, power, inner)
                }
            }
        }
    }
}
