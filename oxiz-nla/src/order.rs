//! Order lemmas: zero, sign and bounded-factor monotonicity facts.
//!
//! For each violated monomial `m = x1 * ... * xk` the candidates are tried in
//! a fixed order and the first one that excludes the current model is emitted:
//!
//! 1. zero: some factor `x` is 0, so `x != 0 or m = 0`;
//! 2. sign: the value of `m` has the wrong sign for the signs of its factors;
//! 3. monotonicity: for `m = x * r` with a finite bound `b` on `x` and a known
//!    sign of `r`, e.g. `x <= b and r > 0` implies `m <= b * r`.

use crate::context::{RoundContext, binary_splits};
use crate::detector::Violation;
use crate::lemma::{ArithLit, CmpOp, HeuristicId, Lemma, Premise};
use crate::monomial::MonomialDef;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use oxiz_core::{ResourceManager, Result};
use oxiz_math::{Polynomial, Var};
use std::cmp::Ordering;
use tracing::trace;

/// Statistics of the order heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    /// Invocations.
    pub invocations: u64,
    /// Zero lemmas emitted.
    pub zero_lemmas: u64,
    /// Sign lemmas emitted.
    pub sign_lemmas: u64,
    /// Monotonicity lemmas emitted.
    pub monotonicity_lemmas: u64,
}

/// The order heuristic.
#[derive(Debug, Default)]
pub struct OrderLemmas {
    stats: OrderStats,
}

impl OrderLemmas {
    /// Create the heuristic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics so far.
    pub fn stats(&self) -> &OrderStats {
        &self.stats
    }

    /// At most one lemma per violated monomial.
    pub fn run(&mut self, ctx: &RoundContext<'_>, rm: &mut ResourceManager) -> Result<Vec<Lemma>> {
        self.stats.invocations += 1;
        let mut out = Vec::new();
        for violation in ctx.violations {
            rm.checkpoint()?;
            if let Some(lemma) = self.lemma_for(ctx, violation)? {
                trace!(lemma = %lemma, "order lemma");
                out.push(lemma);
            }
        }
        Ok(out)
    }

    fn lemma_for(&mut self, ctx: &RoundContext<'_>, violation: &Violation) -> Result<Option<Lemma>> {
        let def = ctx.definition(violation)?;
        let premise = [Premise::Definition(def.var)];

        if let Some(lemma) = zero_lemma(ctx, def)? {
            if let Some(lemma) = ctx.excluding(lemma.with_premises(premise))? {
                self.stats.zero_lemmas += 1;
                return Ok(Some(lemma));
            }
            // A zero factor leaves no sign or slope to reason about.
            return Ok(None);
        }

        if let Some(lemma) = sign_lemma(ctx, def, &violation.value)?
            && let Some(lemma) = ctx.excluding(lemma.with_premises(premise))?
        {
            self.stats.sign_lemmas += 1;
            return Ok(Some(lemma));
        }

        for (x, r) in binary_splits(ctx.table, def) {
            let r_sign = ctx.value(r)?.cmp(&BigRational::zero());
            if r_sign == Ordering::Equal {
                continue;
            }
            let bounds = ctx.bounds();
            let candidates = [
                bounds.lower(x).map(|b| (b.clone(), false)),
                bounds.upper(x).map(|b| (b.clone(), true)),
            ];
            for (beta, is_upper) in candidates.into_iter().flatten() {
                let lemma = monotonicity(def.var, x, r, &beta, is_upper, r_sign == Ordering::Greater);
                if let Some(lemma) = ctx.excluding(lemma.with_premises(premise))? {
                    self.stats.monotonicity_lemmas += 1;
                    return Ok(Some(lemma));
                }
            }
        }
        Ok(None)
    }
}

/// `x != 0 or m = 0` for the first factor `x` with value 0.
fn zero_lemma(ctx: &RoundContext<'_>, def: &MonomialDef) -> Result<Option<Lemma>> {
    for x in def.factor_vars() {
        if ctx.value(x)?.is_zero() {
            return Ok(Some(Lemma::new(
                HeuristicId::Order,
                [
                    ArithLit::var(x, CmpOp::Ne, BigRational::zero()),
                    ArithLit::var(def.var, CmpOp::Eq, BigRational::zero()),
                ],
            )));
        }
    }
    Ok(None)
}

/// Factor signs force the sign of `m`; emitted when `m`'s value disagrees.
fn sign_lemma(ctx: &RoundContext<'_>, def: &MonomialDef, m_value: &BigRational) -> Result<Option<Lemma>> {
    let zero = BigRational::zero();
    let mut negative = false;
    let mut literals = Vec::new();
    for vp in def.factors.vars() {
        let v = ctx.value(vp.var)?;
        if vp.power.is_multiple_of(2) {
            literals.push(ArithLit::var(vp.var, CmpOp::Eq, zero.clone()));
        } else if v.is_positive() {
            literals.push(ArithLit::var(vp.var, CmpOp::Le, zero.clone()));
        } else {
            negative = !negative;
            literals.push(ArithLit::var(vp.var, CmpOp::Ge, zero.clone()));
        }
    }
    let agrees = if negative {
        m_value.is_negative()
    } else {
        m_value.is_positive()
    };
    if agrees {
        return Ok(None);
    }
    let op = if negative { CmpOp::Lt } else { CmpOp::Gt };
    literals.push(ArithLit::var(def.var, op, zero));
    Ok(Some(Lemma::new(HeuristicId::Order, literals)))
}

/// `x` against bound `beta`, `r` with a strict sign, conclude `m` against `beta * r`.
fn monotonicity(m: Var, x: Var, r: Var, beta: &BigRational, is_upper: bool, r_positive: bool) -> Lemma {
    let x_premise = if is_upper {
        ArithLit::var(x, CmpOp::Gt, beta.clone())
    } else {
        ArithLit::var(x, CmpOp::Lt, beta.clone())
    };
    let r_premise = if r_positive {
        ArithLit::var(r, CmpOp::Le, BigRational::zero())
    } else {
        ArithLit::var(r, CmpOp::Ge, BigRational::zero())
    };
    let op = if is_upper == r_positive { CmpOp::Le } else { CmpOp::Ge };
    let diff = Polynomial::from_var(m).sub(&Polynomial::from_var(r).scale(beta));
    let conclusion = ArithLit::new(diff, op, BigRational::zero());
    Lemma::new(HeuristicId::Order, [x_premise, r_premise, conclusion])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::violated_monomials;
    use crate::model::{Assignment, LinearModel, VarBounds};
    use crate::monomial::MonomialTable;
    use oxiz_core::ResourceLimits;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    /// `m - beta * r`
    fn slope(m: Var, r: Var, beta: i64) -> Polynomial {
        Polynomial::linear(&[(rat(1), m), (rat(-beta), r)], rat(0))
    }

    fn run(table: &MonomialTable, model: &LinearModel) -> Vec<Lemma> {
        let violations = violated_monomials(table, &model.assignment).unwrap();
        let ctx = RoundContext {
            round_index: 0,
            table,
            rows: &[],
            model,
            violations: &violations,
        };
        let mut rm = ResourceManager::new(ResourceLimits::unlimited());
        OrderLemmas::new().run(&ctx, &mut rm).unwrap()
    }

    #[test]
    fn test_zero_lemma() {
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let mut a = Assignment::new();
        a.set_int(0, 0).set_int(1, 4).set_int(2, 3);
        let lemmas = run(&table, &LinearModel::new(a));
        assert_eq!(lemmas.len(), 1);
        let want = Lemma::new(
            HeuristicId::Order,
            [ArithLit::var(0, CmpOp::Ne, rat(0)), ArithLit::var(2, CmpOp::Eq, rat(0))],
        );
        assert_eq!(lemmas[0].literals(), want.literals());
        assert!(lemmas[0].premises().contains(&Premise::Definition(2)));
    }

    #[test]
    fn test_sign_lemma() {
        // x0 = -1, x1 = 2, m = x0*x1 assigned 3 instead of something negative
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let mut a = Assignment::new();
        a.set_int(0, -1).set_int(1, 2).set_int(2, 3);
        let lemmas = run(&table, &LinearModel::new(a));
        let want = Lemma::new(
            HeuristicId::Order,
            [
                ArithLit::var(0, CmpOp::Ge, rat(0)),
                ArithLit::var(1, CmpOp::Le, rat(0)),
                ArithLit::var(2, CmpOp::Lt, rat(0)),
            ],
        );
        assert_eq!(lemmas[0].literals(), want.literals());
    }

    #[test]
    fn test_monotonicity_with_fixed_factor() {
        // x fixed to 2, y = 2, m = 6: x <= 2 and y > 0 imply m <= 2*y
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let mut a = Assignment::new();
        a.set_int(0, 2).set_int(1, 2).set_int(2, 6);
        let mut b = VarBounds::new();
        b.fix(0, rat(2));
        let lemmas = run(&table, &LinearModel::new(a).with_bounds(b));
        let want = Lemma::new(
            HeuristicId::Order,
            [
                ArithLit::var(0, CmpOp::Gt, rat(2)),
                ArithLit::var(1, CmpOp::Le, rat(0)),
                ArithLit::new(slope(2, 1, 2), CmpOp::Le, rat(0)),
            ],
        );
        assert_eq!(lemmas[0].literals(), want.literals());
    }

    #[test]
    fn test_no_bounds_no_monotonicity() {
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let mut a = Assignment::new();
        a.set_int(0, 2).set_int(1, 2).set_int(2, 6);
        assert!(run(&table, &LinearModel::new(a)).is_empty());
    }
}
