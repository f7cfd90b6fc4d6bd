//! Tangent and secant planes separating the model from the product surface.
//!
//! For `m = x * r` with model point `(a, b)` every pair of corner bounds
//! `(p, q)` gives a McCormick plane: `(x - p) * (r - q)` has a known sign
//! inside the corresponding quadrant, so `m` is bounded by the linear
//! function `q*x + p*r - p*q`. The model point itself is always a valid
//! corner, which makes the last candidate exclude the model whenever the
//! factor values are consistent.

use crate::context::{RoundContext, binary_splits};
use crate::detector::Violation;
use crate::lemma::{ArithLit, CmpOp, HeuristicId, Lemma, Premise};
use num_rational::BigRational;
use oxiz_core::{ResourceManager, Result};
use oxiz_math::{Polynomial, Var};
use std::cmp::Ordering;
use tracing::trace;

/// Statistics of the tangent heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TangentStats {
    /// Invocations.
    pub invocations: u64,
    /// Planes through a corner of the factor bounds.
    pub corner_planes: u64,
    /// Planes through the model point.
    pub point_planes: u64,
    /// Square tangents and secants.
    pub square_cuts: u64,
}

/// The tangent heuristic.
#[derive(Debug, Default)]
pub struct TangentLemmas {
    stats: TangentStats,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    /// `x >= p`, negated as `x < p`.
    AtLeast,
    /// `x <= p`, negated as `x > p`.
    AtMost,
}

impl Side {
    fn negated(self, var: Var, value: &BigRational) -> ArithLit {
        match self {
            Side::AtLeast => ArithLit::var(var, CmpOp::Lt, value.clone()),
            Side::AtMost => ArithLit::var(var, CmpOp::Gt, value.clone()),
        }
    }
}

impl TangentLemmas {
    /// Create the heuristic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics so far.
    pub fn stats(&self) -> &TangentStats {
        &self.stats
    }

    /// At most one lemma per violated monomial.
    pub fn run(&mut self, ctx: &RoundContext<'_>, rm: &mut ResourceManager) -> Result<Vec<Lemma>> {
        self.stats.invocations += 1;
        let mut out = Vec::new();
        for violation in ctx.violations {
            rm.checkpoint()?;
            if let Some(lemma) = self.lemma_for(ctx, violation)? {
                trace!(lemma = %lemma, "tangent lemma");
                out.push(lemma);
            }
        }
        Ok(out)
    }

    fn lemma_for(&mut self, ctx: &RoundContext<'_>, violation: &Violation) -> Result<Option<Lemma>> {
        let def = ctx.definition(violation)?;
        let m = def.var;
        let premise = [Premise::Definition(m)];
        for (x, r) in binary_splits(ctx.table, def) {
            let a = ctx.value(x)?;
            let lemma = if x == r {
                self.square(ctx, m, x, &a, &violation.value)?
            } else {
                let b = ctx.value(r)?;
                self.product(ctx, m, x, r, &a, &b, &violation.value)?
            };
            if let Some(lemma) = lemma {
                return Ok(Some(lemma.with_premises(premise)));
            }
        }
        Ok(None)
    }

    #[allow(clippy::too_many_arguments)]
    fn product(
        &mut self,
        ctx: &RoundContext<'_>,
        m: Var,
        x: Var,
        r: Var,
        a: &BigRational,
        b: &BigRational,
        m_value: &BigRational,
    ) -> Result<Option<Lemma>> {
        let bounds = ctx.bounds();
        let (xl, xu) = (bounds.lower(x), bounds.upper(x));
        let (rl, ru) = (bounds.lower(r), bounds.upper(r));
        use Side::{AtLeast, AtMost};

        // Under-estimators when m sits below the surface, over-estimators above.
        let (op, corners, point) = match m_value.cmp(&(a * b)) {
            Ordering::Less => (
                CmpOp::Ge,
                [(xl, AtLeast, rl, AtLeast), (xu, AtMost, ru, AtMost)],
                (AtLeast, AtLeast),
            ),
            Ordering::Greater => (
                CmpOp::Le,
                [(xl, AtLeast, ru, AtMost), (xu, AtMost, rl, AtLeast)],
                (AtLeast, AtMost),
            ),
            Ordering::Equal => return Ok(None),
        };

        for (p, x_side, q, r_side) in corners {
            let (Some(p), Some(q)) = (p, q) else {
                continue;
            };
            let lemma = plane(m, x, r, p, x_side, q, r_side, op);
            if let Some(lemma) = ctx.excluding(lemma)? {
                self.stats.corner_planes += 1;
                return Ok(Some(lemma));
            }
        }

        let lemma = plane(m, x, r, a, point.0, b, point.1, op);
        if let Some(lemma) = ctx.excluding(lemma)? {
            self.stats.point_planes += 1;
            return Ok(Some(lemma));
        }
        Ok(None)
    }

    /// `m = x^2`: tangent `m >= 2a*x - a^2` below the parabola, secant above.
    fn square(
        &mut self,
        ctx: &RoundContext<'_>,
        m: Var,
        x: Var,
        a: &BigRational,
        m_value: &BigRational,
    ) -> Result<Option<Lemma>> {
        let a_sq = a * a;
        let lemma = match m_value.cmp(&a_sq) {
            Ordering::Less => {
                let two_a = a + a;
                let lit = ArithLit::new(line(m, x, &two_a), CmpOp::Ge, -a_sq);
                ctx.excluding(Lemma::new(HeuristicId::Tangent, [lit]))?
            }
            Ordering::Greater => {
                let bounds = ctx.bounds();
                let mut found = None;
                if let (Some(l), Some(u)) = (bounds.lower(x), bounds.upper(x)) {
                    found = ctx.excluding(secant(m, x, l, u))?;
                }
                match found {
                    Some(lemma) => Some(lemma),
                    None => ctx.excluding(secant(m, x, a, a))?,
                }
            }
            Ordering::Equal => None,
        };
        if lemma.is_some() {
            self.stats.square_cuts += 1;
        }
        Ok(lemma)
    }
}

/// `m - slope * x`
fn line(m: Var, x: Var, slope: &BigRational) -> Polynomial {
    Polynomial::from_var(m).sub(&Polynomial::from_var(x).scale(slope))
}

/// Premises `x` on `x_side` of `p` and `r` on `r_side` of `q`; conclusion
/// `m - q*x - p*r op -p*q`.
#[allow(clippy::too_many_arguments)]
fn plane(
    m: Var,
    x: Var,
    r: Var,
    p: &BigRational,
    x_side: Side,
    q: &BigRational,
    r_side: Side,
    op: CmpOp,
) -> Lemma {
    let lhs = Polynomial::from_var(m)
        .sub(&Polynomial::from_var(x).scale(q))
        .sub(&Polynomial::from_var(r).scale(p));
    Lemma::new(
        HeuristicId::Tangent,
        [
            x_side.negated(x, p),
            r_side.negated(r, q),
            ArithLit::new(lhs, op, -(p * q)),
        ],
    )
}

/// `x` in `[l, u]` implies `x^2 <= (l + u)*x - l*u`.
fn secant(m: Var, x: Var, l: &BigRational, u: &BigRational) -> Lemma {
    Lemma::new(
        HeuristicId::Tangent,
        [
            ArithLit::var(x, CmpOp::Lt, l.clone()),
            ArithLit::var(x, CmpOp::Gt, u.clone()),
            ArithLit::new(line(m, x, &(l + u)), CmpOp::Le, -(l * u)),
        ],
    )
}
