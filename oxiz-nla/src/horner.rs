//! Horner heuristic: interval evaluation of rows in nested form.
//!
//! A row touching a violated monomial is expanded into its true polynomial,
//! fixed variables are substituted, and the nested form is evaluated over
//! the current bounds. If the resulting interval cannot satisfy the row's
//! relation, the row and the bounds used are jointly infeasible.

use crate::context::{RoundContext, bound_literals, fixed_literals, substitute_fixed};
use crate::lemma::{HeuristicId, Lemma};
use crate::params::NlaParams;
use crate::row::{Relation, Row};
use num_traits::Signed;
use oxiz_core::{ResourceManager, Result};
use oxiz_math::{HornerForm, Interval, Polynomial};
use tracing::{debug, trace};

/// Statistics of the Horner heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HornerStats {
    /// Invocations.
    pub invocations: u64,
    /// Rows evaluated.
    pub rows_examined: u64,
    /// Rows skipped for exceeding the length limit.
    pub rows_skipped: u64,
    /// Rows found infeasible.
    pub conflicts: u64,
}

/// The Horner heuristic.
#[derive(Debug, Default)]
pub struct HornerLemmas {
    stats: HornerStats,
}

impl HornerLemmas {
    /// Create the heuristic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics so far.
    pub fn stats(&self) -> &HornerStats {
        &self.stats
    }

    /// At most one lemma per row.
    pub fn run(
        &mut self,
        ctx: &RoundContext<'_>,
        params: &NlaParams,
        rm: &mut ResourceManager,
    ) -> Result<Vec<Lemma>> {
        self.stats.invocations += 1;
        let limit = params.horner_row_length_limit as usize;
        let mut out = Vec::new();
        let rows = ctx
            .rows
            .iter()
            .filter(|row| ctx.violations.iter().any(|v| row.mentions(v.var)));
        for row in rows {
            rm.checkpoint()?;
            let expanded = row.expanded(ctx.table);
            let len = expanded.terms().iter().filter(|t| !t.is_constant()).count();
            if len > limit {
                self.stats.rows_skipped += 1;
                trace!(row = %row.id(), len, "horner skips long row");
                continue;
            }
            self.stats.rows_examined += 1;
            if let Some(lemma) = self.lemma_for(ctx, params, row, &expanded)? {
                debug!(row = %row.id(), lemma = %lemma, "horner conflict");
                out.push(lemma);
            }
        }
        Ok(out)
    }

    fn lemma_for(
        &mut self,
        ctx: &RoundContext<'_>,
        params: &NlaParams,
        row: &Row,
        expanded: &Polynomial,
    ) -> Result<Option<Lemma>> {
        let bounds = ctx.bounds();
        let (poly, fixed) = substitute_fixed(expanded, bounds, params.horner_subs_fixed);
        let form = HornerForm::build(&poly);
        let range = form.eval(&|v| bounds.interval(v));
        if !infeasible(row.relation(), &range) {
            return Ok(None);
        }
        self.stats.conflicts += 1;

        let mut literals = vec![row.literal().negate()];
        for (var, value) in &fixed {
            literals.extend(fixed_literals(*var, value));
        }
        for var in form.vars() {
            literals.extend(bound_literals(bounds, var));
        }
        let lemma = Lemma::new(HeuristicId::Horner, literals).with_premises(ctx.row_premises([row]));
        ctx.excluding(lemma)
    }
}

/// Whether no value in `range` satisfies `p relation 0`.
fn infeasible(relation: Relation, range: &Interval) -> bool {
    match relation {
        Relation::Eq => !range.contains_zero(),
        Relation::Le => range.lower.as_ref().is_some_and(|l| l.is_positive()),
        Relation::Ge => range.upper.as_ref().is_some_and(|u| u.is_negative()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::violated_monomials;
    use crate::lemma::{ArithLit, CmpOp};
    use crate::model::{Assignment, LinearModel, VarBounds};
    use crate::monomial::{MonomialDef, MonomialTable};
    use crate::params::FixedSubstitution;
    use crate::row::RowId;
    use num_rational::BigRational;
    use oxiz_core::ResourceLimits;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn run(table: &MonomialTable, rows: &[Row], model: &LinearModel, params: &NlaParams) -> (Vec<Lemma>, HornerStats) {
        let violations = violated_monomials(table, &model.assignment).unwrap();
        let ctx = RoundContext {
            round_index: 0,
            table,
            rows,
            model,
            violations: &violations,
        };
        let mut rm = ResourceManager::new(ResourceLimits::unlimited());
        let mut h = HornerLemmas::new();
        let lemmas = h.run(&ctx, params, &mut rm).unwrap();
        (lemmas, h.stats().clone())
    }

    /// m = x*y*z with z fixed to 0 and the row m - 5 = 0.
    fn fixed_zero_product() -> (MonomialTable, Vec<Row>, LinearModel) {
        let table = MonomialTable::from_defs([MonomialDef::new(3, &[0, 1, 2])]).unwrap();
        let row = Row::new(
            RowId(0),
            Polynomial::from_coeffs_int(&[(1, &[(3, 1)]), (-5, &[])]),
            Relation::Eq,
        )
        .unwrap();
        let mut a = Assignment::new();
        a.set_int(0, 1).set_int(1, 1).set_int(2, 0).set_int(3, 5);
        let mut b = VarBounds::new();
        b.fix(2, rat(0));
        (table, vec![row], LinearModel::new(a).with_bounds(b))
    }

    #[test]
    fn test_fixed_zero_collapses_product() {
        let (table, rows, model) = fixed_zero_product();
        let (lemmas, stats) = run(&table, &rows, &model, &NlaParams::default());
        assert_eq!(stats.conflicts, 1);
        let want = Lemma::new(
            HeuristicId::Horner,
            [
                ArithLit::var(3, CmpOp::Ne, rat(5)),
                ArithLit::var(2, CmpOp::Lt, rat(0)),
                ArithLit::var(2, CmpOp::Gt, rat(0)),
            ],
        );
        assert_eq!(lemmas.len(), 1);
        assert_eq!(lemmas[0].literals(), want.literals());
    }

    #[test]
    fn test_no_substitution_still_uses_bounds() {
        let (table, rows, model) = fixed_zero_product();
        let params = NlaParams::default().with_horner_subs_fixed(FixedSubstitution::None);
        let (lemmas, _) = run(&table, &rows, &model, &params);
        // [0, 0] * (-oo, oo) = [0, 0] under the closed-interval convention
        assert_eq!(lemmas.len(), 1);
        assert!(lemmas[0].is_false_under(&model.assignment).unwrap());
    }

    #[test]
    fn test_row_length_ignores_constant_term() {
        // m - 5 has one non-constant term once expanded
        let (table, rows, model) = fixed_zero_product();
        let params = NlaParams::default().with_horner_row_length_limit(1);
        let (lemmas, stats) = run(&table, &rows, &model, &params);
        assert_eq!(lemmas.len(), 1);
        assert_eq!((stats.rows_skipped, stats.rows_examined), (0, 1));
    }

    #[test]
    fn test_long_rows_skipped() {
        let (table, _, model) = fixed_zero_product();
        let rows = vec![
            Row::new(
                RowId(0),
                Polynomial::from_coeffs_int(&[(1, &[(3, 1)]), (1, &[(0, 1)]), (-6, &[])]),
                Relation::Eq,
            )
            .unwrap(),
        ];
        let params = NlaParams::default().with_horner_row_length_limit(1);
        let (lemmas, stats) = run(&table, &rows, &model, &params);
        assert!(lemmas.is_empty());
        assert_eq!((stats.rows_skipped, stats.rows_examined), (1, 0));
    }

    #[test]
    fn test_feasible_row_gives_nothing() {
        let (table, rows, mut model) = fixed_zero_product();
        model.bounds = VarBounds::new();
        let (lemmas, stats) = run(&table, &rows, &model, &NlaParams::default());
        assert!(lemmas.is_empty());
        assert_eq!(stats.conflicts, 0);
    }

    #[test]
    fn test_inequality_rows() {
        let unit = Interval::new(Some(rat(1)), Some(rat(2)));
        assert!(infeasible(Relation::Le, &unit));
        assert!(!infeasible(Relation::Ge, &unit));
        assert!(infeasible(Relation::Ge, &unit.neg()));
        assert!(!infeasible(Relation::Eq, &Interval::unbounded()));
    }
}
