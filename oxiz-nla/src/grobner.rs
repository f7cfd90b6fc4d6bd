//! Gröbner heuristic: budgeted saturation of the equality rows around the
//! violated monomials.
//!
//! The basis lives in a versioned [`BasisSnapshot`]. An invocation saturates a
//! private working copy and only installs the result as a new version when
//! saturation completes or reports a conflict. An invocation that runs out of
//! budget or is interrupted leaves the previous snapshot in place.

use crate::context::{RoundContext, bound_literals, fixed_literals, substitute_fixed};
use crate::lemma::{HeuristicId, Lemma};
use crate::params::NlaParams;
use crate::row::{Relation, Row, RowId};
use oxiz_core::{ResourceManager, Result};
use oxiz_math::{BudgetedBuchberger, Equation, HornerForm, Polynomial, StopReason, Var};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a basis equation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dependency {
    /// An equality row.
    Row(RowId),
    /// A fixed variable that was substituted by its value.
    Fixed(Var),
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Row(id) => write!(f, "{}", id),
            Dependency::Fixed(v) => write!(f, "fixed(x{})", v),
        }
    }
}

/// An immutable version of the basis.
#[derive(Debug, Clone, Default)]
pub struct BasisSnapshot {
    version: u64,
    equations: Arc<Vec<Equation<Dependency>>>,
}

impl BasisSnapshot {
    /// Version number; 0 is the empty initial basis.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Equations of this version.
    pub fn equations(&self) -> &[Equation<Dependency>] {
        &self.equations
    }

    fn next(&self, equations: Vec<Equation<Dependency>>) -> Self {
        Self {
            version: self.version + 1,
            equations: Arc::new(equations),
        }
    }
}

/// Statistics of the Gröbner heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrobnerHeuristicStats {
    /// Invocations.
    pub invocations: u64,
    /// Reduction steps.
    pub steps: u64,
    /// Single-term rewrites.
    pub simplifications: u64,
    /// Equations added to the basis.
    pub equations_added: u64,
    /// Conflicts found.
    pub conflicts: u64,
    /// Invocations aborted by timeout or cancellation.
    pub interrupted: u64,
}

/// Outcome of one invocation.
#[derive(Debug, Clone)]
pub struct GrobnerRun {
    /// Lemmas, one per reported conflict that excludes the model.
    pub lemmas: Vec<Lemma>,
    /// Reduction steps consumed.
    pub steps: u64,
    /// Equations added.
    pub equations_added: u64,
    /// Why saturation stopped.
    pub stop: StopReason,
}

/// The Gröbner heuristic.
#[derive(Debug, Default)]
pub struct GrobnerLemmas {
    snapshot: BasisSnapshot,
    stats: GrobnerHeuristicStats,
}

impl GrobnerLemmas {
    /// Create the heuristic with an empty basis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics so far.
    pub fn stats(&self) -> &GrobnerHeuristicStats {
        &self.stats
    }

    /// The last committed basis.
    pub fn snapshot(&self) -> &BasisSnapshot {
        &self.snapshot
    }

    /// Saturate the rows reachable from the violated monomials.
    pub fn run(
        &mut self,
        ctx: &RoundContext<'_>,
        params: &NlaParams,
        rm: &mut ResourceManager,
    ) -> Result<GrobnerRun> {
        self.run_with_checkpoint(ctx, params, || rm.checkpoint())
    }

    fn run_with_checkpoint(
        &mut self,
        ctx: &RoundContext<'_>,
        params: &NlaParams,
        checkpoint: impl FnMut() -> Result<()>,
    ) -> Result<GrobnerRun> {
        self.stats.invocations += 1;
        let rows = reachable_rows(ctx);
        let bounds = ctx.bounds();
        let mut generators = Vec::with_capacity(rows.len());
        for row in &rows {
            let (poly, fixed) = substitute_fixed(&row.expanded(ctx.table), bounds, params.grobner_subs_fixed);
            let deps = std::iter::once(Dependency::Row(row.id()))
                .chain(fixed.into_iter().map(|(v, _)| Dependency::Fixed(v)));
            generators.push(Equation::new(poly, deps));
        }
        debug!(generators = generators.len(), round = ctx.round_index, "grobner saturation");

        let mut engine: BudgetedBuchberger<Dependency> = BudgetedBuchberger::new(params.grobner_config());
        let excludes_zero =
            |p: &Polynomial| !HornerForm::build(p).eval(&|v| bounds.interval(v)).contains_zero();
        let result = engine.saturate(generators, excludes_zero, checkpoint);

        let es = engine.stats();
        self.stats.steps += es.steps;
        self.stats.simplifications += es.simplifications;
        self.stats.equations_added += es.equations_added;
        let saturation = match result {
            Ok(s) => s,
            Err(e) => {
                self.stats.interrupted += 1;
                debug!(error = %e, "grobner interrupted, basis discarded");
                return Err(e);
            }
        };
        self.stats.conflicts += saturation.conflicts.len() as u64;

        let mut lemmas = Vec::new();
        for conflict in &saturation.conflicts {
            if let Some(lemma) = conflict_lemma(ctx, &rows, conflict)? {
                lemmas.push(lemma);
            }
        }
        let stop = saturation.stop;
        let finished = matches!(stop, StopReason::Saturated | StopReason::ConflictLimit);
        if finished || !lemmas.is_empty() {
            self.snapshot = self.snapshot.next(saturation.basis);
            debug!(
                version = self.snapshot.version(),
                stop = ?stop,
                lemmas = lemmas.len(),
                "grobner basis committed"
            );
        } else {
            debug!(stop = ?stop, "grobner budget exhausted, basis discarded");
        }
        Ok(GrobnerRun {
            lemmas,
            steps: es.steps,
            equations_added: es.equations_added,
            stop,
        })
    }
}

/// Equality rows connected to the violated monomials through shared
/// variables, in row-id order.
fn reachable_rows<'a>(ctx: &RoundContext<'a>) -> Vec<&'a Row> {
    let mut reached: BTreeSet<Var> = BTreeSet::new();
    for v in ctx.violations {
        reached.insert(v.var);
        if let Some(def) = ctx.table.get(v.var) {
            reached.extend(def.factor_vars());
        }
    }

    let candidates: Vec<(&Row, Vec<Var>)> = ctx
        .rows
        .iter()
        .filter(|r| r.relation() == Relation::Eq)
        .map(|r| {
            let mut vars = r.linear().vars();
            vars.extend(r.expanded(ctx.table).vars());
            (r, vars)
        })
        .collect();
    let mut taken = vec![false; candidates.len()];
    loop {
        let mut changed = false;
        for (i, (_, vars)) in candidates.iter().enumerate() {
            if !taken[i] && vars.iter().any(|v| reached.contains(v)) {
                taken[i] = true;
                reached.extend(vars.iter().copied());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    candidates
        .into_iter()
        .zip(taken)
        .filter_map(|((row, _), t)| t.then_some(row))
        .collect()
}

fn conflict_lemma(
    ctx: &RoundContext<'_>,
    rows: &[&Row],
    conflict: &Equation<Dependency>,
) -> Result<Option<Lemma>> {
    let bounds = ctx.bounds();
    let mut literals = Vec::new();
    let mut used_rows = Vec::new();
    for dep in &conflict.deps {
        match dep {
            Dependency::Row(id) => {
                if let Some(row) = rows.iter().find(|r| r.id() == *id) {
                    literals.push(row.literal().negate());
                    used_rows.push(*row);
                }
            }
            Dependency::Fixed(v) => {
                if let Some(value) = bounds.fixed_value(*v) {
                    literals.extend(fixed_literals(*v, value));
                }
            }
        }
    }
    if !conflict.poly.is_constant() {
        for v in conflict.poly.vars() {
            literals.extend(bound_literals(bounds, v));
        }
    }
    let lemma = Lemma::new(HeuristicId::Grobner, literals).with_premises(ctx.row_premises(used_rows));
    ctx.excluding(lemma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::violated_monomials;
    use crate::model::{Assignment, LinearModel};
    use crate::monomial::{MonomialDef, MonomialTable};
    use oxiz_core::{CancellationToken, OxizError, ResourceLimits};

    /// Variables x0, x1, x2; x3 = x0*x1 and x4 = x1*x2.
    /// Rows: x4 = 0, x2 - 1 = 0, x3 - 1 = 0. Refuting needs three steps.
    fn three_step_system() -> (MonomialTable, Vec<Row>, LinearModel) {
        let table =
            MonomialTable::from_defs([MonomialDef::new(3, &[0, 1]), MonomialDef::new(4, &[1, 2])]).unwrap();
        let rows = vec![
            Row::new(RowId(0), Polynomial::from_coeffs_int(&[(1, &[(4, 1)])]), Relation::Eq).unwrap(),
            Row::new(RowId(1), Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (-1, &[])]), Relation::Eq)
                .unwrap(),
            Row::new(RowId(2), Polynomial::from_coeffs_int(&[(1, &[(3, 1)]), (-1, &[])]), Relation::Eq)
                .unwrap(),
        ];
        let mut a = Assignment::new();
        a.set_int(0, 1).set_int(1, 1).set_int(2, 1).set_int(3, 1).set_int(4, 0);
        (table, rows, LinearModel::new(a))
    }

    fn run_with(gr_q: u32, token: Option<CancellationToken>) -> (GrobnerLemmas, Result<GrobnerRun>) {
        let (table, rows, model) = three_step_system();
        let violations = violated_monomials(&table, &model.assignment).unwrap();
        let ctx = RoundContext {
            round_index: 0,
            table: &table,
            rows: &rows,
            model: &model,
            violations: &violations,
        };
        let mut rm = match token {
            Some(t) => ResourceManager::with_token(ResourceLimits::unlimited(), t),
            None => ResourceManager::new(ResourceLimits::unlimited()),
        };
        let params = NlaParams::default().with_gr_q(gr_q);
        let mut g = GrobnerLemmas::new();
        let run = g.run(&ctx, &params, &mut rm);
        (g, run)
    }

    #[test]
    fn test_reachability_follows_shared_vars() {
        let (table, rows, model) = three_step_system();
        let violations = violated_monomials(&table, &model.assignment).unwrap();
        let ctx = RoundContext {
            round_index: 0,
            table: &table,
            rows: &rows,
            model: &model,
            violations: &violations,
        };
        let ids: Vec<RowId> = reachable_rows(&ctx).iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![RowId(0), RowId(1), RowId(2)]);
    }

    #[test]
    fn test_quota_too_small_gives_no_lemma() {
        for q in [1, 2] {
            let (g, run) = run_with(q, None);
            let run = run.unwrap();
            assert!(run.lemmas.is_empty());
            assert_eq!(run.stop, StopReason::StepQuota);
            assert!(run.steps <= u64::from(q));
            assert_eq!(g.snapshot().version(), 0);
            assert!(g.snapshot().equations().is_empty());
        }
    }

    #[test]
    fn test_enough_quota_refutes() {
        let (_, run) = run_with(3, None);
        let run = run.unwrap();
        assert_eq!(run.stop, StopReason::ConflictLimit);
        assert_eq!(run.steps, 3);
        assert_eq!(run.lemmas.len(), 1);
        let lemma = &run.lemmas[0];
        assert_eq!(lemma.origin(), HeuristicId::Grobner);
        // x4 != 0 or x2 != 1 or x3 != 1
        assert_eq!(lemma.literals().len(), 3);
        assert_eq!(lemma.premises().len(), 5);
    }

    #[test]
    fn test_interrupt_discards_basis() {
        let token = CancellationToken::new();
        token.cancel();
        let (g, run) = run_with(10, Some(token));
        assert!(matches!(run, Err(OxizError::Cancelled)));
        assert_eq!(g.snapshot().version(), 0);
        assert!(g.snapshot().equations().is_empty());
        assert_eq!(g.stats().interrupted, 1);
    }

    #[test]
    fn test_interrupt_after_first_pair_keeps_committed_basis() {
        let (table, rows, model) = three_step_system();
        let violations = violated_monomials(&table, &model.assignment).unwrap();
        let ctx = RoundContext {
            round_index: 0,
            table: &table,
            rows: &rows,
            model: &model,
            violations: &violations,
        };
        let params = NlaParams::default().with_gr_q(10);
        let mut g = GrobnerLemmas::new();

        let mut polls = 0;
        let run = g.run_with_checkpoint(&ctx, &params, || {
            polls += 1;
            if polls > 1 { Err(OxizError::Cancelled) } else { Ok(()) }
        });
        assert!(matches!(run, Err(OxizError::Cancelled)));
        assert_eq!(g.stats().steps, 2);
        assert_eq!(g.stats().interrupted, 1);
        assert_eq!(g.snapshot().version(), 0);

        let committed = g.run_with_checkpoint(&ctx, &params, || Ok(())).unwrap();
        assert_eq!(committed.lemmas.len(), 1);
        let basis = g.snapshot().clone();
        assert_eq!(basis.version(), 1);

        let mut polls = 0;
        let run = g.run_with_checkpoint(&ctx, &params, || {
            polls += 1;
            if polls > 1 { Err(OxizError::Timeout) } else { Ok(()) }
        });
        assert!(matches!(run, Err(OxizError::Timeout)));
        assert_eq!(g.snapshot().version(), 1);
        assert_eq!(g.snapshot().equations(), basis.equations());
        assert_eq!(g.stats().interrupted, 2);
    }
}
