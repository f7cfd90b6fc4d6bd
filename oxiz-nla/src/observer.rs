//! Observers attached to lemma-producing calls, and proof recording.
//!
//! Observers see every heuristic invocation and every emitted lemma but
//! cannot change what the heuristics derive. The [`ProofRecorder`] is the
//! observer that turns lemmas into proof steps.

use crate::lemma::{ArithLit, HeuristicId, Lemma, Premise};
use crate::monomial::{MonomialDef, MonomialTable};
use crate::row::{Row, RowId};
use oxiz_core::{OxizError, Result};
use oxiz_math::Var;
use oxiz_proof::{Claim, ProofDag, ProofNodeId};
use rustc_hash::FxHashMap;
use std::fmt;

/// Callbacks invoked alongside the scheduler.
pub trait LemmaObserver {
    /// A round begins.
    fn on_round_start(&mut self, _round: u64) -> Result<()> {
        Ok(())
    }

    /// A heuristic is about to run.
    fn on_invocation(&mut self, _round: u64, _heuristic: HeuristicId) -> Result<()> {
        Ok(())
    }

    /// A lemma was emitted. Observers may attach a justification.
    fn on_lemma(&mut self, round: u64, lemma: &mut Lemma) -> Result<()>;
}

/// Conclusion of a proof node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofFact {
    /// An input row.
    Constraint(ArithLit),
    /// A monomial definition.
    Definition(MonomialDef),
    /// A lemma, as its sorted disjuncts.
    Lemma(Vec<ArithLit>),
}

impl fmt::Display for ProofFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofFact::Constraint(lit) => write!(f, "{}", lit),
            ProofFact::Definition(def) => write!(f, "{}", def),
            ProofFact::Lemma(lits) if lits.is_empty() => write!(f, "false"),
            ProofFact::Lemma(lits) => {
                for (i, lit) in lits.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{}", lit)?;
                }
                Ok(())
            }
        }
    }
}

impl Claim for ProofFact {
    /// A disjunction subsumes every disjunction containing all its literals.
    fn subsumes(&self, other: &Self) -> bool {
        match (self, other) {
            (ProofFact::Lemma(a), ProofFact::Lemma(b)) => a.iter().all(|l| b.contains(l)),
            _ => self == other,
        }
    }
}

/// Records one proof step per emitted lemma.
#[derive(Debug, Clone)]
pub struct ProofRecorder {
    dag: ProofDag<ProofFact>,
    rows: FxHashMap<RowId, ProofNodeId>,
    defs: FxHashMap<Var, ProofNodeId>,
}

impl ProofRecorder {
    /// Start a proof with one assumption per row and monomial definition.
    pub fn new(table: &MonomialTable, rows: &[Row]) -> Self {
        let mut dag = ProofDag::new();
        let mut defs = FxHashMap::default();
        for def in table.iter() {
            let id = dag.add_assumption(format!("def x{}", def.var), ProofFact::Definition(def.clone()));
            defs.insert(def.var, id);
        }
        let mut row_ids = FxHashMap::default();
        for row in rows {
            let id = dag.add_assumption(format!("row {}", row.id()), ProofFact::Constraint(row.literal()));
            row_ids.insert(row.id(), id);
        }
        Self {
            dag,
            rows: row_ids,
            defs,
        }
    }

    /// The proof so far.
    pub fn dag(&self) -> &ProofDag<ProofFact> {
        &self.dag
    }

    /// Take the proof.
    pub fn into_dag(self) -> ProofDag<ProofFact> {
        self.dag
    }

    /// Declared premises plus the definition of every abstraction variable
    /// the lemma mentions.
    fn premise_ids(&self, lemma: &Lemma) -> Result<Vec<ProofNodeId>> {
        let mut ids = Vec::new();
        for premise in lemma.premises() {
            let id = match premise {
                Premise::Row(r) => self.rows.get(r),
                Premise::Definition(v) => self.defs.get(v),
            };
            let id = id.ok_or_else(|| {
                OxizError::internal(format!("lemma premise {:?} was never recorded", premise))
            })?;
            ids.push(*id);
        }
        ids.extend(lemma.vars().iter().filter_map(|v| self.defs.get(v)));
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

impl LemmaObserver for ProofRecorder {
    fn on_lemma(&mut self, _round: u64, lemma: &mut Lemma) -> Result<()> {
        let premises = self.premise_ids(lemma)?;
        let id = self.dag.add_lemma(
            lemma.origin().name(),
            premises,
            ProofFact::Lemma(lemma.literals().to_vec()),
        )?;
        lemma.set_justification(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lemma::CmpOp;
    use crate::row::Relation;
    use num_rational::BigRational;
    use oxiz_math::Polynomial;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    #[test]
    fn test_records_assumptions_and_lemma() {
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let row = Row::new(
            RowId(7),
            Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (-6, &[])]),
            Relation::Eq,
        )
        .unwrap();
        let mut rec = ProofRecorder::new(&table, &[row]);
        assert_eq!(rec.dag().len(), 2);

        let mut lemma = Lemma::new(
            HeuristicId::Horner,
            [ArithLit::var(2, CmpOp::Ne, rat(6)), ArithLit::var(0, CmpOp::Lt, rat(0))],
        )
        .with_premises([Premise::Row(RowId(7))]);
        rec.on_lemma(0, &mut lemma).unwrap();

        let id = lemma.justification().unwrap();
        let node = rec.dag().get(id).unwrap();
        // row premise plus the definition of x2
        assert_eq!(node.premises.len(), 2);
        assert_eq!(node.conclusion.to_string(), lemma.literals().iter().map(|l| l.to_string()).collect::<Vec<_>>().join(" or "));
    }

    #[test]
    fn test_unknown_premise_is_internal_error() {
        let mut rec = ProofRecorder::new(&MonomialTable::new(), &[]);
        let mut lemma = Lemma::new(HeuristicId::Grobner, [ArithLit::var(0, CmpOp::Gt, rat(0))])
            .with_premises([Premise::Row(RowId(1))]);
        assert!(rec.on_lemma(0, &mut lemma).unwrap_err().is_fatal());
    }

    #[test]
    fn test_subsumption_is_subset() {
        let a = ArithLit::var(0, CmpOp::Gt, rat(0));
        let b = ArithLit::var(1, CmpOp::Lt, rat(2));
        let short = ProofFact::Lemma(vec![a.clone()]);
        let long = ProofFact::Lemma(vec![a.clone(), b]);
        assert!(short.subsumes(&long));
        assert!(!long.subsumes(&short));
        assert!(!ProofFact::Constraint(a.clone()).subsumes(&short));
    }
}
