//! Semantic checking of recorded lemma steps.
//!
//! A lemma step is sound when its disjunction holds at every point once the
//! monomial definitions among its premises are taken as products. The
//! checker cannot prove that, so it samples: every base variable ranges over
//! a small grid built from a few integers, one half, and the constants the
//! literals compare against. A point where every literal is false refutes
//! the step.

use crate::model::Assignment;
use crate::monomial::MonomialTable;
use crate::observer::ProofFact;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use oxiz_math::Var;
use oxiz_proof::{ProofCheckResult, ProofChecker, ProofDag, ProofNode};
use std::collections::BTreeSet;

/// Default cap on the number of sampled points per step.
pub const DEFAULT_MAX_POINTS: usize = 4096;

/// Samples lemma steps for counterexamples.
#[derive(Debug, Clone)]
pub struct LemmaChecker {
    max_points: usize,
}

impl Default for LemmaChecker {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl LemmaChecker {
    /// Checker with the default sample cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the sample cap.
    pub fn with_max_points(mut self, n: usize) -> Self {
        self.max_points = n.max(1);
        self
    }
}

impl ProofChecker<ProofFact> for LemmaChecker {
    fn check_step(&self, node: &ProofNode<ProofFact>, dag: &ProofDag<ProofFact>) -> ProofCheckResult {
        let ProofFact::Lemma(literals) = &node.conclusion else {
            return invalid(node, "lemma step does not conclude a disjunction");
        };

        let mut table = MonomialTable::new();
        for p in &node.premises {
            if let Some(ProofFact::Definition(def)) = dag.get(*p).map(|n| &n.conclusion)
                && let Err(e) = table.register(def.clone())
            {
                return invalid(node, format!("inconsistent definitions: {}", e));
            }
        }

        let mut vars = BTreeSet::new();
        for lit in literals {
            for v in lit.vars() {
                match table.get(v) {
                    Some(def) => vars.extend(def.factor_vars()),
                    None => {
                        vars.insert(v);
                    }
                }
            }
        }
        let vars: Vec<Var> = vars.into_iter().collect();
        let grid = sample_values(literals.iter().map(|l| &l.rhs));

        let radix = grid.len() as u128;
        let total = (0..vars.len()).fold(1u128, |acc, _| acc.saturating_mul(radix));
        let count = total.min(self.max_points as u128);
        let stride = (total / count).max(1);

        let mut point = Assignment::new();
        for i in 0..count {
            let mut index = i * stride;
            for &v in &vars {
                point.set(v, grid[(index % radix) as usize].clone());
                index /= radix;
            }
            let mut holds = false;
            for lit in literals {
                match lit.eval_true(&table, &point) {
                    Ok(true) => {
                        holds = true;
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => return invalid(node, format!("cannot evaluate {}: {}", lit, e)),
                }
            }
            if !holds {
                let at: Vec<String> = vars
                    .iter()
                    .filter_map(|v| point.get(*v).map(|q| format!("x{}={}", v, q)))
                    .collect();
                return invalid(node, format!("falsified at {}", at.join(", ")));
            }
        }
        ProofCheckResult::Valid
    }
}

/// Integers -2..=2, plus and minus one half, and each constant with its
/// integer neighbours. Sorted and duplicate free.
fn sample_values<'a>(constants: impl Iterator<Item = &'a BigRational>) -> Vec<BigRational> {
    let mut out: BTreeSet<BigRational> = (-2..=2i64).map(|n| BigRational::from_integer(BigInt::from(n))).collect();
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    out.insert(half.clone());
    out.insert(-half);
    for c in constants {
        out.insert(c - BigRational::one());
        out.insert(c.clone());
        out.insert(c + BigRational::one());
    }
    out.into_iter().collect()
}

fn invalid(node: &ProofNode<ProofFact>, reason: impl Into<String>) -> ProofCheckResult {
    ProofCheckResult::Invalid {
        node: node.id,
        reason: reason.into(),
    }
}
