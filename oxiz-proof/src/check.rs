//! Proof checking.
//!
//! Checking has two layers: a structural pass over the DAG that every proof
//! must survive, and a pluggable [`ProofChecker`] that judges each lemma
//! step on its own merits.

use crate::dag::{ProofDag, ProofNode, ProofNodeId, ProofRule};
use oxiz_core::{OxizError, Result};
use tracing::{debug, warn};

/// Result of proof checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofCheckResult {
    /// Proof is valid.
    Valid,
    /// Proof is invalid with error details.
    Invalid {
        /// Offending node.
        node: ProofNodeId,
        /// What is wrong with it.
        reason: String,
    },
}

impl ProofCheckResult {
    /// Whether the result is [`ProofCheckResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ProofCheckResult::Valid)
    }
}

/// Judges a single lemma step given the rest of the DAG.
pub trait ProofChecker<C> {
    /// Check one lemma node.
    fn check_step(&self, node: &ProofNode<C>, dag: &ProofDag<C>) -> ProofCheckResult;
}

/// Structural validation: ids strictly increasing, premises present and
/// earlier, assumptions without premises, lemmas with at least one premise.
pub fn check_structure<C>(dag: &ProofDag<C>) -> ProofCheckResult {
    let mut prev: Option<ProofNodeId> = None;
    for node in dag.nodes() {
        if prev.is_some_and(|p| p >= node.id) {
            return invalid(node.id, "node ids are not strictly increasing");
        }
        prev = Some(node.id);

        match &node.rule {
            ProofRule::Assumption { .. } if !node.premises.is_empty() => {
                return invalid(node.id, "assumption with premises");
            }
            ProofRule::Lemma { .. } if node.premises.is_empty() => {
                return invalid(node.id, "lemma without premises");
            }
            _ => {}
        }

        for p in &node.premises {
            if *p >= node.id {
                return invalid(node.id, format!("premise {} is not earlier", p));
            }
            if !dag.contains(*p) {
                return invalid(node.id, format!("premise {} is missing", p));
            }
        }
    }
    ProofCheckResult::Valid
}

/// Run the structural pass and then `checker` over every lemma node.
///
/// Any failure is reported as [`OxizError::ProofValidation`].
pub fn validate<C>(dag: &ProofDag<C>, checker: &dyn ProofChecker<C>) -> Result<()> {
    let mut result = check_structure(dag);
    if result.is_valid() {
        for node in dag.nodes().iter().filter(|n| !n.rule.is_assumption()) {
            result = checker.check_step(node, dag);
            if !result.is_valid() {
                break;
            }
        }
    }

    match result {
        ProofCheckResult::Valid => {
            debug!(nodes = dag.len(), "proof check passed");
            Ok(())
        }
        ProofCheckResult::Invalid { node, reason } => {
            warn!(%node, %reason, "proof check failed");
            Err(OxizError::ProofValidation(format!("{}: {}", node, reason)))
        }
    }
}

fn invalid(node: ProofNodeId, reason: impl Into<String>) -> ProofCheckResult {
    ProofCheckResult::Invalid {
        node,
        reason: reason.into(),
    }
}
