//! Proof trimming.
//!
//! Removes lemma steps whose conclusion is subsumed by another kept lemma,
//! then drops every node that no remaining lemma depends on. Node ids are
//! preserved, so the trimmed DAG is a subset of the original.

use crate::dag::{Claim, ProofDag, ProofNodeId};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Statistics about proof trimming.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrimStats {
    /// Original proof size (number of nodes)
    pub original_size: usize,
    /// Final proof size after trimming
    pub final_size: usize,
    /// Lemma nodes removed because another lemma subsumes them
    pub subsumed_removed: usize,
    /// Nodes removed because no kept lemma depends on them
    pub unused_removed: usize,
}

/// Proof trimming engine.
#[derive(Debug, Default)]
pub struct ProofTrimmer {
    stats: TrimStats,
}

impl ProofTrimmer {
    /// Create a new trimmer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim `proof`.
    pub fn trim<C: Claim>(&mut self, proof: &ProofDag<C>) -> ProofDag<C> {
        self.stats = TrimStats {
            original_size: proof.len(),
            ..TrimStats::default()
        };

        let lemmas: Vec<ProofNodeId> = proof.lemma_ids().collect();
        let mut roots: Vec<ProofNodeId> = Vec::new();
        for (i, &id) in lemmas.iter().enumerate() {
            if self.is_subsumed(proof, &lemmas, i) {
                self.stats.subsumed_removed += 1;
            } else {
                roots.push(id);
            }
        }

        let mut used = FxHashSet::default();
        for root in roots {
            self.mark_used_nodes(proof, root, &mut used);
        }

        let nodes: Vec<_> = proof
            .nodes()
            .iter()
            .filter(|n| used.contains(&n.id))
            .cloned()
            .collect();

        // Subsumed lemmas revived as premises of kept lemmas are not removed.
        let kept_lemmas = nodes.iter().filter(|n| !n.rule.is_assumption()).count();
        self.stats.subsumed_removed = lemmas.len() - kept_lemmas;
        self.stats.final_size = nodes.len();
        self.stats.unused_removed =
            self.stats.original_size - self.stats.final_size - self.stats.subsumed_removed;

        debug!(
            before = self.stats.original_size,
            after = self.stats.final_size,
            subsumed = self.stats.subsumed_removed,
            "proof trimmed"
        );
        ProofDag::from_parts(nodes, proof.next_id())
    }

    /// Statistics of the last trim.
    pub fn stats(&self) -> &TrimStats {
        &self.stats
    }

    /// A lemma is subsumed by a different lemma whose conclusion implies it.
    /// Among mutually subsuming lemmas the earliest one is kept.
    fn is_subsumed<C: Claim>(&self, proof: &ProofDag<C>, lemmas: &[ProofNodeId], i: usize) -> bool {
        let Some(node) = proof.get(lemmas[i]) else {
            return false;
        };
        lemmas.iter().enumerate().any(|(j, &other)| {
            if i == j {
                return false;
            }
            let Some(other) = proof.get(other) else {
                return false;
            };
            if !other.conclusion.subsumes(&node.conclusion) {
                return false;
            }
            let mutual = node.conclusion.subsumes(&other.conclusion);
            !mutual || j < i
        })
    }

    /// Mark nodes that are used in deriving a target node.
    fn mark_used_nodes<C>(
        &self,
        proof: &ProofDag<C>,
        node_id: ProofNodeId,
        used: &mut FxHashSet<ProofNodeId>,
    ) {
        let mut stack = vec![node_id];
        while let Some(id) = stack.pop() {
            if !used.insert(id) {
                continue;
            }
            if let Some(node) = proof.get(id) {
                stack.extend(node.premises.iter().copied());
            }
        }
    }
}
