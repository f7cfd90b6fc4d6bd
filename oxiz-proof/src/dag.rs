//! Proof DAG.
//!
//! Nodes are stored in id order. A node's premises always have smaller ids
//! than the node itself, so the graph is acyclic by construction. Node ids
//! are never reused, which lets a trimmed DAG keep the ids of the original.

use oxiz_core::{OxizError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a proof node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProofNodeId(pub u32);

impl fmt::Display for ProofNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@p{}", self.0)
    }
}

/// How a node's conclusion was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofRule {
    /// An input fact.
    Assumption {
        /// Where the fact comes from, e.g. `row 3`.
        label: String,
    },
    /// A lemma derived by a heuristic from its premises.
    Lemma {
        /// Name of the producing heuristic.
        heuristic: String,
    },
}

impl ProofRule {
    /// Whether this is an input fact.
    pub fn is_assumption(&self) -> bool {
        matches!(self, ProofRule::Assumption { .. })
    }
}

/// A claim that can appear as a node conclusion.
pub trait Claim: Clone + fmt::Display {
    /// Whether `self` implies `other` syntactically, so `other` is redundant.
    fn subsumes(&self, other: &Self) -> bool;
}

impl Claim for String {
    fn subsumes(&self, other: &Self) -> bool {
        self == other
    }
}

/// A single proof step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode<C> {
    /// Node identifier.
    pub id: ProofNodeId,
    /// Inference rule.
    pub rule: ProofRule,
    /// Nodes this step depends on.
    pub premises: Vec<ProofNodeId>,
    /// What this step establishes.
    pub conclusion: C,
}

/// Proof as a directed acyclic graph of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofDag<C> {
    nodes: Vec<ProofNode<C>>,
    next_id: u32,
}

impl<C> Default for ProofDag<C> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 0,
        }
    }
}

impl<C> ProofDag<C> {
    /// Create an empty DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input fact.
    pub fn add_assumption(&mut self, label: impl Into<String>, conclusion: C) -> ProofNodeId {
        self.push(
            ProofRule::Assumption {
                label: label.into(),
            },
            Vec::new(),
            conclusion,
        )
    }

    /// Record a lemma derived from `premises`.
    ///
    /// Every premise must already be in the DAG.
    pub fn add_lemma(
        &mut self,
        heuristic: impl Into<String>,
        premises: Vec<ProofNodeId>,
        conclusion: C,
    ) -> Result<ProofNodeId> {
        if let Some(missing) = premises.iter().find(|p| !self.contains(**p)) {
            return Err(OxizError::internal(format!(
                "premise {} of new lemma is not in the proof",
                missing
            )));
        }
        Ok(self.push(
            ProofRule::Lemma {
                heuristic: heuristic.into(),
            },
            premises,
            conclusion,
        ))
    }

    fn push(&mut self, rule: ProofRule, premises: Vec<ProofNodeId>, conclusion: C) -> ProofNodeId {
        let id = ProofNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(ProofNode {
            id,
            rule,
            premises,
            conclusion,
        });
        id
    }

    /// Build a DAG from nodes, e.g. after trimming. Nodes must be sorted by id.
    pub(crate) fn from_parts(nodes: Vec<ProofNode<C>>, next_id: u32) -> Self {
        Self { nodes, next_id }
    }

    /// Look up a node.
    pub fn get(&self, id: ProofNodeId) -> Option<&ProofNode<C>> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: ProofNodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DAG has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> &[ProofNode<C>] {
        &self.nodes
    }

    /// Id the next node will get.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Ids of all lemma nodes.
    pub fn lemma_ids(&self) -> impl Iterator<Item = ProofNodeId> + '_ {
        self.nodes
            .iter()
            .filter(|n| !n.rule.is_assumption())
            .map(|n| n.id)
    }

    /// Ids of all assumption nodes.
    pub fn assumption_ids(&self) -> impl Iterator<Item = ProofNodeId> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.rule.is_assumption())
            .map(|n| n.id)
    }

    /// Same DAG with every conclusion mapped through `f`.
    pub fn map_conclusions<D>(&self, mut f: impl FnMut(&C) -> D) -> ProofDag<D> {
        ProofDag {
            nodes: self
                .nodes
                .iter()
                .map(|n| ProofNode {
                    id: n.id,
                    rule: n.rule.clone(),
                    premises: n.premises.clone(),
                    conclusion: f(&n.conclusion),
                })
                .collect(),
            next_id: self.next_id,
        }
    }
}

impl<C: fmt::Display> fmt::Display for ProofDag<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match &node.rule {
                ProofRule::Assumption { label } => {
                    writeln!(f, "{} assume[{}] {}", node.id, label, node.conclusion)?
                }
                ProofRule::Lemma { heuristic } => {
                    write!(f, "{} {}(", node.id, heuristic)?;
                    for (i, p) in node.premises.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", p)?;
                    }
                    writeln!(f, ") {}", node.conclusion)?
                }
            }
        }
        Ok(())
    }
}
