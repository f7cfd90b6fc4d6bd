//! Partial-state snapshot written when a session is canceled.

use num_rational::BigRational;
use oxiz_core::{Result, ResultExt};
use oxiz_math::Var;
use oxiz_nla::{BasisSnapshot, Budgets, LinearModel, ProofFact};
use oxiz_proof::ProofDag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Format version of [`CancelBackup`].
pub const BACKUP_VERSION: u32 = 1;

/// Bounds of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupBounds {
    /// Lower bound.
    pub lower: Option<BigRational>,
    /// Upper bound.
    pub upper: Option<BigRational>,
}

/// The linear model of the last completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupModel {
    /// Values by variable.
    pub values: BTreeMap<Var, BigRational>,
    /// Bounds by variable.
    pub bounds: BTreeMap<Var, BackupBounds>,
}

impl From<&LinearModel> for BackupModel {
    fn from(model: &LinearModel) -> Self {
        Self {
            values: model.assignment.to_sorted(),
            bounds: model
                .bounds
                .to_sorted()
                .into_iter()
                .map(|(v, b)| {
                    (
                        v,
                        BackupBounds {
                            lower: b.lower,
                            upper: b.upper,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// One basis equation, rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEquation {
    /// `p` of `p = 0`.
    pub poly: String,
    /// Rows and fixed variables the equation depends on.
    pub deps: Vec<String>,
}

/// Last committed Gröbner basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupBasis {
    /// Snapshot version.
    pub version: u64,
    /// Equations.
    pub equations: Vec<BackupEquation>,
}

impl From<&BasisSnapshot> for BackupBasis {
    fn from(basis: &BasisSnapshot) -> Self {
        Self {
            version: basis.version(),
            equations: basis
                .equations()
                .iter()
                .map(|eq| BackupEquation {
                    poly: eq.poly.to_string(),
                    deps: eq.deps.iter().map(|d| d.to_string()).collect(),
                })
                .collect(),
        }
    }
}

/// Snapshot of a canceled session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBackup {
    /// Format version.
    pub version: u32,
    /// Round that was running when the session was canceled.
    pub round_index: u64,
    /// Budget counters.
    pub budgets: Budgets,
    /// Model of the last completed round.
    pub last_model: Option<BackupModel>,
    /// Last committed basis.
    pub basis: BackupBasis,
    /// Proof so far, with conclusions rendered as text.
    pub proof: Option<ProofDag<String>>,
}

impl CancelBackup {
    /// Capture the current state.
    pub fn capture(
        budgets: &Budgets,
        last_model: Option<&LinearModel>,
        basis: &BasisSnapshot,
        proof: Option<&ProofDag<ProofFact>>,
    ) -> Self {
        Self {
            version: BACKUP_VERSION,
            round_index: budgets.round_index,
            budgets: budgets.clone(),
            last_model: last_model.map(BackupModel::from),
            basis: BackupBasis::from(basis),
            proof: proof.map(|dag| dag.map_conclusions(|c| c.to_string())),
        }
    }

    /// Write as pretty JSON, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing cancel backup")?;
        std::fs::write(path, json).with_context(|| format!("writing cancel backup {}", path.display()))
    }
}
