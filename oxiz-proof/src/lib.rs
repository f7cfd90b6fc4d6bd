//! # oxiz-proof
//!
//! Proof objects for lemma-producing search.
//!
//! A [`ProofDag`] records input facts as assumption nodes and every derived
//! lemma as a node whose premises are the facts it was derived from. The DAG
//! can be validated ([`validate`]) with a pluggable [`ProofChecker`] and
//! trimmed ([`ProofTrimmer`]) down to the steps that matter.
//!
//! ```
//! use oxiz_proof::{ProofDag, ProofTrimmer};
//!
//! let mut dag = ProofDag::new();
//! let row = dag.add_assumption("row 0", "x - 2 = 0".to_string());
//! let _unused = dag.add_assumption("row 1", "y = 0".to_string());
//! dag.add_lemma("order", vec![row], "x > 1".to_string()).unwrap();
//!
//! let trimmed = ProofTrimmer::new().trim(&dag);
//! assert_eq!(trimmed.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod check;
pub mod dag;
pub mod trim;

pub use check::{ProofCheckResult, ProofChecker, check_structure, validate};
pub use dag::{Claim, ProofDag, ProofNode, ProofNodeId, ProofRule};
pub use trim::{ProofTrimmer, TrimStats};
