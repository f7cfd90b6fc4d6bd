//! # oxiz-solver
//!
//! Session layer around the nonlinear lemma engine.
//!
//! A [`SolverSession`] owns one [`oxiz_nla::NlaCore`] for its whole lifetime
//! and adds what the outer search loop needs around it:
//!
//! - the `solver` option table ([`SolverParams`])
//! - a session-wide timeout and a cancellation token
//! - a partial-state [`CancelBackup`] written on cancellation
//! - proof recording, trimming and checking
//! - transcript, console and per-lemma file sinks
//!
//! ## Example
//!
//! ```
//! use num_rational::BigRational;
//! use oxiz_math::Polynomial;
//! use oxiz_nla::{Assignment, LinearModel, MonomialDef, NlaParams, Relation, Row, RowId, VarBounds};
//! use oxiz_solver::{RoundStatus, SolverParams, SolverSession};
//!
//! let row = Row::new(
//!     RowId(0),
//!     Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (-6, &[])]),
//!     Relation::Eq,
//! )
//! .unwrap();
//! let params = SolverParams::default().with_proof(true, true, false);
//! let mut session =
//!     SolverSession::new(params, NlaParams::default(), [MonomialDef::new(2, &[0, 1])], vec![row]).unwrap();
//!
//! let mut assignment = Assignment::new();
//! assignment.set_int(0, 2).set_int(1, 2).set_int(2, 6);
//! let mut bounds = VarBounds::new();
//! bounds.fix(0, BigRational::from_integer(2.into()));
//! let model = LinearModel::new(assignment).with_bounds(bounds);
//!
//! assert!(matches!(session.check_round(&model).unwrap(), RoundStatus::Lemmas(_)));
//! let summary = session.finish().unwrap();
//! assert!(summary.proof.is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backup;
pub mod params;
pub mod session;
pub mod sinks;

pub use backup::{BACKUP_VERSION, CancelBackup};
pub use params::{NO_TIMEOUT, SolverParams};
pub use session::{ReasonUnknown, RoundStatus, SessionSummary, SolverSession};
pub use sinks::Sinks;
