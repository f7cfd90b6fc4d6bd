//! # oxiz-nla
//!
//! Lemma engine for nonlinear arithmetic over a linear relaxation.
//!
//! The outer solver replaces every product of variables by a fresh
//! abstraction variable and solves the resulting linear problem. When the
//! linear model assigns a product variable a value different from the
//! product of its factors, this crate derives lemmas (disjunctions of linear
//! literals) that are valid for the true nonlinear semantics and false under
//! the spurious model.
//!
//! Each round ([`NlaCore::check`]) detects the violated monomials and runs:
//!
//! 1. [`order`]: zero, sign and monotonicity facts
//! 2. [`tangent`]: tangent and McCormick planes
//! 3. [`horner`]: interval evaluation of rows in nested form
//! 4. [`grobner`]: budgeted Gröbner saturation of the equality rows
//!
//! stopping at the first stage that produces a lemma. Proof recording and
//! other side channels attach through [`LemmaObserver`].
//!
//! ## Example
//!
//! ```
//! use num_rational::BigRational;
//! use oxiz_core::{ResourceLimits, ResourceManager};
//! use oxiz_math::Polynomial;
//! use oxiz_nla::{
//!     Assignment, LinearModel, MonomialDef, MonomialTable, NlaCore, NlaParams, Relation, Row,
//!     RowId, RoundOutcome, VarBounds,
//! };
//!
//! // x2 = x0 * x1 with x0 fixed to 2 and the row x2 - 6 = 0
//! let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
//! let row = Row::new(
//!     RowId(0),
//!     Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (-6, &[])]),
//!     Relation::Eq,
//! )
//! .unwrap();
//! let mut core = NlaCore::new(NlaParams::default(), table, vec![row]).unwrap();
//!
//! // the relaxation picked x1 = 2, so x0 * x1 = 4 but x2 = 6
//! let mut assignment = Assignment::new();
//! assignment.set_int(0, 2).set_int(1, 2).set_int(2, 6);
//! let mut bounds = VarBounds::new();
//! bounds.fix(0, BigRational::from_integer(2.into()));
//! let model = LinearModel::new(assignment).with_bounds(bounds);
//!
//! let mut rm = ResourceManager::new(ResourceLimits::unlimited());
//! let report = core.check(&model, &mut rm, &mut []).unwrap();
//! assert_eq!(report.outcome, RoundOutcome::Lemmas);
//! assert!(report.lemmas[0].is_false_under(&model.assignment).unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod budget;
pub mod check;
pub mod context;
pub mod detector;
pub mod grobner;
pub mod horner;
pub mod lemma;
pub mod model;
pub mod monomial;
pub mod observer;
pub mod order;
pub mod params;
pub mod row;
pub mod scheduler;
pub mod tangent;

pub use budget::{Budgets, HeuristicCounters, RoundCounters};
pub use check::LemmaChecker;
pub use context::RoundContext;
pub use detector::{Violation, violated_monomials};
pub use grobner::{BasisSnapshot, Dependency, GrobnerLemmas};
pub use lemma::{ArithLit, CmpOp, HeuristicId, Lemma, Premise};
pub use model::{Assignment, Bounds, LinearModel, VarBounds};
pub use monomial::{MonomialDef, MonomialTable};
pub use observer::{LemmaObserver, ProofFact, ProofRecorder};
pub use params::{FixedSubstitution, NlaParams};
pub use row::{Relation, Row, RowId};
pub use scheduler::{NlaCore, RoundOutcome, RoundReport, StageRecord};
