//! # oxiz-math
//!
//! Exact arithmetic used by the OxiZ nonlinear arithmetic engine.
//!
//! - [`polynomial`]: sparse multivariate polynomials over `BigRational`
//! - [`interval`]: closed rational intervals with infinite endpoints
//! - [`horner`]: nested forms and their interval evaluation
//! - [`grobner`]: budget-capped Buchberger saturation with dependency tracking
//!
//! ## Example
//!
//! ```
//! use oxiz_math::horner::HornerForm;
//! use oxiz_math::interval::Interval;
//! use oxiz_math::polynomial::Polynomial;
//! use num_rational::BigRational;
//!
//! // x^2 - x over x in [0, 1]
//! let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-1, &[(0, 1)])]);
//! let unit = |_: u32| Interval::new(Some(BigRational::from_integer(0.into())), Some(BigRational::from_integer(1.into())));
//! let range = HornerForm::build(&p).eval(&unit);
//! assert_eq!(range.upper, Some(BigRational::from_integer(0.into())));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod grobner;
pub mod horner;
pub mod interval;
pub mod polynomial;

pub use grobner::{BudgetedBuchberger, Equation, GrobnerConfig, GrobnerStats, Saturation, StopReason};
pub use horner::HornerForm;
pub use interval::Interval;
pub use polynomial::{Monomial, Polynomial, Term, Var, VarPower};
