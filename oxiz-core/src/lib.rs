//! OxiZ Core - shared plumbing for the nonlinear arithmetic engine
//!
//! This crate provides the types every other crate in the workspace builds on:
//! - [`OxizError`] and the [`Result`] alias, with fatal/soft classification
//! - Typed option descriptors ([`ParamDescrs`]) and user parameter sets ([`Params`])
//! - Wall-clock limits and cooperative cancellation ([`ResourceManager`], [`CancellationToken`])
//! - Named counters ([`Statistics`])
//!
//! # Examples
//!
//! ```
//! use oxiz_core::{ParamDescrs, ParamValue, Params};
//!
//! let mut descrs = ParamDescrs::new("nla");
//! descrs.insert("order", "run order lemmas", ParamValue::Bool(true));
//!
//! let mut params = Params::new();
//! params.set_bool("order", false);
//! params.validate(&descrs).unwrap();
//! assert!(!params.get_bool(&descrs, "order").unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod error_context;
pub mod params;
pub mod resource;
pub mod statistics;

pub use error::{OxizError, Result};
pub use error_context::{ResultExt, context_chain};
pub use params::{ParamDescr, ParamDescrs, ParamKind, ParamValue, Params};
pub use resource::{CancellationToken, LimitStatus, ResourceLimits, ResourceManager};
pub use statistics::Statistics;
