//! Typed configuration of the `solver` module.

use oxiz_core::{ParamDescrs, ParamValue, Params, Result};
use std::path::PathBuf;
use std::time::Duration;

const MODULE: &str = "solver";

/// Timeout value meaning "no deadline".
pub const NO_TIMEOUT: u32 = u32::MAX;

/// Session-level options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverParams {
    /// Append an SMT-LIB transcript of rounds and lemmas to this file.
    pub smtlib2_log: Option<PathBuf>,
    /// Write a partial-state snapshot here when the session is canceled.
    pub cancel_backup_file: Option<PathBuf>,
    /// Wall-clock budget of the whole session.
    pub timeout: Option<Duration>,
    /// Print lemmas to the console sink.
    pub lemmas2console: bool,
    /// Print heuristic invocations to the console sink.
    pub instantiations2console: bool,
    /// Write each lemma, negated, to its own file.
    pub axioms2files: bool,
    /// Directory for `axioms2files` output.
    pub axioms_dir: PathBuf,
    /// Check the proof when the session finishes.
    pub proof_check: bool,
    /// Record a proof step per lemma.
    pub proof_save: bool,
    /// Trim the proof when the session finishes.
    pub proof_trim: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            smtlib2_log: None,
            cancel_backup_file: None,
            timeout: None,
            lemmas2console: false,
            instantiations2console: false,
            axioms2files: false,
            axioms_dir: PathBuf::from("."),
            proof_check: true,
            proof_save: false,
            proof_trim: false,
        }
    }
}

fn symbol_path(s: String) -> Option<PathBuf> {
    (!s.is_empty()).then(|| PathBuf::from(s))
}

impl SolverParams {
    /// Option table of the `solver` module.
    pub fn descriptors() -> ParamDescrs {
        let mut t = ParamDescrs::new(MODULE);
        t.insert(
            "smtlib2_log",
            "file to save solver interaction",
            ParamValue::Symbol(String::new()),
        );
        t.insert(
            "cancel_backup_file",
            "file to save partial search state if search is canceled",
            ParamValue::Symbol(String::new()),
        );
        t.insert(
            "timeout",
            "timeout on the solver object in milliseconds; overwrites a global timeout",
            ParamValue::UInt(NO_TIMEOUT),
        );
        t.insert("lemmas2console", "print lemmas during search", ParamValue::Bool(false));
        t.insert(
            "instantiations2console",
            "print heuristic invocations to the console",
            ParamValue::Bool(false),
        );
        t.insert(
            "axioms2files",
            "print negated theory axioms to separate files during search",
            ParamValue::Bool(false),
        );
        t.insert("proof.check", "check proof logs", ParamValue::Bool(true));
        t.insert("proof.save", "save proof log into a proof object", ParamValue::Bool(false));
        t.insert(
            "proof.trim",
            "trim and save proof into a proof object",
            ParamValue::Bool(false),
        );
        t
    }

    /// Build from a flat parameter set.
    pub fn from_params(params: &Params) -> Result<Self> {
        let descrs = Self::descriptors();
        params.validate(&descrs)?;
        let timeout = match params.get_uint(&descrs, "timeout")? {
            NO_TIMEOUT => None,
            ms => Some(Duration::from_millis(u64::from(ms))),
        };
        Ok(Self {
            smtlib2_log: symbol_path(params.get_symbol(&descrs, "smtlib2_log")?),
            cancel_backup_file: symbol_path(params.get_symbol(&descrs, "cancel_backup_file")?),
            timeout,
            lemmas2console: params.get_bool(&descrs, "lemmas2console")?,
            instantiations2console: params.get_bool(&descrs, "instantiations2console")?,
            axioms2files: params.get_bool(&descrs, "axioms2files")?,
            proof_check: params.get_bool(&descrs, "proof.check")?,
            proof_save: params.get_bool(&descrs, "proof.save")?,
            proof_trim: params.get_bool(&descrs, "proof.trim")?,
            ..Self::default()
        })
    }

    /// Set the timeout; `None` removes it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the SMT-LIB transcript file.
    #[must_use]
    pub fn with_smtlib2_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.smtlib2_log = Some(path.into());
        self
    }

    /// Set the cancel backup file.
    #[must_use]
    pub fn with_cancel_backup_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cancel_backup_file = Some(path.into());
        self
    }

    /// Print lemmas to the console sink.
    #[must_use]
    pub fn with_lemmas2console(mut self, on: bool) -> Self {
        self.lemmas2console = on;
        self
    }

    /// Print invocations to the console sink.
    #[must_use]
    pub fn with_instantiations2console(mut self, on: bool) -> Self {
        self.instantiations2console = on;
        self
    }

    /// Write negated lemmas into `dir`, one file each.
    #[must_use]
    pub fn with_axioms2files(mut self, dir: impl Into<PathBuf>) -> Self {
        self.axioms2files = true;
        self.axioms_dir = dir.into();
        self
    }

    /// Proof options.
    #[must_use]
    pub fn with_proof(mut self, save: bool, check: bool, trim: bool) -> Self {
        self.proof_save = save;
        self.proof_check = check;
        self.proof_trim = trim;
        self
    }
}
