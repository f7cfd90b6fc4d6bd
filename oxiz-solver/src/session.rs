//! Solver session: one engine, its limits, its proof and its sinks.
//!
//! A session is created once from validated configuration and then driven
//! round by round by the outer search loop. Timeout and cancellation end the
//! session softly: the round reports [`RoundStatus::Unknown`] and every
//! later round does the same without running any heuristic. Fatal errors
//! (internal invariants, proof validation) are returned unchanged.

use crate::backup::CancelBackup;
use crate::params::SolverParams;
use crate::sinks::Sinks;
use oxiz_core::{CancellationToken, OxizError, ResourceLimits, ResourceManager, Result, Statistics};
use oxiz_nla::{
    LemmaChecker, LemmaObserver, Lemma, LinearModel, MonomialDef, MonomialTable, NlaCore,
    NlaParams, ProofFact, ProofRecorder, RoundOutcome, Row,
};
use oxiz_proof::{ProofChecker, ProofDag, ProofTrimmer, validate};
use std::fmt;
use std::io::Write;
use tracing::{debug, info, warn};

/// Why a session gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonUnknown {
    /// The time budget ran out.
    Timeout,
    /// The cancellation token was raised.
    Canceled,
}

impl ReasonUnknown {
    /// Short name reported to the caller.
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonUnknown::Timeout => "timeout",
            ReasonUnknown::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ReasonUnknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    /// Lemmas excluding the model.
    Lemmas(Vec<Lemma>),
    /// Nothing to add this round.
    NoConflict,
    /// The session stopped.
    Unknown(ReasonUnknown),
}

/// What remains of a finished session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Completed rounds.
    pub rounds: u64,
    /// Why the session stopped early, if it did.
    pub reason_unknown: Option<ReasonUnknown>,
    /// Counters.
    pub statistics: Statistics,
    /// Proof, trimmed if requested; present when proofs are saved.
    pub proof: Option<ProofDag<ProofFact>>,
}

/// A solver session.
pub struct SolverSession {
    params: SolverParams,
    core: NlaCore,
    rm: ResourceManager,
    recorder: Option<ProofRecorder>,
    sinks: Sinks,
    checker: Box<dyn ProofChecker<ProofFact> + Send>,
    last_model: Option<LinearModel>,
    reason: Option<ReasonUnknown>,
    timeouts: u64,
    cancellations: u64,
}

impl fmt::Debug for SolverSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverSession")
            .field("params", &self.params)
            .field("core", &self.core)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl SolverSession {
    /// Validate the configuration, register the monomials and rows, open the
    /// sinks and start the clock.
    pub fn new(
        params: SolverParams,
        nla: NlaParams,
        monomials: impl IntoIterator<Item = MonomialDef>,
        rows: Vec<Row>,
    ) -> Result<Self> {
        nla.validate()?;
        let table = MonomialTable::from_defs(monomials)?;
        let recorder = params.proof_save.then(|| ProofRecorder::new(&table, &rows));
        let core = NlaCore::new(nla, table, rows)?;
        let sinks = Sinks::open(&params)?;

        let mut limits = ResourceLimits::unlimited();
        if let Some(t) = params.timeout {
            limits = limits.with_time_limit(t);
        }
        let mut rm = ResourceManager::new(limits);
        rm.start();
        info!(
            timeout_ms = params.timeout.map(|t| t.as_millis() as u64),
            proof = params.proof_save,
            "solver session started"
        );
        Ok(Self {
            params,
            core,
            rm,
            recorder,
            sinks,
            checker: Box::new(LemmaChecker::new()),
            last_model: None,
            reason: None,
            timeouts: 0,
            cancellations: 0,
        })
    }

    /// Use `checker` instead of the sampling checker when the proof is checked.
    #[must_use]
    pub fn with_checker(mut self, checker: Box<dyn ProofChecker<ProofFact> + Send>) -> Self {
        self.checker = checker;
        self
    }

    /// Send console output to `out` instead of stdout.
    pub fn set_console(&mut self, out: Box<dyn Write + Send>) {
        self.sinks.set_console(out);
    }

    /// Session options.
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// The engine.
    pub fn core(&self) -> &NlaCore {
        &self.core
    }

    /// Proof recorded so far.
    pub fn proof(&self) -> Option<&ProofDag<ProofFact>> {
        self.recorder.as_ref().map(|r| r.dag())
    }

    /// Run one round against `model`.
    pub fn check_round(&mut self, model: &LinearModel) -> Result<RoundStatus> {
        if let Some(reason) = self.reason {
            return Ok(RoundStatus::Unknown(reason));
        }

        let mut observers: Vec<&mut dyn LemmaObserver> = Vec::with_capacity(2);
        if let Some(rec) = self.recorder.as_mut() {
            observers.push(rec);
        }
        observers.push(&mut self.sinks);
        let result = self.core.check(model, &mut self.rm, &mut observers);
        self.sinks.flush();

        match result {
            Ok(report) => {
                self.last_model = Some(model.clone());
                Ok(match report.outcome {
                    RoundOutcome::Lemmas => RoundStatus::Lemmas(report.lemmas),
                    RoundOutcome::NoConflict => RoundStatus::NoConflict,
                })
            }
            Err(e) => match e.root() {
                OxizError::Timeout => {
                    self.timeouts += 1;
                    self.reason = Some(ReasonUnknown::Timeout);
                    info!(elapsed_ms = self.rm.elapsed().as_millis() as u64, "session timed out");
                    Ok(RoundStatus::Unknown(ReasonUnknown::Timeout))
                }
                OxizError::Cancelled => {
                    self.cancellations += 1;
                    self.reason = Some(ReasonUnknown::Canceled);
                    info!("session canceled");
                    self.write_backup();
                    Ok(RoundStatus::Unknown(ReasonUnknown::Canceled))
                }
                _ => Err(e),
            },
        }
    }

    fn write_backup(&self) {
        let Some(path) = self.params.cancel_backup_file.as_ref() else {
            return;
        };
        let backup = CancelBackup::capture(
            self.core.budgets(),
            self.last_model.as_ref(),
            self.core.basis(),
            self.proof(),
        );
        match backup.write(path) {
            Ok(()) => info!(path = %path.display(), "cancel backup written"),
            Err(e) => warn!(path = %path.display(), error = %e, "cancel backup not written"),
        }
    }

    /// Raise the cancellation flag. The running or next round stops at its
    /// next checkpoint.
    pub fn interrupt(&self) {
        self.rm.token().cancel();
    }

    /// A handle that cancels this session from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.rm.token().clone()
    }

    /// `"timeout"` or `"canceled"` once the session stopped early.
    pub fn reason_unknown(&self) -> Option<&'static str> {
        self.reason.map(ReasonUnknown::as_str)
    }

    /// Engine and session counters.
    pub fn statistics(&self) -> Statistics {
        let mut stats = self.core.statistics();
        stats.set("solver.timeouts", self.timeouts);
        stats.set("solver.cancellations", self.cancellations);
        if let Some(dag) = self.proof() {
            stats.set("proof.nodes", dag.len() as u64);
        }
        stats
    }

    /// End the session: trim and check the proof as configured.
    ///
    /// A proof that fails to check is an error; it is never reported as a
    /// normal summary.
    pub fn finish(mut self) -> Result<SessionSummary> {
        self.sinks.flush();
        let mut statistics = self.statistics();
        let proof = match self.recorder.take() {
            None => None,
            Some(rec) => {
                let mut dag = rec.into_dag();
                if self.params.proof_trim {
                    let mut trimmer = ProofTrimmer::new();
                    dag = trimmer.trim(&dag);
                    let ts = trimmer.stats();
                    debug!(before = ts.original_size, after = ts.final_size, "proof trimmed");
                    statistics.set("proof.trimmed_nodes", dag.len() as u64);
                }
                if self.params.proof_check {
                    validate(&dag, self.checker.as_ref())?;
                    info!(nodes = dag.len(), "proof checked");
                }
                Some(dag)
            }
        };
        Ok(SessionSummary {
            rounds: self.core.budgets().rounds,
            reason_unknown: self.reason,
            statistics,
            proof,
        })
    }
}
