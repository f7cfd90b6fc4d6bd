//! Observability sinks: SMT-LIB transcript, console and per-lemma files.
//!
//! Sinks only watch. A write failure is logged and disables the failing
//! sink; it never reaches the round that triggered it.

use crate::params::SolverParams;
use oxiz_core::{Result, ResultExt};
use oxiz_nla::{HeuristicId, Lemma, LemmaObserver};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Append-only SMT-LIB transcript.
#[derive(Debug)]
struct Transcript {
    path: PathBuf,
    out: BufWriter<File>,
}

/// All sinks of a session.
pub struct Sinks {
    transcript: Option<Transcript>,
    console: Option<Box<dyn Write + Send>>,
    lemmas2console: bool,
    instantiations2console: bool,
    axioms_dir: Option<PathBuf>,
    axiom_count: u64,
}

impl std::fmt::Debug for Sinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks")
            .field("transcript", &self.transcript.as_ref().map(|t| &t.path))
            .field("lemmas2console", &self.lemmas2console)
            .field("instantiations2console", &self.instantiations2console)
            .field("axioms_dir", &self.axioms_dir)
            .finish()
    }
}

impl Sinks {
    /// Open the sinks `params` asks for. The console defaults to stdout.
    pub fn open(params: &SolverParams) -> Result<Self> {
        let transcript = match &params.smtlib2_log {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening smtlib2 log {}", path.display()))?;
                Some(Transcript {
                    path: path.clone(),
                    out: BufWriter::new(file),
                })
            }
            None => None,
        };
        let console: Option<Box<dyn Write + Send>> = (params.lemmas2console || params.instantiations2console)
            .then(|| Box::new(io::stdout()) as Box<dyn Write + Send>);
        Ok(Self {
            transcript,
            console,
            lemmas2console: params.lemmas2console,
            instantiations2console: params.instantiations2console,
            axioms_dir: params.axioms2files.then(|| params.axioms_dir.clone()),
            axiom_count: 0,
        })
    }

    /// Replace the console writer.
    pub fn set_console(&mut self, console: Box<dyn Write + Send>) {
        self.console = Some(console);
    }

    /// Flush buffered output.
    pub fn flush(&mut self) {
        if let Some(t) = self.transcript.as_mut()
            && let Err(e) = t.out.flush()
        {
            warn!(path = %t.path.display(), error = %e, "smtlib2 log flush failed");
        }
        if let Some(c) = self.console.as_mut()
            && let Err(e) = c.flush()
        {
            warn!(error = %e, "console sink disabled after flush failure");
            self.console = None;
        }
    }

    fn transcript_line(&mut self, line: &str) {
        let Some(t) = self.transcript.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(t.out, "{}", line) {
            warn!(path = %t.path.display(), error = %e, "smtlib2 log disabled after write failure");
            self.transcript = None;
        }
    }

    fn console_line(&mut self, line: &str) {
        let Some(c) = self.console.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(c, "{}", line) {
            warn!(error = %e, "console sink disabled after write failure");
            self.console = None;
        }
    }

    fn axiom_file(&mut self, round: u64, lemma: &Lemma) {
        let Some(dir) = self.axioms_dir.as_ref() else {
            return;
        };
        let path = dir.join(format!("lemma_{}_{}.smt2", round, self.axiom_count));
        self.axiom_count += 1;
        if let Err(e) = write_axiom(&path, lemma) {
            warn!(error = %e, "axiom file not written");
        }
    }
}

/// Declarations, the negated lemma and a `check-sat`: the file is
/// unsatisfiable exactly when the lemma is valid over the reals.
fn write_axiom(path: &Path, lemma: &Lemma) -> Result<()> {
    let mut text = String::new();
    for v in lemma.vars() {
        text.push_str(&format!("(declare-fun x{} () Real)\n", v));
    }
    text.push_str(&format!("; {}\n", lemma.origin()));
    text.push_str(&format!("(assert (not {}))\n", lemma.to_smt2()));
    text.push_str("(check-sat)\n");
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

impl LemmaObserver for Sinks {
    fn on_round_start(&mut self, round: u64) -> Result<()> {
        self.axiom_count = 0;
        self.transcript_line(&format!("; round {}", round));
        Ok(())
    }

    fn on_invocation(&mut self, round: u64, heuristic: HeuristicId) -> Result<()> {
        if self.instantiations2console {
            self.console_line(&format!("[nla] round {} invoke {}", round, heuristic));
        }
        Ok(())
    }

    fn on_lemma(&mut self, round: u64, lemma: &mut Lemma) -> Result<()> {
        self.transcript_line(&format!("(assert-lemma {}) ; {}", lemma.to_smt2(), lemma.origin()));
        if self.lemmas2console {
            self.console_line(&format!("[nla] round {} lemma {}", round, lemma));
        }
        self.axiom_file(round, lemma);
        Ok(())
    }
}
