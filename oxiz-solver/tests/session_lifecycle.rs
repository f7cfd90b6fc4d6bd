//! Session lifecycle: proofs, limits, cancel backups and sinks.

use num_rational::BigRational;
use oxiz_core::{OxizError, Params};
use oxiz_math::Polynomial;
use oxiz_nla::{
    Assignment, LinearModel, MonomialDef, NlaParams, ProofFact, Relation, Row, RowId, VarBounds,
};
use oxiz_proof::{ProofCheckResult, ProofChecker, ProofDag, ProofNode};
use oxiz_solver::{ReasonUnknown, RoundStatus, SolverParams, SolverSession};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(n.into())
}

/// x2 = x0*x1 with x0 fixed to 2, x2 = 6, relaxation picks x1 = 2.
fn inputs() -> (Vec<MonomialDef>, Vec<Row>, LinearModel) {
    let rows = vec![
        Row::new(RowId(0), Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (-6, &[])]), Relation::Eq).unwrap(),
        Row::new(RowId(1), Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-2, &[])]), Relation::Eq).unwrap(),
    ];
    let mut a = Assignment::new();
    a.set_int(0, 2).set_int(1, 2).set_int(2, 6);
    let mut b = VarBounds::new();
    b.fix(0, rat(2));
    (vec![MonomialDef::new(2, &[0, 1])], rows, LinearModel::new(a).with_bounds(b))
}

fn session(params: SolverParams) -> (SolverSession, LinearModel) {
    let (defs, rows, model) = inputs();
    (SolverSession::new(params, NlaParams::default(), defs, rows).unwrap(), model)
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Vec<u8>>>);

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct RejectAll;

impl ProofChecker<ProofFact> for RejectAll {
    fn check_step(&self, node: &ProofNode<ProofFact>, _dag: &ProofDag<ProofFact>) -> ProofCheckResult {
        ProofCheckResult::Invalid {
            node: node.id,
            reason: "rejected".to_string(),
        }
    }
}

#[test]
fn test_proof_save_check_trim() {
    let (mut s, model) = session(SolverParams::default().with_proof(true, true, false));
    for _ in 0..2 {
        assert!(matches!(s.check_round(&model).unwrap(), RoundStatus::Lemmas(_)));
    }
    let full = s.finish().unwrap().proof.unwrap();
    // two assumptions for rows, one for the definition, two lemmas
    assert_eq!(full.len(), 5);

    let (mut s, model) = session(SolverParams::default().with_proof(true, true, true));
    for _ in 0..2 {
        s.check_round(&model).unwrap();
    }
    let summary = s.finish().unwrap();
    let trimmed = summary.proof.unwrap();
    // the repeated lemma and both unused rows are gone
    assert_eq!(trimmed.len(), 2);
    assert!(trimmed.nodes().iter().all(|n| full.get(n.id) == Some(n)));
    assert_eq!(summary.statistics.get("proof.trimmed_nodes"), 2);
}

#[test]
fn test_proof_validation_failure_is_fatal() {
    let (s, model) = session(SolverParams::default().with_proof(true, true, false));
    let mut s = s.with_checker(Box::new(RejectAll));
    s.check_round(&model).unwrap();
    let err = s.finish().unwrap_err();
    assert!(matches!(err, OxizError::ProofValidation(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_check_without_save_has_no_effect() {
    let (s, model) = session(SolverParams::default().with_proof(false, true, true));
    let mut s = s.with_checker(Box::new(RejectAll));
    s.check_round(&model).unwrap();
    assert!(s.finish().unwrap().proof.is_none());
}

#[test]
fn test_zero_timeout_from_params() {
    let mut p = Params::new();
    p.set_uint("timeout", 0);
    let (mut s, model) = session(SolverParams::from_params(&p).unwrap());
    assert_eq!(s.check_round(&model).unwrap(), RoundStatus::Unknown(ReasonUnknown::Timeout));
    assert_eq!(s.statistics().get("nla.order.invocations"), 0);
    let summary = s.finish().unwrap();
    assert_eq!(summary.rounds, 0);
    assert_eq!(summary.reason_unknown, Some(ReasonUnknown::Timeout));
}

#[test]
fn test_cancel_writes_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");
    let params = SolverParams::default()
        .with_proof(true, false, false)
        .with_cancel_backup_file(&path);
    let (mut s, model) = session(params);

    assert!(matches!(s.check_round(&model).unwrap(), RoundStatus::Lemmas(_)));
    let token = s.cancellation_token();
    std::thread::spawn(move || token.cancel()).join().unwrap();
    assert_eq!(s.check_round(&model).unwrap(), RoundStatus::Unknown(ReasonUnknown::Canceled));
    assert_eq!(s.check_round(&model).unwrap(), RoundStatus::Unknown(ReasonUnknown::Canceled));

    let text = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["round_index"], 1);
    assert_eq!(json["budgets"]["rounds"], 1);
    assert!(json["last_model"]["values"]["1"].is_array());
    assert_eq!(json["proof"]["nodes"].as_array().map(|n| n.len()), Some(4));
    assert_eq!(s.statistics().get("solver.cancellations"), 1);
}

#[test]
fn test_unwritable_backup_still_reports_canceled() {
    let dir = tempfile::tempdir().unwrap();
    let params = SolverParams::default().with_cancel_backup_file(dir.path().join("no/such/backup.json"));
    let (mut s, model) = session(params);
    s.interrupt();
    assert_eq!(s.check_round(&model).unwrap(), RoundStatus::Unknown(ReasonUnknown::Canceled));
    assert_eq!(s.reason_unknown(), Some("canceled"));
}

#[test]
fn test_sinks_follow_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("nla.smt2");
    let params = SolverParams::default()
        .with_smtlib2_log(&log)
        .with_lemmas2console(true)
        .with_instantiations2console(true);
    let (mut s, model) = session(params);
    let console = Shared::default();
    s.set_console(Box::new(console.clone()));

    s.check_round(&model).unwrap();
    let mut consistent = model.clone();
    consistent.assignment.set_int(2, 4);
    assert_eq!(s.check_round(&consistent).unwrap(), RoundStatus::NoConflict);
    drop(s);

    let transcript = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = transcript.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "; round 0");
    assert!(lines[1].starts_with("(assert-lemma "));
    assert_eq!(lines[2], "; round 1");

    let out = String::from_utf8(console.0.lock().unwrap().clone()).unwrap();
    let out: Vec<&str> = out.lines().collect();
    assert_eq!(out[0], "[nla] round 0 invoke order");
    assert!(out[1].starts_with("[nla] round 0 lemma [order] "));
    assert_eq!(out.len(), 2);
}

#[test]
fn test_timed_out_round_leaves_no_transcript_marker() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("nla.smt2");
    let params = SolverParams::default()
        .with_smtlib2_log(&log)
        .with_timeout(Some(Duration::ZERO));
    let (mut s, model) = session(params);
    assert_eq!(s.check_round(&model).unwrap(), RoundStatus::Unknown(ReasonUnknown::Timeout));
    drop(s);
    assert_eq!(std::fs::read_to_string(&log).unwrap(), "");
}

#[test]
fn test_sessions_on_separate_threads() {
    let handles: Vec<_> = (0..2)
        .map(|_| {
            std::thread::spawn(|| {
                let (mut s, model) = session(SolverParams::default());
                match s.check_round(&model).unwrap() {
                    RoundStatus::Lemmas(lemmas) => lemmas,
                    other => panic!("unexpected {:?}", other),
                }
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results[0], results[1]);
}
