//! Round scheduler.
//!
//! A round runs the heuristics in fixed priority order and stops at the
//! first stage that produces lemmas:
//!
//! ```text
//!   detect ──none──> NoConflict
//!     │
//!     ▼
//!   Order ─> Tangent ─> Horner (every horner_frequency rounds) ─> Grobner (gr_q)
//!     │         │          │                                        │
//!     └─────────┴──────────┴────────── lemmas ──────────────────────┴──> Lemmas
//! ```
//!
//! The resource manager is polled before every stage and inside each
//! heuristic. A timeout or cancellation propagates as an error; the round
//! is then abandoned without being counted.

use crate::budget::Budgets;
use crate::context::RoundContext;
use crate::detector::violated_monomials;
use crate::grobner::{BasisSnapshot, GrobnerLemmas};
use crate::horner::HornerLemmas;
use crate::lemma::{HeuristicId, Lemma};
use crate::model::LinearModel;
use crate::monomial::MonomialTable;
use crate::observer::LemmaObserver;
use crate::order::OrderLemmas;
use crate::params::NlaParams;
use crate::row::Row;
use crate::tangent::TangentLemmas;
use oxiz_core::{OxizError, ResourceManager, Result, Statistics};
use tracing::{debug, info};

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Some stage produced lemmas.
    Lemmas,
    /// No stage produced anything, or the model was already consistent.
    NoConflict,
}

/// One heuristic invocation within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRecord {
    /// Heuristic that ran.
    pub heuristic: HeuristicId,
    /// Lemmas it produced.
    pub lemmas: usize,
}

/// Result of [`NlaCore::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// Index of this round.
    pub round_index: u64,
    /// Stages in the order they ran.
    pub stages: Vec<StageRecord>,
    /// Lemmas of the last stage that ran.
    pub lemmas: Vec<Lemma>,
    /// Outcome.
    pub outcome: RoundOutcome,
}

impl RoundReport {
    /// Heuristics in invocation order.
    pub fn invocation_sequence(&self) -> Vec<HeuristicId> {
        self.stages.iter().map(|s| s.heuristic).collect()
    }
}

/// The lemma engine of one session.
#[derive(Debug)]
pub struct NlaCore {
    params: NlaParams,
    table: MonomialTable,
    rows: Vec<Row>,
    budgets: Budgets,
    order: OrderLemmas,
    tangent: TangentLemmas,
    horner: HornerLemmas,
    grobner: GrobnerLemmas,
}

impl NlaCore {
    /// Create an engine over fixed definitions and rows.
    ///
    /// Rows are kept sorted by id; duplicate ids are rejected.
    pub fn new(params: NlaParams, table: MonomialTable, mut rows: Vec<Row>) -> Result<Self> {
        params.validate()?;
        rows.sort_by_key(|r| r.id());
        if let Some(w) = rows.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(OxizError::config(
                "nla",
                "rows",
                format!("duplicate row id {}", w[0].id()),
            ));
        }
        info!(
            monomials = table.len(),
            rows = rows.len(),
            "nla engine created"
        );
        Ok(Self {
            params,
            table,
            rows,
            budgets: Budgets::new(),
            order: OrderLemmas::new(),
            tangent: TangentLemmas::new(),
            horner: HornerLemmas::new(),
            grobner: GrobnerLemmas::new(),
        })
    }

    /// Configuration.
    pub fn params(&self) -> &NlaParams {
        &self.params
    }

    /// Monomial definitions.
    pub fn table(&self) -> &MonomialTable {
        &self.table
    }

    /// Rows, sorted by id.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Budget counters.
    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    /// Last committed Gröbner basis.
    pub fn basis(&self) -> &BasisSnapshot {
        self.grobner.snapshot()
    }

    /// Run one round against `model`.
    pub fn check(
        &mut self,
        model: &LinearModel,
        rm: &mut ResourceManager,
        observers: &mut [&mut dyn LemmaObserver],
    ) -> Result<RoundReport> {
        self.budgets.start_round();
        let round_index = self.budgets.round_index;
        rm.checkpoint()?;
        debug!(round = round_index, "nla round start");
        for o in observers.iter_mut() {
            o.on_round_start(round_index)?;
        }

        let violations = violated_monomials(&self.table, &model.assignment)?;
        if violations.is_empty() {
            self.budgets.finish_round();
            debug!(round = round_index, "model is consistent");
            return Ok(RoundReport {
                round_index,
                stages: Vec::new(),
                lemmas: Vec::new(),
                outcome: RoundOutcome::NoConflict,
            });
        }

        let ctx = RoundContext {
            round_index,
            table: &self.table,
            rows: &self.rows,
            model,
            violations: &violations,
        };
        let mut stages = Vec::new();
        let mut lemmas = Vec::new();
        for id in HeuristicId::ALL {
            if !self.stage_enabled(id) {
                continue;
            }
            rm.checkpoint()?;
            debug!(round = round_index, stage = %id, "stage");
            for o in observers.iter_mut() {
                o.on_invocation(round_index, id)?;
            }
            let produced = match id {
                HeuristicId::Order => self.order.run(&ctx, rm)?,
                HeuristicId::Tangent => self.tangent.run(&ctx, rm)?,
                HeuristicId::Horner => self.horner.run(&ctx, &self.params, rm)?,
                HeuristicId::Grobner => {
                    let run = self.grobner.run(&ctx, &self.params, rm)?;
                    self.budgets.record_grobner(run.steps, run.equations_added);
                    run.lemmas
                }
            };
            self.budgets.record(id, produced.len());
            stages.push(StageRecord {
                heuristic: id,
                lemmas: produced.len(),
            });
            if !produced.is_empty() {
                lemmas = produced;
                break;
            }
        }

        for lemma in &mut lemmas {
            for o in observers.iter_mut() {
                o.on_lemma(round_index, lemma)?;
            }
        }
        self.budgets.finish_round();

        let outcome = if lemmas.is_empty() {
            RoundOutcome::NoConflict
        } else {
            RoundOutcome::Lemmas
        };
        debug!(
            round = round_index,
            violations = violations.len(),
            stages = stages.len(),
            lemmas = lemmas.len(),
            "nla round end"
        );
        Ok(RoundReport {
            round_index,
            stages,
            lemmas,
            outcome,
        })
    }

    fn stage_enabled(&self, id: HeuristicId) -> bool {
        let p = &self.params;
        match id {
            HeuristicId::Order => p.order,
            HeuristicId::Tangent => p.tangents,
            HeuristicId::Horner => p.horner && self.budgets.horner_due(p.horner_frequency),
            HeuristicId::Grobner => p.grobner && p.gr_q > 0 && self.budgets.grobner_available(p.gr_q),
        }
    }

    /// Engine counters.
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::new();
        self.budgets.collect(&mut stats);
        let order = self.order.stats();
        stats.set("nla.order.zero", order.zero_lemmas);
        stats.set("nla.order.sign", order.sign_lemmas);
        stats.set("nla.order.monotonicity", order.monotonicity_lemmas);
        let tangent = self.tangent.stats();
        stats.set("nla.tangent.corner_planes", tangent.corner_planes);
        stats.set("nla.tangent.point_planes", tangent.point_planes);
        stats.set("nla.tangent.square_cuts", tangent.square_cuts);
        let horner = self.horner.stats();
        stats.set("nla.horner.rows_examined", horner.rows_examined);
        stats.set("nla.horner.rows_skipped", horner.rows_skipped);
        let grobner = self.grobner.stats();
        stats.set("nla.grobner.simplifications", grobner.simplifications);
        stats.set("nla.grobner.equations_added", grobner.equations_added);
        stats.set("nla.grobner.conflicts", grobner.conflicts);
        stats.set("nla.grobner.interrupted", grobner.interrupted);
        stats
    }
}
