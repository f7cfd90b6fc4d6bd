//! Session and per-round budget counters.

use crate::lemma::HeuristicId;
use oxiz_core::Statistics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters of one heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicCounters {
    /// Times the heuristic ran.
    pub invocations: u64,
    /// Lemmas it produced.
    pub lemmas: u64,
}

/// Counters reset at every round boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCounters {
    /// Stages that ran this round.
    pub stages: u32,
    /// Lemmas produced this round.
    pub lemmas: u64,
    /// Gröbner reduction steps this round.
    pub grobner_steps: u64,
    /// Equations added to the basis this round.
    pub grobner_equations: u64,
}

/// Budget state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    /// Index of the current (or next) round.
    pub round_index: u64,
    /// Completed rounds.
    pub rounds: u64,
    /// Per-heuristic counters.
    pub heuristics: BTreeMap<HeuristicId, HeuristicCounters>,
    /// Total Gröbner reduction steps.
    pub grobner_steps: u64,
    /// Current round.
    pub round: RoundCounters,
}

impl Budgets {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the per-round counters.
    pub fn start_round(&mut self) {
        self.round = RoundCounters::default();
    }

    /// Close the current round and advance the round index.
    pub fn finish_round(&mut self) {
        self.rounds += 1;
        self.round_index += 1;
    }

    /// Record that `id` ran and produced `lemmas` lemmas.
    pub fn record(&mut self, id: HeuristicId, lemmas: usize) {
        let c = self.heuristics.entry(id).or_default();
        c.invocations += 1;
        c.lemmas += lemmas as u64;
        self.round.stages += 1;
        self.round.lemmas += lemmas as u64;
    }

    /// Record Gröbner work.
    pub fn record_grobner(&mut self, steps: u64, equations: u64) {
        self.grobner_steps += steps;
        self.round.grobner_steps += steps;
        self.round.grobner_equations += equations;
    }

    /// Counters of `id`.
    pub fn counters(&self, id: HeuristicId) -> HeuristicCounters {
        self.heuristics.get(&id).copied().unwrap_or_default()
    }

    /// Whether Horner is due this round.
    pub fn horner_due(&self, frequency: u32) -> bool {
        self.round_index.is_multiple_of(u64::from(frequency.max(1)))
    }

    /// Whether the Gröbner quota leaves room for another invocation this round.
    pub fn grobner_available(&self, quota: u32) -> bool {
        self.round.grobner_steps < u64::from(quota)
    }

    /// Export into `stats`.
    pub fn collect(&self, stats: &mut Statistics) {
        stats.set("nla.rounds", self.rounds);
        for (id, c) in &self.heuristics {
            stats.set(&format!("nla.{}.invocations", id), c.invocations);
            stats.set(&format!("nla.{}.lemmas", id), c.lemmas);
        }
        stats.set("nla.grobner.steps", self.grobner_steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horner_frequency() {
        let mut b = Budgets::new();
        let due: Vec<bool> = (0..9)
            .map(|_| {
                let d = b.horner_due(4);
                b.finish_round();
                d
            })
            .collect();
        assert_eq!(due, vec![true, false, false, false, true, false, false, false, true]);
    }

    #[test]
    fn test_round_counters_reset() {
        let mut b = Budgets::new();
        b.start_round();
        b.record(HeuristicId::Grobner, 1);
        b.record_grobner(3, 2);
        assert!(!b.grobner_available(3));
        b.finish_round();
        b.start_round();
        assert!(b.grobner_available(3));
        assert!(!b.grobner_available(0));
        assert_eq!(b.grobner_steps, 3);
        assert_eq!(b.counters(HeuristicId::Grobner).lemmas, 1);
        assert_eq!(b.round_index, 1);
    }

    #[test]
    fn test_collect() {
        let mut b = Budgets::new();
        b.record(HeuristicId::Order, 2);
        b.finish_round();
        let mut s = Statistics::new();
        b.collect(&mut s);
        assert_eq!(s.get("nla.order.lemmas"), 2);
        assert_eq!(s.get("nla.rounds"), 1);
    }
}
