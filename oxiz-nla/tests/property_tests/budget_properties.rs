//! Quotas and frequencies are respected.

use super::system_strategy;
use oxiz_core::{ResourceLimits, ResourceManager};
use oxiz_nla::{HeuristicId, NlaCore, NlaParams};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn grobner_stays_within_quota(system in system_strategy(), gr_q in 0u32..=4, growth in 1u32..=3) {
        let params = NlaParams::default()
            .with_order(false)
            .with_tangents(false)
            .with_horner(false)
            .with_gr_q(gr_q)
            .with_grobner_eqs_growth(growth);
        let mut core = NlaCore::new(params, system.table.clone(), system.rows.clone()).unwrap();
        for _ in 0..3 {
            let mut rm = ResourceManager::new(ResourceLimits::unlimited());
            core.check(&system.model, &mut rm, &mut []).unwrap();
            prop_assert!(core.budgets().round.grobner_steps <= u64::from(gr_q));
            prop_assert!(core.budgets().round.grobner_equations <= u64::from(growth));
        }
        if gr_q == 0 {
            prop_assert_eq!(core.budgets().counters(HeuristicId::Grobner).invocations, 0);
        }
    }

    #[test]
    fn horner_runs_only_on_due_rounds(system in system_strategy(), freq in 1u32..=4) {
        let params = NlaParams::default()
            .with_order(false)
            .with_tangents(false)
            .with_grobner(false)
            .with_horner_frequency(freq);
        let mut core = NlaCore::new(params, system.table.clone(), system.rows.clone()).unwrap();
        for _ in 0..6 {
            let mut rm = ResourceManager::new(ResourceLimits::unlimited());
            let report = core.check(&system.model, &mut rm, &mut []).unwrap();
            if report.invocation_sequence().contains(&HeuristicId::Horner) {
                prop_assert!(report.round_index.is_multiple_of(u64::from(freq)));
            }
        }
    }
}
