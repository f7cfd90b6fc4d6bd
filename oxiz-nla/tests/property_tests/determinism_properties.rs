//! Identical input gives identical rounds.

use super::system_strategy;
use oxiz_core::{ResourceLimits, ResourceManager};
use oxiz_nla::{NlaCore, NlaParams, RoundReport};
use proptest::prelude::*;

fn run(system: &super::System, rounds: usize) -> Vec<RoundReport> {
    let params = NlaParams::default().with_horner_frequency(2);
    let mut core = NlaCore::new(params, system.table.clone(), system.rows.clone()).unwrap();
    (0..rounds)
        .map(|_| {
            let mut rm = ResourceManager::new(ResourceLimits::unlimited());
            core.check(&system.model, &mut rm, &mut []).unwrap()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn repeated_runs_agree(system in system_strategy()) {
        let first = run(&system, 4);
        let second = run(&system, 4);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn invocation_order_is_fixed(system in system_strategy()) {
        for report in run(&system, 3) {
            let seq = report.invocation_sequence();
            prop_assert!(seq.windows(2).all(|w| w[0] < w[1]));
            // only the last stage may have produced lemmas
            if let Some((last, rest)) = report.stages.split_last() {
                prop_assert!(rest.iter().all(|s| s.lemmas == 0));
                prop_assert_eq!(last.lemmas, report.lemmas.len());
            }
        }
    }
}
