//! Emitted lemmas hold under the product semantics and exclude the model.

use super::{sample_points, system_strategy};
use oxiz_core::{ResourceLimits, ResourceManager};
use oxiz_nla::{NlaCore, NlaParams};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lemmas_are_valid(system in system_strategy(), horner_frequency in 1u32..=2) {
        let params = NlaParams::default().with_horner_frequency(horner_frequency);
        let mut core = NlaCore::new(params, system.table.clone(), system.rows.clone()).unwrap();
        let points = sample_points();
        for _ in 0..3 {
            let mut rm = ResourceManager::new(ResourceLimits::unlimited());
            let report = core.check(&system.model, &mut rm, &mut []).unwrap();
            for lemma in &report.lemmas {
                prop_assert!(lemma.is_false_under(&system.model.assignment).unwrap(), "{} holds in the model", lemma);
                for p in &points {
                    prop_assert!(lemma.holds_true(&system.table, p).unwrap(), "{} fails at {:?}", lemma, p.to_sorted());
                }
            }
        }
    }

    #[test]
    fn each_stage_alone_is_sound(system in system_strategy(), stage in 0usize..4) {
        let params = NlaParams::default()
            .with_order(stage == 0)
            .with_tangents(stage == 1)
            .with_horner(stage == 2)
            .with_horner_frequency(1)
            .with_grobner(stage == 3);
        let mut core = NlaCore::new(params, system.table.clone(), system.rows.clone()).unwrap();
        let mut rm = ResourceManager::new(ResourceLimits::unlimited());
        let report = core.check(&system.model, &mut rm, &mut []).unwrap();
        prop_assert!(report.stages.len() <= 1);
        for lemma in &report.lemmas {
            for p in &sample_points() {
                prop_assert!(lemma.holds_true(&system.table, p).unwrap(), "{} fails at {:?}", lemma, p.to_sorted());
            }
        }
    }
}
