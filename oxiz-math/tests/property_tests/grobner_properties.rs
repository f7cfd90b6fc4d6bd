//! Property-based tests for budgeted Gröbner saturation

use oxiz_math::grobner::{BudgetedBuchberger, Equation, GrobnerConfig};
use oxiz_math::polynomial::Polynomial;
use proptest::prelude::*;

fn generators(cs: &[i64]) -> Vec<Equation<u32>> {
    vec![
        Equation::new(Polynomial::from_coeffs_int(&[(1, &[(0, 1), (1, 1)]), (cs[0], &[])]), [0]),
        Equation::new(Polynomial::from_coeffs_int(&[(1, &[(1, 2)]), (cs[1], &[(0, 1)])]), [1]),
        Equation::new(Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (cs[2], &[(2, 1)]), (cs[3], &[])]), [2]),
    ]
}

proptest! {
    #[test]
    fn saturation_respects_quotas(
        cs in prop::collection::vec(-4i64..4, 4),
        steps in 0u32..6,
        eqs in 0u32..4,
    ) {
        let config = GrobnerConfig::default()
            .with_max_steps(steps)
            .with_max_new_equations(eqs);
        let mut engine = BudgetedBuchberger::new(config);
        let sat = engine.saturate(generators(&cs), |_| false, || Ok(())).unwrap();
        let stats = engine.stats();
        prop_assert!(stats.steps <= u64::from(steps));
        prop_assert!(stats.equations_added <= u64::from(eqs));
        prop_assert!(sat.conflicts.len() <= 1);
        for c in &sat.conflicts {
            prop_assert!(!c.deps.is_empty());
        }
    }

    #[test]
    fn saturation_is_deterministic(cs in prop::collection::vec(-4i64..4, 4)) {
        let run = || {
            let mut engine = BudgetedBuchberger::new(GrobnerConfig::default());
            let sat = engine.saturate(generators(&cs), |_| false, || Ok(())).unwrap();
            (sat.basis, sat.conflicts, engine.stats().clone())
        };
        prop_assert_eq!(run(), run());
    }
}
