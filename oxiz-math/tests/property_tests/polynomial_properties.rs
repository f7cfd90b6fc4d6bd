//! Property-based tests for polynomial operations

use num_bigint::BigInt;
use num_rational::BigRational;
use oxiz_math::polynomial::*;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

fn coeff_strategy() -> impl Strategy<Value = i64> {
    -10i64..10i64
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// a*x0*x1 + b*x0 + c*x2 + d
fn sample(a: i64, b: i64, c: i64, d: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[(a, &[(0, 1), (1, 1)]), (b, &[(0, 1)]), (c, &[(2, 1)]), (d, &[])])
}

fn env(x: i64, y: i64, z: i64) -> FxHashMap<Var, BigRational> {
    let mut m = FxHashMap::default();
    m.insert(0, rat(x));
    m.insert(1, rat(y));
    m.insert(2, rat(z));
    m
}

proptest! {
    #[test]
    fn poly_add_commutative(a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy(), d in coeff_strategy()) {
        let p = sample(a, b, c, d);
        let q = sample(d, c, b, a);
        prop_assert_eq!(&p + &q, &q + &p);
    }

    #[test]
    fn poly_sub_self_is_zero(a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy(), d in coeff_strategy()) {
        let p = sample(a, b, c, d);
        prop_assert!((&p - &p).is_zero());
    }

    #[test]
    fn eval_is_ring_homomorphism(
        a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy(), d in coeff_strategy(),
        x in -5i64..5, y in -5i64..5, z in -5i64..5,
    ) {
        let p = sample(a, b, c, d);
        let q = sample(b, d, a, c);
        let e = env(x, y, z);
        let pv = p.eval(&e).unwrap();
        let qv = q.eval(&e).unwrap();
        prop_assert_eq!((&p * &q).eval(&e).unwrap(), &pv * &qv);
        prop_assert_eq!((&p + &q).eval(&e).unwrap(), pv + qv);
    }

    #[test]
    fn substitute_matches_eval(
        a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy(), d in coeff_strategy(),
        x in -5i64..5, y in -5i64..5, z in -5i64..5,
    ) {
        // replacing x2 by x0*x1 and evaluating equals evaluating with x2 := x*y
        let p = sample(a, b, c, d);
        let prod = Polynomial::from_monomial(Monomial::from_factors(&[0, 1]));
        let expanded = p.substitute(2, &prod);
        prop_assert_eq!(expanded.eval(&env(x, y, 0)), p.eval(&env(x, y, x * y)));
    }

    #[test]
    fn make_monic_has_unit_leading_coeff(a in 1i64..10, b in coeff_strategy()) {
        let p = Polynomial::from_coeffs_int(&[(a, &[(0, 2)]), (b, &[(1, 1)])]);
        prop_assert_eq!(p.make_monic().leading_coeff(), rat(1));
    }
}
