//! Property-based tests for interval enclosures

use num_bigint::BigInt;
use num_rational::BigRational;
use oxiz_math::horner::HornerForm;
use oxiz_math::interval::Interval;
use oxiz_math::polynomial::*;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// A box `[lo, lo + w]` together with a point inside it.
fn boxed_point() -> impl Strategy<Value = (i64, i64, i64)> {
    (-6i64..6, 0i64..6).prop_flat_map(|(lo, w)| (Just(lo), Just(w), lo..=lo + w))
}

proptest! {
    #[test]
    fn interval_mul_encloses_products((l1, w1, a) in boxed_point(), (l2, w2, b) in boxed_point()) {
        let x = Interval::new(Some(rat(l1)), Some(rat(l1 + w1)));
        let y = Interval::new(Some(rat(l2)), Some(rat(l2 + w2)));
        prop_assert!(x.mul(&y).contains(&rat(a * b)));
        prop_assert!(x.add(&y).contains(&rat(a + b)));
        prop_assert!(x.sub(&y).contains(&rat(a - b)));
    }

    #[test]
    fn interval_pow_encloses((l, w, a) in boxed_point(), n in 1u32..4) {
        let x = Interval::new(Some(rat(l)), Some(rat(l + w)));
        prop_assert!(x.pow(n).contains(&rat(a.pow(n))));
    }

    #[test]
    fn horner_encloses_value(
        c0 in -5i64..5, c1 in -5i64..5, c2 in -5i64..5,
        (l0, w0, x) in boxed_point(), (l1, w1, y) in boxed_point(),
    ) {
        // c0*x^2*y + c1*x*y + c2*x - 7
        let p = Polynomial::from_coeffs_int(&[
            (c0, &[(0, 2), (1, 1)]),
            (c1, &[(0, 1), (1, 1)]),
            (c2, &[(0, 1)]),
            (-7, &[]),
        ]);
        let bounds = |v: Var| match v {
            0 => Interval::new(Some(rat(l0)), Some(rat(l0 + w0))),
            _ => Interval::new(Some(rat(l1)), Some(rat(l1 + w1))),
        };
        let mut env = FxHashMap::default();
        env.insert(0, rat(x));
        env.insert(1, rat(y));
        let value = p.eval(&env).unwrap();
        prop_assert!(HornerForm::build(&p).eval(&bounds).contains(&value));
    }
}
