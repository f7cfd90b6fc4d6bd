//! Property-based tests for oxiz-nla
//!
//! Every property builds a small random system over two base variables
//! `x0`, `x1` with the products `x2 = x0*x1` and `x3 = x0*x0`, and drives
//! it through `NlaCore`.

mod budget_properties;
mod determinism_properties;
mod soundness_properties;

use num_rational::BigRational;
use oxiz_math::Polynomial;
use oxiz_nla::{Assignment, LinearModel, MonomialDef, MonomialTable, Relation, Row, RowId, VarBounds};
use proptest::prelude::*;

/// Random input of one round.
#[derive(Debug, Clone)]
pub struct System {
    pub table: MonomialTable,
    pub rows: Vec<Row>,
    pub model: LinearModel,
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(n.into())
}

fn bounds_strategy() -> impl Strategy<Value = Option<(i64, i64)>> {
    prop::option::of((-3i64..=1, 0i64..=3).prop_map(|(lo, width)| (lo, lo + width)))
}

/// Systems with two equality rows and optional bounds on the base variables.
pub fn system_strategy() -> impl Strategy<Value = System> {
    (
        prop::array::uniform4(-4i64..=4),
        bounds_strategy(),
        bounds_strategy(),
        -6i64..=6,
        -3i64..=3,
    )
        .prop_map(|(values, b0, b1, c, d)| {
            let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1]), MonomialDef::new(3, &[0, 0])])
                .expect("valid definitions");
            let rows = vec![
                Row::new(
                    RowId(0),
                    Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (1, &[(3, 1)]), (-c, &[])]),
                    Relation::Eq,
                )
                .expect("linear row"),
                Row::new(RowId(1), Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-d, &[])]), Relation::Eq)
                    .expect("linear row"),
            ];

            let mut assignment = Assignment::new();
            for (var, v) in values.iter().enumerate() {
                assignment.set_int(var as u32, *v);
            }
            let mut bounds = VarBounds::new();
            for (var, b) in [(0u32, b0), (1u32, b1)] {
                if let Some((lo, hi)) = b {
                    bounds.set_lower(var, rat(lo)).set_upper(var, rat(hi));
                }
            }
            System {
                table,
                rows,
                model: LinearModel::new(assignment).with_bounds(bounds),
            }
        })
}

/// Points over the base variables used to test lemma validity.
pub fn sample_points() -> Vec<Assignment> {
    let mut values: Vec<BigRational> = (-3..=3).map(rat).collect();
    values.push(BigRational::new(1.into(), 2.into()));
    values.push(BigRational::new((-3).into(), 2.into()));
    let mut out = Vec::new();
    for x in &values {
        for y in &values {
            let mut a = Assignment::new();
            a.set(0, x.clone()).set(1, y.clone());
            out.push(a);
        }
    }
    out
}
