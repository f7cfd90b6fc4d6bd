//! Detection of monomials whose abstraction value disagrees with the product.

use crate::model::Assignment;
use crate::monomial::MonomialTable;
use num_rational::BigRational;
use oxiz_core::Result;
use oxiz_math::Var;

/// A monomial whose linear abstraction is wrong under the current model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Abstraction variable.
    pub var: Var,
    /// Degree of the product.
    pub degree: u32,
    /// Value assigned to the abstraction variable.
    pub value: BigRational,
    /// True product of the factor values.
    pub product: BigRational,
}

/// Violated monomials, highest degree first, then by abstraction variable.
pub fn violated_monomials(table: &MonomialTable, assignment: &Assignment) -> Result<Vec<Violation>> {
    let mut out = Vec::new();
    for def in table.iter() {
        let value = assignment.value(def.var)?;
        let product = def.product(assignment)?;
        if value != product {
            out.push(Violation {
                var: def.var,
                degree: def.degree(),
                value,
                product,
            });
        }
    }
    out.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.var.cmp(&b.var)));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialDef;

    #[test]
    fn test_order_and_exactness() {
        let table = MonomialTable::from_defs([
            MonomialDef::new(11, &[0, 1]),
            MonomialDef::new(10, &[0, 1]),
            MonomialDef::new(12, &[0, 1, 2]),
            MonomialDef::new(13, &[1, 2]),
        ])
        .unwrap();
        let mut a = Assignment::new();
        a.set_int(0, 2).set_int(1, 3).set_int(2, 1);
        a.set_int(10, 5).set_int(11, 7).set_int(12, 0).set_int(13, 3);
        let vars: Vec<Var> = violated_monomials(&table, &a)
            .unwrap()
            .iter()
            .map(|v| v.var)
            .collect();
        assert_eq!(vars, vec![12, 10, 11]);
    }

    #[test]
    fn test_consistent_model_has_no_violation() {
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 0])]).unwrap();
        let mut a = Assignment::new();
        a.set(0, BigRational::new(1.into(), 3.into()));
        a.set(2, BigRational::new(1.into(), 9.into()));
        assert!(violated_monomials(&table, &a).unwrap().is_empty());
    }
}
