//! Linear constraint rows of the relaxation.

use crate::lemma::{ArithLit, CmpOp};
use crate::model::Assignment;
use crate::monomial::MonomialTable;
use num_traits::Zero;
use oxiz_core::{OxizError, Result};
use oxiz_math::{Polynomial, Var};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Relation between a row's polynomial and zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `p = 0`
    Eq,
    /// `p <= 0`
    Le,
    /// `p >= 0`
    Ge,
}

impl Relation {
    fn op(self) -> CmpOp {
        match self {
            Relation::Eq => CmpOp::Eq,
            Relation::Le => CmpOp::Le,
            Relation::Ge => CmpOp::Ge,
        }
    }
}

/// A constraint `linear ⋈ 0` over base and abstraction variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    linear: Polynomial,
    relation: Relation,
}

impl Row {
    /// Create a row; `linear` must be linear.
    pub fn new(id: RowId, linear: Polynomial, relation: Relation) -> Result<Self> {
        if !linear.is_linear() {
            return Err(OxizError::config(
                "nla",
                "row",
                format!("{} is not linear: {}", id, linear),
            ));
        }
        Ok(Self {
            id,
            linear,
            relation,
        })
    }

    /// Row identifier.
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Left-hand side.
    pub fn linear(&self) -> &Polynomial {
        &self.linear
    }

    /// Relation to zero.
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// Whether the row mentions `var`.
    pub fn mentions(&self, var: Var) -> bool {
        self.linear.degree(var) > 0
    }

    /// The true nonlinear polynomial of the row.
    pub fn expanded(&self, table: &MonomialTable) -> Polynomial {
        table.expand(&self.linear)
    }

    /// The row as a literal.
    pub fn literal(&self) -> ArithLit {
        ArithLit::new(self.linear.clone(), self.relation.op(), Zero::zero())
    }

    /// Whether the row holds under the linear model.
    pub fn holds(&self, assignment: &Assignment) -> Result<bool> {
        self.literal().eval(assignment)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.literal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialDef;
    use num_rational::BigRational;

    #[test]
    fn test_nonlinear_row_rejected() {
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 1), (1, 1)])]);
        assert!(Row::new(RowId(0), p, Relation::Eq).is_err());
    }

    #[test]
    fn test_literal_and_expansion() {
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let p = Polynomial::from_coeffs_int(&[(1, &[(2, 1)]), (-6, &[])]);
        let row = Row::new(RowId(3), p, Relation::Eq).unwrap();
        assert_eq!(row.to_string(), "r3: x2 = 6");
        assert!(row.mentions(2) && !row.mentions(0));
        assert_eq!(row.expanded(&table).vars(), vec![0, 1]);

        let mut a = Assignment::new();
        a.set_int(2, 6);
        assert!(row.holds(&a).unwrap());
        a.set(2, BigRational::from_integer(5.into()));
        assert!(!row.holds(&a).unwrap());
    }
}
