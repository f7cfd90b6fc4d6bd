//! Arithmetic literals and lemmas.

use crate::model::Assignment;
use crate::monomial::MonomialTable;
use crate::row::RowId;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use oxiz_core::Result;
use oxiz_math::{Polynomial, Var};
use oxiz_proof::ProofNodeId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Comparison operator of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `=`
    Eq,
    /// `!=`
    Ne,
}

impl CmpOp {
    /// The complementary operator.
    pub fn negate(self) -> Self {
        match self {
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
        }
    }

    /// Whether `lhs op rhs` holds given `lhs.cmp(rhs)`.
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
        }
    }

    /// SMT-LIB spelling; `!=` has none and is written as a negated `=`.
    pub fn smt2(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq | CmpOp::Ne => "=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Ne => "!=",
            other => other.smt2(),
        };
        write!(f, "{}", s)
    }
}

/// A linear literal `lhs op rhs`; `lhs` has no constant term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArithLit {
    /// Linear left-hand side.
    pub lhs: Polynomial,
    /// Operator.
    pub op: CmpOp,
    /// Constant right-hand side.
    pub rhs: BigRational,
}

impl ArithLit {
    /// `poly op rhs`, moving any constant of `poly` to the right.
    pub fn new(poly: Polynomial, op: CmpOp, rhs: BigRational) -> Self {
        let c = poly.constant_term();
        if c.is_zero() {
            return Self { lhs: poly, op, rhs };
        }
        Self {
            lhs: poly.sub(&Polynomial::constant(c.clone())),
            op,
            rhs: rhs - c,
        }
    }

    /// `var op value`.
    pub fn var(var: Var, op: CmpOp, value: BigRational) -> Self {
        Self::new(Polynomial::from_var(var), op, value)
    }

    /// The complementary literal.
    pub fn negate(&self) -> Self {
        Self {
            lhs: self.lhs.clone(),
            op: self.op.negate(),
            rhs: self.rhs.clone(),
        }
    }

    /// Truth value under the linear model.
    pub fn eval(&self, assignment: &Assignment) -> Result<bool> {
        let v = self.lhs.eval_with(|x| assignment.value(x))?;
        Ok(self.op.holds(v.cmp(&self.rhs)))
    }

    /// Truth value when abstraction variables denote the products they stand for.
    pub fn eval_true(&self, table: &MonomialTable, assignment: &Assignment) -> Result<bool> {
        let v = self.lhs.eval_with(|x| table.true_value(x, assignment))?;
        Ok(self.op.holds(v.cmp(&self.rhs)))
    }

    /// Variables of the literal.
    pub fn vars(&self) -> Vec<Var> {
        self.lhs.vars()
    }

    /// SMT-LIB rendering over `Real` variables named `x<id>`.
    pub fn to_smt2(&self) -> String {
        let atom = format!("({} {} {})", self.op.smt2(), smt2_poly(&self.lhs), smt2_rat(&self.rhs));
        if self.op == CmpOp::Ne {
            format!("(not {})", atom)
        } else {
            atom
        }
    }
}

impl fmt::Display for ArithLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

fn smt2_rat(q: &BigRational) -> String {
    let body = if q.is_integer() {
        format!("{}.0", q.numer().abs())
    } else {
        format!("(/ {}.0 {}.0)", q.numer().abs(), q.denom())
    };
    if q.is_negative() {
        format!("(- {})", body)
    } else {
        body
    }
}

fn smt2_poly(p: &Polynomial) -> String {
    let terms: Vec<String> = p
        .terms()
        .iter()
        .map(|t| {
            let mut factors: Vec<String> = Vec::new();
            if !t.coeff.is_one() || t.monomial.is_unit() {
                factors.push(smt2_rat(&t.coeff));
            }
            for vp in t.monomial.vars() {
                for _ in 0..vp.power {
                    factors.push(format!("x{}", vp.var));
                }
            }
            if factors.len() == 1 {
                factors.remove(0)
            } else {
                format!("(* {})", factors.join(" "))
            }
        })
        .collect();
    match terms.len() {
        0 => "0.0".to_string(),
        1 => terms.into_iter().next().unwrap_or_default(),
        _ => format!("(+ {})", terms.join(" ")),
    }
}

/// Heuristic that produced a lemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeuristicId {
    /// Sign and monotonicity lemmas.
    Order,
    /// Tangent and secant planes.
    Tangent,
    /// Interval evaluation of nested forms.
    Horner,
    /// Budgeted ideal saturation.
    Grobner,
}

impl HeuristicId {
    /// All heuristics in scheduling order.
    pub const ALL: [HeuristicId; 4] = [
        HeuristicId::Order,
        HeuristicId::Tangent,
        HeuristicId::Horner,
        HeuristicId::Grobner,
    ];

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            HeuristicId::Order => "order",
            HeuristicId::Tangent => "tangent",
            HeuristicId::Horner => "horner",
            HeuristicId::Grobner => "grobner",
        }
    }
}

impl fmt::Display for HeuristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Input fact a lemma was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Premise {
    /// A constraint row.
    Row(RowId),
    /// The definition of an abstraction variable.
    Definition(Var),
}

/// A disjunction of literals excluding a spurious model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma {
    literals: Vec<ArithLit>,
    origin: HeuristicId,
    premises: BTreeSet<Premise>,
    justification: Option<ProofNodeId>,
}

impl Lemma {
    /// Create a lemma; literals are sorted and de-duplicated.
    pub fn new(origin: HeuristicId, literals: impl IntoIterator<Item = ArithLit>) -> Self {
        let mut literals: Vec<ArithLit> = literals.into_iter().collect();
        literals.sort();
        literals.dedup();
        Self {
            literals,
            origin,
            premises: BTreeSet::new(),
            justification: None,
        }
    }

    /// Record the input facts the lemma depends on.
    #[must_use]
    pub fn with_premises(mut self, premises: impl IntoIterator<Item = Premise>) -> Self {
        self.premises.extend(premises);
        self
    }

    /// The disjuncts.
    pub fn literals(&self) -> &[ArithLit] {
        &self.literals
    }

    /// Producing heuristic.
    pub fn origin(&self) -> HeuristicId {
        self.origin
    }

    /// Input facts the lemma was derived from.
    pub fn premises(&self) -> &BTreeSet<Premise> {
        &self.premises
    }

    /// Proof node recording the lemma, if proofs are on.
    pub fn justification(&self) -> Option<ProofNodeId> {
        self.justification
    }

    /// Attach a proof node.
    pub fn set_justification(&mut self, id: ProofNodeId) {
        self.justification = Some(id);
    }

    /// Whether every literal is false under the linear model.
    pub fn is_false_under(&self, assignment: &Assignment) -> Result<bool> {
        for lit in &self.literals {
            if lit.eval(assignment)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether some literal holds under the true product semantics.
    pub fn holds_true(&self, table: &MonomialTable, assignment: &Assignment) -> Result<bool> {
        for lit in &self.literals {
            if lit.eval_true(table, assignment)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Variables mentioned by the literals, ascending.
    pub fn vars(&self) -> BTreeSet<Var> {
        self.literals.iter().flat_map(|l| l.vars()).collect()
    }

    /// SMT-LIB rendering of the disjunction.
    pub fn to_smt2(&self) -> String {
        match self.literals.len() {
            0 => "false".to_string(),
            1 => self.literals[0].to_smt2(),
            _ => {
                let lits: Vec<String> = self.literals.iter().map(ArithLit::to_smt2).collect();
                format!("(or {})", lits.join(" "))
            }
        }
    }
}

impl fmt::Display for Lemma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.origin)?;
        if self.literals.is_empty() {
            return write!(f, "false");
        }
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            write!(f, "{}", lit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monomial::MonomialDef;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    #[test]
    fn test_constant_moves_right() {
        // x0 - 5 != 0  becomes  x0 != 5
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-5, &[])]);
        let lit = ArithLit::new(p, CmpOp::Ne, rat(0));
        assert_eq!(lit, ArithLit::var(0, CmpOp::Ne, rat(5)));
        assert_eq!(lit.to_string(), "x0 != 5");
        assert_eq!(lit.to_smt2(), "(not (= x0 5.0))");
    }

    #[test]
    fn test_negate_complements() {
        let mut a = Assignment::new();
        a.set_int(0, 2);
        for op in [CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge, CmpOp::Eq, CmpOp::Ne] {
            let lit = ArithLit::var(0, op, rat(2));
            assert_ne!(lit.eval(&a).unwrap(), lit.negate().eval(&a).unwrap());
        }
    }

    #[test]
    fn test_true_semantics_differs_from_linear() {
        let table = MonomialTable::from_defs([MonomialDef::new(2, &[0, 1])]).unwrap();
        let mut a = Assignment::new();
        a.set_int(0, 2).set_int(1, 3).set_int(2, 5);
        let lit = ArithLit::var(2, CmpOp::Eq, rat(6));
        assert!(!lit.eval(&a).unwrap());
        assert!(lit.eval_true(&table, &a).unwrap());
    }

    #[test]
    fn test_lemma_sorted_and_deduplicated() {
        let a = ArithLit::var(1, CmpOp::Le, rat(0));
        let b = ArithLit::var(0, CmpOp::Gt, rat(2));
        let l1 = Lemma::new(HeuristicId::Order, [a.clone(), b.clone(), a.clone()]);
        let l2 = Lemma::new(HeuristicId::Order, [b, a]);
        assert_eq!(l1, l2);
        assert_eq!(l1.literals().len(), 2);
        assert_eq!(l1.vars().into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_smt2_rendering() {
        // 2*x0 - x1 <= -1/2
        let lhs = Polynomial::from_coeffs_int(&[(2, &[(0, 1)]), (-1, &[(1, 1)])]);
        let lit = ArithLit::new(lhs, CmpOp::Le, BigRational::new((-1).into(), 2.into()));
        assert_eq!(lit.to_smt2(), "(<= (+ (* 2.0 x0) (* (- 1.0) x1)) (- (/ 1.0 2.0)))");
        let lemma = Lemma::new(HeuristicId::Tangent, [lit, ArithLit::var(0, CmpOp::Gt, rat(1))]);
        assert!(lemma.to_smt2().starts_with("(or "));
    }
}
