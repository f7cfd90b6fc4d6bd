//! Sparse multivariate polynomials over the rationals.
//!
//! A [`Monomial`] is a product of variable powers kept sorted by variable,
//! a [`Term`] scales a monomial by a coefficient, and a [`Polynomial`] is a
//! sum of terms with like monomials merged and zero coefficients dropped.
//!
//! Terms are stored in decreasing graded-lexicographic order (total degree
//! first, then the smaller variable index dominates), so the first term is
//! the leading term used by Gröbner reduction.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Variable identifier.
pub type Var = u32;

/// `var^power` inside a monomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarPower {
    /// Variable.
    pub var: Var,
    /// Exponent, at least 1.
    pub power: u32,
}

/// Product of variable powers. The empty product is the unit monomial.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Monomial {
    vars: SmallVec<[VarPower; 4]>,
    total_degree: u32,
}

impl Monomial {
    /// The unit monomial `1`.
    pub fn unit() -> Self {
        Self {
            vars: SmallVec::new(),
            total_degree: 0,
        }
    }

    /// `var`.
    pub fn from_var(var: Var) -> Self {
        Self::from_var_power(var, 1)
    }

    /// `var^power`; the unit monomial when `power` is 0.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        let mut m = Self::unit();
        if power > 0 {
            m.vars.push(VarPower { var, power });
            m.total_degree = power;
        }
        m
    }

    /// Product of `factors`; a repeated variable raises its power.
    pub fn from_factors(factors: &[Var]) -> Self {
        Self::collect(factors.iter().map(|&v| (v, 1)))
    }

    /// Monomial from unsorted `(var, power)` pairs, merging repeats.
    fn collect(powers: impl IntoIterator<Item = (Var, u32)>) -> Self {
        let mut pairs: SmallVec<[(Var, u32); 4]> = powers.into_iter().filter(|&(_, p)| p > 0).collect();
        pairs.sort_unstable_by_key(|&(v, _)| v);
        let mut m = Self::unit();
        for (var, power) in pairs {
            match m.vars.last_mut() {
                Some(last) if last.var == var => last.power += power,
                _ => m.vars.push(VarPower { var, power }),
            }
            m.total_degree += power;
        }
        m
    }

    /// Whether this is `1`.
    pub fn is_unit(&self) -> bool {
        self.vars.is_empty()
    }

    /// Sum of the exponents.
    pub fn total_degree(&self) -> u32 {
        self.total_degree
    }

    /// Variable powers, sorted by variable.
    pub fn vars(&self) -> &[VarPower] {
        &self.vars
    }

    /// Exponent of `var`, 0 when absent.
    pub fn degree(&self, var: Var) -> u32 {
        self.vars
            .binary_search_by_key(&var, |vp| vp.var)
            .map_or(0, |i| self.vars[i].power)
    }

    /// Whether the total degree is at most 1.
    pub fn is_linear(&self) -> bool {
        self.total_degree <= 1
    }

    /// Product of two monomials.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        Self::zip_powers(self, other, |a, b| Some(a + b)).unwrap_or_else(Monomial::unit)
    }

    /// `self^k`.
    pub fn pow(&self, k: u32) -> Monomial {
        if k == 0 {
            return Monomial::unit();
        }
        let mut m = self.clone();
        for vp in &mut m.vars {
            vp.power *= k;
        }
        m.total_degree *= k;
        m
    }

    /// Quotient `self / other`, `None` unless `other` divides `self`.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        Self::zip_powers(self, other, |a, b| a.checked_sub(b))
    }

    /// Whether `other` divides `self`.
    pub fn is_divisible_by(&self, other: &Monomial) -> bool {
        other.vars.iter().all(|vp| self.degree(vp.var) >= vp.power)
    }

    /// Least common multiple.
    pub fn lcm(&self, other: &Monomial) -> Monomial {
        Self::zip_powers(self, other, |a, b| Some(a.max(b))).unwrap_or_else(Monomial::unit)
    }

    /// Combine the exponents of both monomials variable by variable; a
    /// missing variable has exponent 0. `None` from `f` aborts.
    fn zip_powers(a: &Monomial, b: &Monomial, f: impl Fn(u32, u32) -> Option<u32>) -> Option<Monomial> {
        let (mut i, mut j) = (0, 0);
        let mut out = Monomial::unit();
        loop {
            let (var, pa, pb) = match (a.vars.get(i), b.vars.get(j)) {
                (None, None) => break,
                (Some(x), Some(y)) if x.var == y.var => {
                    i += 1;
                    j += 1;
                    (x.var, x.power, y.power)
                }
                (Some(x), Some(y)) if x.var < y.var => {
                    i += 1;
                    (x.var, x.power, 0)
                }
                (Some(x), None) => {
                    i += 1;
                    (x.var, x.power, 0)
                }
                (_, Some(y)) => {
                    j += 1;
                    (y.var, 0, y.power)
                }
            };
            let power = f(pa, pb)?;
            if power > 0 {
                out.vars.push(VarPower { var, power });
                out.total_degree += power;
            }
        }
        Some(out)
    }

    /// Evaluate, looking up each variable with `value`.
    pub fn eval_with<E>(&self, value: &mut impl FnMut(Var) -> Result<BigRational, E>) -> Result<BigRational, E> {
        let mut acc = BigRational::one();
        for vp in &self.vars {
            acc *= num_traits::pow(value(vp.var)?, vp.power as usize);
        }
        Ok(acc)
    }
}

/// Graded lexicographic: higher total degree is greater; on a tie the first
/// differing variable decides, and a smaller variable index ranks higher.
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_degree.cmp(&other.total_degree).then_with(|| {
            for (x, y) in self.vars.iter().zip(&other.vars) {
                if x.var != y.var {
                    return y.var.cmp(&x.var);
                }
                if x.power != y.power {
                    return x.power.cmp(&y.power);
                }
            }
            self.vars.len().cmp(&other.vars.len())
        })
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unit() {
            return write!(f, "1");
        }
        for (i, vp) in self.vars.iter().enumerate() {
            let sep = if i == 0 { "" } else { "*" };
            match vp.power {
                1 => write!(f, "{}x{}", sep, vp.var)?,
                p => write!(f, "{}x{}^{}", sep, vp.var, p)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// `coeff * monomial`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// Coefficient.
    pub coeff: BigRational,
    /// Monomial.
    pub monomial: Monomial,
}

impl Term {
    /// Create a term.
    pub fn new(coeff: BigRational, monomial: Monomial) -> Self {
        Self { coeff, monomial }
    }

    /// Whether the monomial is `1`.
    pub fn is_constant(&self) -> bool {
        self.monomial.is_unit()
    }
}

/// Monomial first, coefficient second.
impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.monomial
            .cmp(&other.monomial)
            .then_with(|| self.coeff.cmp(&other.coeff))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A polynomial in canonical form: distinct monomials, non-zero
/// coefficients, terms in decreasing monomial order.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Polynomial {
    terms: Vec<Term>,
}

impl Polynomial {
    /// `0`.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant `c`.
    pub fn constant(c: BigRational) -> Self {
        Self::from_terms([Term::new(c, Monomial::unit())])
    }

    /// The variable `var`.
    pub fn from_var(var: Var) -> Self {
        Self::from_monomial(Monomial::from_var(var))
    }

    /// `1 * m`.
    pub fn from_monomial(m: Monomial) -> Self {
        Self {
            terms: vec![Term::new(BigRational::one(), m)],
        }
    }

    /// Sum of `terms`, brought into canonical form.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut terms: Vec<Term> = terms.into_iter().collect();
        terms.sort_by(|a, b| b.monomial.cmp(&a.monomial));
        let mut merged: Vec<Term> = Vec::with_capacity(terms.len());
        for t in terms {
            match merged.last_mut() {
                Some(last) if last.monomial == t.monomial => last.coeff += t.coeff,
                _ => merged.push(t),
            }
        }
        merged.retain(|t| !t.coeff.is_zero());
        Self { terms: merged }
    }

    /// Polynomial from integer coefficients and `(var, power)` lists, mostly
    /// for tests: `&[(2, &[(0, 1), (1, 1)]), (-1, &[])]` is `2*x0*x1 - 1`.
    pub fn from_coeffs_int(coeffs: &[(i64, &[(Var, u32)])]) -> Self {
        Self::from_terms(coeffs.iter().map(|(c, powers)| {
            Term::new(
                BigRational::from_integer(BigInt::from(*c)),
                Monomial::collect(powers.iter().copied()),
            )
        }))
    }

    /// `sum(a_i * x_i) + constant`.
    pub fn linear(coeffs: &[(BigRational, Var)], constant: BigRational) -> Self {
        let vars = coeffs
            .iter()
            .map(|(c, v)| Term::new(c.clone(), Monomial::from_var(*v)));
        Self::from_terms(vars.chain([Term::new(constant, Monomial::unit())]))
    }

    /// Whether this is `0`.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether this is a non-zero constant.
    pub fn is_constant(&self) -> bool {
        matches!(self.terms.as_slice(), [t] if t.is_constant())
    }

    /// Whether every term has degree at most 1.
    pub fn is_linear(&self) -> bool {
        self.terms.iter().all(|t| t.monomial.is_linear())
    }

    /// Number of terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Terms, leading term first.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Largest total degree of a term.
    pub fn total_degree(&self) -> u32 {
        self.terms.first().map_or(0, |t| t.monomial.total_degree())
    }

    /// Largest exponent of `var`.
    pub fn degree(&self, var: Var) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.degree(var))
            .max()
            .unwrap_or(0)
    }

    /// Variables, sorted and deduplicated.
    pub fn vars(&self) -> Vec<Var> {
        let mut vars: Vec<Var> = self
            .terms
            .iter()
            .flat_map(|t| t.monomial.vars().iter().map(|vp| vp.var))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Leading term.
    pub fn leading_term(&self) -> Option<&Term> {
        self.terms.first()
    }

    /// Leading monomial.
    pub fn leading_monomial(&self) -> Option<&Monomial> {
        self.leading_term().map(|t| &t.monomial)
    }

    /// Leading coefficient, 0 for the zero polynomial.
    pub fn leading_coeff(&self) -> BigRational {
        self.leading_term().map_or_else(BigRational::zero, |t| t.coeff.clone())
    }

    /// Coefficient of the unit monomial.
    pub fn constant_term(&self) -> BigRational {
        self.terms
            .last()
            .filter(|t| t.is_constant())
            .map_or_else(BigRational::zero, |t| t.coeff.clone())
    }

    fn map_coeffs(&self, f: impl Fn(&BigRational) -> BigRational) -> Polynomial {
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(f(&t.coeff), t.monomial.clone()))
                .collect(),
        }
    }

    /// `-self`.
    pub fn neg(&self) -> Polynomial {
        self.map_coeffs(|c| -c)
    }

    /// `self + other`.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().chain(&other.terms).cloned())
    }

    /// `self - other`.
    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        Polynomial::from_terms(
            self.terms
                .iter()
                .cloned()
                .chain(other.terms.iter().map(|t| Term::new(-&t.coeff, t.monomial.clone()))),
        )
    }

    /// `c * self`.
    pub fn scale(&self, c: &BigRational) -> Polynomial {
        if c.is_zero() {
            return Polynomial::zero();
        }
        self.map_coeffs(|k| k * c)
    }

    /// `self * other`.
    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().flat_map(|a| {
            other
                .terms
                .iter()
                .map(move |b| Term::new(&a.coeff * &b.coeff, a.monomial.mul(&b.monomial)))
        }))
    }

    /// `c * m * self`.
    pub fn mul_term(&self, c: &BigRational, m: &Monomial) -> Polynomial {
        if c.is_zero() {
            return Polynomial::zero();
        }
        // multiplying every monomial by `m` keeps the order
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(&t.coeff * c, t.monomial.mul(m)))
                .collect(),
        }
    }

    /// `self^k` by repeated squaring.
    pub fn pow(&self, mut k: u32) -> Polynomial {
        let mut acc = Polynomial::constant(BigRational::one());
        let mut base = self.clone();
        while k > 0 {
            if k & 1 == 1 {
                acc = acc.mul(&base);
            }
            k >>= 1;
            if k > 0 {
                base = base.mul(&base);
            }
        }
        acc
    }

    /// Evaluate, looking up each variable with `value`. The first lookup
    /// error aborts.
    pub fn eval_with<E>(&self, mut value: impl FnMut(Var) -> Result<BigRational, E>) -> Result<BigRational, E> {
        let mut sum = BigRational::zero();
        for t in &self.terms {
            sum += &t.coeff * t.monomial.eval_with(&mut value)?;
        }
        Ok(sum)
    }

    /// Evaluate under `assignment`, `None` if a variable has no value.
    pub fn eval(&self, assignment: &FxHashMap<Var, BigRational>) -> Option<BigRational> {
        self.eval_with(|v| assignment.get(&v).cloned().ok_or(())).ok()
    }

    /// Replace `var` by `replacement`.
    pub fn substitute(&self, var: Var, replacement: &Polynomial) -> Polynomial {
        let mut powers: FxHashMap<u32, Polynomial> = FxHashMap::default();
        let mut terms = Vec::with_capacity(self.terms.len());
        for t in &self.terms {
            let d = t.monomial.degree(var);
            if d == 0 {
                terms.push(t.clone());
                continue;
            }
            let rest = t
                .monomial
                .div(&Monomial::from_var_power(var, d))
                .unwrap_or_else(Monomial::unit);
            let rep = powers.entry(d).or_insert_with(|| replacement.pow(d));
            terms.extend(rep.mul_term(&t.coeff, &rest).terms);
        }
        Polynomial::from_terms(terms)
    }

    /// Replace `var` by the constant `value`.
    pub fn substitute_value(&self, var: Var, value: &BigRational) -> Polynomial {
        self.substitute(var, &Polynomial::constant(value.clone()))
    }

    /// Divide by the leading coefficient.
    pub fn make_monic(&self) -> Polynomial {
        let lc = self.leading_coeff();
        if lc.is_zero() || lc.is_one() {
            return self.clone();
        }
        self.map_coeffs(|c| c / &lc)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            let magnitude = t.coeff.abs();
            match (i, t.coeff.is_negative()) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if t.is_constant() {
                write!(f, "{}", magnitude)?;
            } else if magnitude.is_one() {
                write!(f, "{}", t.monomial)?;
            } else {
                write!(f, "{}*{}", magnitude, t.monomial)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        Polynomial::add(self, rhs)
    }
}

impl Sub<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        Polynomial::sub(self, rhs)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        Polynomial::mul(self, rhs)
    }
}
