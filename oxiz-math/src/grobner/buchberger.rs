//! Budget-capped Buchberger algorithm.
//!
//! This module implements saturation under explicit quotas:
//! - product criterion for eliminating useless S-polynomials
//! - normal selection strategy (smallest lcm degree first)
//! - a hard cap on processed pairs, simplification rewrites and new equations
//! - size and degree caps relative to the generators
//!
//! The caller supplies a checkpoint closure that is polled once per processed
//! pair and every `checkpoint_interval` simplification rewrites, so a long
//! saturation can be interrupted.

use super::Equation;
use crate::polynomial::{Monomial, Polynomial};
use num_rational::BigRational;
use num_traits::One;
use oxiz_core::Result;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Critical pair for S-polynomial computation
#[derive(Debug, Clone)]
pub struct CriticalPair {
    /// First polynomial index
    pub i: usize,
    /// Second polynomial index
    pub j: usize,
    /// LCM of leading monomials
    pub lcm: Monomial,
    /// Degree of LCM
    pub degree: u32,
}

impl Ord for CriticalPair {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower degree first, then lower indices.
        other
            .degree
            .cmp(&self.degree)
            .then_with(|| other.i.cmp(&self.i))
            .then_with(|| other.j.cmp(&self.j))
    }
}

impl PartialOrd for CriticalPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CriticalPair {
    fn eq(&self, other: &Self) -> bool {
        self.i == other.i && self.j == other.j
    }
}

impl Eq for CriticalPair {}

/// Statistics for one saturation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrobnerStats {
    /// Critical pairs processed (reduction steps).
    pub steps: u64,
    /// Single-term rewrites performed while reducing.
    pub simplifications: u64,
    /// Pairs discarded by the product criterion.
    pub pairs_eliminated_product: u64,
    /// S-polynomials that reduced to zero.
    pub zero_reductions: u64,
    /// Equations added to the basis.
    pub equations_added: u64,
    /// Derived polynomials dropped for having too many terms.
    pub dropped_size: u64,
    /// Derived polynomials dropped for having too high a degree.
    pub dropped_degree: u64,
    /// Conflicting equations found.
    pub conflicts: u64,
}

/// Quotas for one saturation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrobnerConfig {
    /// Maximum number of processed critical pairs.
    pub max_steps: u32,
    /// Maximum number of single-term rewrites.
    pub max_simplifications: u32,
    /// Maximum number of equations added to the basis.
    pub max_new_equations: u32,
    /// Derived term count may not exceed this multiple of the largest generator.
    pub size_growth: u32,
    /// Derived degree may not exceed this multiple of the largest generator.
    pub degree_growth: u32,
    /// Stop once this many conflicts were found.
    pub max_conflicts: u32,
    /// Simplification rewrites between two checkpoints.
    pub checkpoint_interval: u32,
}

impl Default for GrobnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            max_simplifications: 10_000,
            max_new_equations: 10,
            size_growth: 2,
            degree_growth: 2,
            max_conflicts: 1,
            checkpoint_interval: 16,
        }
    }
}

impl GrobnerConfig {
    /// Set the pair quota.
    #[must_use]
    pub fn with_max_steps(mut self, n: u32) -> Self {
        self.max_steps = n;
        self
    }

    /// Set the rewrite quota.
    #[must_use]
    pub fn with_max_simplifications(mut self, n: u32) -> Self {
        self.max_simplifications = n;
        self
    }

    /// Set the new-equation quota.
    #[must_use]
    pub fn with_max_new_equations(mut self, n: u32) -> Self {
        self.max_new_equations = n;
        self
    }

    /// Set both growth factors.
    #[must_use]
    pub fn with_growth(mut self, size: u32, degree: u32) -> Self {
        self.size_growth = size;
        self.degree_growth = degree;
        self
    }

    /// Set the number of conflicts after which saturation stops.
    #[must_use]
    pub fn with_max_conflicts(mut self, n: u32) -> Self {
        self.max_conflicts = n;
        self
    }
}

/// Why a saturation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No critical pair left.
    Saturated,
    /// `max_steps` pairs were processed.
    StepQuota,
    /// `max_simplifications` rewrites were performed.
    SimplificationQuota,
    /// `max_new_equations` equations were added.
    EquationQuota,
    /// `max_conflicts` conflicts were found.
    ConflictLimit,
}

/// Result of a saturation.
#[derive(Debug, Clone)]
pub struct Saturation<D: Ord> {
    /// Final basis.
    pub basis: Vec<Equation<D>>,
    /// Conflicting equations, in discovery order.
    pub conflicts: Vec<Equation<D>>,
    /// Why saturation stopped.
    pub stop: StopReason,
}

enum Reduced<D: Ord> {
    Done(Equation<D>),
    QuotaHit,
}

/// Budgeted Buchberger saturation.
pub struct BudgetedBuchberger<D: Ord> {
    config: GrobnerConfig,
    stats: GrobnerStats,
    basis: Vec<Equation<D>>,
    pairs: BinaryHeap<CriticalPair>,
    conflicts: Vec<Equation<D>>,
    max_terms: usize,
    max_degree: u32,
}

impl<D: Ord + Clone> BudgetedBuchberger<D> {
    /// Create a saturation engine with the given quotas.
    pub fn new(config: GrobnerConfig) -> Self {
        Self {
            config,
            stats: GrobnerStats::default(),
            basis: Vec::new(),
            pairs: BinaryHeap::new(),
            conflicts: Vec::new(),
            max_terms: 0,
            max_degree: 0,
        }
    }

    /// Statistics of the last saturation.
    pub fn stats(&self) -> &GrobnerStats {
        &self.stats
    }

    /// Saturate `generators`.
    ///
    /// `excludes_zero` reports whether a polynomial can never vanish under the
    /// caller's current variable bounds; such a polynomial, or a non-zero
    /// constant, is a conflict. `checkpoint` is polled at bounded intervals
    /// and its error aborts the saturation.
    pub fn saturate(
        &mut self,
        generators: Vec<Equation<D>>,
        mut excludes_zero: impl FnMut(&Polynomial) -> bool,
        mut checkpoint: impl FnMut() -> Result<()>,
    ) -> Result<Saturation<D>> {
        self.stats = GrobnerStats::default();
        self.basis.clear();
        self.pairs.clear();
        self.conflicts.clear();

        self.max_terms = generators
            .iter()
            .map(|e| e.poly.num_terms())
            .max()
            .unwrap_or(0)
            * self.config.size_growth.max(1) as usize;
        self.max_degree = generators
            .iter()
            .map(|e| e.poly.total_degree())
            .max()
            .unwrap_or(0)
            * self.config.degree_growth.max(1);

        for generator in generators {
            if generator.poly.is_zero() {
                continue;
            }
            let eq = Equation {
                poly: generator.poly.make_monic(),
                deps: generator.deps,
            };
            if self.record_if_conflict(&eq, &mut excludes_zero) {
                if self.conflict_limit_reached() {
                    return Ok(self.finish(StopReason::ConflictLimit));
                }
                continue;
            }
            self.install(eq);
        }

        loop {
            if self.pairs.is_empty() {
                return Ok(self.finish(StopReason::Saturated));
            }
            if self.stats.steps >= u64::from(self.config.max_steps) {
                debug!(steps = self.stats.steps, "grobner step quota exhausted");
                return Ok(self.finish(StopReason::StepQuota));
            }
            let Some(pair) = self.pairs.pop() else {
                return Ok(self.finish(StopReason::Saturated));
            };
            self.stats.steps += 1;
            checkpoint()?;

            let s_poly = self.s_polynomial(&pair);
            let reduced = match self.reduce(s_poly, &mut checkpoint)? {
                Reduced::Done(eq) => eq,
                Reduced::QuotaHit => {
                    debug!(
                        simplifications = self.stats.simplifications,
                        "grobner simplification quota exhausted"
                    );
                    return Ok(self.finish(StopReason::SimplificationQuota));
                }
            };

            if reduced.poly.is_zero() {
                self.stats.zero_reductions += 1;
                continue;
            }
            if reduced.poly.num_terms() > self.max_terms {
                self.stats.dropped_size += 1;
                continue;
            }
            if reduced.poly.total_degree() > self.max_degree {
                self.stats.dropped_degree += 1;
                continue;
            }

            let eq = Equation {
                poly: reduced.poly.make_monic(),
                deps: reduced.deps,
            };
            if self.record_if_conflict(&eq, &mut excludes_zero) {
                if self.conflict_limit_reached() {
                    return Ok(self.finish(StopReason::ConflictLimit));
                }
                continue;
            }

            if self.stats.equations_added >= u64::from(self.config.max_new_equations) {
                debug!("grobner equation quota exhausted");
                return Ok(self.finish(StopReason::EquationQuota));
            }
            trace!(eq = %eq, "grobner new equation");
            self.install(eq);
            self.stats.equations_added += 1;
        }
    }

    fn finish(&mut self, stop: StopReason) -> Saturation<D> {
        Saturation {
            basis: std::mem::take(&mut self.basis),
            conflicts: std::mem::take(&mut self.conflicts),
            stop,
        }
    }

    fn conflict_limit_reached(&self) -> bool {
        self.stats.conflicts >= u64::from(self.config.max_conflicts.max(1))
    }

    fn record_if_conflict(
        &mut self,
        eq: &Equation<D>,
        excludes_zero: &mut impl FnMut(&Polynomial) -> bool,
    ) -> bool {
        if eq.is_constant_conflict() || excludes_zero(&eq.poly) {
            debug!(eq = %eq, "grobner conflict");
            self.stats.conflicts += 1;
            self.conflicts.push(eq.clone());
            true
        } else {
            false
        }
    }

    /// Add an equation to the basis and queue its critical pairs.
    fn install(&mut self, eq: Equation<D>) {
        let new_idx = self.basis.len();
        self.basis.push(eq);
        for i in 0..new_idx {
            self.add_critical_pair(i, new_idx);
        }
    }

    fn add_critical_pair(&mut self, i: usize, j: usize) {
        let (Some(lt_i), Some(lt_j)) = (
            self.basis[i].poly.leading_monomial(),
            self.basis[j].poly.leading_monomial(),
        ) else {
            return;
        };
        let lcm = lt_i.lcm(lt_j);

        // Product criterion: coprime leading monomials reduce to zero.
        if lcm == lt_i.mul(lt_j) {
            self.stats.pairs_eliminated_product += 1;
            return;
        }

        let degree = lcm.total_degree();
        self.pairs.push(CriticalPair { i, j, lcm, degree });
    }

    /// S(fi, fj) = (lcm/lt_i)/lc_i * fi - (lcm/lt_j)/lc_j * fj
    fn s_polynomial(&self, pair: &CriticalPair) -> Equation<D> {
        let fi = &self.basis[pair.i];
        let fj = &self.basis[pair.j];
        let part = |f: &Equation<D>| match f.poly.leading_term() {
            Some(lt) => {
                let cofactor = pair.lcm.div(&lt.monomial).unwrap_or_else(Monomial::unit);
                f.poly.mul_term(&(BigRational::one() / &lt.coeff), &cofactor)
            }
            None => Polynomial::zero(),
        };
        let mut eq = Equation {
            poly: part(fi).sub(&part(fj)),
            deps: fi.deps.clone(),
        };
        eq.absorb_deps(fj);
        eq
    }

    /// Fully reduce `eq` by the current basis, one term rewrite at a time.
    fn reduce(
        &mut self,
        mut eq: Equation<D>,
        checkpoint: &mut impl FnMut() -> Result<()>,
    ) -> Result<Reduced<D>> {
        loop {
            let Some((term, reducer)) = self.find_reducible(&eq.poly) else {
                return Ok(Reduced::Done(eq));
            };
            if self.stats.simplifications >= u64::from(self.config.max_simplifications) {
                return Ok(Reduced::QuotaHit);
            }

            let r = &self.basis[reducer];
            let Some(lt) = r.poly.leading_term() else {
                return Ok(Reduced::Done(eq));
            };
            let t = &eq.poly.terms()[term];
            let quotient = t.monomial.div(&lt.monomial).unwrap_or_else(Monomial::unit);
            let coeff = &t.coeff / &lt.coeff;
            let poly = eq.poly.sub(&r.poly.mul_term(&coeff, &quotient));
            let deps = r.deps.clone();
            eq.poly = poly;
            eq.deps.extend(deps);

            self.stats.simplifications += 1;
            if self
                .stats
                .simplifications
                .is_multiple_of(u64::from(self.config.checkpoint_interval.max(1)))
            {
                checkpoint()?;
            }
        }
    }

    /// First term of `poly` divisible by some basis leading monomial.
    fn find_reducible(&self, poly: &Polynomial) -> Option<(usize, usize)> {
        for (ti, term) in poly.terms().iter().enumerate() {
            for (bi, b) in self.basis.iter().enumerate() {
                if let Some(lm) = b.poly.leading_monomial()
                    && term.monomial.is_divisible_by(lm)
                {
                    return Some((ti, bi));
                }
            }
        }
        None
    }
}
