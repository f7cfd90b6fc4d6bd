//! Typed configuration of the `nla` module.

use oxiz_core::{OxizError, ParamDescrs, ParamValue, Params, Result};
use oxiz_math::GrobnerConfig;
use std::fmt;

const MODULE: &str = "nla";

/// Which fixed variables are replaced by their value before a polynomial is
/// analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixedSubstitution {
    /// Leave every variable symbolic.
    None,
    /// Substitute every fixed variable.
    All,
    /// Substitute only variables fixed to zero.
    #[default]
    ZerosOnly,
}

impl FixedSubstitution {
    /// Numeric code used in the option table.
    pub fn code(self) -> u32 {
        match self {
            FixedSubstitution::None => 0,
            FixedSubstitution::All => 1,
            FixedSubstitution::ZerosOnly => 2,
        }
    }

    /// Whether a variable fixed to a value with this zero-ness is substituted.
    pub fn applies(self, is_zero: bool) -> bool {
        match self {
            FixedSubstitution::None => false,
            FixedSubstitution::All => true,
            FixedSubstitution::ZerosOnly => is_zero,
        }
    }
}

impl TryFrom<u32> for FixedSubstitution {
    type Error = u32;

    fn try_from(code: u32) -> std::result::Result<Self, u32> {
        match code {
            0 => Ok(FixedSubstitution::None),
            1 => Ok(FixedSubstitution::All),
            2 => Ok(FixedSubstitution::ZerosOnly),
            other => Err(other),
        }
    }
}

impl fmt::Display for FixedSubstitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Configuration of the nonlinear lemma engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NlaParams {
    /// Run order lemmas.
    pub order: bool,
    /// Run tangent lemmas.
    pub tangents: bool,
    /// Run the Horner heuristic.
    pub horner: bool,
    /// Fixed-variable substitution before Horner evaluation.
    pub horner_subs_fixed: FixedSubstitution,
    /// Horner runs on rounds whose index is a multiple of this.
    pub horner_frequency: u32,
    /// Rows whose expanded polynomial has more non-constant terms than this
    /// are skipped by Horner.
    pub horner_row_length_limit: u32,
    /// Run the Gröbner basis heuristic.
    pub grobner: bool,
    /// Maximum number of equalities added per Gröbner invocation.
    pub grobner_eqs_growth: u32,
    /// Maximum term-count growth of derived polynomials.
    pub grobner_expr_size_growth: u32,
    /// Maximum degree growth of derived polynomials.
    pub grobner_expr_degree_growth: u32,
    /// Maximum number of simplification rewrites per invocation.
    pub grobner_max_simplified: u32,
    /// Stop after reporting this many conflicts.
    pub grobner_cnfl_to_report: u32,
    /// Reduction step quota per invocation.
    pub gr_q: u32,
    /// Fixed-variable substitution before saturation.
    pub grobner_subs_fixed: FixedSubstitution,
}

impl Default for NlaParams {
    fn default() -> Self {
        Self {
            order: true,
            tangents: true,
            horner: true,
            horner_subs_fixed: FixedSubstitution::ZerosOnly,
            horner_frequency: 4,
            horner_row_length_limit: 10,
            grobner: true,
            grobner_eqs_growth: 10,
            grobner_expr_size_growth: 2,
            grobner_expr_degree_growth: 2,
            grobner_max_simplified: 10000,
            grobner_cnfl_to_report: 1,
            gr_q: 10,
            grobner_subs_fixed: FixedSubstitution::ZerosOnly,
        }
    }
}

impl NlaParams {
    /// Option table of the `nla` module.
    pub fn descriptors() -> ParamDescrs {
        let d = Self::default();
        let mut t = ParamDescrs::new(MODULE);
        t.insert("order", "run order lemmas", ParamValue::Bool(d.order));
        t.insert("tangents", "run tangent lemmas", ParamValue::Bool(d.tangents));
        t.insert("horner", "run horner's heuristic", ParamValue::Bool(d.horner));
        t.insert(
            "horner_subs_fixed",
            "0 - no subs, 1 - substitute, 2 - substitute fixed zeros only",
            ParamValue::UInt(d.horner_subs_fixed.code()),
        );
        t.insert(
            "horner_frequency",
            "horner's call frequency",
            ParamValue::UInt(d.horner_frequency),
        );
        t.insert(
            "horner_row_length_limit",
            "row is disregarded by the heuristic if its length is longer than the value",
            ParamValue::UInt(d.horner_row_length_limit),
        );
        t.insert("grobner", "run grobner's basis heuristic", ParamValue::Bool(d.grobner));
        t.insert(
            "grobner_eqs_growth",
            "grobner's number of equalities growth",
            ParamValue::UInt(d.grobner_eqs_growth),
        );
        t.insert(
            "grobner_expr_size_growth",
            "grobner's maximum expr size growth",
            ParamValue::UInt(d.grobner_expr_size_growth),
        );
        t.insert(
            "grobner_expr_degree_growth",
            "grobner's maximum expr degree growth",
            ParamValue::UInt(d.grobner_expr_degree_growth),
        );
        t.insert(
            "grobner_max_simplified",
            "grobner's maximum number of simplifications",
            ParamValue::UInt(d.grobner_max_simplified),
        );
        t.insert(
            "grobner_cnfl_to_report",
            "grobner's maximum number of conflicts to report",
            ParamValue::UInt(d.grobner_cnfl_to_report),
        );
        t.insert("gr_q", "grobner's quota", ParamValue::UInt(d.gr_q));
        t.insert(
            "grobner_subs_fixed",
            "0 - no subs, 1 - substitute, 2 - substitute fixed zeros only",
            ParamValue::UInt(d.grobner_subs_fixed.code()),
        );
        t
    }

    /// Build from a flat parameter set, rejecting unknown options, kind
    /// mismatches and out-of-range values.
    pub fn from_params(params: &Params) -> Result<Self> {
        let descrs = Self::descriptors();
        params.validate(&descrs)?;
        let subs = |name: &'static str| -> Result<FixedSubstitution> {
            let code = params.get_uint(&descrs, name)?;
            FixedSubstitution::try_from(code).map_err(|c| {
                OxizError::config(MODULE, name, format!("expected 0, 1 or 2, got {}", c))
            })
        };
        let out = Self {
            order: params.get_bool(&descrs, "order")?,
            tangents: params.get_bool(&descrs, "tangents")?,
            horner: params.get_bool(&descrs, "horner")?,
            horner_subs_fixed: subs("horner_subs_fixed")?,
            horner_frequency: params.get_uint(&descrs, "horner_frequency")?,
            horner_row_length_limit: params.get_uint(&descrs, "horner_row_length_limit")?,
            grobner: params.get_bool(&descrs, "grobner")?,
            grobner_eqs_growth: params.get_uint(&descrs, "grobner_eqs_growth")?,
            grobner_expr_size_growth: params.get_uint(&descrs, "grobner_expr_size_growth")?,
            grobner_expr_degree_growth: params.get_uint(&descrs, "grobner_expr_degree_growth")?,
            grobner_max_simplified: params.get_uint(&descrs, "grobner_max_simplified")?,
            grobner_cnfl_to_report: params.get_uint(&descrs, "grobner_cnfl_to_report")?,
            gr_q: params.get_uint(&descrs, "gr_q")?,
            grobner_subs_fixed: subs("grobner_subs_fixed")?,
        };
        out.validate()?;
        Ok(out)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("horner_frequency", self.horner_frequency),
            ("horner_row_length_limit", self.horner_row_length_limit),
            ("grobner_cnfl_to_report", self.grobner_cnfl_to_report),
            ("grobner_expr_size_growth", self.grobner_expr_size_growth),
            ("grobner_expr_degree_growth", self.grobner_expr_degree_growth),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(OxizError::config(MODULE, name, "must be at least 1"));
            }
        }
        Ok(())
    }

    /// Saturation quotas for one Gröbner invocation.
    pub fn grobner_config(&self) -> GrobnerConfig {
        GrobnerConfig::default()
            .with_max_steps(self.gr_q)
            .with_max_simplifications(self.grobner_max_simplified)
            .with_max_new_equations(self.grobner_eqs_growth)
            .with_growth(self.grobner_expr_size_growth, self.grobner_expr_degree_growth)
            .with_max_conflicts(self.grobner_cnfl_to_report)
    }

    /// Enable or disable order lemmas.
    #[must_use]
    pub fn with_order(mut self, on: bool) -> Self {
        self.order = on;
        self
    }

    /// Enable or disable tangent lemmas.
    #[must_use]
    pub fn with_tangents(mut self, on: bool) -> Self {
        self.tangents = on;
        self
    }

    /// Enable or disable Horner.
    #[must_use]
    pub fn with_horner(mut self, on: bool) -> Self {
        self.horner = on;
        self
    }

    /// Set the Horner call frequency.
    #[must_use]
    pub fn with_horner_frequency(mut self, n: u32) -> Self {
        self.horner_frequency = n;
        self
    }

    /// Set the Horner row length limit.
    #[must_use]
    pub fn with_horner_row_length_limit(mut self, n: u32) -> Self {
        self.horner_row_length_limit = n;
        self
    }

    /// Set the Horner substitution mode.
    #[must_use]
    pub fn with_horner_subs_fixed(mut self, mode: FixedSubstitution) -> Self {
        self.horner_subs_fixed = mode;
        self
    }

    /// Enable or disable Gröbner.
    #[must_use]
    pub fn with_grobner(mut self, on: bool) -> Self {
        self.grobner = on;
        self
    }

    /// Set the Gröbner step quota.
    #[must_use]
    pub fn with_gr_q(mut self, n: u32) -> Self {
        self.gr_q = n;
        self
    }

    /// Set the Gröbner equality growth cap.
    #[must_use]
    pub fn with_grobner_eqs_growth(mut self, n: u32) -> Self {
        self.grobner_eqs_growth = n;
        self
    }

    /// Set the number of Gröbner conflicts to report.
    #[must_use]
    pub fn with_grobner_cnfl_to_report(mut self, n: u32) -> Self {
        self.grobner_cnfl_to_report = n;
        self
    }

    /// Set the Gröbner substitution mode.
    #[must_use]
    pub fn with_grobner_subs_fixed(mut self, mode: FixedSubstitution) -> Self {
        self.grobner_subs_fixed = mode;
        self
    }
}
