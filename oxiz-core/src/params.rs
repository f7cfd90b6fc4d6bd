//! Typed option descriptors and parameter sets.
//!
//! Every module (`solver`, `nla`, ...) publishes a [`ParamDescrs`] table that
//! names its options together with their kind, default and description.
//! A [`Params`] set carries user-supplied values; it is validated against the
//! descriptor table once, before a session is built, and then turned into a
//! strongly-typed configuration struct by the owning crate.

use crate::error::{OxizError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Boolean flag.
    Bool,
    /// Unsigned 32-bit integer.
    UInt,
    /// Symbol (free-form string, e.g. a file path).
    Symbol,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Bool => write!(f, "bool"),
            ParamKind::UInt => write!(f, "unsigned int"),
            ParamKind::Symbol => write!(f, "symbol"),
        }
    }
}

/// A concrete option value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    /// Boolean value.
    Bool(bool),
    /// Unsigned value.
    UInt(u32),
    /// Symbol value.
    Symbol(String),
}

impl ParamValue {
    /// Kind of this value.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::UInt(_) => ParamKind::UInt,
            ParamValue::Symbol(_) => ParamKind::Symbol,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::UInt(n) => write!(f, "{}", n),
            ParamValue::Symbol(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Description of a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescr {
    /// Option name, unique within its module.
    pub name: &'static str,
    /// Value kind.
    pub kind: ParamKind,
    /// Default value.
    pub default: ParamValue,
    /// One-line description.
    pub description: &'static str,
}

/// Descriptor table of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescrs {
    module: &'static str,
    descrs: Vec<ParamDescr>,
}

impl ParamDescrs {
    /// Create an empty table for `module`.
    pub fn new(module: &'static str) -> Self {
        Self {
            module,
            descrs: Vec::new(),
        }
    }

    /// Register an option. The default's kind determines the option kind.
    pub fn insert(&mut self, name: &'static str, description: &'static str, default: ParamValue) {
        debug_assert!(self.get(name).is_none(), "duplicate option {}", name);
        self.descrs.push(ParamDescr {
            name,
            kind: default.kind(),
            default,
            description,
        });
    }

    /// Module name.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Look up an option by name.
    pub fn get(&self, name: &str) -> Option<&ParamDescr> {
        self.descrs.iter().find(|d| d.name == name)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.descrs.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.descrs.is_empty()
    }

    /// Iterate over the options in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamDescr> {
        self.descrs.iter()
    }

    /// Human-readable help text, one line per option.
    pub fn help(&self) -> String {
        let mut out = format!("{} parameters:\n", self.module);
        for d in &self.descrs {
            out.push_str(&format!(
                "  {} ({}) {} (default: {})\n",
                d.name, d.kind, d.description, d.default
            ));
        }
        out
    }
}

/// A set of user-supplied option values for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a boolean option.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.values.insert(name.into(), ParamValue::Bool(value));
        self
    }

    /// Set an unsigned option.
    pub fn set_uint(&mut self, name: impl Into<String>, value: u32) -> &mut Self {
        self.values.insert(name.into(), ParamValue::UInt(value));
        self
    }

    /// Set a symbol option.
    pub fn set_symbol(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values
            .insert(name.into(), ParamValue::Symbol(value.into()));
        self
    }

    /// Raw value of an option, if set.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Number of set options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no option is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check every set option against `descrs`: it must exist and have the right kind.
    pub fn validate(&self, descrs: &ParamDescrs) -> Result<()> {
        for (name, value) in &self.values {
            let Some(descr) = descrs.get(name) else {
                return Err(OxizError::config(
                    descrs.module(),
                    name.as_str(),
                    "unknown parameter",
                ));
            };
            if descr.kind != value.kind() {
                return Err(OxizError::config(
                    descrs.module(),
                    name.as_str(),
                    format!("expected {}, got {}", descr.kind, value.kind()),
                ));
            }
        }
        Ok(())
    }

    /// Boolean value of `name`, falling back to the descriptor default.
    pub fn get_bool(&self, descrs: &ParamDescrs, name: &str) -> Result<bool> {
        match self.lookup(descrs, name)? {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(kind_error(descrs, name, ParamKind::Bool, other)),
        }
    }

    /// Unsigned value of `name`, falling back to the descriptor default.
    pub fn get_uint(&self, descrs: &ParamDescrs, name: &str) -> Result<u32> {
        match self.lookup(descrs, name)? {
            ParamValue::UInt(n) => Ok(*n),
            other => Err(kind_error(descrs, name, ParamKind::UInt, other)),
        }
    }

    /// Symbol value of `name`, falling back to the descriptor default.
    pub fn get_symbol(&self, descrs: &ParamDescrs, name: &str) -> Result<String> {
        match self.lookup(descrs, name)? {
            ParamValue::Symbol(s) => Ok(s.clone()),
            other => Err(kind_error(descrs, name, ParamKind::Symbol, other)),
        }
    }

    fn lookup<'a>(&'a self, descrs: &'a ParamDescrs, name: &str) -> Result<&'a ParamValue> {
        if let Some(value) = self.values.get(name) {
            return Ok(value);
        }
        descrs
            .get(name)
            .map(|d| &d.default)
            .ok_or_else(|| OxizError::config(descrs.module(), name, "unknown parameter"))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(params")?;
        for (name, value) in &self.values {
            write!(f, " {} {}", name, value)?;
        }
        write!(f, ")")
    }
}

fn kind_error(descrs: &ParamDescrs, name: &str, expected: ParamKind, got: &ParamValue) -> OxizError {
    OxizError::config(
        descrs.module(),
        name,
        format!("expected {}, got {}", expected, got.kind()),
    )
}
