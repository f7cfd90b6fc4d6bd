//! Named counters reported by a session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered collection of named `u64` counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    entries: BTreeMap<String, u64>,
}

impl Statistics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `key` by one.
    pub fn inc(&mut self, key: &str) {
        self.add(key, 1);
    }

    /// Increment `key` by `n`.
    pub fn add(&mut self, key: &str, n: u64) {
        *self.entries.entry(key.to_string()).or_insert(0) += n;
    }

    /// Overwrite `key` with `value`.
    pub fn set(&mut self, key: &str, value: u64) {
        self.entries.insert(key.to_string(), value);
    }

    /// Value of `key`, zero when absent.
    pub fn get(&self, key: &str) -> u64 {
        self.entries.get(key).copied().unwrap_or(0)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no counter was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &Statistics) {
        for (k, v) in other.iter() {
            self.add(k, v);
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            write!(f, ":{} {}", k, v)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut s = Statistics::new();
        s.inc("rounds");
        s.inc("rounds");
        s.add("grobner-steps", 5);
        assert_eq!(s.get("rounds"), 2);
        assert_eq!(s.get("grobner-steps"), 5);
        assert_eq!(s.get("missing"), 0);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_display_is_sorted() {
        let mut s = Statistics::new();
        s.set("b", 2);
        s.set("a", 1);
        assert_eq!(s.to_string(), "(:a 1\n :b 2)");
    }

    #[test]
    fn test_merge() {
        let mut a = Statistics::new();
        a.add("x", 1);
        let mut b = Statistics::new();
        b.add("x", 2);
        b.add("y", 3);
        a.merge(&b);
        assert_eq!(a.get("x"), 3);
        assert_eq!(a.get("y"), 3);
    }
}
