//! Property-based tests for oxiz-math
//!
//! This module contains property tests for:
//! - Polynomial arithmetic and substitution
//! - Interval enclosures and Horner evaluation
//! - Gröbner saturation quotas

mod grobner_properties;
mod interval_properties;
mod polynomial_properties;
