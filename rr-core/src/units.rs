//! Type-safe wrappers for replay quantities
//!
//! Newtype wrappers around f64 so a heading is never confused with a
//! percentage or a duration.
//!
//! All unit types serialize with 4 decimal places to reduce JSON payload size.

use serde::{Deserialize, Serialize};

/// Round f64 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((*val * 10000.0).round() / 10000.0)
}

/// Heading in degrees, counter-clockwise from the positive x axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Degrees(#[serde(serialize_with = "round4")] pub f64);

impl Degrees {
    /// Heading of the vector `(dx, dy)`. A zero vector yields 0.
    pub fn from_vector(dx: f64, dy: f64) -> Self {
        Self(dy.atan2(dx).to_degrees())
    }
}

/// Percentage on the 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Percent(#[serde(serialize_with = "round4")] pub f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);
    pub const FULL: Percent = Percent(100.0);

    /// Create a new percentage, clamping to [0.0, 100.0]. NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Get as a fraction (0-1)
    pub fn as_fraction(&self) -> f64 {
        self.0 / 100.0
    }
}

/// Minutes (arrival, loading and travel times)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Minutes(#[serde(serialize_with = "round4")] pub f64);

/// Distance in floor grid units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridUnits(#[serde(serialize_with = "round4")] pub f64);
