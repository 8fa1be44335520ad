//! Value - A measurement tagged with its unit.

use std::fmt;

use crate::types::Unit;

/// Magnitude used for "no value". Layout sizes of `UNDEFINED` mean unconstrained.
pub const UNDEFINED: f32 = f32::NAN;

/// Check whether a magnitude is the undefined sentinel.
#[inline]
pub fn is_undefined(value: f32) -> bool {
    value.is_nan()
}

/// Compare two magnitudes, treating two undefined values as equal.
pub fn values_equal(a: f32, b: f32) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    (b - a).abs() < f32::MIN_POSITIVE
}

/// A style value: magnitude plus [`Unit`].
///
/// Equality ignores the magnitude of undefined values, since it carries no
/// meaning for that unit.
#[derive(Debug, Clone, Copy)]
pub struct Value {
    value: f32,
    unit: Unit,
}

impl Value {
    /// Point value; an undefined magnitude yields [`Value::undefined`].
    pub fn point(value: f32) -> Self {
        Self {
            value,
            unit: if is_undefined(value) { Unit::Undefined } else { Unit::Point },
        }
    }

    /// Percent value (0-100); an undefined magnitude yields [`Value::undefined`].
    pub fn percent(value: f32) -> Self {
        Self {
            value,
            unit: if is_undefined(value) { Unit::Undefined } else { Unit::Percent },
        }
    }

    pub const fn auto() -> Self {
        Self { value: 0.0, unit: Unit::Auto }
    }

    pub const fn undefined() -> Self {
        Self { value: UNDEFINED, unit: Unit::Undefined }
    }

    #[inline]
    pub const fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.unit == Unit::Undefined
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::undefined()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && (self.value == other.value || self.unit == Unit::Undefined)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::point(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Undefined => f.write_str("undefined"),
            Unit::Auto => f.write_str("auto"),
            Unit::Point => write!(f, "{}px", self.value),
            Unit::Percent => write!(f, "{}%", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_parts(value: f32, unit: Unit) -> Value {
        Value { value, unit }
    }

    #[test]
    fn test_undefined_ignores_magnitude() {
        assert_eq!(Value::undefined(), from_parts(5.0, Unit::Undefined));
        assert_eq!(from_parts(1.0, Unit::Undefined), from_parts(2.0, Unit::Undefined));
    }

    #[test]
    fn test_point_and_percent_equality() {
        assert_eq!(Value::point(5.0), Value::point(5.0));
        assert_ne!(Value::point(5.0), Value::percent(5.0));
        assert_ne!(Value::point(5.0), Value::point(6.0));
        assert_eq!(Value::auto(), Value::auto());
    }

    #[test]
    fn test_undefined_magnitude_downgrades() {
        assert_eq!(Value::point(UNDEFINED).unit(), Unit::Undefined);
        assert_eq!(Value::percent(UNDEFINED).unit(), Unit::Undefined);
        assert_eq!(Value::from(12.0).unit(), Unit::Point);
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(UNDEFINED, UNDEFINED));
        assert!(!values_equal(UNDEFINED, 0.0));
        assert!(values_equal(1.5, 1.5));
        assert!(!values_equal(1.5, 1.6));
        assert!(!values_equal(1.0, 1.0 + f32::EPSILON));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::point(10.0).to_string(), "10px");
        assert_eq!(Value::percent(50.0).to_string(), "50%");
        assert_eq!(Value::auto().to_string(), "auto");
        assert_eq!(Value::undefined().to_string(), "undefined");
    }
}
