//! Minimal physical-unit system
//!
//! Units carry an SI dimension vector and a scale factor to base units.
//! Two units are equivalent when their dimension vectors match; conversion
//! between equivalent units is a pure scale ratio. "No unit" (`None`) is
//! compatible only with "no unit".

use crate::error::{Error, Result};

/// Number of base SI dimensions tracked: length, mass, time, current,
/// temperature, amount, luminosity.
const NDIMS: usize = 7;

const DIM_LENGTH: usize = 0;
const DIM_MASS: usize = 1;
const DIM_TIME: usize = 2;
const DIM_TEMPERATURE: usize = 4;

/// A physical unit: a name, a dimension-exponent vector, and the scale
/// factor to SI base units (e.g. km has scale 1000 over the length base).
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    name: String,
    dims: [i8; NDIMS],
    scale: f64,
}

impl Unit {
    fn base(name: &str, dim: usize, scale: f64) -> Self {
        let mut dims = [0i8; NDIMS];
        dims[dim] = 1;
        Self {
            name: name.to_string(),
            dims,
            scale,
        }
    }

    pub fn meter() -> Self {
        Self::base("m", DIM_LENGTH, 1.0)
    }

    pub fn centimeter() -> Self {
        Self::base("cm", DIM_LENGTH, 0.01)
    }

    pub fn kilometer() -> Self {
        Self::base("km", DIM_LENGTH, 1000.0)
    }

    pub fn second() -> Self {
        Self::base("s", DIM_TIME, 1.0)
    }

    pub fn hour() -> Self {
        Self::base("h", DIM_TIME, 3600.0)
    }

    pub fn gram() -> Self {
        Self::base("g", DIM_MASS, 0.001)
    }

    pub fn kilogram() -> Self {
        Self::base("kg", DIM_MASS, 1.0)
    }

    pub fn kelvin() -> Self {
        Self::base("K", DIM_TEMPERATURE, 1.0)
    }

    /// A named unit with no dimensions (e.g. a count or ratio)
    pub fn dimensionless() -> Self {
        Self {
            name: String::new(),
            dims: [0; NDIMS],
            scale: 1.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scale factor to SI base units
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dims.iter().all(|&d| d == 0)
    }

    /// True when the two units share a dimension vector
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Multiplicative factor converting a magnitude in `self` to `target`
    pub fn factor_to(&self, target: &Unit) -> Result<f64> {
        if !self.is_equivalent(target) {
            return Err(Error::unit_mismatch(Some(&self.name), Some(&target.name)));
        }
        Ok(self.scale / target.scale)
    }

    /// Product unit, combining dimensions and scales
    pub fn mul(&self, other: &Unit) -> Unit {
        let mut dims = [0i8; NDIMS];
        for i in 0..NDIMS {
            dims[i] = self.dims[i] + other.dims[i];
        }
        Unit {
            name: compose_name(&self.name, "·", &other.name),
            dims,
            scale: self.scale * other.scale,
        }
    }

    /// Quotient unit, combining dimensions and scales
    pub fn div(&self, other: &Unit) -> Unit {
        let mut dims = [0i8; NDIMS];
        for i in 0..NDIMS {
            dims[i] = self.dims[i] - other.dims[i];
        }
        Unit {
            name: compose_name(&self.name, "/", &other.name),
            dims,
            scale: self.scale / other.scale,
        }
    }

    /// Integer power of a unit.
    ///
    /// Dimension exponents are computed in `i32` and saturated to the
    /// stored `i8` range; exponents that large have no physical meaning,
    /// but they must not wrap or panic.
    pub fn powi(&self, exp: i32) -> Unit {
        let mut dims = [0i8; NDIMS];
        for i in 0..NDIMS {
            let wide = (self.dims[i] as i32).saturating_mul(exp);
            dims[i] = wide.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
        }
        Unit {
            name: if self.name.is_empty() {
                String::new()
            } else {
                format!("{}^{}", self.name, exp)
            },
            dims,
            scale: self.scale.powi(exp),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn compose_name(left: &str, op: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => String::new(),
        (false, true) => left.to_string(),
        (true, false) => format!("1{op}{right}"),
        (false, false) => format!("{left}{op}{right}"),
    }
}

/// Equivalence predicate over optional unit tags.
///
/// `None`/`None` is compatible (the unitless case); a tagged and an
/// untagged value are not.
pub fn equivalent(a: Option<&Unit>, b: Option<&Unit>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.is_equivalent(b),
        _ => false,
    }
}

/// Result unit of a dimension-combining binary operation, collapsing to
/// `None` when both sides are untagged.
pub fn combine(a: Option<&Unit>, b: Option<&Unit>, op: fn(&Unit, &Unit) -> Unit) -> Option<Unit> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(op(&Unit::dimensionless(), b)),
        (Some(a), Some(b)) => Some(op(a, b)),
    }
}

/// Collapse a pure-ratio unit (dimensionless with unit scale) to `None`
pub fn normalize(unit: Option<Unit>) -> Option<Unit> {
    match unit {
        Some(u) if u.is_dimensionless() && u.scale == 1.0 => None,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equivalence() {
        assert!(Unit::meter().is_equivalent(&Unit::kilometer()));
        assert!(!Unit::meter().is_equivalent(&Unit::second()));
        assert!(equivalent(None, None));
        assert!(!equivalent(Some(&Unit::meter()), None));
        assert!(equivalent(Some(&Unit::meter()), Some(&Unit::centimeter())));
    }

    #[test]
    fn test_conversion_factor() {
        assert_relative_eq!(Unit::kilometer().factor_to(&Unit::meter()).unwrap(), 1000.0);
        assert_relative_eq!(Unit::meter().factor_to(&Unit::kilometer()).unwrap(), 1e-3);
        assert_relative_eq!(Unit::hour().factor_to(&Unit::second()).unwrap(), 3600.0);
        assert!(Unit::meter().factor_to(&Unit::second()).is_err());
    }

    #[test]
    fn test_unit_algebra() {
        let speed = Unit::meter().div(&Unit::second());
        assert_eq!(speed.name(), "m/s");
        assert!(!speed.is_dimensionless());

        let area = Unit::meter().mul(&Unit::meter());
        assert!(area.is_equivalent(&Unit::meter().powi(2)));

        let ratio = Unit::meter().div(&Unit::kilometer());
        assert!(ratio.is_dimensionless());
        assert_relative_eq!(ratio.scale, 1e-3);

        let volume = Unit::meter().powi(3);
        assert_eq!(volume.name(), "m^3");
        assert_relative_eq!(volume.scale, 1.0);
    }

    #[test]
    fn test_powi_extreme_exponents_saturate() {
        // No wrap or panic outside the i8 exponent range
        let huge = Unit::meter().powi(i32::MAX);
        assert!(!huge.is_dimensionless());
        let inverse = Unit::meter().powi(-300);
        assert!(!inverse.is_dimensionless());
        assert!(!huge.is_equivalent(&inverse));
        assert!(Unit::dimensionless().powi(i32::MAX).is_dimensionless());
    }

    #[test]
    fn test_combine_collapses_untagged() {
        assert!(combine(None, None, Unit::mul).is_none());
        let u = combine(Some(&Unit::meter()), None, Unit::mul).unwrap();
        assert!(u.is_equivalent(&Unit::meter()));
        let inv = combine(None, Some(&Unit::second()), Unit::div).unwrap();
        assert!(inv.is_equivalent(&Unit::dimensionless().div(&Unit::second())));
    }
}
