//! Explicit operand polymorphism for arithmetic
//!
//! Binary operators accept plain numbers, unit-tagged quantities, scalar
//! uncertain values, and array uncertain values. The `Operand` enum makes
//! that set closed and pattern-matchable instead of relying on duck-typed
//! probing, and the unit-policy resolution here is shared by the scalar and
//! array operator implementations.

use crate::array::UArray;
use crate::scalar::Unum;
use uncprop_core::units::{combine, equivalent, normalize};
use uncprop_core::{Error, Result, Unit};

/// One side of a binary operation
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// A bare number, broadcast as a constant
    Number(f64),
    /// A unit-tagged exact quantity, broadcast as a constant
    Quantity(f64, Unit),
    /// A scalar uncertain value, resolved by sampling
    Scalar(&'a Unum),
    /// An array uncertain value, resolved by per-element sampling
    Array(&'a UArray),
}

impl Operand<'_> {
    /// The operand's unit tag, if any
    pub fn unit(&self) -> Option<&Unit> {
        match self {
            Operand::Number(_) => None,
            Operand::Quantity(_, unit) => Some(unit),
            Operand::Scalar(value) => value.unit(),
            Operand::Array(value) => value.unit(),
        }
    }

    /// The operand's own sample count, for uncertain operands
    pub fn sample_count(&self) -> Option<usize> {
        match self {
            Operand::Scalar(value) => Some(value.n_samples()),
            Operand::Array(value) => Some(value.n_samples()),
            _ => None,
        }
    }
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self {
        Operand::Number(v)
    }
}

impl From<i32> for Operand<'_> {
    fn from(v: i32) -> Self {
        Operand::Number(v as f64)
    }
}

impl From<(f64, Unit)> for Operand<'_> {
    fn from((v, unit): (f64, Unit)) -> Self {
        Operand::Quantity(v, unit)
    }
}

impl<'a> From<&'a Unum> for Operand<'a> {
    fn from(v: &'a Unum) -> Self {
        Operand::Scalar(v)
    }
}

impl<'a> From<&'a UArray> for Operand<'a> {
    fn from(v: &'a UArray) -> Self {
        Operand::Array(v)
    }
}

/// Unit handling of a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitPolicy {
    /// Operands must be unit-equivalent; result keeps the left unit
    /// (add, subtract)
    Additive,
    /// Operands must be unit-equivalent; result is unitless (floor divide)
    FloorDiv,
    /// No unit check; units multiply
    Multiply,
    /// No unit check; units divide
    Divide,
}

/// Outcome of unit resolution for one binary operation
#[derive(Debug)]
pub(crate) struct ResolvedUnits {
    /// Unit of the produced value
    pub result: Option<Unit>,
    /// Factor converting right-operand magnitudes into the left unit
    /// (only set for equivalence-checked policies)
    pub conversion: Option<f64>,
}

/// Apply a unit policy before any sampling happens (fail fast)
pub(crate) fn resolve_units(
    policy: UnitPolicy,
    lhs: Option<&Unit>,
    rhs: Option<&Unit>,
) -> Result<ResolvedUnits> {
    match policy {
        UnitPolicy::Additive | UnitPolicy::FloorDiv => {
            if !equivalent(lhs, rhs) {
                return Err(Error::unit_mismatch(
                    lhs.map(Unit::name),
                    rhs.map(Unit::name),
                ));
            }
            let conversion = match (lhs, rhs) {
                (Some(l), Some(r)) => Some(r.factor_to(l)?),
                _ => None,
            };
            let result = match policy {
                UnitPolicy::Additive => lhs.cloned(),
                _ => None,
            };
            Ok(ResolvedUnits { result, conversion })
        }
        UnitPolicy::Multiply => Ok(ResolvedUnits {
            result: normalize(combine(lhs, rhs, Unit::mul)),
            conversion: None,
        }),
        UnitPolicy::Divide => Ok(ResolvedUnits {
            result: normalize(combine(lhs, rhs, Unit::div)),
            conversion: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_operand_units() {
        assert!(Operand::Number(1.0).unit().is_none());
        let q = Operand::Quantity(2.0, Unit::meter());
        assert_eq!(q.unit().unwrap().name(), "m");
        assert!(q.sample_count().is_none());
    }

    #[test]
    fn test_additive_requires_equivalence() {
        let err = resolve_units(
            UnitPolicy::Additive,
            Some(&Unit::meter()),
            Some(&Unit::second()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnitMismatch { .. }));

        let err = resolve_units(UnitPolicy::Additive, Some(&Unit::meter()), None).unwrap_err();
        assert!(matches!(err, Error::UnitMismatch { .. }));

        let ok = resolve_units(
            UnitPolicy::Additive,
            Some(&Unit::meter()),
            Some(&Unit::kilometer()),
        )
        .unwrap();
        assert_relative_eq!(ok.conversion.unwrap(), 1000.0);
        assert_eq!(ok.result.unwrap().name(), "m");
    }

    #[test]
    fn test_floordiv_result_unitless() {
        let ok = resolve_units(
            UnitPolicy::FloorDiv,
            Some(&Unit::meter()),
            Some(&Unit::meter()),
        )
        .unwrap();
        assert!(ok.result.is_none());
        assert_relative_eq!(ok.conversion.unwrap(), 1.0);
    }

    #[test]
    fn test_multiplicative_units_combine() {
        let ok = resolve_units(
            UnitPolicy::Divide,
            Some(&Unit::meter()),
            Some(&Unit::second()),
        )
        .unwrap();
        assert_eq!(ok.result.unwrap().name(), "m/s");
        assert!(ok.conversion.is_none());

        // Same-unit division collapses to unitless
        let ok = resolve_units(
            UnitPolicy::Divide,
            Some(&Unit::meter()),
            Some(&Unit::meter()),
        )
        .unwrap();
        assert!(ok.result.is_none());

        let ok = resolve_units(UnitPolicy::Multiply, None, None).unwrap();
        assert!(ok.result.is_none());
    }
}
