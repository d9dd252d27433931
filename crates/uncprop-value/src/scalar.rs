//! Scalar uncertain value
//!
//! A [`Unum`] is a nominal measurement with asymmetric error bars. Every
//! arithmetic operation resolves its operands to fresh sample
//! distributions, combines them elementwise, and reduces the result back to
//! a new value via order statistics; operands are never mutated.

use crate::operand::{resolve_units, Operand, UnitPolicy};
use crate::reduce::{QuantileReducer, Summary, SummaryMethod};
use rand::Rng;
use uncprop_core::units::normalize;
use uncprop_core::{Error, Result, Unit};
use uncprop_dist::{ErrorSampler, Samples};

/// Default number of Monte-Carlo samples per operation
pub const DEFAULT_SAMPLE_COUNT: usize = 10_000;

/// Default decimal digits kept by the reducer
pub const DEFAULT_SIG_FIGS: u32 = 2;

/// A scalar value with asymmetric uncertainty
#[derive(Debug, Clone, PartialEq)]
pub struct Unum {
    nominal: f64,
    upper: f64,
    lower: f64,
    unit: Option<Unit>,
    n_samples: usize,
    sig_figs: u32,
    method: SummaryMethod,
}

impl Unum {
    /// Create a value with distinct upper and lower error bars
    pub fn new(nominal: f64, upper: f64, lower: f64) -> Result<Self> {
        if !(nominal.is_finite() && upper.is_finite() && lower.is_finite()) {
            return Err(Error::non_finite("uncertain value"));
        }
        if upper < 0.0 {
            return Err(Error::negative_error("upper", upper));
        }
        if lower < 0.0 {
            return Err(Error::negative_error("lower", lower));
        }
        Ok(Self {
            nominal,
            upper,
            lower,
            unit: None,
            n_samples: DEFAULT_SAMPLE_COUNT,
            sig_figs: DEFAULT_SIG_FIGS,
            method: SummaryMethod::MedianOrderStatistic,
        })
    }

    /// Create a value whose lower error defaults to the upper error
    pub fn symmetric(nominal: f64, error: f64) -> Result<Self> {
        Self::new(nominal, error, error)
    }

    /// Tag the value with a physical unit
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Override the per-operation sample count
    pub fn with_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Override the decimal digits kept by reduction
    pub fn with_sig_figs(mut self, sig_figs: u32) -> Self {
        self.sig_figs = sig_figs;
        self
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn sig_figs(&self) -> u32 {
        self.sig_figs
    }

    /// The (nominal − lower, nominal, nominal + upper) quantile points
    pub fn quantiles(&self) -> (f64, f64, f64) {
        (
            self.nominal - self.lower,
            self.nominal,
            self.nominal + self.upper,
        )
    }

    /// The (nominal, upper, lower) triple
    pub fn value(&self) -> (f64, f64, f64) {
        (self.nominal, self.upper, self.lower)
    }

    /// Draw a fresh sample distribution consistent with the error bars.
    ///
    /// This is the read accessor the (external) visualization layer
    /// consumes; nothing is cached between calls.
    pub fn distribution<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Samples> {
        self.sampler(self.n_samples)?.draw(rng)
    }

    /// Convert to an equivalent unit, scaling all three components
    pub fn to(&self, target: &Unit) -> Result<Unum> {
        let unit = self
            .unit
            .as_ref()
            .ok_or_else(|| Error::unit_mismatch(None, Some(target.name())))?;
        let factor = unit.factor_to(target)?;
        Ok(Unum {
            nominal: self.nominal * factor,
            upper: self.upper * factor,
            lower: self.lower * factor,
            unit: Some(target.clone()),
            ..self.clone()
        })
    }

    // Binary operators. Each resolves units before any sampling, draws
    // both operand distributions at a shared effective sample count, and
    // reduces the combined distribution into a new value.

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Unum> {
        self.add_with_rng(other, &mut rand::thread_rng())
    }

    pub fn add_with_rng<'a, R: Rng + ?Sized>(
        &self,
        other: impl Into<Operand<'a>>,
        rng: &mut R,
    ) -> Result<Unum> {
        self.binary(other.into(), UnitPolicy::Additive, rng, |a, b| a + b)
    }

    pub fn sub<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Unum> {
        self.sub_with_rng(other, &mut rand::thread_rng())
    }

    pub fn sub_with_rng<'a, R: Rng + ?Sized>(
        &self,
        other: impl Into<Operand<'a>>,
        rng: &mut R,
    ) -> Result<Unum> {
        self.binary(other.into(), UnitPolicy::Additive, rng, |a, b| a - b)
    }

    pub fn mul<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Unum> {
        self.mul_with_rng(other, &mut rand::thread_rng())
    }

    pub fn mul_with_rng<'a, R: Rng + ?Sized>(
        &self,
        other: impl Into<Operand<'a>>,
        rng: &mut R,
    ) -> Result<Unum> {
        self.binary(other.into(), UnitPolicy::Multiply, rng, |a, b| a * b)
    }

    pub fn div<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Unum> {
        self.div_with_rng(other, &mut rand::thread_rng())
    }

    pub fn div_with_rng<'a, R: Rng + ?Sized>(
        &self,
        other: impl Into<Operand<'a>>,
        rng: &mut R,
    ) -> Result<Unum> {
        self.binary(other.into(), UnitPolicy::Divide, rng, |a, b| a / b)
    }

    /// Floor division; unit-checked like add/sub (deliberate policy
    /// asymmetry with `div`, kept as-is)
    pub fn floordiv<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Unum> {
        self.floordiv_with_rng(other, &mut rand::thread_rng())
    }

    pub fn floordiv_with_rng<'a, R: Rng + ?Sized>(
        &self,
        other: impl Into<Operand<'a>>,
        rng: &mut R,
    ) -> Result<Unum> {
        self.binary(other.into(), UnitPolicy::FloorDiv, rng, |a, b| (a / b).floor())
    }

    /// Integer power; the exponent is a plain number, never an uncertain
    /// value
    pub fn powi(&self, exp: i32) -> Result<Unum> {
        self.powi_with_rng(exp, &mut rand::thread_rng())
    }

    pub fn powi_with_rng<R: Rng + ?Sized>(&self, exp: i32, rng: &mut R) -> Result<Unum> {
        let unit = normalize(self.unit.as_ref().map(|u| u.powi(exp)));
        self.unary(unit, rng, |x| x.powi(exp))
    }

    /// Base-10 logarithm; the result is unitless
    pub fn log10(&self) -> Result<Unum> {
        self.log10_with_rng(&mut rand::thread_rng())
    }

    pub fn log10_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Unum> {
        self.unary(None, rng, f64::log10)
    }

    /// Evaluate a polynomial with descending-order coefficients at this
    /// value; the result is unitless
    pub fn polyval(&self, coeffs: &[f64]) -> Result<Unum> {
        self.polyval_with_rng(coeffs, &mut rand::thread_rng())
    }

    pub fn polyval_with_rng<R: Rng + ?Sized>(&self, coeffs: &[f64], rng: &mut R) -> Result<Unum> {
        self.unary(None, rng, |x| {
            coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
        })
    }

    fn sampler(&self, n: usize) -> Result<ErrorSampler> {
        Ok(ErrorSampler::new(self.nominal, self.upper, self.lower, n)?
            .with_unit(self.unit.clone()))
    }

    /// Raw magnitudes of a fresh sample distribution at an explicit count
    pub(crate) fn draw_raw<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>> {
        Ok(self.sampler(n)?.draw(rng)?.values)
    }

    fn reducer(&self) -> QuantileReducer {
        QuantileReducer::new(self.sig_figs, self.method)
    }

    fn from_summary(&self, summary: Summary, unit: Option<Unit>) -> Result<Unum> {
        let mut out = Unum::new(summary.center, summary.upper, summary.lower)?;
        out.unit = unit;
        out.n_samples = self.n_samples;
        out.sig_figs = self.sig_figs;
        out.method = self.method;
        Ok(out)
    }

    fn binary<R, F>(&self, other: Operand<'_>, policy: UnitPolicy, rng: &mut R, f: F) -> Result<Unum>
    where
        R: Rng + ?Sized,
        F: Fn(f64, f64) -> f64,
    {
        // Fail fast: units are resolved before any sampling begins
        let units = resolve_units(policy, self.unit.as_ref(), other.unit())?;
        let conversion = units.conversion.unwrap_or(1.0);
        let n = self.n_samples.max(other.sample_count().unwrap_or(0));

        let mut dist = self.draw_raw(n, rng)?;
        match other {
            Operand::Number(v) => {
                for s in dist.iter_mut() {
                    *s = f(*s, v);
                }
            }
            Operand::Quantity(v, _) => {
                let v = v * conversion;
                for s in dist.iter_mut() {
                    *s = f(*s, v);
                }
            }
            Operand::Scalar(value) => {
                let other_dist = value.draw_raw(n, rng)?;
                for (s, &o) in dist.iter_mut().zip(other_dist.iter()) {
                    *s = f(*s, o * conversion);
                }
            }
            Operand::Array(_) => {
                return Err(Error::InvalidOperand(
                    "array operand on a scalar value; apply the operator on the array side"
                        .to_string(),
                ));
            }
        }

        let summary = self.reducer().reduce(&dist)?;
        self.from_summary(summary, units.result)
    }

    fn unary<R, F>(&self, unit: Option<Unit>, rng: &mut R, f: F) -> Result<Unum>
    where
        R: Rng + ?Sized,
        F: Fn(f64) -> f64,
    {
        let mut dist = self.draw_raw(self.n_samples, rng)?;
        for s in dist.iter_mut() {
            *s = f(*s);
        }
        let summary = self.reducer().reduce(&dist)?;
        self.from_summary(summary, unit)
    }
}

impl std::fmt::Display for Unum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.upper == self.lower {
            write!(f, "{}({})", self.nominal, self.upper)?;
        } else {
            write!(f, "{}(+{},-{})", self.nominal, self.upper, self.lower)?;
        }
        if let Some(unit) = &self.unit {
            write!(f, " {unit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1234)
    }

    #[test]
    fn test_construction_defaults() {
        let v = Unum::symmetric(5.0, 1.0).unwrap();
        assert_eq!(v.value(), (5.0, 1.0, 1.0));
        assert_eq!(v.n_samples(), DEFAULT_SAMPLE_COUNT);
        assert_eq!(v.quantiles(), (4.0, 5.0, 6.0));
        assert!(Unum::new(5.0, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_add_zero_round_trips() {
        let v = Unum::new(5.0, 1.0, 1.0).unwrap();
        let sum = v.add_with_rng(0.0, &mut rng()).unwrap();
        assert_abs_diff_eq!(sum.nominal(), 5.0, epsilon = 0.05);
        assert_abs_diff_eq!(sum.upper(), 1.0, epsilon = 0.08);
        assert_abs_diff_eq!(sum.lower(), 1.0, epsilon = 0.08);
        assert!(sum.unit().is_none());
    }

    #[test]
    fn test_add_two_uncertain_values() {
        let a = Unum::new(5.0, 1.0, 1.0).unwrap().with_samples(50_000);
        let b = Unum::new(3.0, 1.0, 1.0).unwrap();
        let sum = a.add_with_rng(&b, &mut rng()).unwrap();
        assert_abs_diff_eq!(sum.nominal(), 8.0, epsilon = 0.05);
        // Independent Gaussians: spreads add in quadrature
        assert_abs_diff_eq!(sum.upper(), 2f64.sqrt(), epsilon = 0.1);
    }

    #[test]
    fn test_effective_sample_count_does_not_mutate_operand() {
        let a = Unum::new(5.0, 1.0, 1.0).unwrap().with_samples(20_000);
        let b = Unum::new(3.0, 1.0, 1.0).unwrap().with_samples(4_000);
        let before = b.n_samples();
        a.add_with_rng(&b, &mut rng()).unwrap();
        assert_eq!(b.n_samples(), before);
    }

    #[test]
    fn test_unit_checked_add() {
        let m = Unum::symmetric(1000.0, 10.0).unwrap().with_unit(Unit::meter());
        let err = m.add_with_rng(1.0, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::UnitMismatch { .. }));

        let sum = m
            .add_with_rng((1.0, Unit::kilometer()), &mut rng())
            .unwrap();
        assert_abs_diff_eq!(sum.nominal(), 2000.0, epsilon = 1.0);
        assert_eq!(sum.unit().unwrap().name(), "m");
    }

    #[test]
    fn test_mul_is_not_unit_checked() {
        let m = Unum::symmetric(4.0, 0.5).unwrap().with_unit(Unit::meter());
        let s = Unum::symmetric(2.0, 0.1).unwrap().with_unit(Unit::second());
        let product = m.mul_with_rng(&s, &mut rng()).unwrap();
        assert_abs_diff_eq!(product.nominal(), 8.0, epsilon = 0.2);
        assert_eq!(product.unit().unwrap().name(), "m·s");

        let scaled = m.mul_with_rng(2.0, &mut rng()).unwrap();
        assert_abs_diff_eq!(scaled.nominal(), 8.0, epsilon = 0.2);
        assert_abs_diff_eq!(scaled.upper(), 1.0, epsilon = 0.1);
        assert_eq!(scaled.unit().unwrap().name(), "m");
    }

    #[test]
    fn test_div_derives_rate_unit() {
        let d = Unum::symmetric(100.0, 1.0).unwrap().with_unit(Unit::meter());
        let t = Unum::symmetric(10.0, 0.1).unwrap().with_unit(Unit::second());
        let speed = d.div_with_rng(&t, &mut rng()).unwrap();
        assert_abs_diff_eq!(speed.nominal(), 10.0, epsilon = 0.2);
        assert_eq!(speed.unit().unwrap().name(), "m/s");
    }

    #[test]
    fn test_floordiv_unit_checked_and_unitless() {
        let a = Unum::symmetric(10.0, 0.1).unwrap().with_unit(Unit::meter());
        let b = Unum::symmetric(4.0, 0.1).unwrap().with_unit(Unit::second());
        assert!(matches!(
            a.floordiv_with_rng(&b, &mut rng()).unwrap_err(),
            Error::UnitMismatch { .. }
        ));

        let c = Unum::symmetric(4.0, 0.01).unwrap().with_unit(Unit::meter());
        let q = a.floordiv_with_rng(&c, &mut rng()).unwrap();
        assert_abs_diff_eq!(q.nominal(), 2.0, epsilon = 0.01);
        assert!(q.unit().is_none());
    }

    #[test]
    fn test_degenerate_power() {
        let v = Unum::new(2.0, 0.0, 0.0).unwrap();
        let cubed = v.powi_with_rng(3, &mut rng()).unwrap();
        assert_eq!(cubed.nominal(), 8.0);
        assert_eq!(cubed.upper(), 0.0);
        assert_eq!(cubed.lower(), 0.0);
    }

    #[test]
    fn test_power_carries_unit_exponent() {
        let v = Unum::symmetric(3.0, 0.1).unwrap().with_unit(Unit::meter());
        let sq = v.powi_with_rng(2, &mut rng()).unwrap();
        assert_abs_diff_eq!(sq.nominal(), 9.0, epsilon = 0.2);
        assert_eq!(sq.unit().unwrap().name(), "m^2");
    }

    #[test]
    fn test_log10() {
        let v = Unum::symmetric(100.0, 1.0).unwrap().with_samples(50_000);
        let logged = v.log10_with_rng(&mut rng()).unwrap();
        assert_abs_diff_eq!(logged.nominal(), 2.0, epsilon = 0.01);
        assert!(logged.unit().is_none());
    }

    #[test]
    fn test_polyval() {
        // p(x) = x^2 + 2x + 1 at x = 3 (+-0) is exactly 16
        let v = Unum::new(3.0, 0.0, 0.0).unwrap();
        let p = v.polyval_with_rng(&[1.0, 2.0, 1.0], &mut rng()).unwrap();
        assert_eq!(p.nominal(), 16.0);
        assert_eq!(p.upper(), 0.0);
    }

    #[test]
    fn test_array_operand_rejected() {
        use crate::array::UArray;
        let v = Unum::symmetric(1.0, 0.1).unwrap();
        let arr = UArray::symmetric(vec![1.0, 2.0], vec![0.1, 0.1]).unwrap();
        let err = v.add_with_rng(&arr, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::InvalidOperand(_)));
    }

    #[test]
    fn test_unit_conversion() {
        let v = Unum::new(1000.0, 100.0, 50.0)
            .unwrap()
            .with_unit(Unit::meter());
        let km = v.to(&Unit::kilometer()).unwrap();
        assert_abs_diff_eq!(km.nominal(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(km.upper(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(km.lower(), 0.05, epsilon = 1e-12);

        assert!(v.to(&Unit::second()).is_err());
        assert!(Unum::symmetric(1.0, 0.1)
            .unwrap()
            .to(&Unit::meter())
            .is_err());
    }

    #[test]
    fn test_display() {
        let v = Unum::new(5.0, 2.0, 1.0).unwrap().with_unit(Unit::meter());
        assert_eq!(v.to_string(), "5(+2,-1) m");
        let s = Unum::symmetric(5.0, 1.0).unwrap();
        assert_eq!(s.to_string(), "5(1)");
    }

    #[test]
    fn test_distribution_accessor() {
        let v = Unum::symmetric(5.0, 1.0).unwrap().with_unit(Unit::meter());
        let samples = v.distribution(&mut rng()).unwrap();
        assert_eq!(samples.values.len(), DEFAULT_SAMPLE_COUNT);
        assert_eq!(samples.unit.as_ref().unwrap().name(), "m");
    }
}
