//! Array uncertain value
//!
//! A [`UArray`] is the element-wise analog of [`Unum`](crate::scalar::Unum):
//! equal-length nominal/upper/lower vectors sharing one unit tag. Each
//! element's distribution is drawn independently (stochastically
//! uncorrelated across elements) on a fixed-size worker pool, combined
//! elementwise with the operand's distribution, and reduced per row.

use crate::operand::{resolve_units, Operand, UnitPolicy};
use crate::reduce::{QuantileReducer, SummaryMethod};
use rayon::prelude::*;
use tracing::debug;
use uncprop_core::units::normalize;
use uncprop_core::{Error, Result, SampleMatrix, Unit};
use uncprop_dist::ErrorSampler;

use crate::scalar::{DEFAULT_SAMPLE_COUNT, DEFAULT_SIG_FIGS};

/// Fixed parallelism degree for per-element sampling
pub const ARRAY_POOL_WORKERS: usize = 8;

/// An array of values with asymmetric uncertainties
#[derive(Debug, Clone, PartialEq)]
pub struct UArray {
    nominal: Vec<f64>,
    upper: Vec<f64>,
    lower: Vec<f64>,
    unit: Option<Unit>,
    n_samples: usize,
    sig_figs: u32,
    method: SummaryMethod,
}

impl UArray {
    /// Create an array value; all three vectors must share one non-zero
    /// length
    pub fn new(nominal: Vec<f64>, upper: Vec<f64>, lower: Vec<f64>) -> Result<Self> {
        if nominal.is_empty() {
            return Err(Error::InvalidParameter(
                "array value must have at least one element".to_string(),
            ));
        }
        if upper.len() != nominal.len() {
            return Err(Error::shape_mismatch(nominal.len(), upper.len()));
        }
        if lower.len() != nominal.len() {
            return Err(Error::shape_mismatch(nominal.len(), lower.len()));
        }
        if nominal.iter().chain(&upper).chain(&lower).any(|v| !v.is_finite()) {
            return Err(Error::non_finite("array value"));
        }
        if let Some(&bad) = upper.iter().find(|&&e| e < 0.0) {
            return Err(Error::negative_error("upper", bad));
        }
        if let Some(&bad) = lower.iter().find(|&&e| e < 0.0) {
            return Err(Error::negative_error("lower", bad));
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

    /// Create an array whose lower errors default to the upper errors
    pub fn symmetric(nominal: Vec<f64>, errors: Vec<f64>) -> Result<Self> {
        let lower = errors.clone();
        Self::new(nominal, errors, lower)
    }

    /// Tag the array with a physical unit
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

    /// Number of elements
    pub fn len(&self) -> usize {
        self.nominal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominal.is_empty()
    }

    pub fn nominal(&self) -> &[f64] {
        &self.nominal
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Per-element (nominal − lower, nominal, nominal + upper) points
    pub fn quantiles(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let low = self
            .nominal
            .iter()
            .zip(&self.lower)
            .map(|(n, l)| n - l)
            .collect();
        let high = self
            .nominal
            .iter()
            .zip(&self.upper)
            .map(|(n, u)| n + u)
            .collect();
        (low, self.nominal.clone(), high)
    }

    /// The (nominal, upper, lower) vectors
    pub fn value(&self) -> (&[f64], &[f64], &[f64]) {
        (&self.nominal, &self.upper, &self.lower)
    }

    /// Draw one independent sample distribution per element.
    ///
    /// Sampling fans out across a dedicated pool of
    /// [`ARRAY_POOL_WORKERS`] threads and blocks until every element's
    /// row has been gathered; rows share no state, so the final gather is
    /// the only serialization point.
    pub fn sample_distributions(&self) -> Result<SampleMatrix> {
        self.sample_matrix(self.n_samples)
    }

    /// Convert to an equivalent unit, scaling all three vectors
    pub fn to(&self, target: &Unit) -> Result<UArray> {
        let unit = self
            .unit
            .as_ref()
            .ok_or_else(|| Error::unit_mismatch(None, Some(target.name())))?;
        let factor = unit.factor_to(target)?;
        let scale = |v: &[f64]| -> Vec<f64> { v.iter().map(|x| x * factor).collect() };
        Ok(UArray {
            nominal: scale(&self.nominal),
            upper: scale(&self.upper),
            lower: scale(&self.lower),
            unit: Some(target.clone()),
            ..self.clone()
        })
    }

    // Element-wise operators; same unit policies as the scalar type.

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<UArray> {
        self.binary(other.into(), UnitPolicy::Additive, |a, b| a + b)
    }

    pub fn sub<'a>(&self, other: impl Into<Operand<'a>>) -> Result<UArray> {
        self.binary(other.into(), UnitPolicy::Additive, |a, b| a - b)
    }

    pub fn mul<'a>(&self, other: impl Into<Operand<'a>>) -> Result<UArray> {
        self.binary(other.into(), UnitPolicy::Multiply, |a, b| a * b)
    }

    pub fn div<'a>(&self, other: impl Into<Operand<'a>>) -> Result<UArray> {
        self.binary(other.into(), UnitPolicy::Divide, |a, b| a / b)
    }

    /// Floor division; unit-checked like add/sub
    pub fn floordiv<'a>(&self, other: impl Into<Operand<'a>>) -> Result<UArray> {
        self.binary(other.into(), UnitPolicy::FloorDiv, |a, b| (a / b).floor())
    }

    /// Element-wise integer power
    pub fn powi(&self, exp: i32) -> Result<UArray> {
        let unit = normalize(self.unit.as_ref().map(|u| u.powi(exp)));
        self.unary(unit, |x| x.powi(exp))
    }

    /// Element-wise base-10 logarithm; the result is unitless
    pub fn log10(&self) -> Result<UArray> {
        self.unary(None, f64::log10)
    }

    /// Element-wise polynomial evaluation, descending coefficients;
    /// the result is unitless
    pub fn polyval(&self, coeffs: &[f64]) -> Result<UArray> {
        self.unary(None, |x| coeffs.iter().fold(0.0, |acc, &c| acc * x + c))
    }

    fn sample_matrix(&self, n: usize) -> Result<SampleMatrix> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(ARRAY_POOL_WORKERS)
            .build()
            .map_err(|e| Error::Execution(format!("worker pool: {e}")))?;
        debug!(
            elements = self.len(),
            workers = ARRAY_POOL_WORKERS,
            samples = n,
            "dispatching per-element sampling"
        );
        let rows = pool.install(|| {
            (0..self.len())
                .into_par_iter()
                .map(|i| -> Result<Vec<f64>> {
                    let sampler =
                        ErrorSampler::new(self.nominal[i], self.upper[i], self.lower[i], n)?;
                    Ok(sampler.draw(&mut rand::thread_rng())?.values)
                })
                .collect::<Result<Vec<_>>>()
        })?;
        SampleMatrix::from_rows(rows)
    }

    /// Shape validation for a binary operand: numbers, quantities, and
    /// scalar uncertain values broadcast unconditionally; arrays must
    /// match length exactly.
    fn validate_shape(&self, other: &Operand<'_>) -> Result<()> {
        if let Operand::Array(arr) = other {
            if arr.len() != self.len() {
                return Err(Error::shape_mismatch(self.len(), arr.len()));
            }
        }
        Ok(())
    }

    fn reducer(&self) -> QuantileReducer {
        QuantileReducer::new(self.sig_figs, self.method)
    }

    fn from_reduced(
        &self,
        reduced: (Vec<f64>, Vec<f64>, Vec<f64>),
        unit: Option<Unit>,
    ) -> Result<UArray> {
        let (nominal, upper, lower) = reduced;
        let mut out = UArray::new(nominal, upper, lower)?;
        out.unit = unit;
        out.n_samples = self.n_samples;
        out.sig_figs = self.sig_figs;
        out.method = self.method;
        Ok(out)
    }

    fn binary<F>(&self, other: Operand<'_>, policy: UnitPolicy, f: F) -> Result<UArray>
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        // Fail fast: shape and units are checked before any sampling
        self.validate_shape(&other)?;
        let units = resolve_units(policy, self.unit.as_ref(), other.unit())?;
        let conversion = units.conversion.unwrap_or(1.0);
        let n = self.n_samples.max(other.sample_count().unwrap_or(0));

        let mut matrix = self.sample_matrix(n)?;
        match other {
            Operand::Number(v) => matrix.map_in_place(|_, s| f(s, v)),
            Operand::Quantity(v, _) => {
                let v = v * conversion;
                matrix.map_in_place(|_, s| f(s, v));
            }
            // A scalar operand's 1-D distribution broadcasts along the
            // element axis: every row is combined with the same sample
            // vector, keeping sample j aligned with sample j.
            Operand::Scalar(value) => {
                let row = value.draw_raw(n, &mut rand::thread_rng())?;
                for i in 0..matrix.rows() {
                    for (s, &o) in matrix.row_mut(i).iter_mut().zip(row.iter()) {
                        *s = f(*s, o * conversion);
                    }
                }
            }
            Operand::Array(arr) => {
                let other_matrix = arr.sample_matrix(n)?;
                matrix.zip_in_place(&other_matrix, |a, b| f(a, b * conversion))?;
            }
        }

        let reduced = self.reducer().reduce_rows(&matrix)?;
        self.from_reduced(reduced, units.result)
    }

    fn unary<F>(&self, unit: Option<Unit>, f: F) -> Result<UArray>
    where
        F: Fn(f64) -> f64,
    {
        let mut matrix = self.sample_matrix(self.n_samples)?;
        matrix.map_in_place(|_, s| f(s));
        let reduced = self.reducer().reduce_rows(&matrix)?;
        self.from_reduced(reduced, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Unum;
    use approx::assert_abs_diff_eq;

    fn close_all(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = tol);
        }
    }

    #[test]
    fn test_shape_validation_on_construction() {
        let err = UArray::new(vec![1.0, 2.0, 3.0], vec![0.1, 0.1], vec![0.1, 0.1, 0.1]);
        assert!(matches!(err.unwrap_err(), Error::ShapeMismatch { .. }));

        let err = UArray::new(vec![1.0], vec![0.1], vec![-0.1]);
        assert!(matches!(err.unwrap_err(), Error::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_array_rejected_at_construction() {
        // Zero-length arrays have no reducible distributions; every
        // operation would fail downstream, so construction is the error
        let err = UArray::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        let err = UArray::symmetric(vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_sample_distributions_shape() {
        let arr = UArray::symmetric(vec![1.0, 2.0, 3.0], vec![0.1, 0.2, 0.3])
            .unwrap()
            .with_samples(500);
        let matrix = arr.sample_distributions().unwrap();
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.cols(), 500);
        // Rows center on their own element
        for (i, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
            let mean = matrix.row(i).iter().sum::<f64>() / 500.0;
            assert_abs_diff_eq!(mean, *expected, epsilon = 0.1);
        }
    }

    #[test]
    fn test_add_array_shape_mismatch() {
        let a = UArray::symmetric(vec![1.0, 2.0, 3.0], vec![0.1, 0.1, 0.1]).unwrap();
        let b = UArray::symmetric(vec![1.0, 2.0, 3.0, 4.0], vec![0.1; 4]).unwrap();
        let err = a.add(&b).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 3, actual: 4 }));
    }

    #[test]
    fn test_add_number_broadcasts() {
        let a = UArray::symmetric(vec![1.0, 2.0, 3.0], vec![0.1, 0.1, 0.1]).unwrap();
        let sum = a.add(1.0).unwrap();
        close_all(sum.nominal(), &[2.0, 3.0, 4.0], 0.02);
        close_all(sum.upper(), &[0.1, 0.1, 0.1], 0.02);
    }

    #[test]
    fn test_add_scalar_uncertain_broadcasts() {
        let a = UArray::symmetric(vec![10.0, 20.0], vec![0.5, 0.5]).unwrap();
        let b = Unum::symmetric(5.0, 0.5).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.len(), 2);
        close_all(sum.nominal(), &[15.0, 25.0], 0.05);
        // Independent spreads add in quadrature
        close_all(sum.upper(), &[0.5f64.hypot(0.5), 0.5f64.hypot(0.5)], 0.05);
    }

    #[test]
    fn test_elementwise_array_ops() {
        let a = UArray::symmetric(vec![2.0, 4.0], vec![0.05, 0.05]).unwrap();
        let b = UArray::symmetric(vec![3.0, 5.0], vec![0.05, 0.05]).unwrap();
        let product = a.mul(&b).unwrap();
        close_all(product.nominal(), &[6.0, 20.0], 0.05);

        let diff = b.sub(&a).unwrap();
        close_all(diff.nominal(), &[1.0, 1.0], 0.05);
    }

    #[test]
    fn test_unit_checked_add_on_arrays() {
        let a = UArray::symmetric(vec![1.0, 2.0], vec![0.1, 0.1])
            .unwrap()
            .with_unit(Unit::meter());
        let err = a.add(1.0).unwrap_err();
        assert!(matches!(err, Error::UnitMismatch { .. }));

        let sum = a.add((1.0, Unit::kilometer())).unwrap();
        close_all(sum.nominal(), &[1001.0, 1002.0], 0.05);
        assert_eq!(sum.unit().unwrap().name(), "m");
    }

    #[test]
    fn test_degenerate_power_elementwise() {
        let a = UArray::new(vec![2.0, 3.0], vec![0.0, 0.0], vec![0.0, 0.0]).unwrap();
        let sq = a.powi(2).unwrap();
        assert_eq!(sq.nominal(), &[4.0, 9.0]);
        assert_eq!(sq.upper(), &[0.0, 0.0]);
    }

    #[test]
    fn test_polyval_and_log10() {
        let a = UArray::new(vec![10.0, 100.0], vec![0.0, 0.0], vec![0.0, 0.0]).unwrap();
        let logged = a.log10().unwrap();
        assert_eq!(logged.nominal(), &[1.0, 2.0]);
        assert!(logged.unit().is_none());

        let p = a.polyval(&[2.0, 1.0]).unwrap();
        assert_eq!(p.nominal(), &[21.0, 201.0]);
    }

    #[test]
    fn test_unit_conversion() {
        let a = UArray::symmetric(vec![1000.0, 2000.0], vec![100.0, 200.0])
            .unwrap()
            .with_unit(Unit::meter());
        let km = a.to(&Unit::kilometer()).unwrap();
        close_all(km.nominal(), &[1.0, 2.0], 1e-12);
        close_all(km.upper(), &[0.1, 0.2], 1e-12);
        assert_eq!(km.unit().unwrap().name(), "km");
    }

    #[test]
    fn test_quantiles_accessor() {
        let a = UArray::new(vec![5.0], vec![2.0], vec![1.0]).unwrap();
        let (low, mid, high) = a.quantiles();
        assert_eq!(low, vec![4.0]);
        assert_eq!(mid, vec![5.0]);
        assert_eq!(high, vec![7.0]);
    }
}
