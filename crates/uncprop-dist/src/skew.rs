//! Skew-normal distribution fitted to asymmetric quantiles
//!
//! The three-parameter (location, scale, shape) skew-normal generalizes the
//! normal distribution with a shape parameter controlling asymmetry. Given a
//! median and unequal upper/lower error bars, [`SkewNormal::fit`] finds the
//! parameters whose CDF reproduces the observed 0.15866 / 0.5 / 0.84134
//! quantiles, and [`SkewNormal::sample`] draws from the fitted distribution
//! using Azzalini's stochastic representation.

use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, trace};
use uncprop_core::math::{erf, integrate, standard_normal_pdf};
use uncprop_core::{Error, Result};

/// The three target quantile levels matched by the fit
pub const QUANTILE_LEVELS: [f64; 3] = [0.15866, 0.5, 0.84134];

/// Scale floor keeping the density finite during optimization
const MIN_SCALE: f64 = 1e-12;

/// Quadrature tolerance for CDF integrals
const CDF_TOL: f64 = 1e-9;

/// A skew-normal distribution with location, scale > 0, and shape
#[derive(Debug, Clone, PartialEq)]
pub struct SkewNormal {
    location: f64,
    scale: f64,
    shape: f64,
}

impl SkewNormal {
    /// Create a distribution from explicit parameters
    pub fn new(location: f64, scale: f64, shape: f64) -> Result<Self> {
        if !(location.is_finite() && scale.is_finite() && shape.is_finite()) {
            return Err(Error::non_finite("skew-normal parameters"));
        }
        if scale <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "scale must be positive, got {scale}"
            )));
        }
        Ok(Self {
            location,
            scale,
            shape,
        })
    }

    /// Fit a skew-normal to a median with asymmetric error bars.
    ///
    /// Solves a nonlinear least-squares problem over (location, sqrt-scale,
    /// sqrt-shape) so that the CDF at `median - lower`, `median`, and
    /// `median + upper` matches [`QUANTILE_LEVELS`]. The squared free
    /// variables keep the scale positive and pin the shape sign to
    /// `sign(upper - lower)`. Equal error bars are degenerate here (the
    /// shape gradient vanishes at zero); callers sample a plain Gaussian
    /// for that case instead.
    pub fn fit(median: f64, upper: f64, lower: f64) -> Result<Self> {
        if !(median.is_finite() && upper.is_finite() && lower.is_finite()) {
            return Err(Error::non_finite("fit inputs"));
        }
        if upper == lower {
            return Self::new(median, upper.max(MIN_SCALE), 0.0);
        }

        let sign = (upper - lower).signum();
        let xs = [median - lower, median, median + upper];
        let targets = Vector3::new(QUANTILE_LEVELS[0], QUANTILE_LEVELS[1], QUANTILE_LEVELS[2]);

        let model = |p: &Vector3<f64>| -> Result<Vector3<f64>> {
            let dist = Self::new(p.x, (p.y * p.y).max(MIN_SCALE), sign * p.z * p.z)?;
            Ok(Vector3::new(
                dist.cdf(xs[0]),
                dist.cdf(xs[1]),
                dist.cdf(xs[2]),
            ))
        };

        // Start from a Gaussian: location at the median, scale at the mean
        // of the two error bars, shape zero. Zero sqrt-shape is a saddle of
        // the squared parameterization, so if the first run stalls there we
        // restart with progressively larger sqrt-shape seeds and keep the
        // best parameters found.
        let p0 = Vector3::new(median, (0.5 * (upper + lower)).sqrt(), 0.0);
        let mut best: Option<(f64, Vector3<f64>)> = None;
        for &shape_seed in &[0.0, 0.7, 1.5, 3.0] {
            let start = Vector3::new(p0.x, p0.y, shape_seed);
            let (p, cost) = levenberg_marquardt(&model, start, &targets)?;
            trace!(shape_seed, cost, "fit attempt finished");
            if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                best = Some((cost, p));
            }
            if cost.sqrt() < 1e-6 {
                break;
            }
        }

        let (cost, p) = best.ok_or_else(|| Error::Computation("fit produced no result".into()))?;
        debug!(
            residual = cost.sqrt(),
            location = p.x,
            scale = p.y * p.y,
            shape = sign * p.z * p.z,
            "skew-normal fit"
        );
        Self::new(p.x, (p.y * p.y).max(MIN_SCALE), sign * p.z * p.z)
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Probability density at `x`: `2·φ(z)·Φ(shape·z/√2)/scale` with
    /// `z = (x − location)/scale` and `Φ` evaluated through the error
    /// function.
    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        let phi = standard_normal_pdf(z);
        let cap_phi = (erf(z * self.shape / std::f64::consts::SQRT_2) + 1.0) * 0.5;
        2.0 * phi * cap_phi / self.scale
    }

    /// Cumulative distribution at `x`, by numerical integration of the
    /// density from the effective left edge of the support.
    pub fn cdf(&self, x: f64) -> f64 {
        let lo = self.location - 12.0 * self.scale;
        if x <= lo {
            return 0.0;
        }
        integrate(&|t| self.pdf(t), lo, x, CDF_TOL)
    }

    /// Elementwise CDF over a slice
    pub fn cdf_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.cdf(x)).collect()
    }

    /// Draw `n` samples using Azzalini's representation.
    ///
    /// Two independent standard-normal vectors u0 and v are drawn in that
    /// order; `u1 = δ·u0 + √(1−δ²)·v` with `δ = shape/√(1+shape²)`, and
    /// `u1[i]` is negated wherever `u0[i] < 0`. The sign correction after
    /// the draw is what produces the skew.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        let mut out = vec![0.0; n];
        self.sample_into(&mut out, rng);
        out
    }

    /// Fill `out` with samples (see [`SkewNormal::sample`])
    pub fn sample_into<R: Rng + ?Sized>(&self, out: &mut [f64], rng: &mut R) {
        let n = out.len();
        let u0: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
        let v: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();

        let delta = self.shape / (1.0 + self.shape * self.shape).sqrt();
        let ortho = (1.0 - delta * delta).sqrt();
        for i in 0..n {
            let mut u1 = delta * u0[i] + ortho * v[i];
            if u0[i] < 0.0 {
                u1 = -u1;
            }
            out[i] = self.location + self.scale * u1;
        }
    }
}

/// Damped Gauss-Newton over three parameters with a numerical Jacobian.
///
/// Returns the best parameter vector and its squared residual norm; a
/// non-converged fit still yields the best point visited, matching
/// best-effort least-squares behavior.
fn levenberg_marquardt<M>(
    model: &M,
    start: Vector3<f64>,
    targets: &Vector3<f64>,
) -> Result<(Vector3<f64>, f64)>
where
    M: Fn(&Vector3<f64>) -> Result<Vector3<f64>>,
{
    const MAX_ITER: usize = 60;
    const MAX_DAMPING_STEPS: usize = 16;

    let mut p = start;
    let mut residual = targets - model(&p)?;
    let mut cost = residual.norm_squared();
    let mut lambda = 1e-3;

    for _ in 0..MAX_ITER {
        // Forward-difference Jacobian of the model
        let value = targets - residual;
        let mut jacobian = Matrix3::zeros();
        for c in 0..3 {
            let h = 1e-6 * p[c].abs().max(1e-3);
            let mut probe = p;
            probe[c] += h;
            jacobian.set_column(c, &((model(&probe)? - value) / h));
        }

        let jt = jacobian.transpose();
        let gradient = jt * residual;
        if gradient.norm() < 1e-14 {
            break;
        }

        let mut improved = false;
        for _ in 0..MAX_DAMPING_STEPS {
            let damped = jt * jacobian + Matrix3::identity() * lambda;
            let Some(step) = damped.lu().solve(&gradient) else {
                lambda = (lambda * 10.0).min(1e12);
                continue;
            };
            let candidate = p + step;
            let cand_residual = targets - model(&candidate)?;
            let cand_cost = cand_residual.norm_squared();
            if cand_cost.is_finite() && cand_cost < cost {
                p = candidate;
                residual = cand_residual;
                cost = cand_cost;
                lambda = (lambda * 0.3).max(1e-12);
                improved = true;
                break;
            }
            lambda = (lambda * 10.0).min(1e12);
        }

        if !improved || cost < 1e-16 {
            break;
        }
    }

    if !p.iter().all(|v| v.is_finite()) {
        return Err(Error::non_finite("fitted parameters"));
    }
    Ok((p, cost))
}
