//! Mathematical utilities for uncertainty propagation
//!
//! Provides the error-function approximation used by the skew-normal
//! density, the standard-normal density, a small adaptive quadrature for
//! cumulative distribution functions, and the decimal rounding applied to
//! reduced quantiles.

use std::f64::consts::PI;

/// Error function approximation
///
/// Abramowitz and Stegun formula 7.1.26 (maximum absolute error 1.5e-7),
/// which is accurate enough for quantile matching at the 1e-3 level.
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Standard normal probability density
#[inline]
pub fn standard_normal_pdf(z: f64) -> f64 {
    (-z * z / 2.0).exp() / (2.0 * PI).sqrt()
}

/// Integrate `f` over `[lo, hi]` with adaptive Simpson quadrature.
///
/// Used for left-tail integrals of probability densities, where `lo` is a
/// point far enough into the tail that the density below it is negligible.
pub fn integrate(f: &dyn Fn(f64) -> f64, lo: f64, hi: f64, tol: f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    let mid = 0.5 * (lo + hi);
    let (fl, fm, fh) = (f(lo), f(mid), f(hi));
    let whole = simpson(lo, hi, fl, fm, fh);
    adaptive(f, lo, hi, fl, fm, fh, whole, tol, 24)
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

#[allow(clippy::too_many_arguments)]
fn adaptive(
    f: &dyn Fn(f64) -> f64,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    tol: f64,
    depth: u32,
) -> f64 {
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let (flm, frm) = (f(lm), f(rm));
    let left = simpson(a, m, fa, flm, fm);
    let right = simpson(m, b, fm, frm, fb);
    let delta = left + right - whole;
    if depth == 0 || delta.abs() <= 15.0 * tol {
        left + right + delta / 15.0
    } else {
        adaptive(f, a, m, fa, flm, fm, left, tol / 2.0, depth - 1)
            + adaptive(f, m, b, fm, frm, fb, right, tol / 2.0, depth - 1)
    }
}

/// Round half away from zero at `decimals` decimal places.
///
/// Matches the rounding the reducer applies to each summary component.
pub fn round_to_decimals(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (x * factor).round() / factor
}
