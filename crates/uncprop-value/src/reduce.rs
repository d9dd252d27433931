//! Order-statistic reduction of sample distributions
//!
//! Reduces a sample distribution back to (center, upper spread, lower
//! spread) by reading fixed order statistics around the median: with `n`
//! samples and credibility mass α, the bounds sit `floor(n·α/2) + 1`
//! positions above and below the median indices. For even `n` the median
//! pair sits one slot above the textbook position by convention, and
//! out-of-range reads fail fast instead of indexing past the buffer.

use uncprop_core::math::round_to_decimals;
use uncprop_core::{Error, Result, SampleMatrix};

/// Credibility mass between the reduced lower and upper bounds
pub const CREDIBILITY_MASS: f64 = 0.68;

/// How a distribution is summarized into a single center value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryMethod {
    /// Median read from order statistics; the sole supported method, kept
    /// as an enum so alternative summaries can slot in later
    #[default]
    MedianOrderStatistic,
}

/// A reduced distribution: center value and asymmetric spreads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Reduces sample distributions via order statistics
#[derive(Debug, Clone, Copy)]
pub struct QuantileReducer {
    sig_figs: u32,
    method: SummaryMethod,
}

impl QuantileReducer {
    pub fn new(sig_figs: u32, method: SummaryMethod) -> Self {
        Self { sig_figs, method }
    }

    /// Reduce one distribution to (center, upper spread, lower spread)
    pub fn reduce(&self, dist: &[f64]) -> Result<Summary> {
        if dist.iter().any(|v| !v.is_finite()) {
            return Err(Error::non_finite("sample distribution"));
        }
        let mut ordered = dist.to_vec();
        ordered.sort_by(f64::total_cmp);
        self.reduce_sorted(&ordered)
    }

    /// Reduce each row of a batch independently
    pub fn reduce_rows(&self, batch: &SampleMatrix) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let mut centers = Vec::with_capacity(batch.rows());
        let mut uppers = Vec::with_capacity(batch.rows());
        let mut lowers = Vec::with_capacity(batch.rows());
        for row in batch.iter_rows() {
            let summary = self.reduce(row)?;
            centers.push(summary.center);
            uppers.push(summary.upper);
            lowers.push(summary.lower);
        }
        Ok((centers, uppers, lowers))
    }

    fn reduce_sorted(&self, ordered: &[f64]) -> Result<Summary> {
        let n = ordered.len();
        let k = (n as f64 * (CREDIBILITY_MASS / 2.0) + 1.0) as usize;

        let SummaryMethod::MedianOrderStatistic = self.method;
        let (med_hi, med_lo, center) = if n % 2 == 0 {
            let hi = n / 2 + 1;
            let lo = hi - 1;
            if hi >= n {
                return Err(Error::InsufficientSamples {
                    expected: hi + 1,
                    actual: n,
                });
            }
            (hi, lo, (ordered[hi] + ordered[lo]) / 2.0)
        } else {
            let mid = n / 2;
            (mid, mid, ordered[mid])
        };

        // The ±k reads overrun the buffer for small n; surface that as an
        // error instead of undefined indexing.
        if med_hi + k >= n || med_lo < k {
            return Err(Error::InsufficientSamples {
                expected: med_hi + k + 1,
                actual: n,
            });
        }
        let q_upper = ordered[med_hi + k];
        let q_lower = ordered[med_lo - k];

        Ok(Summary {
            center: round_to_decimals(center, self.sig_figs),
            upper: round_to_decimals(q_upper - center, self.sig_figs),
            lower: round_to_decimals(center - q_lower, self.sig_figs),
        })
    }
}
