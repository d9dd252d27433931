//! Bounded sampling from (nominal, upper, lower) error bars
//!
//! An [`ErrorSampler`] draws a synthetic sample distribution consistent
//! with a nominal value and its error bars: a plain Gaussian when the bars
//! are symmetric, a fitted [`SkewNormal`] otherwise. Optional closed-interval
//! limits are enforced by rejection resampling: only the violating subset
//! is redrawn, repeated until no sample violates or the retry ceiling is
//! reached.

use crate::skew::SkewNormal;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, trace};
use uncprop_core::{Error, Result, Unit};

/// Retry ceiling for rejection resampling; exceeding it means the limit
/// lies outside the distribution's practical support.
pub const MAX_RESAMPLE_ROUNDS: usize = 10_000;

/// Samples drawn for one (nominal, upper, lower) triple, tagged with the
/// unit the inputs were expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub values: Vec<f64>,
    pub unit: Option<Unit>,
}

/// Sampler for a nominal value with (possibly asymmetric) error bars
#[derive(Debug, Clone)]
pub struct ErrorSampler {
    nominal: f64,
    upper: f64,
    lower: f64,
    count: usize,
    unit: Option<Unit>,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
}

impl ErrorSampler {
    /// Create a sampler; error bars must be non-negative and the count positive
    pub fn new(nominal: f64, upper: f64, lower: f64, count: usize) -> Result<Self> {
        if !(nominal.is_finite() && upper.is_finite() && lower.is_finite()) {
            return Err(Error::non_finite("sampler inputs"));
        }
        if upper < 0.0 {
            return Err(Error::negative_error("upper", upper));
        }
        if lower < 0.0 {
            return Err(Error::negative_error("lower", lower));
        }
        if count == 0 {
            return Err(Error::InvalidParameter(
                "sample count must be positive".to_string(),
            ));
        }
        Ok(Self {
            nominal,
            upper,
            lower,
            count,
            unit: None,
            lower_limit: None,
            upper_limit: None,
        })
    }

    /// Tag drawn samples with a unit
    pub fn with_unit(mut self, unit: Option<Unit>) -> Self {
        self.unit = unit;
        self
    }

    /// Require every sample to be at least `limit`
    pub fn with_lower_limit(mut self, limit: f64) -> Self {
        self.lower_limit = Some(limit);
        self
    }

    /// Require every sample to be at most `limit`
    pub fn with_upper_limit(mut self, limit: f64) -> Self {
        self.upper_limit = Some(limit);
        self
    }

    /// Draw the configured number of samples.
    ///
    /// Asymmetric error bars fit a skew-normal; symmetric bars use a plain
    /// Gaussian (the skew fit is numerically unstable near zero shape).
    /// Limits are enforced afterwards by subset resampling, lower first.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Samples> {
        let source = self.source()?;
        let mut values = vec![0.0; self.count];
        source.fill(&mut values, rng);

        if let Some(limit) = self.lower_limit {
            resample_violating(&source, &mut values, limit, Violation::Below, rng)?;
        }
        if let Some(limit) = self.upper_limit {
            resample_violating(&source, &mut values, limit, Violation::Above, rng)?;
        }

        Ok(Samples {
            values,
            unit: self.unit.clone(),
        })
    }

    /// Draw with the thread-local generator
    pub fn draw_default(&self) -> Result<Samples> {
        self.draw(&mut rand::thread_rng())
    }

    fn source(&self) -> Result<Source> {
        if self.upper == self.lower {
            if self.upper == 0.0 {
                // Zero spread: the distribution is a point mass
                return Ok(Source::Constant(self.nominal));
            }
            let normal = Normal::new(self.nominal, self.upper)
                .map_err(|e| Error::Computation(format!("invalid normal parameters: {e}")))?;
            Ok(Source::Gaussian(normal))
        } else {
            debug!(
                nominal = self.nominal,
                upper = self.upper,
                lower = self.lower,
                "fitting skew-normal for asymmetric error bars"
            );
            Ok(Source::Skew(SkewNormal::fit(
                self.nominal,
                self.upper,
                self.lower,
            )?))
        }
    }
}

/// The underlying distribution a sampler draws from
enum Source {
    Constant(f64),
    Gaussian(Normal<f64>),
    Skew(SkewNormal),
}

impl Source {
    fn fill<R: Rng + ?Sized>(&self, out: &mut [f64], rng: &mut R) {
        match self {
            Source::Constant(v) => out.fill(*v),
            Source::Gaussian(normal) => {
                for slot in out.iter_mut() {
                    *slot = normal.sample(rng);
                }
            }
            Source::Skew(skew) => skew.sample_into(out, rng),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Violation {
    Below,
    Above,
}

impl Violation {
    fn violates(self, value: f64, limit: f64) -> bool {
        match self {
            Violation::Below => value < limit,
            Violation::Above => value > limit,
        }
    }
}

/// Redraw exactly the samples violating `limit` until none do.
///
/// Feasible limits converge in a handful of rounds since each redraw keeps
/// every conforming sample; an unreachable limit trips the round ceiling
/// and surfaces as `SupportExhausted` instead of looping forever.
fn resample_violating<R: Rng + ?Sized>(
    source: &Source,
    samples: &mut [f64],
    limit: f64,
    direction: Violation,
    rng: &mut R,
) -> Result<()> {
    let mut scratch = Vec::new();
    for round in 0..MAX_RESAMPLE_ROUNDS {
        let violating: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|&(_, &v)| direction.violates(v, limit))
            .map(|(i, _)| i)
            .collect();
        if violating.is_empty() {
            return Ok(());
        }
        trace!(round, count = violating.len(), limit, "resampling violating subset");

        scratch.resize(violating.len(), 0.0);
        source.fill(&mut scratch, rng);
        for (&idx, &fresh) in violating.iter().zip(scratch.iter()) {
            samples[idx] = fresh;
        }
    }

    let violating = samples
        .iter()
        .filter(|&&v| direction.violates(v, limit))
        .count();
    Err(Error::SupportExhausted {
        limit,
        violating,
        rounds: MAX_RESAMPLE_ROUNDS,
    })
}
