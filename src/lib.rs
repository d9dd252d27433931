//! # uncprop
//!
//! Monte-Carlo propagation of asymmetric measurement uncertainties.
//!
//! A measurement is a nominal value with (possibly unequal) upper and
//! lower error bars. Instead of analytic error formulas, every arithmetic
//! operation draws a synthetic sample distribution consistent with the
//! error bars (a fitted skew-normal when they are asymmetric, a plain
//! Gaussian when they are not), applies the operation elementwise, and
//! reads the new nominal value and error bars back off the transformed
//! distribution's order statistics.
//!
//! ```rust
//! use uncprop::{Unit, Unum};
//!
//! let mass = Unum::new(5.2, 0.4, 0.3)?.with_unit(Unit::kilogram());
//! let doubled = mass.mul(2.0)?;
//! assert_eq!(doubled.unit().unwrap().name(), "kg");
//! assert!((doubled.nominal() - 10.4).abs() < 0.2);
//! # Ok::<(), uncprop::Error>(())
//! ```
//!
//! The workspace splits into three layers:
//!
//! - [`uncprop_core`]: errors, units, sample batches, math helpers
//! - [`uncprop_dist`]: skew-normal fitting and bounded rejection sampling
//! - [`uncprop_value`]: the [`Unum`] scalar and [`UArray`] array types

pub use uncprop_core::{equivalent, Error, Result, SampleMatrix, Unit};
pub use uncprop_dist::{ErrorSampler, Samples, SkewNormal, MAX_RESAMPLE_ROUNDS, QUANTILE_LEVELS};
pub use uncprop_value::{
    Operand, QuantileReducer, Summary, SummaryMethod, UArray, Unum, ARRAY_POOL_WORKERS,
    CREDIBILITY_MASS, DEFAULT_SAMPLE_COUNT, DEFAULT_SIG_FIGS,
};
