//! Distribution fitting and bounded sampling
//!
//! This crate turns a (nominal, upper, lower) error-bar triple into a
//! synthetic sample distribution:
//!
//! - [`SkewNormal`] fits a three-parameter skew-normal to asymmetric
//!   quantiles and samples it via Azzalini's representation
//! - [`ErrorSampler`] picks Gaussian or skew-normal per the error bars and
//!   enforces optional hard limits by bounded rejection resampling
//!
//! # Example
//!
//! ```rust
//! use uncprop_dist::ErrorSampler;
//!
//! let sampler = ErrorSampler::new(10.0, 2.0, 1.5, 10_000)?
//!     .with_lower_limit(0.0);
//! let samples = sampler.draw_default()?;
//! assert_eq!(samples.values.len(), 10_000);
//! # Ok::<(), uncprop_core::Error>(())
//! ```

pub mod sampler;
pub mod skew;

pub use sampler::{ErrorSampler, Samples, MAX_RESAMPLE_ROUNDS};
pub use skew::{SkewNormal, QUANTILE_LEVELS};

// Re-export from uncprop-core
pub use uncprop_core::{Error, Result};
