//! Scalar and array uncertain values with Monte-Carlo arithmetic
//!
//! This crate composes the bounded sampler and the order-statistic reducer
//! into value types whose arithmetic propagates uncertainty by sampling:
//!
//! - [`Unum`]: a nominal value with asymmetric error bars
//! - [`UArray`]: the element-wise array analog, sampling elements on a
//!   fixed worker pool
//! - [`QuantileReducer`]: reduces a sample distribution back to
//!   (center, upper spread, lower spread)
//! - [`Operand`]: the closed set of operand kinds a binary operator accepts
//!
//! # Example
//!
//! ```rust
//! use uncprop_value::Unum;
//! use uncprop_core::Unit;
//!
//! let distance = Unum::new(100.0, 2.0, 1.5)?.with_unit(Unit::meter());
//! let time = Unum::symmetric(10.0, 0.1)?.with_unit(Unit::second());
//! let speed = distance.div(&time)?;
//! assert_eq!(speed.unit().unwrap().name(), "m/s");
//! # Ok::<(), uncprop_core::Error>(())
//! ```

pub mod array;
pub mod operand;
pub mod reduce;
pub mod scalar;

pub use array::{UArray, ARRAY_POOL_WORKERS};
pub use operand::Operand;
pub use reduce::{QuantileReducer, Summary, SummaryMethod, CREDIBILITY_MASS};
pub use scalar::{Unum, DEFAULT_SAMPLE_COUNT, DEFAULT_SIG_FIGS};

// Re-export from uncprop-core
pub use uncprop_core::{Error, Result, Unit};
