//! Core types for Monte-Carlo uncertainty propagation
//!
//! This crate provides the pieces shared by the rest of the uncprop
//! workspace:
//!
//! - a unified [`Error`] type and [`Result`] alias
//! - a minimal physical-[`Unit`] system with equivalence and conversion
//! - the [`SampleMatrix`] batch container for per-element distributions
//! - math helpers: the Abramowitz-Stegun error function, the standard
//!   normal density, adaptive quadrature, and decimal rounding

pub mod error;
pub mod math;
pub mod matrix;
pub mod units;

pub use error::{Error, Result};
pub use matrix::SampleMatrix;
pub use units::{combine, equivalent, normalize, Unit};
