//! # lib-types
//!
//! Core type definitions shared by the DSP seminar crates.
//!
//! - Physical units with compile-time safety
//! - Discrete and uniformly sampled signals
//! - Centered magnitude spectra

pub mod units;
pub mod signal;

pub use units::*;
pub use signal::*;
