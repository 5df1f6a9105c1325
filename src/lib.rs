//! Block-correlated genotype simulation and single-marker association scans
//! for comparing PIC-plot patterns under different causal-variant layouts.
//!
//! The pipeline runs forward only: [`panel`] → [`phenotype`] → [`scan`].
//! [`scenario`] wires the stages together behind one seeded RNG.

pub mod error;
pub mod logging;
pub mod types;

pub mod io;
pub mod matrix;
pub mod parallel;
pub mod plot;
pub mod plot_utils;
pub mod qc;
pub mod stats;

pub mod correlation;
pub mod panel;
pub mod phenotype;
pub mod pic;
pub mod scan;
pub mod scenario;
