//! RF cascade analysis.
//!
//! Given an ordered stackup of RF components, each with frequency-dependent
//! gain and noise-figure curves, compute cumulative gain, noise figure and
//! (optionally) output P1dB through every stage across a frequency sweep.

pub mod analysis;
pub mod curve;
pub mod error;
pub mod ir;
pub mod output;
pub mod parser;
pub mod stats;

pub use analysis::{analyze, AnalysisResult};
pub use curve::FrequencyCurve;
pub use error::{CascadeError, Result};
pub use ir::{CascadeJob, StackupEntry, SweepParams};
