//! Cascade intermediate representation.
//!
//! The parser (or a JSON job file) produces a `CascadeJob`: an ordered stackup
//! plus sweep parameters. The analyzer consumes it without reordering stages.

use serde_derive::{Deserialize, Serialize};

use crate::curve::FrequencyCurve;
use crate::error::{CascadeError, Result};

/// One component placed in the signal chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackupEntry {
    pub name: String,
    /// Gain in dB. Required for analysis.
    #[serde(default)]
    pub gain: Option<FrequencyCurve>,
    /// Noise figure in dB. Required for analysis.
    #[serde(default)]
    pub nf: Option<FrequencyCurve>,
    /// Output 1 dB compression point in dBm. Optional.
    #[serde(default)]
    pub p1db: Option<FrequencyCurve>,
}

/// Frequency sweep and link-budget parameters.
///
/// `rbw`, `temp`, `pwr_in` and `min_snr` are carried through to the result
/// untouched; only the sweep range and density drive the computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    /// Sweep start (Hz).
    pub start_freq: u64,
    /// Sweep stop (Hz), inclusive.
    pub stop_freq: u64,
    /// Grid density. The grid step is `1 MHz * points_per_mhz`.
    pub points_per_mhz: u32,
    /// Resolution bandwidth (Hz).
    #[serde(default = "default_rbw")]
    pub rbw: u64,
    /// System temperature (K).
    #[serde(default = "default_temp")]
    pub temp: f64,
    /// Input power (dBm).
    #[serde(default)]
    pub pwr_in: f64,
    /// Minimum required SNR (dB).
    #[serde(default)]
    pub min_snr: f64,
}

pub const DEFAULT_RBW_HZ: u64 = 1_000_000;
pub const DEFAULT_TEMP_K: f64 = 290.0;

fn default_rbw() -> u64 {
    DEFAULT_RBW_HZ
}

fn default_temp() -> f64 {
    DEFAULT_TEMP_K
}

impl SweepParams {
    /// Sweep with default link-budget fields.
    pub fn new(start_freq: u64, stop_freq: u64, points_per_mhz: u32) -> Self {
        Self {
            start_freq,
            stop_freq,
            points_per_mhz,
            rbw: DEFAULT_RBW_HZ,
            temp: DEFAULT_TEMP_K,
            pwr_in: 0.0,
            min_snr: 0.0,
        }
    }

    /// Reject sweeps the grid builder cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.start_freq >= self.stop_freq {
            return Err(CascadeError::InvalidSweep(format!(
                "start_freq ({} Hz) must be less than stop_freq ({} Hz)",
                self.start_freq, self.stop_freq
            )));
        }
        if self.points_per_mhz == 0 {
            return Err(CascadeError::InvalidSweep(
                "points_per_mhz must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A complete analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeJob {
    pub stackup: Vec<StackupEntry>,
    pub params: SweepParams,
}

impl CascadeJob {
    /// Load a job from its JSON form.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_ordinary_sweep() {
        assert!(SweepParams::new(1_000_000_000, 2_000_000_000, 1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let err = SweepParams::new(2_000, 1_000, 1).validate().unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSweep(_)));
    }

    #[test]
    fn validate_rejects_equal_endpoints() {
        let err = SweepParams::new(5_000, 5_000, 1).validate().unwrap_err();
        assert!(matches!(err, CascadeError::InvalidSweep(_)));
    }

    #[test]
    fn validate_rejects_zero_density() {
        let err = SweepParams::new(1_000, 2_000, 0).validate().unwrap_err();
        assert!(err.to_string().contains("points_per_mhz"), "{}", err);
    }

    #[test]
    fn job_from_json_fills_defaults() {
        let job = CascadeJob::from_json(
            r#"{
                "stackup": [
                    {
                        "name": "lna",
                        "gain": {"freq": [1000000000, 2000000000], "mag": [20.0, 18.0]},
                        "nf": {"freq": [1000000000, 2000000000], "mag": [1.0, 1.4]}
                    }
                ],
                "params": {"start_freq": 1000000000, "stop_freq": 2000000000, "points_per_mhz": 10}
            }"#,
        )
        .unwrap();

        assert_eq!(job.stackup.len(), 1);
        assert_eq!(job.stackup[0].name, "lna");
        assert!(job.stackup[0].p1db.is_none());
        assert_eq!(job.params.rbw, DEFAULT_RBW_HZ);
        assert_eq!(job.params.temp, DEFAULT_TEMP_K);
        assert_eq!(job.params.pwr_in, 0.0);
    }

    #[test]
    fn job_from_json_rejects_negative_density() {
        let err = CascadeJob::from_json(
            r#"{"stackup": [], "params": {"start_freq": 1, "stop_freq": 2, "points_per_mhz": -1}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CascadeError::Json(_)));
    }
}
