//! Per-component frequency-response curves and clamped linear interpolation.
//!
//! A curve is stored as two parallel arrays, `freq` (Hz) and `mag` (dB or dBm),
//! matching the `{"freq": [...], "mag": [...]}` shape component data is kept in.
//! Curves may come from stored data that was never validated, so every curve is
//! re-checked when an [`Interpolator`] is built from it.

use serde_derive::{Deserialize, Serialize};

use crate::error::{CascadeError, Result};

/// Frequency response of one component parameter (gain, NF, P1dB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyCurve {
    /// Sample frequencies in Hz, strictly ascending.
    pub freq: Vec<u64>,
    /// Magnitude at each sample frequency.
    pub mag: Vec<f64>,
}

impl FrequencyCurve {
    /// Build a curve and check its invariants immediately.
    pub fn new(freq: Vec<u64>, mag: Vec<f64>, label: &str) -> Result<Self> {
        let curve = Self { freq, mag };
        curve.check(label)?;
        Ok(curve)
    }

    /// Validate the curve and borrow it as an interpolator.
    pub fn interpolator(&self, label: &str) -> Result<Interpolator<'_>> {
        self.check(label)?;
        Ok(Interpolator {
            freq: &self.freq,
            mag: &self.mag,
        })
    }

    fn check(&self, label: &str) -> Result<()> {
        let malformed = |reason: String| CascadeError::MalformedCurve {
            curve: label.to_string(),
            reason,
        };

        if self.freq.len() != self.mag.len() {
            return Err(malformed(format!(
                "{} frequencies but {} magnitudes",
                self.freq.len(),
                self.mag.len()
            )));
        }
        if self.freq.len() < 2 {
            return Err(malformed(format!(
                "needs at least 2 points, got {}",
                self.freq.len()
            )));
        }
        if let Some(i) = self.freq.windows(2).position(|w| w[1] <= w[0]) {
            return Err(malformed(format!(
                "frequencies not strictly ascending at index {} ({} Hz -> {} Hz)",
                i + 1,
                self.freq[i],
                self.freq[i + 1]
            )));
        }
        if let Some(i) = self.mag.iter().position(|m| !m.is_finite()) {
            return Err(malformed(format!("non-finite magnitude at index {}", i)));
        }
        Ok(())
    }
}

/// A validated view of a [`FrequencyCurve`].
///
/// Outside the sampled range the boundary magnitude is held constant; there is
/// no extrapolation.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    freq: &'a [u64],
    mag: &'a [f64],
}

impl Interpolator<'_> {
    /// Linearly interpolate the magnitude at `freq_hz`.
    pub fn at(&self, freq_hz: u64) -> f64 {
        let last = self.freq.len() - 1;
        if freq_hz <= self.freq[0] {
            return self.mag[0];
        }
        if freq_hz >= self.freq[last] {
            return self.mag[last];
        }

        // First sample strictly above freq_hz; always in 1..=last here.
        let hi = self.freq.partition_point(|&f| f <= freq_hz);
        let lo = hi - 1;
        let (x0, x1) = (self.freq[lo] as f64, self.freq[hi] as f64);
        let (y0, y1) = (self.mag[lo], self.mag[hi]);
        y0 + (freq_hz as f64 - x0) * (y1 - y0) / (x1 - x0)
    }

    /// Interpolate over a whole grid row.
    pub fn sample(&self, grid: &[u64]) -> Vec<f64> {
        grid.iter().map(|&f| self.at(f)).collect()
    }
}
