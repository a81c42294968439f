//! Cascade analysis engine: grid, per-stage interpolation, accumulation.
//!
//! For each stage, in chain order:
//!   1. Interpolate the stage's gain and NF (and P1dB, if present) on its grid row
//!   2. Add the stage gain to the running cumulative gain
//!   3. Fold the stage NF into the running NF with Friis, using the gain through
//!      the previous stage
//!
//! Stages are never reordered. Any error aborts the whole analysis.

pub mod cascade;
pub mod grid;

use serde_derive::Serialize;

use crate::curve::FrequencyCurve;
use crate::error::{CascadeError, Result};
use crate::ir::{StackupEntry, SweepParams};
use crate::stats::Stats;

/// Cascade results, row-major: one row per stage, one column per grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Grid frequencies (Hz).
    pub freq: Vec<Vec<u64>>,
    /// Cumulative gain through each stage (dB).
    pub gain: Vec<Vec<f64>>,
    /// Cumulative noise figure through each stage (dB).
    pub nf: Vec<Vec<f64>>,
    /// Cumulative output P1dB through each stage (dBm); present only when every
    /// stage supplies a P1dB curve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p1db: Option<Vec<Vec<f64>>>,
    /// The sweep the result was computed for.
    pub params: SweepParams,
    /// Stage names in chain order.
    pub stages: Vec<String>,
}

impl AnalysisResult {
    pub fn n_stages(&self) -> usize {
        self.freq.len()
    }

    pub fn n_points(&self) -> usize {
        self.freq.first().map_or(0, Vec::len)
    }
}

/// Run a cascade analysis over an ordered stackup.
pub fn analyze(
    stackup: &[StackupEntry],
    params: &SweepParams,
    mut stats: Option<&mut Stats>,
) -> Result<AnalysisResult> {
    params.validate()?;
    if stackup.is_empty() {
        return Err(CascadeError::EmptyStackup);
    }

    let freq = grid::build(params, stackup.len())?;
    let n_points = freq[0].len();
    let _span = tracing::info_span!("cascade_analysis", stages = stackup.len(), n_points).entered();

    if let Some(ref mut s) = stats {
        s.stages = stackup.len();
        s.freq_points = n_points;
    }

    let with_p1db = stackup.iter().all(|entry| entry.p1db.is_some());
    if !with_p1db {
        tracing::debug!("not every stage has a P1dB curve, skipping P1dB cascade");
    }

    let mut gain: Vec<Vec<f64>> = Vec::with_capacity(stackup.len());
    let mut nf: Vec<Vec<f64>> = Vec::with_capacity(stackup.len());
    let mut p1db: Vec<Vec<f64>> = Vec::new();

    for (i, entry) in stackup.iter().enumerate() {
        let row = &freq[i];
        let stage_gain = interpolate(i, entry, entry.gain.as_ref(), "gain", row, &mut stats)?;
        let stage_nf = interpolate(i, entry, entry.nf.as_ref(), "noise figure", row, &mut stats)?;

        if i == 0 {
            gain.push(stage_gain.clone());
            nf.push(stage_nf);
        } else {
            let cum_gain = cascade::accumulate_gain(&gain[i - 1], &stage_gain);
            let cum_nf = cascade::accumulate_nf(i, row, &nf[i - 1], &gain[i - 1], &stage_nf)?;
            gain.push(cum_gain);
            nf.push(cum_nf);
        }

        if with_p1db {
            let stage_p1db = interpolate(i, entry, entry.p1db.as_ref(), "P1dB", row, &mut stats)?;
            if i == 0 {
                p1db.push(stage_p1db);
            } else {
                let cum_p1db =
                    cascade::accumulate_p1db(i, row, &p1db[i - 1], &stage_gain, &stage_p1db)?;
                p1db.push(cum_p1db);
            }
        }

        tracing::debug!(
            stage = i,
            name = %entry.name,
            gain_db = gain[i][0],
            nf_db = nf[i][0],
            "stage accumulated (first grid point)"
        );
    }

    Ok(AnalysisResult {
        freq,
        gain,
        nf,
        p1db: with_p1db.then_some(p1db),
        params: params.clone(),
        stages: stackup.iter().map(|entry| entry.name.clone()).collect(),
    })
}

/// Validate one of a stage's curves and sample it on the stage's grid row.
fn interpolate(
    stage: usize,
    entry: &StackupEntry,
    curve: Option<&FrequencyCurve>,
    kind: &'static str,
    row: &[u64],
    stats: &mut Option<&mut Stats>,
) -> Result<Vec<f64>> {
    let curve = curve.ok_or_else(|| CascadeError::MissingCurve {
        stage,
        name: entry.name.clone(),
        kind,
    })?;
    let label = format!("{} {}", entry.name, kind);
    let samples = curve.interpolator(&label)?.sample(row);
    if let Some(s) = stats {
        s.curves_validated += 1;
        s.interpolations += row.len();
    }
    Ok(samples)
}
