//! Frequency grid construction.
//!
//! The grid step is `1 MHz * points_per_mhz`, giving
//! `floor((stop - start) / (1e6 * points_per_mhz)) + 1` points spread linearly
//! from start to stop inclusive and truncated to whole Hz. The row is then
//! replicated once per stage so that stages can later diverge.

use crate::error::Result;
use crate::ir::SweepParams;

const HZ_PER_MHZ: u64 = 1_000_000;

/// Number of grid points implied by the sweep.
pub fn point_count(params: &SweepParams) -> Result<usize> {
    params.validate()?;
    let span = params.stop_freq - params.start_freq;
    let step = HZ_PER_MHZ * u64::from(params.points_per_mhz);
    Ok((span / step) as usize + 1)
}

/// Build one grid row.
pub fn build_row(params: &SweepParams) -> Result<Vec<u64>> {
    let n_points = point_count(params)?;
    Ok(linspace(params.start_freq, params.stop_freq, n_points))
}

/// Build the per-stage grid: one identical row per stage.
pub fn build(params: &SweepParams, n_stages: usize) -> Result<Vec<Vec<u64>>> {
    let row = build_row(params)?;
    Ok(vec![row; n_stages])
}

/// `n_points` values from `start` to `stop` inclusive, truncated to integers.
/// A single point collapses to `start`.
fn linspace(start: u64, stop: u64, n_points: usize) -> Vec<u64> {
    if n_points <= 1 {
        return vec![start];
    }
    let step = (stop - start) as f64 / (n_points - 1) as f64;
    let mut row: Vec<u64> = (0..n_points)
        .map(|i| (start as f64 + step * i as f64) as u64)
        .collect();
    // Pin the endpoint exactly; accumulated rounding may land a hair short.
    row[n_points - 1] = stop;
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CascadeError;

    #[test]
    fn one_point_per_mhz_over_one_ghz() {
        let params = SweepParams::new(1_000_000_000, 2_000_000_000, 1);
        let row = build_row(&params).unwrap();
        assert_eq!(row.len(), 1001);
        for (i, &f) in row.iter().enumerate() {
            assert_eq!(f, 1_000_000_000 + i as u64 * 1_000_000);
        }
    }

    #[test]
    fn density_widens_the_step() {
        // 10 MHz span, step of 5 MHz
        let params = SweepParams::new(100_000_000, 110_000_000, 5);
        assert_eq!(build_row(&params).unwrap(), vec![100_000_000, 105_000_000, 110_000_000]);
    }

    #[test]
    fn uneven_span_still_ends_at_stop() {
        // 2.5 MHz span at 1 MHz -> floor(2.5) + 1 = 3 points, spacing 1.25 MHz
        let params = SweepParams::new(1_000, 2_501_000, 1);
        let row = build_row(&params).unwrap();
        assert_eq!(row, vec![1_000, 1_251_000, 2_501_000]);
    }

    #[test]
    fn length_monotonic_and_endpoints() {
        for &(start, stop, ppm) in &[
            (1_000_000_u64, 18_000_000_000_u64, 1_u32),
            (433_050_000, 434_790_000, 1),
            (2_400_000_000, 2_483_500_000, 7),
            (10, 50_000_010, 3),
        ] {
            let params = SweepParams::new(start, stop, ppm);
            let row = build_row(&params).unwrap();
            let expected = ((stop - start) / (1_000_000 * ppm as u64)) as usize + 1;
            assert_eq!(row.len(), expected);
            assert_eq!(row[0], start);
            assert_eq!(*row.last().unwrap(), stop);
            assert!(row.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn narrow_span_collapses_to_start() {
        let params = SweepParams::new(1_000_000, 1_500_000, 1);
        assert_eq!(build_row(&params).unwrap(), vec![1_000_000]);
    }

    #[test]
    fn rows_replicated_per_stage() {
        let params = SweepParams::new(1_000_000_000, 1_010_000_000, 1);
        let grid = build(&params, 3).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0].len(), 11);
        assert_eq!(grid[0], grid[1]);
        assert_eq!(grid[1], grid[2]);
    }

    #[test]
    fn invalid_sweep_rejected() {
        let params = SweepParams::new(2_000_000, 1_000_000, 1);
        assert!(matches!(build_row(&params), Err(CascadeError::InvalidSweep(_))));
        let params = SweepParams::new(1_000_000, 2_000_000, 0);
        assert!(matches!(build(&params, 2), Err(CascadeError::InvalidSweep(_))));
    }
}
