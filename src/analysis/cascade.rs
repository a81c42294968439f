//! Stage-by-stage accumulation of gain, noise figure and output P1dB.
//!
//! All conversions are power ratios: `linear = 10^(dB/10)`.
//! Each accumulator takes the previous stage's cumulative row and the current
//! stage's interpolated row, and returns the current stage's cumulative row.
//! Rows are walked in lockstep; the shortest row bounds the output.

use rfconversions::noise::{noise_factor_from_noise_figure, noise_figure_from_noise_factor};

use crate::error::{CascadeError, Result};

/// Gain (or dBm level) to a linear power ratio.
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Cumulative gain through the current stage: dB values add.
pub fn accumulate_gain(prev_gain: &[f64], stage_gain: &[f64]) -> Vec<f64> {
    prev_gain
        .iter()
        .zip(stage_gain)
        .map(|(&prev, &cur)| prev + cur)
        .collect()
}

/// Friis noise-figure cascade for stage `stage` (> 0).
///
/// `prev_gain` is the cumulative gain through the previous stage: the current
/// stage's excess noise is referred to the input through all gain ahead of it,
/// not its own.
pub fn accumulate_nf(
    stage: usize,
    freqs: &[u64],
    prev_nf: &[f64],
    prev_gain: &[f64],
    stage_nf: &[f64],
) -> Result<Vec<f64>> {
    freqs
        .iter()
        .zip(prev_nf)
        .zip(prev_gain)
        .zip(stage_nf)
        .map(|(((&freq_hz, &prev), &gain), &cur)| {
            let prev_factor = noise_factor_from_noise_figure(prev);
            let cur_factor = noise_factor_from_noise_figure(cur);
            let gain_up_to_prev = db_to_linear(gain);

            if gain_up_to_prev.is_nan() || gain_up_to_prev <= 0.0 {
                return Err(CascadeError::DegenerateGain { stage, freq_hz });
            }

            let total = prev_factor + (cur_factor - 1.0) / gain_up_to_prev;
            if !total.is_finite() || total <= 0.0 {
                return Err(CascadeError::NonPhysicalNoise { stage, freq_hz });
            }
            Ok(noise_figure_from_noise_factor(total))
        })
        .collect()
}

/// Output-referred 1 dB compression cascade for stage `stage` (> 0).
///
/// In linear mW: `1/P = 1/(P_prev * G) + 1/p`, where `G` is the current stage's
/// own gain and `p` its own output P1dB. A compression point driven to zero by
/// the gain ahead of it is rejected rather than reported as -inf dBm.
pub fn accumulate_p1db(
    stage: usize,
    freqs: &[u64],
    prev_p1db: &[f64],
    stage_gain: &[f64],
    stage_p1db: &[f64],
) -> Result<Vec<f64>> {
    freqs
        .iter()
        .zip(prev_p1db)
        .zip(stage_gain)
        .zip(stage_p1db)
        .map(|(((&freq_hz, &prev), &gain), &own)| {
            let inverse = db_to_linear(-(prev + gain)) + db_to_linear(-own);
            let p1db = -linear_to_db(inverse);
            if !p1db.is_finite() {
                return Err(CascadeError::DegenerateGain { stage, freq_hz });
            }
            Ok(p1db)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn db_round_trip_reference_points() {
        assert_abs_diff_eq!(db_to_linear(0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(db_to_linear(10.0), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(db_to_linear(-3.0), 0.501_187_233_6, epsilon = 1e-9);
        assert_abs_diff_eq!(linear_to_db(100.0), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn gain_adds_in_db() {
        let total = accumulate_gain(&[10.0, 12.0], &[-3.0, 5.5]);
        assert_eq!(total, vec![7.0, 17.5]);
    }

    #[test]
    fn friis_two_stage_by_hand() {
        // F1 = 2 dB, G1 = 10 dB, F2 = 5 dB
        let nf = accumulate_nf(1, &[1_000], &[2.0], &[10.0], &[5.0]).unwrap();
        let expected =
            10.0 * (10f64.powf(0.2) + (10f64.powf(0.5) - 1.0) / 10f64.powf(1.0)).log10();
        assert_abs_diff_eq!(nf[0], expected, epsilon = 1e-12);
        assert_abs_diff_eq!(nf[0], 2.5554, epsilon = 1e-3);
    }

    #[test]
    fn friis_zero_db_gain_is_fine() {
        // Unity gain ahead: factors add directly, F = F1 + F2 - 1
        let nf = accumulate_nf(1, &[1_000], &[3.0], &[0.0], &[3.0]).unwrap();
        let f = db_to_linear(3.0);
        assert_abs_diff_eq!(nf[0], linear_to_db(2.0 * f - 1.0), epsilon = 1e-12);
    }

    #[test]
    fn friis_noiseless_stage_changes_nothing() {
        let nf = accumulate_nf(1, &[1, 2], &[4.0, 6.0], &[-20.0, 30.0], &[0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(nf[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(nf[1], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn friis_rejects_vanishing_gain() {
        let err = accumulate_nf(3, &[5, 7], &[1.0, 1.0], &[0.0, f64::NEG_INFINITY], &[3.0, 3.0])
            .unwrap_err();
        assert!(matches!(err, CascadeError::DegenerateGain { stage: 3, freq_hz: 7 }));

        // Underflows to zero linear gain even though it is finite in dB
        let err = accumulate_nf(1, &[9], &[1.0], &[-4000.0], &[3.0]).unwrap_err();
        assert!(matches!(err, CascadeError::DegenerateGain { stage: 1, freq_hz: 9 }));
    }

    #[test]
    fn friis_rejects_negative_noise_factor() {
        // F2 well below unity behind a lossy stage drives the sum negative
        let err = accumulate_nf(1, &[42], &[0.0], &[-20.0], &[-10.0]).unwrap_err();
        assert!(matches!(err, CascadeError::NonPhysicalNoise { stage: 1, freq_hz: 42 }));
    }

    #[test]
    fn p1db_dominated_by_weak_last_stage() {
        // Strong first stage (40 dBm) behind 20 dB gain, weak second stage (10 dBm)
        let p = accumulate_p1db(1, &[1_000], &[40.0], &[20.0], &[10.0]).unwrap();
        assert!(p[0] < 10.0 && p[0] > 9.99, "{}", p[0]);
    }

    #[test]
    fn p1db_equal_contributions_drop_three_db() {
        // P_prev * G == p  ->  P = p / 2
        let p = accumulate_p1db(1, &[1_000], &[10.0], &[10.0], &[20.0]).unwrap();
        assert_abs_diff_eq!(p[0], 20.0 - linear_to_db(2.0), epsilon = 1e-12);
    }

    #[test]
    fn p1db_rejects_overwhelming_loss() {
        // 20 dBm behind -4000 dB of loss: the inverse sum overflows
        let err = accumulate_p1db(1, &[5, 6], &[20.0, 20.0], &[0.0, -4000.0], &[20.0, 20.0])
            .unwrap_err();
        assert!(matches!(err, CascadeError::DegenerateGain { stage: 1, freq_hz: 6 }));
    }

    #[test]
    fn nf_rows_of_unequal_length_do_not_panic() {
        let nf = accumulate_nf(1, &[1, 2, 3], &[1.0, 1.0], &[10.0], &[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(nf.len(), 1);
    }
}
