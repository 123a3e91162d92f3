//! Pharyngeal contraction ratio (PCR).
//!
//! Ratio of the lower to the upper nearest-rank percentile of the
//! standardized pharynx area within one cycle. Standardized values can be
//! negative, so two adjustment branches keep the ratio meaningful: both
//! percentiles negative flips signs, a single negative percentile shifts
//! both by `|min sample| + offset`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::ClinicalConfig;
use crate::segment::CycleBounds;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractionRatio {
    pub ratio: f32,
    /// Lower (5th by default) nearest-rank percentile before adjustment.
    pub lower_value: f32,
    /// Upper (95th by default) nearest-rank percentile before adjustment.
    pub upper_value: f32,
}

pub fn contraction_ratio(
    pharynx: &[Option<f32>],
    cycle: &CycleBounds,
    cfg: &ClinicalConfig,
) -> Option<ContractionRatio> {
    let end = cycle.end_frame.min(pharynx.len().checked_sub(1)?);
    let mut samples: Vec<f32> = pharynx
        .get(cycle.start_frame..=end)?
        .iter()
        .flatten()
        .copied()
        .collect();
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let lower_value = nearest_rank(&samples, cfg.lower_percentile);
    let upper_value = nearest_rank(&samples, cfg.upper_percentile);
    let (adjusted_lower, adjusted_upper) =
        adjusted_percentiles(lower_value, upper_value, samples[0], cfg.contraction_offset);
    if adjusted_upper.abs() < f32::EPSILON {
        debug!(
            "contraction ratio undefined for cycle at peak {}: upper percentile is zero",
            cycle.peak_frame
        );
        return None;
    }
    Some(ContractionRatio {
        ratio: adjusted_lower / adjusted_upper,
        lower_value,
        upper_value,
    })
}

/// Nearest-rank percentile over ascending samples, no interpolation.
fn nearest_rank(sorted: &[f32], percentile: f32) -> f32 {
    let n = sorted.len();
    let rank = ((percentile / 100.0) * n as f32).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}

fn adjusted_percentiles(lower: f32, upper: f32, min_sample: f32, offset_pad: f32) -> (f32, f32) {
    if lower < 0.0 && upper < 0.0 {
        (lower.abs(), upper.abs())
    } else if lower < 0.0 || upper < 0.0 {
        let offset = min_sample.abs() + offset_pad;
        (lower + offset, upper + offset)
    } else {
        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_both_negative_uses_absolute_values() {
        let (lo, hi) = adjusted_percentiles(-2.0, -8.0, -8.0, 0.1);
        assert_relative_eq!(lo / hi, 0.25);
    }

    #[test]
    fn test_single_negative_shifts_both() {
        let (lo, hi) = adjusted_percentiles(-1.0, 3.0, -1.5, 0.1);
        // Offset is |min| + pad = 1.6.
        assert_relative_eq!(lo, 0.6);
        assert_relative_eq!(hi, 4.6);
    }

    #[test]
    fn test_positive_percentiles_unchanged() {
        let (lo, hi) = adjusted_percentiles(0.5, 2.0, 0.1, 0.1);
        assert_relative_eq!(lo, 0.5);
        assert_relative_eq!(hi, 2.0);
    }

    #[test]
    fn test_nearest_rank_no_interpolation() {
        let sorted: Vec<f32> = (1..=100).map(|i| i as f32).collect();
        assert_relative_eq!(nearest_rank(&sorted, 5.0), 5.0);
        assert_relative_eq!(nearest_rank(&sorted, 95.0), 95.0);
        let small = [1.0, 2.0, 3.0];
        assert_relative_eq!(nearest_rank(&small, 5.0), 1.0);
        assert_relative_eq!(nearest_rank(&small, 95.0), 3.0);
    }

    #[test]
    fn test_empty_cycle_is_absent() {
        let series = vec![None; 40];
        let cycle = CycleBounds {
            start_frame: 5,
            peak_frame: 15,
            end_frame: 30,
        };
        assert!(contraction_ratio(&series, &cycle, &ClinicalConfig::default()).is_none());
    }

    #[test]
    fn test_ratio_over_positive_cycle() {
        let series: Vec<Option<f32>> = (0..40).map(|_| Some(2.0)).collect();
        let cycle = CycleBounds {
            start_frame: 5,
            peak_frame: 15,
            end_frame: 30,
        };
        let pcr = contraction_ratio(&series, &cycle, &ClinicalConfig::default()).unwrap();
        assert_relative_eq!(pcr.ratio, 1.0);
        assert_relative_eq!(pcr.lower_value, 2.0);
        assert_relative_eq!(pcr.upper_value, 2.0);
    }
}
