//! Grouped standardization of the normalized series.
//!
//! Parameters are pooled into two unit families (area, distance) and each
//! family is z-scored against its own pooled statistics. Pooling per group
//! rather than per parameter preserves relative magnitude differences
//! between parameters of the same physical unit, which the downstream
//! ratio and overlap computations rely on, while still bringing the very
//! different numeric ranges of areas and distances onto comparable scales.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::frame::{Param, ParamGroup, SeriesBundle};

/// Pooled population statistics for one unit family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub mean: f32,
    pub std_dev: f32,
    pub samples: usize,
}

impl GroupStatistics {
    /// Pool every present value of `group` across all frames and
    /// parameters. Population variance; stddev floored at `epsilon`.
    pub fn pooled(normalized: &SeriesBundle, group: ParamGroup, epsilon: f32) -> Self {
        let mut sum = 0.0f64;
        let mut sq_sum = 0.0f64;
        let mut samples = 0usize;
        for param in Param::ALL {
            if param.group() != group {
                continue;
            }
            for value in normalized.series(param).iter().flatten() {
                let v = *value as f64;
                sum += v;
                sq_sum += v * v;
                samples += 1;
            }
        }
        if samples == 0 {
            return Self {
                mean: 0.0,
                std_dev: epsilon,
                samples: 0,
            };
        }
        let n = samples as f64;
        let mean = sum / n;
        let variance = (sq_sum / n - mean * mean).max(0.0);
        Self {
            mean: mean as f32,
            std_dev: (variance.sqrt() as f32).max(epsilon),
            samples,
        }
    }

    #[inline]
    pub fn z_score(&self, value: f32) -> f32 {
        (value - self.mean) / self.std_dev
    }
}

/// Standardize the normalized bundle against its two group statistics.
pub fn standardize(
    normalized: &SeriesBundle,
    epsilon: f32,
) -> (SeriesBundle, GroupStatistics, GroupStatistics) {
    let area = GroupStatistics::pooled(normalized, ParamGroup::Area, epsilon);
    let distance = GroupStatistics::pooled(normalized, ParamGroup::Distance, epsilon);
    debug!(
        "group statistics: area mean {:.4} std {:.4} (n={}), distance mean {:.4} std {:.4} (n={})",
        area.mean, area.std_dev, area.samples, distance.mean, distance.std_dev, distance.samples
    );

    let standardized = normalized.map_series(|param, series| {
        let stats = match param.group() {
            ParamGroup::Area => &area,
            ParamGroup::Distance => &distance,
        };
        series
            .iter()
            .map(|v| v.map(|x| stats.z_score(x)))
            .collect()
    });
    (standardized, area, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameRecord;
    use approx::assert_relative_eq;

    fn bundle_with(pharynx: &[f32], vestibule: &[f32], hyoid: &[f32]) -> SeriesBundle {
        let frames: Vec<FrameRecord> = pharynx
            .iter()
            .zip(vestibule.iter())
            .zip(hyoid.iter())
            .enumerate()
            .map(|(i, ((p, v), h))| FrameRecord {
                index: i,
                pharynx_area: Some(*p),
                vestibule_area: Some(*v),
                hyoid_c4_distance: Some(*h),
                ..Default::default()
            })
            .collect();
        SeriesBundle::from_frames(&frames)
    }

    #[test]
    fn test_pooled_moments_are_zero_one() {
        let bundle = bundle_with(
            &[10.0, 12.0, 14.0, 9.0],
            &[3.0, 4.0, 5.0, 2.0],
            &[20.0, 22.0, 18.0, 21.0],
        );
        let (standardized, area, distance) = standardize(&bundle, 1e-6);
        assert_eq!(area.samples, 8);
        assert_eq!(distance.samples, 4);

        for group in [ParamGroup::Area, ParamGroup::Distance] {
            let mut values = Vec::new();
            for param in Param::ALL {
                if param.group() == group {
                    values.extend(standardized.series(param).iter().flatten().copied());
                }
            }
            let n = values.len() as f32;
            let mean: f32 = values.iter().sum::<f32>() / n;
            let var: f32 = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-4);
            assert_relative_eq!(var.sqrt(), 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_constant_group_floors_std() {
        let bundle = bundle_with(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0], &[7.0, 7.0, 7.0]);
        let (standardized, area, distance) = standardize(&bundle, 1e-6);
        assert_relative_eq!(area.std_dev, 1e-6);
        assert_relative_eq!(distance.std_dev, 1e-6);
        // No NaN or infinity escapes the floor.
        for param in Param::ALL {
            for v in standardized.series(param).iter().flatten() {
                assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn test_absences_pass_through() {
        let mut bundle = bundle_with(&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]);
        bundle.set_series(Param::PharynxArea, vec![Some(1.0), None]);
        let (standardized, area, _) = standardize(&bundle, 1e-6);
        assert_eq!(area.samples, 3);
        assert!(standardized.series(Param::PharynxArea)[1].is_none());
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = SeriesBundle::empty(4);
        let (_, area, distance) = standardize(&bundle, 1e-6);
        assert_eq!(area.samples, 0);
        assert_relative_eq!(area.std_dev, 1e-6);
        assert_eq!(distance.samples, 0);
    }
}
