//! Scale calibration against the C2–C4 anatomical ruler.
//!
//! The C2–C4 cervical segment is treated as a per-subject ruler: rescaling
//! every measurement against it removes frame-to-frame and inter-subject
//! variation from camera distance and zoom, so areas and distances become
//! comparable on one consistent scale.

use log::warn;
use std::cmp::Ordering;

use crate::frame::{FrameRecord, Param, ParamGroup, SeriesBundle};

/// Median of all present, strictly positive C2–C4 lengths across the
/// recording. `None` when no frame carries a usable ruler, in which case
/// every normalized (and hence standardized) value degrades to absent.
pub fn reference_length(frames: &[FrameRecord]) -> Option<f32> {
    let mut lengths: Vec<f32> = frames
        .iter()
        .filter_map(|f| f.c2c4_length)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if lengths.is_empty() {
        warn!(
            "no valid C2-C4 reference length in {} frames; calibration undefined",
            frames.len()
        );
        return None;
    }
    lengths.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = lengths.len();
    let median = if n % 2 == 1 {
        lengths[n / 2]
    } else {
        (lengths[n / 2 - 1] + lengths[n / 2]) / 2.0
    };
    Some(median)
}

/// Rescale the smoothed bundle frame by frame.
///
/// `scale = reference / c2c4[i]`; area parameters multiply by `scale`,
/// distance parameters by `scale²`. Frames with a missing or non-positive
/// ruler yield absent values across all parameters.
pub fn normalize(
    smoothed: &SeriesBundle,
    frames: &[FrameRecord],
    reference: Option<f32>,
) -> SeriesBundle {
    let Some(reference) = reference else {
        return SeriesBundle::empty(smoothed.len());
    };

    let scales: Vec<Option<f32>> = frames
        .iter()
        .map(|f| match f.c2c4_length {
            Some(len) if len.is_finite() && len > 0.0 => Some(reference / len),
            _ => None,
        })
        .collect();

    smoothed.map_series(|param, series| {
        series
            .iter()
            .zip(scales.iter())
            .map(|(value, scale)| match (value, scale) {
                (Some(v), Some(s)) => Some(match param.group() {
                    ParamGroup::Area => v * s,
                    ParamGroup::Distance => v * s * s,
                }),
                _ => None,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn recording(c2c4: &[Option<f32>], pharynx: &[Option<f32>]) -> Vec<FrameRecord> {
        c2c4.iter()
            .zip(pharynx.iter())
            .enumerate()
            .map(|(i, (c, p))| FrameRecord {
                index: i,
                c2c4_length: *c,
                pharynx_area: *p,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_reference_is_median() {
        let frames = recording(
            &[Some(10.0), Some(30.0), Some(20.0)],
            &[None, None, None],
        );
        assert_relative_eq!(reference_length(&frames).unwrap(), 20.0);
    }

    #[test]
    fn test_reference_ignores_non_positive() {
        let frames = recording(
            &[Some(-5.0), Some(0.0), Some(12.0)],
            &[None, None, None],
        );
        assert_relative_eq!(reference_length(&frames).unwrap(), 12.0);
    }

    #[test]
    fn test_degenerate_reference_degrades_to_absent() {
        let frames = recording(&[None, Some(0.0)], &[Some(3.0), Some(4.0)]);
        let smoothed = SeriesBundle::from_frames(&frames);
        let reference = reference_length(&frames);
        assert!(reference.is_none());
        let normalized = normalize(&smoothed, &frames, reference);
        assert!(normalized
            .series(Param::PharynxArea)
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn test_missing_ruler_blanks_whole_frame() {
        let frames = recording(
            &[Some(10.0), None, Some(10.0)],
            &[Some(2.0), Some(2.0), Some(2.0)],
        );
        let smoothed = SeriesBundle::from_frames(&frames);
        let normalized = normalize(&smoothed, &frames, reference_length(&frames));
        let series = normalized.series(Param::PharynxArea);
        assert!(series[0].is_some());
        assert!(series[1].is_none());
        assert!(series[2].is_some());
    }

    #[test]
    fn test_area_linear_distance_quadratic() {
        let mut frames = recording(&[Some(5.0)], &[Some(6.0)]);
        frames[0].ues_length = Some(6.0);
        let smoothed = SeriesBundle::from_frames(&frames);
        // Reference 10 against a frame ruler of 5 gives scale 2.
        let normalized = normalize(&smoothed, &frames, Some(10.0));
        assert_relative_eq!(
            normalized.series(Param::PharynxArea)[0].unwrap(),
            12.0
        );
        assert_relative_eq!(normalized.series(Param::UesLength)[0].unwrap(), 24.0);
    }

    #[test]
    fn test_ruler_scale_invariance() {
        // Zooming the ruler by k (reference scales with it) leaves the
        // normalized output unchanged.
        let k = 3.0f32;
        let base = recording(
            &[Some(10.0), Some(12.0), Some(11.0)],
            &[Some(4.0), Some(5.0), Some(6.0)],
        );
        let zoomed: Vec<FrameRecord> = base
            .iter()
            .map(|f| FrameRecord {
                c2c4_length: f.c2c4_length.map(|v| v * k),
                ..f.clone()
            })
            .collect();

        let smoothed = SeriesBundle::from_frames(&base);
        let a = normalize(&smoothed, &base, reference_length(&base));
        let smoothed_zoomed = SeriesBundle::from_frames(&zoomed);
        let b = normalize(&smoothed_zoomed, &zoomed, reference_length(&zoomed));

        for (x, y) in a
            .series(Param::PharynxArea)
            .iter()
            .zip(b.series(Param::PharynxArea).iter())
        {
            assert_relative_eq!(x.unwrap(), y.unwrap(), epsilon = 1e-5);
        }
    }
}
