//! Kinematic landmark detection.
//!
//! Every landmark anchors on the global maximum of its driving
//! standardized series within the cycle, then walks outward (backward for
//! onsets, forward for offsets) to the nearest qualifying valley. The
//! detectors form an ordered strategy list tried in sequence; each returns
//! a definite frame or no match:
//!
//! 1. curvature flip: slope sign flip confirmed by a strong positive
//!    second difference (vestibule landmarks only, whose signal carries
//!    two adjacent valleys bracketing its peak);
//! 2. slope flip: first clean first-derivative sign change;
//! 3. trend-reversal extremum: running minimum up to the first sustained
//!    opposite-direction slope;
//! 4. unconstrained extremum over the whole search segment.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ClinicalConfig;
use crate::dsp::{first_differences, second_differences};
use crate::segment::CycleBounds;

/// A located landmark with the anchor peak its search started from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub frame: usize,
    pub value: f32,
    pub anchor_frame: usize,
    pub anchor_value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    Backward,
    Forward,
}

/// Search bounds widened past the cycle boundary: the previous cycle's end
/// backward, the next cycle's start forward (recording edges otherwise).
#[derive(Debug, Clone, Copy)]
pub struct SearchWindow {
    pub back_limit: usize,
    pub fwd_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    CurvatureFlip,
    SlopeFlip,
    TrendReversal,
    Extremum,
}

impl Strategy {
    fn label(self) -> &'static str {
        match self {
            Strategy::CurvatureFlip => "curvature-flip",
            Strategy::SlopeFlip => "slope-flip",
            Strategy::TrendReversal => "trend-reversal",
            Strategy::Extremum => "extremum",
        }
    }
}

const WITH_CURVATURE: &[Strategy] = &[
    Strategy::CurvatureFlip,
    Strategy::SlopeFlip,
    Strategy::TrendReversal,
    Strategy::Extremum,
];
const SLOPE_ONLY: &[Strategy] = &[
    Strategy::SlopeFlip,
    Strategy::TrendReversal,
    Strategy::Extremum,
];

pub fn detect_landmark(
    series: &[Option<f32>],
    cycle: &CycleBounds,
    window: SearchWindow,
    direction: WalkDirection,
    use_curvature: bool,
    cfg: &ClinicalConfig,
    label: &str,
) -> Option<Landmark> {
    if series.is_empty() {
        return None;
    }
    let (anchor_frame, anchor_value) =
        maximum_in(series, cycle.start_frame, cycle.end_frame)?;
    let diffs = first_differences(series);
    let curvature = second_differences(series);
    let fwd_limit = window.fwd_limit.min(series.len() - 1);

    let order = if use_curvature { WITH_CURVATURE } else { SLOPE_ONLY };
    for &strategy in order {
        let found = match (strategy, direction) {
            (Strategy::CurvatureFlip, WalkDirection::Backward) => curvature_flip_backward(
                &diffs,
                &curvature,
                anchor_frame,
                window.back_limit,
                cfg.curvature_threshold,
            ),
            (Strategy::CurvatureFlip, WalkDirection::Forward) => curvature_flip_forward(
                &diffs,
                &curvature,
                anchor_frame,
                fwd_limit,
                cfg.curvature_threshold,
            ),
            (Strategy::SlopeFlip, WalkDirection::Backward) => {
                slope_flip_backward(&diffs, anchor_frame, window.back_limit)
            }
            (Strategy::SlopeFlip, WalkDirection::Forward) => {
                slope_flip_forward(&diffs, anchor_frame, fwd_limit)
            }
            (Strategy::TrendReversal, WalkDirection::Backward) => trend_reversal_backward(
                series,
                &diffs,
                anchor_frame,
                window.back_limit,
                cfg.slope_reversal_threshold,
            ),
            (Strategy::TrendReversal, WalkDirection::Forward) => trend_reversal_forward(
                series,
                &diffs,
                anchor_frame,
                fwd_limit,
                cfg.slope_reversal_threshold,
            ),
            (Strategy::Extremum, WalkDirection::Backward) => {
                extremum_backward(series, anchor_frame, window.back_limit)
            }
            (Strategy::Extremum, WalkDirection::Forward) => {
                extremum_forward(series, anchor_frame, fwd_limit)
            }
        };
        if let Some(frame) = found {
            if let Some(value) = series[frame] {
                debug!("landmark {label} at frame {frame} via {}", strategy.label());
                return Some(Landmark {
                    frame,
                    value,
                    anchor_frame,
                    anchor_value,
                });
            }
        }
    }
    debug!("landmark {label} undetermined for cycle peaking at {}", cycle.peak_frame);
    None
}

/// Frame/value of the greatest present sample in `[start, end]`; ties keep
/// the earliest frame.
fn maximum_in(series: &[Option<f32>], start: usize, end: usize) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for i in start..=end.min(series.len().checked_sub(1)?) {
        if let Some(v) = series[i] {
            if best.map_or(true, |(_, bv)| v > bv) {
                best = Some((i, v));
            }
        }
    }
    best
}

/// Walking backward from the anchor, the first negative slope marks the
/// valley just after it.
fn slope_flip_backward(diffs: &[Option<f32>], anchor: usize, back_limit: usize) -> Option<usize> {
    if anchor == 0 {
        return None;
    }
    let mut k = anchor - 1;
    loop {
        if let Some(d) = diffs.get(k).copied().flatten() {
            if d < 0.0 {
                return Some(k + 1);
            }
        }
        if k == back_limit || k == 0 {
            return None;
        }
        k -= 1;
    }
}

/// Walking forward from the anchor, the first positive slope marks the
/// valley it leaves.
fn slope_flip_forward(diffs: &[Option<f32>], anchor: usize, fwd_limit: usize) -> Option<usize> {
    for j in anchor + 1..fwd_limit.min(diffs.len()) {
        if let Some(d) = diffs[j] {
            if d > 0.0 {
                return Some(j);
            }
        }
    }
    None
}

fn curvature_flip_backward(
    diffs: &[Option<f32>],
    curvature: &[Option<f32>],
    anchor: usize,
    back_limit: usize,
    threshold: f32,
) -> Option<usize> {
    let frame = slope_flip_backward(diffs, anchor, back_limit)?;
    let c = curvature.get(frame.checked_sub(1)?).copied().flatten()?;
    (c > threshold).then_some(frame)
}

fn curvature_flip_forward(
    diffs: &[Option<f32>],
    curvature: &[Option<f32>],
    anchor: usize,
    fwd_limit: usize,
    threshold: f32,
) -> Option<usize> {
    let frame = slope_flip_forward(diffs, anchor, fwd_limit)?;
    let c = curvature.get(frame.checked_sub(1)?).copied().flatten()?;
    (c > threshold).then_some(frame)
}

/// Running minimum walking backward, returned at the first sustained
/// opposite-direction slope.
fn trend_reversal_backward(
    series: &[Option<f32>],
    diffs: &[Option<f32>],
    anchor: usize,
    back_limit: usize,
    threshold: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    let mut k = anchor;
    while k > back_limit {
        let f = k - 1;
        if let Some(d) = diffs.get(f).copied().flatten() {
            if d < -threshold {
                return best.map(|(i, _)| i);
            }
        }
        if let Some(v) = series[f] {
            if best.map_or(true, |(_, bv)| v < bv) {
                best = Some((f, v));
            }
        }
        k = f;
    }
    None
}

fn trend_reversal_forward(
    series: &[Option<f32>],
    diffs: &[Option<f32>],
    anchor: usize,
    fwd_limit: usize,
    threshold: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for j in anchor + 1..=fwd_limit.min(series.len().saturating_sub(1)) {
        if let Some(d) = diffs.get(j - 1).copied().flatten() {
            if d > threshold {
                return best.map(|(i, _)| i);
            }
        }
        if let Some(v) = series[j] {
            if best.map_or(true, |(_, bv)| v < bv) {
                best = Some((j, v));
            }
        }
    }
    None
}

/// Smallest present value between the backward limit and the anchor; ties
/// keep the frame nearest the anchor.
fn extremum_backward(series: &[Option<f32>], anchor: usize, back_limit: usize) -> Option<usize> {
    if anchor == 0 || back_limit >= anchor {
        return None;
    }
    let mut best: Option<(usize, f32)> = None;
    let mut f = anchor - 1;
    loop {
        if let Some(v) = series[f] {
            if best.map_or(true, |(_, bv)| v < bv) {
                best = Some((f, v));
            }
        }
        if f == back_limit || f == 0 {
            break;
        }
        f -= 1;
    }
    best.map(|(i, _)| i)
}

fn extremum_forward(series: &[Option<f32>], anchor: usize, fwd_limit: usize) -> Option<usize> {
    let fwd_limit = fwd_limit.min(series.len().saturating_sub(1));
    if anchor >= fwd_limit {
        return None;
    }
    let mut best: Option<(usize, f32)> = None;
    for j in anchor + 1..=fwd_limit {
        if let Some(v) = series[j] {
            if best.map_or(true, |(_, bv)| v < bv) {
                best = Some((j, v));
            }
        }
    }
    best.map(|(i, _)| i)
}
