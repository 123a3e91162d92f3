//! Swallow-cycle segmentation over the standardized driver series.
//!
//! The driver is the standardized bolus–pharynx overlap: it rises sharply
//! as the bolus enters the pharynx and falls back once it clears, so each
//! qualifying local maximum marks one swallow. Detection runs in four
//! stages: local-maximum scan, minimum-separation peak filtering,
//! rise-threshold start search and minimum+stability end search, followed
//! by a validation fold in which every candidate sees the immutable list
//! of already-accepted cycles.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SegmentationConfig;
use crate::dsp::{first_differences, smooth_optional};

/// One filtered driver peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub frame: usize,
    pub value: f32,
}

/// Frame boundaries of one detected swallow cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleBounds {
    pub start_frame: usize,
    pub peak_frame: usize,
    pub end_frame: usize,
}

impl CycleBounds {
    pub fn duration_frames(&self) -> usize {
        self.end_frame - self.start_frame
    }

    pub fn contains(&self, frame: usize) -> bool {
        (self.start_frame..=self.end_frame).contains(&frame)
    }
}

/// Segmentation result plus the diagnostics downstream plotting needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Accepted cycles, ordered by peak frame, pairwise non-overlapping.
    pub cycles: Vec<CycleBounds>,
    /// Driver after the segmentation-stage Gaussian re-smoothing.
    pub smoothed_driver: Vec<Option<f32>>,
    /// First differences of the smoothed driver.
    pub first_diffs: Vec<Option<f32>>,
    /// Peaks that survived the minimum-separation filter.
    pub peaks: Vec<Peak>,
}

/// Detect swallow cycles in the standardized driver series.
///
/// An empty cycle list is a valid outcome (no qualifying peaks, or every
/// candidate failed validation), never an error.
pub fn segment_cycles(driver: &[Option<f32>], cfg: &SegmentationConfig) -> Segmentation {
    let smoothed = smooth_optional(driver, cfg.driver_radius);
    let diffs = first_differences(&smoothed);

    let candidates = detect_peaks(&smoothed, cfg);
    let peaks = filter_peaks(candidates, cfg.min_cycle_frames);

    let mut cycles: Vec<CycleBounds> = Vec::new();
    for peak in &peaks {
        if let Some(cycle) = build_cycle(&smoothed, &diffs, *peak, &cycles, cfg) {
            cycles.push(cycle);
        }
    }

    Segmentation {
        cycles,
        smoothed_driver: smoothed,
        first_diffs: diffs,
        peaks,
    }
}

/// Local-maximum scan: frame i qualifies when it lies outside the boundary
/// margin, exceeds the minimum height, and no frame within `±peak_window`
/// has a strictly greater present value.
fn detect_peaks(series: &[Option<f32>], cfg: &SegmentationConfig) -> Vec<Peak> {
    let n = series.len();
    if n <= 2 * cfg.boundary_margin {
        return Vec::new();
    }
    let mut peaks = Vec::new();
    for i in cfg.boundary_margin..n - cfg.boundary_margin {
        let Some(value) = series[i] else { continue };
        if value <= cfg.min_peak_height {
            continue;
        }
        let lo = i.saturating_sub(cfg.peak_window);
        let hi = (i + cfg.peak_window).min(n - 1);
        let dominated = (lo..=hi)
            .filter(|&j| j != i)
            .filter_map(|j| series[j])
            .any(|other| other > value);
        if !dominated {
            peaks.push(Peak { frame: i, value });
        }
    }
    peaks
}

/// Drop the smaller of two peaks closer than `min_gap` frames; equal
/// values keep the earlier candidate.
fn filter_peaks(candidates: Vec<Peak>, min_gap: usize) -> Vec<Peak> {
    let mut kept: Vec<Peak> = Vec::new();
    for peak in candidates {
        match kept.last_mut() {
            Some(last) if peak.frame - last.frame < min_gap => {
                if peak.value > last.value {
                    *last = peak;
                }
            }
            _ => kept.push(peak),
        }
    }
    kept
}

fn build_cycle(
    smoothed: &[Option<f32>],
    diffs: &[Option<f32>],
    peak: Peak,
    accepted: &[CycleBounds],
    cfg: &SegmentationConfig,
) -> Option<CycleBounds> {
    let Some(start) = find_start(smoothed, diffs, accepted.last(), peak.frame, cfg) else {
        debug!("skipping peak at frame {}: no start found", peak.frame);
        return None;
    };
    let Some(end) = find_end(smoothed, diffs, peak.frame, cfg) else {
        debug!("skipping peak at frame {}: no end found", peak.frame);
        return None;
    };

    let cycle = CycleBounds {
        start_frame: start,
        peak_frame: peak.frame,
        end_frame: end,
    };
    if let Err(reason) = validate(&cycle, accepted.last(), cfg) {
        debug!("skipping peak at frame {}: {}", peak.frame, reason);
        return None;
    }
    Some(cycle)
}

/// The first cycle starts at the first rise-threshold crossing from frame
/// 0. Later cycles locate the minimum between the previous end and the
/// peak, then take the first rise crossing after it.
fn find_start(
    smoothed: &[Option<f32>],
    diffs: &[Option<f32>],
    previous: Option<&CycleBounds>,
    peak: usize,
    cfg: &SegmentationConfig,
) -> Option<usize> {
    match previous {
        None => first_rise(diffs, 0, peak, cfg.rise_threshold),
        Some(prev) => {
            let from = prev.end_frame + 1;
            if from >= peak {
                return None;
            }
            let valley = minimum_in(smoothed, from, peak)?;
            first_rise(diffs, valley, peak, cfg.rise_threshold)
        }
    }
}

/// From the peak, walk forward for the local minimum (stopping early when
/// a new rise begins), then forward again for the first frame whose
/// outgoing difference stays below the stability threshold.
fn find_end(
    smoothed: &[Option<f32>],
    diffs: &[Option<f32>],
    peak: usize,
    cfg: &SegmentationConfig,
) -> Option<usize> {
    let n = smoothed.len();
    if peak + 1 >= n {
        return None;
    }
    let search_end = (peak + cfg.end_search_window).min(n - 1);

    let mut min_frame: Option<usize> = None;
    let mut min_value = f32::INFINITY;
    for i in peak + 1..=search_end {
        if let Some(v) = smoothed[i] {
            if v < min_value {
                min_value = v;
                min_frame = Some(i);
            } else if let Some(d) = diffs.get(i).copied().flatten() {
                // Already past the minimum and rising again.
                if d > cfg.rise_threshold {
                    break;
                }
            }
        }
    }
    let min_frame = min_frame?;

    let stability_end = (min_frame + cfg.stability_window).min(n - 1);
    for j in min_frame..=stability_end {
        if let Some(d) = diffs.get(j).copied().flatten() {
            if d.abs() < cfg.stability_threshold {
                return Some(j);
            }
        }
    }
    // No settled frame inside the window: close the cycle at the window
    // boundary rather than discarding it.
    Some(stability_end)
}

fn first_rise(diffs: &[Option<f32>], from: usize, to: usize, threshold: f32) -> Option<usize> {
    for i in from..to.min(diffs.len()) {
        if let Some(d) = diffs[i] {
            if d > threshold {
                return Some(i);
            }
        }
    }
    None
}

/// Frame of the smallest present value in `[from, to)`; ties keep the
/// earliest frame.
fn minimum_in(series: &[Option<f32>], from: usize, to: usize) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for i in from..to.min(series.len()) {
        if let Some(v) = series[i] {
            if best.map_or(true, |(_, bv)| v < bv) {
                best = Some((i, v));
            }
        }
    }
    best.map(|(i, _)| i)
}

fn validate(
    cycle: &CycleBounds,
    previous: Option<&CycleBounds>,
    cfg: &SegmentationConfig,
) -> Result<(), String> {
    if !(cycle.start_frame < cycle.peak_frame && cycle.peak_frame < cycle.end_frame) {
        return Err(format!(
            "boundary order violated ({} / {} / {})",
            cycle.start_frame, cycle.peak_frame, cycle.end_frame
        ));
    }
    let duration = cycle.duration_frames();
    if duration < cfg.min_cycle_frames || duration > cfg.max_cycle_frames {
        return Err(format!("duration {duration} outside accepted bounds"));
    }
    if let Some(prev) = previous {
        if cycle.start_frame <= prev.end_frame {
            return Err(format!(
                "start {} overlaps previous cycle ending at {}",
                cycle.start_frame, prev.end_frame
            ));
        }
    }
    Ok(())
}
