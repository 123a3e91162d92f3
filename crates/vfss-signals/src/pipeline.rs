//! End-to-end analysis pipeline.
//!
//! Smoothing → scale calibration → grouped standardization → cycle
//! segmentation → per-cycle clinical extraction, run once per completed
//! recording on the fully-materialized frame array. The result always has
//! a well-defined shape: degraded inputs produce absent fields and empty
//! cycle lists, never an error.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::calibrate;
use crate::clinical::{self, ClinicalParameters};
use crate::config::AnalysisConfig;
use crate::dsp::smooth_optional;
use crate::frame::{FrameRecord, Param, SeriesBundle};
use crate::segment::{segment_cycles, Segmentation};
use crate::standardize::{standardize, GroupStatistics};

/// One detected swallow with frame- and second-based timestamps and its
/// attached clinical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwallowCycle {
    /// 1-based, sequential.
    pub cycle_number: usize,
    pub start_frame: usize,
    pub peak_frame: usize,
    pub end_frame: usize,
    pub duration_frames: usize,
    pub start_sec: f32,
    pub peak_sec: f32,
    pub end_sec: f32,
    pub duration_sec: f32,
    pub clinical: ClinicalParameters,
}

/// Single-study roll-up for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    pub cycle_count: usize,
    pub mean_duration_sec: f32,
    pub aspiration_cycles: usize,
    pub complete_landmark_cycles: usize,
}

/// Full analysis output consumed by the presentation and export layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyResult {
    pub cycles: Vec<SwallowCycle>,
    /// Median C2–C4 ruler; `None` marks a recording that could not be
    /// calibrated (everything downstream is then absent).
    pub calibration_reference: Option<f32>,
    pub area_stats: GroupStatistics,
    pub distance_stats: GroupStatistics,
    pub smoothed: SeriesBundle,
    pub normalized: SeriesBundle,
    pub standardized: SeriesBundle,
    pub segmentation: Segmentation,
    pub summary: StudySummary,
    pub fps: f32,
}

/// Batch analyzer for one recording.
#[derive(Debug, Clone, Default)]
pub struct SwallowAnalyzer {
    config: AnalysisConfig,
}

impl SwallowAnalyzer {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline over an ordered, contiguous frame sequence.
    pub fn analyze(&self, frames: &[FrameRecord], fps: f32) -> StudyResult {
        if fps <= 0.0 {
            warn!("non-positive frame rate {fps}; second-based timestamps will be zero");
        }
        let raw = SeriesBundle::from_frames(frames);
        let smoothed =
            raw.map_series(|_, series| smooth_optional(series, self.config.smoothing.radius));

        let reference = calibrate::reference_length(frames);
        let normalized = calibrate::normalize(&smoothed, frames, reference);

        let (standardized, area_stats, distance_stats) =
            standardize(&normalized, self.config.standardize.epsilon);

        let segmentation = segment_cycles(
            standardized.series(Param::BolusPharynxOverlap),
            &self.config.segmentation,
        );
        debug!(
            "segmentation: {} peaks, {} cycles",
            segmentation.peaks.len(),
            segmentation.cycles.len()
        );

        let clinical = clinical::extract_all(
            &segmentation.cycles,
            &normalized,
            &standardized,
            &self.config.clinical,
        );

        let to_sec = |frame: usize| if fps > 0.0 { frame as f32 / fps } else { 0.0 };
        let cycles: Vec<SwallowCycle> = segmentation
            .cycles
            .iter()
            .zip(clinical)
            .enumerate()
            .map(|(i, (bounds, clinical))| SwallowCycle {
                cycle_number: i + 1,
                start_frame: bounds.start_frame,
                peak_frame: bounds.peak_frame,
                end_frame: bounds.end_frame,
                duration_frames: bounds.duration_frames(),
                start_sec: to_sec(bounds.start_frame),
                peak_sec: to_sec(bounds.peak_frame),
                end_sec: to_sec(bounds.end_frame),
                duration_sec: to_sec(bounds.duration_frames()),
                clinical,
            })
            .collect();

        let summary = summarize(&cycles);
        StudyResult {
            cycles,
            calibration_reference: reference,
            area_stats,
            distance_stats,
            smoothed,
            normalized,
            standardized,
            segmentation,
            summary,
            fps,
        }
    }
}

fn summarize(cycles: &[SwallowCycle]) -> StudySummary {
    let cycle_count = cycles.len();
    let mean_duration_sec = if cycle_count > 0 {
        cycles.iter().map(|c| c.duration_sec).sum::<f32>() / cycle_count as f32
    } else {
        0.0
    };
    StudySummary {
        cycle_count,
        mean_duration_sec,
        aspiration_cycles: cycles
            .iter()
            .filter(|c| c.clinical.aspiration.map_or(false, |a| a.at_risk))
            .count(),
        complete_landmark_cycles: cycles
            .iter()
            .filter(|c| c.clinical.landmarks_complete())
            .count(),
    }
}
