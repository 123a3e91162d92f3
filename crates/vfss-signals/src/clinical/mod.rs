//! Per-cycle clinical parameter extraction.
//!
//! Runs after segmentation is complete and its cycle list is immutable:
//! each cycle's landmark searches read (never mutate) the neighboring
//! cycles' finalized boundaries, which makes the per-cycle work
//! embarrassingly parallel.

mod aspiration;
mod contraction;
mod landmarks;

pub use aspiration::{aspiration_risk, AspirationRisk};
pub use contraction::{contraction_ratio, ContractionRatio};
pub use landmarks::{detect_landmark, Landmark, SearchWindow, WalkDirection};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ClinicalConfig;
use crate::frame::{Param, SeriesBundle};
use crate::segment::CycleBounds;

/// Signed inter-landmark frame intervals. A negative interval signals an
/// ordering anomaly, not an error; each entry is present only when both of
/// its endpoints were determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Intervals {
    pub hyoid_burst_from_start: Option<i64>,
    pub ues_open_from_hyoid_burst: Option<i64>,
    pub ues_close_from_ues_open: Option<i64>,
    pub vestibule_close_from_hyoid_burst: Option<i64>,
    pub vestibule_reopen_from_close: Option<i64>,
}

impl Intervals {
    /// Convert every present interval to seconds. Non-positive frame rates
    /// yield an all-absent result.
    pub fn in_seconds(&self, fps: f32) -> IntervalsSeconds {
        let convert = |frames: Option<i64>| {
            if fps > 0.0 {
                frames.map(|f| f as f32 / fps)
            } else {
                None
            }
        };
        IntervalsSeconds {
            hyoid_burst_from_start: convert(self.hyoid_burst_from_start),
            ues_open_from_hyoid_burst: convert(self.ues_open_from_hyoid_burst),
            ues_close_from_ues_open: convert(self.ues_close_from_ues_open),
            vestibule_close_from_hyoid_burst: convert(self.vestibule_close_from_hyoid_burst),
            vestibule_reopen_from_close: convert(self.vestibule_reopen_from_close),
        }
    }
}

/// Second-based counterpart of [`Intervals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalsSeconds {
    pub hyoid_burst_from_start: Option<f32>,
    pub ues_open_from_hyoid_burst: Option<f32>,
    pub ues_close_from_ues_open: Option<f32>,
    pub vestibule_close_from_hyoid_burst: Option<f32>,
    pub vestibule_reopen_from_close: Option<f32>,
}

/// Clinical outputs attached to one swallow cycle. Every field degrades
/// independently: an absent landmark leaves its siblings untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalParameters {
    pub contraction: Option<ContractionRatio>,
    pub aspiration: Option<AspirationRisk>,
    /// HYB: onset of the hyoid-to-C4 distance burst.
    pub hyoid_burst: Option<Landmark>,
    /// UESO: upper esophageal sphincter opening.
    pub ues_open: Option<Landmark>,
    /// UESC: upper esophageal sphincter closing.
    pub ues_close: Option<Landmark>,
    /// LVC: laryngeal vestibule closure onset.
    pub vestibule_close: Option<Landmark>,
    /// LVCoff: laryngeal vestibule reopening.
    pub vestibule_reopen: Option<Landmark>,
    pub intervals: Intervals,
}

impl ClinicalParameters {
    /// True when all five landmarks were determined.
    pub fn landmarks_complete(&self) -> bool {
        self.hyoid_burst.is_some()
            && self.ues_open.is_some()
            && self.ues_close.is_some()
            && self.vestibule_close.is_some()
            && self.vestibule_reopen.is_some()
    }
}

/// Extract clinical parameters for every cycle.
///
/// The cycle list must already be finalized; it is only read here. Work is
/// parallel across cycles and deterministic.
pub fn extract_all(
    cycles: &[CycleBounds],
    normalized: &SeriesBundle,
    standardized: &SeriesBundle,
    cfg: &ClinicalConfig,
) -> Vec<ClinicalParameters> {
    if normalized.is_empty() {
        return cycles.iter().map(|_| ClinicalParameters::default()).collect();
    }
    let last_frame = normalized.len() - 1;
    cycles
        .par_iter()
        .enumerate()
        .map(|(i, cycle)| {
            let window = SearchWindow {
                back_limit: if i > 0 { cycles[i - 1].end_frame } else { 0 },
                fwd_limit: cycles
                    .get(i + 1)
                    .map(|next| next.start_frame)
                    .unwrap_or(last_frame),
            };
            extract_cycle(cycle, window, normalized, standardized, cfg)
        })
        .collect()
}

fn extract_cycle(
    cycle: &CycleBounds,
    window: SearchWindow,
    normalized: &SeriesBundle,
    standardized: &SeriesBundle,
    cfg: &ClinicalConfig,
) -> ClinicalParameters {
    let contraction = contraction_ratio(standardized.series(Param::PharynxArea), cycle, cfg);
    let aspiration = aspiration_risk(
        normalized.series(Param::BolusVestibuleOverlap),
        normalized.series(Param::VestibuleArea),
        cycle,
        cfg,
    );

    let hyoid_burst = detect_landmark(
        standardized.series(Param::HyoidC4Distance),
        cycle,
        window,
        WalkDirection::Backward,
        false,
        cfg,
        "HYB",
    );
    let ues_series = standardized.series(Param::UesLength);
    let ues_open = detect_landmark(
        ues_series,
        cycle,
        window,
        WalkDirection::Backward,
        false,
        cfg,
        "UESO",
    );
    let ues_close = detect_landmark(
        ues_series,
        cycle,
        window,
        WalkDirection::Forward,
        false,
        cfg,
        "UESC",
    );
    let vestibule_series = standardized.series(Param::VestibuleArea);
    let vestibule_close = detect_landmark(
        vestibule_series,
        cycle,
        window,
        WalkDirection::Backward,
        true,
        cfg,
        "LVC",
    );
    let vestibule_reopen = detect_landmark(
        vestibule_series,
        cycle,
        window,
        WalkDirection::Forward,
        true,
        cfg,
        "LVCoff",
    );

    let delta = |from: Option<i64>, to: Option<i64>| match (from, to) {
        (Some(a), Some(b)) => Some(b - a),
        _ => None,
    };
    let frame_of = |l: &Option<Landmark>| l.as_ref().map(|l| l.frame as i64);
    let intervals = Intervals {
        hyoid_burst_from_start: delta(Some(cycle.start_frame as i64), frame_of(&hyoid_burst)),
        ues_open_from_hyoid_burst: delta(frame_of(&hyoid_burst), frame_of(&ues_open)),
        ues_close_from_ues_open: delta(frame_of(&ues_open), frame_of(&ues_close)),
        vestibule_close_from_hyoid_burst: delta(frame_of(&hyoid_burst), frame_of(&vestibule_close)),
        vestibule_reopen_from_close: delta(frame_of(&vestibule_close), frame_of(&vestibule_reopen)),
    };

    ClinicalParameters {
        contraction,
        aspiration,
        hyoid_burst,
        ues_open,
        ues_close,
        vestibule_close,
        vestibule_reopen,
        intervals,
    }
}
