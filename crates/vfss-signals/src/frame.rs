//! Per-frame measurement records and frame-aligned series storage.
//!
//! One `FrameRecord` is produced upstream for every video frame of a
//! recording. Each named measurement is optional: a missing value means the
//! segmentation model produced no detection for that structure in that
//! frame, and it stays absent through every derived series.

use serde::{Deserialize, Serialize};

/// Physical unit family of a measurement, used to pick the calibration
/// exponent and the standardization pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamGroup {
    Area,
    Distance,
}

/// One of the seven analyzed per-frame measurements.
///
/// The C2–C4 reference length is deliberately not listed here: it is the
/// calibration ruler, not an analyzed parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    PharynxArea,
    VestibuleArea,
    BolusArea,
    BolusPharynxOverlap,
    BolusVestibuleOverlap,
    HyoidC4Distance,
    UesLength,
}

impl Param {
    pub const COUNT: usize = 7;

    pub const ALL: [Param; Param::COUNT] = [
        Param::PharynxArea,
        Param::VestibuleArea,
        Param::BolusArea,
        Param::BolusPharynxOverlap,
        Param::BolusVestibuleOverlap,
        Param::HyoidC4Distance,
        Param::UesLength,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Param> {
        Param::ALL.get(idx).copied()
    }

    pub fn group(self) -> ParamGroup {
        match self {
            Param::PharynxArea
            | Param::VestibuleArea
            | Param::BolusArea
            | Param::BolusPharynxOverlap
            | Param::BolusVestibuleOverlap => ParamGroup::Area,
            Param::HyoidC4Distance | Param::UesLength => ParamGroup::Distance,
        }
    }

    /// Stable short label used by the export layer.
    pub fn label(self) -> &'static str {
        match self {
            Param::PharynxArea => "pharynx_area",
            Param::VestibuleArea => "vestibule_area",
            Param::BolusArea => "bolus_area",
            Param::BolusPharynxOverlap => "bolus_pharynx_overlap",
            Param::BolusVestibuleOverlap => "bolus_vestibule_overlap",
            Param::HyoidC4Distance => "hyoid_c4_distance",
            Param::UesLength => "ues_length",
        }
    }
}

/// Raw geometric measurements for one video frame.
///
/// Immutable once produced by the upstream measurement stage; `index` is
/// 0-based and contiguous across the recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: usize,
    pub pharynx_area: Option<f32>,
    pub vestibule_area: Option<f32>,
    pub bolus_area: Option<f32>,
    pub bolus_pharynx_overlap: Option<f32>,
    pub bolus_vestibule_overlap: Option<f32>,
    pub hyoid_c4_distance: Option<f32>,
    pub ues_length: Option<f32>,
    /// Cervical-spine C2–C4 segment length, the per-frame calibration ruler.
    pub c2c4_length: Option<f32>,
}

impl FrameRecord {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn get(&self, param: Param) -> Option<f32> {
        match param {
            Param::PharynxArea => self.pharynx_area,
            Param::VestibuleArea => self.vestibule_area,
            Param::BolusArea => self.bolus_area,
            Param::BolusPharynxOverlap => self.bolus_pharynx_overlap,
            Param::BolusVestibuleOverlap => self.bolus_vestibule_overlap,
            Param::HyoidC4Distance => self.hyoid_c4_distance,
            Param::UesLength => self.ues_length,
        }
    }
}

/// Frame-aligned optional series, one per analyzed parameter.
///
/// Invariant: every series has length equal to the frame count and slot i
/// corresponds to `FrameRecord` i. One bundle exists per derivation stage
/// (raw, smoothed, normalized, standardized).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesBundle {
    series: [Vec<Option<f32>>; Param::COUNT],
    frames: usize,
}

impl SeriesBundle {
    /// All-absent bundle for `frames` frames.
    pub fn empty(frames: usize) -> Self {
        Self {
            series: std::array::from_fn(|_| vec![None; frames]),
            frames,
        }
    }

    /// Raw bundle extracted from the upstream frame records.
    pub fn from_frames(frames: &[FrameRecord]) -> Self {
        let mut bundle = Self::empty(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            for param in Param::ALL {
                bundle.series[param.index()][i] = frame.get(param);
            }
        }
        bundle
    }

    pub fn len(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    pub fn series(&self, param: Param) -> &[Option<f32>] {
        &self.series[param.index()]
    }

    pub fn set_series(&mut self, param: Param, values: Vec<Option<f32>>) {
        debug_assert_eq!(values.len(), self.frames);
        self.series[param.index()] = values;
    }

    /// Derive a new bundle by mapping each series through `f`.
    pub fn map_series<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Param, &[Option<f32>]) -> Vec<Option<f32>>,
    {
        let mut out = Self::empty(self.frames);
        for param in Param::ALL {
            out.set_series(param, f(param, self.series(param)));
        }
        out
    }
}
