//! Analysis configuration.
//!
//! Every heuristic constant of the pipeline lives here so that the
//! empirically-chosen thresholds (notably the aspiration ratio threshold
//! and the contraction-ratio offset) can be re-tuned by domain experts
//! without code changes. The whole tree is TOML-loadable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub smoothing: SmoothingConfig,
    pub standardize: StandardizeConfig,
    pub segmentation: SegmentationConfig,
    pub clinical: ClinicalConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing.radius == 0 {
            return Err(ConfigError::Validation(
                "smoothing.radius must be at least 1".into(),
            ));
        }
        if !(self.standardize.epsilon > 0.0) {
            return Err(ConfigError::Validation(
                "standardize.epsilon must be positive".into(),
            ));
        }
        let seg = &self.segmentation;
        if seg.min_cycle_frames == 0 || seg.min_cycle_frames >= seg.max_cycle_frames {
            return Err(ConfigError::Validation(format!(
                "segmentation cycle bounds invalid: min {} max {}",
                seg.min_cycle_frames, seg.max_cycle_frames
            )));
        }
        for (name, value) in [
            ("segmentation.min_peak_height", seg.min_peak_height),
            ("segmentation.rise_threshold", seg.rise_threshold),
            ("segmentation.stability_threshold", seg.stability_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!("{name} must be finite")));
            }
        }
        if !(seg.rise_threshold > 0.0) || !(seg.stability_threshold > 0.0) {
            return Err(ConfigError::Validation(
                "segmentation rise/stability thresholds must be positive".into(),
            ));
        }
        let clin = &self.clinical;
        if !(clin.lower_percentile > 0.0
            && clin.upper_percentile < 100.0
            && clin.lower_percentile < clin.upper_percentile)
        {
            return Err(ConfigError::Validation(format!(
                "clinical percentiles invalid: {} / {}",
                clin.lower_percentile, clin.upper_percentile
            )));
        }
        for (name, value) in [
            ("clinical.contraction_offset", clin.contraction_offset),
            ("clinical.near_zero_clamp", clin.near_zero_clamp),
            ("clinical.aspiration_threshold", clin.aspiration_threshold),
            (
                "clinical.slope_reversal_threshold",
                clin.slope_reversal_threshold,
            ),
            ("clinical.curvature_threshold", clin.curvature_threshold),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Gaussian smoothing applied independently to every raw series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Kernel radius in frames; the window is `2 * radius + 1` wide.
    pub radius: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { radius: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardizeConfig {
    /// Floor applied to a group's pooled stddev when its variance collapses.
    pub epsilon: f32,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self { epsilon: 1e-6 }
    }
}

/// Swallow-cycle detection over the standardized driver series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Extra Gaussian smoothing radius applied to the driver before searching.
    pub driver_radius: usize,
    /// Frames excluded from peak candidacy at each end of the recording.
    pub boundary_margin: usize,
    /// Half-width of the symmetric local-maximum comparison window.
    pub peak_window: usize,
    /// Minimum standardized value for a candidate peak.
    pub min_peak_height: f32,
    /// Peaks closer than this keep only the larger; also the minimum
    /// accepted cycle duration.
    pub min_cycle_frames: usize,
    /// Maximum accepted cycle duration.
    pub max_cycle_frames: usize,
    /// First-difference value that counts as the start of a rise.
    pub rise_threshold: f32,
    /// How far past the peak the end-minimum search may look.
    pub end_search_window: usize,
    /// How far past the end-minimum the stability search may look.
    pub stability_window: usize,
    /// Consecutive differences below this magnitude mark the cycle end.
    pub stability_threshold: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            driver_radius: 2,
            boundary_margin: 3,
            peak_window: 5,
            min_peak_height: 0.3,
            min_cycle_frames: 15,
            max_cycle_frames: 300,
            rise_threshold: 0.02,
            end_search_window: 60,
            stability_window: 30,
            stability_threshold: 0.005,
        }
    }
}

/// Per-cycle clinical parameter extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalConfig {
    /// Lower percentile of the contraction ratio (nearest rank).
    pub lower_percentile: f32,
    /// Upper percentile of the contraction ratio (nearest rank).
    pub upper_percentile: f32,
    /// Pad added to `|min sample|` when exactly one percentile is negative.
    pub contraction_offset: f32,
    /// Operands with magnitude below this are clamped to it before the
    /// aspiration ratio divide.
    pub near_zero_clamp: f32,
    /// Inclusive overlap/vestibule ratio at which a cycle is flagged.
    pub aspiration_threshold: f32,
    /// Slope magnitude that counts as a sustained trend reversal in the
    /// fallback landmark strategy.
    pub slope_reversal_threshold: f32,
    /// Second-difference magnitude required by the curvature landmark
    /// detector (LVC / LVCoff).
    pub curvature_threshold: f32,
}

impl Default for ClinicalConfig {
    fn default() -> Self {
        Self {
            lower_percentile: 5.0,
            upper_percentile: 95.0,
            contraction_offset: 0.1,
            near_zero_clamp: 0.01,
            aspiration_threshold: 0.2,
            slope_reversal_threshold: 0.02,
            curvature_threshold: 0.05,
        }
    }
}
