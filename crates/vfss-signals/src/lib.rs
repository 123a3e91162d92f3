//! # vfss-signals
//!
//! Swallowing-study (videofluoroscopic) signal analysis core.
//!
//! This crate turns the per-frame geometric measurements produced by an
//! upstream video measurement stage into clinically meaningful temporal
//! landmarks and ratios:
//!
//! - **Smoothing**: Gaussian-kernel local averaging of every raw series
//! - **Scale calibration**: rescaling against the C2–C4 anatomical ruler
//! - **Grouped standardization**: pooled area/distance z-scoring
//! - **Cycle segmentation**: swallow detection on the bolus–pharynx
//!   overlap driver
//! - **Clinical extraction**: contraction ratio, aspiration risk and the
//!   five kinematic landmarks (HYB, UESO, UESC, LVC, LVCoff) per cycle
//!
//! ## Example
//!
//! ```ignore
//! use vfss_signals::{FrameRecord, SwallowAnalyzer};
//!
//! let frames: Vec<FrameRecord> = upstream_measurements();
//! let result = SwallowAnalyzer::new().analyze(&frames, 30.0);
//!
//! for cycle in &result.cycles {
//!     println!(
//!         "swallow {} at {:.2}s, PCR {:?}",
//!         cycle.cycle_number, cycle.peak_sec, cycle.clinical.contraction
//!     );
//! }
//! ```
//!
//! The core is a pure batch computation: no I/O, no streaming, and no
//! failure paths; degraded input produces absent fields and empty cycle
//! lists with a well-defined shape.

pub mod calibrate;
pub mod clinical;
pub mod config;
pub mod dsp;
pub mod export;
pub mod frame;
pub mod pipeline;
pub mod segment;
pub mod standardize;

pub use clinical::{
    AspirationRisk, ClinicalParameters, ContractionRatio, Intervals, IntervalsSeconds, Landmark,
};
pub use config::{
    AnalysisConfig, ClinicalConfig, ConfigError, SegmentationConfig, SmoothingConfig,
    StandardizeConfig,
};
pub use frame::{FrameRecord, Param, ParamGroup, SeriesBundle};
pub use pipeline::{StudyResult, StudySummary, SwallowAnalyzer, SwallowCycle};
pub use segment::{CycleBounds, Peak, Segmentation};
pub use standardize::GroupStatistics;
