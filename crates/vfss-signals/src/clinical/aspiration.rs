//! Aspiration-risk ratio.
//!
//! Bolus material overlapping the laryngeal vestibule beyond a ratio
//! threshold flags the cycle. Operates on normalized (not standardized)
//! values so the ratio keeps its physical meaning.

use serde::{Deserialize, Serialize};

use crate::config::ClinicalConfig;
use crate::segment::CycleBounds;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspirationRisk {
    pub at_risk: bool,
    /// Largest overlap/vestibule ratio observed in the cycle.
    pub max_ratio: f32,
}

/// `None` when no frame in the cycle carries both operands.
pub fn aspiration_risk(
    overlap: &[Option<f32>],
    vestibule: &[Option<f32>],
    cycle: &CycleBounds,
    cfg: &ClinicalConfig,
) -> Option<AspirationRisk> {
    let end = cycle.end_frame.min(overlap.len().min(vestibule.len()).checked_sub(1)?);
    let mut max_ratio: Option<f32> = None;
    for i in cycle.start_frame..=end {
        if let (Some(o), Some(v)) = (overlap[i], vestibule[i]) {
            let ratio = clamp_near_zero(o, cfg.near_zero_clamp)
                / clamp_near_zero(v, cfg.near_zero_clamp);
            max_ratio = Some(max_ratio.map_or(ratio, |m: f32| m.max(ratio)));
        }
    }
    max_ratio.map(|max_ratio| AspirationRisk {
        at_risk: max_ratio >= cfg.aspiration_threshold,
        max_ratio,
    })
}

/// Near-zero operands are clamped away from zero before dividing.
fn clamp_near_zero(value: f32, clamp: f32) -> f32 {
    if value.abs() < clamp {
        clamp
    } else {
        value
    }
}
