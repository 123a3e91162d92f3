//! Locally-weighted Gaussian smoothing.

use ndarray::Array1;

/// Gaussian-weighted moving average with kernel radius `radius`.
///
/// Element i averages the in-bounds neighbors within `±radius`, weighted by
/// `exp(-j² / (2·radius²))` for offset j. Edges use fewer neighbors; there
/// is no padding or wraparound. Inputs shorter than the window
/// (`2·radius + 1`) are returned unchanged.
pub fn gaussian_smooth(signal: &Array1<f32>, radius: usize) -> Array1<f32> {
    let n = signal.len();
    if radius == 0 || n < 2 * radius + 1 {
        return signal.clone();
    }

    let denom = 2.0 * (radius * radius) as f32;
    let mut out = Array1::zeros(n);
    for i in 0..n {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius).min(n - 1);
        let mut acc = 0.0f32;
        let mut norm = 0.0f32;
        for j in lo..=hi {
            let offset = j as f32 - i as f32;
            let w = (-(offset * offset) / denom).exp();
            acc += w * signal[j];
            norm += w;
        }
        out[i] = acc / norm;
    }
    out
}

/// Smooth an optional series, leaving absences exactly in place.
///
/// Present samples are compacted, smoothed as a dense vector, and written
/// back to their original frame slots. The kernel therefore averages over
/// measurement-space neighbors, not frame-space neighbors, when gaps are
/// present.
pub fn smooth_optional(series: &[Option<f32>], radius: usize) -> Vec<Option<f32>> {
    let mut slots = Vec::with_capacity(series.len());
    let mut values = Vec::with_capacity(series.len());
    for (i, v) in series.iter().enumerate() {
        if let Some(x) = v {
            slots.push(i);
            values.push(*x);
        }
    }
    let mut out = vec![None; series.len()];
    if values.is_empty() {
        return out;
    }
    let smoothed = gaussian_smooth(&Array1::from(values), radius);
    for (k, &slot) in slots.iter().enumerate() {
        out[slot] = Some(smoothed[k]);
    }
    out
}
