//! Frame-table rendering for the downstream comma-separated export.
//!
//! Column order and rounding are part of the compatibility contract with
//! the spreadsheet tooling that consumes the file: one row per frame, and
//! for every parameter a smoothed / normalized / standardized triplet.
//! Smoothed and normalized values carry three decimals, standardized
//! z-scores two. Absent values render as empty cells, keeping absence
//! distinguishable from zero.

use std::fmt::Write as _;

use crate::frame::Param;
use crate::pipeline::StudyResult;

/// Render the per-frame series table as CSV text.
pub fn frame_table(result: &StudyResult) -> String {
    let frames = result.smoothed.len();
    let mut out = String::with_capacity(frames * Param::COUNT * 24);

    out.push_str("frame");
    for param in Param::ALL {
        let label = param.label();
        let _ = write!(
            out,
            ",{label}_smoothed,{label}_normalized,{label}_standardized"
        );
    }
    out.push('\n');

    for i in 0..frames {
        let _ = write!(out, "{i}");
        for param in Param::ALL {
            push_cell(&mut out, result.smoothed.series(param)[i], 3);
            push_cell(&mut out, result.normalized.series(param)[i], 3);
            push_cell(&mut out, result.standardized.series(param)[i], 2);
        }
        out.push('\n');
    }
    out
}

fn push_cell(out: &mut String, value: Option<f32>, decimals: usize) {
    out.push(',');
    if let Some(v) = value {
        let _ = write!(out, "{v:.decimals$}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameRecord;
    use crate::pipeline::SwallowAnalyzer;

    fn small_result() -> StudyResult {
        let frames: Vec<FrameRecord> = (0..40)
            .map(|i| FrameRecord {
                index: i,
                pharynx_area: Some(10.0 + i as f32 * 0.01),
                hyoid_c4_distance: if i == 5 { None } else { Some(20.0) },
                c2c4_length: Some(40.0),
                ..Default::default()
            })
            .collect();
        SwallowAnalyzer::new().analyze(&frames, 30.0)
    }

    #[test]
    fn test_table_shape() {
        let table = frame_table(&small_result());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 41);

        let columns = 1 + 3 * Param::COUNT;
        for line in &lines {
            assert_eq!(line.split(',').count(), columns);
        }
        assert!(lines[0].starts_with("frame,pharynx_area_smoothed"));
    }

    #[test]
    fn test_absent_cells_are_empty() {
        let table = frame_table(&small_result());
        let row: Vec<&str> = table.lines().nth(6).unwrap().split(',').collect();
        // hyoid_c4_distance triplet for the frame with the dropped sample.
        let base = 1 + 3 * Param::HyoidC4Distance.index();
        assert_eq!(row[base], "");
        assert_eq!(row[base + 1], "");
        assert_eq!(row[base + 2], "");
    }

    #[test]
    fn test_rounding_depths() {
        let table = frame_table(&small_result());
        let row: Vec<&str> = table.lines().nth(1).unwrap().split(',').collect();
        let base = 1 + 3 * Param::PharynxArea.index();
        let decimals = |cell: &str| cell.rsplit('.').next().unwrap().len();
        assert_eq!(decimals(row[base]), 3);
        assert_eq!(decimals(row[base + 1]), 3);
        assert_eq!(decimals(row[base + 2]), 2);
    }
}
