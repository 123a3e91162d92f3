//! End-to-end pipeline scenarios on synthetic recordings.

use vfss_signals::{FrameRecord, Param, SwallowAnalyzer};

fn bump(x: f32, center: f32, amplitude: f32, sigma: f32) -> f32 {
    let t = x - center;
    amplitude * (-(t * t) / (2.0 * sigma * sigma)).exp()
}

/// Synthetic single-swallow recording: every structure moves around frame
/// `center`, with a constant C2-C4 ruler so calibration is the identity.
fn single_swallow_recording(n: usize, center: f32) -> Vec<FrameRecord> {
    (0..n)
        .map(|i| {
            let x = i as f32;
            FrameRecord {
                index: i,
                pharynx_area: Some(10.0 - bump(x, center, 6.0, 4.0)),
                vestibule_area: Some(
                    5.0 - bump(x, center - 5.0, 1.5, 2.0) + bump(x, center, 3.0, 2.0)
                        - bump(x, center + 5.0, 1.5, 2.0),
                ),
                bolus_area: Some(8.0),
                bolus_pharynx_overlap: Some(0.2 + bump(x, center, 8.8, 5.0)),
                bolus_vestibule_overlap: Some(0.1),
                hyoid_c4_distance: Some(20.0 + bump(x, center, 5.0, 3.0)),
                ues_length: Some(15.0 + bump(x, center, 4.0, 3.0)),
                c2c4_length: Some(50.0),
            }
        })
        .collect()
}

#[test]
fn test_single_swallow_detected() {
    let frames = single_swallow_recording(60, 30.0);
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);

    assert_eq!(result.cycles.len(), 1, "expected exactly one cycle");
    let cycle = &result.cycles[0];
    assert_eq!(cycle.cycle_number, 1);
    assert_eq!(cycle.peak_frame, 30);
    assert!(cycle.start_frame < cycle.peak_frame);
    assert!(cycle.peak_frame < cycle.end_frame);
    assert!((cycle.peak_sec - 1.0).abs() < 1e-6);
    assert_eq!(cycle.duration_frames, cycle.end_frame - cycle.start_frame);
    assert_eq!(result.summary.cycle_count, 1);
}

#[test]
fn test_single_swallow_clinical_parameters() {
    let frames = single_swallow_recording(60, 30.0);
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);
    let clinical = &result.cycles[0].clinical;

    let pcr = clinical.contraction.expect("contraction ratio");
    assert!(pcr.ratio.is_finite());

    let aspiration = clinical.aspiration.expect("aspiration ratio");
    assert!(!aspiration.at_risk, "constant small overlap must not flag");

    let hyb = clinical.hyoid_burst.expect("HYB");
    assert_eq!(hyb.anchor_frame, 30);
    assert!(hyb.frame < 30);
    let ueso = clinical.ues_open.expect("UESO");
    let uesc = clinical.ues_close.expect("UESC");
    assert!(ueso.frame < 30 && uesc.frame > 30);
    let lvc = clinical.vestibule_close.expect("LVC");
    let lvcoff = clinical.vestibule_reopen.expect("LVCoff");
    assert!(lvc.frame < 30 && lvcoff.frame > 30);

    assert!(clinical.intervals.vestibule_reopen_from_close.unwrap() > 0);
    assert_eq!(result.summary.complete_landmark_cycles, 1);
}

#[test]
fn test_two_swallows_ordered_and_disjoint() {
    let n = 160;
    let frames: Vec<FrameRecord> = (0..n)
        .map(|i| {
            let x = i as f32;
            let overlap = 0.2 + bump(x, 45.0, 8.8, 5.0) + bump(x, 115.0, 7.0, 5.0);
            FrameRecord {
                index: i,
                pharynx_area: Some(10.0),
                vestibule_area: Some(5.0),
                bolus_area: Some(8.0),
                bolus_pharynx_overlap: Some(overlap),
                bolus_vestibule_overlap: Some(0.1),
                hyoid_c4_distance: Some(20.0 + bump(x, 45.0, 5.0, 3.0) + bump(x, 115.0, 5.0, 3.0)),
                ues_length: Some(15.0 + bump(x, 45.0, 4.0, 3.0) + bump(x, 115.0, 4.0, 3.0)),
                c2c4_length: Some(50.0),
            }
        })
        .collect();

    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);
    assert_eq!(result.cycles.len(), 2);
    assert_eq!(result.cycles[0].peak_frame, 45);
    assert_eq!(result.cycles[1].peak_frame, 115);
    for pair in result.cycles.windows(2) {
        assert!(
            pair[0].end_frame < pair[1].start_frame,
            "cycles must not overlap"
        );
    }
    for cycle in &result.cycles {
        assert!(cycle.start_frame < cycle.peak_frame && cycle.peak_frame < cycle.end_frame);
    }
}

#[test]
fn test_aspiration_flagged_cycle() {
    let mut frames = single_swallow_recording(60, 30.0);
    // Bolus spills into the vestibule near the peak.
    for frame in frames.iter_mut().take(34).skip(28) {
        frame.bolus_vestibule_overlap = Some(2.0);
    }
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);

    assert_eq!(result.cycles.len(), 1);
    let aspiration = result.cycles[0].clinical.aspiration.expect("ratio");
    assert!(aspiration.max_ratio >= 0.2);
    assert!(aspiration.at_risk);
    assert_eq!(result.summary.aspiration_cycles, 1);
}

#[test]
fn test_recording_shorter_than_min_cycle() {
    let frames = single_swallow_recording(10, 5.0);
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);
    assert!(result.cycles.is_empty());
}

#[test]
fn test_missing_ruler_degrades_whole_pipeline() {
    let mut frames = single_swallow_recording(60, 30.0);
    for frame in &mut frames {
        frame.c2c4_length = None;
    }
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);

    assert!(result.calibration_reference.is_none());
    assert!(result.cycles.is_empty());
    assert!(result
        .normalized
        .series(Param::PharynxArea)
        .iter()
        .all(Option::is_none));
}

#[test]
fn test_sparse_measurements_stay_absent() {
    let mut frames = single_swallow_recording(60, 30.0);
    frames[10].pharynx_area = None;
    frames[11].pharynx_area = None;
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);

    for bundle in [&result.smoothed, &result.normalized, &result.standardized] {
        let series = bundle.series(Param::PharynxArea);
        assert!(series[10].is_none());
        assert!(series[11].is_none());
        assert!(series[12].is_some());
    }
}

#[test]
fn test_analysis_is_deterministic() {
    let frames = single_swallow_recording(60, 30.0);
    let analyzer = SwallowAnalyzer::new();
    let a = analyzer.analyze(&frames, 30.0);
    let b = analyzer.analyze(&frames, 30.0);
    assert_eq!(a, b);
}

#[test]
fn test_export_table_matches_recording() {
    let frames = single_swallow_recording(60, 30.0);
    let result = SwallowAnalyzer::new().analyze(&frames, 30.0);
    let table = vfss_signals::export::frame_table(&result);

    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 61);
    assert_eq!(lines[0].split(',').count(), 1 + 3 * Param::COUNT);
}
