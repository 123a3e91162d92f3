//! Frame-to-frame differences with absence propagation.

/// First differences: `d[i] = v[i+1] - v[i]`, `None` when either side is
/// absent. Output length is N-1; `d[i]` is the slope leaving frame i.
pub fn first_differences(series: &[Option<f32>]) -> Vec<Option<f32>> {
    if series.len() < 2 {
        return Vec::new();
    }
    (0..series.len() - 1)
        .map(|i| match (series[i], series[i + 1]) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        })
        .collect()
}

/// Second differences, derived from the first. Output length is N-2;
/// `dd[i]` is the curvature centered on frame i+1.
pub fn second_differences(series: &[Option<f32>]) -> Vec<Option<f32>> {
    first_differences(&first_differences(series))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_differences() {
        let series = vec![Some(1.0), Some(3.0), None, Some(2.0), Some(2.5)];
        assert_eq!(
            first_differences(&series),
            vec![Some(2.0), None, None, Some(0.5)]
        );
    }

    #[test]
    fn test_second_differences_of_parabola() {
        // v = i² has constant second difference 2.
        let series: Vec<Option<f32>> = (0..6).map(|i| Some((i * i) as f32)).collect();
        let dd = second_differences(&series);
        assert_eq!(dd.len(), 4);
        assert!(dd.iter().all(|d| *d == Some(2.0)));
    }

    #[test]
    fn test_short_input() {
        assert!(first_differences(&[Some(1.0)]).is_empty());
        assert!(second_differences(&[Some(1.0), Some(2.0)]).is_empty());
    }
}
