//! Arc-length resampling of closed polylines

use glam::Vec3;

use crate::error::{ContourError, ContourResult};

/// Perimeter of a closed polyline, closing edge included
pub fn closed_length(points: &[Vec3]) -> f32 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| points[i].distance(points[(i + 1) % n])).sum()
}

/// Resample a closed polyline into exactly `n` points spaced `L / n` apart
/// along its arc, starting at `points[0]`.
///
/// Open chains are treated as closed by their last-to-first edge.
pub fn resample(points: &[Vec3], n: usize) -> ContourResult<Vec<Vec3>> {
    if n < 3 {
        return Err(ContourError::degenerate(format!("need at least 3 vertices, got {n}")));
    }
    if points.len() < 2 {
        return Err(ContourError::degenerate("polyline has fewer than 2 points"));
    }

    let count = points.len();
    let mut lengths = Vec::with_capacity(count + 1);
    lengths.push(0.0f32);
    for i in 0..count {
        let seg = points[i].distance(points[(i + 1) % count]);
        lengths.push(lengths[i] + seg);
    }
    let total = lengths[count];

    if !total.is_finite() || total < 1e-6 {
        return Err(ContourError::degenerate("polyline has zero length"));
    }

    let mut out = Vec::with_capacity(n);
    let mut seg = 0;
    for k in 0..n {
        let target = total * k as f32 / n as f32;
        while seg + 1 < count && lengths[seg + 1] < target {
            seg += 1;
        }
        let span = lengths[seg + 1] - lengths[seg];
        let t = if span > 0.0 {
            ((target - lengths[seg]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(points[seg].lerp(points[(seg + 1) % count], t));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn circle(n: usize, r: f32) -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let a = i as f32 * TAU / n as f32;
                Vec3::new(r * a.cos(), 0.0, r * a.sin())
            })
            .collect()
    }

    #[test]
    fn test_resample_count_and_even_spacing() {
        let poly = circle(97, 2.0);
        for n in [3, 4, 12, 40] {
            let out = resample(&poly, n).unwrap();
            assert_eq!(out.len(), n);

            let gaps: Vec<f32> = (0..n).map(|i| out[i].distance(out[(i + 1) % n])).collect();
            let mean = gaps.iter().sum::<f32>() / n as f32;
            for g in &gaps {
                assert!((g - mean).abs() < mean * 0.02, "n={n} gap={g} mean={mean}");
            }
        }
    }

    #[test]
    fn test_square_arc_spacing() {
        // 4x4 square, perimeter 16: 8 samples land every 2 units
        let square = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(4.0, 4.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
        ];
        let out = resample(&square, 8).unwrap();
        assert_eq!(out[0], Vec3::ZERO);
        assert!((out[1] - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((out[3] - Vec3::new(4.0, 2.0, 0.0)).length() < 1e-5);
        assert!((out[7] - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_resample_is_deterministic() {
        let poly = circle(33, 1.0);
        assert_eq!(resample(&poly, 10).unwrap(), resample(&poly, 10).unwrap());
    }

    #[test]
    fn test_resample_rejects_degenerate() {
        let poly = circle(10, 1.0);
        assert!(matches!(resample(&poly, 2), Err(ContourError::DegenerateLoop(_))));
        assert!(resample(&[Vec3::ONE], 5).is_err());
        assert!(resample(&[Vec3::ONE, Vec3::ONE, Vec3::ONE], 5).is_err());
    }

    #[test]
    fn test_closed_length() {
        let square = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        assert!((closed_length(&square) - 4.0).abs() < 1e-6);
        assert_eq!(closed_length(&square[..1]), 0.0);
    }
}
