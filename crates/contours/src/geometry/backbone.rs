//! Backbone spline through loop centers, parameterized by arc length.

use glam::Vec3;

/// Samples per Catmull-Rom span
const STEPS_PER_SPAN: usize = 16;

/// A densely sampled spline with cumulative arc length.
/// Parameters `t` run from 0 (first center) to 1 (last center).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Backbone {
    points: Vec<Vec3>,
    lengths: Vec<f32>,
}

/// Uniform Catmull-Rom through `centers` (ends clamped by repetition)
fn sample_catmull_rom(centers: &[Vec3], steps: usize) -> Vec<Vec3> {
    if centers.len() < 2 {
        return centers.to_vec();
    }
    let count = centers.len();
    let mut samples = Vec::with_capacity((count - 1) * steps + 1);

    for i in 0..count - 1 {
        let p0 = centers[i.saturating_sub(1)];
        let p1 = centers[i];
        let p2 = centers[i + 1];
        let p3 = centers[(i + 2).min(count - 1)];

        for step in 0..steps {
            let t = step as f32 / steps as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            samples.push(
                0.5 * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3),
            );
        }
    }
    samples.push(centers[count - 1]);
    samples
}

impl Backbone {
    pub fn through(centers: &[Vec3]) -> Self {
        let points = sample_catmull_rom(centers, STEPS_PER_SPAN);
        let mut lengths = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                acc += p.distance(points[i - 1]);
            }
            lengths.push(acc);
        }
        Self { points, lengths }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Sample segment containing arc length `s`, with the local fraction
    fn locate(&self, s: f32) -> (usize, f32) {
        let last = self.points.len() - 1;
        let idx = self.lengths.partition_point(|&l| l <= s).clamp(1, last) - 1;
        let span = self.lengths[idx + 1] - self.lengths[idx];
        let f = if span > 0.0 {
            ((s - self.lengths[idx]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (idx, f)
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        match self.points.len() {
            0 => Vec3::ZERO,
            1 => self.points[0],
            _ => {
                let (i, f) = self.locate(t.clamp(0.0, 1.0) * self.length());
                self.points[i].lerp(self.points[i + 1], f)
            }
        }
    }

    /// Unit direction of travel at `t` (zero for a single point)
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        if self.points.len() < 2 {
            return Vec3::ZERO;
        }
        let (i, _) = self.locate(t.clamp(0.0, 1.0) * self.length());
        (self.points[i + 1] - self.points[i]).normalize_or_zero()
    }

    /// Closest parameter on the backbone to `p`, with the distance to it
    pub fn project(&self, p: Vec3) -> (f32, f32) {
        match self.points.len() {
            0 => (0.0, f32::MAX),
            1 => (0.0, self.points[0].distance(p)),
            _ => {
                let total = self.length().max(f32::EPSILON);
                let mut best = (0.0, f32::MAX);
                for i in 0..self.points.len() - 1 {
                    let (a, b) = (self.points[i], self.points[i + 1]);
                    let ab = b - a;
                    let len_sq = ab.length_squared();
                    let f = if len_sq > 0.0 {
                        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    let d = p.distance(a + ab * f);
                    if d < best.1 {
                        let s = self.lengths[i] + f * (self.lengths[i + 1] - self.lengths[i]);
                        best = (s / total, d);
                    }
                }
                best
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_backbone() {
        let bb = Backbone::through(&[Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0)]);
        assert!((bb.length() - 4.0).abs() < 1e-4);
        assert!((bb.point_at(0.25) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-3);
        assert!((bb.tangent_at(0.5) - Vec3::Y).length() < 1e-4);
        assert_eq!(bb.point_at(0.0), Vec3::ZERO);
        assert!((bb.point_at(1.0) - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_passes_through_centers() {
        let centers = [Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.0, 4.0, 1.0)];
        let bb = Backbone::through(&centers);
        assert_eq!(bb.points()[0], centers[0]);
        assert_eq!(bb.points()[STEPS_PER_SPAN], centers[1]);
        assert_eq!(*bb.points().last().unwrap(), centers[2]);
    }

    #[test]
    fn test_project() {
        let bb = Backbone::through(&[Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)]);
        let (t, d) = bb.project(Vec3::new(2.0, 3.0, 0.0));
        assert!((t - 0.3).abs() < 1e-3);
        assert!((d - 2.0).abs() < 1e-3);

        let (t, _) = bb.project(Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_single_point() {
        let bb = Backbone::through(&[Vec3::ONE]);
        assert_eq!(bb.length(), 0.0);
        assert_eq!(bb.point_at(0.7), Vec3::ONE);
        assert_eq!(bb.tangent_at(0.2), Vec3::ZERO);
        assert!((bb.project(Vec3::ZERO).1 - 3f32.sqrt()).abs() < 1e-6);
    }
}
