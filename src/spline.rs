use nalgebra::Vector3;

/// Smoothed samples produced per input sample.
pub const SMOOTH_FACTOR: usize = 4;

/// Uniform Catmull-Rom segment between `p1` and `p2`.
pub fn catmull_rom(
    p0: &Vector3<f32>,
    p1: &Vector3<f32>,
    p2: &Vector3<f32>,
    p3: &Vector3<f32>,
    t: f32,
) -> Vector3<f32> {
    let t2 = t * t;
    let t3 = t2 * t;
    (p1 * 2.0
        + (-p0 + p2) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (-p0 + p1 * 3.0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

/// Resamples `points` into `SMOOTH_FACTOR * points.len()` samples spread
/// evenly over the curve's parametric range. End control points are
/// duplicated, so the curve starts and ends exactly on the first and last
/// input.
pub fn smooth(points: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let smooth_count = points.len() * SMOOTH_FACTOR;
    let clamp = |i: isize| points[i.max(0).min(last as isize) as usize];
    (0..smooth_count)
        .map(|k| {
            let t = k as f32 / (smooth_count - 1) as f32 * last as f32;
            let idx = (t.floor() as isize).min(last as isize);
            let local_t = t - idx as f32;
            catmull_rom(
                &clamp(idx - 1),
                &clamp(idx),
                &clamp(idx + 1),
                &clamp(idx + 2),
                local_t,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Vector3<f32>, b: &Vector3<f32>) {
        assert!((a - b).norm() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_segment_endpoints() {
        let p = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 0.0),
            Vector3::new(3.0, 1.0, 1.0),
            Vector3::new(4.0, 0.0, 2.0),
        ];
        assert_close(&catmull_rom(&p[0], &p[1], &p[2], &p[3], 0.0), &p[1]);
        assert_close(&catmull_rom(&p[0], &p[1], &p[2], &p[3], 1.0), &p[2]);
    }

    #[test]
    fn test_clamped_start_segment() {
        // p0 == p1, as produced by index clamping at the start of the curve.
        let p1 = Vector3::new(0.0, 0.0, 0.0);
        let p2 = Vector3::new(1.0, 0.0, 0.0);
        let p3 = Vector3::new(2.0, 1.0, 0.0);
        let t = 0.5;
        let expected = (p1 * 2.0
            + (p2 - p1) * t
            + (-p1 * 3.0 + p2 * 4.0 - p3) * t * t
            + (p1 * 2.0 - p2 * 3.0 + p3) * t * t * t)
            * 0.5;
        assert_close(&catmull_rom(&p1, &p1, &p2, &p3, t), &expected);
        assert_close(&catmull_rom(&p1, &p1, &p2, &p3, 0.0), &p1);
        assert_close(&catmull_rom(&p1, &p1, &p2, &p3, 1.0), &p2);
    }

    #[test]
    fn test_both_ends_clamped() {
        // p0 == p1 == a, p2 == p3 == b.
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(2.0, 0.0, 0.0);
        for &t in &[0.0f32, 0.25, 0.5, 0.75, 1.0] {
            let expected = a + (b - a) * (0.5 * t + 1.5 * t * t - t * t * t);
            assert_close(&catmull_rom(&a, &a, &b, &b, t), &expected);
        }
    }

    #[test]
    fn test_smooth_count_and_ends() {
        let points: Vec<_> = (0..5)
            .map(|i| Vector3::new(i as f32, (i * i) as f32 * 0.1, 0.0))
            .collect();
        let smoothed = smooth(&points);
        assert_eq!(smoothed.len(), 20);
        assert_close(&smoothed[0], &points[0]);
        assert_close(&smoothed[19], &points[4]);
    }

    #[test]
    fn test_smooth_straight_line_stays_on_line() {
        let points: Vec<_> = (0..4).map(|i| Vector3::new(0.0, 0.0, i as f32)).collect();
        for p in smooth(&points) {
            assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
            assert!(p.z >= -1e-6 && p.z <= 3.0 + 1e-6);
        }
    }

    #[test]
    fn test_smooth_single_point() {
        let points = [Vector3::new(1.0, 2.0, 3.0)];
        assert_eq!(smooth(&points), points.to_vec());
    }
}
