//! Math type aliases and geometric helpers.
//!
//! Vertex data is stored as plain `[f32; N]` arrays so it can be cast to bytes
//! with `bytemuck`. Computations convert to these nalgebra types on the fly:
//! `Vec3::from(vertex.position)` and back with `.into()`.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// Squared length below which a vector is treated as zero.
pub const DEGENERATE_EPSILON: f32 = 1e-12;

/// Normalize `v`, or return `None` if it is (numerically) zero.
pub fn try_normalize(v: Vec3) -> Option<Vec3> {
    let len_sq = v.norm_squared();
    if len_sq <= DEGENERATE_EPSILON || !len_sq.is_finite() {
        None
    } else {
        Some(v / len_sq.sqrt())
    }
}

/// Unit normal of a planar polygon using Newell's method.
///
/// Counter-clockwise winding (seen from the front) yields a normal pointing
/// towards the viewer. Returns `None` for fewer than three points or a
/// degenerate (zero-area) polygon.
pub fn newell_normal(points: &[Vec3]) -> Option<Vec3> {
    if points.len() < 3 {
        return None;
    }
    let mut n = Vec3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        n.x += (current.y - next.y) * (current.z + next.z);
        n.y += (current.z - next.z) * (current.x + next.x);
        n.z += (current.x - next.x) * (current.y + next.y);
    }
    try_normalize(n)
}

/// Some unit vector perpendicular to `n` (which must be non-zero).
pub fn any_orthogonal(n: &Vec3) -> Vec3 {
    // Cross with the axis least aligned with n.
    let axis = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        Vec3::x()
    } else if n.y.abs() <= n.z.abs() {
        Vec3::y()
    } else {
        Vec3::z()
    };
    try_normalize(n.cross(&axis)).unwrap_or_else(Vec3::x)
}

/// Component-wise minimum and maximum of a point set.
pub fn min_max<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<(Vec3, Vec3)> {
    let mut iter = points.into_iter();
    let first = Vec3::from(*iter.next()?);
    Some(iter.fold((first, first), |(min, max), p| {
        let p = Vec3::from(*p);
        (min.inf(&p), max.sup(&p))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newell_ccw_triangle_points_up_z() {
        let n = newell_normal(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        assert!((n - Vec3::z()).norm() < 1e-6);
    }

    #[test]
    fn newell_quad_matches_triangle_winding() {
        let n = newell_normal(&[
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, -1.0),
        ])
        .unwrap();
        assert!((n - Vec3::y()).norm() < 1e-6);
    }

    #[test]
    fn newell_degenerate_is_none() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(newell_normal(&[p, p, p]).is_none());
        assert!(newell_normal(&[p, p]).is_none());
    }

    #[test]
    fn orthogonal_is_perpendicular_and_unit() {
        for n in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(1.0, 2.0, -3.0)] {
            let o = any_orthogonal(&n);
            assert!(o.dot(&n).abs() < 1e-5);
            assert!((o.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn min_max_of_points() {
        let pts = [[1.0, -2.0, 3.0], [-1.0, 4.0, 0.5]];
        let (min, max) = min_max(pts.iter()).unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.5));
        assert_eq!(max, Vec3::new(1.0, 4.0, 3.0));
        assert!(min_max(std::iter::empty()).is_none());
    }
}
