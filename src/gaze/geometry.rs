//! Stateless geometry for gaze targeting — planes, view frustum,
//! ray vs. oriented box, and mirror reflection.
//!
//! Every function here tolerates degenerate input (zero vectors, empty
//! boxes, collapsed frusta) by reporting "no hit" / "not contained"
//! instead of producing NaN.

use super::math::{Quat, Vec3};

// ── Ray ──────────────────────────────────────────────────────

/// A ray in 3D space. `direction` is normalized on construction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Evaluate the point at parameter t along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

// ── Plane ────────────────────────────────────────────────────

/// Plane in Hessian normal form: `normal · p + distance = 0`.
/// Points with positive signed distance are in front of the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// A plane with zero normal; contains nothing.
    pub const DEGENERATE: Self = Self {
        normal: Vec3::ZERO,
        distance: 0.0,
    };

    pub fn new(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Plane through three points; the normal follows `(b - a) x (c - a)`.
    /// Collinear points give a degenerate plane.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new((b - a).cross(c - a), a)
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.distance
    }

    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }
}

// ── Frustum ──────────────────────────────────────────────────

/// Six inward-facing planes: left, right, bottom, top, near, far.
/// Ordering carries no meaning for containment.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const DEGENERATE: Self = Self {
        planes: [Plane::DEGENERATE; 6],
    };

    pub fn is_degenerate(&self) -> bool {
        self.planes.iter().any(Plane::is_degenerate)
    }

    /// True iff a cube of half-size `epsilon_radius` centred on `point`
    /// is not entirely behind any of the six planes.
    pub fn contains_point(&self, point: Vec3, epsilon_radius: f32) -> bool {
        if self.is_degenerate() || !point.is_finite() {
            return false;
        }
        let eps = epsilon_radius.max(0.0);
        self.planes.iter().all(|plane| {
            let n = plane.normal.abs();
            let reach = eps * (n.x + n.y + n.z);
            plane.signed_distance(point) + reach >= 0.0
        })
    }
}

/// Build a view frustum from an origin and forward direction.
///
/// `fov_radians` is the full vertical field of view; the rectangle at
/// distance `d` has half-height `tan(fov / 2) * d` and a width of
/// `height * aspect_ratio`.
pub fn build_frustum(
    origin: Vec3,
    forward: Vec3,
    fov_radians: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
) -> Frustum {
    let forward = forward.normalize();
    if forward == Vec3::ZERO || !origin.is_finite() || !fov_radians.is_finite() {
        return Frustum::DEGENERATE;
    }

    let mut right = -forward.cross(Vec3::UP);
    if right.length_squared() < 1e-12 {
        // Looking straight up or down.
        right = -forward.cross(Vec3::FORWARD);
    }
    let right = right.normalize();
    let up = forward.cross(right);

    let near_center = origin + forward * near;
    let far_center = origin + forward * far;
    let half_tan = (fov_radians * 0.5).tan();
    let near_half_h = half_tan * near;
    let far_half_h = half_tan * far;
    let near_half_w = near_half_h * aspect_ratio;
    let far_half_w = far_half_h * aspect_ratio;

    let far_top_left = far_center + up * far_half_h - right * far_half_w;
    let far_bottom_left = far_center - up * far_half_h - right * far_half_w;
    let far_bottom_right = far_center - up * far_half_h + right * far_half_w;
    let near_top_left = near_center + up * near_half_h - right * near_half_w;
    let near_top_right = near_center + up * near_half_h + right * near_half_w;
    let near_bottom_right = near_center - up * near_half_h + right * near_half_w;

    Frustum {
        planes: [
            Plane::from_points(near_top_left, far_top_left, far_bottom_left),
            Plane::from_points(near_top_right, near_bottom_right, far_bottom_right),
            Plane::from_points(far_bottom_left, far_bottom_right, near_bottom_right),
            Plane::from_points(far_top_left, near_top_left, near_top_right),
            Plane::from_points(near_bottom_right, near_top_right, near_top_left),
            Plane::from_points(far_bottom_right, far_bottom_left, far_top_left),
        ],
    }
}

// ── Oriented box ─────────────────────────────────────────────

/// Box collider with arbitrary orientation.
///
/// For mirrors the reflective face spans the local XY plane and faces
/// along local +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl OrientedBox {
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents,
        }
    }

    /// Thin axis-aligned panel: `width` x `height` with a small depth.
    pub fn panel(center: Vec3, rotation: Quat, width: f32, height: f32) -> Self {
        Self::new(center, rotation, Vec3::new(width * 0.5, height * 0.5, 0.01))
    }

    pub fn is_degenerate(&self) -> bool {
        let e = self.half_extents;
        !(e.is_finite() && self.center.is_finite() && e.x > 0.0 && e.y > 0.0 && e.z > 0.0)
    }

    /// Normal of the reflective face in world space.
    pub fn face_normal(&self) -> Vec3 {
        self.rotation.rotate(Vec3::FORWARD).normalize()
    }

    pub fn to_local(&self, p: Vec3) -> Vec3 {
        self.rotation.conjugate().rotate(p - self.center)
    }
}

/// Ray vs. oriented box (slab test in box-local space).
///
/// Returns the entry distance when it is strictly below `max_distance`.
/// A ray starting inside the box does not hit it.
pub fn raycast_oriented_box(ray: &Ray, obb: &OrientedBox, max_distance: f32) -> Option<f32> {
    if obb.is_degenerate() || ray.direction == Vec3::ZERO || !ray.origin.is_finite() {
        return None;
    }
    if max_distance.is_nan() || max_distance <= 0.0 {
        return None;
    }

    let origin = obb.to_local(ray.origin);
    let dir = obb.rotation.conjugate().rotate(ray.direction);
    let o = [origin.x, origin.y, origin.z];
    let d = [dir.x, dir.y, dir.z];
    let e = [obb.half_extents.x, obb.half_extents.y, obb.half_extents.z];

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        if d[axis].abs() < 1e-8 {
            // Parallel to this slab: must already lie within it.
            if o[axis].abs() > e[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut t1 = (-e[axis] - o[axis]) * inv;
        let mut t2 = (e[axis] - o[axis]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 || t_enter >= max_distance {
        return None;
    }
    Some(t_enter)
}

// ── Reflection ───────────────────────────────────────────────

/// Mirror `query` through the plane given by a normal and a point on it.
///
/// Aiming at the result from `query` looks straight into the mirror at
/// one's own reflection. A zero normal leaves `query` unchanged.
pub fn reflect_across_plane(plane_normal: Vec3, plane_point: Vec3, query: Vec3) -> Vec3 {
    let normal = plane_normal.normalize();
    if normal == Vec3::ZERO {
        return query;
    }
    let closest = Plane::new(normal, plane_point).closest_point(query);
    closest - (query - closest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn frustum_deg(half_angle_deg: f32, forward: Vec3) -> Frustum {
        build_frustum(
            Vec3::ZERO,
            forward,
            (half_angle_deg * 2.0).to_radians(),
            1.3,
            0.15,
            10.0,
        )
    }

    #[test]
    fn test_plane_from_points_orientation() {
        let p = Plane::from_points(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        );
        assert!((p.normal.z - 1.0).abs() < 1e-6);
        assert!((p.signed_distance(Vec3::new(0.0, 0.0, 3.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_plane_collinear_is_degenerate() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        assert!(Plane::from_points(a, a, a).is_degenerate());
    }

    #[test]
    fn test_frustum_contains_forward_axis() {
        for half in [0.5_f32, 1.0, 8.0, 16.0, 30.0, 45.0] {
            let f = frustum_deg(half, Vec3::FORWARD);
            for dist in [0.2_f32, 1.0, 5.0, 9.9] {
                assert!(
                    f.contains_point(Vec3::new(0.0, 0.0, dist), 0.0005),
                    "half={} dist={}",
                    half,
                    dist
                );
            }
        }
    }

    #[test]
    fn test_frustum_rejects_behind_origin() {
        for half in [1.0_f32, 16.0, 45.0] {
            let f = frustum_deg(half, Vec3::FORWARD);
            assert!(!f.contains_point(Vec3::new(0.0, 0.0, -1.0), 0.0005));
            assert!(!f.contains_point(Vec3::ZERO, 0.0005));
        }
    }

    #[test]
    fn test_frustum_rejects_beyond_far_and_sides() {
        let f = frustum_deg(16.0, Vec3::FORWARD);
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 12.0), 0.0005));
        assert!(!f.contains_point(Vec3::new(3.0, 0.0, 2.0), 0.0005));
        assert!(!f.contains_point(Vec3::new(0.0, -3.0, 2.0), 0.0005));
        // Within tan(16deg) * 2 * 1.3 horizontally
        assert!(f.contains_point(Vec3::new(0.5, 0.0, 2.0), 0.0005));
    }

    #[test]
    fn test_frustum_follows_direction() {
        let f = frustum_deg(16.0, Vec3::new(1.0, 0.0, 0.0));
        assert!(f.contains_point(Vec3::new(3.0, 0.0, 0.0), 0.0005));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 3.0), 0.0005));
    }

    #[test]
    fn test_frustum_looking_straight_up() {
        let f = frustum_deg(16.0, Vec3::UP);
        assert!(!f.is_degenerate());
        assert!(f.contains_point(Vec3::new(0.0, 2.0, 0.0), 0.0005));
        assert!(!f.contains_point(Vec3::new(0.0, -2.0, 0.0), 0.0005));
    }

    #[test]
    fn test_frustum_degenerate_inputs_contain_nothing() {
        let zero_fwd = build_frustum(Vec3::ZERO, Vec3::ZERO, 0.5, 1.3, 0.15, 10.0);
        assert!(!zero_fwd.contains_point(Vec3::new(0.0, 0.0, 1.0), 0.0005));

        let zero_fov = frustum_deg(0.0, Vec3::FORWARD);
        assert!(!zero_fov.contains_point(Vec3::new(0.0, 0.0, 1.0), 0.0005));
        assert!(!zero_fov.contains_point(Vec3::new(4.0, 0.0, 1.0), 0.0005));
    }

    #[test]
    fn test_raycast_box_direct_hit() {
        let obb = OrientedBox::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY, Vec3::new(1.0, 1.0, 0.1));
        let ray = Ray::new(Vec3::ZERO, Vec3::FORWARD);
        let t = raycast_oriented_box(&ray, &obb, 20.0).expect("should hit");
        assert!((t - 4.9).abs() < 1e-4, "t={}", t);
    }

    #[test]
    fn test_raycast_rotated_box() {
        // Panel rotated 90 degrees about Y so its thin axis lies along X.
        let obb = OrientedBox::new(
            Vec3::new(0.0, 0.0, 5.0),
            Quat::from_yaw(FRAC_PI_2),
            Vec3::new(1.0, 1.0, 0.1),
        );
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        let t = raycast_oriented_box(&ray, &obb, 20.0).expect("should hit");
        assert!((t - 2.9).abs() < 1e-3, "t={}", t);

        let miss = Ray::new(Vec3::new(-3.0, 0.0, 6.5), Vec3::new(1.0, 0.0, 0.0));
        assert!(raycast_oriented_box(&miss, &obb, 20.0).is_none());
    }

    #[test]
    fn test_raycast_max_distance_is_exclusive() {
        let obb = OrientedBox::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY, Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::FORWARD);
        assert!(raycast_oriented_box(&ray, &obb, 4.0).is_none());
        assert!(raycast_oriented_box(&ray, &obb, 3.5).is_none());
        assert!(raycast_oriented_box(&ray, &obb, 4.01).is_some());
    }

    #[test]
    fn test_raycast_misses() {
        let obb = OrientedBox::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY, Vec3::new(1.0, 1.0, 0.1));
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(raycast_oriented_box(&away, &obb, 20.0).is_none());
        let beside = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::FORWARD);
        assert!(raycast_oriented_box(&beside, &obb, 20.0).is_none());
        let inside = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::FORWARD);
        assert!(raycast_oriented_box(&inside, &obb, 20.0).is_none());
    }

    #[test]
    fn test_raycast_degenerate_box_never_hits() {
        let flat = OrientedBox::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY, Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::FORWARD);
        assert!(raycast_oriented_box(&ray, &flat, 20.0).is_none());

        let nan = OrientedBox::new(Vec3::new(f32::NAN, 0.0, 5.0), Quat::IDENTITY, Vec3::splat(1.0));
        assert!(raycast_oriented_box(&ray, &nan, 20.0).is_none());

        let obb = OrientedBox::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY, Vec3::splat(1.0));
        let no_dir = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(raycast_oriented_box(&no_dir, &obb, 20.0).is_none());
    }

    #[test]
    fn test_reflect_across_plane() {
        let r = reflect_across_plane(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!((r - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5, "{:?}", r);

        // Normal sign does not matter.
        let r2 = reflect_across_plane(Vec3::FORWARD, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!((r - r2).length() < 1e-5);
    }

    #[test]
    fn test_reflect_twice_is_identity() {
        let normal = Vec3::new(0.3, 0.8, -0.5);
        let on_plane = Vec3::new(1.0, -2.0, 4.0);
        let p = Vec3::new(-0.7, 1.6, 0.25);
        let once = reflect_across_plane(normal, on_plane, p);
        let twice = reflect_across_plane(normal, on_plane, once);
        assert!((twice - p).length() < 1e-4, "{:?} vs {:?}", twice, p);
    }

    #[test]
    fn test_reflect_zero_normal_is_noop() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(reflect_across_plane(Vec3::ZERO, Vec3::ZERO, p), p);
    }

    #[test]
    fn test_box_face_normal() {
        let obb = OrientedBox::panel(Vec3::ZERO, Quat::from_yaw(std::f32::consts::PI), 1.0, 1.0);
        assert!((obb.face_normal() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }
}
