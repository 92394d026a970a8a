// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry-level ray casting against tracked surfaces.
//!
//! This crate provides small, reusable primitives for resolving a viewing
//! ray against the planar surfaces a tracking system has detected, built on
//! top of [`nalgebra`]. It is intentionally decoupled from any particular
//! surface registry or session logic.
//!
//! # Typical usage
//!
//! - Unproject a 2D tap into a world-space [`Ray`] with
//!   [`camera::Camera::screen_ray`] (or build the ray yourself from your
//!   platform's camera).
//! - Call [`RayHitTest::hit_test_ray`] on each candidate surface, or hand an
//!   iterator of `(key, surface)` pairs to [`nearest_hit`] and let it pick
//!   the winner.
//! - Use the returned [`RayHit`] for *placement and ranking*. Lower distance
//!   is nearer; anything richer (surface ids, session state) belongs to the
//!   caller's structures.
//!
//! "No surface under the tap" is an ordinary `None`, not an error.
//!
//! # Key types
//!
//! - [`Ray`] – origin plus unit direction, world space, meters.
//! - [`TrackedPlane`] – a detected planar surface: a local frame whose +Y
//!   axis is the surface normal, with a bounded extent centered on the
//!   frame's origin.
//! - [`RayHitParams`] – per-query parameters such as extent tolerance and a
//!   far cull distance.
//! - [`RayHit`] – a scoring record `{ distance, point, normal }` used for
//!   ranking candidates.
//! - [`RayHitTest`] – a trait implemented by surfaces that can answer "does
//!   this ray hit me, and where?" queries.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

/// Screen-ray construction from a viewport and camera pose.
pub mod camera;

/// Rays whose local direction is closer to the plane than this are treated
/// as parallel and never hit.
const PARALLEL_EPS: f64 = 1e-12;

/// A world-space ray: origin plus unit direction, in meters.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin in world space.
    pub origin: Point3<f64>,
    /// Unit direction of travel.
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// Create a ray from an origin and an (unnormalized) direction.
    ///
    /// Returns `None` when the direction is too short to normalize.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let direction = Unit::try_new(direction, PARALLEL_EPS)?;
        Some(Self { origin, direction })
    }

    /// The point at parameter `t` (meters along the ray).
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.as_ref() * t
    }
}

/// Extent of a tracked plane in meters, centered on the plane's local origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneExtent {
    /// Size along the plane's local X axis.
    pub width: f64,
    /// Size along the plane's local Z axis.
    pub depth: f64,
}

impl PlaneExtent {
    /// Create an extent from width and depth.
    pub const fn new(width: f64, depth: f64) -> Self {
        Self { width, depth }
    }
}

/// A planar surface reported by a tracking system.
///
/// The plane lives in a local frame: the frame's origin is the plane center,
/// +Y is the surface normal, and the surface occupies
/// `[-width/2, width/2] × [-depth/2, depth/2]` in local X/Z. Tracking
/// systems refine both pose and extent over time, so both fields are plain
/// data the owner may overwrite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPlane {
    /// Local frame of the plane (world-from-local).
    pub pose: Isometry3<f64>,
    /// Bounded extent in the local X/Z plane.
    pub extent: PlaneExtent,
}

impl TrackedPlane {
    /// Create a plane from an explicit pose and extent.
    pub const fn new(pose: Isometry3<f64>, extent: PlaneExtent) -> Self {
        Self { pose, extent }
    }

    /// Create an upward-facing horizontal plane centered at `center`.
    ///
    /// This matches the common case of floors and tabletops detected by
    /// horizontal surface tracking.
    pub fn horizontal(center: Point3<f64>, extent: PlaneExtent) -> Self {
        let pose = Isometry3::from_parts(
            Translation3::new(center.x, center.y, center.z),
            UnitQuaternion::identity(),
        );
        Self { pose, extent }
    }

    /// The plane center in world space.
    pub fn center(&self) -> Point3<f64> {
        self.pose * Point3::origin()
    }

    /// The plane normal in world space.
    pub fn normal(&self) -> Unit<Vector3<f64>> {
        self.pose * Vector3::y_axis()
    }
}

/// Parameters controlling ray hit tests.
#[derive(Clone, Copy, Debug)]
pub struct RayHitParams {
    /// Tolerance in meters added around a plane's extent.
    ///
    /// Taps land imprecisely, and tracked extents lag the real surface, so
    /// hosts typically allow a small margin beyond the reported bounds.
    pub extent_tolerance: f64,
    /// Reject hits farther than this many meters along the ray, if set.
    pub max_distance: Option<f64>,
    /// Treat every plane as unbounded, ignoring its extent.
    ///
    /// Some tracking systems report surfaces without a trustworthy extent;
    /// this keeps those hosts working without inventing bounds.
    pub infinite_extent: bool,
}

impl Default for RayHitParams {
    fn default() -> Self {
        Self {
            extent_tolerance: 0.0,
            max_distance: None,
            infinite_extent: false,
        }
    }
}

/// Result of a successful ray hit.
///
/// Lower distance is considered a better (nearer) hit for tie-breaking.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Distance from the ray origin in meters.
    pub distance: f64,
    /// Hit point in world space.
    pub point: Point3<f64>,
    /// Surface normal at the hit point, oriented toward the ray origin.
    pub normal: Unit<Vector3<f64>>,
}

impl RayHit {
    /// Compare two hits, preferring smaller distance; ties keep original order.
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Trait for ray hit testing against a surface.
///
/// Implementors are free to use any strategy, but should treat
/// [`RayHitParams::extent_tolerance`] as an inclusive margin and report
/// distances in meters along the unit ray.
pub trait RayHitTest {
    /// Cast `ray` against this surface.
    ///
    /// Returns `Some(RayHit)` when the ray strikes the surface in front of
    /// its origin.
    fn hit_test_ray(&self, ray: &Ray, params: &RayHitParams) -> Option<RayHit>;
}

impl<T: RayHitTest + ?Sized> RayHitTest for &T {
    fn hit_test_ray(&self, ray: &Ray, params: &RayHitParams) -> Option<RayHit> {
        (**self).hit_test_ray(ray, params)
    }
}

impl RayHitTest for TrackedPlane {
    /// Both faces of the plane are hittable; taps resolve against surfaces
    /// seen edge-on from below as well as from above.
    fn hit_test_ray(&self, ray: &Ray, params: &RayHitParams) -> Option<RayHit> {
        let origin = self.pose.inverse_transform_point(&ray.origin);
        let dir = self.pose.inverse_transform_vector(ray.direction.as_ref());

        if dir.y.abs() < PARALLEL_EPS {
            return None;
        }
        let t = -origin.y / dir.y;
        if t < 0.0 {
            return None;
        }
        if let Some(max) = params.max_distance
            && t > max
        {
            return None;
        }

        let local = origin + dir * t;
        if !params.infinite_extent {
            let half_width = self.extent.width * 0.5 + params.extent_tolerance;
            let half_depth = self.extent.depth * 0.5 + params.extent_tolerance;
            if local.x.abs() > half_width || local.z.abs() > half_depth {
                return None;
            }
        }

        let normal = if origin.y >= 0.0 {
            self.normal()
        } else {
            -self.normal()
        };
        Some(RayHit {
            distance: t,
            point: self.pose.transform_point(&local),
            normal,
        })
    }
}

/// Cast a ray against a collection of keyed surfaces.
///
/// The caller supplies an iterator of `(key, surface)` pairs, where each
/// surface implements [`RayHitTest`]. The returned list preserves the input
/// order; use [`nearest_hit`] when only the winner matters.
pub fn ray_hits<K, S, I>(candidates: I, ray: &Ray, params: &RayHitParams) -> Vec<(K, RayHit)>
where
    S: RayHitTest,
    I: IntoIterator<Item = (K, S)>,
{
    let mut hits = Vec::new();
    for (key, surface) in candidates {
        if let Some(hit) = surface.hit_test_ray(ray, params) {
            hits.push((key, hit));
        }
    }
    hits
}

/// Cast a ray against keyed surfaces and return the nearest hit.
///
/// Equal-distance ties select the last candidate, so callers with a
/// stronger ordering can pre-sort their input.
pub fn nearest_hit<K, S, I>(candidates: I, ray: &Ray, params: &RayHitParams) -> Option<(K, RayHit)>
where
    S: RayHitTest,
    I: IntoIterator<Item = (K, S)>,
{
    let mut best: Option<(K, RayHit)> = None;
    for (key, surface) in candidates {
        if let Some(hit) = surface.hit_test_ray(ray, params) {
            let nearer = match &best {
                None => true,
                Some((_, b)) => hit.cmp_distance(b) != Ordering::Greater,
            };
            if nearer {
                best = Some((key, hit));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn down_ray(origin: Point3<f64>) -> Ray {
        Ray::new(origin, Vector3::new(0.0, -1.0, 0.0)).unwrap()
    }

    #[test]
    fn straight_down_hit() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
        let hit = plane
            .hit_test_ray(&down_ray(Point3::new(0.0, 2.0, 0.0)), &RayHitParams::default())
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-12, "distance along the ray");
        assert!((hit.point - Point3::origin()).norm() < 1e-12, "hit at plane center");
        assert!((hit.normal.as_ref() - Vector3::y()).norm() < 1e-12, "normal faces the ray");
    }

    #[test]
    fn hit_from_below_reports_flipped_normal() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
        let ray = Ray::new(Point3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        let hit = plane.hit_test_ray(&ray, &RayHitParams::default()).unwrap();
        assert!(
            (hit.normal.as_ref() + Vector3::y()).norm() < 1e-12,
            "underside hit faces back at the origin"
        );
    }

    #[test]
    fn miss_outside_extent() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(1.0, 1.0));
        let ray = down_ray(Point3::new(0.8, 2.0, 0.0));
        assert!(plane.hit_test_ray(&ray, &RayHitParams::default()).is_none());
    }

    #[test]
    fn extent_tolerance_admits_near_edge_hit() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(1.0, 1.0));
        let ray = down_ray(Point3::new(0.8, 2.0, 0.0));
        let params = RayHitParams {
            extent_tolerance: 0.5,
            ..RayHitParams::default()
        };
        assert!(plane.hit_test_ray(&ray, &params).is_some());
    }

    #[test]
    fn infinite_extent_ignores_bounds() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(0.1, 0.1));
        let ray = down_ray(Point3::new(25.0, 2.0, -40.0));
        let params = RayHitParams {
            infinite_extent: true,
            ..RayHitParams::default()
        };
        let hit = plane.hit_test_ray(&ray, &params).unwrap();
        assert!((hit.point.x - 25.0).abs() < 1e-12);
    }

    #[test]
    fn max_distance_culls_far_hit() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
        let ray = down_ray(Point3::new(0.0, 5.0, 0.0));
        let params = RayHitParams {
            max_distance: Some(3.0),
            ..RayHitParams::default()
        };
        assert!(plane.hit_test_ray(&ray, &params).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(plane.hit_test_ray(&ray, &RayHitParams::default()).is_none());
    }

    #[test]
    fn plane_behind_origin_misses() {
        let plane = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
        let ray = Ray::new(Point3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(plane.hit_test_ray(&ray, &RayHitParams::default()).is_none());
    }

    #[test]
    fn tilted_plane_hit() {
        // Vertical wall one meter ahead of the origin, normal facing +Z.
        let pose = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, -1.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
        );
        let wall = TrackedPlane::new(pose, PlaneExtent::new(2.0, 2.0));
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        let hit = wall.hit_test_ray(&ray, &RayHitParams::default()).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-12);
        assert!((hit.point - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn degenerate_ray_direction_rejected() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn point_at_walks_the_ray() {
        let ray = down_ray(Point3::new(1.0, 3.0, 0.0));
        let p = ray.point_at(2.0);
        assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn nearest_hit_prefers_closer_plane() {
        let high = TrackedPlane::horizontal(Point3::new(0.0, 1.0, 0.0), PlaneExtent::new(4.0, 4.0));
        let low = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(4.0, 4.0));
        let ray = down_ray(Point3::new(0.0, 3.0, 0.0));
        let (key, hit) = nearest_hit(
            [("low", low), ("high", high)],
            &ray,
            &RayHitParams::default(),
        )
        .unwrap();
        assert_eq!(key, "high", "the higher plane is nearer the camera");
        assert!((hit.distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn ray_hits_preserves_input_order() {
        let a = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(4.0, 4.0));
        let b = TrackedPlane::horizontal(Point3::new(0.0, 1.0, 0.0), PlaneExtent::new(4.0, 4.0));
        let ray = down_ray(Point3::new(0.0, 3.0, 0.0));
        let hits = ray_hits([(1_u32, a), (2_u32, b)], &ray, &RayHitParams::default());
        let keys: Vec<u32> = hits.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [1, 2]);
    }

    #[test]
    fn no_candidates_no_hit() {
        let ray = down_ray(Point3::new(0.0, 1.0, 0.0));
        let hit = nearest_hit(
            core::iter::empty::<(u32, TrackedPlane)>(),
            &ray,
            &RayHitParams::default(),
        );
        assert!(hit.is_none());
    }
}
