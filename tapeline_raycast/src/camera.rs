// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-ray construction: unproject a 2D tap into a world-space [`Ray`].
//!
//! Screen coordinates use [`kurbo`] types and the usual convention of the
//! origin at the top-left with +Y down, in logical pixels. The camera is a
//! pinhole looking down its local -Z axis with +Y up, which matches the
//! conventions of the mobile AR stacks this crate fronts.
//!
//! ```
//! use kurbo::Point;
//! use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
//! use tapeline_raycast::camera::{Camera, Viewport};
//!
//! // A camera 1.6 m up, pitched straight down at the floor.
//! let pose = Isometry3::from_parts(
//!     Translation3::new(0.0, 1.6, 0.0),
//!     UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -core::f64::consts::FRAC_PI_2),
//! );
//! let camera = Camera::new(pose, 60_f64.to_radians());
//! let viewport = Viewport::new(390.0, 844.0);
//!
//! // A tap at the center of the screen travels along the camera's forward axis.
//! let ray = camera.screen_ray(&viewport, Point::new(195.0, 422.0)).unwrap();
//! assert!((ray.direction.as_ref() - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-9);
//! assert!((ray.origin - Point3::new(0.0, 1.6, 0.0)).norm() < 1e-12);
//! ```

use core::f64::consts::PI;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size};
use nalgebra::{Isometry3, Point3, Unit, Vector3};

use crate::Ray;

/// The screen region taps are reported in, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width and height of the viewport.
    pub size: Size,
}

impl Viewport {
    /// Create a viewport of the given size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
        }
    }

    /// Whether `pt` lies inside the viewport (edges inclusive).
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= 0.0 && pt.x <= self.size.width && pt.y >= 0.0 && pt.y <= self.size.height
    }
}

/// A pinhole camera pose plus vertical field of view.
///
/// The pose maps camera-local coordinates to world coordinates. The camera
/// looks down its local -Z axis; `vfov` is the full vertical field of view
/// in radians.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World-from-camera transform.
    pub pose: Isometry3<f64>,
    /// Full vertical field of view in radians, in `(0, π)`.
    pub vfov: f64,
}

impl Camera {
    /// Create a camera from a pose and vertical field of view.
    pub const fn new(pose: Isometry3<f64>, vfov: f64) -> Self {
        Self { pose, vfov }
    }

    /// The camera position in world space.
    pub fn position(&self) -> Point3<f64> {
        self.pose * Point3::origin()
    }

    /// The camera's forward axis (local -Z) in world space.
    pub fn forward(&self) -> Unit<Vector3<f64>> {
        self.pose * -Vector3::z_axis()
    }

    /// Unproject a tap into a world-space ray through the camera.
    ///
    /// Returns `None` when the tap lies outside the viewport, when the
    /// viewport is degenerate, or when the field of view is not in `(0, π)`.
    pub fn screen_ray(&self, viewport: &Viewport, tap: Point) -> Option<Ray> {
        if !viewport.contains(tap) {
            return None;
        }
        let Size { width, height } = viewport.size;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        if !self.vfov.is_finite() || self.vfov <= 0.0 || self.vfov >= PI {
            return None;
        }

        // Normalized device coordinates: x right, y up, both in [-1, 1].
        let ndc_x = 2.0 * tap.x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * tap.y / height;

        let tan_half = (self.vfov * 0.5).tan();
        let aspect = width / height;
        let local = Vector3::new(ndc_x * aspect * tan_half, ndc_y * tan_half, -1.0);
        Ray::new(self.position(), self.pose.transform_vector(&local))
    }
}
