// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer-facing display data for a tap-to-measure session.
//!
//! The measurement core never touches a scene graph. This crate derives
//! what an external renderer should do — place and remove markers, draw the
//! connecting segment, update the status line — from session transitions,
//! as plain data:
//!
//! - [`SceneStyle`] is a passed-in configuration record (marker colors and
//!   sizes, segment thickness, surface-overlay tint). It is a value, not
//!   process-wide state; hosts construct one and hand it to their renderer.
//! - [`SceneOp`] is a batched change: the ops for one mark or reset are
//!   returned together so the renderer applies them atomically.
//! - [`status`] produces the status line the original tool showed: a
//!   prompt while marking, the distance once complete, and nothing at all
//!   until a surface is tracked.
//!
//! ```
//! use nalgebra::Point3;
//! use tapeline_scene::{MarkerRole, SceneOp, ops_for_mark};
//! use tapeline_session::MeasurementSession;
//!
//! let mut session = MeasurementSession::new();
//! let prior = session.phase();
//! let point = Point3::origin();
//! let result = session.mark(point);
//!
//! let ops = ops_for_mark(&prior, point, &result);
//! assert_eq!(
//!     ops.as_slice(),
//!     [SceneOp::PlaceMarker { role: MarkerRole::Start, at: point }]
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::format;
use alloc::string::String;

use nalgebra::Point3;
use smallvec::SmallVec;
use tapeline_session::{MarkResult, Phase};

/// A straight-alpha RGBA color, components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Rgba {
    /// Create a color from all four components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color.
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// This color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Which measurement marker an op refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerRole {
    /// The first marked point.
    Start,
    /// The second marked point.
    End,
}

/// Appearance of a point marker (rendered as a small sphere).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    /// Marker color.
    pub color: Rgba,
    /// Sphere radius in meters.
    pub radius: f64,
}

/// Appearance of the connecting segment (rendered as a thin capsule).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentStyle {
    /// Segment color.
    pub color: Rgba,
    /// Capsule radius in meters.
    pub radius: f64,
}

/// Appearance of detected-surface overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    /// Overlay fill color; alpha keeps the camera image visible beneath.
    pub color: Rgba,
}

bitflags::bitflags! {
    /// Optional diagnostic overlays the renderer may draw.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DebugOverlays: u8 {
        /// Render the raw feature points the tracker is locking onto.
        const FEATURE_POINTS    = 0b0000_0001;
        /// Render translucent overlays on detected surfaces.
        const SURFACE_OVERLAYS  = 0b0000_0010;
    }
}

impl Default for DebugOverlays {
    fn default() -> Self {
        Self::FEATURE_POINTS | Self::SURFACE_OVERLAYS
    }
}

/// Style configuration for the whole measurement scene.
///
/// Defaults reproduce the original tool's look: blue start marker, green
/// end marker, red segment, 1 cm marker spheres, 4 mm segment capsule, and
/// a translucent blue tint on detected surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneStyle {
    /// Start-marker appearance.
    pub start_marker: MarkerStyle,
    /// End-marker appearance.
    pub end_marker: MarkerStyle,
    /// Connecting-segment appearance.
    pub segment: SegmentStyle,
    /// Detected-surface overlay appearance.
    pub surface_overlay: OverlayStyle,
    /// Which diagnostic overlays to draw.
    pub debug: DebugOverlays,
}

impl SceneStyle {
    /// The marker style for `role`.
    pub fn marker(&self, role: MarkerRole) -> &MarkerStyle {
        match role {
            MarkerRole::Start => &self.start_marker,
            MarkerRole::End => &self.end_marker,
        }
    }
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            start_marker: MarkerStyle {
                color: Rgba::opaque(0.0, 0.0, 1.0),
                radius: 0.01,
            },
            end_marker: MarkerStyle {
                color: Rgba::opaque(0.0, 1.0, 0.0),
                radius: 0.01,
            },
            segment: SegmentStyle {
                color: Rgba::opaque(1.0, 0.0, 0.0),
                radius: 0.004,
            },
            surface_overlay: OverlayStyle {
                color: Rgba::new(0.1, 0.5, 0.8, 0.1),
            },
            debug: DebugOverlays::default(),
        }
    }
}

/// One renderer-facing change. Positions are world-space meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneOp {
    /// Place (or move) the marker for `role` at `at`.
    PlaceMarker {
        /// Which marker to place.
        role: MarkerRole,
        /// World position of the marker.
        at: Point3<f64>,
    },
    /// Remove the marker for `role`, if present.
    RemoveMarker {
        /// Which marker to remove.
        role: MarkerRole,
    },
    /// Draw the segment connecting the two markers.
    DrawSegment {
        /// Segment start, world space.
        from: Point3<f64>,
        /// Segment end, world space.
        to: Point3<f64>,
        /// Segment length in meters (the measured distance).
        length: f64,
    },
    /// Remove the segment, if present.
    RemoveSegment,
    /// Remove all measurement visuals.
    Clear,
}

/// Ops batched for a single mark or reset.
pub type SceneOps = SmallVec<[SceneOp; 4]>;

/// Derive the renderer ops for one `mark` call.
///
/// `prior` is the session phase before the mark, `marked` the point that
/// was passed to it, and `result` what the session returned. When a mark
/// lands on a completed session, the stale endpoint marker and segment are
/// removed before the replacements are placed — only the endpoint is
/// discarded, never the start.
pub fn ops_for_mark(prior: &Phase, marked: Point3<f64>, result: &MarkResult) -> SceneOps {
    let mut ops = SceneOps::new();
    if matches!(prior, Phase::Completed(_)) {
        ops.push(SceneOp::RemoveMarker {
            role: MarkerRole::End,
        });
        ops.push(SceneOp::RemoveSegment);
    }
    match result {
        MarkResult::AwaitingEnd => ops.push(SceneOp::PlaceMarker {
            role: MarkerRole::Start,
            at: marked,
        }),
        MarkResult::Completed(m) => {
            ops.push(SceneOp::PlaceMarker {
                role: MarkerRole::End,
                at: m.end,
            });
            ops.push(SceneOp::DrawSegment {
                from: m.start,
                to: m.end,
                length: m.distance,
            });
        }
    }
    ops
}

/// Derive the renderer ops for a session reset.
pub fn ops_for_reset() -> SceneOps {
    let mut ops = SceneOps::new();
    ops.push(SceneOp::Clear);
    ops
}

/// The instruction prompt for an in-progress measurement.
///
/// Returns `None` once the measurement is complete; the status line then
/// shows the distance instead.
pub const fn prompt(phase: &Phase) -> Option<&'static str> {
    match phase {
        Phase::Empty => Some("Tap a start point"),
        Phase::AwaitingEnd => Some("Tap an end point"),
        Phase::Completed(_) => None,
    }
}

/// Format a distance for the status line, e.g. `Distance: 1.23 [m]`.
pub fn distance_label(meters: f64) -> String {
    format!("Distance: {meters:.2} [m]")
}

/// The status line for the current phase, or `None` while it is hidden.
///
/// The line stays hidden until the tracker reports at least one surface;
/// prompting for taps that cannot resolve anywhere would mislead.
pub fn status(phase: &Phase, surfaces_tracked: bool) -> Option<String> {
    if !surfaces_tracked {
        return None;
    }
    Some(match phase {
        Phase::Completed(m) => distance_label(m.distance),
        other => String::from(prompt(other).unwrap_or_default()),
    })
}
