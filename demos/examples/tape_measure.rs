// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tap-to-measure walkthrough with a simulated tracking feed.
//!
//! This example wires the Tapeline crates together the way a host app
//! would:
//! - `tapeline_tracking` consumes a scripted batch of tracker events,
//! - `tapeline_raycast` unprojects taps and resolves them against the
//!   tracked surfaces,
//! - `tapeline_session` holds the two marked points,
//! - `tapeline_scene` turns each transition into renderer ops and status
//!   text, which this demo simply prints.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p tapeline_demos --example tape_measure`

use kurbo::Point;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use tapeline_raycast::camera::{Camera, Viewport};
use tapeline_raycast::{PlaneExtent, RayHitParams, TrackedPlane};
use tapeline_scene::{SceneOp, SceneStyle, ops_for_mark, ops_for_reset, status};
use tapeline_session::MeasurementSession;
use tapeline_tracking::dispatch::{TrackingHandler, dispatch};
use tapeline_tracking::{
    LimitedReason, SurfaceId, SurfaceRegistry, TrackingEvent, TrackingState,
};

/// Prints tracker activity the way a host would update its labels.
struct TrackerConsole;

impl TrackingHandler for TrackerConsole {
    fn tracking_changed(&mut self, _previous: TrackingState, current: TrackingState) {
        println!("[tracker] {}", current.description().replace('\n', " - "));
    }

    fn surface_added(&mut self, id: SurfaceId, plane: &TrackedPlane) {
        let c = plane.center();
        println!(
            "[tracker] surface {id} added, center ({:.2}, {:.2}, {:.2}), extent {:.1}x{:.1} m",
            c.x, c.y, c.z, plane.extent.width, plane.extent.depth
        );
    }

    fn surface_updated(&mut self, id: SurfaceId, plane: &TrackedPlane) {
        println!(
            "[tracker] surface {id} refined, extent {:.1}x{:.1} m",
            plane.extent.width, plane.extent.depth
        );
    }

    fn surface_removed(&mut self, id: SurfaceId) {
        println!("[tracker] surface {id} removed");
    }
}

fn apply_ops(ops: &[SceneOp], style: &SceneStyle) {
    for op in ops {
        match op {
            SceneOp::PlaceMarker { role, at } => {
                let marker = style.marker(*role);
                println!(
                    "[scene] place {role:?} marker (r {:.3} m) at ({:.3}, {:.3}, {:.3})",
                    marker.radius, at.x, at.y, at.z
                );
            }
            SceneOp::RemoveMarker { role } => println!("[scene] remove {role:?} marker"),
            SceneOp::DrawSegment { length, .. } => {
                println!("[scene] draw segment, {length:.3} m long");
            }
            SceneOp::RemoveSegment => println!("[scene] remove segment"),
            SceneOp::Clear => println!("[scene] clear"),
        }
    }
}

fn main() {
    env_logger::init();

    let mut registry = SurfaceRegistry::new();
    let mut console = TrackerConsole;

    // A tracker warming up, then finding the floor and a small tabletop.
    let floor = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
    let table = TrackedPlane::horizontal(Point3::new(0.0, 0.4, -0.6), PlaneExtent::new(0.6, 0.6));
    dispatch(
        &[
            TrackingEvent::TrackingChanged(TrackingState::Limited(LimitedReason::Initializing)),
            TrackingEvent::TrackingChanged(TrackingState::Normal),
            TrackingEvent::SurfaceAdded {
                id: SurfaceId(1),
                plane: floor,
            },
            TrackingEvent::SurfaceAdded {
                id: SurfaceId(2),
                plane: table,
            },
            TrackingEvent::SurfaceUpdated {
                id: SurfaceId(1),
                plane: TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(3.0, 3.0)),
            },
        ],
        &mut registry,
        &mut console,
    )
    .expect("scripted events apply in order");
    log::info!("tracker feed applied, {} surfaces live", registry.surface_count());

    // A phone held 1.6 m up, pitched straight down at the floor.
    let camera = Camera::new(
        Isometry3::from_parts(
            Translation3::new(0.0, 1.6, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -std::f64::consts::FRAC_PI_2),
        ),
        60_f64.to_radians(),
    );
    let viewport = Viewport::new(390.0, 844.0);
    let params = RayHitParams::default();
    let style = SceneStyle::default();

    let mut session = MeasurementSession::new();

    // Center tap, a tap to the right, then a replacement tap to the left.
    let taps = [
        Point::new(195.0, 422.0),
        Point::new(330.0, 422.0),
        Point::new(100.0, 422.0),
    ];

    for tap in taps {
        println!("\n== tap at ({:.0}, {:.0}) ==", tap.x, tap.y);
        let Some(ray) = camera.screen_ray(&viewport, tap) else {
            println!("tap outside the viewport");
            continue;
        };
        match registry.resolve_tap(&ray, &params) {
            None => println!("no surface under the tap"),
            Some((surface, hit)) => {
                println!("resolved on surface {surface}, {:.3} m from the camera", hit.distance);
                let prior = session.phase();
                let result = session.mark(hit.point);
                apply_ops(&ops_for_mark(&prior, hit.point, &result), &style);
                if let Some(line) = status(&session.phase(), registry.has_surfaces()) {
                    println!("[status] {line}");
                }
            }
        }
    }

    println!("\n== reset ==");
    session.reset();
    apply_ops(&ops_for_reset(), &style);
    if let Some(line) = status(&session.phase(), registry.has_surfaces()) {
        println!("[status] {line}");
    }
}
