// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-point measurement session state machine.
//!
//! This crate tracks zero, one, or two marked 3D points and derives the
//! straight-line distance between them when two are present. It is the only
//! stateful piece of a tap-to-measure tool; everything around it — surface
//! tracking, hit resolution, rendering — feeds it resolved points and reacts
//! to the results it returns.
//!
//! ## Usage
//!
//! Marking a fresh session arms it; marking again completes a measurement:
//!
//! ```
//! use nalgebra::Point3;
//! use tapeline_session::{MarkResult, MeasurementSession};
//!
//! let mut session = MeasurementSession::new();
//!
//! assert!(matches!(
//!     session.mark(Point3::origin()),
//!     MarkResult::AwaitingEnd
//! ));
//!
//! match session.mark(Point3::new(3.0, 4.0, 0.0)) {
//!     MarkResult::Completed(m) => assert_eq!(m.distance, 5.0),
//!     MarkResult::AwaitingEnd => unreachable!(),
//! }
//! ```
//!
//! A third mark replaces only the endpoint; the start stays put until
//! [`MeasurementSession::reset`]:
//!
//! ```
//! # use nalgebra::Point3;
//! # use tapeline_session::{MarkResult, MeasurementSession};
//! # let mut session = MeasurementSession::new();
//! # session.mark(Point3::origin());
//! # session.mark(Point3::new(3.0, 4.0, 0.0));
//! match session.mark(Point3::new(0.0, 0.0, 2.0)) {
//!     MarkResult::Completed(m) => {
//!         assert_eq!(m.start, Point3::origin());
//!         assert_eq!(m.end, Point3::new(0.0, 0.0, 2.0));
//!     }
//!     MarkResult::AwaitingEnd => unreachable!(),
//! }
//! ```
//!
//! ## Contract
//!
//! Points handed to [`MeasurementSession::mark`] are assumed to be already
//! resolved from a valid surface hit and finite; "no surface under the tap"
//! is handled by simply not calling `mark`. The operation is total over
//! finite input — there are no error results and no external side effects.
//!
//! The session holds no external resources and has no suspension points.
//! It is a plain value owned by one interactive controller; callers that
//! receive input from background tracking threads are responsible for
//! marshaling onto the owning thread before touching the session.
//!
//! All coordinates are world-space meters.

#![no_std]

use nalgebra::{Point3, Unit, Vector3};

/// A completed two-point measurement.
///
/// Produced only when both points are present. Distances are Euclidean
/// norms in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// First marked point.
    pub start: Point3<f64>,
    /// Second marked point.
    pub end: Point3<f64>,
    /// Straight-line distance from `start` to `end` in meters.
    pub distance: f64,
}

impl Measurement {
    fn between(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self {
            start,
            end,
            distance: (end - start).norm(),
        }
    }

    /// The vector from start to end (not normalized).
    pub fn delta(&self) -> Vector3<f64> {
        self.end - self.start
    }

    /// The normalized direction from start to end.
    ///
    /// Returns `None` for a zero-length measurement.
    pub fn direction(&self) -> Option<Unit<Vector3<f64>>> {
        Unit::try_new(self.delta(), 1e-12)
    }

    /// The point halfway between start and end.
    ///
    /// Useful for placing a distance label on the segment.
    pub fn midpoint(&self) -> Point3<f64> {
        Point3::from((self.start.coords + self.end.coords) * 0.5)
    }
}

/// Outcome of [`MeasurementSession::mark`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkResult {
    /// The point was stored as the start; prompt for an end point.
    AwaitingEnd,
    /// Both points are present; the measurement is complete.
    Completed(Measurement),
}

/// Current state of a session, as reported by [`MeasurementSession::phase`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// No point marked yet.
    Empty,
    /// The start is marked; waiting for the end point.
    AwaitingEnd,
    /// Both points are marked.
    Completed(Measurement),
}

/// The marked-point pair. `End`-without-`Start` is unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Marked {
    Empty,
    Start(Point3<f64>),
    Pair(Point3<f64>, Point3<f64>),
}

/// Interaction state machine for a two-point measurement.
///
/// States progress `Empty → AwaitingEnd → Completed`; a further mark while
/// completed replaces the endpoint only, and [`MeasurementSession::reset`]
/// returns to `Empty` from any state. There is no terminal state — the
/// session is reused indefinitely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementSession {
    marked: Marked,
}

impl MeasurementSession {
    /// Create an empty session.
    pub const fn new() -> Self {
        Self {
            marked: Marked::Empty,
        }
    }

    /// Mark a resolved world point.
    ///
    /// - Empty session: the point becomes the start.
    /// - Start only: the point becomes the end and the distance is computed.
    /// - Both present: the previous end is discarded and the point becomes
    ///   the new end, measured against the unchanged start. Any visuals for
    ///   the discarded endpoint are the caller's to remove.
    pub fn mark(&mut self, point: Point3<f64>) -> MarkResult {
        let start = match self.marked {
            Marked::Empty => {
                self.marked = Marked::Start(point);
                return MarkResult::AwaitingEnd;
            }
            Marked::Start(start) | Marked::Pair(start, _) => start,
        };
        self.marked = Marked::Pair(start, point);
        let measurement = Measurement::between(start, point);
        log::debug!("measured distance {:.3} m", measurement.distance);
        MarkResult::Completed(measurement)
    }

    /// Clear both points. Idempotent.
    pub fn reset(&mut self) {
        self.marked = Marked::Empty;
    }

    /// The current phase, for driving prompts and rendering.
    pub fn phase(&self) -> Phase {
        match self.marked {
            Marked::Empty => Phase::Empty,
            Marked::Start(_) => Phase::AwaitingEnd,
            Marked::Pair(start, end) => Phase::Completed(Measurement::between(start, end)),
        }
    }

    /// The first marked point, if any.
    pub fn start(&self) -> Option<Point3<f64>> {
        match self.marked {
            Marked::Empty => None,
            Marked::Start(start) | Marked::Pair(start, _) => Some(start),
        }
    }

    /// The second marked point, if any.
    pub fn end(&self) -> Option<Point3<f64>> {
        match self.marked {
            Marked::Pair(_, end) => Some(end),
            _ => None,
        }
    }

    /// The completed measurement, if both points are marked.
    pub fn measurement(&self) -> Option<Measurement> {
        match self.phase() {
            Phase::Completed(m) => Some(m),
            _ => None,
        }
    }

    /// Whether no point has been marked.
    pub fn is_empty(&self) -> bool {
        self.marked == Marked::Empty
    }
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new()
    }
}
