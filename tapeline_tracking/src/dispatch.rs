// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch helper: apply an event batch and notify a registered handler.
//!
//! Hosts typically drain their platform's callback queue once per frame
//! into a batch of [`TrackingEvent`]s, then hand the batch to [`dispatch`].
//! Each event is applied to the registry first, so handler hooks always
//! observe the post-event world model; a handler reading
//! [`SurfaceRegistry::has_surfaces`] inside `surface_added` sees the new
//! surface included.
//!
//! Application is strict and ordered: the first event that fails stops the
//! walk, and the returned [`DispatchError`] reports where and why. Events
//! after the failure are not applied.
//!
//! ```
//! use nalgebra::Point3;
//! use tapeline_raycast::{PlaneExtent, TrackedPlane};
//! use tapeline_tracking::dispatch::{TrackingHandler, dispatch};
//! use tapeline_tracking::{SurfaceId, SurfaceRegistry, TrackingEvent, TrackingState};
//!
//! #[derive(Default)]
//! struct Counter {
//!     added: usize,
//! }
//!
//! impl TrackingHandler for Counter {
//!     fn surface_added(&mut self, _id: SurfaceId, _plane: &TrackedPlane) {
//!         self.added += 1;
//!     }
//! }
//!
//! let mut registry = SurfaceRegistry::new();
//! let mut counter = Counter::default();
//! let floor = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
//!
//! dispatch(
//!     &[
//!         TrackingEvent::TrackingChanged(TrackingState::Normal),
//!         TrackingEvent::SurfaceAdded { id: SurfaceId(1), plane: floor },
//!     ],
//!     &mut registry,
//!     &mut counter,
//! )
//! .unwrap();
//!
//! assert_eq!(counter.added, 1);
//! ```

use tapeline_raycast::TrackedPlane;
use thiserror::Error;

use crate::registry::{Applied, ApplyError, SurfaceRegistry};
use crate::{SurfaceId, TrackingEvent, TrackingState};

/// Host-registered observer of applied tracking events.
///
/// All hooks default to no-ops; implement only what the host reacts to
/// (status labels, surface overlays, haptics, ...).
pub trait TrackingHandler {
    /// Camera tracking quality changed.
    fn tracking_changed(&mut self, _previous: TrackingState, _current: TrackingState) {}

    /// A surface was added; `plane` is its registered geometry.
    fn surface_added(&mut self, _id: SurfaceId, _plane: &TrackedPlane) {}

    /// A surface was refined; `plane` is the replacement geometry.
    fn surface_updated(&mut self, _id: SurfaceId, _plane: &TrackedPlane) {}

    /// A surface is no longer tracked.
    fn surface_removed(&mut self, _id: SurfaceId) {}
}

/// An event in a batch failed to apply.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("event {index} could not be applied: {source}")]
pub struct DispatchError {
    /// Index of the failing event within the batch.
    pub index: usize,
    /// The underlying application failure.
    #[source]
    pub source: ApplyError,
}

/// Apply a batch of events in order, notifying `handler` after each one.
///
/// Stops at the first event the registry rejects; earlier events remain
/// applied, later events are untouched.
pub fn dispatch<H: TrackingHandler>(
    events: &[TrackingEvent],
    registry: &mut SurfaceRegistry,
    handler: &mut H,
) -> Result<(), DispatchError> {
    for (index, event) in events.iter().enumerate() {
        let applied = registry
            .apply(event)
            .map_err(|source| DispatchError { index, source })?;
        match applied {
            Applied::TrackingChanged { previous, current } => {
                handler.tracking_changed(previous, current);
            }
            Applied::SurfaceAdded(id) => {
                if let Some(plane) = registry.get(id) {
                    handler.surface_added(id, plane);
                }
            }
            Applied::SurfaceUpdated(id) => {
                if let Some(plane) = registry.get(id) {
                    handler.surface_updated(id, plane);
                }
            }
            Applied::SurfaceRemoved(id) => handler.surface_removed(id),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LimitedReason;
    use nalgebra::Point3;
    use tapeline_raycast::PlaneExtent;

    extern crate alloc;
    use alloc::vec::Vec;

    fn plane_at(y: f64) -> TrackedPlane {
        TrackedPlane::horizontal(Point3::new(0.0, y, 0.0), PlaneExtent::new(4.0, 4.0))
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<&'static str>,
        last_tracking: Option<(TrackingState, TrackingState)>,
    }

    impl TrackingHandler for Recorder {
        fn tracking_changed(&mut self, previous: TrackingState, current: TrackingState) {
            self.seen.push("tracking");
            self.last_tracking = Some((previous, current));
        }

        fn surface_added(&mut self, _id: SurfaceId, _plane: &TrackedPlane) {
            self.seen.push("added");
        }

        fn surface_updated(&mut self, _id: SurfaceId, _plane: &TrackedPlane) {
            self.seen.push("updated");
        }

        fn surface_removed(&mut self, _id: SurfaceId) {
            self.seen.push("removed");
        }
    }

    #[test]
    fn handler_sees_events_in_order() {
        let mut registry = SurfaceRegistry::new();
        let mut recorder = Recorder::default();
        let id = SurfaceId(1);

        dispatch(
            &[
                TrackingEvent::TrackingChanged(TrackingState::Limited(
                    LimitedReason::Initializing,
                )),
                TrackingEvent::TrackingChanged(TrackingState::Normal),
                TrackingEvent::SurfaceAdded {
                    id,
                    plane: plane_at(0.0),
                },
                TrackingEvent::SurfaceUpdated {
                    id,
                    plane: plane_at(0.1),
                },
                TrackingEvent::SurfaceRemoved { id },
            ],
            &mut registry,
            &mut recorder,
        )
        .unwrap();

        assert_eq!(
            recorder.seen,
            ["tracking", "tracking", "added", "updated", "removed"]
        );
        assert_eq!(
            recorder.last_tracking,
            Some((
                TrackingState::Limited(LimitedReason::Initializing),
                TrackingState::Normal
            ))
        );
    }

    #[test]
    fn dispatch_stops_at_first_failure() {
        let mut registry = SurfaceRegistry::new();
        let mut recorder = Recorder::default();
        let id = SurfaceId(1);

        let err = dispatch(
            &[
                TrackingEvent::SurfaceAdded {
                    id,
                    plane: plane_at(0.0),
                },
                // Unknown surface: rejected.
                TrackingEvent::SurfaceRemoved { id: SurfaceId(99) },
                // Never applied.
                TrackingEvent::SurfaceRemoved { id },
            ],
            &mut registry,
            &mut recorder,
        )
        .unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.source, ApplyError::UnknownSurface(SurfaceId(99)));
        assert_eq!(recorder.seen, ["added"]);
        // The surface from the first event is still tracked.
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn handler_observes_post_event_registry() {
        struct Checker<'a> {
            count_at_add: &'a mut usize,
        }

        impl TrackingHandler for Checker<'_> {
            fn surface_added(&mut self, _id: SurfaceId, _plane: &TrackedPlane) {
                *self.count_at_add += 1;
            }
        }

        let mut registry = SurfaceRegistry::new();
        let mut count = 0;
        dispatch(
            &[TrackingEvent::SurfaceAdded {
                id: SurfaceId(1),
                plane: plane_at(0.0),
            }],
            &mut registry,
            &mut Checker {
                count_at_add: &mut count,
            },
        )
        .unwrap();
        assert_eq!(count, 1);
    }
}
