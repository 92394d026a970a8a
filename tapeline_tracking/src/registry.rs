// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of currently tracked surfaces.

use hashbrown::HashMap;
use tapeline_raycast::{Ray, RayHit, RayHitParams, TrackedPlane, nearest_hit};
use thiserror::Error;

use crate::{SurfaceId, TrackingEvent, TrackingState};

/// Why a [`TrackingEvent`] could not be applied.
///
/// Hosts that feed events in order never see these; a lossy or reordered
/// feed surfaces here instead of leaving the registry silently stale.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// A surface with this id is already tracked.
    #[error("surface {0} was added twice")]
    DuplicateSurface(SurfaceId),
    /// No surface with this id is tracked.
    #[error("surface {0} is not tracked")]
    UnknownSurface(SurfaceId),
}

/// What a successfully applied [`TrackingEvent`] changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Applied {
    /// Tracking quality changed.
    TrackingChanged {
        /// State before the event.
        previous: TrackingState,
        /// State after the event.
        current: TrackingState,
    },
    /// The surface was added to the registry.
    SurfaceAdded(SurfaceId),
    /// The surface's pose/extent was replaced.
    SurfaceUpdated(SurfaceId),
    /// The surface was removed from the registry.
    SurfaceRemoved(SurfaceId),
}

/// Mirror of the tracking system's world model.
///
/// The registry is the single place taps are resolved against: every
/// surface it holds is live, and anything it no longer holds cannot be hit.
/// It is owned by the host's interactive controller and mutated only by
/// [`SurfaceRegistry::apply`]; like the session, it expects external
/// serialization rather than concurrent mutation.
#[derive(Clone, Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, TrackedPlane>,
    tracking: TrackingState,
}

impl SurfaceRegistry {
    /// Create an empty registry with tracking not yet available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current camera tracking quality.
    pub fn tracking(&self) -> TrackingState {
        self.tracking
    }

    /// Number of tracked surfaces.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether any surface is tracked.
    ///
    /// Drives status visibility: there is nothing to measure, and nothing
    /// to say, until at least one surface exists.
    pub fn has_surfaces(&self) -> bool {
        !self.surfaces.is_empty()
    }

    /// The tracked plane for `id`, if present.
    pub fn get(&self, id: SurfaceId) -> Option<&TrackedPlane> {
        self.surfaces.get(&id)
    }

    /// Iterate over tracked surfaces in arbitrary order.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceId, &TrackedPlane)> {
        self.surfaces.iter().map(|(id, plane)| (*id, plane))
    }

    /// Apply one tracking event, keeping the mirror consistent.
    pub fn apply(&mut self, event: &TrackingEvent) -> Result<Applied, ApplyError> {
        match event {
            TrackingEvent::TrackingChanged(state) => {
                let previous = self.tracking;
                self.tracking = *state;
                log::debug!("tracking state: {state}");
                Ok(Applied::TrackingChanged {
                    previous,
                    current: *state,
                })
            }
            TrackingEvent::SurfaceAdded { id, plane } => {
                if self.surfaces.contains_key(id) {
                    return Err(ApplyError::DuplicateSurface(*id));
                }
                self.surfaces.insert(*id, *plane);
                log::trace!("surface {id} added");
                Ok(Applied::SurfaceAdded(*id))
            }
            TrackingEvent::SurfaceUpdated { id, plane } => {
                if !self.surfaces.contains_key(id) {
                    return Err(ApplyError::UnknownSurface(*id));
                }
                self.surfaces.insert(*id, *plane);
                log::trace!("surface {id} updated");
                Ok(Applied::SurfaceUpdated(*id))
            }
            TrackingEvent::SurfaceRemoved { id } => {
                if self.surfaces.remove(id).is_none() {
                    return Err(ApplyError::UnknownSurface(*id));
                }
                log::trace!("surface {id} removed");
                Ok(Applied::SurfaceRemoved(*id))
            }
        }
    }

    /// Resolve a tap ray against all tracked surfaces.
    ///
    /// Returns the nearest hit, or `None` when no surface lies under the
    /// tap — the caller simply does not mark in that case.
    pub fn resolve_tap(&self, ray: &Ray, params: &RayHitParams) -> Option<(SurfaceId, RayHit)> {
        nearest_hit(self.surfaces(), ray, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use tapeline_raycast::PlaneExtent;

    fn plane_at(y: f64) -> TrackedPlane {
        TrackedPlane::horizontal(Point3::new(0.0, y, 0.0), PlaneExtent::new(4.0, 4.0))
    }

    #[test]
    fn add_update_remove_round_trip() {
        let mut registry = SurfaceRegistry::new();
        let id = SurfaceId(1);

        let applied = registry
            .apply(&TrackingEvent::SurfaceAdded {
                id,
                plane: plane_at(0.0),
            })
            .unwrap();
        assert_eq!(applied, Applied::SurfaceAdded(id));
        assert_eq!(registry.surface_count(), 1);

        let applied = registry
            .apply(&TrackingEvent::SurfaceUpdated {
                id,
                plane: plane_at(0.5),
            })
            .unwrap();
        assert_eq!(applied, Applied::SurfaceUpdated(id));
        let stored = registry.get(id).unwrap();
        assert_eq!(stored.center(), Point3::new(0.0, 0.5, 0.0));

        let applied = registry
            .apply(&TrackingEvent::SurfaceRemoved { id })
            .unwrap();
        assert_eq!(applied, Applied::SurfaceRemoved(id));
        assert!(!registry.has_surfaces());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut registry = SurfaceRegistry::new();
        let id = SurfaceId(1);
        registry
            .apply(&TrackingEvent::SurfaceAdded {
                id,
                plane: plane_at(0.0),
            })
            .unwrap();
        let err = registry
            .apply(&TrackingEvent::SurfaceAdded {
                id,
                plane: plane_at(1.0),
            })
            .unwrap_err();
        assert_eq!(err, ApplyError::DuplicateSurface(id));
        // The original plane is untouched.
        assert_eq!(registry.get(id).unwrap().center(), Point3::origin());
    }

    #[test]
    fn unknown_update_and_remove_are_rejected() {
        let mut registry = SurfaceRegistry::new();
        let id = SurfaceId(9);
        let err = registry
            .apply(&TrackingEvent::SurfaceUpdated {
                id,
                plane: plane_at(0.0),
            })
            .unwrap_err();
        assert_eq!(err, ApplyError::UnknownSurface(id));

        let err = registry
            .apply(&TrackingEvent::SurfaceRemoved { id })
            .unwrap_err();
        assert_eq!(err, ApplyError::UnknownSurface(id));
    }

    #[test]
    fn tracking_change_reports_previous_state() {
        let mut registry = SurfaceRegistry::new();
        let applied = registry
            .apply(&TrackingEvent::TrackingChanged(TrackingState::Normal))
            .unwrap();
        assert_eq!(
            applied,
            Applied::TrackingChanged {
                previous: TrackingState::NotAvailable,
                current: TrackingState::Normal,
            }
        );
        assert_eq!(registry.tracking(), TrackingState::Normal);
    }

    #[test]
    fn resolve_tap_hits_nearest_surface() {
        let mut registry = SurfaceRegistry::new();
        registry
            .apply(&TrackingEvent::SurfaceAdded {
                id: SurfaceId(1),
                plane: plane_at(0.0),
            })
            .unwrap();
        registry
            .apply(&TrackingEvent::SurfaceAdded {
                id: SurfaceId(2),
                plane: plane_at(1.0),
            })
            .unwrap();

        let ray = Ray::new(Point3::new(0.0, 3.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();
        let (id, hit) = registry.resolve_tap(&ray, &RayHitParams::default()).unwrap();
        assert_eq!(id, SurfaceId(2), "the raised surface is nearer the camera");
        assert!((hit.distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn resolve_tap_with_no_surfaces_is_absent() {
        let registry = SurfaceRegistry::new();
        let ray = Ray::new(Point3::new(0.0, 3.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();
        assert!(registry.resolve_tap(&ray, &RayHitParams::default()).is_none());
    }
}
