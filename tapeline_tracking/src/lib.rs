// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed tracking events and a tracked-surface registry.
//!
//! ## Overview
//!
//! Platform tracking stacks report their world model through callbacks:
//! camera tracking quality changed, a surface appeared, a surface's pose or
//! extent was refined, a surface vanished. This crate replaces that callback
//! surface with a typed event interface the host pushes into:
//!
//! - [`TrackingEvent`] is the event vocabulary.
//! - [`SurfaceRegistry`] consumes events and mirrors the currently tracked
//!   surfaces, so taps can be resolved against live geometry at any time.
//! - [`TrackingHandler`](dispatch::TrackingHandler) is the host-registered
//!   observer notified after each event lands, for updating overlays,
//!   status labels, and the like.
//!
//! The measurement session itself never consumes these events; only the
//! registry and the host-facing handler do.
//!
//! ## Event application
//!
//! [`SurfaceRegistry::apply`] is strict: adding a surface twice, or
//! updating/removing one that is not tracked, is a typed
//! [`ApplyError`](registry::ApplyError) rather than a silent fixup or an
//! abort. Hosts that feed events in order never see these errors; hosts
//! with a lossy feed find out immediately instead of rendering stale
//! geometry.
//!
//! ```
//! use nalgebra::Point3;
//! use tapeline_raycast::{PlaneExtent, TrackedPlane};
//! use tapeline_tracking::{SurfaceId, SurfaceRegistry, TrackingEvent, TrackingState};
//!
//! let mut registry = SurfaceRegistry::new();
//! let floor = TrackedPlane::horizontal(Point3::origin(), PlaneExtent::new(2.0, 2.0));
//!
//! registry
//!     .apply(&TrackingEvent::TrackingChanged(TrackingState::Normal))
//!     .unwrap();
//! registry
//!     .apply(&TrackingEvent::SurfaceAdded { id: SurfaceId(1), plane: floor })
//!     .unwrap();
//!
//! assert_eq!(registry.tracking(), TrackingState::Normal);
//! assert!(registry.has_surfaces());
//! ```
//!
//! This crate is `no_std`.

#![no_std]

use core::fmt;

use tapeline_raycast::TrackedPlane;

pub mod dispatch;
pub mod registry;

pub use registry::{Applied, ApplyError, SurfaceRegistry};

/// Host-assigned identifier for a tracked surface.
///
/// The host owns the mapping from its platform's anchor handles to ids;
/// the registry only requires that ids are stable for a surface's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why tracking quality is limited.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LimitedReason {
    /// The camera is moving too fast for stable tracking.
    ExcessiveMotion,
    /// The scene lacks visual detail to track against.
    InsufficientFeatures,
    /// Tracking is still starting up.
    Initializing,
    /// Tracking is re-establishing after an interruption.
    Relocalizing,
}

/// Camera tracking quality as reported by the platform.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingState {
    /// Tracking is not available.
    #[default]
    NotAvailable,
    /// Tracking is running normally.
    Normal,
    /// Tracking is degraded for the given reason.
    Limited(LimitedReason),
}

impl TrackingState {
    /// User-facing description of the state, suitable for a status label.
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotAvailable => "TRACKING UNAVAILABLE",
            Self::Normal => "TRACKING NORMAL",
            Self::Limited(LimitedReason::ExcessiveMotion) => {
                "TRACKING LIMITED\nToo much camera movement"
            }
            Self::Limited(LimitedReason::InsufficientFeatures) => {
                "TRACKING LIMITED\nNot enough surface detail"
            }
            Self::Limited(LimitedReason::Initializing) => {
                "TRACKING LIMITED\nInitialization in progress"
            }
            Self::Limited(LimitedReason::Relocalizing) => {
                "TRACKING LIMITED\nRelocalization in progress"
            }
        }
    }
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A tracking-system report, pushed by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TrackingEvent {
    /// Camera tracking quality changed.
    TrackingChanged(TrackingState),
    /// A new surface was detected.
    SurfaceAdded {
        /// Identifier for the new surface.
        id: SurfaceId,
        /// Initial pose and extent.
        plane: TrackedPlane,
    },
    /// A tracked surface's pose or extent was refined.
    SurfaceUpdated {
        /// Identifier of the surface being updated.
        id: SurfaceId,
        /// Replacement pose and extent.
        plane: TrackedPlane,
    },
    /// A tracked surface is no longer detected.
    SurfaceRemoved {
        /// Identifier of the removed surface.
        id: SurfaceId,
    },
}
