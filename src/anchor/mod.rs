//! Anchor providers
//!
//! An anchor is where in the world the dish goes. Two interchangeable
//! strategies produce one: ray casting against tracked surfaces when the
//! host has world tracking ([`hit_test::HitTestProvider`]), and a
//! brightness heuristic over raw camera frames when it does not
//! ([`heuristic::MarkerHeuristicProvider`]). The placement controller and
//! the frame driver only ever see the [`AnchorProvider`] trait.

pub mod heuristic;
pub mod hit_test;

use std::time::Instant;

use cgmath::{Matrix4, Quaternion, Vector3};

use crate::capture::CaptureFrame;
use crate::xr::{XrFrame, XrSupport};

pub use heuristic::{HeuristicConfig, MarkerHeuristicProvider};
pub use hit_test::HitTestProvider;

/// A candidate or confirmed 6-DOF pose in the reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl Anchor {
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose as a model matrix (rotation then translation).
    pub fn pose_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from(self.orientation)
    }
}

/// Which concrete strategy a session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    SpatialHitTest,
    HeuristicMarker,
}

/// Picks the strategy for a session from the capability query result.
///
/// `Unknown` counts as unsupported: a session that cannot be sure of world
/// tracking must not depend on it.
pub fn select_strategy(support: XrSupport) -> AnchorStrategy {
    match support {
        XrSupport::Supported => AnchorStrategy::SpatialHitTest,
        XrSupport::Unsupported | XrSupport::Unknown => AnchorStrategy::HeuristicMarker,
    }
}

/// Everything a provider may look at during one tick.
pub struct FrameInput<'a> {
    /// Current XR frame, spatial strategy only.
    pub xr: Option<XrFrame>,
    /// Latest camera frame, heuristic strategy only.
    pub camera: Option<&'a CaptureFrame>,
    pub now: Instant,
}

/// Per-frame anchor production, confirmation and release.
///
/// The two strategies differ in reversibility: the spatial provider's
/// confirm is irreversible for the session, while the heuristic provider
/// toggles visibility continuously and has no confirm step.
pub trait AnchorProvider {
    fn strategy(&self) -> AnchorStrategy;

    /// Re-evaluates the anchor for this tick.
    fn update(&mut self, input: &FrameInput<'_>);

    /// Valid candidate pose for the placement cursor, while searching.
    /// `None` when there is no valid candidate or a pose is already
    /// confirmed.
    fn candidate(&self) -> Option<Anchor>;

    /// Freezes the current candidate. Returns the confirmed anchor if the
    /// confirmation took effect; `None` when there is nothing to confirm or
    /// the strategy has no confirm step.
    fn confirm(&mut self) -> Option<Anchor>;

    /// Back to searching. A no-op for already-searching providers.
    fn release(&mut self);

    /// Where the dish should be drawn this tick, if it should be drawn.
    fn anchor(&self) -> Option<Anchor>;

    /// Whether the dish is visible this tick.
    fn object_visible(&self) -> bool {
        self.anchor().is_some()
    }
}
