//! Spatial hit-test strategy
//!
//! Each tick the viewer ray is cast into the tracked environment by the XR
//! runtime; the topmost surface intersection becomes the candidate anchor.
//! A select input while a valid candidate exists confirms the anchor, and
//! from then on new hit-test results are ignored: a confirmed pose never
//! moves for the rest of the session.

use log::debug;

use super::{Anchor, AnchorProvider, AnchorStrategy, FrameInput};

pub struct HitTestProvider {
    candidate: Option<Anchor>,
    confirmed: Option<Anchor>,
    /// Select observed on the current tick while searching.
    select_pending: bool,
}

impl HitTestProvider {
    pub fn new() -> Self {
        Self {
            candidate: None,
            confirmed: None,
            select_pending: false,
        }
    }
}

impl Default for HitTestProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorProvider for HitTestProvider {
    fn strategy(&self) -> AnchorStrategy {
        AnchorStrategy::SpatialHitTest
    }

    fn update(&mut self, input: &FrameInput<'_>) {
        if self.confirmed.is_some() {
            // Placement is final; later hit results must not disturb it.
            return;
        }

        let Some(frame) = input.xr else {
            self.candidate = None;
            return;
        };

        self.candidate = frame
            .hit
            .map(|hit| Anchor::new(hit.position, hit.orientation));

        if frame.select {
            self.select_pending = true;
        }
        if self.select_pending && self.candidate.is_some() {
            self.select_pending = false;
            self.confirm();
        }
    }

    fn candidate(&self) -> Option<Anchor> {
        if self.confirmed.is_some() {
            None
        } else {
            self.candidate
        }
    }

    fn confirm(&mut self) -> Option<Anchor> {
        if self.confirmed.is_some() {
            return None;
        }
        if let Some(anchor) = self.candidate.take() {
            debug!(
                "anchor confirmed at ({:.3}, {:.3}, {:.3})",
                anchor.position.x, anchor.position.y, anchor.position.z
            );
            self.confirmed = Some(anchor);
        }
        self.confirmed
    }

    fn release(&mut self) {
        self.confirmed = None;
        self.candidate = None;
        self.select_pending = false;
    }

    fn anchor(&self) -> Option<Anchor> {
        self.confirmed
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::xr::{XrFrame, XrPose};

    fn input(hit_x: Option<f32>, select: bool) -> FrameInput<'static> {
        FrameInput {
            xr: Some(XrFrame {
                viewer: XrPose::at(0.0, 1.6, 0.0),
                hit: hit_x.map(|x| XrPose::at(x, 0.0, -1.0)),
                select,
            }),
            camera: None,
            now: Instant::now(),
        }
    }

    #[test]
    fn candidate_tracks_hits_while_searching() {
        let mut provider = HitTestProvider::new();
        provider.update(&input(Some(0.1), false));
        assert_eq!(provider.candidate().unwrap().position.x, 0.1);
        assert!(!provider.object_visible());

        provider.update(&input(None, false));
        assert!(provider.candidate().is_none());
    }

    #[test]
    fn select_with_valid_candidate_confirms() {
        let mut provider = HitTestProvider::new();
        provider.update(&input(Some(0.2), true));
        assert!(provider.object_visible());
        assert_eq!(provider.anchor().unwrap().position.x, 0.2);
        assert!(provider.candidate().is_none());
    }

    #[test]
    fn select_without_candidate_does_not_confirm() {
        let mut provider = HitTestProvider::new();
        provider.update(&input(None, true));
        assert!(provider.anchor().is_none());
    }

    #[test]
    fn confirmed_pose_is_immutable() {
        let mut provider = HitTestProvider::new();
        provider.update(&input(Some(0.2), true));
        let placed = provider.anchor().unwrap();

        // New hit results and further selects arrive; the pose must hold.
        provider.update(&input(Some(5.0), true));
        provider.update(&input(Some(-3.0), false));
        assert_eq!(provider.anchor().unwrap(), placed);
        assert!(provider.confirm().is_none());
    }

    #[test]
    fn release_returns_to_searching() {
        let mut provider = HitTestProvider::new();
        provider.update(&input(Some(0.2), true));
        assert!(provider.object_visible());

        provider.release();
        assert!(provider.anchor().is_none());

        provider.update(&input(Some(0.7), true));
        assert_eq!(provider.anchor().unwrap().position.x, 0.7);
    }
}
