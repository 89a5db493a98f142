//! Placement controller
//!
//! Owns the anchor lifecycle for one session: tracks the candidate anchor
//! the provider produces each frame, freezes the dish at the anchor on
//! confirmation, and releases it back to searching. Depends only on the
//! [`AnchorProvider`] trait, never on which strategy is behind it.

use log::debug;

use crate::anchor::{Anchor, AnchorProvider, AnchorStrategy, FrameInput};

pub struct PlacementController {
    provider: Box<dyn AnchorProvider>,
}

impl PlacementController {
    pub fn new(provider: Box<dyn AnchorProvider>) -> Self {
        Self { provider }
    }

    pub fn strategy(&self) -> AnchorStrategy {
        self.provider.strategy()
    }

    /// Per-frame anchor re-evaluation.
    pub fn update(&mut self, input: &FrameInput<'_>) {
        self.provider.update(input);
    }

    /// Candidate pose for the placement cursor, while searching.
    pub fn cursor(&self) -> Option<Anchor> {
        self.provider.candidate()
    }

    /// Freezes the dish at the current candidate. Returns whether a
    /// confirmation actually happened.
    pub fn confirm(&mut self) -> bool {
        let confirmed = self.provider.confirm().is_some();
        if confirmed {
            debug!("placement confirmed");
        }
        confirmed
    }

    /// Back to searching.
    pub fn release(&mut self) {
        self.provider.release();
    }

    /// Where the dish is drawn this frame, if anywhere.
    pub fn anchor(&self) -> Option<Anchor> {
        self.provider.anchor()
    }

    /// Whether the dish counts as placed this frame. For the spatial
    /// strategy this is latched by confirmation; for the heuristic it
    /// follows detection and can revert.
    pub fn placed(&self) -> bool {
        self.provider.object_visible()
    }
}
