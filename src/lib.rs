// src/lib.rs
//! Garnish AR Engine
//!
//! An augmented-reality dish preview engine built on wgpu and winit. Given
//! a menu item, it acquires a camera or XR capture source, resolves a 3D
//! model of the dish (authored asset or procedural archetype), anchors it
//! in the environment via XR hit-testing or a camera-frame heuristic, and
//! drives the render loop until the session is torn down.

pub mod anchor;
pub mod app;
pub mod assets;
pub mod capture;
pub mod error;
pub mod gfx;
pub mod interaction;
pub mod menu;
pub mod placement;
pub mod prelude;
pub mod session;
pub mod ui;
pub mod wgpu_utils;
pub mod xr;

// Re-export main types for convenience
pub use app::ArApp;
pub use error::SessionError;

/// Creates a default AR view application instance
pub fn default() -> ArApp {
    ArApp::new()
}
