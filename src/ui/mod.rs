//! HUD overlay: imgui integration and the AR view's screens.

pub mod hud;
pub mod manager;

pub use hud::{draw_hud, HudAction};
pub use manager::UiManager;
