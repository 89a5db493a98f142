//! Session lifecycle: state machine, per-frame driver, and the manager
//! that owns every session-scoped resource.

pub mod frame;
pub mod manager;
pub mod state;

pub use frame::FrameDriver;
pub use manager::{RendererFactory, SessionConfig, SessionManager};
pub use state::{ActiveMode, SessionPhase};
