//! # Garnish Prelude
//!
//! Brings the commonly used types into scope for applications embedding
//! the AR view:
//!
//! ```no_run
//! use garnish::prelude::*;
//!
//! let mut app = garnish::default();
//! app.set_item(MenuItem {
//!     id: 1,
//!     name: "Margherita Pizza".into(),
//!     description: String::new(),
//!     price: 15.99,
//!     category: "Pizza".into(),
//!     thumbnail_ref: String::new(),
//!     asset_ref: None,
//! });
//! app.run();
//! ```

// Core application types
pub use crate::app::ArApp;
pub use crate::default;
pub use crate::error::SessionError;

// Menu input
pub use crate::menu::{MenuCatalog, MenuItem};

// Session lifecycle
pub use crate::session::{ActiveMode, SessionConfig, SessionManager, SessionPhase};

// Anchoring
pub use crate::anchor::{Anchor, AnchorProvider, AnchorStrategy, HeuristicConfig};

// Capture and XR seams
pub use crate::capture::{CaptureRequest, CaptureSource, SyntheticCamera};
pub use crate::xr::{ScriptedXr, UnsupportedXr, XrRuntime, XrSupport};

// Asset resolution
pub use crate::assets::{resolve, ArchetypeTag};

// Common external dependencies
pub use cgmath::{Rad, Vector3};
