//! Graphics subsystem: geometry, models, scene state and wgpu rendering.

pub mod animation;
pub mod camera;
pub mod geometry;
pub mod material;
pub mod model;
pub mod render_engine;
pub mod scene;
pub mod scene_renderer;
pub mod vertex;

pub use camera::ArCamera;
pub use model::{Model, ModelPart, TARGET_SIZE};
pub use render_engine::RenderEngine;
pub use scene::{ArScene, LightConfig};
pub use scene_renderer::{SceneGraphics, SessionRenderer};
