//! AR scene
//!
//! CPU-side state for one session's scene: the dish model, the placement
//! cursor (reticle), the view camera, and the lighting rig. Owned by the
//! session lifecycle manager and destroyed with the session.

use cgmath::Matrix4;

use super::camera::ArCamera;
use super::model::Model;
use crate::anchor::Anchor;

/// Point light riding above the scene; ambient fill is fixed in the shader.
#[derive(Copy, Clone, Debug)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [1.5, 3.0, 1.5],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

/// Placement cursor state, spatial strategy only.
pub struct Reticle {
    pub visible: bool,
    pub pose: Matrix4<f32>,
}

impl Reticle {
    fn new() -> Self {
        Self {
            visible: false,
            pose: Matrix4::from_scale(1.0),
        }
    }

    /// Snaps the cursor to a candidate anchor.
    pub fn track(&mut self, candidate: Option<&Anchor>) {
        match candidate {
            Some(anchor) => {
                self.visible = true;
                self.pose = anchor.pose_matrix();
            }
            None => self.visible = false,
        }
    }
}

/// Everything the renderer needs to draw one session.
pub struct ArScene {
    pub model: Model,
    pub reticle: Reticle,
    pub camera: ArCamera,
    pub light: LightConfig,
}

impl ArScene {
    pub fn new(model: Model, width: u32, height: u32) -> Self {
        Self {
            model,
            reticle: Reticle::new(),
            camera: ArCamera::new(width, height),
            light: LightConfig::default(),
        }
    }
}
