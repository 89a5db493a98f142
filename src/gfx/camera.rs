//! AR view camera
//!
//! Unlike an orbit camera, the AR camera is not user-controlled: on the
//! spatial strategy its view comes from the XR viewer pose each frame, and
//! on the heuristic strategy it sits fixed at the origin looking down -Z
//! with the camera feed behind it.

use cgmath::{perspective, Deg, Matrix4, SquareMatrix, Vector3};

use crate::xr::XrPose;

/// cgmath produces OpenGL clip space (z in [-1, 1]); wgpu expects [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Eye position in homogeneous coordinates (16-byte alignment).
    pub view_position: [f32; 4],
    /// View-projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }
}

pub struct ArCamera {
    pub fov_y: Deg<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    view: Matrix4<f32>,
    eye: Vector3<f32>,
}

impl ArCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fov_y: Deg(70.0),
            aspect: width as f32 / height.max(1) as f32,
            near: 0.01,
            far: 20.0,
            view: Matrix4::identity(),
            eye: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Takes the viewer pose reported by the XR runtime for this frame.
    pub fn set_view_from_pose(&mut self, pose: &XrPose) {
        let world = Matrix4::from_translation(pose.position) * Matrix4::from(pose.orientation);
        self.view = world.invert().unwrap_or_else(Matrix4::identity);
        self.eye = pose.position;
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let proj = perspective(self.fov_y, self.aspect, self.near, self.far);
        OPENGL_TO_WGPU_MATRIX * proj * self.view
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: [self.eye.x, self.eye.y, self.eye.z, 1.0],
            view_proj: self.build_view_projection_matrix().into(),
        }
    }
}
