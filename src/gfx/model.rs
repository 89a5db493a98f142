//! Dish model
//!
//! A [`Model`] is the scene-graph node for the dish being previewed:
//! geometry parts with materials, a normalization transform fitting the
//! longest bounding-box axis to a canonical on-screen size, user-driven
//! yaw, an animation mixer, and a visibility flag. It is owned exclusively
//! by the running session and pure CPU state; GPU buffers are built from it
//! by the session renderer.

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};
use log::debug;

use super::animation::AnimationMixer;
use super::geometry::GeometryData;
use super::material::Material;

/// Longest bounding-box axis of a resolved model maps to this many meters.
pub const TARGET_SIZE: f32 = 0.3;

/// One geometry/material pairing inside a model.
pub struct ModelPart {
    pub geometry: GeometryData,
    pub material: Material,
}

impl ModelPart {
    pub fn new(geometry: GeometryData, material: Material) -> Self {
        Self { geometry, material }
    }
}

/// The dish node rendered by a session.
pub struct Model {
    pub parts: Vec<ModelPart>,
    /// Uniform normalization scale (target size / longest axis).
    pub scale: f32,
    /// Recentering translation applied before scaling, in model units.
    pub pivot_offset: Vector3<f32>,
    /// User-driven rotation about the vertical axis.
    pub yaw: Rad<f32>,
    pub visible: bool,
    pub mixer: AnimationMixer,
    /// World pose of the anchor the model is attached to.
    pub anchor_pose: Matrix4<f32>,
}

impl Model {
    /// Builds a model from parts and normalizes it to [`TARGET_SIZE`].
    ///
    /// Models start invisible; a model is never rendered before its session
    /// has a valid frame and an anchor.
    pub fn from_parts(parts: Vec<ModelPart>) -> Self {
        let mut model = Self {
            parts,
            scale: 1.0,
            pivot_offset: Vector3::new(0.0, 0.0, 0.0),
            yaw: Rad(0.0),
            visible: false,
            mixer: AnimationMixer::empty(),
            anchor_pose: Matrix4::identity(),
        };
        model.normalize_to(TARGET_SIZE);
        model
    }

    /// Axis-aligned bounding box over all parts.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut acc: Option<([f32; 3], [f32; 3])> = None;
        for part in &self.parts {
            if let Some((pmin, pmax)) = part.geometry.bounds() {
                acc = Some(match acc {
                    None => (pmin, pmax),
                    Some((mut min, mut max)) => {
                        for axis in 0..3 {
                            min[axis] = min[axis].min(pmin[axis]);
                            max[axis] = max[axis].max(pmax[axis]);
                        }
                        (min, max)
                    }
                });
            }
        }
        acc
    }

    /// Fits the longest bounding-box axis to `target` and recenters the
    /// pivot on the geometric center.
    ///
    /// Degenerate geometry (zero extent on every axis) falls back to a
    /// scale of `target` instead of dividing by zero.
    pub fn normalize_to(&mut self, target: f32) {
        let Some((min, max)) = self.bounds() else {
            self.scale = target;
            self.pivot_offset = Vector3::new(0.0, 0.0, 0.0);
            return;
        };

        let extents = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
        let longest = extents[0].max(extents[1]).max(extents[2]);

        self.scale = if longest > f32::EPSILON {
            target / longest
        } else {
            debug!("degenerate model extents; using default scale");
            target
        };
        self.pivot_offset = Vector3::new(
            -(min[0] + max[0]) * 0.5,
            -(min[1] + max[1]) * 0.5,
            -(min[2] + max[2]) * 0.5,
        );
    }

    /// Adds user-driven yaw on top of whatever the mixer contributes.
    pub fn add_yaw(&mut self, delta: Rad<f32>) {
        self.yaw += delta;
    }

    /// Full model matrix: anchor pose, then animation offsets and yaw, then
    /// the normalization scale and pivot recentering.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let bob = Matrix4::from_translation(Vector3::new(0.0, self.mixer.height_offset(), 0.0));
        let spin = Matrix4::from_angle_y(self.yaw + self.mixer.yaw_offset());
        let fit = Matrix4::from_scale(self.scale) * Matrix4::from_translation(self.pivot_offset);
        self.anchor_pose * bob * spin * fit
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector4;

    use super::*;
    use crate::gfx::geometry::{generate_cuboid, generate_cube};

    fn part(geometry: GeometryData) -> ModelPart {
        ModelPart::new(geometry, Material::default())
    }

    #[test]
    fn normalizes_longest_axis_to_target() {
        let model = Model::from_parts(vec![part(generate_cuboid(2.0, 0.5, 1.0))]);
        assert!((model.scale - TARGET_SIZE / 2.0).abs() < 1e-6);
    }

    #[test]
    fn recenters_offset_geometry() {
        let model = Model::from_parts(vec![part(generate_cube().translated(3.0, 0.0, 0.0))]);
        assert!((model.pivot_offset.x - -3.0).abs() < 1e-6);

        // The recentered, scaled model's origin-relative center lands at 0.
        let center = model.model_matrix() * Vector4::new(3.0, 0.0, 0.0, 1.0);
        assert!(center.x.abs() < 1e-5);
    }

    #[test]
    fn degenerate_geometry_gets_default_scale() {
        let mut flat = GeometryData::new();
        flat.vertices.push([1.0, 1.0, 1.0]);
        flat.normals.push([0.0, 1.0, 0.0]);

        let model = Model::from_parts(vec![part(flat)]);
        assert_eq!(model.scale, TARGET_SIZE);
    }

    #[test]
    fn empty_model_gets_default_scale() {
        let model = Model::from_parts(vec![]);
        assert_eq!(model.scale, TARGET_SIZE);
    }

    #[test]
    fn starts_invisible() {
        let model = Model::from_parts(vec![part(generate_cube())]);
        assert!(!model.visible);
    }

    #[test]
    fn yaw_rotates_model_matrix() {
        let mut model = Model::from_parts(vec![part(generate_cube())]);
        let before = model.model_matrix();
        model.add_yaw(Rad(std::f32::consts::FRAC_PI_2));
        let after = model.model_matrix();
        assert!(before != after);
    }
}
