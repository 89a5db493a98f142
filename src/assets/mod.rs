//! Asset resolver
//!
//! Turns a menu item into a renderable [`Model`]: load the authored OBJ
//! asset when a reference is given, otherwise (or on any load failure)
//! synthesize a procedural archetype from the item name. Loader failures
//! never escape this module - a missing, malformed or truncated asset is a
//! normal condition that degrades to synthesis, logged at `warn` and
//! invisible to the session state machine.

pub mod archetypes;

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use crate::gfx::animation::{AnimationManifest, AnimationMixer};
use crate::gfx::geometry::GeometryData;
use crate::gfx::material::Material;
use crate::gfx::model::{Model, ModelPart};

pub use archetypes::ArchetypeTag;

/// Resolves a model for a menu item. Never fails: the procedural fallback
/// is pure and local.
///
/// # Arguments
/// * `asset_ref` - Optional path to an OBJ scene asset
/// * `item_name` - Dish name, used for archetype selection on fallback
pub fn resolve(asset_ref: Option<&str>, item_name: &str) -> Model {
    if let Some(path) = asset_ref {
        match load_asset(Path::new(path)) {
            Ok(model) => {
                info!("loaded asset '{path}' for '{item_name}'");
                return model;
            }
            Err(err) => {
                warn!("asset '{path}' failed to load ({err:#}); synthesizing a model instead");
            }
        }
    }

    let tag = ArchetypeTag::from_name(item_name);
    info!("synthesized {tag:?} archetype for '{item_name}'");
    Model::from_parts(tag.build())
}

/// Loads an OBJ asset (plus its optional `.anim.json` sidecar) into a
/// normalized model.
fn load_asset(path: &Path) -> Result<Model> {
    let (meshes, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("reading {}", path.display()))?;

    let materials = materials.unwrap_or_else(|err| {
        debug!("no usable MTL for {} ({err}); using defaults", path.display());
        Vec::new()
    });

    let mut parts = Vec::new();
    for m in &meshes {
        let mesh = &m.mesh;
        if mesh.positions.is_empty() || mesh.indices.is_empty() {
            continue;
        }

        let mut geometry = GeometryData::new();
        for chunk in mesh.positions.chunks_exact(3) {
            geometry.vertices.push([chunk[0], chunk[1], chunk[2]]);
        }
        geometry.indices = mesh.indices.clone();

        // Use normals from the OBJ if present and consistent, otherwise
        // average face normals per vertex.
        if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
            for chunk in mesh.normals.chunks_exact(3) {
                geometry.normals.push([chunk[0], chunk[1], chunk[2]]);
            }
        } else {
            geometry.normals = averaged_face_normals(&geometry.vertices, &geometry.indices);
        }

        let material = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .map(material_from_mtl)
            .unwrap_or_default();

        parts.push(ModelPart::new(geometry, material));
    }

    if parts.is_empty() {
        bail!("asset contains no geometry");
    }

    let mut model = Model::from_parts(parts);
    model.mixer = load_sidecar_clips(path);
    Ok(model)
}

fn material_from_mtl(mtl: &tobj::Material) -> Material {
    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
    Material::new(
        &mtl.name,
        [
            diffuse[0],
            diffuse[1],
            diffuse[2],
            mtl.dissolve.unwrap_or(1.0),
        ],
        0.0,
        1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0),
    )
}

/// Binds clips from `<asset>.anim.json` when present; all bound clips
/// auto-play. A malformed sidecar degrades to no clips, same as absence.
fn load_sidecar_clips(asset_path: &Path) -> AnimationMixer {
    let sidecar = asset_path.with_extension("anim.json");
    if !sidecar.exists() {
        return AnimationMixer::empty();
    }

    let clips = std::fs::read_to_string(&sidecar)
        .map_err(anyhow::Error::from)
        .and_then(|json| AnimationManifest::from_json(&json));
    match clips {
        Ok(manifest) => {
            info!(
                "bound {} animation clip(s) from {}",
                manifest.clips.len(),
                sidecar.display()
            );
            AnimationMixer::new(manifest.clips)
        }
        Err(err) => {
            warn!("ignoring sidecar {} ({err:#})", sidecar.display());
            AnimationMixer::empty()
        }
    }
}

/// Per-vertex normals averaged from face normals, for OBJ files that do not
/// carry their own.
fn averaged_face_normals(vertices: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let v0 = vertices[i0];
        let v1 = vertices[i1];
        let v2 = vertices[i2];

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &index in &[i0, i1, i2] {
            normals[index][0] += face[0];
            normals[index][1] += face[1];
            normals[index][2] += face[2];
        }
    }

    for normal in &mut normals {
        let length =
            (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if length > 0.0 {
            normal[0] /= length;
            normal[1] /= length;
            normal[2] /= length;
        } else {
            *normal = [0.0, 1.0, 0.0];
        }
    }

    normals
}
