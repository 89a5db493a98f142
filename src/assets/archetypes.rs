//! Procedural dish archetypes
//!
//! When no authored asset exists (or it fails to load), the resolver
//! synthesizes a dish from this closed catalog. Selection is a
//! case-insensitive substring match of the item name against each tag's
//! keyword, through an explicit tag -> builder table; unmatched names get
//! [`ArchetypeTag::Generic`]. Every builder composites primitive solids
//! into parts already sized in meters, so archetype models arrive at a
//! believable tabletop scale before normalization even runs.

use crate::gfx::geometry::{
    generate_cuboid, generate_cylinder, generate_frustum, generate_ring, generate_sphere,
};
use crate::gfx::material::Material;
use crate::gfx::model::ModelPart;

/// Closed set of dish shapes the engine can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchetypeTag {
    Pizza,
    Burger,
    Salad,
    Kebab,
    /// Default for names that match nothing: a covered plate.
    Generic,
}

type BuilderFn = fn() -> Vec<ModelPart>;

/// Tag -> builder mapping. Order also defines keyword match precedence.
const CATALOG: [(ArchetypeTag, &str, BuilderFn); 4] = [
    (ArchetypeTag::Pizza, "pizza", build_pizza),
    (ArchetypeTag::Burger, "burger", build_burger),
    (ArchetypeTag::Salad, "salad", build_salad),
    (ArchetypeTag::Kebab, "kebab", build_kebab),
];

impl ArchetypeTag {
    /// Deterministic, case-insensitive selection from an item name.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        for (tag, keyword, _) in CATALOG {
            if lowered.contains(keyword) {
                return tag;
            }
        }
        ArchetypeTag::Generic
    }

    pub fn builder(self) -> BuilderFn {
        CATALOG
            .iter()
            .find(|(tag, _, _)| *tag == self)
            .map(|(_, _, builder)| *builder)
            .unwrap_or(build_generic)
    }

    /// Builds the archetype's parts.
    pub fn build(self) -> Vec<ModelPart> {
        (self.builder())()
    }
}

fn part(geometry: crate::gfx::geometry::GeometryData, material: Material) -> ModelPart {
    ModelPart::new(geometry, material)
}

/// Layered discs: base, sauce, cheese, and a handful of pepperoni.
fn build_pizza() -> Vec<ModelPart> {
    let mut parts = vec![
        part(
            generate_cylinder(0.15, 0.02, 32),
            Material::rgb("pizza-base", 0.87, 0.72, 0.53),
        ),
        part(
            generate_cylinder(0.14, 0.003, 32).translated(0.0, 0.012, 0.0),
            Material::rgb("pizza-sauce", 0.70, 0.13, 0.13),
        ),
        part(
            generate_cylinder(0.13, 0.004, 32).translated(0.0, 0.015, 0.0),
            Material::rgb("pizza-cheese", 1.0, 0.84, 0.0),
        ),
    ];

    let pepperoni_spots = [
        (0.05, 0.04),
        (-0.06, 0.03),
        (0.03, -0.06),
        (-0.04, -0.05),
        (0.07, -0.03),
    ];
    for (x, z) in pepperoni_spots {
        parts.push(part(
            generate_cylinder(0.02, 0.006, 16).translated(x, 0.02, z),
            Material::rgb("pizza-pepperoni", 0.55, 0.0, 0.0),
        ));
    }

    parts
}

/// Stacked primitives: buns, patty, cheese and lettuce.
fn build_burger() -> Vec<ModelPart> {
    vec![
        part(
            generate_frustum(0.10, 0.11, 0.035, 32),
            Material::rgb("burger-bun-bottom", 0.89, 0.70, 0.40),
        ),
        part(
            generate_cylinder(0.105, 0.030, 32).translated(0.0, 0.035, 0.0),
            Material::rgb("burger-patty", 0.42, 0.26, 0.15),
        ),
        part(
            generate_cuboid(0.20, 0.006, 0.20).translated(0.0, 0.055, 0.0),
            Material::rgb("burger-cheese", 1.0, 0.78, 0.16),
        ),
        part(
            generate_cylinder(0.112, 0.008, 32).translated(0.0, 0.064, 0.0),
            Material::rgb("burger-lettuce", 0.37, 0.72, 0.27),
        ),
        part(
            generate_frustum(0.11, 0.055, 0.05, 32).translated(0.0, 0.095, 0.0),
            Material::rgb("burger-bun-top", 0.91, 0.72, 0.42),
        ),
    ]
}

/// Bowl with greens and tomatoes resting on top.
fn build_salad() -> Vec<ModelPart> {
    let mut parts = vec![part(
        generate_frustum(0.09, 0.14, 0.08, 32),
        Material::rgb("salad-bowl", 0.93, 0.93, 0.90),
    )];

    let greens = [
        (0.0, 0.0),
        (0.06, 0.03),
        (-0.05, 0.04),
        (0.03, -0.06),
        (-0.06, -0.03),
    ];
    for (x, z) in greens {
        parts.push(part(
            generate_sphere(12, 8).scaled(0.035).translated(x, 0.055, z),
            Material::rgb("salad-greens", 0.33, 0.65, 0.24),
        ));
    }

    let tomatoes = [(0.045, -0.025), (-0.03, 0.055), (0.0, 0.06)];
    for (x, z) in tomatoes {
        parts.push(part(
            generate_sphere(10, 8).scaled(0.02).translated(x, 0.075, z),
            Material::rgb("salad-tomato", 0.85, 0.16, 0.12),
        ));
    }

    parts
}

/// Skewer with alternating meat and vegetable cuboids.
fn build_kebab() -> Vec<ModelPart> {
    let mut parts = vec![part(
        generate_cylinder(0.004, 0.32, 12),
        Material::new("kebab-skewer", [0.75, 0.75, 0.78, 1.0], 0.8, 0.35),
    )];

    let pieces: [(f32, f32, [f32; 3], &str); 5] = [
        (-0.10, 0.050, [0.48, 0.27, 0.14], "kebab-meat"),
        (-0.04, 0.040, [0.34, 0.62, 0.22], "kebab-pepper"),
        (0.02, 0.050, [0.48, 0.27, 0.14], "kebab-meat"),
        (0.08, 0.038, [0.93, 0.91, 0.85], "kebab-onion"),
        (0.13, 0.050, [0.48, 0.27, 0.14], "kebab-meat"),
    ];
    for (y, size, [r, g, b], name) in pieces {
        parts.push(part(
            generate_cuboid(size, size, size).translated(0.0, y, 0.0),
            Material::rgb(name, r, g, b),
        ));
    }

    parts
}

/// Fallback: a plate with a cloche-ish dome.
fn build_generic() -> Vec<ModelPart> {
    vec![
        part(
            generate_cylinder(0.13, 0.01, 32),
            Material::rgb("plate", 0.95, 0.95, 0.95),
        ),
        part(
            generate_ring(0.10, 0.125, 32).translated(0.0, 0.006, 0.0),
            Material::rgb("plate-rim", 0.80, 0.80, 0.82),
        ),
        part(
            generate_frustum(0.09, 0.03, 0.07, 32).translated(0.0, 0.04, 0.0),
            Material::new("dome", [0.80, 0.82, 0.85, 1.0], 0.9, 0.25),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::model::Model;

    #[test]
    fn selection_is_case_insensitive_and_deterministic() {
        assert_eq!(ArchetypeTag::from_name("BURGER deluxe"), ArchetypeTag::Burger);
        assert_eq!(ArchetypeTag::from_name("kebab plate"), ArchetypeTag::Kebab);
        assert_eq!(ArchetypeTag::from_name("Salad Bowl"), ArchetypeTag::Salad);
        assert_eq!(ArchetypeTag::from_name("unknown dish"), ArchetypeTag::Generic);
        assert_eq!(ArchetypeTag::from_name("Margherita Pizza"), ArchetypeTag::Pizza);

        // Same input, same answer.
        assert_eq!(
            ArchetypeTag::from_name("BURGER deluxe"),
            ArchetypeTag::from_name("BURGER deluxe")
        );
    }

    #[test]
    fn every_tag_builds_geometry() {
        for tag in [
            ArchetypeTag::Pizza,
            ArchetypeTag::Burger,
            ArchetypeTag::Salad,
            ArchetypeTag::Kebab,
            ArchetypeTag::Generic,
        ] {
            let parts = tag.build();
            assert!(!parts.is_empty(), "{tag:?} built no parts");
            for part in &parts {
                assert!(part.geometry.triangle_count() > 0);
                assert_eq!(part.geometry.vertices.len(), part.geometry.normals.len());
            }
        }
    }

    #[test]
    fn archetypes_normalize_near_canonical_size() {
        // Builders already work in meters, so normalization should not need
        // to rescale by more than a factor of a few.
        for tag in [ArchetypeTag::Pizza, ArchetypeTag::Burger, ArchetypeTag::Salad] {
            let model = Model::from_parts(tag.build());
            assert!(
                model.scale > 0.3 && model.scale < 3.0,
                "{tag:?} scale {}",
                model.scale
            );
        }
    }

    #[test]
    fn pizza_has_pepperoni() {
        let parts = ArchetypeTag::Pizza.build();
        let pepperoni = parts
            .iter()
            .filter(|p| p.material.name == "pizza-pepperoni")
            .count();
        assert_eq!(pepperoni, 5);
    }
}
