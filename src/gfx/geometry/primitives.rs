//! # Primitive Shape Generation
//!
//! Functions to generate the primitive solids the dish archetypes are
//! composited from. All shapes are generated with proper normals, centered
//! at the origin, in a Y-up coordinate system (dishes stack along +Y).

use std::f32::consts::PI;

use super::GeometryData;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has proper normals pointing outward.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let normals = [
        [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = normals.to_vec();

    // 2 triangles per face, counter-clockwise
    data.indices = vec![
        0, 1, 2,    2, 3, 0,
        4, 5, 6,    6, 7, 4,
        8, 9, 10,   10, 11, 8,
        12, 13, 14, 14, 15, 12,
        16, 17, 18, 18, 19, 16,
        20, 21, 22, 22, 23, 20,
    ];

    data
}

/// Generate a cuboid with the given extents, centered at the origin.
pub fn generate_cuboid(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = generate_cube();
    for v in &mut data.vertices {
        v[0] *= width;
        v[1] *= height;
        v[2] *= depth;
    }
    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            // Spherical to Cartesian coordinates, Y-up
            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            data.vertices.push([x, y, z]);
            data.normals.push([x, y, z]); // Normal is same as position for unit sphere
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.push(first);
            data.indices.push(second);
            data.indices.push(first + 1);

            data.indices.push(second);
            data.indices.push(second + 1);
            data.indices.push(first + 1);
        }
    }

    data
}

/// Generate a truncated cone (frustum) along the Y axis
///
/// # Arguments
/// * `bottom_radius` - Radius at -height/2
/// * `top_radius` - Radius at +height/2
/// * `height` - Extent along Y
/// * `segments` - Number of circular segments
///
/// Caps are emitted for any end with a non-zero radius, so this covers
/// cylinders (equal radii), cones (one zero radius) and bowls (open shells
/// are composed from two frustums by the archetype builders).
pub fn generate_frustum(
    bottom_radius: f32,
    top_radius: f32,
    height: f32,
    segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;

    // Side normals lean by the slope of the silhouette.
    let slope = (bottom_radius - top_radius) / height.max(f32::EPSILON);
    let normal_scale = 1.0 / (1.0 + slope * slope).sqrt();

    // Generate side vertices
    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let cos_a = angle.cos();
        let sin_a = angle.sin();

        let normal = [
            cos_a * normal_scale,
            slope * normal_scale,
            sin_a * normal_scale,
        ];

        // Bottom vertex
        data.vertices
            .push([bottom_radius * cos_a, -half_height, bottom_radius * sin_a]);
        data.normals.push(normal);

        // Top vertex
        data.vertices
            .push([top_radius * cos_a, half_height, top_radius * sin_a]);
        data.normals.push(normal);
    }

    // Side faces
    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = (i + 1) * 2;
        let top_next = bottom_next + 1;

        data.indices.push(bottom_current);
        data.indices.push(top_current);
        data.indices.push(bottom_next);

        data.indices.push(top_current);
        data.indices.push(top_next);
        data.indices.push(bottom_next);
    }

    // Caps
    if bottom_radius > 0.0 {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, -half_height, 0.0]);
        data.normals.push([0.0, -1.0, 0.0]);

        let ring_start = data.vertices.len() as u32;
        for i in 0..=segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            data.vertices.push([
                bottom_radius * angle.cos(),
                -half_height,
                bottom_radius * angle.sin(),
            ]);
            data.normals.push([0.0, -1.0, 0.0]);
        }
        for i in 0..segs {
            data.indices.push(center);
            data.indices.push(ring_start + i);
            data.indices.push(ring_start + i + 1);
        }
    }

    if top_radius > 0.0 {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, half_height, 0.0]);
        data.normals.push([0.0, 1.0, 0.0]);

        let ring_start = data.vertices.len() as u32;
        for i in 0..=segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            data.vertices.push([
                top_radius * angle.cos(),
                half_height,
                top_radius * angle.sin(),
            ]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
        for i in 0..segs {
            data.indices.push(center);
            data.indices.push(ring_start + i + 1);
            data.indices.push(ring_start + i);
        }
    }

    data
}

/// Generate a cylinder along the Y axis
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Height of the cylinder (along Y)
/// * `segments` - Number of circular segments
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    generate_frustum(radius, radius, height, segments)
}

/// Generate a flat ring (annulus) in the XZ plane facing +Y
///
/// Used for the placement cursor. Both faces are emitted so the ring stays
/// visible regardless of approach angle.
pub fn generate_ring(inner_radius: f32, outer_radius: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let cos_a = angle.cos();
        let sin_a = angle.sin();

        data.vertices
            .push([inner_radius * cos_a, 0.0, inner_radius * sin_a]);
        data.normals.push([0.0, 1.0, 0.0]);
        data.vertices
            .push([outer_radius * cos_a, 0.0, outer_radius * sin_a]);
        data.normals.push([0.0, 1.0, 0.0]);
    }

    for i in 0..segs {
        let inner_current = i * 2;
        let outer_current = inner_current + 1;
        let inner_next = (i + 1) * 2;
        let outer_next = inner_next + 1;

        // Top winding
        data.indices.push(inner_current);
        data.indices.push(outer_next);
        data.indices.push(outer_current);
        data.indices.push(inner_current);
        data.indices.push(inner_next);
        data.indices.push(outer_next);

        // Bottom winding
        data.indices.push(inner_current);
        data.indices.push(outer_current);
        data.indices.push(outer_next);
        data.indices.push(inner_current);
        data.indices.push(outer_next);
        data.indices.push(inner_next);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_cuboid_extents() {
        let cuboid = generate_cuboid(2.0, 0.5, 1.0);
        let (min, max) = cuboid.bounds().unwrap();
        assert_eq!(min, [-1.0, -0.25, -0.5]);
        assert_eq!(max, [1.0, 0.25, 0.5]);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(!sphere.vertices.is_empty());
        assert!(!sphere.indices.is_empty());
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
    }

    #[test]
    fn test_cylinder_is_y_up() {
        let cylinder = generate_cylinder(0.5, 2.0, 16);
        let (min, max) = cylinder.bounds().unwrap();
        assert!((min[1] - -1.0).abs() < 1e-6);
        assert!((max[1] - 1.0).abs() < 1e-6);
        assert!((max[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_frustum_caps_skipped_for_zero_radius() {
        let cone = generate_frustum(0.5, 0.0, 1.0, 8);
        let capped = generate_frustum(0.5, 0.5, 1.0, 8);
        assert!(cone.vertices.len() < capped.vertices.len());
    }

    #[test]
    fn test_ring_is_flat() {
        let ring = generate_ring(0.08, 0.1, 32);
        let (min, max) = ring.bounds().unwrap();
        assert_eq!(min[1], 0.0);
        assert_eq!(max[1], 0.0);
        assert!((max[0] - 0.1).abs() < 1e-3);
    }
}
