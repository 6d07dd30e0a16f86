//! CPU-side primitive geometry.
//!
//! Generators for the box, sphere and cylinder shapes. The vertex layout and
//! index order follow the usual Y-up, right-handed, counter-clockwise
//! convention; texture V is stored top-down as wgpu samples it.

use std::f32::consts::{PI, TAU};

use cgmath::InnerSpace;

use crate::data_structures::model::ModelVertex;

/// A contiguous run of indices drawn with one material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub start: u32,
    pub count: u32,
    pub material: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub groups: Vec<Group>,
}

impl Geometry {
    /// Axis-aligned box centred on the origin, one material group per face.
    ///
    /// Faces are emitted in the order +X, -X, +Y, -Y, +Z, -Z, so group `i`
    /// uses material `i`.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let mut geometry = Self::default();
        // (u axis, v axis, w axis, u dir, v dir, plane width, plane height, plane depth)
        let planes = [
            (2, 1, 0, -1.0, -1.0, depth, height, width),
            (2, 1, 0, 1.0, -1.0, depth, height, -width),
            (0, 2, 1, 1.0, 1.0, width, depth, height),
            (0, 2, 1, 1.0, -1.0, width, depth, -height),
            (0, 1, 2, 1.0, -1.0, width, height, depth),
            (0, 1, 2, -1.0, -1.0, width, height, -depth),
        ];
        for (material, (u, v, w, udir, vdir, pw, ph, pd)) in planes.into_iter().enumerate() {
            geometry.push_plane(u, v, w, udir, vdir, pw, ph, pd, material);
        }
        geometry
    }

    #[allow(clippy::too_many_arguments)]
    fn push_plane(
        &mut self,
        u: usize,
        v: usize,
        w: usize,
        udir: f32,
        vdir: f32,
        width: f32,
        height: f32,
        depth: f32,
        material: usize,
    ) {
        let base = self.vertices.len() as u32;
        let start = self.indices.len() as u32;

        for iy in 0..2u32 {
            let y = iy as f32 * height - height / 2.0;
            for ix in 0..2u32 {
                let x = ix as f32 * width - width / 2.0;
                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = depth / 2.0;
                let mut normal = [0.0; 3];
                normal[w] = if depth > 0.0 { 1.0 } else { -1.0 };
                self.vertices.push(ModelVertex {
                    position,
                    tex_coords: [ix as f32, iy as f32],
                    normal,
                });
            }
        }

        let a = base;
        let b = base + 2;
        let c = base + 3;
        let d = base + 1;
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
        self.groups.push(Group {
            start,
            count: 6,
            material,
        });
    }

    /// UV sphere centred on the origin with a single material group.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        let mut grid = Vec::with_capacity(height_segments as usize + 1);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // Pole vertices sit half a segment over so the seam texture isn't pinched
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };
            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let position = cgmath::Vector3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                );
                let normal = if position.magnitude2() > 0.0 {
                    position.normalize()
                } else {
                    cgmath::Vector3::unit_y()
                };
                row.push(vertices.len() as u32);
                vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [u + u_offset, v],
                    normal: normal.into(),
                });
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        let count = indices.len() as u32;
        Self {
            vertices,
            indices,
            groups: vec![Group {
                start: 0,
                count,
                material: 0,
            }],
        }
    }

    /// Capped cylinder (or cone frustum) along Y, centred on the origin.
    ///
    /// Torso and both caps are drawn with material 0.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let slope = (radius_bottom - radius_top) / height;
        let mut geometry = Self::default();

        // Torso: two rings of radial_segments + 1 vertices (the seam is duplicated)
        let mut rings = Vec::with_capacity(2);
        for y in 0..=1u32 {
            let v = y as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            let mut ring = Vec::with_capacity(radial_segments as usize + 1);
            for x in 0..=radial_segments {
                let u = x as f32 / radial_segments as f32;
                let theta = u * TAU;
                let (sin, cos) = theta.sin_cos();
                let normal = cgmath::Vector3::new(sin, slope, cos).normalize();
                ring.push(geometry.vertices.len() as u32);
                geometry.vertices.push(ModelVertex {
                    position: [radius * sin, -v * height + half_height, radius * cos],
                    tex_coords: [u, v],
                    normal: normal.into(),
                });
            }
            rings.push(ring);
        }
        for x in 0..radial_segments as usize {
            let a = rings[0][x];
            let b = rings[1][x];
            let c = rings[1][x + 1];
            let d = rings[0][x + 1];
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
        geometry.groups.push(Group {
            start: 0,
            count: geometry.indices.len() as u32,
            material: 0,
        });

        if radius_top > 0.0 {
            geometry.push_cap(true, radius_top, half_height, radial_segments);
        }
        if radius_bottom > 0.0 {
            geometry.push_cap(false, radius_bottom, half_height, radial_segments);
        }
        geometry
    }

    fn push_cap(&mut self, top: bool, radius: f32, half_height: f32, radial_segments: u32) {
        let sign = if top { 1.0 } else { -1.0 };
        let start = self.indices.len() as u32;

        // One centre vertex per segment keeps the cap UVs unique per triangle
        let centre_start = self.vertices.len() as u32;
        for _ in 0..radial_segments {
            self.vertices.push(ModelVertex {
                position: [0.0, half_height * sign, 0.0],
                tex_coords: [0.5, 0.5],
                normal: [0.0, sign, 0.0],
            });
        }
        let rim_start = self.vertices.len() as u32;
        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            self.vertices.push(ModelVertex {
                position: [radius * sin, half_height * sign, radius * cos],
                tex_coords: [cos * 0.5 + 0.5, 0.5 - sin * 0.5 * sign],
                normal: [0.0, sign, 0.0],
            });
        }
        for x in 0..radial_segments {
            let c = centre_start + x;
            let i = rim_start + x;
            if top {
                self.indices.extend_from_slice(&[i, i + 1, c]);
            } else {
                self.indices.extend_from_slice(&[i + 1, i, c]);
            }
        }

        self.groups.push(Group {
            start,
            count: radial_segments * 3,
            material: 0,
        });
    }

    /// Highest material index any group refers to, plus one.
    #[cfg(test)]
    fn material_count(&self) -> usize {
        self.groups.iter().map(|g| g.material + 1).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_has_one_quad_per_face() {
        let cube = Geometry::cuboid(0.5, 0.5, 0.5);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.groups.len(), 6);
        for (i, group) in cube.groups.iter().enumerate() {
            assert_eq!(group.material, i);
            assert_eq!(group.start, i as u32 * 6);
            assert_eq!(group.count, 6);
        }
        assert_eq!(cube.material_count(), 6);
    }

    #[test]
    fn cuboid_faces_point_outward_in_face_order() {
        let cube = Geometry::cuboid(0.5, 0.5, 0.5);
        let expected = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        for (face, normal) in expected.iter().enumerate() {
            for vertex in &cube.vertices[face * 4..face * 4 + 4] {
                assert_eq!(&vertex.normal, normal);
                let p = cgmath::Vector3::from(vertex.position);
                let n = cgmath::Vector3::from(vertex.normal);
                assert!((p.dot(n) - 0.25).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn cuboid_triangles_wind_counter_clockwise_from_outside() {
        let cube = Geometry::cuboid(1.0, 1.0, 1.0);
        for tri in cube.indices.chunks(3) {
            let p: Vec<cgmath::Vector3<f32>> = tri
                .iter()
                .map(|&i| cube.vertices[i as usize].position.into())
                .collect();
            let n: cgmath::Vector3<f32> = cube.vertices[tri[0] as usize].normal.into();
            let face_normal = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(face_normal.dot(n) > 0.0);
        }
    }

    #[test]
    fn sphere_counts_follow_segments() {
        let sphere = Geometry::sphere(0.5, 32, 16);
        assert_eq!(sphere.vertices.len(), 33 * 17);
        // Pole rows only contribute one triangle per segment
        assert_eq!(sphere.indices.len(), (32 * 16 * 2 - 2 * 32) * 3);
        assert_eq!(sphere.groups.len(), 1);
        for v in &sphere.vertices {
            let len = cgmath::Vector3::from(v.position).magnitude();
            assert!((len - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn cylinder_counts_follow_segments() {
        let cylinder = Geometry::cylinder(0.5, 0.5, 1.0, 32);
        // torso rings + (centres + rim) per cap
        assert_eq!(cylinder.vertices.len(), 33 * 2 + 2 * (32 + 33));
        assert_eq!(cylinder.indices.len(), 32 * 6 + 2 * 32 * 3);
        assert_eq!(cylinder.groups.len(), 3);
        assert!(cylinder.groups.iter().all(|g| g.material == 0));
        assert_eq!(cylinder.material_count(), 1);
    }

    #[test]
    fn cone_skips_the_missing_cap() {
        let cone = Geometry::cylinder(0.0, 0.5, 1.0, 8);
        assert_eq!(cone.groups.len(), 2);
    }

    #[test]
    fn all_indices_are_in_range() {
        for geometry in [
            Geometry::cuboid(0.5, 0.5, 0.5),
            Geometry::sphere(0.5, 32, 16),
            Geometry::cylinder(0.5, 0.5, 1.0, 32),
        ] {
            let n = geometry.vertices.len() as u32;
            assert!(geometry.indices.iter().all(|&i| i < n));
            let covered: u32 = geometry.groups.iter().map(|g| g.count).sum();
            assert_eq!(covered as usize, geometry.indices.len());
        }
    }
}
