use cgmath::{InnerSpace, Vector3};

use crate::data_structures::{
    geometry::{Geometry, Group},
    model::ModelVertex,
};

/**
 * Converts a parsed OBJ mesh into engine geometry.
 *
 * V is flipped since OBJ stores texture coordinates bottom-up. Files without
 * normals get smooth vertex normals averaged from the faces around them.
 * A mesh without a material gets an out-of-range material index, which the
 * scene replaces with its default material.
 */
pub fn to_geometry(model: &tobj::Model) -> Geometry {
    let m = &model.mesh;
    let mut vertices = (0..m.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [m.positions[i * 3], m.positions[i * 3 + 1], m.positions[i * 3 + 2]],
            tex_coords: [
                m.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                m.normals.get(i * 3).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        })
        .collect::<Vec<_>>();

    if m.normals.is_empty() {
        compute_vertex_normals(&mut vertices, &m.indices);
    }

    let groups = vec![Group {
        start: 0,
        count: m.indices.len() as u32,
        material: m.material_id.unwrap_or(usize::MAX),
    }];

    Geometry {
        vertices,
        indices: m.indices.clone(),
        groups,
    }
}

fn compute_vertex_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); vertices.len()];
    for c in indices.chunks_exact(3) {
        let [a, b, d] = [c[0] as usize, c[1] as usize, c[2] as usize];
        if a >= vertices.len() || b >= vertices.len() || d >= vertices.len() {
            continue;
        }
        let p0: Vector3<f32> = vertices[a].position.into();
        let p1: Vector3<f32> = vertices[b].position.into();
        let p2: Vector3<f32> = vertices[d].position.into();
        // Unnormalised: larger faces weigh more
        let face = (p1 - p0).cross(p2 - p0);
        sums[a] += face;
        sums[b] += face;
        sums[d] += face;
    }
    for (v, sum) in vertices.iter_mut().zip(sums) {
        if sum.magnitude2() > 0.0 {
            v.normal = sum.normalize().into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(texcoords: Vec<f32>, normals: Vec<f32>) -> tobj::Model {
        tobj::Model {
            mesh: tobj::Mesh {
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                texcoords,
                normals,
                indices: vec![0, 1, 2],
                material_id: Some(0),
                ..Default::default()
            },
            name: "triangle".to_string(),
        }
    }

    #[test]
    fn flips_v() {
        let geometry = to_geometry(&triangle(vec![0.0, 0.0, 1.0, 0.25, 0.0, 1.0], vec![]));
        assert_eq!(geometry.vertices[0].tex_coords, [0.0, 1.0]);
        assert_eq!(geometry.vertices[1].tex_coords, [1.0, 0.75]);
        assert_eq!(geometry.vertices[2].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn missing_normals_are_generated() {
        let geometry = to_geometry(&triangle(vec![], vec![]));
        for v in &geometry.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn file_normals_are_kept() {
        let geometry = to_geometry(&triangle(vec![], vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0]));
        assert_eq!(geometry.vertices[2].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn one_group_covers_the_mesh() {
        let geometry = to_geometry(&triangle(vec![], vec![]));
        assert_eq!(
            geometry.groups,
            vec![Group {
                start: 0,
                count: 3,
                material: 0
            }]
        );
    }
}
