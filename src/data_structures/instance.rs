//! Node transformation data for GPU rendering.
//!
//! Every scene node owns a [`Transform`]. Before drawing, the transform is
//! flattened into an [`InstanceRaw`] and written into the node's instance
//! buffer, which the vertex shader reads at `@location(5..=11)`.

use cgmath::{Euler, Quaternion, Rad, Rotation3, Vector3};

use crate::data_structures::model;

/// Position, Euler rotation and scale of a scene node.
///
/// The rotation is kept as Euler angles rather than a quaternion because the
/// render loop drives the X and Y angles directly. Angles compose in XYZ
/// order: the X rotation is applied last, so the matrix reads `Rx * Ry * Rz`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn quaternion(&self) -> Quaternion<f32> {
        Quaternion::from_angle_x(self.rotation.x)
            * Quaternion::from_angle_y(self.rotation.y)
            * Quaternion::from_angle_z(self.rotation.z)
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.quaternion())
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let rotation = self.quaternion();
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(rotation).into(),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Self::at(position)
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

/**
 * Stride layout: the model matrix as four vec4s followed by the rotation-only
 * normal matrix as three vec3s. Locations 0..=2 belong to `ModelVertex`.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance instead of once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector4};

    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        assert_eq!(Transform::new().to_matrix(), Matrix4::identity());
    }

    #[test]
    fn translation_and_scale_apply_to_points() {
        let transform = Transform::at(Vector3::new(0.0, 0.2, -1.0)).with_uniform_scale(0.5);
        let p = transform.to_matrix() * Vector4::new(2.0, 2.0, 2.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 1.2).abs() < 1e-6);
        assert!((p.z - 0.0).abs() < 1e-6);
    }

    #[test]
    fn x_rotation_is_applied_after_y() {
        let mut transform = Transform::new();
        transform.rotation.x = Rad(std::f32::consts::FRAC_PI_2);
        transform.rotation.y = Rad(std::f32::consts::FRAC_PI_2);
        // Ry takes +X to -Z, then Rx takes -Z to +Y.
        let v = transform.quaternion() * Vector3::unit_x();
        assert!((v - Vector3::unit_y()).magnitude() < 1e-5);
    }
}
