//! The scene's light rig and its uniform.
//!
//! Three fixed lights: a directional key light, a red point light and a blue
//! spot light. The point and spot lights fall off with the inverse square of
//! the distance and have no cutoff range.

use cgmath::{InnerSpace, Point3, Rad};
use wgpu::util::DeviceExt;

#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Point3<f32>,
    pub decay: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    /// Half angle of the cone.
    pub angle: Rad<f32>,
    /// Fraction of the cone over which the edge fades, 0 for a hard edge.
    pub penumbra: f32,
    pub decay: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub directional: DirectionalLight,
    pub point: PointLight,
    pub spot: SpotLight,
}

impl Default for LightRig {
    fn default() -> Self {
        let origin = Point3::new(0.0, 0.0, 0.0);
        Self {
            directional: DirectionalLight {
                color: [1.0, 1.0, 1.0],
                intensity: 1.0,
                position: Point3::new(-1.0, 2.0, 4.0),
                target: origin,
            },
            point: PointLight {
                color: [1.0, 0.0, 0.0],
                intensity: 1.0,
                position: Point3::new(2.0, 3.0, -3.0),
                decay: 2.0,
            },
            spot: SpotLight {
                color: [0.0, 0.0, 1.0],
                intensity: 1.0,
                position: Point3::new(-2.0, -3.0, 3.0),
                target: origin,
                angle: Rad(std::f32::consts::FRAC_PI_3),
                penumbra: 0.0,
                decay: 2.0,
            },
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    // Every field is a vec4 so the layout needs no manual padding
    /// xyz: unit vector pointing from the surface towards the light
    directional_direction: [f32; 4],
    /// rgb: colour * intensity
    directional_color: [f32; 4],
    /// xyz: position, w: decay exponent
    point_position: [f32; 4],
    point_color: [f32; 4],
    /// xyz: position, w: decay exponent
    spot_position: [f32; 4],
    spot_color: [f32; 4],
    /// xyz: unit cone axis, w: cos of the cone half angle
    spot_direction: [f32; 4],
    /// x: cos of the angle where the penumbra starts
    spot_params: [f32; 4],
}

impl From<&LightRig> for LightUniform {
    fn from(rig: &LightRig) -> Self {
        let scaled = |c: [f32; 3], i: f32| [c[0] * i, c[1] * i, c[2] * i, 1.0];
        let d = &rig.directional;
        let to_light = (d.position - d.target).normalize();
        let s = &rig.spot;
        let axis = (s.target - s.position).normalize();
        let cone_cos = s.angle.0.cos();
        let penumbra_cos = (s.angle.0 * (1.0 - s.penumbra.clamp(0.0, 1.0))).cos();
        Self {
            directional_direction: to_light.extend(0.0).into(),
            directional_color: scaled(d.color, d.intensity),
            point_position: rig.point.position.to_homogeneous().truncate().extend(rig.point.decay).into(),
            point_color: scaled(rig.point.color, rig.point.intensity),
            spot_position: s.position.to_homogeneous().truncate().extend(s.decay).into(),
            spot_color: scaled(s.color, s.intensity),
            spot_direction: axis.extend(cone_cos).into(),
            spot_params: [penumbra_cos, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
impl LightUniform {
    fn directional_direction(&self) -> cgmath::Vector3<f32> {
        cgmath::Vector3::new(
            self.directional_direction[0],
            self.directional_direction[1],
            self.directional_direction[2],
        )
    }

    fn spot_cone_cos(&self) -> f32 {
        self.spot_direction[3]
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(rig: LightRig, device: &wgpu::Device) -> Self {
        let uniform = LightUniform::from(&rig);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    #[test]
    fn key_light_points_back_at_its_position() {
        let uniform = LightUniform::from(&LightRig::default());
        let expected = Vector3::new(-1.0, 2.0, 4.0).normalize();
        assert!((uniform.directional_direction() - expected).magnitude() < 1e-6);
    }

    #[test]
    fn spot_cone_uses_sixty_degrees() {
        let uniform = LightUniform::from(&LightRig::default());
        assert!((uniform.spot_cone_cos() - 0.5).abs() < 1e-6);
        // No penumbra: the fade starts right at the cone edge
        assert!((uniform.spot_params[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn uniform_is_a_whole_number_of_rows() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 8 * 16);
    }
}
