//! Camera types and the uniform that carries them to the shaders.

use cgmath::{Deg, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};

use crate::controls::OrbitControls;

/// cgmath builds OpenGL clip space (z in [-1, 1]); wgpu expects z in [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A look-at camera: where it is, what it looks at, which way is up.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    /// View matrix with the translation removed, for drawing things at infinity.
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        let mut view = self.calc_matrix();
        view.w.x = 0.0;
        view.w.y = 0.0;
        view.w.z = 0.0;
        view
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect(width, height);
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn fovy(&self) -> Deg<f32> {
        self.fovy.into()
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn znear(&self) -> f32 {
        self.znear
    }

    pub fn zfar(&self) -> f32 {
        self.zfar
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    // Inverse of projection * rotation-only view; maps clip space to world directions
    sky_inv: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            sky_inv: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
        let sky = projection.calc_matrix() * camera.rotation_matrix();
        self.sky_inv = sky.invert().unwrap_or_else(Matrix4::identity).into();
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.view_proj.into()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the context keeps about the camera, CPU and GPU side.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitControls,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    /// Applies pending controller motion and pushes the result to the GPU.
    pub fn update(&mut self, projection: &Projection, queue: &wgpu::Queue) {
        self.controller.update(&mut self.camera);
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
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
        label: Some("camera_bind_group_layout"),
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector4};

    use super::*;

    #[test]
    fn origin_projects_to_screen_centre() {
        let camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));
        let projection = Projection::new(800, 400, Deg(75.0), 0.1, 100.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);
        let clip = uniform.view_proj() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn sky_matrix_ignores_camera_translation() {
        let near = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));
        let far = Camera::new((0.0, 0.0, 50.0), (0.0, 0.0, 45.0));
        assert_eq!(near.rotation_matrix(), far.rotation_matrix());
    }

    #[test]
    fn screen_centre_looks_down_the_view_direction() {
        let camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));
        let projection = Projection::new(100, 100, Deg(75.0), 0.1, 100.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);
        let sky_inv: Matrix4<f32> = uniform.sky_inv.into();
        let world = sky_inv * Vector4::new(0.0, 0.0, 1.0, 1.0);
        let dir = (world.truncate() / world.w).normalize();
        assert!((dir - -Vector3::unit_z()).magnitude() < 1e-4);
    }

    #[test]
    fn resize_keeps_aspect_positive() {
        let mut projection = Projection::new(0, 0, Deg(75.0), 0.1, 100.0);
        assert_eq!(projection.aspect(), 1.0);
        projection.resize(1920, 1080);
        assert!((projection.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
