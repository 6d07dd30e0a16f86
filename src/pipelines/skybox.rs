//! Cube-mapped background.
//!
//! An equirectangular panorama is converted once into a cube map by rendering
//! each face with `equirect.wgsl`; the skybox pass then
//! draws a fullscreen triangle at the far plane that samples the cube map in
//! the camera's view direction.

use anyhow::*;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{Texture, cube_face_view},
    pipelines::basic::{depth_state, mk_render_pipeline},
};

/// Cube face edge length for a panorama of the given height, capped at the
/// device's 2D texture limit.
pub fn cube_size_for(panorama_height: u32, max_dimension: u32) -> u32 {
    panorama_height.clamp(1, max_dimension.max(1))
}

pub fn mk_sky_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("sky_bind_group_layout"),
    })
}

/// Background pass. Bind groups: 0 camera, 1 cube map.
pub fn mk_skybox_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    sky_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Skybox Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, sky_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Skybox Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("skybox.wgsl").into()),
    };
    // Drawn after the scene: only pixels still at the cleared depth receive sky
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        None,
        Some(depth_state(false, wgpu::CompareFunction::LessEqual)),
        &[],
        shader,
    )
}

#[derive(Debug)]
pub struct Skybox {
    pub cube: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Skybox {
    /// Builds the cube map from a decoded panorama and binds it for the skybox pass.
    pub fn from_equirectangular(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        sky_bind_group_layout: &wgpu::BindGroupLayout,
        panorama: &image::DynamicImage,
        label: &str,
    ) -> Result<Self> {
        let equirect = Texture::from_image(device, queue, panorama, Some(label))
            .with_context(|| format!("uploading panorama {label}"))?;
        let size = cube_size_for(
            panorama.height(),
            device.limits().max_texture_dimension_2d,
        );
        let cube = Texture::create_cube(device, size, label);
        render_cube_faces(device, queue, &equirect, &cube);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: sky_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cube.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&cube.sampler),
                },
            ],
            label: Some("sky_bind_group"),
        });
        log::info!("Installed {size}x{size} cube map from {label}");
        Ok(Self { cube, bind_group })
    }

    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FaceUniform {
    index: [u32; 4],
}

fn render_cube_faces(device: &wgpu::Device, queue: &wgpu::Queue, equirect: &Texture, cube: &Texture) {
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("equirect_bind_group_layout"),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Equirect Pipeline Layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Equirect Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("equirect.wgsl").into()),
    };
    let pipeline = mk_render_pipeline(
        device,
        &pipeline_layout,
        Texture::COLOR_FORMAT,
        None,
        None,
        &[],
        shader,
    );
    // Wrap horizontally across the panorama seam, clamp at the poles
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Equirect Encoder"),
    });
    for face in 0..6u32 {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Face Buffer"),
            contents: bytemuck::cast_slice(&[FaceUniform {
                index: [face, 0, 0, 0],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&equirect.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("equirect_bind_group"),
        });
        let view = cube_face_view(cube, face);
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cube Face Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
    queue.submit(std::iter::once(encoder.finish()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_follows_panorama_height() {
        assert_eq!(cube_size_for(1024, 8192), 1024);
    }

    #[test]
    fn cube_is_clamped_to_device_limit() {
        assert_eq!(cube_size_for(4096, 2048), 2048);
        assert_eq!(cube_size_for(0, 2048), 1);
    }
}
