//! The demo scene: what goes in it and the GPU objects that draw it.
//!
//! [`SceneBlueprint`] is the CPU-only description of the objects, lights and
//! assets; [`Scene`] is built from it once the GPU context exists and is then
//! mutated by the render loop (spinning) and by asset completions (face
//! textures, the imported model, the background).

use std::sync::Arc;

use cgmath::Vector3;
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::{
    animation,
    config::SceneConfig,
    context::Context,
    data_structures::{
        geometry::Geometry,
        instance::Transform,
        model::{DrawModel, Material, MaterialUniform, Mesh, Shading},
        texture::Texture,
    },
    pipelines::{light::LightRig, skybox::Skybox},
    resources::LoadedModel,
};

pub const SPHERE_COLOR: u32 = 0xaa8844;
pub const CYLINDER_COLOR: u32 = 0x8844aa;

/// Converts a `0xRRGGBB` sRGB colour into linear RGB.
pub fn color_from_hex(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
    Cylinder,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Surface {
    /// Lit with the scene lights, single sRGB hex colour.
    Phong(u32),
    /// Unlit, one image per cube face.
    FaceTextures([String; 6]),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSpec {
    pub name: String,
    pub shape: Shape,
    pub surface: Surface,
    pub position: Vector3<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneBlueprint {
    /// Everything on the rotating list, in spin order.
    pub objects: Vec<ObjectSpec>,
    pub lights: LightRig,
    pub model_transform: Transform,
}

impl SceneBlueprint {
    /// The textured cube, the sphere, the cylinder and the random cubes.
    pub fn generate<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        let mut objects = Vec::with_capacity(config.spinning_count());
        objects.push(ObjectSpec {
            name: "textured cube".to_string(),
            shape: Shape::Cube,
            surface: Surface::FaceTextures(config.face_textures.clone()),
            position: Vector3::new(0.0, 0.0, 0.0),
        });
        objects.push(ObjectSpec {
            name: "sphere".to_string(),
            shape: Shape::Sphere,
            surface: Surface::Phong(SPHERE_COLOR),
            position: Vector3::new(-2.0, 0.0, 0.0),
        });
        objects.push(ObjectSpec {
            name: "cylinder".to_string(),
            shape: Shape::Cylinder,
            surface: Surface::Phong(CYLINDER_COLOR),
            position: Vector3::new(2.0, 0.0, 0.0),
        });

        for i in 0..config.random_cubes {
            let mut scatter = || (rng.random::<f32>() - 0.5) * config.scatter;
            let position = Vector3::new(scatter(), scatter(), scatter());
            let color = (rng.random::<f64>() * 0xffffff as f64) as u32;
            objects.push(ObjectSpec {
                name: format!("cube {i}"),
                shape: Shape::Cube,
                surface: Surface::Phong(color),
                position,
            });
        }

        Self {
            objects,
            lights: LightRig::default(),
            model_transform: Transform::at(config.model.offset).with_uniform_scale(config.model.scale),
        }
    }
}

/// A drawable object: shared meshes, its own materials and transform.
#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<Arc<Mesh>>,
    pub materials: Vec<Material>,
    instance_buffer: wgpu::Buffer,
}

impl SceneNode {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        transform: Transform,
        meshes: Vec<Arc<Mesh>>,
        materials: Vec<Material>,
    ) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Instance Buffer")),
            contents: bytemuck::cast_slice(&[transform.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            name: name.to_string(),
            transform,
            meshes,
            materials,
            instance_buffer,
        }
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[self.transform.to_raw()]),
        );
    }

    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for mesh in &self.meshes {
            render_pass.draw_mesh(mesh, &self.materials, 0..1, camera_bind_group, light_bind_group);
        }
    }
}

#[derive(Debug)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    /// Node indices in spin order. Only appended to during construction.
    pub spinning: Vec<usize>,
    pub background: Option<Skybox>,
    pub spin_step: f32,
    face_node: Option<usize>,
    model_transform: Transform,
    placeholder: Texture,
}

impl Scene {
    pub fn build(ctx: &Context, blueprint: &SceneBlueprint, spin_step: f32) -> Self {
        let device = &ctx.device;
        let placeholder = Texture::solid(device, &ctx.queue, [255; 4], "placeholder texture");
        let cube = Mesh::new(device, "box", &Geometry::cuboid(0.5, 0.5, 0.5));
        let sphere = Mesh::new(device, "sphere", &Geometry::sphere(0.5, 32, 16));
        let cylinder = Mesh::new(device, "cylinder", &Geometry::cylinder(0.5, 0.5, 1.0, 32));

        let mut scene = Self {
            nodes: Vec::with_capacity(blueprint.objects.len()),
            spinning: Vec::with_capacity(blueprint.objects.len()),
            background: None,
            spin_step,
            face_node: None,
            model_transform: blueprint.model_transform.clone(),
            placeholder,
        };

        for object in &blueprint.objects {
            let mesh = match object.shape {
                Shape::Cube => cube.clone(),
                Shape::Sphere => sphere.clone(),
                Shape::Cylinder => cylinder.clone(),
            };
            let materials = match &object.surface {
                Surface::Phong(hex) => vec![Material::new(
                    device,
                    &ctx.material_layout,
                    &object.name,
                    MaterialUniform::new(color_from_hex(*hex), Shading::Phong),
                    scene.placeholder.clone(),
                )],
                Surface::FaceTextures(names) => names
                    .iter()
                    .map(|name| {
                        Material::new(
                            device,
                            &ctx.material_layout,
                            name,
                            MaterialUniform::new([1.0; 3], Shading::Unlit),
                            scene.placeholder.clone(),
                        )
                    })
                    .collect(),
            };
            if matches!(object.surface, Surface::FaceTextures(_)) {
                scene.face_node = Some(scene.nodes.len());
            }
            let node = SceneNode::new(
                device,
                &object.name,
                Transform::at(object.position),
                vec![mesh],
                materials,
            );
            scene.spinning.push(scene.nodes.len());
            scene.nodes.push(node);
        }

        log::info!(
            "Scene built with {} nodes, {} spinning",
            scene.nodes.len(),
            scene.spinning.len()
        );
        scene
    }

    /// Rotates every spinning node for `elapsed` seconds since start.
    pub fn spin(&mut self, elapsed: f32) {
        animation::spin_listed(&mut self.nodes, &self.spinning, self.spin_step, elapsed, |node| {
            &mut node.transform
        });
    }

    pub fn write_to_buffers(&self, queue: &wgpu::Queue) {
        self.nodes.iter().for_each(|node| node.write_to_buffer(queue));
    }

    /// Replaces the placeholder on one face of the textured cube.
    pub fn set_face_texture(&mut self, ctx: &Context, face: usize, texture: Texture) {
        let Some(node) = self.face_node.and_then(|i| self.nodes.get_mut(i)) else {
            log::warn!("No textured cube in the scene for face {face}");
            return;
        };
        match node.materials.get_mut(face) {
            Some(material) => material.set_texture(&ctx.device, &ctx.material_layout, texture),
            None => log::warn!("Textured cube has no face {face}"),
        }
    }

    /// Uploads an imported model and adds it as a static node.
    pub fn add_model(&mut self, ctx: &Context, name: &str, model: LoadedModel) {
        let device = &ctx.device;
        let mut materials: Vec<Material> = model
            .materials
            .into_iter()
            .map(|m| {
                let texture = m
                    .texture
                    .and_then(|(file, img)| match Texture::from_image(device, &ctx.queue, &img, Some(&file)) {
                        Ok(texture) => Some(texture),
                        Err(e) => {
                            log::warn!("Dropping texture {file} of material {}: {e:#}", m.name);
                            None
                        }
                    })
                    .unwrap_or_else(|| self.placeholder.clone());
                Material::new(
                    device,
                    &ctx.material_layout,
                    &m.name,
                    MaterialUniform::new(m.diffuse.map(srgb_to_linear), Shading::Phong),
                    texture,
                )
            })
            .collect();
        // Meshes without a material fall back to plain white Phong
        let fallback = materials.len();
        materials.push(Material::new(
            device,
            &ctx.material_layout,
            "default",
            MaterialUniform::new([1.0; 3], Shading::Phong),
            self.placeholder.clone(),
        ));

        let meshes = model
            .meshes
            .into_iter()
            .map(|mut mesh| {
                for group in mesh.geometry.groups.iter_mut() {
                    if group.material >= fallback {
                        group.material = fallback;
                    }
                }
                Mesh::new(device, &mesh.name, &mesh.geometry)
            })
            .collect();

        let node = SceneNode::new(device, name, self.model_transform.clone(), meshes, materials);
        log::info!("Added model {name} with {} meshes", node.meshes.len());
        self.nodes.push(node);
    }

    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        for node in &self.nodes {
            node.draw(render_pass, camera_bind_group, light_bind_group);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn hex_colours_convert_to_linear() {
        let close = |a: [f32; 3], b: [f32; 3]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5);
        assert!(close(color_from_hex(0xffffff), [1.0, 1.0, 1.0]));
        assert_eq!(color_from_hex(0x000000), [0.0, 0.0, 0.0]);
        assert!(close(color_from_hex(0xff0000), [1.0, 0.0, 0.0]));
        // mid grey is darker in linear space
        let [grey, _, _] = color_from_hex(0x808080);
        assert!((grey - 0.2158605).abs() < 1e-4);
    }

    #[test]
    fn random_cubes_differ_between_seeds() {
        let config = SceneConfig::default();
        let a = SceneBlueprint::generate(&config, &mut SmallRng::seed_from_u64(1));
        let b = SceneBlueprint::generate(&config, &mut SmallRng::seed_from_u64(2));
        assert_ne!(a.objects[3..], b.objects[3..]);
        assert_eq!(a.objects[..3], b.objects[..3]);
    }
}
