use std::io::{BufReader, Cursor};

use anyhow::Context;
use image::DynamicImage;

use crate::data_structures::geometry::Geometry;

/**
 * This module contains all logic for loading meshes and images from external files.
 *
 * Everything here produces CPU data only, so it can run on any executor. GPU
 * uploads happen later on the event-loop thread.
 */
pub mod mesh;
pub mod texture;

#[derive(Debug)]
pub struct LoadedMesh {
    pub name: String,
    pub geometry: Geometry,
}

#[derive(Debug)]
pub struct LoadedMaterial {
    pub name: String,
    /// `Kd` as written in the file.
    pub diffuse: [f32; 3],
    /// `map_Kd` file name and decoded image, if it could be loaded.
    pub texture: Option<(String, DynamicImage)>,
}

#[derive(Debug)]
pub struct LoadedModel {
    pub meshes: Vec<LoadedMesh>,
    pub materials: Vec<LoadedMaterial>,
}

/// Loads the MTL library, then the OBJ that uses it.
///
/// A missing or broken MTL fails the whole load. Textures referenced by the
/// materials are optional: a failing `map_Kd` is logged and left out.
pub async fn load_model_obj(root: &str, mtl_name: &str, obj_name: &str) -> anyhow::Result<LoadedModel> {
    let mtl_text = texture::load_string(root, mtl_name)
        .await
        .with_context(|| format!("reading {mtl_name}"))?;
    let mtl = tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl_text)))
        .with_context(|| format!("parsing {mtl_name}"))?;

    let obj_text = texture::load_string(root, obj_name)
        .await
        .with_context(|| format!("reading {obj_name}"))?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    // The material library is already parsed, whatever name the OBJ gives it
    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| {
            let mtl = mtl.clone();
            async move { Ok(mtl) }
        },
    )
    .await
    .with_context(|| format!("parsing {obj_name}"))?;
    let obj_materials = obj_materials.with_context(|| format!("resolving materials of {obj_name}"))?;

    let mut materials = Vec::with_capacity(obj_materials.len());
    for m in obj_materials {
        let texture = match &m.diffuse_texture {
            Some(file) => settle(
                &format!("texture {file} of material {}", m.name),
                texture::load_image(root, file).await,
            )
            .map(|img| (file.clone(), img)),
            None => None,
        };
        materials.push(LoadedMaterial {
            name: m.name,
            diffuse: m.diffuse.unwrap_or([1.0; 3]),
            texture,
        });
    }

    let meshes = models
        .iter()
        .filter(|m| !m.mesh.indices.is_empty())
        .map(|m| LoadedMesh {
            name: m.name.clone(),
            geometry: mesh::to_geometry(m),
        })
        .collect::<Vec<_>>();

    log::info!(
        "Parsed {obj_name}: {} meshes, {} materials",
        meshes.len(),
        materials.len()
    );
    Ok(LoadedModel { meshes, materials })
}

/// Logs a failed asset load and turns it into `None`.
pub fn settle<T>(what: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Could not load {what}: {e:#}");
            None
        }
    }
}
