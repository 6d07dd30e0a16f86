use std::io::Cursor;

use orbit_scene::resources::{self, texture};

use crate::common::test_utils::fixtures;

mod common;

#[tokio::test]
async fn obj_model_loads_with_flipped_uvs_and_kd_colours() {
    let model = resources::load_model_obj(&fixtures(), "triangle.mtl", "triangle.obj")
        .await
        .unwrap();

    assert_eq!(model.materials.len(), 1);
    let material = &model.materials[0];
    assert_eq!(material.name, "red");
    assert_eq!(material.diffuse, [0.8, 0.1, 0.1]);
    // map_Kd points at a file that isn't there
    assert!(material.texture.is_none());

    assert_eq!(model.meshes.len(), 1);
    let geometry = &model.meshes[0].geometry;
    assert_eq!(geometry.indices.len(), 3);
    assert_eq!(geometry.groups[0].material, 0);
    let uvs: Vec<[f32; 2]> = geometry.vertices.iter().map(|v| v.tex_coords).collect();
    assert!(uvs.contains(&[0.0, 1.0]));
    assert!(uvs.contains(&[1.0, 0.75]));
    assert!(uvs.contains(&[0.0, 0.0]));
}

#[tokio::test]
async fn missing_mtl_abandons_the_model() {
    let err = resources::load_model_obj(&fixtures(), "nope.mtl", "triangle.obj")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("nope.mtl"));
}

#[tokio::test]
async fn obj_without_materials_is_triangulated_and_gets_normals() {
    let model = resources::load_model_obj(&fixtures(), "triangle.mtl", "quad.obj")
        .await
        .unwrap();
    let geometry = &model.meshes[0].geometry;
    assert_eq!(geometry.indices.len(), 6);
    assert!(geometry.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    // no usemtl: the scene substitutes its default material
    assert_eq!(geometry.groups[0].material, usize::MAX);
}

#[tokio::test]
async fn missing_panorama_settles_to_nothing() {
    let result = texture::load_image(&fixtures(), "images.jpg").await;
    assert!(result.is_err());
    assert!(resources::settle("panorama", result).is_none());
}

#[tokio::test]
async fn images_load_from_the_asset_root() {
    let dir = tempfile::tempdir().unwrap();
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 255])));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png).unwrap();
    std::fs::write(dir.path().join("Glep.PNG"), png.into_inner()).unwrap();

    let root = dir.path().to_string_lossy().to_string();
    let loaded = resources::settle("face", texture::load_image(&root, "Glep.PNG").await).unwrap();
    assert_eq!((loaded.width(), loaded.height()), (8, 4));
}
