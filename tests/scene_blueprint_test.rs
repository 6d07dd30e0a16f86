use std::collections::HashSet;

use cgmath::{Deg, Point3, Vector3};
use orbit_scene::{
    SceneConfig,
    data_structures::scene::{CYLINDER_COLOR, SPHERE_COLOR, Shape, Surface},
};

use crate::common::test_utils::blueprint;

mod common;

#[test]
fn starts_with_twenty_three_spinning_objects() {
    let blueprint = blueprint(7);
    assert_eq!(blueprint.objects.len(), 23);
    assert_eq!(SceneConfig::default().spinning_count(), 23);

    let shapes: Vec<Shape> = blueprint.objects.iter().map(|o| o.shape).collect();
    assert_eq!(&shapes[..3], &[Shape::Cube, Shape::Sphere, Shape::Cylinder]);
    assert!(shapes[3..].iter().all(|s| *s == Shape::Cube));
    assert_eq!(shapes[3..].len(), 20);
}

#[test]
fn fixed_objects_keep_their_places_and_colours() {
    let blueprint = blueprint(7);
    let [cube, sphere, cylinder] = [&blueprint.objects[0], &blueprint.objects[1], &blueprint.objects[2]];
    assert_eq!(cube.position, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(sphere.position, Vector3::new(-2.0, 0.0, 0.0));
    assert_eq!(cylinder.position, Vector3::new(2.0, 0.0, 0.0));
    assert_eq!(sphere.surface, Surface::Phong(SPHERE_COLOR));
    assert_eq!(cylinder.surface, Surface::Phong(CYLINDER_COLOR));
}

#[test]
fn textured_cube_has_one_distinct_image_per_face() {
    let blueprint = blueprint(7);
    let Surface::FaceTextures(faces) = &blueprint.objects[0].surface else {
        panic!("first object should be the textured cube");
    };
    assert_eq!(faces.len(), 6);
    let distinct: HashSet<&String> = faces.iter().collect();
    assert_eq!(distinct.len(), 6);
    assert_eq!(faces[0], "Alan.PNG");
    assert_eq!(faces[5], "Smormu.PNG");
}

#[test]
fn random_cubes_stay_in_the_scatter_box() {
    for seed in 0..32 {
        for object in &blueprint(seed).objects[3..] {
            for c in [object.position.x, object.position.y, object.position.z] {
                assert!((-5.0..5.0).contains(&c), "seed {seed}: {c} outside [-5, 5)");
            }
            let Surface::Phong(color) = object.surface else {
                panic!("random cubes are Phong shaded");
            };
            assert!(color <= 0xffffff);
        }
    }
}

#[test]
fn same_seed_same_scene() {
    assert_eq!(blueprint(42), blueprint(42));
    assert_ne!(blueprint(42).objects, blueprint(43).objects);
}

#[test]
fn model_sits_behind_the_cube_at_half_scale() {
    let blueprint = blueprint(1);
    assert_eq!(blueprint.model_transform.position, Vector3::new(0.0, 0.2, -1.0));
    assert_eq!(blueprint.model_transform.scale, Vector3::new(0.5, 0.5, 0.5));
}

#[test]
fn camera_defaults() {
    let camera = SceneConfig::default().camera;
    assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));
    assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(camera.fovy, Deg(75.0));
    assert_eq!((camera.znear, camera.zfar), (0.1, 100.0));
    assert_eq!(camera.damping_factor, 0.05);
}
