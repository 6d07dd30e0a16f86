use cgmath::{Matrix4, Rad, Vector4};
use orbit_scene::{
    animation,
    clock::FrameClock,
    data_structures::instance::Transform,
};

use crate::common::test_utils::blueprint;

mod common;

#[test]
fn every_rotating_object_follows_its_own_speed() {
    let mut transforms: Vec<Transform> = blueprint(3)
        .objects
        .iter()
        .map(|o| Transform::at(o.position))
        .collect();
    let order: Vec<usize> = (0..transforms.len()).collect();
    for t in [0.0f32, 0.5, 1.0, 12.25] {
        animation::spin_listed(&mut transforms, &order, 0.1, t, |transform| transform);
        for (i, transform) in transforms.iter().enumerate() {
            let expected = Rad(t * (1.0 + i as f32 * 0.1));
            assert_eq!(transform.rotation.x, expected);
            assert_eq!(transform.rotation.y, expected);
        }
    }
}

#[test]
fn spinning_keeps_the_position() {
    let mut transforms = vec![Transform::at([1.0, -2.0, 3.0].into())];
    animation::spin_listed(&mut transforms, &[0], 0.1, 4.0, |t| t);
    let matrix: Matrix4<f32> = transforms[0].to_matrix();
    assert_eq!(matrix * Vector4::new(0.0, 0.0, 0.0, 1.0), Vector4::new(1.0, -2.0, 3.0, 1.0));
}

#[test]
fn clock_ticks_once_per_redraw() {
    let start = instant::Instant::now();
    let mut clock = FrameClock::starting_at(start);
    let mut last = 0.0;
    for i in 0..100u64 {
        let tick = clock.tick_at(start + instant::Duration::from_millis(16 * (i + 1)));
        assert_eq!(tick.frame, i);
        assert!(tick.elapsed > last);
        last = tick.elapsed;
    }
    assert_eq!(clock.tick().frame, 100);
}
