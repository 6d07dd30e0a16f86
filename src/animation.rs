//! Time-driven spinning of the rotating-object list.

use cgmath::Rad;

use crate::data_structures::instance::Transform;

/// Spin speed multiplier for the object at `index` on the rotating list.
pub fn spin_speed(index: usize, step: f32) -> f32 {
    1.0 + index as f32 * step
}

/// Rotation angle in radians after `elapsed` seconds at `index`.
pub fn spin_angle(index: usize, step: f32, elapsed: f32) -> Rad<f32> {
    Rad(elapsed * spin_speed(index, step))
}

/// Sets the X and Y rotation of the items named by `listed` to their spin angle.
///
/// Entry `i` of `listed` gets speed `1 + i * step`, whatever its position in
/// `items`. Items not on the list are left alone; out of range entries are
/// skipped. The angle is absolute, not accumulated, so skipped or repeated
/// frames never drift.
pub fn spin_listed<T>(
    items: &mut [T],
    listed: &[usize],
    step: f32,
    elapsed: f32,
    transform: impl Fn(&mut T) -> &mut Transform,
) {
    for (rank, &index) in listed.iter().enumerate() {
        if let Some(item) = items.get_mut(index) {
            spin_to(transform(item), spin_angle(rank, step, elapsed));
        }
    }
}

fn spin_to(transform: &mut Transform, angle: Rad<f32>) {
    transform.rotation.x = angle;
    transform.rotation.y = angle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_grows_a_tenth_per_index() {
        assert_eq!(spin_speed(0, 0.1), 1.0);
        assert_eq!(spin_speed(10, 0.1), 1.0 + 10.0 * 0.1);
    }

    #[test]
    fn spin_sets_both_axes_and_leaves_z() {
        let mut transforms = vec![Transform::new(); 4];
        transforms[2].rotation.z = Rad(0.25);
        spin_listed(&mut transforms, &[0, 1, 2, 3], 0.1, 2.0, |t| t);
        for (i, t) in transforms.iter().enumerate() {
            let expected = Rad(2.0 * (1.0 + i as f32 * 0.1));
            assert_eq!(t.rotation.x, expected);
            assert_eq!(t.rotation.y, expected);
        }
        assert_eq!(transforms[2].rotation.z, Rad(0.25));
    }

    #[test]
    fn listed_items_spin_by_their_list_position() {
        let mut transforms = vec![Transform::new(); 5];
        spin_listed(&mut transforms, &[3, 0, 4, 9], 0.1, 2.0, |t| t);

        assert_eq!(transforms[3].rotation.x, Rad(2.0));
        assert_eq!(transforms[0].rotation.y, Rad(2.0 * 1.1));
        assert_eq!(transforms[4].rotation.x, Rad(2.0 * (1.0 + 2.0 * 0.1)));
        for untouched in [1, 2] {
            assert_eq!(transforms[untouched].rotation.x, Rad(0.0));
            assert_eq!(transforms[untouched].rotation.y, Rad(0.0));
        }
    }

    #[test]
    fn zero_elapsed_means_no_rotation() {
        let mut transforms = vec![Transform::new(); 3];
        spin_listed(&mut transforms, &[0, 1, 2], 0.1, 0.0, |t| t);
        assert!(transforms.iter().all(|t| t.rotation.x == Rad(0.0) && t.rotation.y == Rad(0.0)));
    }
}
