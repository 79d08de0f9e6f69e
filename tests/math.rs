//! Randomized checks on the quaternion and color helpers.

use cgmath::{InnerSpace, Matrix4, Rad, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use facet3d::prelude::*;

const EPS: f64 = 1e-6;

fn random_axis(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if v.magnitude() > 0.1 {
            return v.normalize();
        }
    }
}

fn same_rotation(a: &Quaternion, b: &Quaternion) -> bool {
    (a.dot(b).abs() - 1.0).abs() < EPS
}

#[test]
fn rotation_matrix_extraction_ignores_uniform_scale() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let axis = random_axis(&mut rng);
        let angle = rng.random_range(0.1..3.0);
        let scale = rng.random_range(0.5..4.0);

        let m = Matrix4::from_axis_angle(axis, Rad(angle)) * Matrix4::from_scale(scale);
        let extracted = Quaternion::from_rotation_matrix(&m);
        let expected = Quaternion::from_axis_angle(axis, angle);

        assert!((extracted.length() - 1.0).abs() < EPS);
        assert!(same_rotation(&extracted, &expected));
    }
}

#[test]
fn rotation_preserves_length() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..200 {
        let q = Quaternion::from_axis_angle(random_axis(&mut rng), rng.random_range(-3.0..3.0));
        let v = Vector3::new(
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
        );
        assert!((q.rotate_vector(v).magnitude() - v.magnitude()).abs() < EPS);
    }
}

#[test]
fn slerp_hits_both_endpoints() {
    let mut rng = StdRng::seed_from_u64(13);

    for _ in 0..200 {
        let a = Quaternion::from_axis_angle(random_axis(&mut rng), rng.random_range(-3.0..3.0));
        let b = Quaternion::from_axis_angle(random_axis(&mut rng), rng.random_range(-3.0..3.0));
        if a.dot(&b).abs() > 0.9999 {
            continue;
        }

        assert!(same_rotation(&Quaternion::slerp(&a, &b, 0.0), &a));
        assert!(same_rotation(&Quaternion::slerp(&a, &b, 1.0), &b));

        let mid = Quaternion::slerp(&a, &b, 0.5);
        assert!((mid.length() - 1.0).abs() < EPS);
    }
}

#[test]
fn every_hex_survives_a_round_trip() {
    let mut c = Color::default();
    for hex in 0..=0xFFFFFFu32 {
        c.set_hex(hex);
        assert_eq!(c.hex(), hex);
    }
}

#[test]
fn hex_components_land_on_byte_steps() {
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..1000 {
        let hex = rng.random_range(0..=0xFFFFFFu32);
        let c = Color::from_hex(hex);
        for (component, shift) in [(c.r(), 16), (c.g(), 8), (c.b(), 0)] {
            let byte = (hex >> shift) & 0xFF;
            assert!((component * 255.0 - byte as f64).abs() < EPS);
        }

        let mut edited = c;
        edited.set_rgb(0.25, 0.5, 0.75);
        assert_eq!(edited.hex(), hex);
    }
}
