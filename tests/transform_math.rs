//! Tests for the per-frame transform math.
//!
//! Conventions used in this codebase:
//! - Right-handed view space (camera looks down -Z from +Z).
//! - Clip/NDC depth range is [0, 1] (wgpu). Near -> 0, Far -> 1.
//! - Rotation angle in degrees is elapsed milliseconds times `degrees_per_ms`.
//!
use glam::{Vec3, Vec4};

use wgpu_primitives::renderer::camera::{rotation_angle, Camera, FrameTransform};
use wgpu_primitives::{PrimitiveKind, RenderSettings};

fn to_ndc(transform: &FrameTransform, point: Vec3) -> Vec3 {
    let clip: Vec4 = transform.view_proj() * transform.model * point.extend(1.0);
    clip.truncate() / clip.w
}

fn approx_eq3(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

#[test]
fn perspective_maps_near_far_to_wgpu_depth_range() {
    let settings = RenderSettings::default();
    let camera = Camera::from_settings(&settings);
    let proj = camera.proj(1.0);

    let depth = |z: f32| {
        let clip = proj * Vec4::new(0.0, 0.0, z, 1.0);
        clip.z / clip.w
    };

    assert!(depth(-settings.near).abs() < 1e-5, "near -> {}", depth(-settings.near));
    assert!((depth(-settings.far) - 1.0).abs() < 1e-5, "far -> {}", depth(-settings.far));
}

#[test]
fn cube_spins_around_its_tilted_axis() {
    let settings = RenderSettings::default();
    let axis = PrimitiveKind::Cube.spin_axis();

    for elapsed in [0.0, 250.0, 1000.0, 3600.0] {
        let t = FrameTransform::at(PrimitiveKind::Cube, elapsed, 1.0, &settings);
        let moved = t.model.transform_vector3(axis);
        assert!(
            approx_eq3(moved, axis, 1e-5),
            "axis moved at {}ms: {:?}",
            elapsed,
            moved
        );
    }
}

#[test]
fn triangle_stays_in_the_view_plane() {
    let settings = RenderSettings::default();
    let t = FrameTransform::at(PrimitiveKind::Triangle, 777.0, 1.0, &settings);

    for corner in [Vec3::new(0.0, 0.8, 0.0), Vec3::new(0.8, -0.4, 0.0)] {
        let moved = t.model.transform_point3(corner);
        assert!(moved.z.abs() < 1e-6);
        assert!((moved.length() - corner.length()).abs() < 1e-5);
    }
}

#[test]
fn full_turn_returns_to_start() {
    let settings = RenderSettings::default();
    let full_turn_ms = 360.0 / settings.degrees_per_ms as f64;

    let start = FrameTransform::at(PrimitiveKind::Cube, 0.0, 1.0, &settings);
    let end = FrameTransform::at(PrimitiveKind::Cube, full_turn_ms, 1.0, &settings);

    let corner = Vec3::new(0.5, 0.5, 0.5);
    assert!(approx_eq3(
        start.model.transform_point3(corner),
        end.model.transform_point3(corner),
        1e-4
    ));
}

#[test]
fn wide_viewport_squeezes_horizontally() {
    let settings = RenderSettings::default();
    let square = FrameTransform::at(PrimitiveKind::Triangle, 0.0, 1.0, &settings);
    let wide = FrameTransform::at(PrimitiveKind::Triangle, 0.0, 2.0, &settings);

    let point = Vec3::new(0.8, -0.4, 0.0);
    let a = to_ndc(&square, point);
    let b = to_ndc(&wide, point);

    assert!((b.x - a.x / 2.0).abs() < 1e-5);
    assert!((b.y - a.y).abs() < 1e-5);
}

#[test]
fn negative_time_rotates_backwards() {
    let rate = RenderSettings::default().degrees_per_ms;
    assert_eq!(rotation_angle(-500.0, rate), -rotation_angle(500.0, rate));
}
