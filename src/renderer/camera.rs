use glam::{Mat4, Quat, Vec3};

use super::primitives::PrimitiveKind;
use super::uniforms::TransformUniform;
use crate::settings::RenderSettings;

/// Fixed camera on +Z looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, settings.camera_distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: settings.fov_y_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Right-handed perspective with wgpu's [0, 1] depth range.
    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

/// Model, view and projection for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// Rotation applied to the model, in radians.
    pub angle: f32,
}

impl FrameTransform {
    /// Derives the frame transform from the caller's elapsed time.
    ///
    /// The time is used as is: NaN or negative values flow straight into the matrices.
    pub fn at(
        kind: PrimitiveKind,
        elapsed_ms: f64,
        aspect: f32,
        settings: &RenderSettings,
    ) -> Self {
        let angle = rotation_angle(elapsed_ms, settings.degrees_per_ms);
        let camera = Camera::from_settings(settings);
        Self {
            model: Mat4::from_quat(Quat::from_axis_angle(kind.spin_axis(), angle)),
            view: camera.view(),
            projection: camera.proj(aspect),
            angle,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn to_uniform(&self, settings: &RenderSettings) -> TransformUniform {
        TransformUniform::from_matrices(
            self.model,
            self.view_proj(),
            Vec3::from_array(settings.light_direction),
            settings.ambient,
        )
    }
}

/// Radians for `elapsed_ms` at `degrees_per_ms`.
pub fn rotation_angle(elapsed_ms: f64, degrees_per_ms: f32) -> f32 {
    ((elapsed_ms * degrees_per_ms as f64) as f32).to_radians()
}

pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
