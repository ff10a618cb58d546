use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::RenderMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Size used by `render_default`.
    #[serde(default)]
    pub resolution: Resolution,
    /// Mode used by `render_default`.
    #[serde(default)]
    pub default_mode: RenderMode,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default = "RenderSettings::default_clear_color")]
    pub clear_color: [f32; 4],
    /// Rotation speed; 0.1 matches an elapsed time divided by ten, in degrees.
    #[serde(default = "RenderSettings::default_degrees_per_ms")]
    pub degrees_per_ms: f32,
    #[serde(default = "RenderSettings::default_fov_y_degrees")]
    pub fov_y_degrees: f32,
    #[serde(default = "RenderSettings::default_camera_distance")]
    pub camera_distance: f32,
    #[serde(default = "RenderSettings::default_near")]
    pub near: f32,
    #[serde(default = "RenderSettings::default_far")]
    pub far: f32,
    #[serde(default = "RenderSettings::default_light_direction")]
    pub light_direction: [f32; 3],
    #[serde(default = "RenderSettings::default_ambient")]
    pub ambient: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            default_mode: RenderMode::default(),
            present_mode: PresentModeSetting::default(),
            clear_color: Self::default_clear_color(),
            degrees_per_ms: Self::default_degrees_per_ms(),
            fov_y_degrees: Self::default_fov_y_degrees(),
            camera_distance: Self::default_camera_distance(),
            near: Self::default_near(),
            far: Self::default_far(),
            light_direction: Self::default_light_direction(),
            ambient: Self::default_ambient(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            info!("Using default render settings for WebAssembly build");
            return Self::default();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::load_from_path("settings.json")
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    /// Parses and validates settings from a JSON document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RenderSettings>(contents).map(Self::validate)
    }

    pub fn validate(mut self) -> Self {
        let defaults = Self::default();

        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = defaults.resolution;
        }

        if !self.degrees_per_ms.is_finite() {
            warn!("Angular velocity must be finite. Using default value.");
            self.degrees_per_ms = defaults.degrees_per_ms;
        }

        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            warn!(
                "Field of view {} is outside (0, 180). Using default value.",
                self.fov_y_degrees
            );
            self.fov_y_degrees = defaults.fov_y_degrees;
        }

        if !(self.near > 0.0 && self.far > self.near) {
            warn!(
                "Clip planes near={} far={} are invalid. Using default planes.",
                self.near, self.far
            );
            self.near = defaults.near;
            self.far = defaults.far;
        }

        if !(self.camera_distance > self.near && self.camera_distance < self.far) {
            warn!("Camera distance must lie between the clip planes. Using default value.");
            self.camera_distance = defaults.camera_distance;
        }

        if glam::Vec3::from_array(self.light_direction).length_squared() <= f32::EPSILON {
            warn!("Light direction must be non-zero. Using default direction.");
            self.light_direction = defaults.light_direction;
        }

        self.ambient = self.ambient.clamp(0.0, 1.0);

        self
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    const fn default_clear_color() -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }

    const fn default_degrees_per_ms() -> f32 {
        0.1
    }

    const fn default_fov_y_degrees() -> f32 {
        45.0
    }

    const fn default_camera_distance() -> f32 {
        3.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        100.0
    }

    const fn default_light_direction() -> [f32; 3] {
        [-0.4, -0.7, -1.0]
    }

    const fn default_ambient() -> f32 {
        0.2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> RenderSettings {
        RenderSettings {
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            degrees_per_ms: f32::NAN,
            fov_y_degrees: 190.0,
            near: 5.0,
            far: 1.0,
            camera_distance: 500.0,
            light_direction: [0.0, 0.0, 0.0],
            ambient: 3.0,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();
        let defaults = RenderSettings::default();

        assert_eq!(validated.resolution, defaults.resolution);
        assert_eq!(validated.degrees_per_ms, defaults.degrees_per_ms);
        assert_eq!(validated.fov_y_degrees, defaults.fov_y_degrees);
        assert_eq!(validated.near, defaults.near);
        assert_eq!(validated.far, defaults.far);
        assert_eq!(validated.camera_distance, defaults.camera_distance);
        assert_eq!(validated.light_direction, defaults.light_direction);
        assert_eq!(validated.ambient, 1.0);
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = RenderSettings {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            degrees_per_ms: 0.36,
            fov_y_degrees: 60.0,
            camera_distance: 6.0,
            ..RenderSettings::default()
        };

        let validated = valid.clone().validate();

        assert_eq!(validated.resolution, valid.resolution);
        assert_eq!(validated.degrees_per_ms, valid.degrees_per_ms);
        assert_eq!(validated.fov_y_degrees, valid.fov_y_degrees);
        assert_eq!(validated.camera_distance, valid.camera_distance);
    }

    #[test]
    fn from_json_fills_missing_fields_with_defaults() {
        let settings =
            RenderSettings::from_json(r#"{ "default_mode": "wireframe", "degrees_per_ms": 1.0 }"#)
                .expect("valid json");

        assert_eq!(settings.default_mode, RenderMode::Wireframe);
        assert_eq!(settings.degrees_per_ms, 1.0);
        assert_eq!(settings.resolution, Resolution::default());
        assert_eq!(settings.present_mode, PresentModeSetting::Fifo);
    }

    #[test]
    fn from_json_rejects_malformed_documents() {
        assert!(RenderSettings::from_json("{ not json").is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_settings_file_falls_back_to_defaults() {
        let settings = RenderSettings::load_from_path("does/not/exist/settings.json");
        assert_eq!(settings.resolution, Resolution::default());
    }

    #[test]
    fn present_mode_returns_desired_when_available() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];

        assert_eq!(
            settings.present_mode(&available),
            wgpu::PresentMode::Mailbox
        );
    }

    #[test]
    fn present_mode_falls_back_to_fifo_when_desired_missing() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];

        assert_eq!(settings.present_mode(&available), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn present_mode_uses_first_available_when_fifo_missing() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [wgpu::PresentMode::Immediate];

        assert_eq!(
            settings.present_mode(&available),
            wgpu::PresentMode::Immediate
        );
    }
}
