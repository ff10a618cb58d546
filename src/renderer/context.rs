use crate::error::RenderError;

use super::backend::{DrawCommand, Extent, FrameSubmission, GpuDevice, PresentOutcome, SurfaceHost};
use super::TransformUniform;

/// Connection to one drawing surface plus the draws buffered for the next present.
pub struct GraphicsContext<D: GpuDevice> {
    surface_id: String,
    device: D,
    viewport: Extent,
    clear_color: wgpu::Color,
    pending: Vec<DrawCommand<D::Program, D::Mesh>>,
    frames_presented: u64,
}

impl<D: GpuDevice> GraphicsContext<D> {
    /// Resolves `surface_id` through `host` and opens a device sized to the surface.
    pub fn create<H>(host: &H, surface_id: &str) -> Result<Self, RenderError>
    where
        H: SurfaceHost<Device = D>,
    {
        let device = host.connect(surface_id)?;
        let viewport = device.surface_extent();
        log::info!(
            "Graphics context ready on '{}' ({}x{})",
            surface_id,
            viewport.width,
            viewport.height
        );

        Ok(Self {
            surface_id: surface_id.to_owned(),
            device,
            viewport,
            clear_color: wgpu::Color::BLACK,
            pending: Vec::new(),
            frames_presented: 0,
        })
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn viewport(&self) -> Extent {
        self.viewport
    }

    /// Size of the surface itself, which may differ from the viewport.
    pub fn surface_extent(&self) -> Extent {
        self.device.surface_extent()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    pub fn is_lost(&self) -> bool {
        self.device.is_lost()
    }

    /// Sets the viewport. The surface is only reconfigured when the size changes.
    ///
    /// Returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool, RenderError> {
        let extent = Extent::new(width, height);
        if extent == self.viewport {
            return Ok(false);
        }

        self.device.configure(extent)?;
        log::debug!(
            "Resized '{}' from {}x{} to {}x{}",
            self.surface_id,
            self.viewport.width,
            self.viewport.height,
            extent.width,
            extent.height
        );
        self.viewport = extent;
        Ok(true)
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn upload_transform(&mut self, program: &D::Program, uniform: &TransformUniform) {
        self.device.write_uniforms(program, uniform);
    }

    /// Buffers an indexed draw; nothing reaches the surface before `present`.
    pub fn draw(&mut self, program: &D::Program, mesh: &D::Mesh) {
        self.pending.push(DrawCommand {
            program: program.clone(),
            mesh: mesh.clone(),
        });
    }

    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Submits the buffered draws and shows the frame.
    ///
    /// Returns `false` when the backend skipped the frame.
    pub fn present(&mut self) -> Result<bool, RenderError> {
        let draws = std::mem::take(&mut self.pending);
        let outcome = self.device.submit(FrameSubmission {
            viewport: self.viewport,
            clear_color: self.clear_color,
            draws: &draws,
        })?;

        match outcome {
            PresentOutcome::Presented => {
                self.frames_presented += 1;
                Ok(true)
            }
            PresentOutcome::Skipped => {
                log::warn!("Frame skipped on '{}'", self.surface_id);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::HeadlessHost;

    #[test]
    fn create_fails_for_unknown_surface() {
        let host = HeadlessHost::new();
        let result = GraphicsContext::create(&host, "nowhere");
        assert!(matches!(result, Err(RenderError::SurfaceNotFound { .. })));
    }

    #[test]
    fn context_starts_at_surface_size() {
        let host = HeadlessHost::new().with_surface("s", 640, 480);
        let ctx = GraphicsContext::create(&host, "s").unwrap();
        assert_eq!(ctx.viewport(), Extent::new(640, 480));
        assert_eq!(ctx.surface_id(), "s");
    }

    #[test]
    fn resize_is_idempotent() {
        let host = HeadlessHost::new().with_surface("s", 640, 480);
        let mut ctx = GraphicsContext::create(&host, "s").unwrap();

        assert!(!ctx.resize(640, 480).unwrap());
        assert!(ctx.resize(800, 800).unwrap());
        assert!(!ctx.resize(800, 800).unwrap());
        assert_eq!(
            host.configured_extents("s"),
            vec![Extent::new(640, 480), Extent::new(800, 800)]
        );
    }

    #[test]
    fn nothing_is_visible_before_present() {
        let host = HeadlessHost::new().with_surface("s", 8, 8);
        let mut ctx = GraphicsContext::create(&host, "s").unwrap();
        assert!(host.frames("s").is_empty());

        assert!(ctx.present().unwrap());
        assert_eq!(host.frames("s").len(), 1);
        assert_eq!(ctx.frames_presented(), 1);
        assert_eq!(ctx.pending_draws(), 0);
    }
}
