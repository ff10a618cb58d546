//! Seam between the rendering core and whatever actually owns surfaces and GPUs.
//!
//! `GraphicsContext` and `Pipeline` are written against these traits. The production
//! implementation is [`wgpu_backend`]; [`headless`] records frames instead of drawing
//! them.

pub mod headless;
pub mod wgpu_backend;

pub use headless::{HeadlessDevice, HeadlessHost, PresentedFrame, RecordedDraw};
pub use wgpu_backend::{WgpuDevice, WgpuHost};

use crate::error::RenderError;
use crate::renderer::{TransformUniform, Vertex};

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    /// Zero dimensions are clamped to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Fixed-function state baked into a program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_test: bool,
    pub blend: Option<wgpu::BlendState>,
}

/// Everything a backend needs to build one program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub wgsl: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub state: RenderState,
}

/// One buffered indexed draw.
#[derive(Debug, Clone)]
pub struct DrawCommand<P, M> {
    pub program: P,
    pub mesh: M,
}

/// A frame handed to the backend for submission and presentation.
#[derive(Debug)]
pub struct FrameSubmission<'a, P, M> {
    pub viewport: Extent,
    pub clear_color: wgpu::Color,
    pub draws: &'a [DrawCommand<P, M>],
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// The surface had no image to give (timeout); nothing was shown.
    Skipped,
}

/// Resolves surface ids and opens devices on them.
pub trait SurfaceHost {
    type Device: GpuDevice;

    /// Whether `surface_id` currently names a drawable surface.
    fn has_surface(&self, surface_id: &str) -> bool;

    /// Opens a device/context pair on the surface, sized to the surface.
    fn connect(&self, surface_id: &str) -> Result<Self::Device, RenderError>;
}

/// A device bound to one surface.
pub trait GpuDevice {
    type Program: Clone;
    type Mesh: Clone;

    /// Current size of the underlying surface.
    fn surface_extent(&self) -> Extent;

    /// True once the device or its surface can no longer be used.
    fn is_lost(&self) -> bool;

    /// Reconfigures the swap chain to `extent`.
    fn configure(&mut self, extent: Extent) -> Result<(), RenderError>;

    fn create_program(
        &mut self,
        desc: &ProgramDescriptor<'_>,
    ) -> Result<Self::Program, RenderError>;

    fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<Self::Mesh, RenderError>;

    /// Uploads the transform block read by `program`.
    fn write_uniforms(&mut self, program: &Self::Program, uniform: &TransformUniform);

    /// Encodes the draws, submits them and presents the frame.
    fn submit(
        &mut self,
        frame: FrameSubmission<'_, Self::Program, Self::Mesh>,
    ) -> Result<PresentOutcome, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_clamps_zero_dimensions() {
        assert_eq!(Extent::new(0, 0), Extent { width: 1, height: 1 });
        assert_eq!(Extent::new(800, 600), Extent { width: 800, height: 600 });
    }
}
