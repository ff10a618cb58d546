use crate::error::RenderError;

use super::backend::{GpuDevice, ProgramDescriptor, RenderState};
use super::context::GraphicsContext;
use super::mode::RenderMode;
use super::primitives::PrimitiveKind;
use super::shader::{ShaderSource, FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Compiled programs for one primitive kind, one per render mode.
pub struct Pipeline<D: GpuDevice> {
    kind: PrimitiveKind,
    solid: D::Program,
    wireframe: D::Program,
}

impl<D: GpuDevice> Pipeline<D> {
    pub fn build(ctx: &mut GraphicsContext<D>, kind: PrimitiveKind) -> Result<Self, RenderError> {
        Self::build_from_source(ctx, kind, ShaderSource::for_kind(kind))
    }

    /// Builds the pipeline from explicit WGSL instead of the kind's builtin shader.
    pub fn build_from_source(
        ctx: &mut GraphicsContext<D>,
        kind: PrimitiveKind,
        source: ShaderSource<'_>,
    ) -> Result<Self, RenderError> {
        source.validate()?;

        let solid = Self::compile(ctx, kind, &source, RenderMode::Solid)?;
        let wireframe = Self::compile(ctx, kind, &source, RenderMode::Wireframe)?;

        log::info!("Built {} pipeline ('{}')", kind.name(), source.label);

        Ok(Self {
            kind,
            solid,
            wireframe,
        })
    }

    fn compile(
        ctx: &mut GraphicsContext<D>,
        kind: PrimitiveKind,
        source: &ShaderSource<'_>,
        mode: RenderMode,
    ) -> Result<D::Program, RenderError> {
        let label = match mode {
            RenderMode::Solid => format!("{}.solid", kind.name()),
            RenderMode::Wireframe => format!("{}.wireframe", kind.name()),
        };

        ctx.device_mut().create_program(&ProgramDescriptor {
            label: &label,
            wgsl: source.wgsl,
            vertex_entry: VERTEX_ENTRY,
            fragment_entry: FRAGMENT_ENTRY,
            state: render_state(kind, mode),
        })
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn program(&self, mode: RenderMode) -> &D::Program {
        match mode {
            RenderMode::Solid => &self.solid,
            RenderMode::Wireframe => &self.wireframe,
        }
    }
}

/// Fixed-function state for a kind/mode pair.
///
/// Solid primitives cull back faces; flat primitives and outlines draw both sides.
pub fn render_state(kind: PrimitiveKind, mode: RenderMode) -> RenderState {
    let cull_mode = match mode {
        RenderMode::Solid if kind.is_solid() => Some(wgpu::Face::Back),
        _ => None,
    };

    RenderState {
        topology: mode.topology(),
        cull_mode,
        depth_test: true,
        blend: Some(wgpu::BlendState::REPLACE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::HeadlessHost;

    #[test]
    fn render_states_follow_kind_and_mode() {
        let cube_solid = render_state(PrimitiveKind::Cube, RenderMode::Solid);
        assert_eq!(cube_solid.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(cube_solid.topology, wgpu::PrimitiveTopology::TriangleList);

        let cube_wire = render_state(PrimitiveKind::Cube, RenderMode::Wireframe);
        assert_eq!(cube_wire.cull_mode, None);
        assert_eq!(cube_wire.topology, wgpu::PrimitiveTopology::LineList);

        let tri_solid = render_state(PrimitiveKind::Triangle, RenderMode::Solid);
        assert_eq!(tri_solid.cull_mode, None);
        assert!(tri_solid.depth_test);
    }

    #[test]
    fn build_compiles_one_program_per_mode() {
        let host = HeadlessHost::new().with_surface("s", 8, 8);
        let mut ctx = GraphicsContext::create(&host, "s").unwrap();
        let pipeline = Pipeline::build(&mut ctx, PrimitiveKind::Cube).unwrap();

        assert_eq!(pipeline.kind(), PrimitiveKind::Cube);
        assert_eq!(pipeline.program(RenderMode::Solid).label(), "cube.solid");
        assert_eq!(
            pipeline.program(RenderMode::Wireframe).label(),
            "cube.wireframe"
        );
    }

    #[test]
    fn invalid_source_fails_with_compile_error() {
        let host = HeadlessHost::new().with_surface("s", 8, 8);
        let mut ctx = GraphicsContext::create(&host, "s").unwrap();
        let source = ShaderSource {
            label: "bad",
            wgsl: "fn vs_main() -> { }",
        };
        let result = Pipeline::build_from_source(&mut ctx, PrimitiveKind::Triangle, source);
        assert!(matches!(result, Err(RenderError::ShaderCompile { .. })));
    }
}
