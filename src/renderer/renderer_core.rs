// renderer/renderer_core.rs
use crate::error::RenderError;
use crate::settings::RenderSettings;
use crate::time::{FrameClock, SystemClock};

use super::backend::{Extent, GpuDevice, SurfaceHost};
use super::camera::{aspect_ratio, FrameTransform};
use super::context::GraphicsContext;
use super::mode::RenderMode;
use super::pipeline::Pipeline;
use super::primitives::{GeometryDescriptor, PrimitiveKind};
use super::shader::ShaderSource;

/// GPU-side objects built on the first frame and thrown away on context loss.
struct Resources<D: GpuDevice> {
    context: GraphicsContext<D>,
    pipeline: Pipeline<D>,
    solid_mesh: D::Mesh,
    wireframe_mesh: D::Mesh,
}

enum CoreState<D: GpuDevice> {
    Uninitialized,
    Ready(Resources<D>),
}

/// State and frame logic shared by every primitive renderer.
///
/// Construction only checks that the surface exists. The graphics context, pipeline
/// and meshes are built on the first `render` and kept until the context is lost.
pub struct RenderCore<H: SurfaceHost> {
    host: H,
    surface_id: String,
    kind: PrimitiveKind,
    settings: RenderSettings,
    shader: ShaderSource<'static>,
    geometry: Option<GeometryDescriptor>,
    state: CoreState<H::Device>,
    clock: SystemClock,
    build_count: u32,
    last_transform: Option<FrameTransform>,
}

impl<H: SurfaceHost> RenderCore<H> {
    pub fn new(host: H, surface_id: &str, kind: PrimitiveKind) -> Result<Self, RenderError> {
        Self::with_settings(host, surface_id, kind, RenderSettings::default())
    }

    pub fn with_settings(
        host: H,
        surface_id: &str,
        kind: PrimitiveKind,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        if !host.has_surface(surface_id) {
            log::warn!("No drawable surface named '{}'", surface_id);
            return Err(RenderError::surface_not_found(surface_id));
        }

        log::debug!("Created {} renderer for '{}'", kind.name(), surface_id);

        Ok(Self {
            host,
            surface_id: surface_id.to_owned(),
            kind,
            settings,
            shader: ShaderSource::for_kind(kind),
            geometry: None,
            state: CoreState::Uninitialized,
            clock: SystemClock::new(),
            build_count: 0,
            last_transform: None,
        })
    }

    /// Replaces the builtin shader. Takes effect on the next build.
    pub fn with_shader(mut self, shader: ShaderSource<'static>) -> Self {
        self.set_shader(shader);
        self
    }

    /// Like `with_shader`, for a renderer that is already drawing. The current
    /// pipeline is kept until the next rebuild.
    pub fn set_shader(&mut self, shader: ShaderSource<'static>) {
        self.shader = shader;
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, CoreState::Ready(_))
    }

    /// How many times the context, pipeline and meshes have been built.
    pub fn build_count(&self) -> u32 {
        self.build_count
    }

    /// Transform of the last presented frame.
    pub fn last_transform(&self) -> Option<FrameTransform> {
        self.last_transform
    }

    pub fn viewport(&self) -> Option<Extent> {
        match &self.state {
            CoreState::Ready(resources) => Some(resources.context.viewport()),
            CoreState::Uninitialized => None,
        }
    }

    pub fn geometry(&self) -> Option<&GeometryDescriptor> {
        self.geometry.as_ref()
    }

    /// Draws and presents one frame.
    ///
    /// `mode` is decoded before anything else; an unknown value leaves the renderer
    /// untouched.
    pub fn render(
        &mut self,
        width: u32,
        height: u32,
        elapsed_ms: f64,
        mode: i32,
    ) -> Result<(), RenderError> {
        let mode = RenderMode::try_from(mode)?;
        self.render_mode(width, height, elapsed_ms, mode)
    }

    /// Renders at the surface's current size in the configured default mode, timed by
    /// the renderer's own clock. The surface is never resized by this call.
    pub fn render_default(&mut self) -> Result<(), RenderError> {
        let elapsed_ms = self.clock.elapsed_ms();
        let mode = self.settings.default_mode;
        let extent = self.ensure_ready()?.context.surface_extent();
        self.render_mode(extent.width, extent.height, elapsed_ms, mode)
    }

    pub fn render_with_clock<C: FrameClock>(
        &mut self,
        clock: &mut C,
        width: u32,
        height: u32,
        mode: i32,
    ) -> Result<(), RenderError> {
        let mode = RenderMode::try_from(mode)?;
        let elapsed_ms = clock.elapsed_ms();
        self.render_mode(width, height, elapsed_ms, mode)
    }

    pub fn render_mode(
        &mut self,
        width: u32,
        height: u32,
        elapsed_ms: f64,
        mode: RenderMode,
    ) -> Result<(), RenderError> {
        let mut rebuilt = false;
        if let CoreState::Ready(resources) = &self.state {
            if resources.context.is_lost() {
                log::warn!("Context on '{}' was lost, rebuilding", self.surface_id);
                self.state = CoreState::Uninitialized;
                rebuilt = true;
            }
        }

        match self.draw_frame(width, height, elapsed_ms, mode) {
            // At most one rebuild per frame.
            Err(RenderError::ContextLost) if rebuilt => {
                log::warn!(
                    "Context on '{}' lost again after rebuilding, giving up on this frame",
                    self.surface_id
                );
                self.state = CoreState::Uninitialized;
                Err(RenderError::ContextLost)
            }
            Err(RenderError::ContextLost) => {
                log::warn!(
                    "Context on '{}' lost during the frame, rebuilding once",
                    self.surface_id
                );
                self.state = CoreState::Uninitialized;
                self.draw_frame(width, height, elapsed_ms, mode)
            }
            result => result,
        }
    }

    fn draw_frame(
        &mut self,
        width: u32,
        height: u32,
        elapsed_ms: f64,
        mode: RenderMode,
    ) -> Result<(), RenderError> {
        let transform = FrameTransform::at(
            self.kind,
            elapsed_ms,
            aspect_ratio(width, height),
            &self.settings,
        );
        let uniform = transform.to_uniform(&self.settings);

        let resources = self.ensure_ready()?;
        resources.context.resize(width, height)?;

        let program = resources.pipeline.program(mode);
        let mesh = match mode {
            RenderMode::Solid => &resources.solid_mesh,
            RenderMode::Wireframe => &resources.wireframe_mesh,
        };
        resources.context.upload_transform(program, &uniform);
        resources.context.draw(program, mesh);
        let shown = resources.context.present()?;

        log::trace!(
            "{} frame at {:.1}ms ({:?}, {}x{}, shown: {})",
            self.kind.name(),
            elapsed_ms,
            mode,
            width,
            height,
            shown
        );

        self.last_transform = Some(transform);
        Ok(())
    }

    fn ensure_ready(&mut self) -> Result<&mut Resources<H::Device>, RenderError> {
        if matches!(self.state, CoreState::Uninitialized) {
            let resources = self.build()?;
            self.state = CoreState::Ready(resources);
        }

        match &mut self.state {
            CoreState::Ready(resources) => Ok(resources),
            CoreState::Uninitialized => Err(RenderError::ContextLost),
        }
    }

    fn build(&mut self) -> Result<Resources<H::Device>, RenderError> {
        let kind = self.kind;
        let mut context = GraphicsContext::create(&self.host, &self.surface_id)?;
        context.set_clear_color(self.settings.clear_color());

        let pipeline = Pipeline::build_from_source(&mut context, kind, self.shader)?;

        let geometry = self
            .geometry
            .get_or_insert_with(|| GeometryDescriptor::for_kind(kind));

        let solid_mesh = context.device_mut().create_mesh(
            &format!("{}.triangles", kind.name()),
            geometry.vertices(),
            geometry.indices(RenderMode::Solid),
        )?;
        let wireframe_mesh = context.device_mut().create_mesh(
            &format!("{}.edges", kind.name()),
            geometry.vertices(),
            geometry.indices(RenderMode::Wireframe),
        )?;

        self.build_count += 1;
        log::info!(
            "Built {} resources for '{}' (build #{})",
            kind.name(),
            self.surface_id,
            self.build_count
        );

        Ok(Resources {
            context,
            pipeline,
            solid_mesh,
            wireframe_mesh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::HeadlessHost;

    fn core(host: &HeadlessHost) -> RenderCore<HeadlessHost> {
        RenderCore::new(host.clone(), "canvas", PrimitiveKind::Cube).unwrap()
    }

    #[test]
    fn construction_is_lazy() {
        let host = HeadlessHost::new().with_surface("canvas", 100, 100);
        let renderer = core(&host);

        assert!(!renderer.is_initialized());
        assert!(renderer.geometry().is_none());
        assert_eq!(renderer.viewport(), None);
        assert_eq!(host.connections(), 0);
    }

    #[test]
    fn resources_are_built_once() {
        let host = HeadlessHost::new().with_surface("canvas", 100, 100);
        let mut renderer = core(&host);

        for i in 0..5 {
            renderer.render(100, 100, i as f64 * 16.0, 0).unwrap();
        }

        assert!(renderer.is_initialized());
        assert_eq!(renderer.build_count(), 1);
        assert_eq!(host.connections(), 1);
        assert_eq!(host.frames("canvas").len(), 5);
    }

    #[test]
    fn unknown_mode_changes_nothing() {
        let host = HeadlessHost::new().with_surface("canvas", 100, 100);
        let mut renderer = core(&host);

        assert_eq!(
            renderer.render(100, 100, 0.0, 7),
            Err(RenderError::UnknownRenderMode(7))
        );
        assert!(!renderer.is_initialized());
        assert!(renderer.last_transform().is_none());
        assert!(host.frames("canvas").is_empty());
    }

    #[test]
    fn zero_size_is_clamped() {
        let host = HeadlessHost::new().with_surface("canvas", 100, 100);
        let mut renderer = core(&host);

        renderer.render(0, 0, 0.0, 0).unwrap();
        assert_eq!(renderer.viewport(), Some(Extent::new(1, 1)));
    }

    #[test]
    fn custom_shader_errors_surface_on_first_render() {
        let host = HeadlessHost::new().with_surface("canvas", 100, 100);
        let mut renderer = core(&host).with_shader(ShaderSource {
            label: "broken",
            wgsl: "@vertex fn vs_main( {",
        });

        let err = renderer.render(100, 100, 0.0, 0).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { ref label, .. } if label == "broken"));
        assert!(!renderer.is_initialized());
        assert_eq!(host.live_devices(), 0);
    }
}
