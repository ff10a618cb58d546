use std::num::NonZeroU64;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::{Depth, TransformUniform, Vertex};
use crate::settings::RenderSettings;

use super::{
    Extent, FrameSubmission, GpuDevice, PresentOutcome, ProgramDescriptor, SurfaceHost,
};

/// Where a surface comes from.
#[derive(Clone)]
enum SurfaceSource {
    #[cfg(not(target_arch = "wasm32"))]
    Window(Arc<winit::window::Window>),
    #[cfg(target_arch = "wasm32")]
    Canvas(web_sys::HtmlCanvasElement),
}

impl SurfaceSource {
    fn extent(&self) -> Extent {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            SurfaceSource::Window(window) => {
                let size = window.inner_size();
                Extent::new(size.width, size.height)
            }
            #[cfg(target_arch = "wasm32")]
            SurfaceSource::Canvas(canvas) => Extent::new(canvas.width(), canvas.height()),
        }
    }

    /// A canvas removed from the page can no longer be presented to.
    fn is_detached(&self) -> bool {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            SurfaceSource::Window(_) => false,
            #[cfg(target_arch = "wasm32")]
            SurfaceSource::Canvas(canvas) => !canvas.is_connected(),
        }
    }

    fn target(&self) -> wgpu::SurfaceTarget<'static> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            SurfaceSource::Window(window) => wgpu::SurfaceTarget::from(Arc::clone(window)),
            #[cfg(target_arch = "wasm32")]
            SurfaceSource::Canvas(canvas) => wgpu::SurfaceTarget::Canvas(canvas.clone()),
        }
    }
}

/// Opens wgpu devices on native windows (registered by id) or, on the web, on
/// canvas elements looked up by id in the page document.
pub struct WgpuHost {
    instance: wgpu::Instance,
    settings: RenderSettings,
    #[cfg(not(target_arch = "wasm32"))]
    windows: HashMap<String, Arc<winit::window::Window>>,
}

impl WgpuHost {
    pub fn new(settings: RenderSettings) -> Self {
        // Only GL on the web: its adapter/device futures resolve immediately, so
        // lazy construction can stay synchronous.
        let backends = if cfg!(target_arch = "wasm32") {
            wgpu::Backends::GL
        } else {
            wgpu::Backends::all()
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        Self {
            instance,
            settings,
            #[cfg(not(target_arch = "wasm32"))]
            windows: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Makes `window` resolvable as `surface_id`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn register_window(&mut self, surface_id: &str, window: Arc<winit::window::Window>) {
        self.windows.insert(surface_id.to_owned(), window);
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn unregister_window(&mut self, surface_id: &str) {
        self.windows.remove(surface_id);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn resolve(&self, surface_id: &str) -> Option<SurfaceSource> {
        self.windows
            .get(surface_id)
            .map(|window| SurfaceSource::Window(Arc::clone(window)))
    }

    #[cfg(target_arch = "wasm32")]
    fn resolve(&self, surface_id: &str) -> Option<SurfaceSource> {
        use wasm_bindgen::JsCast;

        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(surface_id))
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            .map(SurfaceSource::Canvas)
    }
}

impl SurfaceHost for WgpuHost {
    type Device = WgpuDevice;

    fn has_surface(&self, surface_id: &str) -> bool {
        self.resolve(surface_id).is_some()
    }

    fn connect(&self, surface_id: &str) -> Result<WgpuDevice, RenderError> {
        let source = self
            .resolve(surface_id)
            .ok_or_else(|| RenderError::surface_not_found(surface_id))?;

        let surface = self
            .instance
            .create_surface(source.target())
            .map_err(|err| RenderError::Backend(format!("failed to create surface: {err}")))?;

        log::info!("Surface '{}' created", surface_id);

        pollster::block_on(WgpuDevice::new(
            &self.instance,
            surface,
            source,
            &self.settings,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct WgpuProgram {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Clone)]
pub struct WgpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Owns the wgpu surface, device and queue for one drawing surface.
pub struct WgpuDevice {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: Depth,
    bind_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    lost: Arc<AtomicBool>,
    source: SurfaceSource,
}

/// Response to a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SurfaceErrorAction {
    Reconfigured,
    SkipFrame,
    Fatal,
}

impl WgpuDevice {
    async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        source: SurfaceSource,
        settings: &RenderSettings,
    ) -> Result<Self, RenderError> {
        let extent = source.extent();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| RenderError::Backend(format!("no suitable adapter: {err}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| RenderError::Backend(format!("failed to create device: {err}")))?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            flag.store(true, Ordering::Release);
            log::error!("Device lost ({:?}): {}", reason, message);
        });

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::Backend("surface has no supported formats".into()))?;

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: extent.width,
            height: extent.height,
            present_mode: settings.present_mode(&surface_caps.present_modes),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = Depth::new(&device, extent);

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("TransformBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(TransformUniform::size()),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("PipelineLayout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            bind_layout,
            pipeline_layout,
            lost,
            source,
        })
    }

    fn map_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.surface.configure(&self.device, &self.config);
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
                SurfaceErrorAction::SkipFrame
            }
        }
    }

    /// Acquires the next swap chain image, reconfiguring once if the surface is stale.
    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(frame) => return Ok(Some(frame)),
            Err(err) => {
                log::warn!("Failed to acquire frame: {}", err);
                match self.map_surface_error(err) {
                    SurfaceErrorAction::Reconfigured => {}
                    SurfaceErrorAction::SkipFrame => return Ok(None),
                    SurfaceErrorAction::Fatal => {
                        self.lost.store(true, Ordering::Release);
                        return Err(RenderError::ContextLost);
                    }
                }
            }
        }

        self.surface.get_current_texture().map(Some).map_err(|err| {
            log::warn!("Surface still unusable after reconfigure: {}", err);
            self.lost.store(true, Ordering::Release);
            RenderError::ContextLost
        })
    }
}

impl GpuDevice for WgpuDevice {
    type Program = WgpuProgram;
    type Mesh = WgpuMesh;

    fn surface_extent(&self) -> Extent {
        self.source.extent()
    }

    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire) || self.source.is_detached()
    }

    fn configure(&mut self, extent: Extent) -> Result<(), RenderError> {
        if self.is_lost() {
            return Err(RenderError::ContextLost);
        }
        self.config.width = extent.width;
        self.config.height = extent.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = Depth::new(&self.device, extent);
        Ok(())
    }

    fn create_program(&mut self, desc: &ProgramDescriptor<'_>) -> Result<WgpuProgram, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label),
                source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
            });

        let pipeline = PipelineBuilder::new(&self.device, &self.pipeline_layout, &shader, desc)
            .with_color_format(self.config.format)
            .with_depth_format(self.depth.format)
            .build();

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::shader_compile(desc.label, err.to_string()));
        }

        let uniform = TransformUniform::new();
        let uniforms = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("TransformBuffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("TransformBindGroup"),
            layout: &self.bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        log::debug!("Created program '{}' ({:?})", desc.label, desc.state.topology);

        Ok(WgpuProgram {
            pipeline,
            uniforms,
            bind_group,
        })
    }

    fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<WgpuMesh, RenderError> {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(WgpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    fn write_uniforms(&mut self, program: &WgpuProgram, uniform: &TransformUniform) {
        self.queue
            .write_buffer(&program.uniforms, 0, bytemuck::bytes_of(uniform));
    }

    fn submit(
        &mut self,
        frame: FrameSubmission<'_, WgpuProgram, WgpuMesh>,
    ) -> Result<PresentOutcome, RenderError> {
        if self.is_lost() {
            return Err(RenderError::ContextLost);
        }

        let Some(surface_texture) = self.acquire()? else {
            return Ok(PresentOutcome::Skipped);
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Viewport cannot exceed the configured surface.
            let width = frame.viewport.width.min(self.config.width);
            let height = frame.viewport.height.min(self.config.height);
            rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            for draw in frame.draws {
                rpass.set_pipeline(&draw.program.pipeline);
                rpass.set_bind_group(0, &draw.program.bind_group, &[]);
                rpass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(PresentOutcome::Presented)
    }
}
