//! Headless backend that records frames instead of drawing them.
//!
//! Surfaces are registered by id with a size. Every presented frame is kept with its
//! viewport, clear colour and draw calls (including the transform that was uploaded),
//! so callers can inspect exactly what a renderer produced without a GPU. Surface
//! removal and context loss can be simulated.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RenderError;
use crate::renderer::{TransformUniform, Vertex};

use super::{
    Extent, FrameSubmission, GpuDevice, PresentOutcome, ProgramDescriptor, RenderState,
    SurfaceHost,
};

/// Identifies one `connect` call; every device gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub program: String,
    pub state: RenderState,
    pub index_count: u32,
    pub primitive_count: u32,
    /// Transform uploaded to the program when the frame was submitted.
    pub transform: Option<TransformUniform>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    pub device: DeviceId,
    pub viewport: Extent,
    pub clear_color: wgpu::Color,
    pub draws: Vec<RecordedDraw>,
}

#[derive(Debug)]
struct SurfaceRecord {
    extent: Extent,
    /// Bumped on context loss; devices from older generations are lost.
    generation: u64,
    configured: Vec<Extent>,
    frames: Vec<PresentedFrame>,
    lose_on_present: bool,
}

#[derive(Debug, Default)]
struct HostState {
    surfaces: HashMap<String, SurfaceRecord>,
    next_device: u64,
    live_devices: usize,
    connections: usize,
}

/// Shared handle to a set of headless surfaces. Clones see the same surfaces.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Rc<RefCell<HostState>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(self, surface_id: &str, width: u32, height: u32) -> Self {
        self.add_surface(surface_id, width, height);
        self
    }

    pub fn add_surface(&self, surface_id: &str, width: u32, height: u32) {
        self.state.borrow_mut().surfaces.insert(
            surface_id.to_owned(),
            SurfaceRecord {
                extent: Extent::new(width, height),
                generation: 0,
                configured: Vec::new(),
                frames: Vec::new(),
                lose_on_present: false,
            },
        );
    }

    /// Detaches the surface. Devices bound to it become lost.
    pub fn remove_surface(&self, surface_id: &str) {
        self.state.borrow_mut().surfaces.remove(surface_id);
    }

    /// Invalidates every device currently bound to the surface.
    pub fn lose_context(&self, surface_id: &str) {
        if let Some(record) = self.state.borrow_mut().surfaces.get_mut(surface_id) {
            record.generation += 1;
        }
    }

    /// The next present on this surface fails with context loss.
    pub fn lose_context_on_next_present(&self, surface_id: &str) {
        if let Some(record) = self.state.borrow_mut().surfaces.get_mut(surface_id) {
            record.lose_on_present = true;
        }
    }

    pub fn frames(&self, surface_id: &str) -> Vec<PresentedFrame> {
        self.state
            .borrow()
            .surfaces
            .get(surface_id)
            .map(|record| record.frames.clone())
            .unwrap_or_default()
    }

    pub fn last_frame(&self, surface_id: &str) -> Option<PresentedFrame> {
        self.state
            .borrow()
            .surfaces
            .get(surface_id)
            .and_then(|record| record.frames.last().cloned())
    }

    /// Every size the surface was configured to, in order.
    pub fn configured_extents(&self, surface_id: &str) -> Vec<Extent> {
        self.state
            .borrow()
            .surfaces
            .get(surface_id)
            .map(|record| record.configured.clone())
            .unwrap_or_default()
    }

    /// Devices opened and not yet dropped.
    pub fn live_devices(&self) -> usize {
        self.state.borrow().live_devices
    }

    /// Total successful `connect` calls.
    pub fn connections(&self) -> usize {
        self.state.borrow().connections
    }
}

impl SurfaceHost for HeadlessHost {
    type Device = HeadlessDevice;

    fn has_surface(&self, surface_id: &str) -> bool {
        self.state.borrow().surfaces.contains_key(surface_id)
    }

    fn connect(&self, surface_id: &str) -> Result<HeadlessDevice, RenderError> {
        let mut state = self.state.borrow_mut();
        let id = DeviceId(state.next_device);

        let record = state
            .surfaces
            .get_mut(surface_id)
            .ok_or_else(|| RenderError::surface_not_found(surface_id))?;
        let extent = record.extent;
        let generation = record.generation;
        record.configured.push(extent);

        state.next_device += 1;
        state.live_devices += 1;
        state.connections += 1;

        log::debug!("HeadlessHost: device {:?} connected to '{}'", id, surface_id);

        Ok(HeadlessDevice {
            id,
            surface_id: surface_id.to_owned(),
            generation,
            extent,
            state: Rc::clone(&self.state),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessProgram {
    label: Rc<str>,
    state: RenderState,
    uniforms: Rc<Cell<Option<TransformUniform>>>,
}

impl HeadlessProgram {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> RenderState {
        self.state
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessMesh {
    vertex_count: u32,
    index_count: u32,
}

#[derive(Debug)]
pub struct HeadlessDevice {
    id: DeviceId,
    surface_id: String,
    generation: u64,
    extent: Extent,
    state: Rc<RefCell<HostState>>,
}

impl HeadlessDevice {
    pub fn id(&self) -> DeviceId {
        self.id
    }
}

impl GpuDevice for HeadlessDevice {
    type Program = HeadlessProgram;
    type Mesh = HeadlessMesh;

    fn surface_extent(&self) -> Extent {
        self.extent
    }

    fn is_lost(&self) -> bool {
        self.state
            .borrow()
            .surfaces
            .get(&self.surface_id)
            .map_or(true, |record| record.generation != self.generation)
    }

    fn configure(&mut self, extent: Extent) -> Result<(), RenderError> {
        if self.is_lost() {
            return Err(RenderError::ContextLost);
        }
        if let Some(record) = self.state.borrow_mut().surfaces.get_mut(&self.surface_id) {
            record.configured.push(extent);
        }
        self.extent = extent;
        Ok(())
    }

    fn create_program(
        &mut self,
        desc: &ProgramDescriptor<'_>,
    ) -> Result<HeadlessProgram, RenderError> {
        log::trace!("HeadlessDevice: creating program '{}'", desc.label);
        Ok(HeadlessProgram {
            label: Rc::from(desc.label),
            state: desc.state,
            uniforms: Rc::new(Cell::new(None)),
        })
    }

    fn create_mesh(
        &mut self,
        label: &str,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<HeadlessMesh, RenderError> {
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::Backend(format!(
                "mesh '{label}' references vertex {bad} of {}",
                vertices.len()
            )));
        }
        Ok(HeadlessMesh {
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
        })
    }

    fn write_uniforms(&mut self, program: &HeadlessProgram, uniform: &TransformUniform) {
        program.uniforms.set(Some(*uniform));
    }

    fn submit(
        &mut self,
        frame: FrameSubmission<'_, HeadlessProgram, HeadlessMesh>,
    ) -> Result<PresentOutcome, RenderError> {
        if self.is_lost() {
            return Err(RenderError::ContextLost);
        }

        let mut state = self.state.borrow_mut();
        let record = state
            .surfaces
            .get_mut(&self.surface_id)
            .ok_or(RenderError::ContextLost)?;

        if record.lose_on_present {
            record.lose_on_present = false;
            record.generation += 1;
            log::warn!("HeadlessDevice: simulated context loss on '{}'", self.surface_id);
            return Err(RenderError::ContextLost);
        }

        let draws = frame
            .draws
            .iter()
            .map(|draw| {
                debug_assert!(draw.mesh.vertex_count > 0);
                let index_count = draw.mesh.index_count;
                RecordedDraw {
                    program: draw.program.label.to_string(),
                    state: draw.program.state,
                    index_count,
                    primitive_count: primitive_count(draw.program.state.topology, index_count),
                    transform: draw.program.uniforms.get(),
                }
            })
            .collect();

        record.frames.push(PresentedFrame {
            device: self.id,
            viewport: frame.viewport,
            clear_color: frame.clear_color,
            draws,
        });

        Ok(PresentOutcome::Presented)
    }
}

impl Drop for HeadlessDevice {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.live_devices = state.live_devices.saturating_sub(1);
        log::debug!("HeadlessHost: device {:?} released", self.id);
    }
}

fn primitive_count(topology: wgpu::PrimitiveTopology, index_count: u32) -> u32 {
    match topology {
        wgpu::PrimitiveTopology::TriangleList => index_count / 3,
        wgpu::PrimitiveTopology::TriangleStrip => index_count.saturating_sub(2),
        wgpu::PrimitiveTopology::LineList => index_count / 2,
        wgpu::PrimitiveTopology::LineStrip => index_count.saturating_sub(1),
        wgpu::PrimitiveTopology::PointList => index_count,
    }
}
