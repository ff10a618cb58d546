// src/renderer/pipeline_builder.rs
use super::backend::{ProgramDescriptor, RenderState};
use super::vertex::Vertex;

/// Turns a `ProgramDescriptor` into a wgpu render pipeline.
///
/// The vertex layout is always `Vertex`; the colour and depth formats come from the
/// surface the program will draw to.
pub(crate) struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    desc: &'a ProgramDescriptor<'a>,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
}

impl<'a> PipelineBuilder<'a> {
    pub(crate) fn new(
        device: &'a wgpu::Device,
        layout: &'a wgpu::PipelineLayout,
        shader: &'a wgpu::ShaderModule,
        desc: &'a ProgramDescriptor<'a>,
    ) -> Self {
        Self {
            device,
            layout,
            shader,
            desc,
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            depth_format: None,
        }
    }

    pub(crate) fn with_color_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub(crate) fn with_depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub(crate) fn build(self) -> wgpu::RenderPipeline {
        let state = self.desc.state;
        let targets = [Some(wgpu::ColorTargetState {
            format: self.color_format,
            blend: state.blend,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(self.desc.label),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: Some(self.desc.vertex_entry),
                    buffers: &[Vertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: self.shader,
                    entry_point: Some(self.desc.fragment_entry),
                    targets: &targets,
                    compilation_options: Default::default(),
                }),
                primitive: primitive_state(&state),
                depth_stencil: self
                    .depth_format
                    .map(|format| depth_stencil_state(format, &state)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }
}

/// Counter-clockwise front faces, filled polygons.
pub(crate) fn primitive_state(state: &RenderState) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: state.topology,
        cull_mode: state.cull_mode,
        front_face: wgpu::FrontFace::Ccw,
        polygon_mode: wgpu::PolygonMode::Fill,
        ..Default::default()
    }
}

/// With depth testing off the attachment is still bound but never written or tested.
pub(crate) fn depth_stencil_state(
    format: wgpu::TextureFormat,
    state: &RenderState,
) -> wgpu::DepthStencilState {
    let depth_compare = if state.depth_test {
        wgpu::CompareFunction::LessEqual
    } else {
        wgpu::CompareFunction::Always
    };

    wgpu::DepthStencilState {
        format,
        depth_write_enabled: state.depth_test,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(depth_test: bool) -> RenderState {
        RenderState {
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            depth_test,
            blend: Some(wgpu::BlendState::REPLACE),
        }
    }

    #[test]
    fn primitive_state_carries_topology_and_culling() {
        let primitive = primitive_state(&state(true));
        assert_eq!(primitive.topology, wgpu::PrimitiveTopology::LineList);
        assert_eq!(primitive.cull_mode, None);
        assert_eq!(primitive.front_face, wgpu::FrontFace::Ccw);
    }

    #[test]
    fn depth_test_toggles_compare_and_write() {
        let on = depth_stencil_state(wgpu::TextureFormat::Depth24Plus, &state(true));
        assert!(on.depth_write_enabled);
        assert_eq!(on.depth_compare, wgpu::CompareFunction::LessEqual);

        let off = depth_stencil_state(wgpu::TextureFormat::Depth24Plus, &state(false));
        assert!(!off.depth_write_enabled);
        assert_eq!(off.depth_compare, wgpu::CompareFunction::Always);
    }
}
