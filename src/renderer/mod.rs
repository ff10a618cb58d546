pub mod backend;
pub mod camera;
pub mod context;
pub mod depth;
pub mod mode;
pub mod pipeline;
pub(crate) mod pipeline_builder;
pub mod primitives;
pub mod renderer_core;
pub mod shader;
pub mod uniforms;
pub mod variants;
pub mod vertex;

pub use camera::{Camera, FrameTransform};
pub use context::GraphicsContext;
pub use depth::Depth;
pub use mode::RenderMode;
pub use pipeline::Pipeline;
pub use primitives::{GeometryDescriptor, PrimitiveKind};
pub use renderer_core::RenderCore;
pub use shader::ShaderSource;
pub use uniforms::TransformUniform;
pub use variants::{Cube, Render, Triangle};
pub use vertex::Vertex;
