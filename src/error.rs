// src/error.rs
use thiserror::Error;

/// Errors surfaced by renderers, graphics contexts and pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The surface id does not resolve to a drawable target.
    #[error("surface '{surface_id}' not found or not drawable")]
    SurfaceNotFound { surface_id: String },

    /// A shader program failed to parse, validate or compile.
    #[error("failed to compile shader '{label}': {message}")]
    ShaderCompile { label: String, message: String },

    /// `mode` is outside the closed set of render modes.
    #[error("unknown render mode {0}")]
    UnknownRenderMode(i32),

    /// The device was lost and could not be recovered within the frame.
    #[error("graphics context lost")]
    ContextLost,

    /// Adapter, device or surface setup failed in the backend.
    #[error("graphics backend error: {0}")]
    Backend(String),
}

impl RenderError {
    pub fn surface_not_found(surface_id: impl Into<String>) -> Self {
        Self::SurfaceNotFound {
            surface_id: surface_id.into(),
        }
    }

    pub fn shader_compile(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShaderCompile {
            label: label.into(),
            message: message.into(),
        }
    }
}
