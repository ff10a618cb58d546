use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Closed set of draw variants selected by the `mode` argument of `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Solid,
    Wireframe,
}

impl RenderMode {
    pub const ALL: [RenderMode; 2] = [RenderMode::Solid, RenderMode::Wireframe];

    pub fn as_i32(self) -> i32 {
        match self {
            RenderMode::Solid => 0,
            RenderMode::Wireframe => 1,
        }
    }

    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            RenderMode::Solid => wgpu::PrimitiveTopology::TriangleList,
            RenderMode::Wireframe => wgpu::PrimitiveTopology::LineList,
        }
    }
}

impl TryFrom<i32> for RenderMode {
    type Error = RenderError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RenderMode::Solid),
            1 => Ok(RenderMode::Wireframe),
            other => Err(RenderError::UnknownRenderMode(other)),
        }
    }
}
