// renderer/shader.rs
use crate::error::RenderError;

use super::primitives::PrimitiveKind;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

const FLAT_WGSL: &str = include_str!("shaders/flat.wgsl");
const LIT_WGSL: &str = include_str!("shaders/lit.wgsl");

/// WGSL source for one vertex + fragment program pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    pub label: &'a str,
    pub wgsl: &'a str,
}

impl ShaderSource<'static> {
    pub fn for_kind(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Triangle => Self {
                label: "flat",
                wgsl: FLAT_WGSL,
            },
            PrimitiveKind::Cube => Self {
                label: "lit",
                wgsl: LIT_WGSL,
            },
        }
    }
}

impl ShaderSource<'_> {
    /// Parses and validates the module and checks both entry points exist.
    ///
    /// Runs before any backend object is created so every backend reports
    /// the same `ShaderCompile` errors.
    pub fn validate(&self) -> Result<naga::Module, RenderError> {
        let module = naga::front::wgsl::parse_str(self.wgsl)
            .map_err(|err| RenderError::shader_compile(self.label, err.message()))?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|err| RenderError::shader_compile(self.label, err.into_inner().to_string()))?;

        for (entry, stage) in [
            (VERTEX_ENTRY, naga::ShaderStage::Vertex),
            (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
        ] {
            let found = module
                .entry_points
                .iter()
                .any(|ep| ep.name == entry && ep.stage == stage);
            if !found {
                return Err(RenderError::shader_compile(
                    self.label,
                    format!("missing {stage:?} entry point '{entry}'"),
                ));
            }
        }

        log::debug!("Validated shader '{}'", self.label);
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_shaders_validate() {
        for kind in [PrimitiveKind::Triangle, PrimitiveKind::Cube] {
            let source = ShaderSource::for_kind(kind);
            let module = source.validate().expect("builtin shader is valid");
            assert_eq!(module.entry_points.len(), 2);
        }
    }

    #[test]
    fn syntax_errors_are_reported_as_compile_errors() {
        let source = ShaderSource {
            label: "broken",
            wgsl: "@vertex fn vs_main( -> vec4<f32> { }",
        };
        let err = source.validate().unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { ref label, .. } if label == "broken"));
    }

    #[test]
    fn missing_fragment_entry_is_rejected() {
        let source = ShaderSource {
            label: "vertex-only",
            wgsl: "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0, 0.0, 0.0, 1.0); }",
        };
        let err = source.validate().unwrap_err();
        match err {
            RenderError::ShaderCompile { message, .. } => assert!(message.contains("fs_main")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
