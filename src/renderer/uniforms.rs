// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Per-frame transform block bound at group 0, binding 0 of every program.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, PartialEq, Debug)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// xyz: direction the light travels, w: ambient term.
    pub light: [f32; 4],
}

impl TransformUniform {
    pub fn new() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            light: [0.0, 0.0, -1.0, 1.0],
        }
    }

    pub fn from_matrices(model: Mat4, view_proj: Mat4, light_dir: Vec3, ambient: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            light: light_dir.normalize_or_zero().extend(ambient).to_array(),
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    pub fn size() -> wgpu::BufferAddress {
        std::mem::size_of::<Self>() as wgpu::BufferAddress
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn transform_uniform_is_144_bytes() {
        // 2 * mat4x4<f32> = 128 bytes, vec4<f32> = 16 bytes
        assert_eq!(std::mem::size_of::<TransformUniform>(), 144);
    }

    #[test]
    fn matrices_survive_the_byte_layout() {
        let model = Mat4::from_rotation_y(0.5);
        let vp = Mat4::perspective_rh(1.0, 1.0, 0.1, 10.0);
        let uni = TransformUniform::from_matrices(model, vp, Vec3::new(0.0, -2.0, 0.0), 0.25);

        let bytes = bytemuck::bytes_of(&uni).to_vec();
        let decoded: TransformUniform = bytemuck::pod_read_unaligned(&bytes);

        assert_eq!(decoded.model(), model);
        assert_eq!(decoded.view_proj(), vp);
        assert_eq!(decoded.light, [0.0, -1.0, 0.0, 0.25]);
    }
}
