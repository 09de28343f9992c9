//! Per-frame transform data read by the vertex stage.
//!
//! Matrix convention: column-major. `view_proj[c]` is column `c`, which is the
//! memory layout of WGSL `mat4x4<f32>` and of `glam::Mat4::to_cols_array_2d`.
//! The shader computes `view_proj * vec4(position, 1.0)`. Uploading a
//! row-major array here silently transposes the transform.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Uniform block bound at `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl Uniforms {
    /// Bind group index declared by the shader.
    pub const GROUP: u32 = 0;

    /// Binding index inside [`Self::GROUP`].
    pub const BINDING: u32 = 0;

    /// Size of the block in bytes (16 × f32).
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub const IDENTITY: Self = Self {
        view_proj: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Packs a combined view-projection matrix in column-major order.
    #[inline]
    pub fn from_view_proj(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    /// Returns `true` when all 16 entries are finite.
    ///
    /// The device never checks this; a host may call it before uploading.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.view_proj.iter().flatten().all(|v| v.is_finite())
    }

    /// Raw bytes for `Queue::write_buffer`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Minimum binding size for the uniform buffer binding.
    pub fn min_binding_size() -> NonZeroU64 {
        // SIZE is a non-zero compile-time constant.
        NonZeroU64::new(Self::SIZE).unwrap_or(NonZeroU64::MIN)
    }

    /// Bind group layout entry matching the shader declaration.
    pub fn layout_entry() -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: Self::BINDING,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(Self::min_binding_size()),
            },
            count: None,
        }
    }
}

impl Default for Uniforms {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Uniforms {
    fn from(m: Mat4) -> Self {
        Self::from_view_proj(m)
    }
}
