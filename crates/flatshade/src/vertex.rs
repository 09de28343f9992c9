use bytemuck::{Pod, Zeroable};

/// Per-vertex input: object-space position at `@location(0)`.
///
/// Tightly packed, 12 bytes per vertex. Hosts must bind a vertex buffer whose
/// stride and format match [`Vertex::layout`].
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const POSITION_LOCATION: u32 = 0;
    pub const FORMAT: wgpu::VertexFormat = wgpu::VertexFormat::Float32x3;
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl From<[f32; 3]> for Vertex {
    fn from(position: [f32; 3]) -> Self {
        Self { position }
    }
}

impl From<glam::Vec3> for Vertex {
    fn from(v: glam::Vec3) -> Self {
        Self { position: v.to_array() }
    }
}
