use flatshade::Vertex;
use wgpu::util::DeviceExt;

/// CPU-side triangle list with 16-bit indices.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Returns `true` when every index addresses a vertex and the list forms
    /// whole triangles.
    pub fn is_well_formed(&self) -> bool {
        self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    /// Uploads into immutable vertex and index buffers.
    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffers {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flatshade vertex buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // wgpu requires 4-byte aligned copies; pad odd index counts.
        let mut indices = self.indices.clone();
        if indices.len() % 2 == 1 {
            indices.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flatshade index buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffers {
            vertex_buffer,
            index_buffer,
            index_count: self.index_count(),
        }
    }

    /// The two triangles the viewer shows on startup.
    pub fn demo() -> Vec<Mesh> {
        vec![
            Mesh::new(
                vec![
                    Vertex::new(-0.5, -0.5, 0.0),
                    Vertex::new(0.5, -0.5, 0.0),
                    Vertex::new(0.0, 0.5, 0.0),
                ],
                vec![0, 1, 2],
            ),
            Mesh::new(
                vec![
                    Vertex::new(1.5, -0.5, 0.0),
                    Vertex::new(2.5, -0.5, 0.0),
                    Vertex::new(2.0, 0.5, 0.0),
                ],
                vec![0, 1, 2],
            ),
        ]
    }
}

/// GPU buffers of an uploaded [`Mesh`].
pub struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_meshes_are_well_formed() {
        let meshes = Mesh::demo();
        assert_eq!(meshes.len(), 2);
        assert!(meshes.iter().all(Mesh::is_well_formed));
        assert!(meshes.iter().all(|m| m.index_count() == 3));
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let m = Mesh::new(vec![Vertex::default(); 3], vec![0, 1, 3]);
        assert!(!m.is_well_formed());
    }

    #[test]
    fn partial_triangle_is_malformed() {
        let m = Mesh::new(vec![Vertex::default(); 3], vec![0, 1]);
        assert!(!m.is_well_formed());
    }
}
