use bytemuck::NoUninit;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
        wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Append `other` with its vertices transformed by `transform`.
    pub fn append_transformed(&mut self, other: &Mesh, transform: Mat4) {
        let base = self.vertices.len() as u32;
        // normals take the inverse transpose so non-uniform scale keeps them perpendicular
        let normal_matrix = transform.inverse().transpose();
        self.vertices.extend(other.vertices.iter().map(|v| Vertex {
            pos: transform.transform_point3(Vec3::from(v.pos)).to_array(),
            normal: normal_matrix
                .transform_vector3(Vec3::from(v.normal))
                .normalize_or_zero()
                .to_array(),
            color: v.color,
        }));
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }

    /// Axis-aligned bounds as (min, max); `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = Vec3::from(self.vertices.first()?.pos);
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            let p = Vec3::from(v.pos);
            (min.min(p), max.max(p))
        }))
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        self.upload_with(device, wgpu::BufferUsages::VERTEX)
    }

    /// Upload with a vertex buffer that can be rewritten later through `Queue::write_buffer`.
    pub fn upload_dynamic(&self, device: &wgpu::Device) -> MeshBuffer {
        self.upload_with(device, wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST)
    }

    fn upload_with(&self, device: &wgpu::Device, vertex_usage: wgpu::BufferUsages) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: vertex_usage,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            vertex_count: self.vertices.len() as u32,
            index_count: self.indices.len() as u32,
        }
    }
}
