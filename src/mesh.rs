//! Vertex formats and GPU-resident geometry.
//!
//! - [`Vertex3d`]: per-vertex position, normal and UV for the sphere meshes
//! - [`StarPoint`]: per-instance position and scale for the starfield
//! - [`GpuMesh`]: buffers uploaded once from a [`Geometry`]
//!
//! # Vertex Layouts
//!
//! [`Vertex3d`] (32 bytes, per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |
//!
//! [`StarPoint`] (16 bytes, per instance):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | scale     | Float32   | 12     | 1               |

use crate::geometry::Geometry;
use crate::gpu::GpuContext;

/// A vertex with position, normal, and texture coordinates.
///
/// `#[repr(C)]` with [`bytemuck::Pod`] so slices upload directly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// Model-space position.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Texture coordinates in [0, 1].
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// One star: a position and a size multiplier.
///
/// Uploaded as an instance buffer; the starfield shader expands every
/// instance into a camera-facing quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarPoint {
    /// Model-space position.
    pub position: [f32; 3],
    /// Multiplier applied to the material's point size.
    pub scale: f32,
}

impl StarPoint {
    /// The wgpu vertex buffer layout (instance step mode).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<StarPoint>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // scale
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32,
            },
        ],
    };

    /// Vertices emitted per star instance (two triangles).
    pub const QUAD_VERTICES: u32 = 6;

    pub fn new(position: [f32; 3], scale: f32) -> Self {
        Self { position, scale }
    }
}

/// GPU buffers for one drawable's geometry.
///
/// Created once at startup. Never mutated afterwards.
#[derive(Debug)]
pub enum GpuMesh {
    /// Indexed triangle list of [`Vertex3d`].
    Triangles {
        vertex_buffer: wgpu::Buffer,
        index_buffer: wgpu::Buffer,
        index_count: u32,
    },
    /// Instanced quads, one per [`StarPoint`].
    Points {
        instance_buffer: wgpu::Buffer,
        instance_count: u32,
    },
}

impl GpuMesh {
    /// Uploads geometry to new GPU buffers.
    ///
    /// Returns `None` for empty geometry, since wgpu rejects zero-sized
    /// vertex buffers and there would be nothing to draw.
    pub fn upload(gpu: &GpuContext, geometry: &Geometry, label: &str) -> Option<Self> {
        use wgpu::util::DeviceExt;

        if geometry.is_empty() {
            return None;
        }

        let mesh = match geometry {
            Geometry::Mesh(raw) => {
                let vertex_buffer =
                    gpu.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{label} Vertex Buffer")),
                            contents: bytemuck::cast_slice(&raw.vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });

                let index_buffer =
                    gpu.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{label} Index Buffer")),
                            contents: bytemuck::cast_slice(&raw.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });

                GpuMesh::Triangles {
                    vertex_buffer,
                    index_buffer,
                    index_count: raw.indices.len() as u32,
                }
            }
            Geometry::Points(cloud) => {
                let instance_buffer =
                    gpu.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{label} Instance Buffer")),
                            contents: bytemuck::cast_slice(&cloud.points),
                            usage: wgpu::BufferUsages::VERTEX,
                        });

                GpuMesh::Points {
                    instance_buffer,
                    instance_count: cloud.points.len() as u32,
                }
            }
        };

        Some(mesh)
    }

    /// Records the draw call for this mesh into an active render pass.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        match self {
            GpuMesh::Triangles {
                vertex_buffer,
                index_buffer,
                index_count,
            } => {
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..*index_count, 0, 0..1);
            }
            GpuMesh::Points {
                instance_buffer,
                instance_count,
            } => {
                render_pass.set_vertex_buffer(0, instance_buffer.slice(..));
                render_pass.draw(0..StarPoint::QUAD_VERTICES, 0..*instance_count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 32);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 32);
        assert_eq!(std::mem::size_of::<StarPoint>(), 16);
        assert_eq!(StarPoint::LAYOUT.array_stride, 16);
        assert_eq!(StarPoint::LAYOUT.step_mode, wgpu::VertexStepMode::Instance);
    }
}
