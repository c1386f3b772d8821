//! Per-instance transforms and the vertex buffer layouts the pipelines consume.
//!
//! Every drawn object is one instance of either the cube or the sphere mesh. Its world
//! transform travels to the vertex shader in a vertex buffer stepped per instance.

use std::mem;

use cgmath::{One, Vector3};

use crate::data_structures::mesh::Vertex;

/// Describes how a GPU-bound struct is laid out in a vertex buffer.
pub trait VertexLayout {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Position, rotation and (possibly non-uniform) scale of one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    pub fn new(position: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: cgmath::Quaternion::one(),
            scale,
        }
    }

    pub fn uniform(position: Vector3<f32>, scale: f32) -> Self {
        Self::new(position, Vector3::new(scale, scale, scale))
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::uniform(Vector3::new(0.0, 0.0, 0.0), 1.0)
    }
}

/// The model matrix as it is stored in the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    pub const SIZE: wgpu::BufferAddress = mem::size_of::<InstanceRaw>() as wgpu::BufferAddress;

    pub fn translation(&self) -> Vector3<f32> {
        let [x, y, z, _] = self.model[3];
        Vector3::new(x, y, z)
    }
}

impl Default for InstanceRaw {
    fn default() -> Self {
        Instance::default().to_raw()
    }
}

impl VertexLayout for Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/**
 * A mat4 occupies four vertex slots, one per column. The shader only advances to the
 * next matrix when it starts a new instance.
 */
impl VertexLayout for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_instance_is_one_column_major_matrix() {
        assert_eq!(InstanceRaw::SIZE, 64);
        let raw = Instance::new(Vector3::new(4.0, -2.0, -200.0), Vector3::new(10.0, 1.0, 1.0))
            .to_raw();
        assert_eq!(raw.translation(), Vector3::new(4.0, -2.0, -200.0));
        assert_eq!(raw.model[0][0], 10.0);
        assert_eq!(raw.model[1][1], 1.0);
    }

    #[test]
    fn layouts_cover_the_whole_stride() {
        let vertex = Vertex::desc();
        assert_eq!(vertex.array_stride, 32);
        assert_eq!(vertex.attributes.len(), 3);

        let instance = InstanceRaw::desc();
        assert_eq!(instance.step_mode, wgpu::VertexStepMode::Instance);
        let last = instance.attributes.last().map(|a| a.offset + 16);
        assert_eq!(last, Some(instance.array_stride));
    }
}
