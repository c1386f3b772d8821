//! GPU side of the scene: static geometry, the shared instance buffer and frame encoding.
//!
//! The instance buffer is laid out once for the worst case and never resized:
//!
//! ```text
//! [ sphere | cube 0 .. cube N-1 | digit bar 0 .. digit bar 511 ]
//! ```
//!
//! The first `1 + N` slots are written at creation. The digit region is overwritten on
//! every drawn frame, but only for the bars that are live.

use std::iter;

use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::data_structures::{
    collider::POOL_CAPACITY,
    instance::InstanceRaw,
    mesh::Mesh,
    texture::{self, Texture},
};
use crate::pipelines::{
    BindGroupLayouts, background::mk_background_pipeline, object::mk_object_pipeline,
};
use crate::resources::texture::MipChain;
use crate::scene::{animation::SceneUniform, celestial};

pub const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.3,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// What the next redraw should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAction {
    /// The surface size changed: rebuild the render targets and draw on the next redraw.
    RecreateTargets,
    /// Nothing changed since the last drawn frame.
    Skip,
    Draw,
}

/// Dirty-flag bookkeeping between ticks, resizes and redraws.
///
/// [`FrameGate::evaluate`] consumes the flags before any GPU work happens, so a frame
/// that fails halfway does not block the frames after it.
#[derive(Debug, Default)]
pub struct FrameGate {
    resized: bool,
    dirty: bool,
}

impl FrameGate {
    pub fn mark_resized(&mut self) {
        self.resized = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn evaluate(&mut self) -> FrameAction {
        if self.resized {
            self.resized = false;
            // the new targets start out empty
            self.dirty = true;
            FrameAction::RecreateTargets
        } else if self.dirty {
            self.dirty = false;
            FrameAction::Draw
        } else {
            FrameAction::Skip
        }
    }
}

#[derive(Debug)]
struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn bind<'pass>(&self, render_pass: &mut wgpu::RenderPass<'pass>) {
        render_pass.set_vertex_buffer(0, self.vertex.slice(..));
        render_pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint16);
    }
}

#[derive(Debug)]
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    object_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,
    color_target: Texture,
    depth_target: Texture,
    cube: MeshBuffers,
    sphere: MeshBuffers,
    instance_buffer: wgpu::Buffer,
    cube_count: u32,
    camera_buffer: wgpu::Buffer,
    scene_buffer: wgpu::Buffer,
    texture_bind_group: wgpu::BindGroup,
    camera_bind_group: wgpu::BindGroup,
    scene_bind_group: wgpu::BindGroup,
}

impl Renderer {
    /// Builds every GPU resource the scene needs. Works without a window: `format` is the
    /// format of whatever texture [`Renderer::render`] will later resolve into.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        mips: &MipChain,
    ) -> anyhow::Result<Self> {
        let layouts = BindGroupLayouts::new(device);
        let object_pipeline = mk_object_pipeline(device, format, &layouts).await?;
        let background_pipeline = mk_background_pipeline(device, format, &layouts).await?;

        let cube = MeshBuffers::new(device, Mesh::cube(), "Cube");
        let sphere = MeshBuffers::new(device, Mesh::sphere(), "Sphere");

        let mut instances = celestial::fixed_instances();
        let cube_count = (instances.len() - 1) as u32;
        instances.resize(instances.len() + POOL_CAPACITY, InstanceRaw::default());
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Buffer"),
            contents: bytemuck::cast_slice(&[SceneUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_texture = Texture::from_mip_chain(device, queue, mips, "scene_texture");
        let sampler = texture::create_nearest_sampler(device);
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&scene_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("texture_bind_group"),
        });
        let camera_bind_group = uniform_bind_group(
            device,
            &layouts.camera,
            &camera_buffer,
            "camera_bind_group",
        );
        let scene_bind_group =
            uniform_bind_group(device, &layouts.scene, &scene_buffer, "scene_bind_group");

        let (color_target, depth_target) = create_targets(device, format, size);
        log::info!(
            "renderer ready: {} cubes, {} sphere indices, {}x{} targets",
            cube_count,
            sphere.index_count,
            size[0],
            size[1]
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            format,
            object_pipeline,
            background_pipeline,
            color_target,
            depth_target,
            cube,
            sphere,
            instance_buffer,
            cube_count,
            camera_buffer,
            scene_buffer,
            texture_bind_group,
            camera_bind_group,
            scene_bind_group,
        })
    }

    pub fn cube_count(&self) -> u32 {
        self.cube_count
    }

    /// Instance slots in the buffer: sphere, cubes and the whole digit region.
    pub fn instance_capacity(&self) -> u64 {
        self.instance_buffer.size() / InstanceRaw::SIZE
    }

    /// Byte offset of the first digit slot.
    pub fn digit_region_offset(&self) -> wgpu::BufferAddress {
        (1 + u64::from(self.cube_count)) * InstanceRaw::SIZE
    }

    pub fn resize(&mut self, size: [u32; 2]) {
        log::debug!("recreating render targets at {}x{}", size[0], size[1]);
        (self.color_target, self.depth_target) = create_targets(&self.device, self.format, size);
    }

    pub fn write_uniforms(&self, camera: &CameraUniform, scene: &SceneUniform) {
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera]));
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[*scene]));
    }

    /// Draws one frame into `target` and submits it.
    pub fn render(&self, target: &wgpu::TextureView, digits: &[InstanceRaw]) -> wgpu::SubmissionIndex {
        debug_assert!(digits.len() <= POOL_CAPACITY);
        if !digits.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                self.digit_region_offset(),
                bytemuck::cast_slice(digits),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.encode(&mut encoder, target, digits.len() as u32);
        self.queue.submit(iter::once(encoder.finish()))
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, digit_count: u32) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_target.view,
                resolve_target: Some(target),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                    store: wgpu::StoreOp::Discard,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_target.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &self.texture_bind_group, &[]);
        render_pass.set_bind_group(1, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(2, &self.scene_bind_group, &[]);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

        render_pass.set_pipeline(&self.object_pipeline);
        self.sphere.bind(&mut render_pass);
        render_pass.draw_indexed(0..self.sphere.index_count, 0, 0..1);

        let first_digit = 1 + self.cube_count;
        self.cube.bind(&mut render_pass);
        render_pass.draw_indexed(0..self.cube.index_count, 0, 1..first_digit);
        if digit_count > 0 {
            render_pass.draw_indexed(
                0..self.cube.index_count,
                0,
                first_digit..first_digit + digit_count,
            );
        }

        render_pass.set_pipeline(&self.background_pipeline);
        self.sphere.bind(&mut render_pass);
        render_pass.draw_indexed(0..self.sphere.index_count, 0, 0..1);
    }
}

fn create_targets(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: [u32; 2],
) -> (Texture, Texture) {
    (
        Texture::create_multisample_texture(device, size, format, "multisample_texture"),
        Texture::create_depth_texture(device, size, "depth_texture"),
    )
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
    })
}
