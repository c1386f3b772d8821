//! Render pipelines and their shared bind group layouts.
//!
//! Both pipelines read the same three bind groups:
//! - group 0: scene texture and sampler
//! - group 1: camera view and projection
//! - group 2: animated scene uniforms (light, brightness, hue)

use anyhow::bail;

use crate::data_structures::texture::{SAMPLE_COUNT, Texture};

pub mod background;
pub mod object;

/// The per-pipeline knobs; everything else is shared.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    pub label: &'static str,
    pub front_face: wgpu::FrontFace,
    pub depth_compare: wgpu::CompareFunction,
}

#[derive(Debug)]
pub struct BindGroupLayouts {
    pub texture: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub scene: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            texture: texture_layout(device),
            camera: uniform_layout(
                device,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                "camera_bind_group_layout",
            ),
            scene: uniform_layout(device, wgpu::ShaderStages::FRAGMENT, "scene_bind_group_layout"),
        }
    }

    pub fn pipeline_layout(&self, device: &wgpu::Device) -> wgpu::PipelineLayout {
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&self.texture, &self.camera, &self.scene],
            push_constant_ranges: &[],
        })
    }
}

fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

fn uniform_layout(
    device: &wgpu::Device,
    visibility: wgpu::ShaderStages,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// Creates the module and fails if the compiler reported any error.
///
/// Creation runs inside a validation error scope, so an invalid module comes back as an
/// error instead of reaching the device's uncaptured-error handler.
pub async fn compile_shader(
    device: &wgpu::Device,
    desc: wgpu::ShaderModuleDescriptor<'_>,
) -> anyhow::Result<wgpu::ShaderModule> {
    let label = desc.label.unwrap_or("shader").to_owned();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(desc);
    let validation = device.pop_error_scope().await;
    let info = module.get_compilation_info().await;

    let mut errors: Vec<String> = validation.into_iter().map(|e| e.to_string()).collect();
    for message in &info.messages {
        match message.message_type {
            wgpu::CompilationMessageType::Error => errors.push(message.message.clone()),
            wgpu::CompilationMessageType::Warning => {
                log::warn!("{label}: {}", message.message)
            }
            _ => log::debug!("{label}: {}", message.message),
        }
    }
    if !errors.is_empty() {
        bail!("{label} failed to compile: {}", errors.join("; "));
    }
    Ok(module)
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    config: PipelineConfig,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(config.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: config.front_face,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: config.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: SAMPLE_COUNT,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
