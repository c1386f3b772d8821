use crate::data_structures::{
    instance::{InstanceRaw, VertexLayout},
    mesh::Vertex,
};
use crate::pipelines::{BindGroupLayouts, PipelineConfig, compile_shader, mk_render_pipeline};

/// Opaque, depth-tested pipeline for the sphere, the cubes and the digit bars.
pub async fn mk_object_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    layouts: &BindGroupLayouts,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let shader = compile_shader(
        device,
        wgpu::ShaderModuleDescriptor {
            label: Some("Object Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("object.wgsl").into()),
        },
    )
    .await?;

    Ok(mk_render_pipeline(
        device,
        &layouts.pipeline_layout(device),
        color_format,
        &[Vertex::desc(), InstanceRaw::desc()],
        &shader,
        PipelineConfig {
            label: "Object Pipeline",
            // the meshes wind clockwise seen from outside
            front_face: wgpu::FrontFace::Cw,
            depth_compare: wgpu::CompareFunction::Less,
        },
    ))
}
