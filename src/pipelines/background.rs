use crate::data_structures::{instance::VertexLayout, mesh::Vertex};
use crate::pipelines::{BindGroupLayouts, PipelineConfig, compile_shader, mk_render_pipeline};

/// Sky sphere seen from the inside. The vertex shader pins it to the far plane, so with
/// `LessEqual` it only fills pixels no object claimed.
pub async fn mk_background_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    layouts: &BindGroupLayouts,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let shader = compile_shader(
        device,
        wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
        },
    )
    .await?;

    Ok(mk_render_pipeline(
        device,
        &layouts.pipeline_layout(device),
        color_format,
        &[Vertex::desc()],
        &shader,
        PipelineConfig {
            label: "Background Pipeline",
            front_face: wgpu::FrontFace::Ccw,
            depth_compare: wgpu::CompareFunction::LessEqual,
        },
    ))
}
