use cgmath::Vector3;
use orbit_clock::{BoxCollider, SceneState, Settings};
use rand::{Rng, rngs::StdRng};

pub(crate) const NOW: i64 = 1_700_000_000_000;

/// A scene whose countdown shows `remaining_ms` at [`NOW`].
pub(crate) fn scene_showing(remaining_ms: i64) -> SceneState {
    let mut settings = Settings::defaults(NOW);
    settings.timeout = NOW + remaining_ms;
    SceneState::new(settings, 1280, 720)
}

pub(crate) fn random_box(rng: &mut StdRng, center: Vector3<f32>) -> BoxCollider {
    let half = Vector3::new(
        rng.random_range(0.1..5.0),
        rng.random_range(0.1..5.0),
        rng.random_range(0.1..5.0),
    );
    BoxCollider::with_half_extents(center, half)
}

/// A box that is guaranteed to overlap `fixed` on every axis.
pub(crate) fn random_overlapping_box(rng: &mut StdRng, fixed: &BoxCollider) -> BoxCollider {
    let fixed_half = Vector3::new(
        (fixed.bx - fixed.ax) / 2.0,
        (fixed.by - fixed.ay) / 2.0,
        (fixed.bz - fixed.az) / 2.0,
    );
    let half = Vector3::new(
        rng.random_range(0.1..5.0),
        rng.random_range(0.1..5.0),
        rng.random_range(0.1..5.0),
    );
    let reach = (fixed_half + half) * 0.99;
    let offset = Vector3::new(
        rng.random_range(-reach.x..reach.x),
        rng.random_range(-reach.y..reach.y),
        rng.random_range(-reach.z..reach.z),
    );
    BoxCollider::with_half_extents(fixed.center() + offset, half)
}

/// Overlap depth of the two boxes along the axis `push` points along.
pub(crate) fn depth_along(push: Vector3<f32>, a: &BoxCollider, b: &BoxCollider) -> f32 {
    let span = |lo_a: f32, hi_a: f32, lo_b: f32, hi_b: f32| hi_a.min(hi_b) - lo_a.max(lo_b);
    if push.x != 0.0 {
        span(a.ax, a.bx, b.ax, b.bx)
    } else if push.y != 0.0 {
        span(a.ay, a.by, b.ay, b.by)
    } else {
        span(a.az, a.bz, b.az, b.bz)
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) mod gpu {
    use std::iter;

    use anyhow::{Context, ensure};
    use instant::Duration;

    /// A device without any window. `None` when the machine has no usable adapter.
    pub(crate) async fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;
        orbit_clock::context::request_device(&adapter).await.ok()
    }

    pub(crate) fn render_target(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Output Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    /// Copies an RGBA8 texture back to the CPU. `width * 4` has to be a multiple of 256.
    pub(crate) async fn read_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
    ) -> anyhow::Result<image::RgbaImage> {
        let size = texture.size();
        let bytes_per_row = 4 * size.width;
        ensure!(
            bytes_per_row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT == 0,
            "row pitch {bytes_per_row} is not aligned"
        );

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            size: u64::from(bytes_per_row * size.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Test Readback Buffer"),
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.height),
                },
            },
            size,
        );
        queue.submit(iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })?;
        rx.receive().await.context("map callback dropped")??;

        let data = buffer_slice.get_mapped_range().to_vec();
        image::RgbaImage::from_raw(size.width, size.height, data)
            .context("readback has the wrong length")
    }
}
