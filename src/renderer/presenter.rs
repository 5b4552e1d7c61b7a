//! Presents the CPU canvas on the window through wgpu.
//!
//! Each frame the canvas pixels are written into an RGBA texture the size of the
//! canvas and drawn as a fullscreen quad with nearest sampling, so one canvas pixel
//! maps onto one surface pixel.

use tracing::{debug, info, warn};

use crate::error::RenderError;
use crate::renderer::pipeline_builder::{
    BindGroupLayoutBuilder, PipelineBuilder, create_fullscreen_vertices, create_vertex_2d_layout,
};

/// Texture receiving canvas uploads, plus the bind group that samples it.
struct CanvasTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

/// Owns the wgpu device, the window surface and the canvas blit pipeline.
pub struct Presenter {
    /// The window surface.
    pub surface: wgpu::Surface<'static>,
    /// Current surface configuration.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// The logical device.
    pub device: wgpu::Device,
    /// The device queue.
    pub queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    canvas: CanvasTexture,
}

impl Presenter {
    /// Requests an adapter and device for `surface` and builds the blit pipeline.
    ///
    /// # Arguments
    /// * `instance` - The WGPU instance the surface was created from
    /// * `surface` - Window surface
    /// * `width` - Initial surface width
    /// * `height` - Initial surface height
    ///
    /// # Errors
    /// [`RenderError`] if no adapter, device or surface format is available
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        info!(adapter = ?adapter.get_info().name, "graphics adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pixelroom device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: Default::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, width, height)?;
        surface.configure(&device, &surface_config);

        let bind_group_layout = BindGroupLayoutBuilder::new(&device)
            .with_label("Canvas Bind Group Layout")
            .with_texture(0, wgpu::ShaderStages::FRAGMENT)
            .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
            .build();

        let pipeline = PipelineBuilder::new(
            &device,
            surface_config.format,
            include_str!("./shaders/present.wgsl"),
        )
        .with_label("Canvas Present Pipeline")
        .with_vertex_buffer(create_vertex_2d_layout())
        .with_bind_group_layout(&bind_group_layout)
        .build();

        let vertex_buffer = create_fullscreen_vertices(&device);

        // Nearest filtering keeps pixel art crisp.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Canvas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let canvas = Self::create_canvas_texture(
            &device,
            &bind_group_layout,
            &sampler,
            width.max(1),
            height.max(1),
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            vertex_buffer,
            bind_group_layout,
            sampler,
            canvas,
        })
    }

    /// Reconfigures the surface for a new window size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        debug!(width, height, "surface reconfigured");
    }

    /// Uploads `pixels` and draws them over the whole surface.
    ///
    /// An outdated or lost surface is reconfigured and the frame is skipped.
    ///
    /// # Arguments
    /// * `pixels` - Row-major RGBA8 bytes, `width * height * 4` long
    /// * `width` - Canvas width
    /// * `height` - Canvas height
    ///
    /// # Errors
    /// [`RenderError::SurfaceLost`] if the swap chain texture cannot be acquired
    pub fn present(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if pixels.len() as u64 != u64::from(width) * u64::from(height) * 4 {
            warn!(len = pixels.len(), width, height, "canvas byte length mismatch, frame skipped");
            return Ok(());
        }
        if (width, height) != (self.canvas.width, self.canvas.height) {
            self.canvas = Self::create_canvas_texture(
                &self.device,
                &self.bind_group_layout,
                &self.sampler,
                width,
                height,
            );
        }
        self.upload(pixels);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                warn!("surface outdated, reconfiguring and skipping frame");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface texture timed out, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(RenderError::SurfaceLost(err)),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Canvas Present Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.canvas.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..6, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn upload(&self, pixels: &[u8]) {
        let (width, height) = (self.canvas.width, self.canvas.height);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.canvas.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration, RenderError> {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|&&f| f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .or_else(|| capabilities.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        })
    }

    fn create_canvas_texture(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> CanvasTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Canvas Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("Canvas Bind Group"),
        });
        debug!(width, height, "canvas texture created");

        CanvasTexture {
            texture,
            bind_group,
            width,
            height,
        }
    }
}
