//! # WGPU Pipeline Builder Utilities
//!
//! Builder helpers for the render pipeline and bind group layout of the
//! presenter, plus the fullscreen quad it draws.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let bind_group_layout = BindGroupLayoutBuilder::new(&device)
//!     .with_label("Canvas Bind Group Layout")
//!     .with_texture(0, wgpu::ShaderStages::FRAGMENT)
//!     .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
//!     .build();
//!
//! let pipeline = PipelineBuilder::new(&device, surface_format, shader_source)
//!     .with_label("Canvas Pipeline")
//!     .with_vertex_buffer(create_vertex_2d_layout())
//!     .with_bind_group_layout(&bind_group_layout)
//!     .build();
//! ```

use wgpu::util::DeviceExt;

/// Fluent builder for render pipelines.
///
/// ## Default Configuration
///
/// - Entry points: `"vs_main"` and `"fs_main"`
/// - Blend state: `REPLACE` (no blending)
/// - No culling, `TriangleList`, counter-clockwise front face
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    surface_format: wgpu::TextureFormat,
    label: Option<&'a str>,
    shader_source: &'a str,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
}

impl<'a> PipelineBuilder<'a> {
    /// Create a new pipeline builder with default settings.
    ///
    /// # Parameters
    ///
    /// - `device` - The WGPU device used to create the pipeline
    /// - `surface_format` - Texture format of the render target
    /// - `shader_source` - WGSL source containing both entry points
    pub fn new(
        device: &'a wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader_source: &'a str,
    ) -> Self {
        Self {
            device,
            surface_format,
            label: None,
            shader_source,
            vertex_buffers: Vec::new(),
            bind_group_layouts: Vec::new(),
        }
    }

    /// Set a debug label used for the shader, layout and pipeline.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a vertex buffer layout. Layouts bind to consecutive slots.
    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_buffers.push(layout);
        self
    }

    /// Add a bind group layout. Layouts bind to consecutive group indices.
    pub fn with_bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Build the render pipeline.
    pub fn build(self) -> wgpu::RenderPipeline {
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: self.label,
                source: wgpu::ShaderSource::Wgsl(self.shader_source.into()),
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: self.label,
                bind_group_layouts: &self.bind_group_layouts,
                push_constant_ranges: &[],
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label,
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &self.vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
    }
}

/// Fluent builder for bind group layouts.
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    label: Option<&'a str>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    /// Create an empty layout builder.
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            entries: Vec::new(),
            label: None,
        }
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a filterable 2D float texture binding.
    pub fn with_texture(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
        self
    }

    /// Add a filtering sampler binding.
    pub fn with_sampler(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        self
    }

    /// Build the bind group layout.
    pub fn build(self) -> wgpu::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &self.entries,
                label: self.label,
            })
    }
}

/// Vertex buffer layout for `[f32; 2]` positions at shader location 0.
pub fn create_vertex_2d_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        }],
    }
}

/// Six vertices forming two triangles over the whole NDC square.
pub const FULLSCREEN_QUAD: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Create a vertex buffer containing [`FULLSCREEN_QUAD`].
///
/// Draw with `render_pass.draw(0..6, 0..1)`.
pub fn create_fullscreen_vertices(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Fullscreen Quad Vertex Buffer"),
        contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
        usage: wgpu::BufferUsages::VERTEX,
    })
}
