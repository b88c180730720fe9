//! The wgpu renderer for the globe scene.
//!
//! [`GlobePass`] implements [`SceneRenderer`]. It owns the [`GpuContext`] and
//! builds every GPU object up front, one draw item per drawable in the scene:
//! uploaded geometry, a render pipeline matching the material's raster state,
//! and a model uniform buffer. Each frame it only writes uniforms, swaps in
//! textures that finished loading, and records one render pass.
//!
//! # Bind Groups
//!
//! - **Group 0**: frame uniforms (camera matrices, time, directional light)
//! - **Group 1**: model uniforms (model/normal matrices, color, material params)
//! - **Group 2**: surface texture and sampler (surface program only)
//!
//! # Depth Buffer
//!
//! A `Depth32Float` buffer follows the surface size. It is recreated lazily at
//! the start of the first frame after a resize.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::assets::{AssetLoader, TextureHandle};
use crate::camera::{Camera, DirectionalLight};
use crate::gpu::{GpuContext, RenderError};
use crate::mesh::{GpuMesh, StarPoint, Vertex3d};
use crate::render_loop::SceneRenderer;
use crate::scene::material::{sort_for_drawing, uniforms};
use crate::scene::{BlendMode, GlobeScene, Material, NodeId, ProgramKind, Side};
use crate::shader::{FRAGMENT_ENTRY, ShaderProgram, ShaderSet, VERTEX_ENTRY};
use crate::texture::Texture;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame uniforms shared by every program.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    /// Elapsed time in seconds.
    pub time: f32,
    /// Unit vector toward the light.
    pub light_dir: [f32; 3],
    /// Zero when the scene has no light; shaders then skip lighting.
    pub light_intensity: f32,
    pub light_color: [f32; 3],
    pub _pad: f32,
}

impl FrameUniforms {
    pub fn new(camera: &Camera, light: Option<&DirectionalLight>, time: f32) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix();
        let (light_dir, light_color, light_intensity) = match light {
            Some(light) => (
                light.direction.normalize_or(Vec3::Z),
                light.color,
                light.intensity,
            ),
            None => (Vec3::Z, Vec3::ONE, 0.0),
        };

        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            time,
            light_dir: light_dir.to_array(),
            light_intensity,
            light_color: light_color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-drawable uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: opacity, y: glow strength, z: point size, w: unused.
    pub params: [f32; 4],
}

impl ModelUniforms {
    pub fn new(world: Mat4, material: &Material) -> Self {
        let color = material.vec3(uniforms::COLOR).unwrap_or(Vec3::ONE);
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
            params: [
                material.float(uniforms::OPACITY).unwrap_or(1.0),
                material.float(uniforms::GLOW).unwrap_or(0.0),
                material.float(uniforms::POINT_SIZE).unwrap_or(1.0),
                0.0,
            ],
        }
    }
}

/// Color blending for a material's blend mode.
pub fn blend_state(blend: BlendMode) -> wgpu::BlendState {
    match blend {
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

/// Faces to cull so that only `side` is rasterized.
pub fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Both => None,
    }
}

struct ProgramModules {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

impl ProgramModules {
    fn new(device: &wgpu::Device, program: &ShaderProgram) -> Self {
        let vertex_label = format!("{} Vertex Shader", program.label());
        let fragment_label = format!("{} Fragment Shader", program.label());
        Self {
            vertex: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&vertex_label),
                source: wgpu::ShaderSource::Wgsl(program.vertex_source().into()),
            }),
            fragment: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&fragment_label),
                source: wgpu::ShaderSource::Wgsl(program.fragment_source().into()),
            }),
        }
    }
}

struct TextureBinding {
    handle: TextureHandle,
    version: u64,
    bind_group: wgpu::BindGroup,
    _texture: Texture,
}

struct DrawItem {
    node: NodeId,
    name: String,
    pipeline: wgpu::RenderPipeline,
    mesh: GpuMesh,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    texture: Option<TextureBinding>,
}

/// Renders a [`GlobeScene`] to the window surface.
pub struct GlobePass {
    gpu: GpuContext,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    items: Vec<DrawItem>,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    clear_color: wgpu::Color,
}

impl GlobePass {
    /// Creates GPU resources for every drawable in `scene`.
    pub fn new(gpu: GpuContext, shaders: &ShaderSet, scene: &GlobeScene) -> Self {
        let device = &gpu.device;

        let uniform_layout_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        // Frame uniform buffer (group 0)
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[uniform_layout_entry],
            });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // Model uniforms (group 1), one buffer per drawable
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[uniform_layout_entry],
            });

        // Texture (group 2)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
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
            });

        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Textured Pipeline Layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &model_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });
        let untextured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Untextured Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        let modules: HashMap<ProgramKind, ProgramModules> = [
            (ProgramKind::Surface, &shaders.surface),
            (ProgramKind::Atmosphere, &shaders.atmosphere),
            (ProgramKind::Starfield, &shaders.starfield),
        ]
        .into_iter()
        .map(|(kind, program)| (kind, ProgramModules::new(device, program)))
        .collect();

        let mut drawables = scene.graph.drawables();
        sort_for_drawing(&mut drawables, |d| d.drawable.material());

        let mut items = Vec::with_capacity(drawables.len());
        for entry in drawables {
            let name = scene
                .graph
                .node(entry.node)
                .map_or_else(|| format!("node {}", entry.node.index()), |n| n.name.clone());
            let material = entry.drawable.material();

            let Some(mesh) = GpuMesh::upload(&gpu, entry.drawable.geometry(), &name) else {
                log::debug!("Skipping {name}: empty geometry");
                continue;
            };

            let program = &modules[&material.program];
            let textured = material.program == ProgramKind::Surface;
            let layout = if textured {
                &textured_layout
            } else {
                &untextured_layout
            };
            let pipeline = create_pipeline(&gpu, &name, layout, program, material);

            let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{name} Model Uniforms")),
                size: std::mem::size_of::<ModelUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{name} Model Bind Group")),
                layout: &model_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                }],
            });

            let texture = if textured {
                let handle = material.texture(uniforms::TEXTURE);
                Some(bind_texture(
                    &gpu,
                    &texture_bind_group_layout,
                    &scene.textures,
                    handle,
                    &name,
                ))
            } else {
                None
            };

            items.push(DrawItem {
                node: entry.node,
                name,
                pipeline,
                mesh,
                model_buffer,
                model_bind_group,
                texture,
            });
        }

        let (depth_texture, depth_view) = create_depth_texture(&gpu);
        let depth_size = (gpu.width(), gpu.height());
        log::info!("Globe pass ready: {} draw items", items.len());

        Self {
            gpu,
            frame_buffer,
            frame_bind_group,
            texture_bind_group_layout,
            items,
            depth_texture,
            depth_view,
            depth_size,
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self) {
        let size = (self.gpu.width(), self.gpu.height());
        if self.depth_size != size {
            let (texture, view) = create_depth_texture(&self.gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = size;
        }
    }

    /// Re-uploads textures whose slot changed since the last upload.
    fn refresh_textures(&mut self, assets: &AssetLoader) {
        for item in &mut self.items {
            let Some((handle, version)) = item.texture.as_ref().map(|b| (b.handle, b.version))
            else {
                continue;
            };
            let Some(slot) = assets.slot(handle) else {
                continue;
            };
            if slot.version() != version {
                log::debug!("Uploading new texture for {}", item.name);
                item.texture = Some(bind_texture(
                    &self.gpu,
                    &self.texture_bind_group_layout,
                    assets,
                    Some(handle),
                    &item.name,
                ));
            }
        }
    }
}

impl SceneRenderer for GlobePass {
    fn render(&mut self, scene: &GlobeScene, elapsed: f32) -> Result<(), RenderError> {
        self.refresh_textures(&scene.textures);
        self.ensure_depth_size();

        let Some(output) = self.gpu.acquire_frame()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = FrameUniforms::new(&scene.camera, scene.light.as_ref(), elapsed);
        self.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        let worlds: HashMap<NodeId, (Mat4, &Material)> = scene
            .graph
            .drawables()
            .into_iter()
            .map(|d| (d.node, (d.world, d.drawable.material())))
            .collect();
        for item in &self.items {
            if let Some((world, material)) = worlds.get(&item.node) {
                let model = ModelUniforms::new(*world, material);
                self.gpu
                    .queue
                    .write_buffer(&item.model_buffer, 0, bytemuck::cast_slice(&[model]));
            }
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Globe Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for item in &self.items {
                render_pass.set_pipeline(&item.pipeline);
                render_pass.set_bind_group(1, &item.model_bind_group, &[]);
                if let Some(texture) = &item.texture {
                    render_pass.set_bind_group(2, &texture.bind_group, &[]);
                }
                item.mesh.draw(&mut render_pass);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }
}

fn create_pipeline(
    gpu: &GpuContext,
    name: &str,
    layout: &wgpu::PipelineLayout,
    program: &ProgramModules,
    material: &Material,
) -> wgpu::RenderPipeline {
    let vertex_layout = match material.program {
        ProgramKind::Starfield => StarPoint::LAYOUT,
        ProgramKind::Surface | ProgramKind::Atmosphere => Vertex3d::LAYOUT,
    };

    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{name} Pipeline")),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(blend_state(material.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: cull_mode(material.side),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: material.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

/// Uploads the slot's current pixels, or white if the handle is unknown.
fn bind_texture(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    assets: &AssetLoader,
    handle: Option<TextureHandle>,
    name: &str,
) -> TextureBinding {
    let slot = handle.and_then(|h| assets.slot(h));
    let texture = match slot {
        Some(slot) => Texture::from_data(gpu, slot.data(), &format!("{name} Texture")),
        None => Texture::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "Default White Texture"),
    };

    let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{name} Texture Bind Group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    });

    TextureBinding {
        // Resolves to no slot, so it is never refreshed.
        handle: handle.unwrap_or(TextureHandle(usize::MAX)),
        version: slot.map_or(0, |s| s.version()),
        bind_group,
        _texture: texture,
    }
}

fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: gpu.width(),
            height: gpu.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
