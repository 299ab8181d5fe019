use std::sync::Arc;

use anyhow::{anyhow, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::DemoConfig;
use crate::core::{GpuContext, DEPTH_FORMAT};
use crate::loaders::{load_obj, ImageData};
use crate::math::Matrix4;
use crate::mesh::{Mesh, MeshData};
use crate::overlay::FpsOverlay;
use crate::scene::FrameTransforms;
use crate::shader::{Shader, UniformLocation, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::texture::Texture;
use crate::types::{FrameUniform, ObjectUniform, Vertex};

/// Which per-frame model-view a drawable takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawableKind {
    Mesh,
    Sphere,
    Box,
}

impl DrawableKind {
    pub fn model_view(&self, transforms: &FrameTransforms) -> Matrix4 {
        match self {
            DrawableKind::Mesh => transforms.mesh_model_view,
            DrawableKind::Sphere => transforms.sphere_model_view,
            DrawableKind::Box => transforms.box_model_view,
        }
    }
}

/// Mesh, texture and model-view uniform for one object in the scene
struct Drawable {
    kind: DrawableKind,
    mesh: Mesh,
    texture: Texture,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Forward renderer for the three textured drawables
///
/// Sole owner of every device resource; dropping it releases them all.
pub struct Renderer {
    // Field order is drop order: everything created from the device goes first.
    overlay: Option<FpsOverlay>,
    drawables: Vec<Drawable>,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    frame_location: Option<UniformLocation>,
    object_location: Option<UniformLocation>,
    clear_color: wgpu::Color,
    gpu: GpuContext,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &DemoConfig) -> Result<Self> {
        let gpu = GpuContext::new(window.clone(), config.vsync).await?;
        let device = gpu.device();
        let assets = &config.assets;

        let (width, height) = gpu.size();
        let aspect = config.projection.aspect_for(width, height);
        log::debug!("Initial projection (aspect {:.3}):\n{}", aspect, config.projection.matrix(aspect));

        let shader = Shader::create(
            device,
            assets.resolve(&assets.vertex_shader),
            assets.resolve(&assets.fragment_shader),
        )?;
        let frame_location = shader.uniform_location("frame");
        let object_location = shader.uniform_location("object");

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
            label: Some("frame_bind_group_layout"),
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_layout_entry(wgpu::ShaderStages::VERTEX)],
            label: Some("object_bind_group_layout"),
        });
        let texture_layout = Texture::bind_group_layout(device);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::cast_slice(&[FrameUniform {
                projection: Matrix4::identity(),
                illumination: Matrix4::identity(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let pipeline = Self::create_pipeline(
            device,
            &shader,
            &[&frame_layout, &object_layout, &texture_layout],
            gpu.format(),
        )?;

        let [dx, dy, dz] = assets.box_size;
        let meshes = [
            (DrawableKind::Mesh, load_obj(assets.resolve(&assets.mesh))?, &assets.mesh_texture),
            (
                DrawableKind::Sphere,
                MeshData::sphere(assets.sphere_radius, assets.sphere_segments),
                &assets.sphere_texture,
            ),
            (DrawableKind::Box, MeshData::cuboid(dx, dy, dz), &assets.box_texture),
        ];

        let mut drawables = Vec::with_capacity(meshes.len());
        for (kind, data, texture_path) in meshes {
            let label = format!("{:?}", kind);
            let texture = match texture_path {
                Some(path) => Texture::from_file(device, gpu.queue(), &texture_layout, assets.resolve(path))?,
                None => {
                    log::info!("{} has no texture configured, using a checkerboard", label);
                    let image = ImageData::checkerboard(256, 8, [230, 230, 230, 255], [90, 90, 90, 255]);
                    Texture::from_image(device, gpu.queue(), &texture_layout, &image, &label)?
                }
            };

            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Uniforms", label)),
                contents: bytemuck::cast_slice(&[ObjectUniform {
                    model_view: Matrix4::identity(),
                }]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
                label: Some(&label),
            });

            drawables.push(Drawable {
                kind,
                mesh: Mesh::upload(device, &data, &label),
                texture,
                uniform_buffer,
                bind_group,
            });
        }

        let overlay = config
            .show_ui
            .then(|| FpsOverlay::new(&window, device, gpu.format()));

        log::info!("Renderer initialized: {} drawables", drawables.len());

        Ok(Self {
            overlay,
            drawables,
            pipeline,
            frame_buffer,
            frame_bind_group,
            frame_location,
            object_location,
            clear_color: config.wgpu_clear_color(),
            gpu,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader: &Shader,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        surface_format: wgpu::TextureFormat,
    ) -> Result<wgpu::RenderPipeline> {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader.vertex_module(),
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader.fragment_module(),
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => Err(anyhow!("Failed to create render pipeline: {}", error)),
            None => Ok(pipeline),
        }
    }

    /// Current framebuffer size
    pub fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    /// Follow the window size; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.gpu.resize(width, height) {
            log::debug!("Surface resized to {}x{}", width, height);
        }
    }

    /// Recover from a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.handle_event(window, event),
            None => false,
        }
    }

    /// Push this frame's uniforms, draw every drawable and present
    pub fn render(
        &mut self,
        transforms: &FrameTransforms,
        window: &Window,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let queue = self.gpu.queue();

        if self.frame_location.is_some() {
            let frame = FrameUniform {
                projection: transforms.projection,
                illumination: transforms.illumination,
            };
            queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));
        }
        if self.object_location.is_some() {
            for drawable in &self.drawables {
                let object = ObjectUniform {
                    model_view: drawable.kind.model_view(transforms),
                };
                queue.write_buffer(&drawable.uniform_buffer, 0, bytemuck::cast_slice(&[object]));
            }
        }

        let output = self.gpu.surface().get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
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
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for drawable in &self.drawables {
                render_pass.set_bind_group(1, &drawable.bind_group, &[]);
                render_pass.set_bind_group(2, drawable.texture.id(), &[]);
                drawable.mesh.render(&mut render_pass);
            }
        }

        let size = self.gpu.size();
        let overlay_buffers = match &mut self.overlay {
            Some(overlay) => overlay.draw(
                self.gpu.device(),
                self.gpu.queue(),
                &mut encoder,
                &view,
                window,
                size,
                fps,
            ),
            None => Vec::new(),
        };

        self.gpu
            .queue()
            .submit(overlay_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

fn uniform_layout_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{compose_frame, ProjectionParams, Rotation, SceneParams};

    #[test]
    fn test_drawables_pick_their_model_view() {
        let transforms = compose_frame(
            &SceneParams::default(),
            &ProjectionParams::default(),
            2.0,
            Rotation::default(),
            Rotation::default(),
            1.0,
        );
        assert_eq!(DrawableKind::Mesh.model_view(&transforms), transforms.mesh_model_view);
        assert_eq!(DrawableKind::Sphere.model_view(&transforms), transforms.sphere_model_view);
        assert_eq!(DrawableKind::Box.model_view(&transforms), transforms.box_model_view);
    }
}
