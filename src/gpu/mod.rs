//! GPU state: device setup, simulation buffers, pipelines and the frame loop.
//!
//! Two compute passes per frame (flocking, then geometry expansion) feed three
//! draw stages (boid glyphs, interaction sprites, world boundary). One frame
//! is in flight at a time: [`GpuState::begin_frame`] takes the gate and the
//! submission's completion callback releases it.

mod boundary;
mod gate;

use std::sync::Arc;

use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use boundary::BoundaryState;
pub(crate) use boundary::DEFAULT_LINE_THICKNESS;
pub use gate::FrameGate;

use crate::boids::BoidGpu;
use crate::camera::Camera;
use crate::error::GpuError;
use crate::interaction::InteractionNodeGpu;
use crate::settings::{GlobalSettings, TeamSettingsGpu, MAX_TEAMS};
use crate::shader::{self, GeometryParams, SimParams, Uniforms, VERTICES_PER_BOID};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const WORKGROUP_SIZE: u32 = 256;

/// Starting boid capacity; buffers regrow by powers of two past this.
const MIN_BOID_CAPACITY: u32 = 1024;
const MIN_NODE_CAPACITY: u32 = 16;

const BOID_STRIDE: u64 = std::mem::size_of::<BoidGpu>() as u64;
const NODE_STRIDE: u64 = std::mem::size_of::<InteractionNodeGpu>() as u64;
const RENDER_VERTEX_STRIDE: u64 = std::mem::size_of::<shader::RenderVertex>() as u64;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,

    uniform_buffer: wgpu::Buffer,
    sim_params_buffer: wgpu::Buffer,
    geometry_params_buffer: wgpu::Buffer,
    team_buffer: wgpu::Buffer,

    boid_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    interaction_buffer: wgpu::Buffer,
    boid_capacity: u32,
    node_capacity: u32,
    boid_count: u32,
    node_count: u32,

    flocking_pipeline: wgpu::ComputePipeline,
    flocking_bind_group_layout: wgpu::BindGroupLayout,
    flocking_bind_group: wgpu::BindGroup,
    geometry_pipeline: wgpu::ComputePipeline,
    geometry_bind_group_layout: wgpu::BindGroupLayout,
    geometry_bind_group: wgpu::BindGroup,

    render_pipeline: wgpu::RenderPipeline,
    interaction_pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    boundary: BoundaryState,

    gate: FrameGate,
    pub camera: Camera,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniforms = Uniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            time: 0.0,
            delta_time: 0.0,
            _padding: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sim_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim Params Buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let geometry_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Geometry Params Buffer"),
            size: std::mem::size_of::<GeometryParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let team_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Team Buffer"),
            size: (MAX_TEAMS * std::mem::size_of::<TeamSettingsGpu>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let boid_capacity = MIN_BOID_CAPACITY;
        let node_capacity = MIN_NODE_CAPACITY;
        let (boid_buffer, vertex_buffer, staging_buffer) =
            create_boid_buffers(&device, boid_capacity);
        let interaction_buffer = create_interaction_buffer(&device, node_capacity);

        // Flocking pass: boids rw, params, interaction nodes, team settings.
        let flocking_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Flocking Bind Group Layout"),
                entries: &[
                    storage_entry(0, false),
                    uniform_entry(1, wgpu::ShaderStages::COMPUTE),
                    storage_entry(2, true),
                    storage_entry(3, true),
                ],
            });

        // Geometry pass: render vertices rw, boids ro, team settings, params.
        let geometry_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Geometry Bind Group Layout"),
                entries: &[
                    storage_entry(0, false),
                    storage_entry(1, true),
                    storage_entry(2, true),
                    uniform_entry(3, wgpu::ShaderStages::COMPUTE),
                ],
            });

        let flocking_bind_group = create_flocking_bind_group(
            &device,
            &flocking_bind_group_layout,
            &boid_buffer,
            &sim_params_buffer,
            &interaction_buffer,
            &team_buffer,
        );
        let geometry_bind_group = create_geometry_bind_group(
            &device,
            &geometry_bind_group_layout,
            &vertex_buffer,
            &boid_buffer,
            &team_buffer,
            &geometry_params_buffer,
        );

        let flocking_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flocking Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::FLOCKING_SOURCE.into()),
        });
        let flocking_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Flocking Pipeline Layout"),
                bind_group_layouts: &[&flocking_bind_group_layout],
                push_constant_ranges: &[],
            });
        let flocking_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Flocking Pipeline"),
            layout: Some(&flocking_pipeline_layout),
            module: &flocking_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let geometry_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Geometry Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::GEOMETRY_SOURCE.into()),
        });
        let geometry_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Geometry Pipeline Layout"),
                bind_group_layouts: &[&geometry_bind_group_layout],
                push_constant_ranges: &[],
            });
        let geometry_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Geometry Pipeline"),
            layout: Some(&geometry_pipeline_layout),
            module: &geometry_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        // Draw stages share the camera uniform bind group.
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let render_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Render Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::RENDER_SOURCE.into()),
        });
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: RENDER_VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3, // position
                        },
                        wgpu::VertexAttribute {
                            offset: 12,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32, // speed
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x3, // heading
                        },
                        wgpu::VertexAttribute {
                            offset: 28,
                            shader_location: 3,
                            format: wgpu::VertexFormat::Uint32, // team_id
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let interaction_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Interaction Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::INTERACTION_SOURCE.into()),
        });
        let interaction_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Interaction Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &interaction_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: NODE_STRIDE,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3, // position
                        },
                        wgpu::VertexAttribute {
                            offset: 12,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32, // strength
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &interaction_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                // Sprites blend over the scene without occluding boids.
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let boundary = BoundaryState::new(&device, &uniform_buffer, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            uniform_buffer,
            sim_params_buffer,
            geometry_params_buffer,
            team_buffer,
            boid_buffer,
            vertex_buffer,
            staging_buffer,
            interaction_buffer,
            boid_capacity,
            node_capacity,
            boid_count: 0,
            node_count: 0,
            flocking_pipeline,
            flocking_bind_group_layout,
            flocking_bind_group,
            geometry_pipeline,
            geometry_bind_group_layout,
            geometry_bind_group,
            render_pipeline,
            interaction_pipeline,
            uniform_bind_group,
            boundary,
            gate: FrameGate::new(),
            camera: Camera::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    #[inline]
    pub fn boid_count(&self) -> u32 {
        self.boid_count
    }

    /// Block until the previous frame has fully completed on the device.
    ///
    /// Completion callbacks only fire during polls, so this spins the device
    /// rather than parking on the gate.
    pub fn begin_frame(&self) {
        while !self.gate.try_acquire() {
            let _ = self.device.poll(wgpu::PollType::Poll);
        }
    }

    /// Upload the full boid population, regrowing buffers if needed.
    pub fn upload_boids(&mut self, boids: &[BoidGpu]) {
        let count = boids.len() as u32;
        if count > self.boid_capacity {
            self.boid_capacity = count.next_power_of_two();
            let (boid_buffer, vertex_buffer, staging_buffer) =
                create_boid_buffers(&self.device, self.boid_capacity);
            self.boid_buffer = boid_buffer;
            self.vertex_buffer = vertex_buffer;
            self.staging_buffer = staging_buffer;
            self.rebuild_bind_groups();
            log::debug!("boid buffers regrown to capacity {}", self.boid_capacity);
        }
        if !boids.is_empty() {
            self.queue
                .write_buffer(&self.boid_buffer, 0, bytemuck::cast_slice(boids));
        }
        self.boid_count = count;
    }

    /// Upload the interaction node list, regrowing its buffer if needed.
    pub fn upload_interactions(&mut self, nodes: &[InteractionNodeGpu]) {
        let count = nodes.len() as u32;
        if count > self.node_capacity {
            self.node_capacity = count.next_power_of_two();
            self.interaction_buffer = create_interaction_buffer(&self.device, self.node_capacity);
            self.rebuild_bind_groups();
            log::debug!("node buffer regrown to capacity {}", self.node_capacity);
        }
        if !nodes.is_empty() {
            self.queue
                .write_buffer(&self.interaction_buffer, 0, bytemuck::cast_slice(nodes));
        }
        self.node_count = count;
    }

    pub fn upload_teams(&mut self, teams: &[TeamSettingsGpu; MAX_TEAMS]) {
        self.queue
            .write_buffer(&self.team_buffer, 0, bytemuck::cast_slice(teams));
    }

    pub fn set_line_thickness(&self, thickness: f32) {
        self.boundary.set_line_thickness(&self.queue, thickness);
    }

    fn rebuild_bind_groups(&mut self) {
        self.flocking_bind_group = create_flocking_bind_group(
            &self.device,
            &self.flocking_bind_group_layout,
            &self.boid_buffer,
            &self.sim_params_buffer,
            &self.interaction_buffer,
            &self.team_buffer,
        );
        self.geometry_bind_group = create_geometry_bind_group(
            &self.device,
            &self.geometry_bind_group_layout,
            &self.vertex_buffer,
            &self.boid_buffer,
            &self.team_buffer,
            &self.geometry_params_buffer,
        );
    }

    /// Copy the boid buffer back to the host.
    ///
    /// Call only between frames, with the gate held, so the copy sees a fully
    /// simulated population rather than one mid-dispatch.
    pub fn read_boids(&self) -> Result<Vec<BoidGpu>, GpuError> {
        if self.boid_count == 0 {
            return Ok(Vec::new());
        }
        let bytes = self.boid_count as u64 * BOID_STRIDE;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.boid_buffer, 0, &self.staging_buffer, 0, bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging_buffer.slice(..bytes);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| GpuError::BufferMapping(e.to_string()))?;

        let boids = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice(&data).to_vec()
        };
        self.staging_buffer.unmap();
        Ok(boids)
    }

    /// Encode and submit one frame.
    ///
    /// The caller must hold the gate via [`begin_frame`](Self::begin_frame);
    /// it is released when the device reports the submission complete.
    pub fn render(
        &mut self,
        globals: &GlobalSettings,
        time: f32,
        delta_time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.update_frame_params(globals, time, delta_time);

        // Nothing gets submitted if acquisition fails, so the completion
        // callback will never fire; free the gate here instead.
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                self.gate.release();
                return Err(e);
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if self.boid_count > 0 {
            let workgroups = self.boid_count.div_ceil(WORKGROUP_SIZE);

            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Flocking Pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.flocking_pipeline);
                pass.set_bind_group(0, &self.flocking_bind_group, &[]);
                pass.dispatch_workgroups(workgroups, 1, 1);
            }
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Geometry Pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.geometry_pipeline);
                pass.set_bind_group(0, &self.geometry_bind_group, &[]);
                pass.dispatch_workgroups(workgroups, 1, 1);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Draw Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.boundary.draw(&mut pass);

            if self.boid_count > 0 {
                pass.set_pipeline(&self.render_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..self.boid_count * VERTICES_PER_BOID as u32, 0..1);
            }

            if self.node_count > 0 {
                pass.set_pipeline(&self.interaction_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.interaction_buffer.slice(..));
                pass.draw(0..6, 0..self.node_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        let gate = self.gate.clone();
        self.queue.on_submitted_work_done(move || gate.release());

        output.present();
        Ok(())
    }

    fn update_frame_params(&mut self, globals: &GlobalSettings, time: f32, delta_time: f32) {
        let uniforms = Uniforms {
            view_proj: self.camera.view_proj(self.aspect()).to_cols_array_2d(),
            time,
            delta_time,
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let sim_params = SimParams {
            boid_count: self.boid_count,
            interaction_count: self.node_count,
            teams_enabled: globals.teams_enabled as u32,
            wrap_enabled: globals.wrap_enabled as u32,
            simulation_speed: globals.simulation_speed,
            delta_time,
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.sim_params_buffer, 0, bytemuck::bytes_of(&sim_params));

        let geometry_params = GeometryParams {
            boid_count: self.boid_count,
            _pad: [0; 3],
        };
        self.queue.write_buffer(
            &self.geometry_params_buffer,
            0,
            bytemuck::bytes_of(&geometry_params),
        );
    }
}

fn create_boid_buffers(
    device: &wgpu::Device,
    capacity: u32,
) -> (wgpu::Buffer, wgpu::Buffer, wgpu::Buffer) {
    let boid_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Boid Buffer"),
        size: capacity as u64 * BOID_STRIDE,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });
    let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Render Vertex Buffer"),
        size: capacity as u64 * VERTICES_PER_BOID as u64 * RENDER_VERTEX_STRIDE,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
        mapped_at_creation: false,
    });
    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Boid Staging Buffer"),
        size: capacity as u64 * BOID_STRIDE,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    (boid_buffer, vertex_buffer, staging_buffer)
}

fn create_interaction_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Interaction Node Buffer"),
        size: capacity as u64 * NODE_STRIDE,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_flocking_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    boid_buffer: &wgpu::Buffer,
    sim_params_buffer: &wgpu::Buffer,
    interaction_buffer: &wgpu::Buffer,
    team_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Flocking Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: boid_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: sim_params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: interaction_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: team_buffer.as_entire_binding(),
            },
        ],
    })
}

fn create_geometry_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    vertex_buffer: &wgpu::Buffer,
    boid_buffer: &wgpu::Buffer,
    team_buffer: &wgpu::Buffer,
    geometry_params_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Geometry Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: vertex_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: boid_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: team_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: geometry_params_buffer.as_entire_binding(),
            },
        ],
    })
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
