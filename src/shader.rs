//! WGSL kernel sources and the host-side structs that must match their
//! layouts byte for byte.

use bytemuck::{Pod, Zeroable};

pub const FLOCKING_SOURCE: &str = include_str!("flocking.wgsl");
pub const GEOMETRY_SOURCE: &str = include_str!("geometry.wgsl");
pub const RENDER_SOURCE: &str = include_str!("render.wgsl");
pub const BOUNDARY_SOURCE: &str = include_str!("boundary.wgsl");
pub const INTERACTION_SOURCE: &str = include_str!("interaction.wgsl");

/// Vertices emitted per boid by the geometry kernel (tetrahedral dart,
/// four triangles).
pub const VERTICES_PER_BOID: usize = 12;

/// Per-frame uniform block shared by the draw stages.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub time: f32,
    pub delta_time: f32,
    pub _padding: [f32; 2],
}

/// Uniform block consumed by the flocking kernel.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct SimParams {
    pub boid_count: u32,
    pub interaction_count: u32,
    pub teams_enabled: u32,
    pub wrap_enabled: u32,
    pub simulation_speed: f32,
    pub delta_time: f32,
    pub _pad: [f32; 2],
}

/// Uniform block consumed by the geometry kernel.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GeometryParams {
    pub boid_count: u32,
    pub _pad: [u32; 3],
}

/// Output element of the geometry kernel and input of the boid draw stage.
/// Never authored on the CPU; defined here to size the vertex buffer and pin
/// the attribute offsets.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct RenderVertex {
    pub position: [f32; 3],
    pub speed: f32,
    pub heading: [f32; 3],
    pub team_id: u32,
}

const _: () = assert!(
    std::mem::size_of::<SimParams>() == 32,
    "size of SimParams does not match WGSL"
);
const _: () = assert!(
    std::mem::size_of::<GeometryParams>() == 16,
    "size of GeometryParams does not match WGSL"
);
const _: () = assert!(
    std::mem::size_of::<RenderVertex>() == 32,
    "size of RenderVertex does not match WGSL"
);
const _: () = assert!(
    std::mem::offset_of!(RenderVertex, speed) == 12,
    "offset of RenderVertex.speed does not match WGSL"
);
const _: () = assert!(
    std::mem::offset_of!(RenderVertex, heading) == 16,
    "offset of RenderVertex.heading does not match WGSL"
);
const _: () = assert!(
    std::mem::offset_of!(RenderVertex, team_id) == 28,
    "offset of RenderVertex.team_id does not match WGSL"
);
