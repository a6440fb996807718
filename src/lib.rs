//! # flock - GPU boids playground
//!
//! An interactive flocking simulator where the whole simulation lives on the
//! GPU: a compute pass integrates separation, cohesion, alignment, cross-team
//! forces, interaction-node charges and world-boundary handling; a second
//! compute pass expands each boid into an oriented glyph that is drawn
//! directly from the device-side buffer.
//!
//! The CPU keeps authoritative mirrors of boids, settings and interaction
//! nodes. Edits are queued as intents and applied between frames, after
//! reading current positions back from the device, so a re-upload never
//! rewinds the flock to its spawn state.
//!
//! ## Controls
//!
//! - Left drag orbits, wheel zooms
//! - Right button drops a repulsor or spawns boids, depending on cursor mode
//!   (`D` cycles: draw, spawn team 0/1/2); holding it paints a trail of
//!   repulsors or streams boids at the cursor
//! - `1`/`2`/`3` respawn with the single, centered or noise-density pattern
//! - `Space` pauses, `Q`/`E` change simulation speed
//! - `T` toggles teams, `W` toggles wrap-around walls, `C` clears nodes,
//!   `R` resets the scene, `[`/`]` adjust the boundary line thickness

mod app;
mod boids;
mod camera;
mod error;
mod flocking;
mod gpu;
mod interaction;
mod perlin;
mod settings;
mod shader;
mod sim;
mod spawn;
mod time;

pub use app::App;
pub use boids::{Boid, BoidGpu, BoidStore};
pub use camera::Camera;
pub use error::{GpuError, SimulationError};
pub use flocking::{step, WALL_MARGIN, WALL_STIFFNESS, WORLD_EXTENT};
pub use gpu::{FrameGate, GpuState};
pub use interaction::{InteractionNode, InteractionNodeGpu, InteractionStore};
pub use perlin::PerlinGenerator;
pub use settings::{
    GlobalSettings, SettingsStore, TeamSettings, TeamSettingsGpu, MAX_TEAMS,
};
pub use shader::{
    BOUNDARY_SOURCE, FLOCKING_SOURCE, GEOMETRY_SOURCE, INTERACTION_SOURCE, RENDER_SOURCE,
    VERTICES_PER_BOID,
};
pub use sim::{CursorMode, FlockSim, Intent};
pub use spawn::{defaults, CenteredParams, PerlinParams, SpawnPattern};
pub use time::Time;

use winit::event_loop::{ControlFlow, EventLoop};

/// Open a window and run the simulation until it is closed.
pub fn run(seed: u64) -> Result<(), SimulationError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(seed);
    event_loop.run_app(&mut app)?;

    match app.take_init_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
