//! Window event handling and the per-frame schedule.
//!
//! The frame order is fixed: wait out the in-flight frame, sync the boid
//! store from the device if a pending edit needs it, apply queued edits,
//! upload dirty stores, then encode and submit. Pointer input maps through
//! the camera onto the z=0 plane of the world box.

use std::sync::Arc;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::error::SimulationError;
use crate::gpu::GpuState;
use crate::sim::{CursorMode, FlockSim};
use crate::spawn::SpawnPattern;
use crate::time::Time;

const SIM_SPEED_STEP: f32 = 1.25;
const SIM_SPEED_RANGE: (f32, f32) = (0.1, 4.0);
const LINE_THICKNESS_STEP: f32 = 1.5;
const LINE_THICKNESS_RANGE: (f32, f32) = (0.0005, 0.02);

pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    sim: FlockSim,
    time: Time,
    orbiting: bool,
    painting: bool,
    last_mouse_pos: Option<(f64, f64)>,
    cursor_pos: Option<(f64, f64)>,
    line_thickness: f32,
    init_error: Option<SimulationError>,
}

impl App {
    pub fn new(seed: u64) -> Self {
        let mut sim = FlockSim::new(seed);
        sim.request_spawn(SpawnPattern::Centered(Default::default()), true);

        Self {
            window: None,
            gpu: None,
            sim,
            time: Time::new(),
            orbiting: false,
            painting: false,
            last_mouse_pos: None,
            cursor_pos: None,
            line_thickness: crate::gpu::DEFAULT_LINE_THICKNESS,
            init_error: None,
        }
    }

    /// Startup failure recorded before the event loop shut down, if any.
    pub(crate) fn take_init_error(&mut self) -> Option<SimulationError> {
        self.init_error.take()
    }

    /// Project the current cursor position onto the world's z=0 plane.
    fn cursor_world(&self) -> Option<Vec3> {
        let (Some(gpu), Some((x, y))) = (&self.gpu, self.cursor_pos) else {
            return None;
        };
        let ndc_x = (2.0 * x / gpu.config.width as f64 - 1.0) as f32;
        let ndc_y = (1.0 - 2.0 * y / gpu.config.height as f64) as f32;
        Some(gpu.camera.pointer_to_world(ndc_x, ndc_y, gpu.aspect()))
    }

    fn pointer_action(&mut self) {
        if let Some(world) = self.cursor_world() {
            self.sim.pointer_action(world);
        }
    }

    fn pointer_drag(&mut self) {
        if let Some(world) = self.cursor_world() {
            self.sim.pointer_drag(world);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Space => {
                self.time.toggle_pause();
                log::info!(
                    "simulation {}",
                    if self.time.is_paused() { "paused" } else { "resumed" }
                );
            }
            KeyCode::Digit1 => self.sim.request_spawn(SpawnPattern::Single, true),
            KeyCode::Digit2 => self
                .sim
                .request_spawn(SpawnPattern::Centered(Default::default()), true),
            KeyCode::Digit3 => self
                .sim
                .request_spawn(SpawnPattern::Perlin(Default::default()), true),
            KeyCode::KeyR => {
                self.sim.request_clear_nodes();
                self.sim
                    .request_spawn(SpawnPattern::Centered(Default::default()), true);
            }
            KeyCode::KeyQ => self.scale_sim_speed(1.0 / SIM_SPEED_STEP),
            KeyCode::KeyE => self.scale_sim_speed(SIM_SPEED_STEP),
            KeyCode::KeyT => {
                self.sim
                    .settings
                    .update_globals(|g| g.teams_enabled = !g.teams_enabled);
                log::info!(
                    "teams {}",
                    if self.sim.settings.globals().teams_enabled {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
            }
            KeyCode::KeyW => {
                self.sim
                    .settings
                    .update_globals(|g| g.wrap_enabled = !g.wrap_enabled);
                log::info!(
                    "boundary mode: {}",
                    if self.sim.settings.globals().wrap_enabled {
                        "wrap"
                    } else {
                        "walls"
                    }
                );
            }
            KeyCode::KeyC => self.sim.request_clear_nodes(),
            KeyCode::BracketLeft => self.scale_line_thickness(1.0 / LINE_THICKNESS_STEP),
            KeyCode::BracketRight => self.scale_line_thickness(LINE_THICKNESS_STEP),
            KeyCode::KeyD => {
                self.sim.cursor_mode = match self.sim.cursor_mode {
                    CursorMode::Draw => CursorMode::Spawn { team: 0 },
                    CursorMode::Spawn { team } if team + 1 < 3 => {
                        CursorMode::Spawn { team: team + 1 }
                    }
                    CursorMode::Spawn { .. } => CursorMode::Draw,
                };
                log::info!("cursor mode: {:?}", self.sim.cursor_mode);
            }
            _ => {}
        }
    }

    fn scale_sim_speed(&mut self, factor: f32) {
        self.sim.settings.update_globals(|g| {
            g.simulation_speed =
                (g.simulation_speed * factor).clamp(SIM_SPEED_RANGE.0, SIM_SPEED_RANGE.1);
        });
        log::info!(
            "simulation speed: {:.2}",
            self.sim.settings.globals().simulation_speed
        );
    }

    fn scale_line_thickness(&mut self, factor: f32) {
        self.line_thickness = (self.line_thickness * factor)
            .clamp(LINE_THICKNESS_RANGE.0, LINE_THICKNESS_RANGE.1);
        if let Some(gpu) = &self.gpu {
            gpu.set_line_thickness(self.line_thickness);
        }
        log::info!("boundary line thickness: {:.4}", self.line_thickness);
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        // A held right button keeps streaming its cursor action.
        if self.painting {
            if let Some(world) = self.cursor_world() {
                self.sim.pointer_held(world);
            }
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let (elapsed, delta) = self.time.update();

        // Nothing may be in flight while we read back or re-upload.
        gpu.begin_frame();

        if self.sim.has_pending() {
            if self.sim.needs_device_sync() {
                match gpu.read_boids() {
                    Ok(raw) => self.sim.boids.sync_from_gpu(&raw),
                    Err(e) => log::warn!("boid readback failed, applying to stale state: {e}"),
                }
            }
            self.sim.apply_intents();
        }

        if self.sim.boids.is_dirty() {
            gpu.upload_boids(&self.sim.boids.to_gpu());
            self.sim.boids.mark_clean();
        }
        if self.sim.interactions.is_dirty() {
            gpu.upload_interactions(&self.sim.interactions.to_gpu());
            self.sim.interactions.mark_clean();
        }
        if self.sim.settings.is_dirty() {
            gpu.upload_teams(&self.sim.settings.teams_gpu());
            self.sim.settings.mark_clean();
        }

        match gpu.render(self.sim.settings.globals(), elapsed, delta) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = winit::dpi::PhysicalSize {
                    width: gpu.config.width,
                    height: gpu.config.height,
                };
                gpu.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("device out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("frame skipped: {e:?}"),
        }

        if self.time.frame() % 300 == 0 {
            log::debug!(
                "frame {}: {} boids, {:.1} fps",
                self.time.frame(),
                gpu.boid_count(),
                self.time.fps()
            );
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("flock")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => {
                self.window = Some(window);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                self.init_error = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(key);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Left => {
                    self.orbiting = state == ElementState::Pressed;
                    if !self.orbiting {
                        self.last_mouse_pos = None;
                    }
                }
                MouseButton::Right => {
                    self.painting = state == ElementState::Pressed;
                    if self.painting {
                        self.pointer_action();
                    }
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = Some((position.x, position.y));
                if self.painting {
                    self.pointer_drag();
                }
                if self.orbiting {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;

                        if let Some(gpu) = &mut self.gpu {
                            gpu.camera.yaw -= dx as f32 * 0.005;
                            gpu.camera.pitch += dy as f32 * 0.005;
                            gpu.camera.pitch = gpu.camera.pitch.clamp(-1.5, 1.5);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu) = &mut self.gpu {
                    gpu.camera.distance -= scroll * 0.3;
                    gpu.camera.distance = gpu.camera.distance.clamp(0.5, 20.0);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GpuError;

    #[test]
    fn test_startup_errors_surface_through_take() {
        let mut app = App::new(1);
        assert!(app.take_init_error().is_none());

        app.init_error = Some(GpuError::NoAdapter.into());
        let err = app.take_init_error();
        assert!(matches!(err, Some(SimulationError::Gpu(GpuError::NoAdapter))));
        assert!(app.take_init_error().is_none());
    }
}
