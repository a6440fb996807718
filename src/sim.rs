//! Host-side simulation state.
//!
//! [`FlockSim`] owns the three stores and a queue of pending intents. Intents
//! that edit the boid population are applied only after the caller has synced
//! the store from the device, so appends and pointer spawns operate on
//! current positions instead of stale spawn-time data.

use glam::Vec3;

use crate::boids::{Boid, BoidStore};
use crate::interaction::{InteractionNode, InteractionStore};
use crate::settings::SettingsStore;
use crate::spawn::{CenteredParams, SpawnPattern};

/// What a right-button press at the pointer does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorMode {
    /// Drop a repulsor node at the pointer.
    Draw,
    /// Spawn a handful of boids for the selected team at the pointer.
    Spawn { team: u32 },
}

/// Boids added per pointer spawn.
const POINTER_SPAWN_COUNT: usize = 8;
/// Boids streamed per frame while the spawn cursor stays held.
const HELD_SPAWN_COUNT: usize = 1;
/// Strength of pointer-drawn repulsors.
const DRAWN_NODE_STRENGTH: f32 = 1.0;

/// A deferred edit, applied after the device sync point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Run a spawn pattern, replacing or extending the population.
    Spawn {
        pattern: SpawnPattern,
        replace: bool,
    },
    /// Add boids around a world-space point.
    SpawnAt {
        position: Vec3,
        team: u32,
        count: usize,
    },
    /// Drop an interaction node.
    AddNode(InteractionNode),
    /// Remove every interaction node.
    ClearNodes,
    /// Remove every boid.
    ClearBoids,
}

impl Intent {
    /// Whether applying this intent rewrites the boid buffer.
    fn touches_boids(&self) -> bool {
        matches!(
            self,
            Intent::Spawn { .. } | Intent::SpawnAt { .. } | Intent::ClearBoids
        )
    }
}

/// The whole host-side simulation.
pub struct FlockSim {
    pub boids: BoidStore,
    pub settings: SettingsStore,
    pub interactions: InteractionStore,
    pub cursor_mode: CursorMode,
    pending: Vec<Intent>,
    spawn_seed: u64,
}

impl FlockSim {
    pub fn new(seed: u64) -> Self {
        Self {
            boids: BoidStore::new(),
            settings: SettingsStore::new(),
            interactions: InteractionStore::new(),
            cursor_mode: CursorMode::Draw,
            pending: Vec::new(),
            spawn_seed: seed,
        }
    }

    /// Queue a spawn pattern.
    pub fn request_spawn(&mut self, pattern: SpawnPattern, replace: bool) {
        self.pending.push(Intent::Spawn { pattern, replace });
    }

    /// Queue whatever the current cursor mode does at `world_pos`.
    pub fn pointer_action(&mut self, world_pos: Vec3) {
        match self.cursor_mode {
            CursorMode::Draw => {
                self.pending.push(Intent::AddNode(InteractionNode::new(
                    world_pos,
                    DRAWN_NODE_STRENGTH,
                )));
            }
            CursorMode::Spawn { team } => {
                self.pending.push(Intent::SpawnAt {
                    position: world_pos,
                    team,
                    count: POINTER_SPAWN_COUNT,
                });
            }
        }
    }

    /// Queue the draw-mode action for pointer motion while the button stays
    /// held. Dragging paints a trail of repulsors; spawn mode streams per
    /// frame through [`pointer_held`](Self::pointer_held) instead.
    pub fn pointer_drag(&mut self, world_pos: Vec3) {
        if self.cursor_mode == CursorMode::Draw {
            self.pending.push(Intent::AddNode(InteractionNode::new(
                world_pos,
                DRAWN_NODE_STRENGTH,
            )));
        }
    }

    /// Queue the per-frame action while the pointer stays held. In spawn mode
    /// each frame emits a small trickle of boids at the cursor.
    pub fn pointer_held(&mut self, world_pos: Vec3) {
        if let CursorMode::Spawn { team } = self.cursor_mode {
            self.pending.push(Intent::SpawnAt {
                position: world_pos,
                team,
                count: HELD_SPAWN_COUNT,
            });
        }
    }

    pub fn request_clear_nodes(&mut self) {
        self.pending.push(Intent::ClearNodes);
    }

    pub fn request_clear_boids(&mut self) {
        self.pending.push(Intent::ClearBoids);
    }

    /// Whether applying the queue requires a device readback first.
    ///
    /// Only population edits over a live flock need one: node edits never
    /// touch the boid buffer, and with no survivors there is nothing to sync.
    pub fn needs_device_sync(&self) -> bool {
        !self.boids.is_empty() && self.pending.iter().any(Intent::touches_boids)
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain and apply the intent queue.
    ///
    /// The caller must have refreshed the boid store from the device if
    /// [`needs_device_sync`](Self::needs_device_sync) returned true.
    pub fn apply_intents(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for intent in pending {
            match intent {
                Intent::Spawn { pattern, replace } => {
                    let boids = pattern.generate(self.next_seed());
                    if replace {
                        self.boids.reset(boids);
                    } else {
                        self.boids.append(boids);
                    }
                }
                Intent::SpawnAt {
                    position,
                    team,
                    count,
                } => {
                    let boids = spawn_at(position, team, count, self.next_seed());
                    self.boids.append(boids);
                }
                Intent::AddNode(node) => self.interactions.push(node),
                Intent::ClearNodes => self.interactions.clear(),
                Intent::ClearBoids => self.boids.clear(),
            }
        }
    }

    fn next_seed(&mut self) -> u64 {
        self.spawn_seed = self.spawn_seed.wrapping_add(1);
        self.spawn_seed
    }
}

/// A tight cluster for pointer spawns, jittered like the centered burst.
fn spawn_at(position: Vec3, team: u32, count: usize, seed: u64) -> Vec<Boid> {
    let params = CenteredParams {
        majority_count: count,
        minority_count: 0,
        jitter: 0.01,
        ..Default::default()
    };
    let mut boids = SpawnPattern::Centered(params).generate(seed);
    for boid in &mut boids {
        boid.position += position;
        boid.team_id = team;
    }
    boids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_replace_and_append() {
        let mut sim = FlockSim::new(1);
        sim.request_spawn(SpawnPattern::Single, true);
        sim.apply_intents();
        assert_eq!(sim.boids.len(), 2);

        sim.request_spawn(SpawnPattern::Single, false);
        sim.apply_intents();
        assert_eq!(sim.boids.len(), 4);

        sim.request_spawn(SpawnPattern::Single, true);
        sim.apply_intents();
        assert_eq!(sim.boids.len(), 2);
    }

    #[test]
    fn test_sync_needed_only_for_population_edits() {
        let mut sim = FlockSim::new(1);

        // Empty flock: nothing to sync even for a spawn.
        sim.request_spawn(SpawnPattern::Single, false);
        assert!(!sim.needs_device_sync());
        sim.apply_intents();

        // Node edits never need a sync.
        sim.request_clear_nodes();
        assert!(!sim.needs_device_sync());
        sim.apply_intents();

        // Appending over a live flock does.
        sim.request_spawn(SpawnPattern::Single, false);
        assert!(sim.needs_device_sync());
    }

    #[test]
    fn test_pointer_draw_adds_node() {
        let mut sim = FlockSim::new(1);
        sim.cursor_mode = CursorMode::Draw;
        sim.pointer_action(Vec3::new(0.2, 0.3, 0.0));
        sim.apply_intents();

        assert_eq!(sim.interactions.len(), 2);
        let node = sim.interactions.nodes()[1];
        assert_eq!(node.position, Vec3::new(0.2, 0.3, 0.0));
        assert!(node.strength > 0.0);
    }

    #[test]
    fn test_pointer_spawn_adds_team_cluster() {
        let mut sim = FlockSim::new(1);
        sim.cursor_mode = CursorMode::Spawn { team: 2 };
        sim.pointer_action(Vec3::new(-0.5, 0.0, 0.5));
        sim.apply_intents();

        assert_eq!(sim.boids.len(), POINTER_SPAWN_COUNT);
        for boid in sim.boids.boids() {
            assert_eq!(boid.team_id, 2);
            assert!((boid.position - Vec3::new(-0.5, 0.0, 0.5)).length() < 0.05);
        }
    }

    #[test]
    fn test_drag_paints_a_node_trail() {
        let mut sim = FlockSim::new(1);
        sim.cursor_mode = CursorMode::Draw;
        sim.pointer_action(Vec3::ZERO);
        for i in 1..=4 {
            sim.pointer_drag(Vec3::new(i as f32 * 0.1, 0.0, 0.0));
        }
        sim.apply_intents();

        // seed node + press + four motion samples
        assert_eq!(sim.interactions.len(), 6);

        // spawn mode leaves trail painting to the per-frame stream
        sim.cursor_mode = CursorMode::Spawn { team: 0 };
        sim.pointer_drag(Vec3::ZERO);
        assert!(!sim.has_pending());
    }

    #[test]
    fn test_held_spawn_streams_per_frame() {
        let mut sim = FlockSim::new(1);
        sim.cursor_mode = CursorMode::Spawn { team: 1 };
        sim.pointer_action(Vec3::ZERO);
        for _ in 0..10 {
            sim.pointer_held(Vec3::ZERO);
        }
        sim.apply_intents();

        assert_eq!(sim.boids.len(), POINTER_SPAWN_COUNT + 10 * HELD_SPAWN_COUNT);

        // a held pointer in draw mode adds nothing between motion events
        sim.cursor_mode = CursorMode::Draw;
        sim.pointer_held(Vec3::ZERO);
        assert!(!sim.has_pending());
    }

    #[test]
    fn test_clear_boids() {
        let mut sim = FlockSim::new(1);
        sim.request_spawn(SpawnPattern::Single, true);
        sim.apply_intents();
        assert!(!sim.needs_device_sync());

        sim.request_clear_boids();
        assert!(sim.needs_device_sync());
        sim.apply_intents();
        assert!(sim.boids.is_empty());
    }
}
