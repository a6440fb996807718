//! Boid agents and their host-side store.
//!
//! The store owns the canonical boid list on the CPU. The GPU buffer is a
//! mirror: uploads happen when the list changes, and before any CPU-side
//! mutation of survivors the store is refreshed from the device so edits
//! apply to current positions rather than stale spawn-time data.

use glam::Vec3;

use crate::shader::VERTICES_PER_BOID;

/// A single flocking agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Per-boid speed ceiling, assigned at spawn time.
    pub max_velocity: f32,
    pub team_id: u32,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3, max_velocity: f32, team_id: u32) -> Self {
        Self {
            position,
            velocity,
            max_velocity,
            team_id,
        }
    }
}

/// GPU-side boid layout. Must match `Boid` in `flocking.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoidGpu {
    pub position: [f32; 3],
    pub max_velocity: f32,
    pub velocity: [f32; 3],
    pub team_id: u32,
}

const _: () = assert!(std::mem::size_of::<BoidGpu>() == 32);
const _: () = assert!(std::mem::offset_of!(BoidGpu, max_velocity) == 12);
const _: () = assert!(std::mem::offset_of!(BoidGpu, velocity) == 16);
const _: () = assert!(std::mem::offset_of!(BoidGpu, team_id) == 28);

impl From<&Boid> for BoidGpu {
    fn from(boid: &Boid) -> Self {
        Self {
            position: boid.position.to_array(),
            max_velocity: boid.max_velocity,
            velocity: boid.velocity.to_array(),
            team_id: boid.team_id,
        }
    }
}

impl From<&BoidGpu> for Boid {
    fn from(raw: &BoidGpu) -> Self {
        Self {
            position: Vec3::from_array(raw.position),
            velocity: Vec3::from_array(raw.velocity),
            max_velocity: raw.max_velocity,
            team_id: raw.team_id,
        }
    }
}

/// Host-side boid list with a dirty flag driving GPU uploads.
#[derive(Debug, Default)]
pub struct BoidStore {
    boids: Vec<Boid>,
    dirty: bool,
}

impl BoidStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    #[inline]
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Total render vertices the geometry pass will emit for this population.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.boids.len() * VERTICES_PER_BOID
    }

    /// Replace the whole population.
    pub fn reset(&mut self, boids: Vec<Boid>) {
        self.boids = boids;
        self.dirty = true;
    }

    /// Add boids while keeping existing ones.
    ///
    /// Callers must refresh the store from the device first so survivors keep
    /// their simulated state across the re-upload.
    pub fn append(&mut self, boids: impl IntoIterator<Item = Boid>) {
        self.boids.extend(boids);
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.boids.clear();
        self.dirty = true;
    }

    /// Overwrite host state with a device readback.
    ///
    /// Does not mark the store dirty: device and host now agree.
    pub fn sync_from_gpu(&mut self, raw: &[BoidGpu]) {
        self.boids.clear();
        self.boids.extend(raw.iter().map(Boid::from));
    }

    /// Pack the population for upload.
    pub fn to_gpu(&self) -> Vec<BoidGpu> {
        self.boids.iter().map(BoidGpu::from).collect()
    }

    /// Whether host state has changed since the last upload.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after an upload.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boid(x: f32) -> Boid {
        Boid::new(Vec3::new(x, 0.0, 0.0), Vec3::ZERO, 2.1, 0)
    }

    #[test]
    fn test_reset_marks_dirty() {
        let mut store = BoidStore::new();
        assert!(!store.is_dirty());

        store.reset(vec![boid(0.1), boid(0.2)]);
        assert_eq!(store.len(), 2);
        assert!(store.is_dirty());

        store.mark_clean();
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_append_keeps_existing() {
        let mut store = BoidStore::new();
        store.reset(vec![boid(0.1)]);
        store.mark_clean();

        store.append([boid(0.5)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.boids()[0].position.x, 0.1);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_gpu_round_trip() {
        let mut store = BoidStore::new();
        let original = Boid::new(
            Vec3::new(0.25, -0.5, 0.75),
            Vec3::new(1.0, 2.0, 3.0),
            2.4,
            1,
        );
        store.reset(vec![original]);

        let packed = store.to_gpu();
        let mut other = BoidStore::new();
        other.sync_from_gpu(&packed);

        assert_eq!(other.boids()[0], original);
        assert!(!other.is_dirty());
    }

    #[test]
    fn test_vertex_count() {
        let mut store = BoidStore::new();
        store.reset(vec![boid(0.0); 5]);
        assert_eq!(store.vertex_count(), 5 * VERTICES_PER_BOID);
    }
}
