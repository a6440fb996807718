//! Spawn patterns for populating the flock.
//!
//! Three patterns: a single probe boid, a two-team burst collapsed onto the
//! world center, and a density field driven by gradient noise. Every pattern
//! routes through [`SpawnPattern::generate`] so callers replace or extend the
//! population with one call.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::boids::Boid;
use crate::perlin::PerlinGenerator;

/// Spawn-time constants shared by the patterns.
pub mod defaults {
    /// Base per-boid speed ceiling.
    pub const BASE_MAX_SPEED: f32 = 2.1;
    /// Upper bound of the squared jitter added to the ceiling.
    pub const MAX_SPEED_JITTER: f32 = 0.75;

    /// Majority-team population of the centered burst.
    pub const MAJORITY_COUNT: usize = 7000;
    /// Minority-team population of the centered burst.
    pub const MINORITY_COUNT: usize = 5;
    /// Positional jitter separating burst boids from the exact center.
    pub const CENTER_JITTER: f32 = 1e-7;
    /// Extra speed ceiling granted to the minority team.
    pub const MINORITY_SPEED_BONUS: f32 = 1.5;

    /// Cells per axis of the density spawn grid.
    pub const PERLIN_GRID_SIZE: usize = 50;
    /// Boids per fully saturated cell.
    pub const PERLIN_DENSITY: f32 = 7.0;
    pub const PERLIN_OCTAVES: u32 = 1;
    pub const PERLIN_PERSISTENCE: f32 = 0.0;
    pub const PERLIN_ZOOM: f32 = 10.0;
}

/// Parameters for the two-team centered burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenteredParams {
    pub majority_count: usize,
    pub minority_count: usize,
    /// Half-width of the positional jitter around the center.
    pub jitter: f32,
    /// Added to the minority team's speed ceiling.
    pub minority_speed_bonus: f32,
}

impl Default for CenteredParams {
    fn default() -> Self {
        Self {
            majority_count: defaults::MAJORITY_COUNT,
            minority_count: defaults::MINORITY_COUNT,
            jitter: defaults::CENTER_JITTER,
            minority_speed_bonus: defaults::MINORITY_SPEED_BONUS,
        }
    }
}

/// Parameters for the noise-density spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerlinParams {
    pub grid_size: usize,
    pub density: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub zoom: f32,
}

impl Default for PerlinParams {
    fn default() -> Self {
        Self {
            grid_size: defaults::PERLIN_GRID_SIZE,
            density: defaults::PERLIN_DENSITY,
            octaves: defaults::PERLIN_OCTAVES,
            persistence: defaults::PERLIN_PERSISTENCE,
            zoom: defaults::PERLIN_ZOOM,
        }
    }
}

/// How a spawn request places boids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPattern {
    /// Exactly two boids near the center, one per team, drifting upward.
    /// Small enough to watch a single pairwise interaction.
    Single,
    /// A dense two-team burst around the world center.
    Centered(CenteredParams),
    /// Population density follows a seeded noise field over the world box.
    Perlin(PerlinParams),
}

impl SpawnPattern {
    /// Generate the boid list for this pattern.
    ///
    /// The same seed always produces the same list.
    pub fn generate(&self, seed: u64) -> Vec<Boid> {
        let mut rng = SmallRng::seed_from_u64(seed);
        match self {
            SpawnPattern::Single => spawn_single(&mut rng),
            SpawnPattern::Centered(params) => spawn_centered(params, &mut rng),
            SpawnPattern::Perlin(params) => spawn_perlin(params, seed, &mut rng),
        }
    }
}

/// Draw a speed ceiling: base plus a squared jitter, biased toward the base.
fn roll_max_velocity(rng: &mut SmallRng) -> f32 {
    let jitter: f32 = rng.gen_range(0.0..=defaults::MAX_SPEED_JITTER);
    defaults::BASE_MAX_SPEED + jitter * jitter
}

fn spawn_single(rng: &mut SmallRng) -> Vec<Boid> {
    let drift = Vec3::new(0.0, 0.001, 0.0);
    vec![
        Boid::new(Vec3::new(0.0, 0.1, 0.0), drift, roll_max_velocity(rng), 0),
        Boid::new(Vec3::ZERO, drift, roll_max_velocity(rng), 1),
    ]
}

fn spawn_centered(params: &CenteredParams, rng: &mut SmallRng) -> Vec<Boid> {
    let mut boids = Vec::with_capacity(params.majority_count + params.minority_count);

    let mut jittered = |rng: &mut SmallRng| {
        Vec3::new(
            rng.gen_range(-params.jitter..=params.jitter),
            rng.gen_range(-params.jitter..=params.jitter),
            rng.gen_range(-params.jitter..=params.jitter),
        )
    };

    for _ in 0..params.majority_count {
        let position = jittered(rng);
        boids.push(Boid::new(position, Vec3::ZERO, roll_max_velocity(rng), 0));
    }
    for _ in 0..params.minority_count {
        let position = jittered(rng);
        let max_velocity = roll_max_velocity(rng) + params.minority_speed_bonus;
        boids.push(Boid::new(position, Vec3::ZERO, max_velocity, 1));
    }

    boids
}

fn spawn_perlin(params: &PerlinParams, seed: u64, rng: &mut SmallRng) -> Vec<Boid> {
    let noise = PerlinGenerator::new(seed, params.octaves, params.persistence, params.zoom);
    let mut boids = Vec::new();

    let cell_size = 2.0 / params.grid_size as f32;
    for xi in 0..params.grid_size {
        for yi in 0..params.grid_size {
            for zi in 0..params.grid_size {
                let cell = Vec3::new(
                    -1.0 + (xi as f32 + 0.5) * cell_size,
                    -1.0 + (yi as f32 + 0.5) * cell_size,
                    -1.0 + (zi as f32 + 0.5) * cell_size,
                );

                let sample = noise.noise(xi as f32, yi as f32, zi as f32);
                let count = (sample.abs() * params.density).round() as usize;
                for _ in 0..count {
                    let half = cell_size * 0.5;
                    let position = cell
                        + Vec3::new(
                            rng.gen_range(-half..=half),
                            rng.gen_range(-half..=half),
                            rng.gen_range(-half..=half),
                        );
                    boids.push(Boid::new(
                        position,
                        Vec3::ZERO,
                        roll_max_velocity(rng),
                        rng.gen_range(0..2),
                    ));
                }
            }
        }
    }

    boids
}
