//! CPU reference implementation of the flocking update.
//!
//! Mirrors `flocking.wgsl` term for term: same force model, same clamp, same
//! boundary handling, reading all neighbor state from the pre-step snapshot.
//! Used by the invariant tests and the benchmark; the GPU kernel is the hot
//! path at runtime.

use glam::Vec3;

use crate::boids::Boid;
use crate::interaction::InteractionNode;
use crate::settings::{GlobalSettings, TeamSettings};

pub const WORLD_EXTENT: f32 = 1.0;
pub const WALL_MARGIN: f32 = 0.05;
pub const WALL_STIFFNESS: f32 = 8.0;
const EPSILON: f32 = 1e-6;

/// Advance every boid by one step of `delta_time` seconds.
///
/// Neighbor reads come from the state at entry, so update order does not
/// affect the result. The GPU pass reads neighbors from the same buffer it
/// writes; with one dispatch per frame the difference stays within a single
/// step of drift and none of the tested guarantees depend on it.
pub fn step(
    boids: &mut [Boid],
    teams: &[TeamSettings],
    globals: &GlobalSettings,
    nodes: &[InteractionNode],
    delta_time: f32,
) {
    let snapshot: Vec<Boid> = boids.to_vec();
    for (index, boid) in boids.iter_mut().enumerate() {
        let team = &teams[boid.team_id as usize % teams.len()];
        *boid = step_one(index, *boid, team, &snapshot, globals, nodes, delta_time);
    }
}

fn step_one(
    index: usize,
    mut boid: Boid,
    team: &TeamSettings,
    snapshot: &[Boid],
    globals: &GlobalSettings,
    nodes: &[InteractionNode],
    delta_time: f32,
) -> Boid {
    let mut separation = Vec3::ZERO;
    let mut cohesion_sum = Vec3::ZERO;
    let mut cohesion_count = 0u32;
    let mut alignment_sum = Vec3::ZERO;
    let mut alignment_count = 0u32;
    let mut team_force = Vec3::ZERO;

    for (j, other) in snapshot.iter().enumerate() {
        if j == index {
            continue;
        }
        let offset = boid.position - other.position;
        let dist = offset.length();
        if dist < EPSILON {
            continue;
        }

        let flockmate = !globals.teams_enabled || other.team_id == boid.team_id;

        if dist < team.separation_range {
            let mut repel = offset / (dist * dist);
            if !flockmate {
                repel *= team.team_strength;
            }
            separation += repel;
        }
        if flockmate {
            if dist < team.cohesion_range {
                cohesion_sum += other.position;
                cohesion_count += 1;
            }
            if dist < team.alignment_range {
                alignment_sum += other.velocity;
                alignment_count += 1;
            }
        } else if dist < team.cohesion_range {
            team_force += offset / dist * team.team_strength;
        }
    }

    let mut force = separation * team.separation_strength;
    if cohesion_count > 0 {
        force += (cohesion_sum / cohesion_count as f32 - boid.position) * team.cohesion_strength;
    }
    if alignment_count > 0 {
        force += (alignment_sum / alignment_count as f32 - boid.velocity) * team.alignment_strength;
    }
    force += team_force;

    for node in nodes {
        let offset = boid.position - node.position;
        let dist = offset.length();
        if dist > EPSILON {
            force += offset / (dist * dist) * node.strength;
        }
    }

    if !globals.wrap_enabled {
        let over = (boid.position.abs() - Vec3::splat(WORLD_EXTENT - WALL_MARGIN)).max(Vec3::ZERO);
        force -= over * boid.position.signum() * WALL_STIFFNESS;
    }

    boid.velocity += force * delta_time;

    let limit = boid.max_velocity * team.max_speed_multiplier * globals.simulation_speed;
    let speed = boid.velocity.length();
    if speed > limit && speed > EPSILON {
        boid.velocity *= limit / speed;
    }

    boid.position += boid.velocity * delta_time * globals.simulation_speed;

    if globals.wrap_enabled {
        boid.position = wrap_axis_fold(boid.position);
    }

    boid
}

/// Fold each axis back across the opposite face when it leaves the world box.
fn wrap_axis_fold(mut position: Vec3) -> Vec3 {
    for axis in 0..3 {
        if position[axis] > WORLD_EXTENT {
            position[axis] -= 2.0 * WORLD_EXTENT;
        } else if position[axis] < -WORLD_EXTENT {
            position[axis] += 2.0 * WORLD_EXTENT;
        }
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_teams() -> Vec<TeamSettings> {
        vec![TeamSettings::default(); 4]
    }

    fn globals() -> GlobalSettings {
        GlobalSettings::default()
    }

    #[test]
    fn test_empty_flock_is_fine() {
        let mut boids: Vec<Boid> = Vec::new();
        step(&mut boids, &default_teams(), &globals(), &[], 1.0 / 60.0);
        assert!(boids.is_empty());
    }

    #[test]
    fn test_separation_pushes_apart() {
        let mut boids = vec![
            Boid::new(Vec3::new(-0.01, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
            Boid::new(Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
        ];
        let mut teams = default_teams();
        for team in &mut teams {
            // Isolate separation.
            team.cohesion_strength = 0.0;
            team.alignment_strength = 0.0;
        }
        step(&mut boids, &teams, &globals(), &[], 1.0 / 60.0);

        assert!(boids[0].velocity.x < 0.0);
        assert!(boids[1].velocity.x > 0.0);
        // Symmetric setup stays symmetric.
        assert!((boids[0].velocity.x + boids[1].velocity.x).abs() < 1e-6);
    }

    #[test]
    fn test_cohesion_pulls_together() {
        let mut boids = vec![
            Boid::new(Vec3::new(-0.4, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
            Boid::new(Vec3::new(0.4, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
        ];
        let mut teams = default_teams();
        for team in &mut teams {
            team.separation_range = 0.1;
            team.alignment_strength = 0.0;
        }
        step(&mut boids, &teams, &globals(), &[], 1.0 / 60.0);

        assert!(boids[0].velocity.x > 0.0);
        assert!(boids[1].velocity.x < 0.0);
    }

    #[test]
    fn test_alignment_matches_neighbors() {
        let mut boids = vec![
            Boid::new(Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
            Boid::new(Vec3::new(0.3, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 2.1, 0),
        ];
        let mut teams = default_teams();
        for team in &mut teams {
            team.separation_range = 0.1;
            team.cohesion_strength = 0.0;
        }
        step(&mut boids, &teams, &globals(), &[], 1.0 / 60.0);

        // First boid steers toward the neighbor's velocity.
        assert!(boids[0].velocity.y > 0.0);
    }

    #[test]
    fn test_velocity_ceiling() {
        let mut boids = vec![Boid::new(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            2.1,
            0,
        )];
        step(&mut boids, &default_teams(), &globals(), &[], 1.0 / 60.0);

        assert!(boids[0].velocity.length() <= 2.1 + 1e-4);
    }

    #[test]
    fn test_velocity_ceiling_scales_with_multiplier_and_speed() {
        let mut teams = default_teams();
        teams[0].max_speed_multiplier = 2.0;
        let mut globals = globals();
        globals.simulation_speed = 0.5;

        let mut boids = vec![Boid::new(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            2.0,
            0,
        )];
        step(&mut boids, &teams, &globals, &[], 1.0 / 60.0);

        // 2.0 * 2.0 * 0.5
        assert!(boids[0].velocity.length() <= 2.0 + 1e-4);
        assert!(boids[0].velocity.length() > 1.9);
    }

    #[test]
    fn test_teams_disabled_means_no_team_force() {
        let make = || {
            vec![
                Boid::new(Vec3::new(-0.1, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
                Boid::new(Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO, 2.1, 1),
            ]
        };
        let mut teams = default_teams();
        // A strength that would dominate if it applied.
        teams[0].team_strength = -50.0;
        teams[1].team_strength = -50.0;

        let mut disabled = globals();
        disabled.teams_enabled = false;
        let mut mixed = make();
        step(&mut mixed, &teams, &disabled, &[], 1.0 / 60.0);

        // With teams off the run must be identical to an all-one-team flock.
        let mut uniform = make();
        for boid in &mut uniform {
            boid.team_id = 0;
        }
        step(&mut uniform, &teams, &disabled, &[], 1.0 / 60.0);

        for (a, b) in mixed.iter().zip(&uniform) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.velocity, b.velocity);
        }
    }

    #[test]
    fn test_negative_team_strength_chases() {
        let mut boids = vec![
            Boid::new(Vec3::new(-0.2, 0.0, 0.0), Vec3::ZERO, 2.1, 0),
            Boid::new(Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO, 2.1, 1),
        ];
        let mut teams = default_teams();
        teams[0].team_strength = -1.0; // chases team 1
        teams[1].team_strength = 1.0; // flees team 0
        for team in &mut teams {
            team.separation_range = 0.1;
        }
        step(&mut boids, &teams, &globals(), &[], 1.0 / 60.0);

        // Chaser accelerates toward the other boid, fleer away from it.
        assert!(boids[0].velocity.x > 0.0);
        assert!(boids[1].velocity.x > 0.0);
    }

    #[test]
    fn test_repulsor_node_pushes_away() {
        let mut boids = vec![Boid::new(Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO, 2.1, 0)];
        let nodes = [InteractionNode::new(Vec3::ZERO, 1.0)];
        step(&mut boids, &default_teams(), &globals(), &nodes, 1.0 / 60.0);
        assert!(boids[0].velocity.x > 0.0);
    }

    #[test]
    fn test_attractor_node_pulls_in() {
        let mut boids = vec![Boid::new(Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO, 2.1, 0)];
        let nodes = [InteractionNode::new(Vec3::ZERO, -1.0)];
        step(&mut boids, &default_teams(), &globals(), &nodes, 1.0 / 60.0);
        assert!(boids[0].velocity.x < 0.0);
    }

    #[test]
    fn test_wall_spring_turns_boid_back() {
        let mut boids = vec![Boid::new(
            Vec3::new(0.99, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            2.1,
            0,
        )];
        let mut velocity_x = boids[0].velocity.x;
        for _ in 0..200 {
            step(&mut boids, &default_teams(), &globals(), &[], 1.0 / 60.0);
            velocity_x = boids[0].velocity.x;
            if velocity_x < 0.0 {
                break;
            }
        }
        assert!(velocity_x < 0.0, "wall spring never reversed the boid");
    }

    #[test]
    fn test_wrap_folds_across_boundary() {
        let mut globals = globals();
        globals.wrap_enabled = true;

        let mut boids = vec![Boid::new(
            Vec3::new(0.981, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            2.1,
            0,
        )];
        step(&mut boids, &default_teams(), &globals, &[], 0.01);

        // 0.981 + 2.0 * 0.01 = 1.001 folds to -0.999.
        assert!((boids[0].position.x - (-0.999)).abs() < 1e-3);
        // Velocity is preserved through the fold.
        assert!(boids[0].velocity.x > 0.0);
    }

    #[test]
    fn test_update_order_does_not_matter() {
        let mut forward = vec![
            Boid::new(Vec3::new(-0.05, 0.02, 0.0), Vec3::new(0.1, 0.0, 0.0), 2.1, 0),
            Boid::new(Vec3::new(0.05, -0.02, 0.0), Vec3::new(-0.1, 0.0, 0.0), 2.1, 0),
            Boid::new(Vec3::new(0.0, 0.06, 0.0), Vec3::new(0.0, 0.1, 0.0), 2.1, 1),
        ];
        let mut reversed: Vec<Boid> = forward.iter().copied().rev().collect();

        step(&mut forward, &default_teams(), &globals(), &[], 1.0 / 60.0);
        step(&mut reversed, &default_teams(), &globals(), &[], 1.0 / 60.0);

        for (a, b) in forward.iter().zip(reversed.iter().rev()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.velocity, b.velocity);
        }
    }
}
