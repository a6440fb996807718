//! End-to-end checks over the simulation model: shader validity, the force
//! model's observable guarantees, and the edit-over-live-flock flow.

use glam::Vec3;

use flock::{
    defaults, step, Boid, BoidStore, CenteredParams, FlockSim, GlobalSettings, InteractionNode,
    PerlinParams, SpawnPattern, TeamSettings, CursorMode, WORLD_EXTENT,
};

fn validate_shader(name: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{name} failed to parse: {e}"));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("{name} failed validation: {e:?}"));
}

#[test]
fn all_shaders_validate() {
    validate_shader("flocking.wgsl", flock::FLOCKING_SOURCE);
    validate_shader("geometry.wgsl", flock::GEOMETRY_SOURCE);
    validate_shader("render.wgsl", flock::RENDER_SOURCE);
    validate_shader("boundary.wgsl", flock::BOUNDARY_SOURCE);
    validate_shader("interaction.wgsl", flock::INTERACTION_SOURCE);
}

fn default_teams() -> Vec<TeamSettings> {
    vec![TeamSettings::default(); flock::MAX_TEAMS]
}

fn small_flock(seed: u64, count: usize) -> Vec<Boid> {
    let mut boids = SpawnPattern::Centered(CenteredParams {
        majority_count: count,
        minority_count: 0,
        jitter: 0.3,
        ..Default::default()
    })
    .generate(seed);
    // Spread teams so cross-team terms are exercised.
    for (i, boid) in boids.iter_mut().enumerate() {
        boid.team_id = (i % 2) as u32;
    }
    boids
}

#[test]
fn speed_never_exceeds_ceiling() {
    let mut boids = small_flock(3, 60);
    let teams = default_teams();
    let globals = GlobalSettings::default();
    let nodes = [InteractionNode::new(Vec3::ZERO, 2.0)];

    for _ in 0..120 {
        step(&mut boids, &teams, &globals, &nodes, 1.0 / 60.0);
        for boid in &boids {
            let limit = boid.max_velocity;
            assert!(
                boid.velocity.length() <= limit + 1e-3,
                "speed {} over ceiling {}",
                boid.velocity.length(),
                limit
            );
        }
    }
}

#[test]
fn walls_keep_the_flock_contained() {
    let mut boids = small_flock(4, 40);
    for boid in &mut boids {
        boid.velocity = (boid.position - Vec3::ZERO).normalize_or_zero() * 2.0;
    }
    let teams = default_teams();
    let globals = GlobalSettings::default();

    for _ in 0..600 {
        step(&mut boids, &teams, &globals, &[], 1.0 / 60.0);
    }

    // The spring is soft so brief overshoot is allowed, but nothing escapes.
    for boid in &boids {
        assert!(
            boid.position.abs().max_element() < WORLD_EXTENT + 1.0,
            "boid escaped to {:?}",
            boid.position
        );
    }
}

#[test]
fn wrap_keeps_positions_inside_the_box() {
    let mut boids = small_flock(5, 40);
    for boid in &mut boids {
        boid.velocity = Vec3::new(1.5, 0.7, -1.1);
    }
    let teams = default_teams();
    let globals = GlobalSettings {
        wrap_enabled: true,
        ..Default::default()
    };

    for _ in 0..300 {
        step(&mut boids, &teams, &globals, &[], 1.0 / 60.0);
        for boid in &boids {
            // One fold per axis per step covers any reachable speed.
            assert!(boid.position.abs().max_element() <= WORLD_EXTENT);
        }
    }
}

#[test]
fn disabling_teams_erases_team_identity() {
    let teams = {
        let mut teams = default_teams();
        for team in &mut teams {
            team.team_strength = -25.0;
        }
        teams
    };
    let globals = GlobalSettings {
        teams_enabled: false,
        ..Default::default()
    };

    let mut mixed = small_flock(6, 30);
    let mut uniform = mixed.clone();
    for boid in &mut uniform {
        boid.team_id = 0;
    }

    for _ in 0..30 {
        step(&mut mixed, &teams, &globals, &[], 1.0 / 60.0);
        step(&mut uniform, &teams, &globals, &[], 1.0 / 60.0);
    }

    for (a, b) in mixed.iter().zip(&uniform) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}

#[test]
fn paused_frames_change_nothing() {
    let mut boids = small_flock(7, 30);
    let before = boids.clone();
    // A paused scheduler dispatches with zero delta.
    step(
        &mut boids,
        &default_teams(),
        &GlobalSettings::default(),
        &[],
        0.0,
    );
    for (a, b) in boids.iter().zip(&before) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}

/// Appending over a live flock must not rewind survivors: the store re-upload
/// flows through a device sync, which this test emulates with the packed
/// round trip.
#[test]
fn append_preserves_simulated_state() {
    let mut sim = FlockSim::new(1);
    sim.request_spawn(
        SpawnPattern::Centered(CenteredParams {
            majority_count: 20,
            minority_count: 0,
            jitter: 0.2,
            ..Default::default()
        }),
        true,
    );
    sim.apply_intents();

    // Simulate ten frames of device work on the mirrored state.
    let mut simulated: Vec<Boid> = sim.boids.boids().to_vec();
    let teams = default_teams();
    let globals = GlobalSettings::default();
    for _ in 0..10 {
        step(&mut simulated, &teams, &globals, &[], 1.0 / 60.0);
    }

    // Queue an append; the scheduler reads back before applying.
    sim.request_spawn(SpawnPattern::Single, false);
    assert!(sim.needs_device_sync());

    let readback: Vec<_> = {
        let mut device_side = BoidStore::new();
        device_side.reset(simulated.clone());
        device_side.to_gpu()
    };
    sim.boids.sync_from_gpu(&readback);
    sim.apply_intents();

    assert_eq!(sim.boids.len(), 22);
    for (kept, expected) in sim.boids.boids().iter().zip(&simulated) {
        assert_eq!(kept.position, expected.position);
        assert_eq!(kept.velocity, expected.velocity);
    }
}

#[test]
fn pointer_nodes_steer_the_flock() {
    let mut sim = FlockSim::new(2);
    sim.cursor_mode = CursorMode::Draw;
    sim.pointer_action(Vec3::new(0.0, 0.0, 0.0));
    sim.apply_intents();

    let nodes: Vec<_> = sim.interactions.nodes().to_vec();
    let mut boids = vec![Boid::new(Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO, 2.1, 0)];
    step(
        &mut boids,
        &default_teams(),
        &GlobalSettings::default(),
        &nodes,
        1.0 / 60.0,
    );

    // The drawn repulsor at the origin dominates the distant seed node.
    assert!(boids[0].velocity.x > 0.0);
}

#[test]
fn spawn_patterns_produce_locked_populations() {
    let single = SpawnPattern::Single.generate(9);
    assert_eq!(single.len(), 2);
    for boid in &single {
        assert_eq!(boid.velocity, Vec3::new(0.0, 0.001, 0.0));
    }

    let centered = SpawnPattern::Centered(Default::default()).generate(9);
    assert_eq!(
        centered.len(),
        defaults::MAJORITY_COUNT + defaults::MINORITY_COUNT
    );

    let perlin = SpawnPattern::Perlin(PerlinParams {
        grid_size: 16,
        ..Default::default()
    });
    assert_eq!(perlin.generate(9), perlin.generate(9));

    // recorded count for a fixed seed, pinning the noise defaults themselves
    let recorded = SpawnPattern::Perlin(PerlinParams {
        grid_size: 15,
        density: 10.0,
        ..Default::default()
    })
    .generate(9);
    assert_eq!(recorded.len(), 8548);
}
