//! Simulation settings and their GPU mirror.
//!
//! Global knobs apply to every boid; team settings tune each team's flocking
//! behavior independently. The store tracks a dirty flag so the uniform and
//! team buffers re-upload only when something changed.

/// Number of team slots uploaded to the device.
pub const MAX_TEAMS: usize = 4;

/// Knobs that apply to the whole simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSettings {
    /// Scales both integration and the velocity ceiling.
    pub simulation_speed: f32,
    /// When false, every boid treats every other boid as a flockmate.
    pub teams_enabled: bool,
    /// Wrap across the world boundary instead of bouncing off a wall spring.
    pub wrap_enabled: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            simulation_speed: 1.0,
            teams_enabled: true,
            wrap_enabled: false,
        }
    }
}

/// Per-team flocking tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamSettings {
    pub separation_range: f32,
    pub separation_strength: f32,
    pub cohesion_range: f32,
    pub cohesion_strength: f32,
    pub alignment_range: f32,
    pub alignment_strength: f32,
    /// Reaction to other teams. Positive flees, negative chases, zero ignores.
    pub team_strength: f32,
    /// Multiplies the per-boid velocity ceiling.
    pub max_speed_multiplier: f32,
    /// Rendered body size.
    pub boid_size: f32,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            separation_range: 1.0,
            separation_strength: 1.0,
            cohesion_range: 1.0,
            cohesion_strength: 1.0,
            alignment_range: 1.0,
            alignment_strength: 1.0,
            team_strength: 1.0,
            max_speed_multiplier: 1.0,
            boid_size: 0.02,
        }
    }
}

/// GPU-side team layout. Must match `TeamSettings` in `flocking.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TeamSettingsGpu {
    pub separation_strength: f32,
    pub cohesion_strength: f32,
    pub alignment_strength: f32,
    pub team_strength: f32,
    pub separation_range: f32,
    pub cohesion_range: f32,
    pub alignment_range: f32,
    pub max_speed_multiplier: f32,
    pub boid_size: f32,
    pub _padding: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<TeamSettingsGpu>() == 48);
const _: () = assert!(std::mem::offset_of!(TeamSettingsGpu, separation_range) == 16);
const _: () = assert!(std::mem::offset_of!(TeamSettingsGpu, boid_size) == 32);

impl From<&TeamSettings> for TeamSettingsGpu {
    fn from(team: &TeamSettings) -> Self {
        Self {
            separation_strength: team.separation_strength,
            cohesion_strength: team.cohesion_strength,
            alignment_strength: team.alignment_strength,
            team_strength: team.team_strength,
            separation_range: team.separation_range,
            cohesion_range: team.cohesion_range,
            alignment_range: team.alignment_range,
            max_speed_multiplier: team.max_speed_multiplier,
            boid_size: team.boid_size,
            _padding: [0.0; 3],
        }
    }
}

/// Settings store with a dirty flag driving buffer re-uploads.
#[derive(Debug)]
pub struct SettingsStore {
    globals: GlobalSettings,
    teams: [TeamSettings; MAX_TEAMS],
    dirty: bool,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self {
            globals: GlobalSettings::default(),
            teams: [TeamSettings::default(); MAX_TEAMS],
            dirty: true,
        }
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn globals(&self) -> &GlobalSettings {
        &self.globals
    }

    #[inline]
    pub fn team(&self, team_id: u32) -> &TeamSettings {
        &self.teams[team_id as usize % MAX_TEAMS]
    }

    #[inline]
    pub fn teams(&self) -> &[TeamSettings; MAX_TEAMS] {
        &self.teams
    }

    /// Mutate global settings; marks the store dirty.
    pub fn update_globals(&mut self, edit: impl FnOnce(&mut GlobalSettings)) {
        edit(&mut self.globals);
        self.dirty = true;
    }

    /// Mutate one team's settings; marks the store dirty.
    pub fn update_team(&mut self, team_id: u32, edit: impl FnOnce(&mut TeamSettings)) {
        edit(&mut self.teams[team_id as usize % MAX_TEAMS]);
        self.dirty = true;
    }

    /// Pack all team slots for upload.
    pub fn teams_gpu(&self) -> [TeamSettingsGpu; MAX_TEAMS] {
        std::array::from_fn(|i| TeamSettingsGpu::from(&self.teams[i]))
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = SettingsStore::new();
        assert!(store.globals().teams_enabled);
        assert!(!store.globals().wrap_enabled);
        assert_eq!(store.globals().simulation_speed, 1.0);
        assert_eq!(store.team(0).boid_size, 0.02);
        // New store starts dirty so the first frame uploads everything.
        assert!(store.is_dirty());
    }

    #[test]
    fn test_update_marks_dirty() {
        let mut store = SettingsStore::new();
        store.mark_clean();

        store.update_team(1, |team| team.team_strength = -0.5);
        assert!(store.is_dirty());
        assert_eq!(store.team(1).team_strength, -0.5);
        assert_eq!(store.team(0).team_strength, 1.0);
    }

    #[test]
    fn test_team_index_wraps() {
        let store = SettingsStore::new();
        assert_eq!(store.team(MAX_TEAMS as u32), store.team(0));
    }
}
