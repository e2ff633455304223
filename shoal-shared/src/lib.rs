//! Tuning and summary types shared between the simulation core and hosts.
//!
//! These deliberately do not depend on `shoal-core`: a dashboard or settings
//! editor can parse and emit them without linking the simulation. Hosts
//! convert into the core's config structs themselves. Defaults mirror the
//! core's.

use serde::{Deserialize, Serialize};

/// Boid tuning as found in a settings file. Every field is optional in the
/// JSON; missing fields keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidTuning {
    pub perception_radius: f32,
    pub speed: f32,
    pub scared_speed: f32,
    pub field_of_view: f32,
    pub flee_distance: f32,
    pub kill_distance: f32,
    pub separation_scale: f32,
    pub alignment_scale: f32,
    pub cohesion_scale: f32,
    pub flee_scale: f32,
    pub crowd_distance: f32,
    pub crowd_separation_scale: f32,
    pub turn_damping: f32,
    pub scare_duration: f32,
    pub speed_jitter: f32,
    pub fov_jitter: f32,
    pub flee_jitter: f32,
    pub can_die: bool,
}

impl Default for BoidTuning {
    fn default() -> Self {
        Self {
            perception_radius: 100.0,
            speed: 140.0,
            scared_speed: 170.0,
            field_of_view: 120.0,
            flee_distance: 150.0,
            kill_distance: 2.0,
            separation_scale: 1.5,
            alignment_scale: 1.0,
            cohesion_scale: 1.0,
            flee_scale: 1.5,
            crowd_distance: 10.0,
            crowd_separation_scale: 10.0,
            turn_damping: 0.4,
            scare_duration: 0.5,
            speed_jitter: 0.0,
            fov_jitter: 0.0,
            flee_jitter: 0.0,
            can_die: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredatorTuning {
    pub speed: f32,
}

impl Default for PredatorTuning {
    fn default() -> Self {
        Self { speed: 160.0 }
    }
}

/// Root of a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub boid: BoidTuning,
    pub predator: PredatorTuning,
}

impl SimSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One line of per-tick statistics a host can log or stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub alive: usize,
    pub scared: usize,
    pub targeted: usize,
}
