/// Spawn template for boids.
///
/// Per-agent fields (speed, field of view, flee distance, the force weights)
/// are copied onto each boid at spawn time, optionally jittered; the
/// remaining fields are read by the flock driver every tick.
#[derive(Debug, Clone, Copy)]
pub struct BoidConfig {
    /// Radius inside which other boids count as neighbors.
    pub perception_radius: f32,
    pub speed: f32,
    /// Speed while the scare state is active.
    pub scared_speed: f32,
    /// Full width of the threat-visibility window, degrees.
    pub field_of_view: f32,
    /// Radius inside which a visible predator triggers fleeing.
    pub flee_distance: f32,
    /// Radius inside which a predator removes the boid outright.
    pub kill_distance: f32,
    pub separation_scale: f32,
    pub alignment_scale: f32,
    pub cohesion_scale: f32,
    pub flee_scale: f32,
    /// Nearest-neighbor distance below which separation is boosted.
    pub crowd_distance: f32,
    /// Separation weight used for a tick spent under `crowd_distance`.
    pub crowd_separation_scale: f32,
    /// Applied to the summed force blend before it bends the heading.
    pub turn_damping: f32,
    /// Seconds the scare state outlives the last sighting.
    pub scare_duration: f32,
    /// Uniform half-ranges applied per boid at spawn; zero disables.
    pub speed_jitter: f32,
    pub fov_jitter: f32,
    pub flee_jitter: f32,
    pub can_die: bool,
}

impl Default for BoidConfig {
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

/// Spawn template for predators.
#[derive(Debug, Clone, Copy)]
pub struct PredatorConfig {
    pub speed: f32,
}

impl Default for PredatorConfig {
    fn default() -> Self {
        Self { speed: 160.0 }
    }
}

/// Everything the flock driver needs to spawn and step agents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlockConfig {
    pub boid: BoidConfig,
    pub predator: PredatorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = BoidConfig::default();
        assert!(cfg.scared_speed > cfg.speed);
        assert!(cfg.flee_distance > cfg.kill_distance);
        assert!(cfg.crowd_separation_scale > cfg.separation_scale);
        assert!(PredatorConfig::default().speed > cfg.speed);
    }
}
