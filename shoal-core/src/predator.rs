use rand::Rng;

use crate::boid::Boid;
use crate::config::PredatorConfig;
use crate::vector::{random_direction, Vec3};

/// A pursuit agent. Holds at most one target at a time, referenced by boid
/// id — a weak handle resolved against the roster each tick, never an owning
/// reference.
#[derive(Debug, Clone)]
pub struct Predator {
    pub position: Vec3,
    /// Current heading, unit length.
    pub direction: Vec3,
    pub speed: f32,
    target: Option<u32>,
}

impl Predator {
    /// Construct with an explicit heading. A degenerate heading falls back
    /// to the +x axis.
    pub fn new(position: Vec3, direction: Vec3, config: &PredatorConfig) -> Self {
        Self {
            position,
            direction: direction
                .try_normalize()
                .unwrap_or(Vec3::new(1.0, 0.0, 0.0)),
            speed: config.speed,
            target: None,
        }
    }

    /// Construct with a random heading.
    pub fn spawn<R: Rng>(position: Vec3, config: &PredatorConfig, rng: &mut R) -> Self {
        let direction = random_direction(rng);
        Self::new(position, direction, config)
    }

    /// Id of the currently pursued boid, if any.
    pub fn target(&self) -> Option<u32> {
        self.target
    }

    /// Nearest eligible boid in the roster: alive, not claimed earlier this
    /// tick, and either untargeted as of the last commit or already this
    /// predator's own target. Distance ties keep the first encountered.
    pub(crate) fn select_target(&self, roster: &[Boid], claimed: &[u32]) -> Option<u32> {
        let mut nearest: Option<(u32, f32)> = None;
        for b in roster {
            if !b.alive || claimed.contains(&b.id()) {
                continue;
            }
            if b.targeted && self.target != Some(b.id()) {
                continue;
            }

            let distance = self.position.distance(&b.position);
            match nearest {
                Some((_, shortest)) if distance >= shortest => {}
                _ => nearest = Some((b.id(), distance)),
            }
        }
        nearest.map(|(id, _)| id)
    }

    pub(crate) fn set_target(&mut self, target: Option<u32>) {
        self.target = target;
    }

    /// Single-agent tick: retarget against `roster` and pursue. The flock
    /// driver arbitrates claims across predators instead; call this
    /// directly only for a lone predator, where no claims can conflict.
    pub fn update<R: Rng>(&mut self, dt: f32, roster: &mut [Boid], rng: &mut R) {
        let choice = self.select_target(roster, &[]);
        if choice != self.target {
            if let Some(old) = self.target {
                if let Some(boid) = roster.iter_mut().find(|b| b.id() == old) {
                    boid.targeted = false;
                }
            }
            if let Some(new) = choice {
                if let Some(boid) = roster.iter_mut().find(|b| b.id() == new) {
                    boid.targeted = true;
                }
            }
            self.target = choice;
        }

        let target_position = self
            .target
            .and_then(|id| roster.iter().find(|b| b.id() == id))
            .map(|b| b.position);
        self.advance(target_position, dt, rng);
    }

    /// Steer toward the target (if any) and integrate. With no target the
    /// predator wanders on a fresh random heading.
    pub(crate) fn advance<R: Rng>(
        &mut self,
        target_position: Option<Vec3>,
        dt: f32,
        rng: &mut R,
    ) {
        match target_position {
            Some(target) => {
                if let Some(toward) = (target - self.position).try_normalize() {
                    self.direction += toward;
                }
                self.direction = self
                    .direction
                    .try_normalize()
                    .unwrap_or_else(|| random_direction(rng));
            }
            None => self.direction = random_direction(rng),
        }

        self.position += self.direction * (self.speed * dt);
        self.position.z = 0.0;
        self.direction.z = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoidConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn rng() -> ChaCha12Rng {
        ChaCha12Rng::seed_from_u64(11)
    }

    fn boid_at(id: u32, x: f32, y: f32) -> Boid {
        Boid::new(
            id,
            Vec3::new(x, y, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &BoidConfig::default(),
        )
    }

    fn predator_at(x: f32, y: f32) -> Predator {
        Predator::new(
            Vec3::new(x, y, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &PredatorConfig::default(),
        )
    }

    #[test]
    fn test_selects_nearest_boid() {
        let roster = vec![boid_at(0, 50.0, 0.0), boid_at(1, 10.0, 0.0)];
        let predator = predator_at(0.0, 0.0);
        assert_eq!(predator.select_target(&roster, &[]), Some(1));
    }

    #[test]
    fn test_skips_boids_targeted_by_others() {
        let mut roster = vec![boid_at(0, 10.0, 0.0), boid_at(1, 50.0, 0.0)];
        roster[0].targeted = true;
        let predator = predator_at(0.0, 0.0);
        assert_eq!(predator.select_target(&roster, &[]), Some(1));
    }

    #[test]
    fn test_own_target_remains_eligible() {
        let mut roster = vec![boid_at(0, 10.0, 0.0), boid_at(1, 50.0, 0.0)];
        roster[0].targeted = true;
        let mut predator = predator_at(0.0, 0.0);
        predator.set_target(Some(0));
        assert_eq!(predator.select_target(&roster, &[]), Some(0));
    }

    #[test]
    fn test_skips_claims_from_this_tick() {
        let roster = vec![boid_at(0, 10.0, 0.0), boid_at(1, 50.0, 0.0)];
        let predator = predator_at(0.0, 0.0);
        assert_eq!(predator.select_target(&roster, &[0]), Some(1));
    }

    #[test]
    fn test_skips_dead_boids() {
        let mut roster = vec![boid_at(0, 10.0, 0.0)];
        roster[0].alive = false;
        let predator = predator_at(0.0, 0.0);
        assert_eq!(predator.select_target(&roster, &[]), None);
    }

    #[test]
    fn test_distance_tie_keeps_first() {
        let roster = vec![boid_at(0, 10.0, 0.0), boid_at(1, -10.0, 0.0)];
        let predator = predator_at(0.0, 0.0);
        assert_eq!(predator.select_target(&roster, &[]), Some(0));
    }

    #[test]
    fn test_update_claims_and_releases_flags() {
        let mut roster = vec![boid_at(0, 10.0, 0.0), boid_at(1, 500.0, 0.0)];
        let mut predator = predator_at(0.0, 0.0);

        predator.update(1.0 / 60.0, &mut roster, &mut rng());
        assert_eq!(predator.target(), Some(0));
        assert!(roster[0].targeted);

        // target dies; the flag moves to the new choice on the next tick
        roster[0].alive = false;
        predator.update(1.0 / 60.0, &mut roster, &mut rng());
        assert_eq!(predator.target(), Some(1));
        assert!(roster[1].targeted);
    }

    #[test]
    fn test_advance_closes_on_target() {
        let mut predator = predator_at(0.0, 0.0);
        let target = Vec3::new(500.0, 0.0, 0.0);

        let before = predator.position.distance(&target);
        predator.advance(Some(target), 0.1, &mut rng());
        assert!(predator.position.distance(&target) < before);
    }

    #[test]
    fn test_advance_without_target_stays_unit_and_planar() {
        let mut predator = predator_at(0.0, 0.0);
        predator.advance(None, 0.1, &mut rng());
        assert!((predator.direction.magnitude() - 1.0).abs() < 1e-5);
        assert_eq!(predator.direction.z, 0.0);
        assert_eq!(predator.position.z, 0.0);
    }
}
