use rand::Rng;

use crate::config::BoidConfig;
use crate::predator::Predator;
use crate::timer::Timer;
use crate::vector::{random_direction, Vec3};

/// A flocking agent.
///
/// Tuning fields are copied from [`BoidConfig`] at spawn time so individual
/// boids can carry jittered values; the transient flags (`scared`,
/// `spotted_predator`, `targeted`) are rewritten every tick.
#[derive(Debug, Clone)]
pub struct Boid {
    id: u32,
    pub position: Vec3,
    /// Current heading, unit length.
    pub direction: Vec3,
    pub speed: f32,
    /// Full width of the threat-visibility window, degrees.
    pub field_of_view: f32,
    pub flee_distance: f32,
    pub kill_distance: f32,
    pub separation_scale: f32,
    pub alignment_scale: f32,
    pub cohesion_scale: f32,
    pub flee_scale: f32,
    pub alive: bool,
    pub scared: bool,
    pub spotted_predator: bool,
    /// Set by the flock driver when a predator claims this boid.
    pub targeted: bool,
    scare_timer: Timer,
}

/// Outcome of one boid's steering computation, decided against an immutable
/// snapshot and committed separately so roster order cannot bias a tick.
#[derive(Debug, Clone)]
pub(crate) struct BoidPlan {
    /// New unit heading; `None` when every fallback degenerated and a random
    /// heading must be drawn at commit time.
    heading: Option<Vec3>,
    killed: bool,
    spotted: bool,
}

impl Boid {
    /// Construct with an explicit heading. A degenerate heading falls back
    /// to the +x axis rather than producing NaNs downstream.
    pub fn new(id: u32, position: Vec3, direction: Vec3, config: &BoidConfig) -> Self {
        Self {
            id,
            position,
            direction: direction
                .try_normalize()
                .unwrap_or(Vec3::new(1.0, 0.0, 0.0)),
            speed: config.speed,
            field_of_view: config.field_of_view,
            flee_distance: config.flee_distance,
            kill_distance: config.kill_distance,
            separation_scale: config.separation_scale,
            alignment_scale: config.alignment_scale,
            cohesion_scale: config.cohesion_scale,
            flee_scale: config.flee_scale,
            alive: true,
            scared: false,
            spotted_predator: false,
            targeted: false,
            scare_timer: Timer::new(config.scare_duration),
        }
    }

    /// Construct with a random heading and per-agent jitter applied.
    pub fn spawn<R: Rng>(id: u32, position: Vec3, config: &BoidConfig, rng: &mut R) -> Self {
        let direction = random_direction(rng);
        let mut boid = Self::new(id, position, direction, config);
        boid.speed = jittered(config.speed, config.speed_jitter, rng);
        boid.field_of_view = jittered(config.field_of_view, config.fov_jitter, rng);
        boid.flee_distance = jittered(config.flee_distance, config.flee_jitter, rng);
        boid
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Single-agent tick: plan against `roster` and `predators`, then
    /// commit immediately. The flock driver uses the split phases instead
    /// so a whole tick commits atomically; call this directly only when
    /// driving agents one at a time. Dead boids do nothing.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        roster: &[Boid],
        predators: &[Predator],
        config: &BoidConfig,
        rng: &mut R,
    ) {
        if !self.alive {
            return;
        }
        let plan = self.plan(roster, predators, config);
        self.apply(plan, config, dt, rng);
    }

    /// Steering decision for this tick, computed from the pre-tick world.
    pub(crate) fn plan(
        &self,
        roster: &[Boid],
        predators: &[Predator],
        config: &BoidConfig,
    ) -> BoidPlan {
        let neighbours = nearby_boids(self, roster, config.perception_radius);

        let (separation, separation_scale) = self.separation(&neighbours, config);
        let alignment = self.alignment(&neighbours);
        let cohesion = self.cohesion(&neighbours);
        let threats = self.assess_threats(predators);

        let mut forces = Vec3::zero();
        forces += separation * separation_scale;
        forces += alignment * self.alignment_scale;
        forces += cohesion * self.cohesion_scale;
        forces += threats.vector * self.flee_scale;
        forces = forces * config.turn_damping;

        let heading = (self.direction + forces)
            .try_normalize()
            .or_else(|| self.toward_nearest(&neighbours));

        BoidPlan {
            heading,
            killed: threats.killed,
            spotted: threats.spotted,
        }
    }

    /// Commit a plan: threat flags, heading, integration, scare countdown.
    pub(crate) fn apply<R: Rng>(
        &mut self,
        plan: BoidPlan,
        config: &BoidConfig,
        dt: f32,
        rng: &mut R,
    ) {
        if plan.killed && config.can_die {
            self.alive = false;
            log::debug!("boid {} caught by a predator", self.id);
            return;
        }

        self.spotted_predator = plan.spotted;
        if plan.spotted {
            // every sighting re-arms the countdown rather than queuing one
            self.scared = true;
            self.scare_timer.set_length(config.scare_duration);
            self.scare_timer.start();
        }

        self.direction = plan.heading.unwrap_or_else(|| random_direction(rng));

        let speed = if self.scared {
            config.scared_speed
        } else {
            self.speed
        };
        self.position += self.direction * (speed * dt);
        self.position.z = 0.0;
        self.direction.z = 0.0;

        if self.scare_timer.advance(dt) {
            self.scared = false;
        }
    }

    /// Unit vector from the nearest neighbor toward self, plus the
    /// separation weight to use this tick: crowding below
    /// `crowd_distance` swaps in the boosted scale without touching the
    /// boid's own tuning.
    fn separation(&self, neighbours: &[&Boid], config: &BoidConfig) -> (Vec3, f32) {
        let Some((nearest, shortest)) = self.nearest(neighbours) else {
            return (self.direction, self.separation_scale);
        };

        let scale = if shortest < config.crowd_distance {
            config.crowd_separation_scale
        } else {
            self.separation_scale
        };

        let away = (self.position - nearest.position)
            .try_normalize()
            .unwrap_or(self.direction);
        (away, scale)
    }

    /// Normalized mean of neighbor headings; holds the current heading when
    /// there are no neighbors or their headings cancel out.
    fn alignment(&self, neighbours: &[&Boid]) -> Vec3 {
        if neighbours.is_empty() {
            return self.direction;
        }

        let mut sum = Vec3::zero();
        for b in neighbours {
            sum += b.direction;
        }
        (sum / neighbours.len() as f32)
            .try_normalize()
            .unwrap_or(self.direction)
    }

    /// Toward the neighbor centroid; holds the current heading when there
    /// are no neighbors or the centroid coincides with self.
    fn cohesion(&self, neighbours: &[&Boid]) -> Vec3 {
        if neighbours.is_empty() {
            return self.direction;
        }

        let mut sum = Vec3::zero();
        for b in neighbours {
            sum += b.position;
        }
        let centroid = sum / neighbours.len() as f32;
        (centroid - self.position)
            .try_normalize()
            .unwrap_or(self.direction)
    }

    /// Walk the predator roster once: kill check, visibility check, and the
    /// flee accumulation. While scared (from a prior tick or a sighting
    /// earlier in this walk), every predator's raw displacement repels —
    /// distance weighting comes from the displacement itself.
    fn assess_threats(&self, predators: &[Predator]) -> ThreatReport {
        let mut report = ThreatReport {
            vector: self.direction,
            killed: false,
            spotted: false,
        };
        let mut scared = self.scared;
        let mut accumulated = Vec3::zero();

        for predator in predators {
            let away = self.position - predator.position;
            let distance = away.magnitude();

            if distance < self.kill_distance {
                report.killed = true;
                continue;
            }

            if distance < self.flee_distance
                && is_within_view(
                    self.direction,
                    predator.position - self.position,
                    self.field_of_view,
                )
            {
                report.spotted = true;
                scared = true;
            }

            if scared {
                accumulated += away;
            }
        }

        if accumulated.magnitude() > 0.0 {
            report.vector = accumulated;
        }
        report
    }

    /// Fallback heading for a degenerate blend: head for the nearest
    /// neighbor, if any.
    fn toward_nearest(&self, neighbours: &[&Boid]) -> Option<Vec3> {
        let (nearest, _) = self.nearest(neighbours)?;
        (nearest.position - self.position).try_normalize()
    }

    fn nearest<'a>(&self, neighbours: &[&'a Boid]) -> Option<(&'a Boid, f32)> {
        let mut best: Option<(&Boid, f32)> = None;
        for b in neighbours {
            let distance = self.position.distance(&b.position);
            match best {
                // ties keep the first encountered
                Some((_, shortest)) if distance >= shortest => {}
                _ => best = Some((b, distance)),
            }
        }
        best
    }
}

struct ThreatReport {
    vector: Vec3,
    killed: bool,
    spotted: bool,
}

/// All living boids within `radius` of `origin`, excluding `origin` itself.
/// Roster order is preserved.
pub fn nearby_boids<'a>(origin: &Boid, roster: &'a [Boid], radius: f32) -> Vec<&'a Boid> {
    roster
        .iter()
        .filter(|b| b.alive && b.id != origin.id)
        .filter(|b| origin.position.distance(&b.position) < radius)
        .collect()
}

/// Whether `to_target` falls within the `fov_degrees`-wide window centered
/// on `heading`. Both window edges are inclusive.
pub fn is_within_view(heading: Vec3, to_target: Vec3, fov_degrees: f32) -> bool {
    bearing_within(bearing(to_target), bearing(heading), fov_degrees)
}

/// Compass-style bearing of a planar vector, degrees in [0, 360).
fn bearing(v: Vec3) -> f32 {
    (270.0 - v.y.atan2(v.x).to_degrees()).rem_euclid(360.0)
}

/// Containment in a `window`-wide arc centered on `center`. A window that
/// crosses the 0/360 seam is split into two sub-ranges so targets on either
/// side of the seam test symmetrically.
fn bearing_within(target: f32, center: f32, window: f32) -> bool {
    let half = window / 2.0;
    let lower = center - half;
    let upper = center + half;

    if lower < 0.0 {
        target >= lower + 360.0 || target <= upper
    } else if upper > 360.0 {
        target >= lower || target <= upper - 360.0
    } else {
        (lower..=upper).contains(&target)
    }
}

fn jittered<R: Rng>(base: f32, half_range: f32, rng: &mut R) -> f32 {
    if half_range > 0.0 {
        base + rng.gen_range(-half_range..half_range)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PredatorConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn rng() -> ChaCha12Rng {
        ChaCha12Rng::seed_from_u64(42)
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
    fn test_nearby_excludes_self() {
        let roster = vec![boid_at(0, 0.0, 0.0), boid_at(1, 5.0, 0.0)];
        let near = nearby_boids(&roster[0], &roster, 100.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id(), 1);
    }

    #[test]
    fn test_nearby_radius_is_strict() {
        let roster = vec![
            boid_at(0, 0.0, 0.0),
            boid_at(1, 99.9, 0.0),
            boid_at(2, 100.1, 0.0),
        ];
        let near = nearby_boids(&roster[0], &roster, 100.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id(), 1);
    }

    #[test]
    fn test_nearby_skips_dead() {
        let mut roster = vec![boid_at(0, 0.0, 0.0), boid_at(1, 5.0, 0.0)];
        roster[1].alive = false;
        assert!(nearby_boids(&roster[0], &roster, 100.0).is_empty());
    }

    /// Angular distance on the compass circle, for tolerant comparisons
    /// near the 0/360 seam.
    fn bearing_error(actual: f32, expected: f32) -> f32 {
        ((actual - expected + 180.0).rem_euclid(360.0) - 180.0).abs()
    }

    #[test]
    fn test_bearing_compass_points() {
        assert!(bearing_error(bearing(Vec3::new(0.0, -1.0, 0.0)), 0.0) < 1e-3);
        assert!(bearing_error(bearing(Vec3::new(-1.0, 0.0, 0.0)), 90.0) < 1e-3);
        assert!(bearing_error(bearing(Vec3::new(0.0, 1.0, 0.0)), 180.0) < 1e-3);
        assert!(bearing_error(bearing(Vec3::new(1.0, 0.0, 0.0)), 270.0) < 1e-3);
    }

    #[test]
    fn test_window_edges_inclusive() {
        assert!(bearing_within(20.0, 40.0, 40.0));
        assert!(bearing_within(60.0, 40.0, 40.0));
        assert!(!bearing_within(60.1, 40.0, 40.0));
        assert!(!bearing_within(19.9, 40.0, 40.0));
    }

    #[test]
    fn test_window_wraps_below_zero() {
        // [350, 370] wraps to [350, 360) ∪ [0, 10]
        assert!(bearing_within(5.0, 0.0, 20.0));
        assert!(bearing_within(355.0, 0.0, 20.0));
        assert!(!bearing_within(15.0, 0.0, 20.0));
        assert!(!bearing_within(345.0, 0.0, 20.0));
    }

    #[test]
    fn test_window_wraps_above_360() {
        assert!(bearing_within(2.0, 355.0, 20.0));
        assert!(bearing_within(348.0, 355.0, 20.0));
        assert!(!bearing_within(8.0, 355.0, 20.0));
    }

    #[test]
    fn test_is_within_view_ahead_and_behind() {
        // heading "north" in compass terms
        let heading = Vec3::new(0.0, -1.0, 0.0);
        assert!(is_within_view(heading, Vec3::new(0.0, -1.0, 0.0), 120.0));
        assert!(!is_within_view(heading, Vec3::new(0.0, 1.0, 0.0), 120.0));
        // directly abeam, only visible once the window reaches 180 each side
        assert!(!is_within_view(heading, Vec3::new(1.0, 0.0, 0.0), 120.0));
        assert!(is_within_view(heading, Vec3::new(1.0, 0.0, 0.0), 360.0));
    }

    #[test]
    fn test_alignment_cancelling_headings_fall_back() {
        let config = BoidConfig::default();
        let observer = boid_at(0, 0.0, 5.0);
        let left = Boid::new(
            1,
            Vec3::new(-10.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            &config,
        );
        let right = Boid::new(
            2,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            &config,
        );

        let neighbours = vec![&left, &right];
        let aligned = observer.alignment(&neighbours);
        assert_eq!(aligned, observer.direction);
    }

    #[test]
    fn test_separation_points_away_from_nearest() {
        let config = BoidConfig::default();
        let observer = boid_at(0, 0.0, 0.0);
        let near = boid_at(1, 20.0, 0.0);
        let far = boid_at(2, 60.0, 0.0);

        let neighbours = vec![&near, &far];
        let (away, scale) = observer.separation(&neighbours, &config);
        assert_eq!(away, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(scale, config.separation_scale);
    }

    #[test]
    fn test_separation_boost_under_crowding() {
        let config = BoidConfig::default();
        let observer = boid_at(0, 0.0, 0.0);
        let crowding = boid_at(1, 5.0, 0.0);

        let neighbours = vec![&crowding];
        let (_, scale) = observer.separation(&neighbours, &config);
        assert_eq!(scale, config.crowd_separation_scale);
    }

    #[test]
    fn test_undisturbed_boid_moves_straight() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);

        let plan = boid.plan(&[], &[], &config);
        boid.apply(plan, &config, 1.0, &mut rng());

        assert_eq!(boid.direction, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(boid.position, Vec3::new(140.0, 0.0, 0.0));
    }

    #[test]
    fn test_predator_in_kill_range_is_lethal() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(1.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 1.0, &mut rng());
        assert!(!boid.alive);
    }

    #[test]
    fn test_kill_suppressed_when_boids_cannot_die() {
        let config = BoidConfig {
            can_die: false,
            ..BoidConfig::default()
        };
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(1.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 1.0, &mut rng());
        assert!(boid.alive);
    }

    #[test]
    fn test_visible_predator_triggers_scare() {
        let config = BoidConfig::default();
        // heading +x is compass bearing 270; predator dead ahead
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(100.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 0.1, &mut rng());

        assert!(boid.scared);
        assert!(boid.spotted_predator);
        // fleeing away from the predator, at the boosted speed
        assert!(boid.direction.x < 0.0);
        assert!(boid.position.x < 0.0);
    }

    #[test]
    fn test_predator_behind_goes_unnoticed() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(-100.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 0.1, &mut rng());

        assert!(!boid.scared);
        assert!(!boid.spotted_predator);
    }

    #[test]
    fn test_scare_clears_after_cooldown() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(100.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 0.1, &mut rng());
        assert!(boid.scared);

        // predator gone; still scared until the countdown runs out
        let plan = boid.plan(&[], &[], &config);
        boid.apply(plan, &config, 0.3, &mut rng());
        assert!(boid.scared);

        let plan = boid.plan(&[], &[], &config);
        boid.apply(plan, &config, 0.3, &mut rng());
        assert!(!boid.scared);
    }

    #[test]
    fn test_sighting_rearms_cooldown() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(100.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 0.4, &mut rng());
        assert!(boid.scared);

        // the boid has turned to flee; a second sighting dead ahead 0.4s in
        // restarts the 0.5s countdown, so the next 0.3s step must not cross
        // the original expiry
        let predators = vec![predator_at(boid.position.x - 100.0, boid.position.y)];
        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 0.3, &mut rng());
        assert!(boid.scared);
    }

    #[test]
    fn test_death_is_terminal() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);
        let predators = vec![predator_at(1.0, 0.0)];

        let plan = boid.plan(&[], &predators, &config);
        boid.apply(plan, &config, 1.0, &mut rng());
        assert!(!boid.alive);

        // further updates with no predators must not resurrect it
        let plan = boid.plan(&[], &[], &config);
        boid.apply(plan, &config, 1.0, &mut rng());
        assert!(!boid.alive);
    }

    #[test]
    fn test_positions_stay_planar() {
        let config = BoidConfig::default();
        let mut boid = Boid::new(
            0,
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(1.0, 0.0, 0.0),
            &config,
        );

        let plan = boid.plan(&[], &[], &config);
        boid.apply(plan, &config, 1.0, &mut rng());
        assert_eq!(boid.position.z, 0.0);
        assert_eq!(boid.direction.z, 0.0);
    }

    #[test]
    fn test_update_is_plan_then_apply() {
        let config = BoidConfig::default();
        let mut boid = boid_at(0, 0.0, 0.0);

        boid.update(1.0, &[], &[], &config, &mut rng());
        assert_eq!(boid.position, Vec3::new(140.0, 0.0, 0.0));

        // a dead boid ignores updates entirely
        boid.alive = false;
        boid.update(1.0, &[], &[], &config, &mut rng());
        assert_eq!(boid.position, Vec3::new(140.0, 0.0, 0.0));
    }

    #[test]
    fn test_spawn_jitter_within_range() {
        let config = BoidConfig {
            speed_jitter: 20.0,
            ..BoidConfig::default()
        };
        let mut r = rng();
        for id in 0..50 {
            let boid = Boid::spawn(id, Vec3::zero(), &config, &mut r);
            assert!(boid.speed >= config.speed - 20.0);
            assert!(boid.speed < config.speed + 20.0);
        }
    }
}
