use rand::Rng;

use crate::boid::{Boid, BoidPlan};
use crate::config::FlockConfig;
use crate::predator::Predator;
use crate::vector::Vec3;

/// Owns the agent rosters and drives one simulation tick at a time.
///
/// Each tick runs the predator phase first (target claims, flag commit,
/// pursuit movement), then the boid phase. Boid steering is computed for
/// every agent against the pre-phase roster and committed afterwards, so the
/// outcome does not depend on roster order. All `targeted` flag writes
/// happen here, never from inside an agent update.
pub struct Flock {
    pub boids: Vec<Boid>,
    pub predators: Vec<Predator>,
    pub config: FlockConfig,
    next_id: u32,
}

impl Flock {
    pub fn new(config: FlockConfig) -> Self {
        Self {
            boids: Vec::new(),
            predators: Vec::new(),
            config,
            next_id: 0,
        }
    }

    /// Add a boid with a random heading; returns its id.
    pub fn spawn_boid<R: Rng>(&mut self, position: Vec3, rng: &mut R) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.boids
            .push(Boid::spawn(id, position, &self.config.boid, rng));
        id
    }

    /// Add a predator with a random heading.
    pub fn spawn_predator<R: Rng>(&mut self, position: Vec3, rng: &mut R) {
        self.predators
            .push(Predator::spawn(position, &self.config.predator, rng));
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.update_predators(dt, rng);
        self.update_boids(dt, rng);
    }

    fn update_predators<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        // claim phase: predators pick in roster order; a claim made earlier
        // this tick blocks later predators, last tick's flags block everyone
        // but the flag's owner
        let mut claims: Vec<Option<u32>> = Vec::with_capacity(self.predators.len());
        let mut claimed: Vec<u32> = Vec::new();
        for (index, predator) in self.predators.iter().enumerate() {
            let choice = predator.select_target(&self.boids, &claimed);
            if let Some(id) = choice {
                claimed.push(id);
                if predator.target() != choice {
                    log::debug!("predator {} now hunting boid {}", index, id);
                }
            }
            claims.push(choice);
        }

        // commit phase: rewrite every targeted flag from the claims
        for boid in &mut self.boids {
            boid.targeted = false;
        }
        for (predator, claim) in self.predators.iter_mut().zip(&claims) {
            predator.set_target(*claim);
        }
        for id in claims.iter().flatten() {
            if let Some(boid) = self.boids.iter_mut().find(|b| b.id() == *id) {
                boid.targeted = true;
            }
        }

        // pursuit
        let boids = &self.boids;
        for predator in &mut self.predators {
            let target_position = predator
                .target()
                .and_then(|id| boids.iter().find(|b| b.id() == id))
                .map(|b| b.position);
            predator.advance(target_position, dt, rng);
        }
    }

    fn update_boids<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        let config = self.config.boid;

        // compute every plan against the immutable pre-phase roster
        let plans: Vec<Option<BoidPlan>> = self
            .boids
            .iter()
            .map(|boid| {
                if boid.alive {
                    Some(boid.plan(&self.boids, &self.predators, &config))
                } else {
                    None
                }
            })
            .collect();

        // commit
        for (boid, plan) in self.boids.iter_mut().zip(plans) {
            if let Some(plan) = plan {
                boid.apply(plan, &config, dt, rng);
            }
        }
    }

    pub fn alive_boids(&self) -> usize {
        self.boids.iter().filter(|b| b.alive).count()
    }

    pub fn scared_boids(&self) -> usize {
        self.boids.iter().filter(|b| b.alive && b.scared).count()
    }

    /// Drop dead boids from the roster; returns how many were removed.
    /// Removal is the host's policy — the core never calls this itself.
    /// Predator handles stay valid because they reference ids, not indices.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.boids.len();
        self.boids.retain(|b| b.alive);
        before - self.boids.len()
    }
}
