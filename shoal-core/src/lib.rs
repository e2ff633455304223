//! Predator/prey flocking simulation core.
//!
//! A population of boids steers by a weighted blend of separation,
//! alignment, cohesion, and flee-from-predator rules while one or more
//! predators pick off stragglers. The crate owns only the per-tick
//! steering and interaction logic: hosts drive [`Flock::update`] with their
//! own clock, inject the random source, and handle everything screen-shaped
//! (bounds fixing, rendering) on the positions the core hands back —
//! always plane-projected, `z == 0`.

pub mod boid;
pub mod config;
pub mod flock;
pub mod predator;
pub mod timer;
pub mod vector;

pub use boid::{is_within_view, nearby_boids, Boid};
pub use config::{BoidConfig, FlockConfig, PredatorConfig};
pub use flock::Flock;
pub use predator::Predator;
pub use timer::Timer;
pub use vector::{random_direction, Vec3};
