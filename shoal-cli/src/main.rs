use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use shoal_core::{BoidConfig, Flock, FlockConfig, PredatorConfig, Vec3};
use shoal_shared::{SimSettings, TickSummary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless predator/prey flocking simulation", long_about = None)]
struct Args {
    /// Number of boids to spawn
    #[arg(short, long, default_value_t = 60)]
    boids: usize,

    /// Number of predators to spawn
    #[arg(short, long, default_value_t = 2)]
    predators: usize,

    /// Play area width
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Play area height
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// RNG seed for a reproducible run; omit to seed from entropy
    #[arg(short, long)]
    seed: Option<u64>,

    /// Tuning file (JSON, partial settings allowed)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit stats as JSON lines on stdout instead of log lines
    #[arg(long)]
    json: bool,

    /// Ticks between stats lines
    #[arg(long, default_value_t = 60)]
    stats_every: u64,

    /// Drop dead boids from the roster as the run goes
    #[arg(long)]
    remove_dead: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

struct Simulation {
    flock: Flock,
    rng: ChaCha12Rng,
    width: f32,
    height: f32,
    json: bool,
    stats_every: u64,
    remove_dead: bool,
    spawned: usize,
}

impl Simulation {
    fn new(args: &Args, settings: SimSettings) -> Result<Self> {
        if args.dt <= 0.0 {
            bail!("timestep must be positive, got {}", args.dt);
        }
        if args.width <= 0.0 || args.height <= 0.0 {
            bail!(
                "play area must have positive extent, got {}x{}",
                args.width,
                args.height
            );
        }

        let mut rng = match args.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_entropy(),
        };

        let mut flock = Flock::new(flock_config(&settings));
        for _ in 0..args.boids {
            let position = Vec3::new(
                rng.gen_range(0.0..args.width),
                rng.gen_range(0.0..args.height),
                0.0,
            );
            flock.spawn_boid(position, &mut rng);
        }
        for _ in 0..args.predators {
            let position = Vec3::new(
                rng.gen_range(0.0..args.width),
                rng.gen_range(0.0..args.height),
                0.0,
            );
            flock.spawn_predator(position, &mut rng);
        }

        Ok(Self {
            flock,
            rng,
            width: args.width,
            height: args.height,
            json: args.json,
            stats_every: args.stats_every,
            remove_dead: args.remove_dead,
            spawned: args.boids,
        })
    }

    fn run(&mut self, ticks: u64, dt: f32) -> Result<()> {
        for tick in 1..=ticks {
            self.flock.update(dt, &mut self.rng);

            // the core leaves positions unbounded; fixing them against the
            // play area is the host's job, after every update
            for boid in &mut self.flock.boids {
                wrap_into_play_area(&mut boid.position, self.width, self.height);
            }
            for predator in &mut self.flock.predators {
                wrap_into_play_area(&mut predator.position, self.width, self.height);
            }

            if self.remove_dead {
                let removed = self.flock.remove_dead();
                if removed > 0 {
                    log::debug!("removed {} dead boids", removed);
                }
            }

            if self.stats_every > 0 && tick % self.stats_every == 0 {
                self.emit_stats(tick)?;
            }
        }

        log::info!(
            "run finished: {}/{} boids survived",
            self.flock.alive_boids(),
            self.spawned
        );
        Ok(())
    }

    fn emit_stats(&self, tick: u64) -> Result<()> {
        let summary = TickSummary {
            tick,
            alive: self.flock.alive_boids(),
            scared: self.flock.scared_boids(),
            targeted: self.flock.boids.iter().filter(|b| b.targeted).count(),
        };

        if self.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            log::info!(
                "tick {}: {} alive, {} scared, {} targeted",
                summary.tick,
                summary.alive,
                summary.scared,
                summary.targeted
            );
        }
        Ok(())
    }
}

/// Host-side "fix if off-screen" against the play area: teleport to the
/// opposite edge, as the simulation space is toroidal.
fn wrap_into_play_area(position: &mut Vec3, width: f32, height: f32) {
    if position.x < 0.0 {
        position.x = width;
    } else if position.x > width {
        position.x = 0.0;
    }

    if position.y < 0.0 {
        position.y = height;
    } else if position.y > height {
        position.y = 0.0;
    }
}

fn flock_config(settings: &SimSettings) -> FlockConfig {
    FlockConfig {
        boid: BoidConfig {
            perception_radius: settings.boid.perception_radius,
            speed: settings.boid.speed,
            scared_speed: settings.boid.scared_speed,
            field_of_view: settings.boid.field_of_view,
            flee_distance: settings.boid.flee_distance,
            kill_distance: settings.boid.kill_distance,
            separation_scale: settings.boid.separation_scale,
            alignment_scale: settings.boid.alignment_scale,
            cohesion_scale: settings.boid.cohesion_scale,
            flee_scale: settings.boid.flee_scale,
            crowd_distance: settings.boid.crowd_distance,
            crowd_separation_scale: settings.boid.crowd_separation_scale,
            turn_damping: settings.boid.turn_damping,
            scare_duration: settings.boid.scare_duration,
            speed_jitter: settings.boid.speed_jitter,
            fov_jitter: settings.boid.fov_jitter,
            flee_jitter: settings.boid.flee_jitter,
            can_die: settings.boid.can_die,
        },
        predator: PredatorConfig {
            speed: settings.predator.speed,
        },
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<SimSettings> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file {}", path.display()))?;
            SimSettings::from_json(&raw)
                .with_context(|| format!("failed to parse settings file {}", path.display()))
        }
        None => Ok(SimSettings::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let settings = load_settings(args.settings.as_ref())?;
    log::info!(
        "starting run: {} boids, {} predators, {}x{} area, {} ticks",
        args.boids,
        args.predators,
        args.width,
        args.height,
        args.ticks
    );
    if let Some(seed) = args.seed {
        log::info!("seed: {}", seed);
    }

    let mut simulation =
        Simulation::new(&args, settings).context("failed to set up simulation")?;
    simulation.run(args.ticks, args.dt).context("run failed")?;

    Ok(())
}
