//! Headless streaming demo: walks a viewer across the terrain while the
//! streaming manager keeps a disc of chunks resident around it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use loam_geom::Vec3;
use loam_stream::StreamingManager;
use loam_world::{World, WorldGenConfig, load_worldgen_config_from_path};

#[derive(Parser, Debug)]
#[command(name = "loam", about = "Streaming voxel terrain demo")]
struct Cli {
    /// World seed.
    #[arg(long, default_value_t = 42)]
    seed: i32,

    /// Worldgen TOML file; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation steps to run.
    #[arg(long, default_value_t = 240)]
    steps: u32,

    /// Simulated seconds per step.
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Walk speed in world units per second.
    #[arg(long, default_value_t = 6.0)]
    speed: f32,

    /// Build worker threads; defaults to the available parallelism.
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => match load_worldgen_config_from_path(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => WorldGenConfig::default(),
    };
    let world = match World::new(cli.seed, &cfg) {
        Ok(w) => Arc::new(w),
        Err(e) => {
            log::error!("invalid worldgen config: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "world seed {} chunk size {} voxel {} view distance {}",
        cli.seed,
        world.chunk_size(),
        world.voxel_size(),
        world.params().view_distance
    );

    let mut manager = match cli.workers {
        Some(n) => StreamingManager::with_workers(world.clone(), n),
        None => StreamingManager::new(world.clone()),
    };

    let started = Instant::now();
    let weave = world.chunk_world_size();
    let mut viewer = Vec3::new(0.0, world.world_height() * 0.5, 0.0);
    for step in 0..cli.steps {
        manager.tick(viewer);

        let t = step as f32 * cli.dt;
        viewer.x += cli.speed * cli.dt;
        viewer.z = (t * 0.15).sin() * weave;
        if let Some(h) = manager.height_at(viewer.x, viewer.z) {
            viewer.y = h + 1.7;
        }

        if step % 60 == 0 {
            log::info!(
                "step {step}: viewer ({:.1}, {:.1}, {:.1}), {} resident, {} in flight",
                viewer.x,
                viewer.y,
                viewer.z,
                manager.store().len(),
                manager.inflight_count()
            );
        }
        thread::sleep(Duration::from_millis(4));
    }

    if !manager.drain_until_settled(Duration::from_secs(30)) {
        log::warn!("builds did not settle before the timeout");
    }

    let stats = manager.stats();
    log::info!(
        "walked {:.1} units in {:.2?}: {} ticks, {} recomputes, {} built, {} discarded, {} evicted",
        viewer.x,
        started.elapsed(),
        stats.ticks,
        stats.recomputes,
        stats.results_applied,
        stats.results_discarded,
        stats.chunks_evicted
    );
    log::info!(
        "{} chunks resident, {} nav connections",
        manager.store().len(),
        manager.nav().connection_count()
    );
    if let Some(biome) = manager.biome_at(viewer.x, viewer.z) {
        log::info!(
            "standing in {:?}/{:?} terrain at height {:.1}",
            biome.terrain,
            biome.climate,
            manager.height_at(viewer.x, viewer.z).unwrap_or(0.0)
        );
    }
    ExitCode::SUCCESS
}
