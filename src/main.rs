//! Headless agent entry point.
//!
//! Brings up the knowledge base, a deterministic demo world, the control
//! server, and the single command worker that owns the facade.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::info;

use blockhand_facade::BlockPos;
use blockhand_knowledge::KnowledgeBase;
use blockhand_testkit::SimWorld;

mod commands;
mod config;
mod intent;
mod server;
mod status;

use commands::CommandWorker;
use config::BotConfig;
use status::SharedState;

#[derive(Debug, Parser)]
#[command(name = "blockhand", about = "Autonomous block-world agent")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the control server listen address.
    #[arg(long)]
    listen: Option<String>,
    /// Override the demo world seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => BotConfig::load_from_path(path),
        None => BotConfig::load(),
    };
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(seed) = args.seed {
        config.world_seed = seed;
    }

    let kb = KnowledgeBase::new();
    let mut world = demo_world(config.world_seed);
    let state = SharedState::new();
    state.observe(&world, true);

    let listener = TcpListener::bind(&config.listen_addr)
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "control server listening");

    let (tx, rx) = mpsc::sync_channel(0);
    {
        let state = state.clone();
        std::thread::spawn(move || server::serve(listener, state, tx));
    }

    let mut worker = CommandWorker::new(&mut world, &kb, &config, state);
    commands::run_worker(rx, &mut worker);
    Ok(())
}

/// A small deterministic playground: flat ground, a stand of trees, an
/// exposed stone shelf with ores, and a cow to bother.
fn demo_world(seed: u64) -> SimWorld {
    let mut world = SimWorld::new(seed).with_ground(63, 24, "dirt");

    for z in -3..=3 {
        world.set_block(BlockPos::new(8, 64, z), "oak_log");
        world.set_block(BlockPos::new(10, 64, z), "spruce_log");
    }
    for x in -12..=-6 {
        for z in -4..=4 {
            world.set_block(BlockPos::new(x, 64, z), "stone");
        }
    }
    world.set_block(BlockPos::new(-8, 65, 0), "coal_ore");
    world.set_block(BlockPos::new(-9, 65, 1), "iron_ore");
    world.set_block(BlockPos::new(-10, 65, 2), "iron_ore");
    for x in 4..=6 {
        world.set_block(BlockPos::new(x, 64, 8), "sand");
    }

    world.spawn_entity("cow", glam::Vec3::new(6.0, 64.0, -6.0), 10.0);
    world
}
