//! Blast Arena Demo Driver
//!
//! Runs a scripted two-player session on a CSV map, logs what happens and
//! verifies determinism by replaying the recorded intents.
//!
//! Usage: `blast-arena [MAP.csv] [CONFIG.json]`

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use blast_arena::{
    FRAME_MS, TICK_RATE, VERSION,
    core::rng::derive_session_seed,
    game::{
        config::SessionConfig,
        entity::EntityId,
        events::GameEventData,
        grid::{Direction, TileMap},
        input::{BombKeyLatch, InputFrame, PlayerInputBuffer},
        state::SessionState,
        tick::{replay_session, tick},
    },
};

/// Simulated session length (30 seconds)
const DEMO_TICKS: u32 = 30 * TICK_RATE;

const DEMO_MAP: &str = "\
0,0,2,2,2,2,2,2,2,0,0
0,1,2,1,2,1,2,1,2,1,0
2,2,8,2,2,9,2,2,8,2,2
2,1,2,1,0,1,0,1,2,1,2
2,2,2,2,0,0,0,2,2,2,2
2,1,2,1,0,1,0,1,2,1,2
2,2,9,2,2,8,2,2,9,2,2
0,1,2,1,2,1,2,1,2,1,0
0,0,2,2,2,2,2,2,2,0,0
";

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Blast Arena v{}", VERSION);
    info!("Frame: {} ms ({} Hz)", FRAME_MS, TICK_RATE);

    let mut args = std::env::args().skip(1);
    let map_path = args.next();
    let config_path = args.next();
    if args.next().is_some() {
        bail!("usage: blast-arena [MAP.csv] [CONFIG.json]");
    }

    let config = match &config_path {
        Some(path) => SessionConfig::load(path).with_context(|| format!("loading config {}", path))?,
        None => SessionConfig::default(),
    };
    let map_source = match &map_path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading map {}", path))?,
        None => DEMO_MAP.to_string(),
    };
    let grid = TileMap::from_csv(&map_source, &config.tiles).context("parsing map")?;

    demo_session(grid, config, &map_source)
}

/// Held keys for the scripted players: wander in slow loops, drop a bomb
/// now and then.
fn scripted_keys(t: u32, player_index: u32) -> InputFrame {
    let phase = t / (45 + 20 * player_index);
    let direction = Direction::ALL[((phase + player_index * 2) % 4) as usize];
    let mut frame = InputFrame::moving(direction);
    if (t + player_index * 37) % 150 < 3 {
        frame = frame.with_bomb();
    }
    frame
}

fn demo_session(grid: TileMap, config: SessionConfig, map_source: &str) -> Result<()> {
    info!("=== Starting Demo Session ===");

    let rng_seed = derive_session_seed("demo", map_source);
    info!("Map: {}x{} (border included)", grid.width(), grid.height());
    info!("RNG Seed: {}", rng_seed);

    let (initial, players) = SessionState::two_player(grid, config, rng_seed);
    let mut state = initial.clone();

    for id in players {
        if let Some(player) = state.registry.player(id) {
            let (x, y) = player.position.to_floats();
            info!("Added {} player {} at ({:.1}, {:.1})", player.team.name(), id.0, x, y);
        }
    }

    let mut latches = [BombKeyLatch::new(); 2];
    let mut buffers = players.map(PlayerInputBuffer::new);
    let mut total_events = 0usize;
    let mut detonations = 0usize;

    info!("Running {} ticks...", DEMO_TICKS);
    for t in 0..DEMO_TICKS {
        let mut inputs: BTreeMap<EntityId, InputFrame> = BTreeMap::new();
        for (i, id) in players.iter().enumerate() {
            let frame = latches[i].latch(scripted_keys(t, i as u32));
            buffers[i].record(t, frame);
            inputs.insert(*id, frame);
        }

        let result = tick(&mut state, &inputs, FRAME_MS);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::BombDetonated { bomb, cell, triggered_by, .. } => {
                    detonations += 1;
                    match triggered_by {
                        Some(by) => info!("t={} bomb {} chained by {} at {:?}", event.tick, bomb.0, by.0, cell),
                        None => info!("t={} bomb {} exploded at {:?}", event.tick, bomb.0, cell),
                    }
                }
                GameEventData::PlayerKilled { player, by_bomb, .. } => {
                    info!("t={} player {} killed by bomb {}", event.tick, player.0, by_bomb.0);
                }
                GameEventData::PlayerRespawned { player, cell } => {
                    info!("t={} player {} respawned at {:?}", event.tick, player.0, cell);
                }
                GameEventData::PickupCollected { player, kind, .. } => {
                    info!("t={} player {} picked up {:?}", event.tick, player.0, kind);
                }
                _ => {}
            }
        }
    }

    info!("=== Session Results ===");
    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    for player in state.registry.players() {
        info!(
            "{}: kills {} deaths {} power {} bombs {}",
            player.team.name(),
            player.kills,
            player.deaths,
            player.power,
            player.bomb_capacity
        );
    }
    info!("Detonations: {}, total events: {}", detonations, total_events);

    let compressed: usize = buffers.iter().map(PlayerInputBuffer::delta_count).sum();
    info!("Recorded {} input deltas for {} ticks", compressed, DEMO_TICKS);

    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay_session(initial, &buffers, DEMO_TICKS, FRAME_MS);
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
