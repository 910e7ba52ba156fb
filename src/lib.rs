//! # Blast Arena
//!
//! Deterministic simulation core for a two-player bomb arena on a tile grid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BLAST ARENA CORE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point, tile geometry         │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Arena simulation (deterministic)          │
//! │  ├── grid.rs     - Tile map, border, destructible bricks     │
//! │  ├── entity.rs   - Player / Bomb / PowerUp                   │
//! │  ├── registry.rs - Entity store, per-cell queries            │
//! │  ├── timer.rs    - Simulated clock and deferred tasks        │
//! │  ├── movement.rs - Intent to velocity, tile collision        │
//! │  ├── blast.rs    - Detonation and chain reactions            │
//! │  ├── player.rs   - Death, respawn, pickups                   │
//! │  └── tick.rs     - Per-frame driver and replay               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are deterministic:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - Time is the simulated clock fed by the caller, never the wall clock
//! - All randomness from seeded Xorshift128+
//!
//! Given the same map, config, seed and inputs, a session produces the
//! same events and the same final state hash.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE, TILE_SIZE};
pub use crate::core::vec2::FixedVec2;
pub use crate::core::rng::DeterministicRng;
pub use crate::game::input::{InputFrame, InputDelta, PlayerInputBuffer};
pub use crate::game::state::SessionState;
pub use crate::game::tick::{tick, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reference frame rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Simulated milliseconds per frame at `TICK_RATE`
pub const FRAME_MS: u32 = 1000 / TICK_RATE;
