//! Arena Simulation Module
//!
//! All game simulation code. Deterministic given the seed and inputs.
//!
//! ## Module Structure
//!
//! - `config`: Session tunables and CSV tile index mapping
//! - `grid`: Terrain classification and destructible state
//! - `entity`: Players, bombs and pickups behind `Collidable`/`Updatable`
//! - `registry`: Entity store with per-cell queries
//! - `timer`: Simulated clock and deferred tasks
//! - `input`: Per-tick intents, edge latch and recording
//! - `movement`: Intent to velocity, tile-AABB integration
//! - `blast`: Bomb placement, detonation and chain reactions
//! - `player`: Death, respawn and pickups
//! - `events`: View events for a presentation layer
//! - `state`: Session state
//! - `tick`: Per-frame driver and replay

pub mod config;
pub mod grid;
pub mod entity;
pub mod registry;
pub mod timer;
pub mod input;
pub mod movement;
pub mod blast;
pub mod player;
pub mod events;
pub mod state;
pub mod tick;

// Re-export key types
pub use config::{ConfigError, SessionConfig, TileIndexMap};
pub use grid::{Cell, Direction, MapError, TileKind, TileMap};
pub use entity::{Bomb, Collidable, Entity, EntityId, EntityKind, Player, PowerUp, Team, Updatable};
pub use registry::EntityRegistry;
pub use timer::{Scheduler, TimerTask};
pub use input::{BombKeyLatch, InputDelta, InputFrame, PlayerInputBuffer};
pub use blast::{BlastReport, BlastSegment, SegmentKind};
pub use events::{AnimationKey, GameEvent, GameEventData};
pub use state::SessionState;
pub use tick::{TickResult, replay_session, tick};
