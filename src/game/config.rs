//! Session Configuration
//!
//! Timings, player stat bounds and the CSV tile index mapping.
//! Every field has a default, so a JSON file only needs to list overrides.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{Fixed, PLAYER_SPEED};
use crate::game::grid::TileKind;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Mapping from CSV tile indices to tile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileIndexMap {
    pub free: i32,
    pub wall: i32,
    pub brick: i32,
    pub pickup_bomb: i32,
    pub pickup_power: i32,
}

impl Default for TileIndexMap {
    fn default() -> Self {
        Self {
            free: 0,
            wall: 1,
            brick: 2,
            pickup_bomb: 8,
            pickup_power: 9,
        }
    }
}

impl TileIndexMap {
    /// Resolve a raw CSV index.
    pub fn kind_of(&self, index: i32) -> Option<TileKind> {
        // Checked in kind order so a misconfigured duplicate resolves predictably
        if index == self.free {
            Some(TileKind::Free)
        } else if index == self.wall {
            Some(TileKind::Wall)
        } else if index == self.brick {
            Some(TileKind::Brick)
        } else if index == self.pickup_bomb {
            Some(TileKind::PickupBomb)
        } else if index == self.pickup_power {
            Some(TileKind::PickupPower)
        } else {
            None
        }
    }

    fn has_duplicates(&self) -> bool {
        let all = [self.free, self.wall, self.brick, self.pickup_bomb, self.pickup_power];
        all.iter()
            .enumerate()
            .any(|(i, a)| all[i + 1..].contains(a))
    }
}

/// Configuration for an arena session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bomb fuse (ms)
    pub fuse_ms: u32,
    /// Wait between death and respawn (ms)
    pub respawn_ms: u32,
    /// Pickup reappearance delay (ms)
    pub pickup_respawn_ms: u32,
    /// Lifetime of emitter/wave/edge blast markers (ms)
    pub blast_display_ms: u32,
    /// Lifetime of a brick destruction marker (ms)
    pub brick_debris_ms: u32,
    /// Death animation length; the corpse is hidden afterwards (ms)
    pub death_animation_ms: u32,
    /// Movement magnitude in px/sec (Q16.16)
    pub player_speed: Fixed,
    /// Blast power a player starts with
    pub base_power: u8,
    /// Upper bound for power pickups
    pub max_power: u8,
    /// Bomb capacity a player starts with
    pub base_bombs: u8,
    /// Upper bound for capacity pickups
    pub max_bombs: u8,
    /// Keep earned power/capacity across respawns
    pub keep_upgrades_on_respawn: bool,
    /// CSV index mapping
    pub tiles: TileIndexMap,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fuse_ms: 3000,
            respawn_ms: 2000,
            pickup_respawn_ms: 10_000,
            blast_display_ms: 334,  // 4 frames @ 12 fps
            brick_debris_ms: 417,   // 5 frames @ 12 fps
            death_animation_ms: 500, // 6 frames @ 12 fps
            player_speed: PLAYER_SPEED,
            base_power: 1,
            max_power: 3,
            base_bombs: 1,
            max_bombs: 5,
            keep_upgrades_on_respawn: false,
            tiles: TileIndexMap::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject configurations the simulation cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fuse_ms == 0 {
            return Err(ConfigError::Invalid("fuse_ms must be positive".into()));
        }
        if self.player_speed <= 0 {
            return Err(ConfigError::Invalid("player_speed must be positive".into()));
        }
        if self.base_bombs == 0 {
            return Err(ConfigError::Invalid("base_bombs must be at least 1".into()));
        }
        if self.max_power < self.base_power {
            return Err(ConfigError::Invalid(format!(
                "max_power {} is below base_power {}",
                self.max_power, self.base_power
            )));
        }
        if self.max_bombs < self.base_bombs {
            return Err(ConfigError::Invalid(format!(
                "max_bombs {} is below base_bombs {}",
                self.max_bombs, self.base_bombs
            )));
        }
        if self.tiles.has_duplicates() {
            return Err(ConfigError::Invalid("tile indices must be distinct".into()));
        }
        Ok(())
    }
}
