//! Player Intent
//!
//! The upstream input provider hands the core one 5-bit intent per tick
//! per player. Movement bits mean "currently held"; the place-bomb bit
//! means "pressed this tick". `BombKeyLatch` derives that edge from a raw
//! held key, and `PlayerInputBuffer` records intents for replay.

use serde::{Serialize, Deserialize};

use crate::game::entity::EntityId;
use crate::game::grid::Direction;

// =============================================================================
// INPUT FRAME
// =============================================================================

/// One tick of intent for one player.
///
/// - Bit 0: left held
/// - Bit 1: right held
/// - Bit 2: up held
/// - Bit 3: down held
/// - Bit 4: place bomb (edge-triggered)
/// - Bit 5-7: Reserved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    pub flags: u8,
}

impl InputFrame {
    pub const FLAG_LEFT: u8 = 0x01;
    pub const FLAG_RIGHT: u8 = 0x02;
    pub const FLAG_UP: u8 = 0x04;
    pub const FLAG_DOWN: u8 = 0x08;
    pub const FLAG_PLACE_BOMB: u8 = 0x10;

    const VALID_MASK: u8 = 0x1F;

    /// Idle frame.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Frame from raw bits; reserved bits are dropped.
    pub const fn from_bits(flags: u8) -> Self {
        Self { flags: flags & Self::VALID_MASK }
    }

    /// Frame holding one direction.
    pub const fn moving(direction: Direction) -> Self {
        let flags = match direction {
            Direction::Left => Self::FLAG_LEFT,
            Direction::Right => Self::FLAG_RIGHT,
            Direction::Up => Self::FLAG_UP,
            Direction::Down => Self::FLAG_DOWN,
        };
        Self { flags }
    }

    /// Same frame with the place-bomb bit set.
    pub const fn with_bomb(self) -> Self {
        Self { flags: self.flags | Self::FLAG_PLACE_BOMB }
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.flags & Self::FLAG_LEFT != 0
    }

    #[inline]
    pub fn right(&self) -> bool {
        self.flags & Self::FLAG_RIGHT != 0
    }

    #[inline]
    pub fn up(&self) -> bool {
        self.flags & Self::FLAG_UP != 0
    }

    #[inline]
    pub fn down(&self) -> bool {
        self.flags & Self::FLAG_DOWN != 0
    }

    #[inline]
    pub fn place_bomb(&self) -> bool {
        self.flags & Self::FLAG_PLACE_BOMB != 0
    }

    /// Resolve held keys to a single direction.
    ///
    /// Horizontal beats vertical; left beats right; up beats down.
    pub fn direction(&self) -> Option<Direction> {
        if self.left() {
            Some(Direction::Left)
        } else if self.right() {
            Some(Direction::Right)
        } else if self.up() {
            Some(Direction::Up)
        } else if self.down() {
            Some(Direction::Down)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }
}

// =============================================================================
// EDGE DETECTION
// =============================================================================

/// Turns a held place-bomb key into a one-tick press.
#[derive(Clone, Copy, Debug, Default)]
pub struct BombKeyLatch {
    was_held: bool,
}

impl BombKeyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the raw held keys for this tick; returns the intent to submit.
    pub fn latch(&mut self, held: InputFrame) -> InputFrame {
        let held_now = held.place_bomb();
        let pressed = held_now && !self.was_held;
        self.was_held = held_now;

        if pressed {
            held
        } else {
            InputFrame::from_bits(held.flags & !InputFrame::FLAG_PLACE_BOMB)
        }
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Input change at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    pub tick: u32,
    pub frame: InputFrame,
}

/// Delta-compressed intent recording for one player.
///
/// Only ticks where the intent changes are stored; an edge-triggered bomb
/// press is a change in and of itself, so presses are never lost.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerInputBuffer {
    pub player_id: EntityId,
    pub start_tick: u32,
    pub end_tick: u32,
    deltas: Vec<InputDelta>,
    #[serde(skip)]
    last_frame: InputFrame,
}

impl PlayerInputBuffer {
    pub fn new(player_id: EntityId) -> Self {
        Self {
            player_id,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::new(),
            last_frame: InputFrame::new(),
        }
    }

    /// Record the intent submitted at `tick`.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Intent in effect at `tick`.
    pub fn get_input_at(&self, tick: u32) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Tick-by-tick frames from `start_tick` through `end_tick`.
    pub fn replay_iter(&self) -> impl Iterator<Item = (u32, InputFrame)> + '_ {
        (self.start_tick..=self.end_tick).map(move |t| (t, self.get_input_at(t)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
