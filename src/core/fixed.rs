//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the arena simulation.
//! Continuous positions are measured in pixels; a tile is 16 px wide.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768 px to +32767.99998 px                        │
//! │  Precision: 1/65536 px                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! 32k px is roughly 2000 tiles per axis, far beyond any authored map.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// ARENA CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Tile edge length in whole pixels.
pub const TILE_PIXELS: i32 = 16;

/// Tile edge length: 16 px = 16 * 65536 = 1048576
pub const TILE_SIZE: Fixed = TILE_PIXELS << FIXED_SCALE;

/// Half a tile: 8 px, offset from a tile corner to its center
pub const TILE_HALF: Fixed = TILE_SIZE >> 1;

/// Default player speed: 48 px/sec = 48 * 65536 = 3145728
pub const PLAYER_SPEED: Fixed = 3145728;

/// Half-extent of a player's collision body: 4 px (body is 8x8 px)
pub const BODY_HALF_EXTENT: Fixed = 262144;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in tick loop.
///
/// # Example
/// ```
/// use blast_arena::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Whole integer as fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Distance covered in `dt_ms` milliseconds at `rate` units per second.
///
/// Truncates toward zero, so equal and opposite rates move equal distances.
#[inline]
pub fn per_second_over_ms(rate: Fixed, dt_ms: u32) -> Fixed {
    ((rate as i64 * dt_ms as i64) / 1000) as Fixed
}

/// Index of the tile containing a coordinate (floor semantics).
///
/// Negative coordinates land in negative tiles: -1 px is tile -1, not 0.
#[inline]
pub fn tile_index(coord: Fixed) -> i32 {
    coord.div_euclid(TILE_SIZE)
}

/// Pixel coordinate of a tile's center.
#[inline]
pub const fn tile_center(index: i32) -> Fixed {
    index * TILE_SIZE + TILE_HALF
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(TILE_SIZE, 16 * FIXED_ONE);
        assert_eq!(TILE_HALF, 8 * FIXED_ONE);
        assert_eq!(PLAYER_SPEED, 48 * FIXED_ONE);
        assert_eq!(BODY_HALF_EXTENT, 4 * FIXED_ONE);
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(0.5), FIXED_HALF);
        assert_eq!(to_fixed(-1.0), -FIXED_ONE);
        assert_eq!(from_int(3), to_fixed(3.0));
    }

    #[test]
    fn test_per_second_over_ms() {
        // 48 px/s for one second
        assert_eq!(per_second_over_ms(PLAYER_SPEED, 1000), PLAYER_SPEED);
        // 48 px/s for 250ms = 12 px
        assert_eq!(per_second_over_ms(PLAYER_SPEED, 250), from_int(12));
        // Symmetric for negative rates
        assert_eq!(
            per_second_over_ms(-PLAYER_SPEED, 17),
            -per_second_over_ms(PLAYER_SPEED, 17)
        );
    }

    #[test]
    fn test_tile_index_floor() {
        assert_eq!(tile_index(0), 0);
        assert_eq!(tile_index(TILE_SIZE - 1), 0);
        assert_eq!(tile_index(TILE_SIZE), 1);
        assert_eq!(tile_index(-1), -1);
        assert_eq!(tile_index(tile_center(5)), 5);
    }
}
