//! Core deterministic primitives.
//!
//! Integer-only math, seeded randomness and state hashing. Nothing here
//! knows about bombs or tiles beyond the pixel size of a tile.

pub mod fixed;
pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE, TILE_SIZE};
pub use vec2::FixedVec2;
pub use rng::DeterministicRng;
pub use hash::compute_state_hash;
