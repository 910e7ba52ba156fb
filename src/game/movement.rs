//! Movement & Collision
//!
//! Intent resolves to a single-axis velocity of fixed magnitude. The
//! integrator then moves the square body one axis at a time and clamps it
//! flush against the bounding box of any Wall/Brick tile in its way.

use crate::core::fixed::{Fixed, BODY_HALF_EXTENT, TILE_SIZE, per_second_over_ms, tile_index};
use crate::core::vec2::FixedVec2;
use crate::game::grid::{Cell, Direction, TileMap};
use crate::game::input::InputFrame;

/// Velocity for this tick's intent. Never diagonal.
pub fn intent_velocity(frame: InputFrame, speed: Fixed) -> FixedVec2 {
    match frame.direction() {
        Some(direction) => {
            let (dx, dy) = direction.offset();
            FixedVec2::new(dx * speed, dy * speed)
        }
        None => FixedVec2::ZERO,
    }
}

/// Integrate `velocity` over `dt_ms` and resolve against solid tiles.
pub fn step_body(position: FixedVec2, velocity: FixedVec2, dt_ms: u32, grid: &TileMap) -> FixedVec2 {
    let dx = per_second_over_ms(velocity.x, dt_ms);
    let dy = per_second_over_ms(velocity.y, dt_ms);

    let mut pos = position;
    if dx != 0 {
        pos.x = sweep_x(pos, dx, grid);
    }
    if dy != 0 {
        pos.y = sweep_y(pos, dy, grid);
    }
    pos
}

/// Tile rows (or columns) covered by a body centered on `center`.
#[inline]
fn span(center: Fixed) -> std::ops::RangeInclusive<i32> {
    tile_index(center - BODY_HALF_EXTENT)..=tile_index(center + BODY_HALF_EXTENT - 1)
}

fn column_blocked(grid: &TileMap, col: i32, rows: std::ops::RangeInclusive<i32>) -> bool {
    rows.into_iter().any(|row| !grid.is_passable(Cell::new(col, row)))
}

fn row_blocked(grid: &TileMap, row: i32, cols: std::ops::RangeInclusive<i32>) -> bool {
    cols.into_iter().any(|col| !grid.is_passable(Cell::new(col, row)))
}

fn sweep_x(pos: FixedVec2, dx: Fixed, grid: &TileMap) -> Fixed {
    let target = pos.x + dx;
    let rows = span(pos.y);

    if dx > 0 {
        let from = tile_index(pos.x + BODY_HALF_EXTENT - 1) + 1;
        let to = tile_index(target + BODY_HALF_EXTENT - 1);
        for col in from..=to {
            if column_blocked(grid, col, rows.clone()) {
                return col * TILE_SIZE - BODY_HALF_EXTENT;
            }
        }
    } else {
        let from = tile_index(pos.x - BODY_HALF_EXTENT) - 1;
        let to = tile_index(target - BODY_HALF_EXTENT);
        for col in (to..=from).rev() {
            if column_blocked(grid, col, rows.clone()) {
                return (col + 1) * TILE_SIZE + BODY_HALF_EXTENT;
            }
        }
    }
    target
}

fn sweep_y(pos: FixedVec2, dy: Fixed, grid: &TileMap) -> Fixed {
    let target = pos.y + dy;
    let cols = span(pos.x);

    if dy > 0 {
        let from = tile_index(pos.y + BODY_HALF_EXTENT - 1) + 1;
        let to = tile_index(target + BODY_HALF_EXTENT - 1);
        for row in from..=to {
            if row_blocked(grid, row, cols.clone()) {
                return row * TILE_SIZE - BODY_HALF_EXTENT;
            }
        }
    } else {
        let from = tile_index(pos.y - BODY_HALF_EXTENT) - 1;
        let to = tile_index(target - BODY_HALF_EXTENT);
        for row in (to..=from).rev() {
            if row_blocked(grid, row, cols.clone()) {
                return (row + 1) * TILE_SIZE + BODY_HALF_EXTENT;
            }
        }
    }
    target
}

/// Does the body at `position` overlap the box of `cell`? Touching edges do not count.
pub fn body_overlaps_cell(position: FixedVec2, cell: Cell) -> bool {
    let left = cell.col * TILE_SIZE;
    let top = cell.row * TILE_SIZE;
    position.x + BODY_HALF_EXTENT > left
        && position.x - BODY_HALF_EXTENT < left + TILE_SIZE
        && position.y + BODY_HALF_EXTENT > top
        && position.y - BODY_HALF_EXTENT < top + TILE_SIZE
}

/// Direction a velocity points in, if moving.
pub fn heading(velocity: FixedVec2) -> Option<Direction> {
    if velocity.x < 0 {
        Some(Direction::Left)
    } else if velocity.x > 0 {
        Some(Direction::Right)
    } else if velocity.y < 0 {
        Some(Direction::Up)
    } else if velocity.y > 0 {
        Some(Direction::Down)
    } else {
        None
    }
}
