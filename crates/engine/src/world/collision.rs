use tracing::trace;

use super::sprite::{JumpState, Sprite};
use super::Vec2;
use crate::level::{TileCoord, TileGrid, TileRect};

/// Upper bound on cells inspected per tick; the candidate rules never need more.
pub const MAX_CANDIDATES: usize = 8;

type Offset = (i64, i64);

const SELF: Offset = (0, 0);
const LEFT: Offset = (-1, 0);
const RIGHT: Offset = (1, 0);
const ABOVE: Offset = (0, -1);
const BELOW: Offset = (0, 1);
const ABOVE_RIGHT: Offset = (1, -1);
const BELOW_RIGHT: Offset = (1, 1);

/// Deduplicated, in-grid cells to test, in test order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateTiles {
    coords: [TileCoord; MAX_CANDIDATES],
    len: usize,
}

impl CandidateTiles {
    pub fn as_slice(&self) -> &[TileCoord] {
        &self.coords[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.as_slice().contains(&coord)
    }

    fn push_offsets(&mut self, grid: &TileGrid, start: (i64, i64), offsets: &[Offset]) {
        for (dx, dy) in offsets {
            let (x, y) = (start.0 + dx, start.1 + dy);
            if !grid.contains(x, y) {
                continue;
            }
            let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
                continue;
            };
            let coord = TileCoord::new(x, y);
            if self.len == MAX_CANDIDATES || self.contains(coord) {
                continue;
            }
            self.coords[self.len] = coord;
            self.len += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePlan {
    /// The sprite reached the bottom row; nothing is tested.
    OutOfMap,
    Tiles(CandidateTiles),
}

/// Picks the cells around `position` that can touch the sprite box this tick.
///
/// Edge columns and the top row seed a fixed neighbour set first, then the
/// alignment rules add cells depending on whether x and y sit exactly on a
/// tile boundary.
pub fn candidate_tiles(position: Vec2, grid: &TileGrid) -> CandidatePlan {
    let size = grid.tile_size() as f32;
    let start_x = (position.x / size).floor() as i64;
    let start_y = (position.y / size).floor() as i64;
    if start_y >= i64::from(grid.height()) - 1 {
        return CandidatePlan::OutOfMap;
    }

    let start = (start_x, start_y);
    let mut tiles = CandidateTiles::default();
    let edge: &[Offset] = if start_x <= 0 {
        &[BELOW, ABOVE, RIGHT]
    } else if start_x >= i64::from(grid.width()) - 1 {
        &[BELOW, ABOVE, LEFT]
    } else if start_y <= 0 {
        &[BELOW, LEFT, RIGHT]
    } else {
        &[]
    };
    tiles.push_offsets(grid, start, edge);

    if !on_tile_boundary(position.x, grid.tile_size()) {
        tiles.push_offsets(
            grid,
            start,
            &[BELOW, ABOVE, BELOW_RIGHT, ABOVE_RIGHT, SELF, RIGHT],
        );
    } else {
        tiles.push_offsets(grid, start, &[LEFT, RIGHT, BELOW, ABOVE]);
    }
    if !on_tile_boundary(position.y, grid.tile_size()) {
        tiles.push_offsets(grid, start, &[SELF, ABOVE]);
    }
    CandidatePlan::Tiles(tiles)
}

/// Alignment looks at the whole-pixel part of `coord` only.
fn on_tile_boundary(coord: f32, tile_size: u32) -> bool {
    (coord as i64) % i64::from(tile_size) == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Floor,
    Ceiling,
    Side,
}

/// Classifies how a sprite box of `size` at `position` meets `rect`.
///
/// Floor and ceiling are decided on the vertical span alone; side means the
/// horizontal spans touch or overlap.
pub fn classify_contact(position: Vec2, size: f32, rect: TileRect) -> Option<Contact> {
    let bottom = position.y + size;
    if bottom >= rect.top && position.y < rect.top {
        Some(Contact::Floor)
    } else if position.y <= rect.bottom && bottom > rect.bottom {
        Some(Contact::Ceiling)
    } else if position.x <= rect.right && position.x + size >= rect.left {
        Some(Contact::Side)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Snapped onto the top of an impassable tile.
    Landed { tile: TileCoord },
    /// Lost floor support; `below` is the passable tile stood on, if any.
    Unsupported { below: Option<TileCoord> },
    #[default]
    Free,
    /// Reached the bottom row; the session respawns the sprite.
    FellOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub resolution: Resolution,
    pub ceiling_hits: u32,
    pub side_contacts: u32,
    pub skipped_tiles: u32,
}

/// Corrects `sprite` against the tiles around it.
///
/// Layers are scanned in order and candidates in insertion order; the first
/// floor resolution ends the scan. Head bumps push the sprite down and keep
/// scanning. Side contacts are counted only.
pub fn resolve_collisions(sprite: &mut Sprite, grid: &TileGrid, sprite_size: f32) -> CollisionReport {
    let mut report = CollisionReport::default();
    let candidates = match candidate_tiles(sprite.position, grid) {
        CandidatePlan::OutOfMap => {
            report.resolution = Resolution::FellOut;
            return report;
        }
        CandidatePlan::Tiles(candidates) => candidates,
    };

    for layer in grid.layers() {
        for &coord in candidates.as_slice() {
            let Some(gid) = grid.tile_index(layer, coord) else {
                continue;
            };
            let Some(tile) = grid.tile(gid) else {
                trace!(
                    gid,
                    x = coord.x,
                    y = coord.y,
                    layer = layer.name(),
                    "unknown_tile_skipped"
                );
                report.skipped_tiles += 1;
                continue;
            };

            let rect = grid.tile_rect(coord);
            match classify_contact(sprite.position, sprite_size, rect) {
                Some(Contact::Floor) if !tile.is_passable() => {
                    sprite.position.y = rect.top - sprite_size;
                    sprite.jump_state = JumpState::Grounded;
                    report.resolution = Resolution::Landed { tile: coord };
                    return report;
                }
                Some(Contact::Floor) if sprite.jump_state == JumpState::Grounded => {
                    sprite.jump_state = JumpState::Airborne;
                    report.resolution = Resolution::Unsupported { below: Some(coord) };
                    return report;
                }
                Some(Contact::Ceiling) if !tile.is_passable() => {
                    sprite.position.y = rect.bottom;
                    report.ceiling_hits += 1;
                }
                Some(Contact::Side) if !tile.is_passable() => report.side_contacts += 1,
                _ => {}
            }
        }
    }

    if sprite.jump_state == JumpState::Grounded {
        sprite.jump_state = JumpState::Airborne;
        report.resolution = Resolution::Unsupported { below: None };
    }
    report
}
