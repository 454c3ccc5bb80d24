use std::collections::HashMap;

use thiserror::Error;

/// Integer cell coordinate inside a [`TileGrid`]. `(0,0)` is the top-left cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Pixel-space rectangle of one tile, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: u32,
    gid: u32,
    passable: bool,
}

impl Tile {
    pub fn new(id: u32, gid: u32, passable: bool) -> Self {
        Self { id, gid, passable }
    }

    /// Tile id local to its tileset.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Global id as stored in layer data.
    pub fn gid(&self) -> u32 {
        self.gid
    }

    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    name: String,
    data: Vec<u32>,
}

impl TileLayer {
    pub fn new(name: impl Into<String>, data: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("tile size must be non-zero")]
    ZeroTileSize,
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    LayerSizeMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
}

/// Static level geometry: layered tile indices plus a gid -> [`Tile`] table.
///
/// Layer values are 1-based global ids, 0 marks an empty cell. The grid is
/// immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    layers: Vec<TileLayer>,
    tiles: HashMap<u32, Tile>,
}

impl TileGrid {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: u32,
        layers: Vec<TileLayer>,
        tiles: impl IntoIterator<Item = Tile>,
    ) -> Result<Self, TileGridError> {
        if width == 0 || height == 0 {
            return Err(TileGridError::ZeroDimension { width, height });
        }
        if tile_size == 0 {
            return Err(TileGridError::ZeroTileSize);
        }
        let expected = width as usize * height as usize;
        for layer in &layers {
            if layer.data.len() != expected {
                return Err(TileGridError::LayerSizeMismatch {
                    layer: layer.name.clone(),
                    expected,
                    actual: layer.data.len(),
                });
            }
        }
        let tiles = tiles.into_iter().map(|tile| (tile.gid, tile)).collect();
        Ok(Self {
            width,
            height,
            tile_size,
            layers,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn pixel_width(&self) -> f32 {
        (self.width * self.tile_size) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.height * self.tile_size) as f32
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Looks up tile metadata for a global id.
    pub fn tile(&self, gid: u32) -> Option<&Tile> {
        self.tiles.get(&gid)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Non-zero tile index of `layer` at `coord`, `None` when empty or off-grid.
    pub fn tile_index(&self, layer: &TileLayer, coord: TileCoord) -> Option<u32> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        let index = coord.y as usize * self.width as usize + coord.x as usize;
        layer.data.get(index).copied().filter(|gid| *gid != 0)
    }

    pub fn tile_rect(&self, coord: TileCoord) -> TileRect {
        let size = self.tile_size as f32;
        let left = coord.x as f32 * size;
        let top = coord.y as f32 * size;
        TileRect {
            left,
            top,
            right: left + size,
            bottom: top + size,
        }
    }
}
