use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::grid::{TileGrid, TileGridError};
use super::tiled_json::TiledJsonLoader;
use super::tiled_xml::TiledXmlLoader;

/// Tile property that marks a tile as walk-through. Absent means solid.
pub const PASSABLE_PROPERTY: &str = "CanPassed";

/// Tiled stores flip/rotation flags in the top four bits of a gid.
pub(crate) const GID_FLAG_MASK: u32 = 0x0FFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("failed to read level file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported level file extension: {path} (expected .tmj, .json or .tmx)")]
    UnsupportedExtension { path: PathBuf },
    #[error("level document is not valid UTF-8")]
    NotUtf8,
    #[error("malformed level JSON at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed level XML at {location}: {message}")]
    Xml {
        location: SourceLocation,
        message: String,
    },
    #[error("infinite (chunked) maps are not supported")]
    InfiniteMap,
    #[error("external tileset '{reference}' is not supported; embed the tileset in the map")]
    ExternalTileset { reference: String },
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'; save the map with CSV layer data")]
    EncodedLayerData { layer: String, encoding: String },
    #[error("tileset firstgid {firstgid} plus tile id {id} overflows the gid range")]
    GidOverflow { firstgid: u32, id: u32 },
    #[error("tiles must be square, got {width}x{height}")]
    NonSquareTiles { width: u32, height: u32 },
    #[error(transparent)]
    Grid(#[from] TileGridError),
}

/// Parses raw level bytes into a [`TileGrid`].
pub trait LevelLoader {
    fn parse(&self, bytes: &[u8]) -> Result<TileGrid, LevelLoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    TiledJson,
    TiledXml,
}

impl LevelFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "tmj" | "json" => Some(Self::TiledJson),
            "tmx" => Some(Self::TiledXml),
            _ => None,
        }
    }

    pub fn loader(self) -> Box<dyn LevelLoader> {
        match self {
            Self::TiledJson => Box::new(TiledJsonLoader),
            Self::TiledXml => Box::new(TiledXmlLoader),
        }
    }
}

pub fn load_level_file(path: &Path) -> Result<TileGrid, LevelLoadError> {
    let format =
        LevelFormat::from_path(path).ok_or_else(|| LevelLoadError::UnsupportedExtension {
            path: path.to_path_buf(),
        })?;
    let bytes = fs::read(path).map_err(|source| LevelLoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = format.loader().parse(&bytes)?;
    info!(
        path = %path.display(),
        format = ?format,
        width = grid.width(),
        height = grid.height(),
        tile_size = grid.tile_size(),
        layer_count = grid.layers().len(),
        tile_count = grid.tile_count(),
        "level_loaded"
    );
    Ok(grid)
}

pub(crate) fn checked_tile_size(width: u32, height: u32) -> Result<u32, LevelLoadError> {
    if width != height {
        return Err(LevelLoadError::NonSquareTiles { width, height });
    }
    Ok(width)
}

pub(crate) fn tile_gid(firstgid: u32, id: u32) -> Result<u32, LevelLoadError> {
    firstgid
        .checked_add(id)
        .ok_or(LevelLoadError::GidOverflow { firstgid, id })
}

pub(crate) fn strip_gid_flags(raw: u32) -> u32 {
    raw & GID_FLAG_MASK
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TINY_TMJ: &str = r#"{
        "width": 2, "height": 1, "tilewidth": 16, "tileheight": 16,
        "layers": [{ "name": "terrain", "type": "tilelayer", "data": [1, 0] }],
        "tilesets": [{ "firstgid": 1, "tiles": [{ "id": 0 }] }]
    }"#;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            LevelFormat::from_path(Path::new("levels/world1.tmj")),
            Some(LevelFormat::TiledJson)
        );
        assert_eq!(
            LevelFormat::from_path(Path::new("levels/WORLD1.TMX")),
            Some(LevelFormat::TiledXml)
        );
        assert_eq!(LevelFormat::from_path(Path::new("levels/world1.png")), None);
        assert_eq!(LevelFormat::from_path(Path::new("levels/world1")), None);
    }

    #[test]
    fn flip_flags_are_masked() {
        assert_eq!(strip_gid_flags(0x8000_0003), 3);
        assert_eq!(strip_gid_flags(0xE000_0011), 0x11);
        assert_eq!(strip_gid_flags(7), 7);
    }

    #[test]
    fn loads_level_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tiny.tmj");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(TINY_TMJ.as_bytes()).expect("write");

        let grid = load_level_file(&path).expect("level");
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.tile_count(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_level_file(&dir.path().join("missing.tmj")).expect_err("missing");
        assert!(matches!(error, LevelLoadError::ReadFile { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected_before_reading() {
        let error = load_level_file(Path::new("does/not/exist.txt")).expect_err("extension");
        assert!(matches!(error, LevelLoadError::UnsupportedExtension { .. }));
    }

    #[test]
    fn non_square_tiles_are_rejected() {
        assert_eq!(checked_tile_size(16, 16).expect("square"), 16);
        assert!(matches!(
            checked_tile_size(16, 8),
            Err(LevelLoadError::NonSquareTiles {
                width: 16,
                height: 8
            })
        ));
    }
}
