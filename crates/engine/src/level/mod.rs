mod grid;
mod loader;
mod tiled_json;
mod tiled_xml;

pub use grid::{Tile, TileCoord, TileGrid, TileGridError, TileLayer, TileRect};
pub use loader::{
    load_level_file, LevelFormat, LevelLoadError, LevelLoader, SourceLocation, PASSABLE_PROPERTY,
};
pub use tiled_json::TiledJsonLoader;
pub use tiled_xml::TiledXmlLoader;
