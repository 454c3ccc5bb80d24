use serde::Deserialize;
use tracing::debug;

use super::grid::{Tile, TileGrid, TileLayer};
use super::loader::{
    checked_tile_size, strip_gid_flags, tile_gid, LevelLoadError, LevelLoader,
    PASSABLE_PROPERTY,
};

/// Loader for Tiled JSON maps (`.tmj`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TiledJsonLoader;

#[derive(Debug, Deserialize)]
struct TmjMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<TmjLayer>,
    #[serde(default)]
    tilesets: Vec<TmjTileset>,
}

#[derive(Debug, Deserialize)]
struct TmjLayer {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    data: Option<TmjLayerData>,
    #[serde(default)]
    layers: Vec<TmjLayer>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TmjLayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

#[derive(Debug, Deserialize)]
struct TmjTileset {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    tiles: Vec<TmjTile>,
}

#[derive(Debug, Deserialize)]
struct TmjTile {
    id: u32,
    #[serde(default)]
    properties: Vec<TmjProperty>,
}

#[derive(Debug, Deserialize)]
struct TmjProperty {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl LevelLoader for TiledJsonLoader {
    fn parse(&self, bytes: &[u8]) -> Result<TileGrid, LevelLoadError> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let map = serde_path_to_error::deserialize::<_, TmjMap>(&mut deserializer).map_err(
            |error| LevelLoadError::Json {
                path: error.path().to_string(),
                source: error.into_inner(),
            },
        )?;
        build_grid(map)
    }
}

fn build_grid(map: TmjMap) -> Result<TileGrid, LevelLoadError> {
    if map.infinite {
        return Err(LevelLoadError::InfiniteMap);
    }
    let tile_size = checked_tile_size(map.tilewidth, map.tileheight)?;

    let mut tiles = Vec::new();
    for tileset in &map.tilesets {
        if let Some(reference) = &tileset.source {
            return Err(LevelLoadError::ExternalTileset {
                reference: reference.clone(),
            });
        }
        for tile in &tileset.tiles {
            tiles.push(Tile::new(
                tile.id,
                tile_gid(tileset.firstgid, tile.id)?,
                is_passable(&tile.properties),
            ));
        }
    }

    let mut layers = Vec::new();
    collect_tile_layers(map.layers, &mut layers)?;
    Ok(TileGrid::new(
        map.width,
        map.height,
        tile_size,
        layers,
        tiles,
    )?)
}

fn collect_tile_layers(
    source: Vec<TmjLayer>,
    out: &mut Vec<TileLayer>,
) -> Result<(), LevelLoadError> {
    for layer in source {
        match layer.kind.as_str() {
            "tilelayer" => {
                if let Some(encoding) = layer.encoding.filter(|encoding| encoding != "csv") {
                    return Err(LevelLoadError::EncodedLayerData {
                        layer: layer.name,
                        encoding,
                    });
                }
                let data = match layer.data {
                    Some(TmjLayerData::Gids(gids)) => {
                        gids.into_iter().map(strip_gid_flags).collect()
                    }
                    Some(TmjLayerData::Encoded(_)) => {
                        return Err(LevelLoadError::EncodedLayerData {
                            layer: layer.name,
                            encoding: "string".to_string(),
                        })
                    }
                    None => Vec::new(),
                };
                out.push(TileLayer::new(layer.name, data));
            }
            "group" => collect_tile_layers(layer.layers, out)?,
            other => debug!(layer = %layer.name, kind = other, "non_tile_layer_ignored"),
        }
    }
    Ok(())
}

fn is_passable(properties: &[TmjProperty]) -> bool {
    properties.iter().any(|property| {
        property.name == PASSABLE_PROPERTY
            && property.kind == "bool"
            && property.value == serde_json::Value::Bool(true)
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::level::TileCoord;

    fn parse(raw: &str) -> Result<TileGrid, LevelLoadError> {
        TiledJsonLoader.parse(raw.as_bytes())
    }

    const PROPERTY_SCHEMA: &str = r#"{
        "compressionlevel": -1, "orientation": "orthogonal", "renderorder": "right-down",
        "width": 3, "height": 2, "tilewidth": 16, "tileheight": 16, "infinite": false,
        "layers": [
            { "id": 1, "name": "sky", "type": "tilelayer", "width": 3, "height": 2,
              "opacity": 1, "visible": true, "x": 0, "y": 0, "data": [3, 3, 3, 0, 0, 0] },
            { "id": 2, "name": "blocks", "type": "tilelayer", "width": 3, "height": 2,
              "opacity": 1, "visible": true, "x": 0, "y": 0, "data": [0, 0, 0, 1, 2147483650, 1] },
            { "id": 3, "name": "spawns", "type": "objectgroup", "objects": [] }
        ],
        "tilesets": [{
            "firstgid": 1, "columns": 3, "name": "smb", "tilecount": 3,
            "tiles": [
                { "id": 0 },
                { "id": 1, "properties": [{ "name": "CanPassed", "type": "bool", "value": false }] },
                { "id": 2, "properties": [
                    { "name": "note", "type": "string", "value": "sky" },
                    { "name": "CanPassed", "type": "bool", "value": true }
                ] }
            ]
        }]
    }"#;

    #[test]
    fn parses_properties_schema() {
        let grid = parse(PROPERTY_SCHEMA).expect("grid");
        assert_eq!((grid.width(), grid.height(), grid.tile_size()), (3, 2, 16));
        assert_eq!(grid.layers().len(), 2);
        assert_eq!(grid.layers()[0].name(), "sky");

        assert!(!grid.tile(1).expect("gid 1").is_passable());
        assert!(!grid.tile(2).expect("gid 2").is_passable());
        assert!(grid.tile(3).expect("gid 3").is_passable());
    }

    #[test]
    fn strips_flip_flags_from_layer_data() {
        let grid = parse(PROPERTY_SCHEMA).expect("grid");
        let blocks = &grid.layers()[1];
        assert_eq!(grid.tile_index(blocks, TileCoord::new(1, 1)), Some(2));
    }

    #[test]
    fn parses_image_collection_schema_without_properties() {
        let raw = r#"{
            "type": "map", "version": "1.10", "width": 2, "height": 1,
            "tilewidth": 16, "tileheight": 16, "infinite": false,
            "layers": [{ "name": "terrain", "type": "tilelayer", "opacity": 1.0, "data": [5, 6] }],
            "tilesets": [{
                "firstgid": 5, "name": "props", "columns": 0,
                "grid": { "height": 1, "orientation": "orthogonal", "width": 1 },
                "tiles": [
                    { "id": 0, "image": "crate.png", "imageheight": 16, "imagewidth": 16 },
                    { "id": 1, "image": "bush.png", "imageheight": 16, "imagewidth": 16 }
                ]
            }]
        }"#;
        let grid = parse(raw).expect("grid");
        let tile = grid.tile(6).expect("gid 6");
        assert_eq!(tile.id(), 1);
        assert!(!tile.is_passable());
    }

    #[test]
    fn flattens_group_layers_in_order() {
        let raw = r#"{
            "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "layers": [
                { "name": "back", "type": "tilelayer", "data": [0] },
                { "name": "grp", "type": "group", "layers": [
                    { "name": "inner", "type": "tilelayer", "data": [1] }
                ] }
            ],
            "tilesets": []
        }"#;
        let grid = parse(raw).expect("grid");
        let names = grid.layers().iter().map(TileLayer::name).collect::<Vec<_>>();
        assert_eq!(names, ["back", "inner"]);
    }

    #[test]
    fn json_errors_report_field_path() {
        let raw = r#"{ "width": 2, "height": "tall", "tilewidth": 16, "tileheight": 16 }"#;
        match parse(raw) {
            Err(LevelLoadError::Json { path, .. }) => assert_eq!(path, "height"),
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unsupported_map_shapes() {
        let infinite = r#"{ "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16, "infinite": true }"#;
        assert!(matches!(parse(infinite), Err(LevelLoadError::InfiniteMap)));

        let external = r#"{ "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
            "tilesets": [{ "firstgid": 1, "source": "smb.tsj" }] }"#;
        assert!(matches!(
            parse(external),
            Err(LevelLoadError::ExternalTileset { reference }) if reference == "smb.tsj"
        ));

        let encoded = r#"{ "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
            "layers": [{ "name": "t", "type": "tilelayer", "encoding": "base64", "data": "AQAAAA==" }] }"#;
        assert!(matches!(
            parse(encoded),
            Err(LevelLoadError::EncodedLayerData { encoding, .. }) if encoding == "base64"
        ));
    }

    #[test]
    fn tileset_gid_overflow_is_a_load_error() {
        let raw = r#"{ "width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
            "tilesets": [{ "firstgid": 4294967295, "tiles": [{ "id": 1 }] }] }"#;
        assert!(matches!(
            parse(raw),
            Err(LevelLoadError::GidOverflow { firstgid: u32::MAX, id: 1 })
        ));
    }

    #[test]
    fn layer_length_must_match_map_size() {
        let raw = r#"{ "width": 2, "height": 2, "tilewidth": 16, "tileheight": 16,
            "layers": [{ "name": "t", "type": "tilelayer", "data": [1, 1, 1] }] }"#;
        assert!(matches!(parse(raw), Err(LevelLoadError::Grid(_))));
    }

    #[test]
    fn shipped_level_has_passable_and_solid_tiles() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/levels/world1.tmj");
        let raw = std::fs::read(&path).expect("shipped level");
        let grid = TiledJsonLoader.parse(&raw).expect("grid");

        let mut passable = 0;
        let mut solid = 0;
        for gid in 1..=grid.tile_count() as u32 {
            match grid.tile(gid).map(Tile::is_passable) {
                Some(true) => passable += 1,
                Some(false) => solid += 1,
                None => {}
            }
        }
        assert!(passable > 0);
        assert!(solid > 0);
        assert_eq!(grid.tile_size(), 16);
    }
}
