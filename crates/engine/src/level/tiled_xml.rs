use roxmltree::{Document, Node};
use tracing::debug;

use super::grid::{Tile, TileGrid, TileLayer};
use super::loader::{
    checked_tile_size, strip_gid_flags, tile_gid, LevelLoadError, LevelLoader, SourceLocation,
    PASSABLE_PROPERTY,
};

/// Loader for Tiled XML maps (`.tmx`) with CSV or per-tile XML layer data.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiledXmlLoader;

impl LevelLoader for TiledXmlLoader {
    fn parse(&self, bytes: &[u8]) -> Result<TileGrid, LevelLoadError> {
        let raw = std::str::from_utf8(bytes).map_err(|_| LevelLoadError::NotUtf8)?;
        let doc = Document::parse(raw).map_err(|error| LevelLoadError::Xml {
            location: SourceLocation {
                line: error.pos().row,
                column: error.pos().col,
            },
            message: error.to_string(),
        })?;

        let map = doc.root_element();
        if map.tag_name().name() != "map" {
            return Err(error_at_node(
                &doc,
                map,
                "root element must be <map>".to_string(),
            ));
        }
        if map.attribute("infinite") == Some("1") {
            return Err(LevelLoadError::InfiniteMap);
        }

        let width = required_u32(&doc, map, "width")?;
        let height = required_u32(&doc, map, "height")?;
        let tile_size = checked_tile_size(
            required_u32(&doc, map, "tilewidth")?,
            required_u32(&doc, map, "tileheight")?,
        )?;

        let mut tiles = Vec::new();
        let mut layers = Vec::new();
        for child in map.children().filter(|node| node.is_element()) {
            match child.tag_name().name() {
                "tileset" => parse_tileset(&doc, child, &mut tiles)?,
                "layer" | "group" => collect_tile_layers(&doc, child, &mut layers)?,
                other => debug!(element = other, "non_tile_element_ignored"),
            }
        }

        Ok(TileGrid::new(width, height, tile_size, layers, tiles)?)
    }
}

fn parse_tileset(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    tiles: &mut Vec<Tile>,
) -> Result<(), LevelLoadError> {
    if let Some(reference) = node.attribute("source") {
        return Err(LevelLoadError::ExternalTileset {
            reference: reference.to_string(),
        });
    }
    let first_gid = required_u32(doc, node, "firstgid")?;
    for tile in node
        .children()
        .filter(|child| child.has_tag_name("tile"))
    {
        let id = required_u32(doc, tile, "id")?;
        tiles.push(Tile::new(
            id,
            tile_gid(first_gid, id)?,
            has_passable_property(tile),
        ));
    }
    Ok(())
}

fn has_passable_property(tile: Node<'_, '_>) -> bool {
    tile.children()
        .filter(|child| child.has_tag_name("properties"))
        .flat_map(|properties| properties.children())
        .filter(|child| child.has_tag_name("property"))
        .any(|property| {
            property.attribute("name") == Some(PASSABLE_PROPERTY)
                && property.attribute("type") == Some("bool")
                && property.attribute("value") == Some("true")
        })
}

fn collect_tile_layers(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    out: &mut Vec<TileLayer>,
) -> Result<(), LevelLoadError> {
    if node.has_tag_name("group") {
        for child in node.children().filter(|child| child.is_element()) {
            if child.has_tag_name("layer") || child.has_tag_name("group") {
                collect_tile_layers(doc, child, out)?;
            }
        }
        return Ok(());
    }

    let name = node.attribute("name").unwrap_or_default().to_string();
    let Some(data) = node.children().find(|child| child.has_tag_name("data")) else {
        out.push(TileLayer::new(name, Vec::new()));
        return Ok(());
    };

    let gids = match data.attribute("encoding") {
        Some("csv") => parse_csv_gids(doc, data)?,
        None => data
            .children()
            .filter(|child| child.has_tag_name("tile"))
            .map(|tile| match tile.attribute("gid") {
                Some(_) => required_u32(doc, tile, "gid"),
                None => Ok(0),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(LevelLoadError::EncodedLayerData {
                layer: name,
                encoding: other.to_string(),
            })
        }
    };

    out.push(TileLayer::new(
        name,
        gids.into_iter().map(strip_gid_flags).collect(),
    ));
    Ok(())
}

fn parse_csv_gids(doc: &Document<'_>, data: Node<'_, '_>) -> Result<Vec<u32>, LevelLoadError> {
    data.text()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse::<u32>().map_err(|_| {
                error_at_node(doc, data, format!("invalid gid '{value}' in CSV layer data"))
            })
        })
        .collect()
}

fn required_u32(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attribute: &str,
) -> Result<u32, LevelLoadError> {
    let Some(raw) = node.attribute(attribute) else {
        return Err(error_at_node(
            doc,
            node,
            format!(
                "missing attribute '{attribute}' on <{}>",
                node.tag_name().name()
            ),
        ));
    };
    raw.trim().parse::<u32>().map_err(|_| {
        error_at_node(
            doc,
            node,
            format!(
                "attribute '{attribute}' on <{}> must be a non-negative integer, got '{raw}'",
                node.tag_name().name()
            ),
        )
    })
}

fn error_at_node(doc: &Document<'_>, node: Node<'_, '_>, message: String) -> LevelLoadError {
    let pos = doc.text_pos_at(node.range().start);
    LevelLoadError::Xml {
        location: SourceLocation {
            line: pos.row,
            column: pos.col,
        },
        message,
    }
}
