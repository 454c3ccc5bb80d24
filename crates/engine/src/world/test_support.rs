use crate::level::{Tile, TileGrid, TileLayer};

pub(crate) const SOLID: u32 = 1;
pub(crate) const PASSABLE: u32 = 2;
pub(crate) const UNKNOWN: u32 = 9;

/// Builds a 16px grid from ASCII rows: `#` solid, `~` passable, `?` a gid
/// with no tile metadata, anything else empty.
pub(crate) fn grid_from_rows(rows: &[&str]) -> TileGrid {
    grid_from_layers(&[rows])
}

pub(crate) fn grid_from_layers(layers: &[&[&str]]) -> TileGrid {
    let height = layers[0].len() as u32;
    let width = layers[0][0].len() as u32;
    let layers = layers
        .iter()
        .enumerate()
        .map(|(index, rows)| {
            let data = rows
                .iter()
                .flat_map(|row| row.chars())
                .map(|cell| match cell {
                    '#' => SOLID,
                    '~' => PASSABLE,
                    '?' => UNKNOWN,
                    _ => 0,
                })
                .collect();
            TileLayer::new(format!("layer{index}"), data)
        })
        .collect();
    TileGrid::new(
        width,
        height,
        16,
        layers,
        [Tile::new(0, SOLID, false), Tile::new(1, PASSABLE, true)],
    )
    .expect("test grid")
}

/// 20x10 level: solid floor on rows 8-9 with a three-column pit at x=10..=12.
pub(crate) fn level_with_pit() -> TileGrid {
    let mut rows = vec![".".repeat(20); 8];
    let floor = format!("{}{}{}", "#".repeat(10), "...", "#".repeat(7));
    rows.push(floor.clone());
    rows.push(floor);
    let refs = rows.iter().map(String::as_str).collect::<Vec<_>>();
    grid_from_rows(&refs)
}
