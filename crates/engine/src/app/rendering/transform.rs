use crate::world::{Camera2D, ScreenSize, Vec2};

/// Maps a map-pixel position into the camera's screen-pixel space.
pub fn world_to_screen_px(world: Vec2, camera: &Camera2D) -> (i32, i32) {
    let x = world.x - camera.position.x;
    let y = world.y - camera.position.y;
    (x.floor() as i32, y.floor() as i32)
}

/// Inclusive range of tile columns and rows overlapping the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

pub fn visible_tile_span(
    camera: &Camera2D,
    screen: ScreenSize,
    tile_size: u32,
    grid_width: u32,
    grid_height: u32,
) -> Option<TileSpan> {
    if tile_size == 0 || grid_width == 0 || grid_height == 0 {
        return None;
    }
    let size = tile_size as f32;
    let first = |origin: f32| (origin / size).floor().max(0.0) as u32;
    let last = |origin: f32, extent: u32, count: u32| {
        let edge = ((origin + extent as f32) / size).ceil() - 1.0;
        if edge < 0.0 {
            None
        } else {
            Some((edge as u32).min(count - 1))
        }
    };

    let x_min = first(camera.position.x);
    let y_min = first(camera.position.y);
    let x_max = last(camera.position.x, screen.width, grid_width)?;
    let y_max = last(camera.position.y, screen.height, grid_height)?;
    if x_min > x_max || y_min > y_max {
        return None;
    }
    Some(TileSpan {
        x_min,
        x_max,
        y_min,
        y_max,
    })
}
