use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::level::TileCoord;
use crate::world::{ScreenSize, Session, Vec2};

use super::{visible_tile_span, world_to_screen_px};

const CLEAR_COLOR: [u8; 4] = [92, 148, 252, 255];
const SOLID_TILE_COLOR: [u8; 4] = [156, 74, 0, 255];
const PASSABLE_TILE_COLOR: [u8; 4] = [128, 208, 16, 255];
const UNKNOWN_TILE_COLOR: [u8; 4] = [255, 0, 255, 255];
const SPRITE_COLOR: [u8; 4] = [0, 168, 0, 255];
const SPRITE_FACING_COLOR: [u8; 4] = [252, 252, 252, 255];

/// Flat-colour debug view of a [`Session`]. The pixel buffer has the
/// session's logical screen size and is scaled up to the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    screen: ScreenSize,
}

impl Renderer {
    pub fn new(window: Arc<Window>, screen: ScreenSize) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), screen, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            screen,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.screen, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        screen: ScreenSize,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(screen.width, screen.height, surface)
    }

    pub fn render_session(&mut self, session: &Session) -> Result<(), Error> {
        draw_session(self.pixels.frame_mut(), self.screen, session);
        self.pixels.render()
    }
}

pub(crate) fn draw_session(frame: &mut [u8], screen: ScreenSize, session: &Session) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&CLEAR_COLOR);
    }

    let grid = session.grid();
    let camera = session.camera();
    let tile_size = grid.tile_size() as i32;
    if let Some(span) =
        visible_tile_span(camera, screen, grid.tile_size(), grid.width(), grid.height())
    {
        for layer in grid.layers() {
            for y in span.y_min..=span.y_max {
                for x in span.x_min..=span.x_max {
                    let coord = TileCoord::new(x, y);
                    let Some(gid) = grid.tile_index(layer, coord) else {
                        continue;
                    };
                    let color = match grid.tile(gid) {
                        Some(tile) if tile.is_passable() => PASSABLE_TILE_COLOR,
                        Some(_) => SOLID_TILE_COLOR,
                        None => UNKNOWN_TILE_COLOR,
                    };
                    let rect = grid.tile_rect(coord);
                    let (left, top) = world_to_screen_px(Vec2::new(rect.left, rect.top), camera);
                    fill_rect(frame, screen, left, top, tile_size, tile_size, color);
                }
            }
        }
    }

    let sprite = session.sprite();
    let size = session.config().physics.sprite_size.round() as i32;
    let (left, top) = world_to_screen_px(sprite.position, camera);
    fill_rect(frame, screen, left, top, size, size, SPRITE_COLOR);
    let eye = (size / 4).max(1);
    let eye_x = if sprite.is_left() {
        left + eye
    } else {
        left + size - 2 * eye
    };
    fill_rect(frame, screen, eye_x, top + eye, eye, eye, SPRITE_FACING_COLOR);
}

/// Fills a rectangle clipped to the frame.
fn fill_rect(
    frame: &mut [u8],
    screen: ScreenSize,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    color: [u8; 4],
) {
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = left.saturating_add(width).min(screen.width as i32);
    let y1 = top.saturating_add(height).min(screen.height as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            write_pixel_rgba_clipped(frame, screen.width as usize, x, y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_support::level_with_pit;
    use crate::world::SessionConfig;

    const SMALL: ScreenSize = ScreenSize {
        width: 4,
        height: 3,
    };

    fn pixel(frame: &[u8], screen: ScreenSize, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * screen.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = vec![0u8; 4 * 3 * 4];
        fill_rect(&mut frame, SMALL, -2, 1, 4, 5, SPRITE_COLOR);
        assert_eq!(pixel(&frame, SMALL, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, SMALL, 1, 1), SPRITE_COLOR);
        assert_eq!(pixel(&frame, SMALL, 1, 2), SPRITE_COLOR);
        assert_eq!(pixel(&frame, SMALL, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_outside_frame_is_ignored() {
        let mut frame = vec![0u8; 4 * 3 * 4];
        fill_rect(&mut frame, SMALL, 10, 10, 4, 4, SPRITE_COLOR);
        fill_rect(&mut frame, SMALL, -10, -10, 4, 4, SPRITE_COLOR);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn session_frame_shows_sky_floor_and_sprite() {
        let session = Session::new(level_with_pit(), SessionConfig::default()).expect("session");
        let screen = session.config().screen;
        let mut frame = vec![0u8; screen.width as usize * screen.height as usize * 4];
        draw_session(&mut frame, screen, &session);

        assert_eq!(pixel(&frame, screen, 100, 10), CLEAR_COLOR);
        assert_eq!(pixel(&frame, screen, 20, 130), SOLID_TILE_COLOR);
        assert_eq!(pixel(&frame, screen, 170, 130), CLEAR_COLOR);
        assert_eq!(pixel(&frame, screen, 18, 126), SPRITE_COLOR);
    }
}
