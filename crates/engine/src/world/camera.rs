use super::{ScreenSize, Vec2};

/// Top-left corner of the visible screen area in map pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

impl Camera2D {
    /// Keeps the target a quarter screen from the left edge and vertically
    /// centred.
    pub fn follow_target(&mut self, target: Vec2, screen: ScreenSize) {
        self.position.x = target.x - screen.width as f32 / 4.0;
        self.position.y = target.y - screen.height as f32 / 2.0;
    }

    /// Clamps the view inside the map. On a map smaller than the screen the
    /// upper bound wins, so the origin may go negative.
    pub fn constrain(&mut self, map_width: f32, map_height: f32, screen: ScreenSize) {
        self.position.x = self
            .position
            .x
            .max(0.0)
            .min(map_width - screen.width as f32);
        self.position.y = self
            .position
            .y
            .max(0.0)
            .min(map_height - screen.height as f32);
    }
}
