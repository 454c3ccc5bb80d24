mod camera;
mod collision;
mod movement;
mod session;
mod sprite;
#[cfg(test)]
pub(crate) mod test_support;

use serde::Deserialize;

pub use camera::Camera2D;
pub use collision::{
    candidate_tiles, classify_contact, resolve_collisions, CandidatePlan, CandidateTiles,
    CollisionReport, Contact, Resolution, MAX_CANDIDATES,
};
pub use movement::{
    apply_intent, integrate, press_left, press_right, try_jump, MovementIntent, PhysicsConfig,
    PhysicsConfigError, SpawnPoint, DEFAULT_GRAVITY, DEFAULT_JUMP_SPEED, DEFAULT_MIN_JUMP_Y,
    DEFAULT_SPRITE_SIZE,
};
pub use session::{RespawnCause, Session, SessionConfig, SessionError, TickReport};
pub use sprite::{Facing, JumpState, Sprite};

/// Pixel-space vector, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Logical screen size in pixels; the camera view covers exactly this area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 320,
            height: 160,
        }
    }
}
