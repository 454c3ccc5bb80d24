use serde::Deserialize;
use thiserror::Error;

use super::sprite::{Facing, Sprite};
use crate::app::{InputAction, InputPolicy, InputSnapshot};

pub const DEFAULT_GRAVITY: f32 = 0.5;
pub const DEFAULT_JUMP_SPEED: f32 = 8.0;
pub const DEFAULT_SPRITE_SIZE: f32 = 16.0;
pub const DEFAULT_MIN_JUMP_Y: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            x: 16.0,
            y: 112.0,
            target_x: 16.0,
        }
    }
}

/// Tunable movement constants, all in pixels or pixels per tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_speed: f32,
    pub sprite_size: f32,
    pub min_jump_y: f32,
    pub spawn: SpawnPoint,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            jump_speed: DEFAULT_JUMP_SPEED,
            sprite_size: DEFAULT_SPRITE_SIZE,
            min_jump_y: DEFAULT_MIN_JUMP_Y,
            spawn: SpawnPoint::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsConfigError {
    #[error("{field} must be finite and {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), PhysicsConfigError> {
        check("gravity", "non-negative", self.gravity, |v| v >= 0.0)?;
        check("jump_speed", "positive", self.jump_speed, |v| v > 0.0)?;
        check("sprite_size", "positive", self.sprite_size, |v| v > 0.0)?;
        check("min_jump_y", "non-negative", self.min_jump_y, |v| v >= 0.0)?;
        check("spawn.x", "finite", self.spawn.x, |_| true)?;
        check("spawn.y", "finite", self.spawn.y, |_| true)?;
        check("spawn.target_x", "finite", self.spawn.target_x, |_| true)?;
        Ok(())
    }
}

fn check(
    field: &'static str,
    requirement: &'static str,
    value: f32,
    accept: impl Fn(f32) -> bool,
) -> Result<(), PhysicsConfigError> {
    if value.is_finite() && accept(value) {
        Ok(())
    } else {
        Err(PhysicsConfigError::OutOfRange {
            field,
            requirement,
            value,
        })
    }
}

/// Which movement inputs act this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl MovementIntent {
    pub fn from_input(input: &InputSnapshot, policy: InputPolicy) -> Self {
        Self {
            left: input.is_triggered(InputAction::MoveLeft, policy),
            right: input.is_triggered(InputAction::MoveRight, policy),
            jump: input.is_triggered(InputAction::Jump, policy),
        }
    }
}

fn horizontal_step(sprite: &Sprite, physics: &PhysicsConfig) -> f32 {
    sprite.jump_state.speed_multiplier() * physics.jump_speed
}

/// Moves the horizontal target one step left. Returns `false` without
/// touching the sprite when the target already sits at the left edge.
pub fn press_left(sprite: &mut Sprite, physics: &PhysicsConfig) -> bool {
    if sprite.target_x <= 0.0 {
        return false;
    }
    sprite.target_x = (sprite.target_x - horizontal_step(sprite, physics)).max(0.0);
    sprite.facing = Facing::Left;
    true
}

/// Moves the horizontal target one step right, never past `max_target_x`.
pub fn press_right(sprite: &mut Sprite, physics: &PhysicsConfig, max_target_x: f32) -> bool {
    if sprite.target_x >= max_target_x {
        return false;
    }
    sprite.target_x = (sprite.target_x + horizontal_step(sprite, physics)).min(max_target_x);
    sprite.facing = Facing::Right;
    true
}

/// Applies a jump impulse if the jump cap is not reached and the sprite is
/// far enough below the map top.
pub fn try_jump(sprite: &mut Sprite, physics: &PhysicsConfig) -> bool {
    if !sprite.jump_state.can_jump() || sprite.position.y < physics.min_jump_y {
        return false;
    }
    sprite.position.y -= 2.0 * physics.jump_speed;
    sprite.jump_state = sprite.jump_state.after_jump();
    true
}

/// Applies left, right and jump in that order. Returns whether a jump fired.
pub fn apply_intent(
    sprite: &mut Sprite,
    intent: MovementIntent,
    physics: &PhysicsConfig,
    max_target_x: f32,
) -> bool {
    if intent.left {
        press_left(sprite, physics);
    }
    if intent.right {
        press_right(sprite, physics, max_target_x);
    }
    intent.jump && try_jump(sprite, physics)
}

/// One tick of motion: step x toward `target_x`, then fall if airborne.
pub fn integrate(sprite: &mut Sprite, physics: &PhysicsConfig) {
    let dx = sprite.target_x - sprite.position.x;
    if dx != 0.0 {
        sprite.position.x += physics.jump_speed.min(dx.abs()).copysign(dx);
    }
    if sprite.jump_state.ordinal() != 0 {
        sprite.position.y += physics.gravity;
    }
}
