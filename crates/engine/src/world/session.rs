use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::camera::Camera2D;
use super::collision::{resolve_collisions, Resolution};
use super::movement::{apply_intent, integrate, MovementIntent, PhysicsConfig, PhysicsConfigError};
use super::sprite::{JumpState, Sprite};
use super::ScreenSize;
use crate::app::{InputPolicy, InputSnapshot};
use crate::level::TileGrid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub screen: ScreenSize,
    pub input_policy: InputPolicy,
    pub physics: PhysicsConfig,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid physics config: {0}")]
    Physics(#[from] PhysicsConfigError),
    #[error("screen size must be non-zero, got {width}x{height}")]
    ZeroScreen { width: u32, height: u32 },
    #[error("sprite size {sprite_size} exceeds the level's {tile_size} px tiles")]
    SpriteLargerThanTile { sprite_size: f32, tile_size: u32 },
    #[error("spawn point ({x}, {y}) must lie above the bottom row of the {width}x{height} px map")]
    SpawnOutsideMap {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnCause {
    /// Airborne below the last tile row.
    FellBelowMap,
    /// Collision reached the bottom row.
    BottomRow,
    /// Position left the map after collision.
    OutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub jump_before: JumpState,
    pub jump_after: JumpState,
    pub jumped: bool,
    pub resolution: Resolution,
    pub respawn: Option<RespawnCause>,
}

/// One running level: grid, player sprite and camera, advanced by [`Session::tick`].
#[derive(Debug, Clone)]
pub struct Session {
    grid: TileGrid,
    config: SessionConfig,
    sprite: Sprite,
    camera: Camera2D,
    tick: u64,
}

impl Session {
    pub fn new(grid: TileGrid, config: SessionConfig) -> Result<Self, SessionError> {
        config.physics.validate()?;
        let screen = config.screen;
        if screen.width == 0 || screen.height == 0 {
            return Err(SessionError::ZeroScreen {
                width: screen.width,
                height: screen.height,
            });
        }

        let tile_size = grid.tile_size();
        if config.physics.sprite_size > tile_size as f32 {
            return Err(SessionError::SpriteLargerThanTile {
                sprite_size: config.physics.sprite_size,
                tile_size,
            });
        }

        let spawn = config.physics.spawn;
        let fall_line = fall_line(&grid);
        let max_target_x = max_target_x(&grid);
        let spawn_ok = spawn.x >= 0.0
            && spawn.x < grid.pixel_width()
            && spawn.y >= 0.0
            && spawn.y < fall_line
            && spawn.target_x >= 0.0
            && spawn.target_x <= max_target_x;
        if !spawn_ok {
            return Err(SessionError::SpawnOutsideMap {
                x: spawn.x,
                y: spawn.y,
                width: grid.pixel_width(),
                height: grid.pixel_height(),
            });
        }

        let mut session = Self {
            grid,
            config,
            sprite: Sprite::at_spawn(spawn),
            camera: Camera2D::default(),
            tick: 0,
        };
        session.update_camera();
        Ok(session)
    }

    /// Advances one fixed step: movement, integration, fall-out check,
    /// collision, bounds check, camera.
    pub fn tick(&mut self, input: &InputSnapshot) -> TickReport {
        self.tick += 1;
        let physics = self.config.physics;
        let jump_before = self.sprite.jump_state;

        let intent = MovementIntent::from_input(input, self.config.input_policy);
        let jumped = apply_intent(
            &mut self.sprite,
            intent,
            &physics,
            max_target_x(&self.grid),
        );
        integrate(&mut self.sprite, &physics);

        let mut respawn = None;
        if self.sprite.jump_state != JumpState::Grounded
            && self.sprite.position.y >= fall_line(&self.grid)
        {
            respawn = Some(RespawnCause::FellBelowMap);
            self.respawn();
        }

        let collision = resolve_collisions(&mut self.sprite, &self.grid, physics.sprite_size);
        if collision.resolution == Resolution::FellOut {
            if respawn.is_none() {
                respawn = Some(RespawnCause::BottomRow);
            }
            self.respawn();
        }
        if respawn.is_none() && !self.sprite_in_bounds() {
            respawn = Some(RespawnCause::OutOfBounds);
            self.respawn();
        }

        self.update_camera();

        let jump_after = self.sprite.jump_state;
        if let Some(cause) = respawn {
            info!(tick = self.tick, cause = ?cause, "sprite_respawned");
        } else if jump_before != jump_after {
            debug!(
                tick = self.tick,
                from = jump_before.ordinal(),
                to = jump_after.ordinal(),
                y = self.sprite.position.y,
                "jump_state_changed"
            );
        }

        TickReport {
            tick: self.tick,
            jump_before,
            jump_after,
            jumped,
            resolution: collision.resolution,
            respawn,
        }
    }

    /// Puts the sprite back on the spawn point. Calling it twice is the same
    /// as calling it once.
    pub fn respawn(&mut self) {
        self.sprite = Sprite::at_spawn(self.config.physics.spawn);
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[cfg(test)]
    pub(crate) fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    fn sprite_in_bounds(&self) -> bool {
        let position = self.sprite.position;
        position.x >= 0.0
            && position.x < self.grid.pixel_width()
            && position.y >= 0.0
            && position.y < self.grid.pixel_height()
    }

    fn update_camera(&mut self) {
        let screen = self.config.screen;
        self.camera.follow_target(self.sprite.position, screen);
        self.camera
            .constrain(self.grid.pixel_width(), self.grid.pixel_height(), screen);
    }
}

fn fall_line(grid: &TileGrid) -> f32 {
    (grid.height() - 1) as f32 * grid.tile_size() as f32
}

fn max_target_x(grid: &TileGrid) -> f32 {
    (grid.width() - 1) as f32 * grid.tile_size() as f32
}
