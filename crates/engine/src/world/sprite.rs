use super::movement::SpawnPoint;
use super::Vec2;

/// How many jump impulses are spent. Landing on a solid tile resets to
/// `Grounded`; the cap allows one double jump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JumpState {
    #[default]
    Grounded,
    Airborne,
    AtJumpCap,
}

impl JumpState {
    pub const fn ordinal(self) -> u8 {
        match self {
            JumpState::Grounded => 0,
            JumpState::Airborne => 1,
            JumpState::AtJumpCap => 2,
        }
    }

    pub const fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(JumpState::Grounded),
            1 => Some(JumpState::Airborne),
            2 => Some(JumpState::AtJumpCap),
            _ => None,
        }
    }

    pub fn can_jump(self) -> bool {
        self != JumpState::AtJumpCap
    }

    pub(crate) fn after_jump(self) -> Self {
        match self {
            JumpState::Grounded => JumpState::Airborne,
            JumpState::Airborne | JumpState::AtJumpCap => JumpState::AtJumpCap,
        }
    }

    /// Horizontal target steps double once the jump cap is reached.
    pub fn speed_multiplier(self) -> f32 {
        if self.ordinal() > 1 {
            2.0
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Kinematic state of the player sprite.
///
/// `position` is the top-left corner of the sprite box. `target_x` is where
/// horizontal movement is heading; the integrator walks `position.x` toward
/// it in fixed steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    pub target_x: f32,
    pub jump_state: JumpState,
    pub facing: Facing,
}

impl Sprite {
    pub fn at_spawn(spawn: SpawnPoint) -> Self {
        Self {
            position: Vec2::new(spawn.x, spawn.y),
            target_x: spawn.target_x,
            jump_state: JumpState::Grounded,
            facing: Facing::Right,
        }
    }

    pub fn is_left(&self) -> bool {
        self.facing == Facing::Left
    }
}
