use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Quit,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Quit => 3,
        }
    }
}

/// Whether an action fires once per key-down edge or on every held tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum InputPolicy {
    #[default]
    #[serde(rename = "edge")]
    EdgeTriggered,
    #[serde(rename = "level")]
    LevelTriggered,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown input policy '{0}', expected 'edge' or 'level'")]
pub struct ParseInputPolicyError(String);

impl FromStr for InputPolicy {
    type Err = ParseInputPolicyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "edge" | "edge_triggered" => Ok(InputPolicy::EdgeTriggered),
            "level" | "level_triggered" => Ok(InputPolicy::LevelTriggered),
            _ => Err(ParseInputPolicyError(raw.to_string())),
        }
    }
}

/// Input for one fixed tick: held keys plus key-down edges since the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    held: ActionStates,
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, held: ActionStates, pressed: ActionStates) -> Self {
        Self {
            quit_requested,
            held,
            pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn is_triggered(&self, action: InputAction, policy: InputPolicy) -> bool {
        match policy {
            InputPolicy::EdgeTriggered => self.was_pressed(action),
            InputPolicy::LevelTriggered => self.is_down(action),
        }
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    /// Records a key-down edge; a pressed key also counts as held.
    pub fn with_action_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.pressed.set(action, pressed);
        if pressed {
            self.held.set(action, true);
        }
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_selects_edges_or_held_state() {
        let held = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        assert!(!held.is_triggered(InputAction::MoveLeft, InputPolicy::EdgeTriggered));
        assert!(held.is_triggered(InputAction::MoveLeft, InputPolicy::LevelTriggered));

        let pressed = InputSnapshot::empty().with_action_pressed(InputAction::Jump, true);
        assert!(pressed.is_triggered(InputAction::Jump, InputPolicy::EdgeTriggered));
        assert!(pressed.is_triggered(InputAction::Jump, InputPolicy::LevelTriggered));
        assert!(!pressed.is_down(InputAction::MoveRight));
    }

    #[test]
    fn policy_parses_from_env_style_strings() {
        assert_eq!("edge".parse(), Ok(InputPolicy::EdgeTriggered));
        assert_eq!(" LEVEL ".parse(), Ok(InputPolicy::LevelTriggered));
        assert_eq!(
            "level_triggered".parse::<InputPolicy>(),
            Ok(InputPolicy::LevelTriggered)
        );
        assert!("sticky".parse::<InputPolicy>().is_err());
    }

    #[test]
    fn policy_deserializes_from_short_names() {
        let policy: InputPolicy = serde_json::from_str("\"level\"").expect("policy");
        assert_eq!(policy, InputPolicy::LevelTriggered);
        assert!(serde_json::from_str::<InputPolicy>("\"held\"").is_err());
    }

    #[test]
    fn clear_releases_every_action() {
        let mut states = ActionStates::default();
        states.set(InputAction::Jump, true);
        states.set(InputAction::Quit, true);
        states.clear();
        assert!(!states.is_down(InputAction::Jump));
        assert!(!states.is_down(InputAction::Quit));
    }
}
