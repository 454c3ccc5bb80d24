use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tilejump_engine::{InputPolicy, LoopConfig, SessionConfig};
use tracing::{info, warn};

pub(crate) const LEVEL_ENV_VAR: &str = "TILEJUMP_LEVEL";
pub(crate) const INPUT_POLICY_ENV_VAR: &str = "TILEJUMP_INPUT_POLICY";

const DEFAULT_LEVEL: &str = "world1.tmj";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowSettings {
    pub(crate) title: String,
    pub(crate) scale: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        let defaults = LoopConfig::default();
        Self {
            title: defaults.window_title,
            scale: defaults.window_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoopSettings {
    pub(crate) target_tps: u32,
    pub(crate) max_frame_delta_ms: u64,
    pub(crate) max_ticks_per_frame: u32,
    pub(crate) metrics_log_interval_ms: u64,
}

impl Default for LoopSettings {
    fn default() -> Self {
        let defaults = LoopConfig::default();
        Self {
            target_tps: defaults.target_tps,
            max_frame_delta_ms: defaults.max_frame_delta.as_millis() as u64,
            max_ticks_per_frame: defaults.max_ticks_per_frame,
            metrics_log_interval_ms: defaults.metrics_log_interval.as_millis() as u64,
        }
    }
}

/// Contents of `assets/settings.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    /// Level file, relative to `assets/levels/` unless absolute.
    pub(crate) level: String,
    pub(crate) window: WindowSettings,
    #[serde(rename = "loop")]
    pub(crate) loop_timing: LoopSettings,
    pub(crate) session: SessionConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            window: WindowSettings::default(),
            loop_timing: LoopSettings::default(),
            session: SessionConfig::default(),
        }
    }
}

impl GameSettings {
    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window.title.clone(),
            window_scale: self.window.scale,
            target_tps: self.loop_timing.target_tps,
            max_frame_delta: Duration::from_millis(self.loop_timing.max_frame_delta_ms),
            max_ticks_per_frame: self.loop_timing.max_ticks_per_frame,
            metrics_log_interval: Duration::from_millis(self.loop_timing.metrics_log_interval_ms),
        }
    }

    pub(crate) fn level_path(&self, levels_dir: &Path) -> PathBuf {
        let level = Path::new(&self.level);
        if level.is_absolute() {
            level.to_path_buf()
        } else {
            levels_dir.join(level)
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path} at '{field}': {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads settings from `path`; a missing file yields defaults.
pub(crate) fn load_settings(path: &Path) -> Result<GameSettings, SettingsError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "settings_file_missing");
            return Ok(GameSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
    let settings: GameSettings =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            SettingsError::Parse {
                path: path.to_path_buf(),
                field: error.path().to_string(),
                source: error.into_inner(),
            }
        })?;
    info!(path = %path.display(), level = settings.level.as_str(), "settings_loaded");
    Ok(settings)
}

pub(crate) fn apply_env_overrides(settings: &mut GameSettings) {
    apply_overrides_from(settings, |var| env::var(var));
}

fn apply_overrides_from(
    settings: &mut GameSettings,
    lookup: impl Fn(&'static str) -> Result<String, env::VarError>,
) {
    if let Some(level) = read_override(&lookup, LEVEL_ENV_VAR) {
        let level = level.trim();
        if level.is_empty() {
            warn!(
                env_var = LEVEL_ENV_VAR,
                "empty level env var value; falling back to settings"
            );
        } else {
            settings.level = level.to_string();
        }
    }

    if let Some(raw) = read_override(&lookup, INPUT_POLICY_ENV_VAR) {
        match raw.parse::<InputPolicy>() {
            Ok(policy) => settings.session.input_policy = policy,
            Err(error) => warn!(
                env_var = INPUT_POLICY_ENV_VAR,
                value = raw.as_str(),
                error = %error,
                "invalid input policy env var value; falling back to settings"
            ),
        }
    }
}

fn read_override(
    lookup: &impl Fn(&'static str) -> Result<String, env::VarError>,
    var: &'static str,
) -> Option<String> {
    match lookup(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(error) => {
            warn!(
                env_var = var,
                error = %error,
                "unable to read env var; falling back to settings"
            );
            None
        }
    }
}
