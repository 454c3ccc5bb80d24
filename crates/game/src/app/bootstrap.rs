use std::path::PathBuf;

use thiserror::Error;
use tilejump_engine::{
    load_level_file, resolve_app_paths, AppPaths, LevelLoadError, LoopConfig, Session,
    SessionError, StartupError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::settings::{apply_env_overrides, load_settings, GameSettings, SettingsError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to load level {path}: {source}")]
    Level {
        path: PathBuf,
        #[source]
        source: LevelLoadError,
    },
    #[error("failed to start session: {0}")]
    Session(#[from] SessionError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        settings_path = %paths.settings_path.display(),
        "startup"
    );

    let mut settings = load_settings(&paths.settings_path)?;
    apply_env_overrides(&mut settings);
    wire_session(&paths, &settings)
}

fn wire_session(paths: &AppPaths, settings: &GameSettings) -> Result<AppWiring, BootstrapError> {
    let level_path = settings.level_path(&paths.levels_dir);
    let grid = load_level_file(&level_path).map_err(|source| BootstrapError::Level {
        path: level_path.clone(),
        source,
    })?;
    let session = Session::new(grid, settings.session)?;
    let spawn = session.sprite().position;
    info!(
        level = %level_path.display(),
        spawn_x = spawn.x,
        spawn_y = spawn.y,
        input_policy = ?settings.session.input_policy,
        "session_ready"
    );

    Ok(AppWiring {
        config: settings.loop_config(),
        session,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
