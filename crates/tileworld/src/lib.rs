use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod config;
pub mod editor;
pub mod entities;
mod error;
pub mod geometry;
pub mod grid;
pub mod level;
pub mod physics;
pub mod player;
pub mod progression;
pub mod tile_index;

pub use app::{
    palette, run_app, AppError, Color, DrawCommand, DrawList, InputAction, InputSnapshot, KeyEdge,
    LoopConfig, LoopRates, Scene, SceneCommand,
};
pub use config::{ConfigError, PlayerTuning, WorldConfig, CONFIG_FILE_NAME};
pub use editor::{EditorSession, PaintAction, PaintTool, PressLatch};
pub use entities::EntityPool;
pub use error::LevelError;
pub use geometry::{Rect, Vec2};
pub use grid::{CellCode, GridDocument};
pub use level::{
    CodecError, LevelId, LevelSource, LevelStore, DEFAULT_LEVEL_NAME, LEVEL_FILE_EXTENSION,
};
pub use physics::{PhysicsOutcome, PlayerInput, ScreenBounds};
pub use player::{Facing, Player, PlayerState};
pub use progression::{ActiveLevel, GameEvent, GamePhase, LevelController};
pub use tile_index::{SolidKind, SpawnDescriptor, SpawnKind, TileIndex};

pub const ROOT_ENV_VAR: &str = "TILEWORLD_ROOT";
pub const LEVELS_DIR_NAME: &str = "lvl";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub levels_dir: PathBuf,
    pub config_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create level directory at {path}: {source}")]
    CreateLevelsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "TILEWORLD_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or lvl/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or lvl/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/tileworld\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = app_paths_for_root(root);

    fs::create_dir_all(&paths.levels_dir).map_err(|source| StartupError::CreateLevelsDir {
        path: paths.levels_dir.clone(),
        source,
    })?;

    Ok(paths)
}

fn app_paths_for_root(root: PathBuf) -> AppPaths {
    AppPaths {
        levels_dir: root.join(LEVELS_DIR_NAME),
        config_file: root.join(CONFIG_FILE_NAME),
        root,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_levels = path.join(LEVELS_DIR_NAME).is_dir();

    cargo_toml && (has_crates || has_levels)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let temp = TempDir::new().expect("temp");
        fs::create_dir(temp.path().join(LEVELS_DIR_NAME)).expect("lvl dir");
        assert!(!is_repo_marker(temp.path()));

        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn app_paths_hang_off_the_root() {
        let paths = app_paths_for_root(PathBuf::from("/games/tileworld"));

        assert_eq!(paths.levels_dir, PathBuf::from("/games/tileworld/lvl"));
        assert_eq!(
            paths.config_file,
            PathBuf::from("/games/tileworld/tileworld.json")
        );
    }
}
