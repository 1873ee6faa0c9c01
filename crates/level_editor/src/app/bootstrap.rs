use thiserror::Error;
use tileworld::{
    resolve_app_paths, ConfigError, LevelError, LevelId, LevelStore, LoopConfig, Scene,
    StartupError, WorldConfig, LEVEL_FILE_EXTENSION,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::editor_scene::{EditorLayout, EditorScene};

const WINDOW_TITLE: &str = "Level Editor";
const GAME_BINARY: &str = "platformer";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("configured default level is invalid: {0}")]
    DefaultLevel(#[source] LevelError),
}

pub(crate) fn build_app(requested_level: Option<&str>) -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Level Editor Startup ===");

    let paths = resolve_app_paths()?;
    let world = WorldConfig::load_or_default(&paths.config_file)?;
    let default_id =
        LevelId::named(world.default_level.as_str()).map_err(BootstrapError::DefaultLevel)?;
    let initial_id = resolve_requested_level(requested_level, &default_id);
    info!(
        levels_dir = %paths.levels_dir.display(),
        level = %initial_id,
        "editor_paths_resolved"
    );

    let store = LevelStore::new(paths.levels_dir.clone());
    let layout = EditorLayout::from_world(&world);
    let config = loop_config_for(&world, &layout);

    Ok(AppWiring {
        config,
        scene: Box::new(EditorScene::new(store, default_id, initial_id, layout)),
    })
}

/// Level named on the command line, with or without the file extension.
/// Anything unusable falls back to the default level.
fn resolve_requested_level(requested: Option<&str>, default_id: &LevelId) -> LevelId {
    let Some(raw) = requested else {
        return default_id.clone();
    };
    let stem = raw
        .strip_suffix(LEVEL_FILE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(raw);
    match LevelId::named(stem) {
        Ok(id) => id,
        Err(error) => {
            warn!(requested = raw, error = %error, "editor_level_argument_ignored");
            default_id.clone()
        }
    }
}

fn loop_config_for(world: &WorldConfig, layout: &EditorLayout) -> LoopConfig {
    LoopConfig {
        window_title: WINDOW_TITLE.to_string(),
        window_width: layout.window_width(),
        window_height: layout.height,
        target_tps: world.target_tps,
        companion_binary: Some(GAME_BINARY.to_string()),
        ..LoopConfig::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_id() -> LevelId {
        LevelId::named("world_data0").expect("default id")
    }

    #[test]
    fn missing_argument_opens_default_level() {
        assert_eq!(resolve_requested_level(None, &default_id()), default_id());
    }

    #[test]
    fn argument_accepts_optional_extension() {
        let with_ext = resolve_requested_level(Some("world_data3.lvl"), &default_id());
        let bare = resolve_requested_level(Some("world_data3"), &default_id());

        assert_eq!(with_ext, LevelId::numbered(3));
        assert_eq!(bare, LevelId::numbered(3));
    }

    #[test]
    fn invalid_argument_falls_back_to_default() {
        assert_eq!(
            resolve_requested_level(Some("../escape"), &default_id()),
            default_id()
        );
        assert_eq!(resolve_requested_level(Some(""), &default_id()), default_id());
    }

    #[test]
    fn window_includes_side_panel() {
        let world = WorldConfig::default();
        let layout = EditorLayout::from_world(&world);

        let config = loop_config_for(&world, &layout);

        assert_eq!(config.window_width, 840);
        assert_eq!(config.window_height, 700);
        assert_eq!(config.companion_binary.as_deref(), Some("platformer"));
    }
}
