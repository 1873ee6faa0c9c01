use thiserror::Error;
use tileworld::{
    resolve_app_paths, ConfigError, LevelController, LevelError, LevelStore, LoopConfig, Scene,
    StartupError, WorldConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::game_scene::GameScene;

const WINDOW_TITLE: &str = "Platformer";
const EDITOR_BINARY: &str = "level_editor";

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
    #[error("failed to discover levels: {0}")]
    Levels(#[source] LevelError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let paths = resolve_app_paths()?;
    let world = WorldConfig::load_or_default(&paths.config_file)?;
    let store = LevelStore::new(paths.levels_dir.clone());
    let max_levels = match world.max_levels {
        Some(max_levels) => max_levels,
        None => store
            .discover_max_levels()
            .map_err(BootstrapError::Levels)?,
    };
    info!(
        root = %paths.root.display(),
        levels_dir = %paths.levels_dir.display(),
        max_levels,
        "game_paths_resolved"
    );

    let config = loop_config_for(&world);
    let (display_width, display_height) = (world.display_width, world.display_height);
    let controller = LevelController::new(store, world, max_levels);

    Ok(AppWiring {
        config,
        scene: Box::new(GameScene::new(controller, display_width, display_height)),
    })
}

fn loop_config_for(world: &WorldConfig) -> LoopConfig {
    LoopConfig {
        window_title: WINDOW_TITLE.to_string(),
        window_width: world.display_width,
        window_height: world.display_height,
        target_tps: world.target_tps,
        companion_binary: Some(EDITOR_BINARY.to_string()),
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
