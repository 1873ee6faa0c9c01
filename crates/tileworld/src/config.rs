use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::level::DEFAULT_LEVEL_NAME;

pub const CONFIG_FILE_NAME: &str = "tileworld.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path} at {at}: {message}")]
    Parse {
        path: PathBuf,
        at: String,
        message: String,
    },
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Screen and level layout shared by the game and the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub display_width: u32,
    pub display_height: u32,
    pub tile_size: u32,
    pub target_tps: u32,
    pub editor_panel_width: u32,
    pub default_level: String,
    pub start_health: i32,
    /// Last level number that still advances to a next level, i.e. the
    /// highest numbered level minus one. Completing any later level ends
    /// the run. Overrides discovery from the level directory.
    pub max_levels: Option<u32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            display_width: 700,
            display_height: 700,
            tile_size: 35,
            target_tps: 60,
            editor_panel_width: 140,
            default_level: DEFAULT_LEVEL_NAME.to_string(),
            start_health: 5,
            max_levels: None,
        }
    }
}

impl WorldConfig {
    /// Reads `path` when it exists; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config_missing_using_defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::parse_json(&raw, path)?;
        config.validate()?;
        info!(path = %path.display(), "config_loaded");
        Ok(config)
    }

    fn parse_json(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, WorldConfig>(&mut deserializer).map_err(|error| {
            let at = error.path().to_string();
            let source = error.into_inner();
            ConfigError::Parse {
                path: path.to_path_buf(),
                at: if at.is_empty() { ".".to_string() } else { at },
                message: source.to_string(),
            }
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(invalid("tile_size", "must be greater than zero"));
        }
        if self.display_width < self.tile_size || self.display_height < self.tile_size {
            return Err(invalid(
                "display_width/display_height",
                format!("display must fit at least one {}px tile", self.tile_size),
            ));
        }
        if self.target_tps == 0 {
            return Err(invalid("target_tps", "must be greater than zero"));
        }
        if self.start_health <= 0 {
            return Err(invalid("start_health", "must be positive"));
        }
        if self.default_level.trim().is_empty() {
            return Err(invalid("default_level", "must not be empty"));
        }
        Ok(())
    }

    pub fn tile_size_px(&self) -> f32 {
        self.tile_size as f32
    }

    /// Grid dimensions of a blank level covering the whole display.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        let rows = (self.display_height / self.tile_size) as usize;
        let cols = (self.display_width / self.tile_size) as usize;
        (rows, cols)
    }

    pub fn player_tuning(&self) -> PlayerTuning {
        PlayerTuning::for_display_width(self.display_width)
    }
}

/// Player body size and motion constants, all in pixels per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
}

impl PlayerTuning {
    pub fn for_display_width(display_width: u32) -> Self {
        let speed = display_width as f32 * 0.006;
        let jump_velocity = -speed * 2.6;
        Self {
            width: (display_width / 25) as f32,
            height: (display_width / 12) as f32,
            speed,
            jump_velocity,
            gravity: (jump_velocity * 0.06).abs(),
            max_fall_speed: (jump_velocity * 1.2).abs(),
        }
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}
