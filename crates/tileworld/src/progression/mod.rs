use tracing::{debug, info, warn};

use crate::config::{PlayerTuning, WorldConfig};
use crate::entities::EntityPool;
use crate::error::LevelError;
use crate::grid::GridDocument;
use crate::level::{LevelId, LevelSource};
use crate::physics::{self, PlayerInput, ScreenBounds};
use crate::player::Player;
use crate::tile_index::TileIndex;


pub const FIRST_LEVEL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    MainMenu,
    Playing,
    Paused,
    /// Menu shown after the last level, with a completion banner.
    RunComplete,
    /// Menu shown after health ran out, with a failure banner.
    GameOver,
}

impl GamePhase {
    pub fn is_menu(self) -> bool {
        matches!(
            self,
            GamePhase::MainMenu | GamePhase::RunComplete | GamePhase::GameOver
        )
    }
}

/// Events surfaced to the presentation and audio layers, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Landed,
    CoinCollected,
    Died { health_left: i32 },
    LevelCompleted { level: u32 },
    RunCompleted { overall_coins: u32 },
    GameOver,
}

/// The world of one level attempt: document, derived index and live entities.
#[derive(Debug, Clone)]
pub struct ActiveLevel {
    id: LevelId,
    document: GridDocument,
    tile_index: TileIndex,
    entities: EntityPool,
}

impl ActiveLevel {
    pub fn build(id: LevelId, document: GridDocument, tile_size: f32) -> Self {
        let tile_index = TileIndex::build(&document, tile_size);
        let entities = EntityPool::from_spawns(tile_index.spawns(), tile_size);
        Self {
            id,
            document,
            tile_index,
            entities,
        }
    }

    pub fn id(&self) -> &LevelId {
        &self.id
    }

    pub fn document(&self) -> &GridDocument {
        &self.document
    }

    pub fn tile_index(&self) -> &TileIndex {
        &self.tile_index
    }

    pub fn entities(&self) -> &EntityPool {
        &self.entities
    }

    fn restore_collectibles(&mut self) {
        let tile_size = self.tile_index.tile_size();
        self.entities
            .rebuild_collectibles(self.tile_index.spawns(), tile_size);
    }
}

/// Owns the run: the active level, the player and the phase machine that
/// moves between menus, play, death and level transitions.
pub struct LevelController<S: LevelSource> {
    source: S,
    config: WorldConfig,
    bounds: ScreenBounds,
    max_levels: u32,
    phase: GamePhase,
    level_number: u32,
    active: Option<ActiveLevel>,
    player: Player,
    events: Vec<GameEvent>,
}

impl<S: LevelSource> LevelController<S> {
    /// `max_levels` is the last level number from which play still
    /// advances, one less than the final level's number. Completing any
    /// later level ends the run.
    pub fn new(source: S, config: WorldConfig, max_levels: u32) -> Self {
        let tuning = config.player_tuning();
        let bounds = ScreenBounds {
            width: config.display_width as f32,
            height: config.display_height as f32,
            tile_size: config.tile_size_px(),
        };
        let player = Player::new(Default::default(), tuning, config.start_health);
        Self {
            source,
            config,
            bounds,
            max_levels,
            phase: GamePhase::MainMenu,
            level_number: FIRST_LEVEL,
            active: None,
            player,
            events: Vec::new(),
        }
    }

    pub fn with_player_tuning(mut self, tuning: PlayerTuning) -> Self {
        self.player = Player::new(self.player.position(), tuning, self.config.start_health);
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    /// Last advancing level number; one less than the final level.
    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn active(&self) -> Option<&ActiveLevel> {
        self.active.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Menu -> `Playing`: full health, level one, empty run total. A
    /// missing first level leaves the controller in its menu phase.
    pub fn start_run(&mut self) -> Result<(), LevelError> {
        if !self.phase.is_menu() {
            warn!(phase = ?self.phase, "start_run_ignored_outside_menu");
            return Ok(());
        }
        let level = self.load_level(FIRST_LEVEL)?;
        self.player
            .reset_for_run(level.tile_index.start(), self.config.start_health);
        self.active = Some(level);
        self.level_number = FIRST_LEVEL;
        self.phase = GamePhase::Playing;
        self.events.clear();
        info!(
            level = self.level_number,
            health = self.player.health(),
            max_levels = self.max_levels,
            "run_started"
        );
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.phase = GamePhase::Paused,
            GamePhase::Paused => self.phase = GamePhase::Playing,
            _ => return,
        }
        debug!(phase = ?self.phase, "pause_toggled");
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            debug!("run_resumed");
        }
    }

    /// Leaves the run for the main menu; the current attempt counts as lost.
    pub fn abandon_to_menu(&mut self) {
        if self.phase.is_menu() {
            return;
        }
        self.player.mark_dead();
        self.phase = GamePhase::MainMenu;
        info!(level = self.level_number, "run_abandoned");
    }

    /// Kills the player; the death is resolved on the next tick.
    pub fn request_restart(&mut self) {
        if self.phase == GamePhase::Playing {
            self.player.mark_dead();
            debug!(level = self.level_number, "restart_requested");
        }
    }

    /// One simulation step. Only `Playing` advances the world. The exit is
    /// checked before death. An error means the next level could not be
    /// loaded; the finished level stays active and nothing else changes.
    pub fn tick(&mut self, input: &PlayerInput) -> Result<(), LevelError> {
        if self.phase != GamePhase::Playing {
            return Ok(());
        }
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        let outcome = physics::step(
            &mut self.player,
            *input,
            active.tile_index.tiles(),
            &mut active.entities,
            self.bounds,
        );
        active.entities.tick();

        if outcome.jumped {
            self.events.push(GameEvent::Jumped);
        }
        if outcome.landed {
            self.events.push(GameEvent::Landed);
        }
        for _ in 0..outcome.coins_collected {
            self.events.push(GameEvent::CoinCollected);
        }

        let reached_exit = active
            .tile_index
            .exit()
            .is_some_and(|exit| exit.rect.overlaps(&self.player.body()));
        if reached_exit {
            self.complete_level()?;
        }

        // A death on the exit tick is paid at the next level's start.
        if self.player.is_dead() && self.phase == GamePhase::Playing {
            self.resolve_death();
        }
        Ok(())
    }

    fn resolve_death(&mut self) {
        let health_left = self.player.lose_health();
        self.events.push(GameEvent::Died { health_left });
        if let Some(active) = self.active.as_mut() {
            self.player.respawn(active.tile_index.start());
            active.restore_collectibles();
        }
        info!(level = self.level_number, health_left, "player_died");

        if health_left <= 0 {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
            info!(
                level = self.level_number,
                overall_coins = self.player.overall_coins(),
                "game_over"
            );
        }
    }

    fn complete_level(&mut self) -> Result<(), LevelError> {
        let completed = self.level_number;
        if completed <= self.max_levels {
            let next = self.load_level(completed + 1)?;
            self.player.bank_coins();
            self.player.enter_level(next.tile_index.start());
            self.active = Some(next);
            self.level_number = completed + 1;
            self.events.push(GameEvent::LevelCompleted { level: completed });
            info!(
                completed,
                next = self.level_number,
                overall_coins = self.player.overall_coins(),
                "level_completed"
            );
        } else {
            self.player.bank_coins();
            let overall_coins = self.player.overall_coins();
            self.phase = GamePhase::RunComplete;
            self.events.push(GameEvent::LevelCompleted { level: completed });
            self.events.push(GameEvent::RunCompleted { overall_coins });
            info!(completed, overall_coins, "run_completed");
        }
        Ok(())
    }

    fn load_level(&self, number: u32) -> Result<ActiveLevel, LevelError> {
        let id = LevelId::numbered(number);
        let document = self.source.load_level(&id)?;
        let level = ActiveLevel::build(id, document, self.bounds.tile_size);
        info!(
            level = %level.id,
            rows = level.document.rows(),
            cols = level.document.cols(),
            static_tiles = level.tile_index.tiles().len(),
            enemies = level.entities.enemies().len(),
            collectibles = level.entities.collectibles().len(),
            "level_loaded"
        );
        Ok(level)
    }
}
