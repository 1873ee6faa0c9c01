use tileworld::tile_index::SolidKind;
use tileworld::{
    palette, CellCode, DrawList, GameEvent, GamePhase, InputAction, InputSnapshot, KeyEdge,
    LevelController, LevelError, LevelSource, PlayerInput, Rect, Scene, SceneCommand,
};
use tracing::{debug, error, info};

const WINDOW_TITLE: &str = "Platformer";
const PAUSE_FRAME_INSET: f32 = 4.0;

/// Sound handle played for a game event, if any.
fn cue_for(event: &GameEvent) -> Option<&'static str> {
    match event {
        GameEvent::Jumped => Some("jump.wav"),
        GameEvent::CoinCollected => Some("coin.wav"),
        GameEvent::Died { .. } => Some("game_over.wav"),
        GameEvent::LevelCompleted { .. } => Some("next_level.mp3"),
        GameEvent::Landed | GameEvent::RunCompleted { .. } | GameEvent::GameOver => None,
    }
}

/// Drives a run: menu keys, per-tick player input, HUD title and drawing.
pub(crate) struct GameScene<S: LevelSource> {
    controller: LevelController<S>,
    pause_frame: Rect,
    load_failure: Option<String>,
}

impl<S: LevelSource> GameScene<S> {
    pub(crate) fn new(
        controller: LevelController<S>,
        display_width: u32,
        display_height: u32,
    ) -> Self {
        let pause_frame = Rect::new(
            PAUSE_FRAME_INSET,
            PAUSE_FRAME_INSET,
            display_width as f32 - 2.0 * PAUSE_FRAME_INSET,
            display_height as f32 - 2.0 * PAUSE_FRAME_INSET,
        );
        Self {
            controller,
            pause_frame,
            load_failure: None,
        }
    }

    fn update_menu(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.pressed(KeyEdge::Confirm) {
            match self.controller.start_run() {
                Ok(()) => self.load_failure = None,
                Err(error) => {
                    error!(error = %error, "run_start_failed");
                    self.load_failure = Some(error.to_string());
                }
            }
            return SceneCommand::None;
        }
        if input.pressed(KeyEdge::OpenEditor) {
            info!("editor_requested");
            return SceneCommand::LaunchCompanion;
        }
        if input.pressed(KeyEdge::Back) {
            return SceneCommand::Quit;
        }
        SceneCommand::None
    }

    fn update_playing(&mut self, input: &InputSnapshot) {
        if input.pressed(KeyEdge::Back) {
            self.controller.toggle_pause();
            return;
        }
        if input.pressed(KeyEdge::Restart) {
            self.controller.request_restart();
        }
        let player_input = PlayerInput {
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
            jump: input.is_down(InputAction::Jump),
        };
        if let Err(error) = self.controller.tick(&player_input) {
            self.report_level_failure(&error);
            self.controller.abandon_to_menu();
        }
    }

    fn update_paused(&mut self, input: &InputSnapshot) {
        if input.pressed(KeyEdge::MainMenu) {
            self.controller.abandon_to_menu();
        } else if input.pressed(KeyEdge::Back) {
            self.controller.toggle_pause();
        } else if input.pressed(KeyEdge::Confirm) {
            self.controller.resume();
        }
    }

    fn report_level_failure(&mut self, error: &LevelError) {
        error!(
            level = self.controller.level_number(),
            error = %error,
            "level_advance_failed"
        );
        self.load_failure = Some(error.to_string());
    }

    fn play_event_cues(&mut self) {
        for event in self.controller.drain_events() {
            match cue_for(&event) {
                Some(cue) => info!(cue, event = ?event, "audio_cue"),
                None => debug!(event = ?event, "game_event"),
            }
        }
    }

    fn hud_title(&self) -> String {
        let player = self.controller.player();
        match self.controller.phase() {
            GamePhase::MainMenu => match &self.load_failure {
                Some(reason) => format!("{WINDOW_TITLE} | Level failed to load: {reason}"),
                None => format!("{WINDOW_TITLE} | Enter: start  E: editor  Esc: quit"),
            },
            GamePhase::RunComplete => format!(
                "{WINDOW_TITLE} | Run complete with {} coins | Enter: play again",
                player.overall_coins()
            ),
            GamePhase::GameOver => format!(
                "{WINDOW_TITLE} | Game over ({} coins) | Enter: try again",
                player.overall_coins()
            ),
            GamePhase::Playing => format!(
                "{WINDOW_TITLE} | Level {} | Health {} | Coins {} (total {})",
                self.controller.level_number(),
                player.health(),
                player.coins(),
                player.overall_coins()
            ),
            GamePhase::Paused => format!(
                "{WINDOW_TITLE} | Level {} | Paused | Esc/Enter: resume  M: menu",
                self.controller.level_number()
            ),
        }
    }

    fn draw_world(&self, draw_list: &mut DrawList) {
        let Some(active) = self.controller.active() else {
            return;
        };
        let tile_index = active.tile_index();
        for tile in tile_index.tiles() {
            let cell = match tile.kind {
                SolidKind::Dirt => CellCode::Dirt,
                SolidKind::Grass => CellCode::Grass,
            };
            fill_cell(draw_list, tile.rect, cell);
        }
        if let Some(exit) = tile_index.exit() {
            fill_cell(draw_list, exit.rect, CellCode::Exit);
        }

        let entities = active.entities();
        for hazard in entities.hazards() {
            fill_cell(draw_list, hazard.rect, CellCode::Lava);
        }
        for coin in entities.collectibles() {
            fill_cell(draw_list, coin.rect, CellCode::Coin);
        }
        for enemy in entities.enemies() {
            fill_cell(draw_list, enemy.rect, CellCode::Enemy);
        }

        draw_list.fill(self.controller.player().body(), palette::PLAYER);
    }
}

fn fill_cell(draw_list: &mut DrawList, rect: Rect, cell: CellCode) {
    if let Some(color) = palette::cell_color(cell) {
        draw_list.fill(rect, color);
    }
}

impl<S: LevelSource> Scene for GameScene<S> {
    fn load(&mut self) -> Result<(), LevelError> {
        info!(max_levels = self.controller.max_levels(), "game_scene_loaded");
        Ok(())
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        let command = match self.controller.phase() {
            phase if phase.is_menu() => self.update_menu(input),
            GamePhase::Playing => {
                self.update_playing(input);
                SceneCommand::None
            }
            GamePhase::Paused => {
                self.update_paused(input);
                SceneCommand::None
            }
            _ => SceneCommand::None,
        };
        self.play_event_cues();
        command
    }

    fn render(&self, draw_list: &mut DrawList) {
        match self.controller.phase() {
            GamePhase::Playing | GamePhase::Paused => {
                draw_list.clear(palette::SKY);
                self.draw_world(draw_list);
                if self.controller.phase() == GamePhase::Paused {
                    draw_list.outline(self.pause_frame, palette::BANNER);
                }
            }
            _ => draw_list.clear(palette::MENU_BACKDROP),
        }
    }

    fn unload(&mut self) {
        info!(
            level = self.controller.level_number(),
            overall_coins = self.controller.player().overall_coins(),
            "game_scene_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        Some(self.hud_title())
    }
}
