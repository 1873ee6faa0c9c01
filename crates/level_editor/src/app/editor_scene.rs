use tileworld::{
    palette, CellCode, DrawList, EditorSession, InputSnapshot, KeyEdge, LevelError, LevelId,
    LevelStore, Rect, Scene, SceneCommand, Vec2, WorldConfig,
};
use tracing::{error, info, warn};

const WINDOW_TITLE: &str = "Level Editor";
const GRID_LINE_WIDTH: f32 = 1.0;
const DIRTY_SWATCH_SIZE: f32 = 20.0;

/// Grid area on the left, button panel on the right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EditorLayout {
    pub(crate) grid_width: u32,
    pub(crate) panel_width: u32,
    pub(crate) height: u32,
    pub(crate) tile_size: f32,
}

impl EditorLayout {
    pub(crate) fn from_world(world: &WorldConfig) -> Self {
        Self {
            grid_width: world.display_width,
            panel_width: world.editor_panel_width,
            height: world.display_height,
            tile_size: world.tile_size_px(),
        }
    }

    pub(crate) fn window_width(&self) -> u32 {
        self.grid_width + self.panel_width
    }

    fn panel_rect(&self) -> Rect {
        Rect::new(
            self.grid_width as f32,
            0.0,
            self.panel_width as f32,
            self.height as f32,
        )
    }

    /// Cursor positions over the panel never reach the paint tool.
    fn grid_cursor(&self, cursor: Option<Vec2>) -> Option<Vec2> {
        cursor.filter(|point| point.x < self.grid_width as f32)
    }
}

pub(crate) struct EditorScene {
    store: LevelStore,
    default_id: LevelId,
    initial_id: LevelId,
    layout: EditorLayout,
    session: Option<EditorSession>,
    status: Option<String>,
}

impl EditorScene {
    pub(crate) fn new(
        store: LevelStore,
        default_id: LevelId,
        initial_id: LevelId,
        layout: EditorLayout,
    ) -> Self {
        Self {
            store,
            default_id,
            initial_id,
            layout,
            session: None,
            status: None,
        }
    }

    fn handle_keys(&mut self, input: &InputSnapshot) -> Result<(), LevelError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if input.pressed(KeyEdge::Save) {
            session.save()?;
            info!(level = %session.current(), "editor_level_saved");
            self.status = Some(format!("saved {}", session.current()));
        }
        if input.pressed(KeyEdge::Load) {
            session.reload()?;
            self.status = Some(format!("loaded {}", session.current()));
        }
        if input.pressed(KeyEdge::NextLevel) {
            session.step_level(1)?;
            self.status = None;
        }
        if input.pressed(KeyEdge::PreviousLevel) {
            session.step_level(-1)?;
            self.status = None;
        }
        Ok(())
    }

    fn handle_pointer(&mut self, input: &InputSnapshot) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let cursor = self.layout.grid_cursor(input.cursor_position_px());
        if let Err(error) =
            session.apply_pointer(cursor, input.left_mouse_down(), input.right_mouse_down())
        {
            warn!(level = %session.current(), error = %error, "editor_paint_failed");
        }
    }

    fn draw_cells(&self, session: &EditorSession, draw_list: &mut DrawList) {
        let document = session.document();
        let tile_size = self.layout.tile_size;
        for row in 0..document.rows() {
            for col in 0..document.cols() {
                let Ok(code) = document.get_cell(row, col) else {
                    continue;
                };
                let Some(color) = CellCode::from_code(code).and_then(palette::cell_color) else {
                    continue;
                };
                draw_list.fill(
                    Rect::new(
                        col as f32 * tile_size,
                        row as f32 * tile_size,
                        tile_size,
                        tile_size,
                    ),
                    color,
                );
            }
        }
        if let Some(exit) = session.preview().exit() {
            draw_list.outline(exit.rect, palette::GRID_LINE);
        }
    }

    fn draw_grid_lines(&self, draw_list: &mut DrawList) {
        let tile_size = self.layout.tile_size;
        let width = self.layout.grid_width as f32;
        let height = self.layout.height as f32;
        let cols = (width / tile_size) as usize;
        let rows = (height / tile_size) as usize;
        for col in 0..=cols {
            let x = col as f32 * tile_size;
            draw_list.fill(Rect::new(x, 0.0, GRID_LINE_WIDTH, height), palette::GRID_LINE);
        }
        for row in 0..=rows {
            let y = row as f32 * tile_size;
            draw_list.fill(Rect::new(0.0, y, width, GRID_LINE_WIDTH), palette::GRID_LINE);
        }
    }

    fn draw_panel(&self, session: &EditorSession, draw_list: &mut DrawList) {
        let panel = self.layout.panel_rect();
        draw_list.fill(panel, palette::PANEL);
        if session.is_dirty() {
            let inset = (panel.width - DIRTY_SWATCH_SIZE) / 2.0;
            draw_list.fill(
                Rect::new(
                    panel.x + inset,
                    inset,
                    DIRTY_SWATCH_SIZE,
                    DIRTY_SWATCH_SIZE,
                ),
                palette::BANNER,
            );
        }
    }
}

impl Scene for EditorScene {
    fn load(&mut self) -> Result<(), LevelError> {
        let session = EditorSession::open(
            self.store.clone(),
            self.default_id.clone(),
            self.initial_id.clone(),
            self.layout.tile_size,
        )?;
        self.session = Some(session);
        info!(level = %self.initial_id, "editor_scene_loaded");
        Ok(())
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.pressed(KeyEdge::OpenGame) {
            info!("game_requested");
            return SceneCommand::LaunchCompanion;
        }
        if input.pressed(KeyEdge::Back) {
            return SceneCommand::Quit;
        }
        if let Err(error) = self.handle_keys(input) {
            error!(error = %error, "editor_command_failed");
            self.status = Some(error.to_string());
        }
        self.handle_pointer(input);
        SceneCommand::None
    }

    fn render(&self, draw_list: &mut DrawList) {
        draw_list.clear(palette::SKY);
        let Some(session) = self.session.as_ref() else {
            return;
        };
        self.draw_cells(session, draw_list);
        self.draw_grid_lines(draw_list);
        self.draw_panel(session, draw_list);
    }

    fn unload(&mut self) {
        if let Some(session) = self.session.as_ref() {
            if session.is_dirty() {
                warn!(level = %session.current(), "editor_closed_with_unsaved_changes");
            }
        }
    }

    fn debug_title(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let dirty = if session.is_dirty() { " *" } else { "" };
        let mut title = format!(
            "{WINDOW_TITLE} | {}{dirty} | F5 save  F9 load  PgUp/PgDn level  G game",
            session.current()
        );
        if let Some(status) = &self.status {
            title.push_str(" | ");
            title.push_str(status);
        }
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tileworld::{DrawCommand, GridDocument};

    use super::*;

    const TILE: f32 = 35.0;

    fn layout() -> EditorLayout {
        EditorLayout::from_world(&WorldConfig::default())
    }

    fn loaded_scene(temp: &TempDir) -> EditorScene {
        let store = LevelStore::new(temp.path());
        let default_id = LevelId::named("world_data0").expect("default id");
        store
            .save(&GridDocument::filled(20, 20, 0), &default_id)
            .expect("seed default");
        let mut scene = EditorScene::new(store, default_id, LevelId::numbered(1), layout());
        scene.load().expect("load");
        scene
    }

    fn cell_center(row: usize, col: usize) -> Vec2 {
        Vec2::new(
            col as f32 * TILE + TILE / 2.0,
            row as f32 * TILE + TILE / 2.0,
        )
    }

    fn click_at(scene: &mut EditorScene, at: Vec2) {
        let down = InputSnapshot::empty()
            .with_cursor_position_px(Some(at))
            .with_mouse_down(true, false);
        let up = InputSnapshot::empty().with_cursor_position_px(Some(at));
        scene.update(&down);
        scene.update(&up);
    }

    fn session(scene: &EditorScene) -> &EditorSession {
        scene.session.as_ref().expect("session")
    }

    #[test]
    fn load_creates_missing_level_from_default() {
        let temp = TempDir::new().expect("temp");
        let scene = loaded_scene(&temp);

        assert!(temp.path().join("world_data1.lvl").is_file());
        assert_eq!(session(&scene).current(), &LevelId::numbered(1));
    }

    #[test]
    fn load_fails_without_default_level() {
        let temp = TempDir::new().expect("temp");
        let store = LevelStore::new(temp.path());
        let default_id = LevelId::named("world_data0").expect("default id");
        let mut scene = EditorScene::new(store, default_id, LevelId::numbered(1), layout());

        let error = scene.load().expect_err("missing default");

        assert!(error.is_not_found());
    }

    #[test]
    fn click_cycles_cell_and_save_persists() {
        let temp = TempDir::new().expect("temp");
        let mut scene = loaded_scene(&temp);

        click_at(&mut scene, cell_center(19, 3));
        assert!(session(&scene).is_dirty());
        assert!(scene.debug_title().expect("title").contains(" *"));

        scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::Save));

        assert!(!session(&scene).is_dirty());
        let saved = LevelStore::new(temp.path())
            .load(&LevelId::numbered(1))
            .expect("saved level");
        assert_eq!(saved.get_cell(19, 3).expect("cell"), 1);
        assert!(scene
            .debug_title()
            .expect("title")
            .contains("saved world_data1"));
    }

    #[test]
    fn clicks_over_panel_are_ignored() {
        let temp = TempDir::new().expect("temp");
        let mut scene = loaded_scene(&temp);

        click_at(&mut scene, Vec2::new(760.0, 100.0));

        assert!(!session(&scene).is_dirty());
    }

    #[test]
    fn reload_discards_unsaved_edits() {
        let temp = TempDir::new().expect("temp");
        let mut scene = loaded_scene(&temp);
        click_at(&mut scene, cell_center(5, 5));

        scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::Load));

        assert!(!session(&scene).is_dirty());
        assert_eq!(session(&scene).document().get_cell(5, 5).expect("cell"), 0);
    }

    #[test]
    fn page_keys_step_through_numbered_levels() {
        let temp = TempDir::new().expect("temp");
        let mut scene = loaded_scene(&temp);

        scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::NextLevel));
        assert_eq!(session(&scene).current(), &LevelId::numbered(2));

        scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::PreviousLevel));
        scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::PreviousLevel));
        assert_eq!(session(&scene).current(), &LevelId::numbered(0));
    }

    #[test]
    fn navigation_keys_leave_the_editor() {
        let temp = TempDir::new().expect("temp");
        let mut scene = loaded_scene(&temp);

        assert_eq!(
            scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::OpenGame)),
            SceneCommand::LaunchCompanion
        );
        assert_eq!(
            scene.update(&InputSnapshot::empty().with_pressed(KeyEdge::Back)),
            SceneCommand::Quit
        );
    }

    #[test]
    fn render_draws_cells_grid_and_panel() {
        let temp = TempDir::new().expect("temp");
        let mut scene = loaded_scene(&temp);
        click_at(&mut scene, cell_center(0, 0));
        let mut draw_list = DrawList::default();

        scene.render(&mut draw_list);

        let commands = draw_list.commands();
        // One painted cell, 21 + 21 grid lines, the panel and the dirty swatch.
        assert_eq!(commands.len(), 1 + 42 + 2);
        assert!(matches!(
            commands.first(),
            Some(DrawCommand::Fill { rect, .. }) if rect.x == 0.0 && rect.width == TILE
        ));
        assert!(commands.iter().any(|command| matches!(
            command,
            DrawCommand::Fill { color, rect } if *color == palette::PANEL && rect.x == 700.0
        )));
    }
}
