use tracing::{debug, info, warn};

use crate::error::LevelError;
use crate::geometry::Vec2;
use crate::grid::{CellCode, GridDocument};
use crate::level::{LevelId, LevelStore};
use crate::tile_index::TileIndex;

/// Press/release latch for one button: reports a press once, on the first
/// sample where the button is down after having been up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressLatch {
    held: bool,
}

impl PressLatch {
    pub fn update(&mut self, down: bool) -> bool {
        let pressed = down && !self.held;
        self.held = down;
        pressed
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Next code in the primary-button paint cycle `0 1 2 3 6 7 8`.
pub fn next_code(code: i32) -> i32 {
    match code {
        0 => 1,
        1 => 2,
        2 => 3,
        3..=5 => 6,
        6 => 7,
        7 => 8,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintAction {
    Cycled { row: usize, col: usize, code: i32 },
    MarkedStart { row: usize, col: usize },
    MarkedExit { row: usize, col: usize },
}

/// Mouse-driven cell editing: primary cycles a cell, secondary toggles the
/// start/exit markers. Each button acts once per press.
#[derive(Debug, Clone, Copy)]
pub struct PaintTool {
    tile_size: f32,
    primary: PressLatch,
    secondary: PressLatch,
}

impl PaintTool {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            primary: PressLatch::default(),
            secondary: PressLatch::default(),
        }
    }

    pub fn cell_at(&self, doc: &GridDocument, cursor: Vec2) -> Option<(usize, usize)> {
        if cursor.x < 0.0 || cursor.y < 0.0 || self.tile_size <= 0.0 {
            return None;
        }
        let col = (cursor.x / self.tile_size) as usize;
        let row = (cursor.y / self.tile_size) as usize;
        (row < doc.rows() && col < doc.cols()).then_some((row, col))
    }

    /// Samples both buttons for this frame and applies at most one edit.
    /// Both latches advance even when the cursor is off the grid, so a
    /// press that starts outside never paints. Primary wins when both
    /// buttons go down on the same frame.
    pub fn apply(
        &mut self,
        doc: &mut GridDocument,
        cursor: Option<Vec2>,
        primary_down: bool,
        secondary_down: bool,
    ) -> Result<Option<PaintAction>, LevelError> {
        let primary_pressed = self.primary.update(primary_down);
        let secondary_pressed = self.secondary.update(secondary_down);
        let Some((row, col)) = cursor.and_then(|cursor| self.cell_at(doc, cursor)) else {
            return Ok(None);
        };

        if primary_pressed {
            let code = next_code(doc.get_cell(row, col)?);
            if code == CellCode::Exit.code() {
                doc.set_unique(row, col, code)?;
            } else {
                doc.set_cell(row, col, code)?;
            }
            return Ok(Some(PaintAction::Cycled { row, col, code }));
        }

        if secondary_pressed && row >= 1 {
            // Codes outside -1..=8 are left for the primary cycle to repair.
            return match doc.get_cell(row, col)? {
                -1 => {
                    doc.set_unique(row, col, CellCode::Exit.code())?;
                    Ok(Some(PaintAction::MarkedExit { row, col }))
                }
                0..=8 => {
                    doc.set_unique(row, col, CellCode::PlayerStart.code())?;
                    Ok(Some(PaintAction::MarkedStart { row, col }))
                }
                _ => Ok(None),
            };
        }

        Ok(None)
    }
}

/// One open level in the editor: the document being edited, its preview
/// index and the paint tool.
#[derive(Debug)]
pub struct EditorSession {
    store: LevelStore,
    default_id: LevelId,
    current: LevelId,
    document: GridDocument,
    preview: TileIndex,
    tool: PaintTool,
    dirty: bool,
}

impl EditorSession {
    /// Opens `id`, creating it from `default_id` when it does not exist yet.
    pub fn open(
        store: LevelStore,
        default_id: LevelId,
        id: LevelId,
        tile_size: f32,
    ) -> Result<Self, LevelError> {
        let document = store.load_or_initialize(&id, &default_id)?;
        let preview = TileIndex::build(&document, tile_size);
        info!(level = %id, rows = document.rows(), cols = document.cols(), "editor_level_opened");
        Ok(Self {
            store,
            default_id,
            current: id,
            document,
            preview,
            tool: PaintTool::new(tile_size),
            dirty: false,
        })
    }

    pub fn current(&self) -> &LevelId {
        &self.current
    }

    pub fn document(&self) -> &GridDocument {
        &self.document
    }

    pub fn preview(&self) -> &TileIndex {
        &self.preview
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switches to `id`; unsaved edits to the current level are dropped.
    pub fn load(&mut self, id: LevelId) -> Result<(), LevelError> {
        let document = self.store.load_or_initialize(&id, &self.default_id)?;
        if self.dirty {
            warn!(level = %self.current, "editor_unsaved_changes_discarded");
        }
        self.preview = TileIndex::build(&document, self.preview.tile_size());
        self.document = document;
        self.current = id;
        self.dirty = false;
        info!(level = %self.current, "editor_level_opened");
        Ok(())
    }

    pub fn reload(&mut self) -> Result<(), LevelError> {
        self.load(self.current.clone())
    }

    pub fn save(&mut self) -> Result<(), LevelError> {
        self.store.save(&self.document, &self.current)?;
        self.dirty = false;
        Ok(())
    }

    /// Opens the numbered level `delta` steps away from the current one.
    /// Named levels count as level zero.
    pub fn step_level(&mut self, delta: i32) -> Result<(), LevelError> {
        let current = self.current.number().unwrap_or(0);
        let target = current.saturating_add_signed(delta);
        if self.current.number() == Some(target) {
            return Ok(());
        }
        self.load(LevelId::numbered(target))
    }

    pub fn apply_pointer(
        &mut self,
        cursor: Option<Vec2>,
        primary_down: bool,
        secondary_down: bool,
    ) -> Result<Option<PaintAction>, LevelError> {
        let action = self
            .tool
            .apply(&mut self.document, cursor, primary_down, secondary_down)?;
        if let Some(action) = action {
            self.preview = TileIndex::build(&self.document, self.preview.tile_size());
            self.dirty = true;
            debug!(level = %self.current, ?action, "editor_cell_painted");
        }
        Ok(action)
    }
}
