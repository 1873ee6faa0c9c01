use tracing::{debug, warn};

use crate::geometry::{Rect, Vec2};
use crate::grid::{CellCode, GridDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidKind {
    Dirt,
    Grass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTile {
    pub rect: Rect,
    pub kind: SolidKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Enemy,
    Hazard,
    Collectible,
    Exit,
}

/// Where a dynamic entity appears; `origin` is the top-left of its cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnDescriptor {
    pub kind: SpawnKind,
    pub row: usize,
    pub col: usize,
    pub origin: Vec2,
}

/// Exit trigger box: one tile wide, two tall, raised one tile above its cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitMarker {
    pub rect: Rect,
    pub cell_origin: Vec2,
}

/// Static collision and spawn data derived from one grid document.
#[derive(Debug, Clone, PartialEq)]
pub struct TileIndex {
    tile_size: f32,
    tiles: Vec<StaticTile>,
    spawns: Vec<SpawnDescriptor>,
    start: Option<Vec2>,
    exit: Option<ExitMarker>,
}

impl TileIndex {
    pub fn build(doc: &GridDocument, tile_size: f32) -> Self {
        let mut index = Self {
            tile_size,
            tiles: Vec::new(),
            spawns: Vec::new(),
            start: None,
            exit: None,
        };
        let mut ignored_cells = 0usize;

        for (row, values) in doc.to_rows().iter().enumerate() {
            for (col, &code) in values.iter().enumerate() {
                let origin = Vec2::new(col as f32 * tile_size, row as f32 * tile_size);
                let Some(cell) = CellCode::from_code(code) else {
                    ignored_cells += 1;
                    continue;
                };
                match cell {
                    CellCode::Empty => {}
                    CellCode::Dirt | CellCode::Grass => {
                        let kind = if cell == CellCode::Dirt {
                            SolidKind::Dirt
                        } else {
                            SolidKind::Grass
                        };
                        index.tiles.push(StaticTile {
                            rect: Rect::from_origin(origin, tile_size, tile_size),
                            kind,
                        });
                    }
                    CellCode::Enemy => index.push_spawn(SpawnKind::Enemy, row, col, origin),
                    CellCode::Lava => index.push_spawn(SpawnKind::Hazard, row, col, origin),
                    CellCode::Coin => index.push_spawn(SpawnKind::Collectible, row, col, origin),
                    CellCode::Exit => {
                        index.push_spawn(SpawnKind::Exit, row, col, origin);
                        if index.exit.is_some() {
                            warn!(row, col, "duplicate_exit_marker_last_wins");
                        }
                        index.exit = Some(ExitMarker {
                            rect: Rect::new(
                                origin.x,
                                origin.y - tile_size,
                                tile_size,
                                tile_size * 2.0,
                            ),
                            cell_origin: origin,
                        });
                    }
                    CellCode::PlayerStart => {
                        if index.start.is_some() {
                            warn!(row, col, "duplicate_start_marker_last_wins");
                        }
                        index.start = Some(origin);
                    }
                }
            }
        }

        debug!(
            static_tiles = index.tiles.len(),
            spawns = index.spawns.len(),
            ignored_cells,
            has_start = index.start.is_some(),
            has_exit = index.exit.is_some(),
            "tile_index_built"
        );
        index
    }

    fn push_spawn(&mut self, kind: SpawnKind, row: usize, col: usize, origin: Vec2) {
        self.spawns.push(SpawnDescriptor {
            kind,
            row,
            col,
            origin,
        });
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn tiles(&self) -> &[StaticTile] {
        &self.tiles
    }

    pub fn spawns(&self) -> &[SpawnDescriptor] {
        &self.spawns
    }

    pub fn spawns_of(&self, kind: SpawnKind) -> impl Iterator<Item = &SpawnDescriptor> + '_ {
        self.spawns.iter().filter(move |spawn| spawn.kind == kind)
    }

    /// Player start; the top-left corner when the document has no marker.
    pub fn start(&self) -> Vec2 {
        self.start.unwrap_or_default()
    }

    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }

    pub fn exit(&self) -> Option<&ExitMarker> {
        self.exit.as_ref()
    }
}
