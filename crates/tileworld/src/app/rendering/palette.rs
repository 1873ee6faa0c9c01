use crate::grid::CellCode;

use super::draw_list::Color;

pub const SKY: Color = [120, 190, 245, 255];
pub const MENU_BACKDROP: Color = [24, 28, 48, 255];
pub const PLAYER: Color = [40, 70, 200, 255];
pub const GRID_LINE: Color = [255, 255, 255, 255];
pub const PANEL: Color = [46, 46, 56, 255];
pub const BANNER: Color = [250, 250, 250, 255];

/// Flat color for a known cell code; `None` for empty cells.
pub fn cell_color(cell: CellCode) -> Option<Color> {
    match cell {
        CellCode::Empty => None,
        CellCode::Dirt => Some([121, 85, 58, 255]),
        CellCode::Grass => Some([76, 160, 64, 255]),
        CellCode::Enemy => Some([150, 40, 160, 255]),
        CellCode::Lava => Some([230, 80, 20, 255]),
        CellCode::Coin => Some([245, 205, 40, 255]),
        CellCode::Exit => Some([90, 90, 100, 255]),
        CellCode::PlayerStart => Some([235, 120, 190, 255]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_cells_have_no_color() {
        assert_eq!(cell_color(CellCode::Empty), None);
        assert!(cell_color(CellCode::Lava).is_some());
        assert_ne!(cell_color(CellCode::Dirt), cell_color(CellCode::Grass));
    }
}
