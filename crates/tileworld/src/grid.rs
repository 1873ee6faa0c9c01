use crate::error::LevelError;

/// Meaning of a known cell code. Codes 4 and 5 are reserved and have no
/// variant; any other unknown code read from disk is carried verbatim by
/// [`GridDocument`] and ignored by the tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellCode {
    Empty,
    Dirt,
    Grass,
    Enemy,
    Lava,
    Coin,
    Exit,
    PlayerStart,
}

impl CellCode {
    pub const fn code(self) -> i32 {
        match self {
            CellCode::Empty => 0,
            CellCode::Dirt => 1,
            CellCode::Grass => 2,
            CellCode::Enemy => 3,
            CellCode::Lava => 6,
            CellCode::Coin => 7,
            CellCode::Exit => 8,
            CellCode::PlayerStart => -1,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CellCode::Empty),
            1 => Some(CellCode::Dirt),
            2 => Some(CellCode::Grass),
            3 => Some(CellCode::Enemy),
            6 => Some(CellCode::Lava),
            7 => Some(CellCode::Coin),
            8 => Some(CellCode::Exit),
            -1 => Some(CellCode::PlayerStart),
            _ => None,
        }
    }

    pub const fn is_solid(self) -> bool {
        matches!(self, CellCode::Dirt | CellCode::Grass)
    }
}

/// Row-major table of cell codes with fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDocument {
    rows: usize,
    cols: usize,
    cells: Vec<i32>,
}

impl GridDocument {
    pub fn filled(rows: usize, cols: usize, code: i32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![code; rows * cols],
        }
    }

    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, LevelError> {
        let cols = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * cols);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != cols {
                return Err(LevelError::RaggedRows {
                    row,
                    expected: cols,
                    actual: values.len(),
                });
            }
            cells.extend(values);
        }
        Ok(Self {
            rows: row_count,
            cols,
            cells,
        })
    }

    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<i32>) -> Option<Self> {
        (cells.len() == rows * cols).then_some(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.cols).map(<[i32]>::to_vec).collect()
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Result<i32, LevelError> {
        let index = self.index_of(row, col)?;
        Ok(self.cells[index])
    }

    pub fn set_cell(&mut self, row: usize, col: usize, code: i32) -> Result<(), LevelError> {
        let index = self.index_of(row, col)?;
        self.cells[index] = code;
        Ok(())
    }

    /// Writes `code` at `(row, col)` and resets every other cell holding the
    /// same code to empty, keeping single-instance markers unique.
    pub fn set_unique(&mut self, row: usize, col: usize, code: i32) -> Result<(), LevelError> {
        let target = self.index_of(row, col)?;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if index != target && *cell == code {
                *cell = CellCode::Empty.code();
            }
        }
        self.cells[target] = code;
        Ok(())
    }

    /// Row-major positions of every cell holding `code`.
    pub fn positions_of(&self, code: i32) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == code)
            .map(|(index, _)| (index / self.cols, index % self.cols))
            .collect()
    }

    fn index_of(&self, row: usize, col: usize) -> Result<usize, LevelError> {
        if row >= self.rows || col >= self.cols {
            return Err(LevelError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}
