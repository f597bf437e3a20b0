//! Game board representation and collision detection

use crate::piece::CellPos;
use crate::tetromino::PieceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled by a locked piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(PieceKind),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Cell::Occupied(_))
    }

    /// Display tag: the piece tag, or `.` when empty
    pub fn tag(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied(kind) => kind.tag(),
        }
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    /// Grid stored as rows[y][x], row 0 is the top
    rows: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![Cell::Empty; width]; height],
        }
    }

    /// Parse a board from text rows, top first. `.` is empty, a piece tag is
    /// occupied by that kind and any other non-space character is occupied by `I`.
    /// Short rows are padded with empty cells to the widest row.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let rows = rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = row
                    .chars()
                    .map(|c| match c {
                        '.' => Cell::Empty,
                        c => Cell::Occupied(PieceKind::from_tag(c).unwrap_or(PieceKind::I)),
                    })
                    .collect();
                cells.resize(width, Cell::Empty);
                cells
            })
            .collect();
        Self { width, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Rows, top first
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height() {
            return None;
        }
        Some((x, y))
    }

    /// Get the cell at (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|(x, y)| self.rows[y][x])
    }

    /// Set a cell at (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.rows[y][x] = cell;
                true
            }
            None => false,
        }
    }

    /// True if any cell is outside the side walls or floor, or sits on an
    /// occupied cell. Cells above the top (y < 0) never collide.
    pub fn collides(&self, cells: &[CellPos]) -> bool {
        cells.iter().any(|&(x, y)| {
            if x < 0 || x >= self.width as i32 || y >= self.height() as i32 {
                return true;
            }
            y >= 0 && self.rows[y as usize][x as usize].is_occupied()
        })
    }

    /// Write `kind` into every in-bounds cell. Cells above the top are dropped.
    pub fn commit(&mut self, cells: &[CellPos], kind: PieceKind) {
        for &(x, y) in cells {
            self.set(x, y, Cell::Occupied(kind));
        }
    }

    /// Remove completed rows and return the number cleared.
    /// Each removed row is replaced by an empty row at the top.
    pub fn clear_full_rows(&mut self) -> usize {
        let height = self.height();
        self.rows.retain(|row| !row.iter().all(Cell::is_occupied));
        let cleared = height - self.rows.len();
        for _ in 0..cleared {
            self.rows.insert(0, vec![Cell::Empty; self.width]);
        }
        cleared
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(Cell::is_occupied))
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Cell::is_empty))
    }

    /// Height of the stack in column x: rows from the topmost occupied cell
    /// down to the floor, 0 for an empty or out-of-range column.
    pub fn column_height(&self, x: usize) -> usize {
        if x >= self.width {
            return 0;
        }
        self.rows
            .iter()
            .position(|row| row[x].is_occupied())
            .map_or(0, |top| self.height() - top)
    }

    /// Sum of all column heights
    pub fn aggregate_height(&self) -> usize {
        (0..self.width).map(|x| self.column_height(x)).sum()
    }

    /// Empty cells with at least one occupied cell above them in the same column
    pub fn holes(&self) -> usize {
        (0..self.width)
            .map(|x| {
                self.rows
                    .iter()
                    .skip_while(|row| row[x].is_empty())
                    .filter(|row| row[x].is_empty())
                    .count()
            })
            .sum()
    }

    /// Sum of absolute height differences between neighbouring columns
    pub fn bumpiness(&self) -> usize {
        let heights: Vec<usize> = (0..self.width).map(|x| self.column_height(x)).collect();
        heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().map(Cell::tag).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
