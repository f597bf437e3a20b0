//! Read-only view of engine state for renderers

use crate::board::Cell;
use crate::engine::Phase;
use crate::piece::CellPos;
use crate::tetromino::{PieceKind, Rotation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The falling piece as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    /// Absolute cells, may include rows above the board
    pub cells: [CellPos; 4],
}

/// Engine state at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    /// Locked cells, row 0 at the top
    pub board: Vec<Vec<Cell>>,
    pub current: Option<PieceView>,
    /// Cells the current piece would occupy after a hard drop
    pub ghost: Option<[CellPos; 4]>,
    pub next: Option<PieceKind>,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    pub phase: Phase,
}

impl Snapshot {
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Board rows with the ghost drawn as `:` and the current piece as its
    /// lowercase tag
    pub fn render_rows(&self) -> Vec<String> {
        let mut grid: Vec<Vec<char>> = self
            .board
            .iter()
            .map(|row| row.iter().map(Cell::tag).collect())
            .collect();

        let mut paint = |cells: &[CellPos], c: char| {
            for &(x, y) in cells {
                if x < 0 || y < 0 {
                    continue;
                }
                let slot = grid
                    .get_mut(y as usize)
                    .and_then(|row| row.get_mut(x as usize));
                if let Some(slot) = slot {
                    *slot = c;
                }
            }
        };
        if let Some(ghost) = &self.ghost {
            paint(&ghost[..], ':');
        }
        if let Some(piece) = &self.current {
            paint(&piece.cells[..], piece.kind.tag().to_ascii_lowercase());
        }

        grid.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.render_rows() {
            writeln!(f, "{}", row)?;
        }
        let next = self.next.map_or('-', |kind| kind.tag());
        write!(
            f,
            "score {} | lines {} | level {} | next {} | {:?}",
            self.score, self.lines, self.level, next, self.phase
        )
    }
}
