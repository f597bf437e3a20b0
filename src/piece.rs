//! Active falling piece geometry

use crate::tetromino::{PieceKind, Rotation};
use serde::{Deserialize, Serialize};

/// An absolute board coordinate `(x, y)`, y increasing downward
pub type CellPos = (i32, i32);

/// A live piece: kind, rotation and the top-left of its 4×4 bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// The type of tetromino
    pub kind: PieceKind,
    /// Current rotation state
    pub rotation: Rotation,
    /// Column of the bounding box's left edge
    pub x: i32,
    /// Row of the bounding box's top edge; may be negative above the board
    pub y: i32,
}

impl Piece {
    /// Create a piece in its spawn rotation at the given origin
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
        }
    }

    /// Get the absolute positions of all 4 blocks, in row-major mask order
    pub fn occupied_cells(&self) -> [CellPos; 4] {
        let shape = self.kind.shape(self.rotation);
        let mut cells = [(0, 0); 4];
        let mut n = 0;
        for (dy, row) in shape.iter().enumerate() {
            for (dx, &filled) in row.iter().enumerate() {
                if filled {
                    cells[n] = (self.x + dx as i32, self.y + dy as i32);
                    n += 1;
                }
            }
        }
        debug_assert_eq!(n, 4, "shape masks hold exactly four blocks");
        cells
    }

    /// Copy with rotation advanced one step clockwise. No collision check.
    pub fn rotated(&self) -> Piece {
        Piece {
            rotation: self.rotation.cw(),
            ..*self
        }
    }

    /// Copy translated by `(dx, dy)`. No collision check.
    pub fn shifted(&self, dx: i32, dy: i32) -> Piece {
        Piece {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
