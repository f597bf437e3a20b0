//! Tetromino definitions and shapes
//!
//! All 7 tetrominoes with their 4 rotation states, stored as 4×4 occupancy
//! masks. Row 0 of a mask is the top of the piece's bounding box.

use serde::{Deserialize, Serialize};

/// A 4×4 occupancy grid, indexed as `mask[row][col]`
pub type ShapeMask = [[bool; 4]; 4];

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds, in shape table order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Display tag handed to the renderer
    pub fn tag(&self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Inverse of [`PieceKind::tag`]
    pub fn from_tag(tag: char) -> Option<PieceKind> {
        PieceKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag.to_ascii_uppercase())
    }

    fn index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::J => 5,
            PieceKind::L => 6,
        }
    }

    /// Get the occupancy mask for this tetromino at a given rotation
    pub fn shape(&self, rotation: Rotation) -> &'static ShapeMask {
        &SHAPES[self.index()][rotation.index()]
    }
}

/// Shape table lookup: the mask for `kind` at `rotation`
pub fn shape_of(kind: PieceKind, rotation: Rotation) -> &'static ShapeMask {
    kind.shape(rotation)
}

/// Rotation states, clockwise from the spawn orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Index into the shape table (0..4)
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

const fn mask(rows: [u8; 4]) -> ShapeMask {
    let mut out = [[false; 4]; 4];
    let mut r = 0;
    while r < 4 {
        let mut c = 0;
        while c < 4 {
            out[r][c] = rows[r] & (0b1000 >> c) != 0;
            c += 1;
        }
        r += 1;
    }
    out
}

/// Shape table: `SHAPES[kind][rotation]`. Each row is a nibble, MSB = column 0.
static SHAPES: [[ShapeMask; 4]; 7] = [
    // I
    [
        mask([0b0000, 0b1111, 0b0000, 0b0000]),
        mask([0b0010, 0b0010, 0b0010, 0b0010]),
        mask([0b0000, 0b0000, 0b1111, 0b0000]),
        mask([0b0100, 0b0100, 0b0100, 0b0100]),
    ],
    // O
    [
        mask([0b0000, 0b0110, 0b0110, 0b0000]),
        mask([0b0000, 0b0110, 0b0110, 0b0000]),
        mask([0b0000, 0b0110, 0b0110, 0b0000]),
        mask([0b0000, 0b0110, 0b0110, 0b0000]),
    ],
    // T
    [
        mask([0b0000, 0b0100, 0b1110, 0b0000]),
        mask([0b0000, 0b0100, 0b0110, 0b0100]),
        mask([0b0000, 0b0000, 0b1110, 0b0100]),
        mask([0b0000, 0b0100, 0b1100, 0b0100]),
    ],
    // S
    [
        mask([0b0000, 0b0110, 0b1100, 0b0000]),
        mask([0b0000, 0b0100, 0b0110, 0b0010]),
        mask([0b0000, 0b0000, 0b0110, 0b1100]),
        mask([0b0000, 0b1000, 0b1100, 0b0100]),
    ],
    // Z
    [
        mask([0b0000, 0b1100, 0b0110, 0b0000]),
        mask([0b0000, 0b0010, 0b0110, 0b0100]),
        mask([0b0000, 0b0000, 0b1100, 0b0110]),
        mask([0b0000, 0b0100, 0b1100, 0b1000]),
    ],
    // J
    [
        mask([0b0000, 0b1000, 0b1110, 0b0000]),
        mask([0b0000, 0b0110, 0b0100, 0b0100]),
        mask([0b0000, 0b0000, 0b1110, 0b0010]),
        mask([0b0000, 0b0100, 0b0100, 0b1100]),
    ],
    // L
    [
        mask([0b0000, 0b0010, 0b1110, 0b0000]),
        mask([0b0000, 0b0100, 0b0100, 0b0110]),
        mask([0b0000, 0b0000, 0b1110, 0b1000]),
        mask([0b0000, 0b1100, 0b0100, 0b0100]),
    ],
];
