//! TETRS engine - the falling-block core, without a screen
//!
//! Callers own an [`Engine`], feed it actions and timestamps, and draw from
//! its [`Snapshot`].

pub mod board;
pub mod config;
pub mod engine;
pub mod piece;
pub mod randomizer;
pub mod replay;
pub mod score;
pub mod snapshot;
pub mod tetromino;

pub use board::{Board, Cell};
pub use config::EngineConfig;
pub use engine::{Action, Engine, Phase, WALL_KICKS};
pub use piece::{CellPos, Piece};
pub use randomizer::{Randomizer, RandomizerKind};
pub use replay::{ReplayStats, Script, Step};
pub use score::{LINE_CLEAR_POINTS, Score, fall_interval};
pub use snapshot::{PieceView, Snapshot};
pub use tetromino::{PieceKind, Rotation, ShapeMask, shape_of};
