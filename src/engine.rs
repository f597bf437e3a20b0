//! Core game state and logic
//!
//! The engine never reads a clock. Callers pass a monotonic timestamp (time
//! since any fixed epoch) to [`Engine::update`] and gravity is measured
//! against it.

use crate::board::Board;
use crate::config::EngineConfig;
use crate::piece::{CellPos, Piece};
use crate::randomizer::Randomizer;
use crate::score::Score;
use crate::snapshot::{PieceView, Snapshot};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Horizontal offsets tried, in order, when a rotation collides
pub const WALL_KICKS: [i32; 4] = [-1, 1, -2, 2];

/// Running phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Active,
    Paused,
    GameOver,
}

/// Input actions the engine can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    TogglePause,
}

/// The engine: board, pieces, score and gravity clock
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    current: Option<Piece>,
    next: Option<Piece>,
    randomizer: Randomizer,
    score: Score,
    phase: Phase,
    fall_interval: Duration,
    /// Timestamp of the last gravity tick
    last_fall: Duration,
}

impl Engine {
    /// Create an engine from configuration. A missing seed is drawn at random.
    pub fn new(config: &EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_board(
            Board::new(config.width, config.height),
            Randomizer::with_kind(config.randomizer, seed),
        )
    }

    /// Standard 10×20 board with uniform draws from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_board(Board::default(), Randomizer::uniform(seed))
    }

    /// Start from an existing board and piece source
    pub fn with_board(board: Board, randomizer: Randomizer) -> Self {
        let score = Score::new();
        Self {
            board,
            current: None,
            next: None,
            randomizer,
            fall_interval: score.fall_interval(),
            score,
            phase: Phase::Active,
            last_fall: Duration::ZERO,
        }
    }

    /// Continue from an existing score. The level is rederived from its line
    /// total and gravity follows that level.
    pub fn with_score(mut self, score: Score) -> Self {
        let mut resumed = Score::from_lines(score.lines);
        resumed.points = score.points;
        self.fall_interval = resumed.fall_interval();
        self.score = resumed;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fall_interval(&self) -> Duration {
        self.fall_interval
    }

    pub fn seed(&self) -> u64 {
        self.randomizer.seed()
    }

    fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    fn draw(&mut self) -> Piece {
        Piece::new(self.randomizer.next(), 0, 0)
    }

    /// Promote `next` to `current` at the top centre and draw a new `next`.
    ///
    /// If the new piece overlaps the stack the game is over and the piece is
    /// left where it spawned. Does nothing once the game is over.
    pub fn spawn(&mut self) {
        if self.phase == Phase::GameOver {
            return;
        }
        let promoted = match self.next.take() {
            Some(piece) => piece,
            None => self.draw(),
        };
        let piece = Piece {
            x: self.board.width() as i32 / 2 - 2,
            y: 0,
            ..promoted
        };
        self.current = Some(piece);
        self.next = Some(self.draw());

        if self.board.collides(&piece.occupied_cells()) {
            info!(
                score = self.score.points,
                lines = self.score.lines,
                level = self.score.level,
                "game over: {:?} blocked at spawn",
                piece.kind
            );
            self.phase = Phase::GameOver;
            return;
        }
        debug!(kind = ?piece.kind, next = ?self.next.map(|p| p.kind), "spawned piece");
    }

    /// Move the current piece by `(dx, dy)` if the destination is free
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };
        let moved = piece.shifted(dx, dy);
        if self.board.collides(&moved.occupied_cells()) {
            return false;
        }
        self.current = Some(moved);
        true
    }

    /// Rotate clockwise, falling back to the horizontal kicks in [`WALL_KICKS`]
    pub fn try_rotate(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };
        let rotated = piece.rotated();
        let landed = std::iter::once(0)
            .chain(WALL_KICKS)
            .map(|dx| rotated.shifted(dx, 0))
            .find(|candidate| !self.board.collides(&candidate.occupied_cells()));

        match landed {
            Some(candidate) => {
                if candidate.x != rotated.x {
                    debug!(kick = candidate.x - rotated.x, "wall kick");
                }
                self.current = Some(candidate);
                true
            }
            None => false,
        }
    }

    /// Move down one row, crediting 1 point on success
    pub fn soft_drop(&mut self) -> bool {
        let moved = self.try_move(0, 1);
        if moved {
            self.score.add_soft_drop(1);
        }
        moved
    }

    /// Drop to the landing row, credit 2 points per row, then lock and spawn.
    /// Returns false when there was no piece to drop.
    pub fn hard_drop(&mut self) -> bool {
        if !self.is_active() || self.current.is_none() {
            return false;
        }
        let mut distance = 0;
        while self.try_move(0, 1) {
            distance += 1;
        }
        self.score.add_hard_drop(distance);
        self.lock_and_advance();
        true
    }

    /// Flip between Active and Paused. Ignored once the game is over.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Active => Phase::Paused,
            Phase::Paused => Phase::Active,
            Phase::GameOver => Phase::GameOver,
        };
    }

    /// Advance the gravity clock to `now`
    pub fn update(&mut self, now: Duration) {
        if !self.is_active() {
            return;
        }
        if self.current.is_none() {
            self.spawn();
            return;
        }
        if now.saturating_sub(self.last_fall) >= self.fall_interval {
            if !self.try_move(0, 1) {
                self.lock_and_advance();
            }
            self.last_fall = now;
        }
    }

    /// Dispatch a single input action
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.try_move(-1, 0),
            Action::MoveRight => self.try_move(1, 0),
            Action::SoftDrop => self.soft_drop(),
            Action::Rotate => self.try_rotate(),
            Action::HardDrop => self.hard_drop(),
            Action::TogglePause => {
                let before = self.phase;
                self.toggle_pause();
                self.phase != before
            }
        }
    }

    /// The current piece moved down to where a hard drop would land it
    pub fn ghost(&self) -> Option<Piece> {
        let mut ghost = self.current?;
        loop {
            let below = ghost.shifted(0, 1);
            if self.board.collides(&below.occupied_cells()) {
                return Some(ghost);
            }
            ghost = below;
        }
    }

    /// Commit the current piece, clear rows, score, and spawn the next piece
    fn lock_and_advance(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        let cells: [CellPos; 4] = piece.occupied_cells();
        self.board.commit(&cells, piece.kind);

        let cleared = self.board.clear_full_rows();
        let level_before = self.score.level;
        let awarded = self.score.add_clear(cleared);
        self.fall_interval = self.score.fall_interval();
        debug!(kind = ?piece.kind, x = piece.x, y = piece.y, cleared, awarded, "locked piece");

        if self.score.level != level_before {
            info!(
                level = self.score.level,
                lines = self.score.lines,
                interval_ms = self.fall_interval.as_millis() as u64,
                "level up"
            );
        }

        self.spawn();
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.board.width(),
            height: self.board.height(),
            board: self.board.rows().to_vec(),
            current: self.current.map(|piece| PieceView {
                kind: piece.kind,
                rotation: piece.rotation,
                x: piece.x,
                y: piece.y,
                cells: piece.occupied_cells(),
            }),
            ghost: self.ghost().map(|piece| piece.occupied_cells()),
            next: self.next.map(|piece| piece.kind),
            score: self.score.points,
            lines: self.score.lines,
            level: self.score.level,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::tetromino::{PieceKind, Rotation};

    fn engine_with(rows: &[&str], kinds: &[PieceKind]) -> Engine {
        Engine::with_board(Board::from_rows(rows), Randomizer::sequence(kinds))
    }

    fn empty_rows(width: usize, height: usize) -> Vec<String> {
        vec![".".repeat(width); height]
    }

    fn engine_on_empty(width: usize, height: usize, kinds: &[PieceKind]) -> Engine {
        let rows = empty_rows(width, height);
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        engine_with(&refs, kinds)
    }

    #[test]
    fn test_new_engine_has_no_piece() {
        let engine = Engine::with_seed(3);
        assert!(engine.current().is_none());
        assert!(engine.next().is_none());
        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(engine.score().level, 1);
        assert_eq!(engine.fall_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_spawn_position() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::T, PieceKind::O]);
        engine.spawn();
        let piece = engine.current().unwrap();
        assert_eq!(piece.kind, PieceKind::T);
        assert_eq!((piece.x, piece.y), (3, 0));
        assert_eq!(piece.rotation, Rotation::North);
        assert_eq!(engine.next().unwrap().kind, PieceKind::O);
    }

    #[test]
    fn test_spawn_promotes_next() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::I, PieceKind::J, PieceKind::S]);
        engine.spawn();
        engine.spawn();
        assert_eq!(engine.current().unwrap().kind, PieceKind::J);
        assert_eq!(engine.next().unwrap().kind, PieceKind::S);
    }

    #[test]
    fn test_first_update_spawns() {
        let mut engine = Engine::with_seed(9);
        engine.update(Duration::ZERO);
        assert!(engine.current().is_some());
        assert!(engine.next().is_some());
    }

    #[test]
    fn test_move_blocked_by_wall() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::O]);
        engine.spawn();
        // O occupies box columns 1..=2, origin starts at 3
        let mut moves = 0;
        while engine.try_move(-1, 0) {
            moves += 1;
        }
        assert_eq!(moves, 4);
        assert_eq!(engine.current().unwrap().x, -1);
    }

    #[test]
    fn test_move_without_piece_is_rejected() {
        let mut engine = Engine::with_seed(1);
        assert!(!engine.try_move(1, 0));
        assert!(!engine.try_rotate());
        assert!(!engine.hard_drop());
    }

    #[test]
    fn test_rotate_in_open_space() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::T]);
        engine.spawn();
        assert!(engine.try_rotate());
        let piece = engine.current().unwrap();
        assert_eq!(piece.rotation, Rotation::East);
        assert_eq!(piece.x, 3);
    }

    #[test]
    fn test_rotate_kicks_off_right_wall() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::I]);
        engine.spawn();
        // vertical I at the right wall: occupies box column 2
        assert!(engine.try_rotate());
        while engine.try_move(1, 0) {}
        let piece = *engine.current().unwrap();
        assert_eq!(piece.x + 2, 9);
        // horizontal South state needs box columns 0..=3, so it must kick left
        assert!(engine.try_rotate());
        let kicked = engine.current().unwrap();
        assert_eq!(kicked.rotation, Rotation::South);
        assert_eq!(kicked.x, piece.x - 1);
    }

    #[test]
    fn test_failed_rotation_reverts() {
        // a one-wide shaft in column 3: a vertical I fits, nothing horizontal does
        let mut rows = vec!["###.######"; 20];
        rows[0] = "..........";
        rows[1] = "..........";
        let mut engine = engine_with(&rows, &[PieceKind::I]);
        engine.spawn();
        assert_eq!(engine.phase(), Phase::Active);
        // East I lands on column 5; only the -2 kick reaches the shaft
        assert!(engine.try_rotate());
        assert_eq!(engine.current().unwrap().x, 1);
        assert!(engine.try_move(0, 1));
        assert!(engine.try_move(0, 1));
        let before = *engine.current().unwrap();
        assert!(!engine.try_rotate());
        assert_eq!(*engine.current().unwrap(), before);
    }

    #[test]
    fn test_hard_drop_scores_and_locks() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::O, PieceKind::T]);
        engine.spawn();
        assert!(engine.hard_drop());
        // O spans box rows 1..=2; origin falls from 0 to 17
        assert_eq!(engine.score().points, 2 * 17);
        assert_eq!(engine.board().get(4, 19), Some(Cell::Occupied(PieceKind::O)));
        assert_eq!(engine.board().get(5, 18), Some(Cell::Occupied(PieceKind::O)));
        assert_eq!(engine.current().unwrap().kind, PieceKind::T);
    }

    #[test]
    fn test_soft_drop_scores_one_point() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::T]);
        engine.spawn();
        assert!(engine.soft_drop());
        assert!(engine.soft_drop());
        assert_eq!(engine.score().points, 2);
        assert_eq!(engine.current().unwrap().y, 2);
    }

    #[test]
    fn test_gravity_waits_for_interval() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::T]);
        engine.update(Duration::ZERO);
        assert_eq!(engine.current().unwrap().y, 0);
        engine.update(Duration::from_millis(499));
        assert_eq!(engine.current().unwrap().y, 0);
        engine.update(Duration::from_millis(500));
        assert_eq!(engine.current().unwrap().y, 1);
        engine.update(Duration::from_millis(900));
        assert_eq!(engine.current().unwrap().y, 1);
        engine.update(Duration::from_millis(1000));
        assert_eq!(engine.current().unwrap().y, 2);
    }

    #[test]
    fn test_gravity_locks_on_floor() {
        let mut engine = engine_on_empty(4, 4, &[PieceKind::O, PieceKind::I]);
        engine.update(Duration::ZERO);
        // O box rows 1..=2 on a 4-high board: one free step then lock
        engine.update(Duration::from_millis(500));
        assert_eq!(engine.current().unwrap().y, 1);
        engine.update(Duration::from_millis(1000));
        assert_eq!(engine.board().to_string(), "....\n....\n.OO.\n.OO.\n");
        assert_eq!(engine.current().unwrap().kind, PieceKind::I);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::T]);
        engine.spawn();
        engine.toggle_pause();
        assert_eq!(engine.phase(), Phase::Paused);
        assert!(!engine.try_move(1, 0));
        assert!(!engine.try_rotate());
        assert!(!engine.soft_drop());
        assert!(!engine.hard_drop());
        engine.update(Duration::from_secs(10));
        assert_eq!(engine.current().unwrap().y, 0);

        engine.toggle_pause();
        assert_eq!(engine.phase(), Phase::Active);
        assert!(engine.try_move(1, 0));
    }

    #[test]
    fn test_line_clear_scoring() {
        let mut engine = engine_with(
            &[
                "....", "....", "....", "....", "....", "#..#", "#..#",
            ],
            &[PieceKind::O],
        );
        engine.spawn();
        assert!(engine.hard_drop());
        // 4 rows of drop, then a double at level 1
        assert_eq!(engine.score().points, 8 + 300);
        assert_eq!(engine.score().lines, 2);
        assert!(engine.board().is_empty());
    }

    #[test]
    fn test_game_over_blocks_spawn_and_pause() {
        let mut engine = engine_with(&["....", "####", "####"], &[PieceKind::T]);
        engine.spawn();
        assert_eq!(engine.phase(), Phase::GameOver);
        let frozen = *engine.current().unwrap();
        engine.toggle_pause();
        assert_eq!(engine.phase(), Phase::GameOver);
        assert!(!engine.apply(Action::TogglePause));
        engine.spawn();
        assert_eq!(*engine.current().unwrap(), frozen);
    }

    #[test]
    fn test_ghost_tracks_landing() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::I]);
        engine.spawn();
        let ghost = engine.ghost().unwrap();
        assert_eq!(ghost.y, 18);
        assert_eq!(ghost.x, engine.current().unwrap().x);
    }

    #[test]
    fn test_apply_dispatch() {
        let mut engine = engine_on_empty(10, 20, &[PieceKind::T]);
        engine.spawn();
        assert!(engine.apply(Action::MoveRight));
        assert!(engine.apply(Action::MoveLeft));
        assert!(engine.apply(Action::Rotate));
        assert!(engine.apply(Action::SoftDrop));
        assert!(engine.apply(Action::TogglePause));
        assert_eq!(engine.phase(), Phase::Paused);
        assert!(engine.apply(Action::TogglePause));
        assert!(engine.apply(Action::HardDrop));
    }

    #[test]
    fn test_with_score_rederives_level() {
        let stale = Score {
            points: 1234,
            lines: 25,
            level: 1,
        };
        let engine = Engine::with_seed(1).with_score(stale);
        assert_eq!(engine.score().points, 1234);
        assert_eq!(engine.score().lines, 25);
        assert_eq!(engine.score().level, 3);
        assert_eq!(engine.fall_interval(), Duration::from_millis(400));
    }

    #[test]
    fn test_spawn_on_ragged_rows() {
        let mut engine = engine_with(&["....", "..", "...."], &[PieceKind::I]);
        engine.spawn();
        assert_eq!(engine.phase(), Phase::Active);
        assert_eq!(engine.board().width(), 4);
        assert_eq!(engine.current().unwrap().occupied_cells()[3], (3, 1));
    }
}
