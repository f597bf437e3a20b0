//! Scoring, leveling and gravity speed

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base points for clearing 0, 1, 2, 3 and 4+ rows at once
pub const LINE_CLEAR_POINTS: [u64; 5] = [0, 100, 300, 500, 800];

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

const BASE_FALL_MS: u64 = 500;
const FALL_STEP_MS: u64 = 50;
const MIN_FALL_MS: u64 = 50;

/// Score tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// Current level, starts at 1
    pub level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            lines: 0,
            level: 1,
        }
    }

    /// Score resumed at `lines` cleared, with the matching level and no points
    pub fn from_lines(lines: u32) -> Self {
        Self {
            points: 0,
            lines,
            level: lines / LINES_PER_LEVEL + 1,
        }
    }

    /// Credit a line clear and return the points awarded.
    ///
    /// Points use the level in effect when the rows were cleared; the level
    /// is recomputed afterwards.
    pub fn add_clear(&mut self, rows: usize) -> u64 {
        let awarded = LINE_CLEAR_POINTS[rows.min(4)] * self.level as u64;
        self.points += awarded;
        self.lines += rows as u32;
        self.level = self.lines / LINES_PER_LEVEL + 1;
        awarded
    }

    /// Add score for soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }

    /// Gravity interval for the current level
    pub fn fall_interval(&self) -> Duration {
        fall_interval(self.level)
    }
}

/// Gravity interval for a level: 500ms, 50ms faster per level, floored at 50ms
pub fn fall_interval(level: u32) -> Duration {
    let step = (level.max(1) as u64 - 1).saturating_mul(FALL_STEP_MS);
    Duration::from_millis(BASE_FALL_MS.saturating_sub(step).max(MIN_FALL_MS))
}
