//! Seedable piece generation
//!
//! Every draw goes through a `ChaCha8Rng` seeded from a `u64`, so a seed plus a
//! command sequence replays a game exactly.

use crate::tetromino::PieceKind;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Randomizer selection as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomizerKind {
    /// Each piece drawn independently and uniformly from the 7 kinds
    #[default]
    Uniform,
    /// 7-bag: all 7 kinds shuffled, dealt out, then reshuffled
    Bag,
}

#[derive(Debug, Clone)]
enum Mode {
    Uniform,
    Bag(Vec<PieceKind>),
    Sequence { kinds: Vec<PieceKind>, pos: usize },
}

/// Piece source owned by the engine
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: ChaCha8Rng,
    seed: u64,
    mode: Mode,
}

impl Randomizer {
    /// Uniform draws from the given seed
    pub fn uniform(seed: u64) -> Self {
        Self::with_kind(RandomizerKind::Uniform, seed)
    }

    /// 7-bag draws from the given seed
    pub fn bag(seed: u64) -> Self {
        Self::with_kind(RandomizerKind::Bag, seed)
    }

    pub fn with_kind(kind: RandomizerKind, seed: u64) -> Self {
        let mode = match kind {
            RandomizerKind::Uniform => Mode::Uniform,
            RandomizerKind::Bag => Mode::Bag(Vec::with_capacity(7)),
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            mode,
        }
    }

    /// Deal `kinds` in order, cycling forever. An empty list falls back to uniform draws.
    pub fn sequence(kinds: &[PieceKind]) -> Self {
        let mode = if kinds.is_empty() {
            Mode::Uniform
        } else {
            Mode::Sequence {
                kinds: kinds.to_vec(),
                pos: 0,
            }
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(0),
            seed: 0,
            mode,
        }
    }

    /// Seed the generator was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw the next piece kind
    pub fn next(&mut self) -> PieceKind {
        match &mut self.mode {
            Mode::Uniform => PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())],
            Mode::Bag(bag) => {
                if bag.is_empty() {
                    bag.extend(PieceKind::ALL);
                    bag.shuffle(&mut self.rng);
                }
                // dealt from the back; the bag is already shuffled
                bag.pop().unwrap_or(PieceKind::I)
            }
            Mode::Sequence { kinds, pos } => {
                let kind = kinds[*pos];
                *pos = (*pos + 1) % kinds.len();
                kind
            }
        }
    }
}
