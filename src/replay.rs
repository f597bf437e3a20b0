//! Command scripts replayed against an engine with a simulated clock
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! left 2      # move left twice
//! rotate
//! tick 1500   # let gravity run for 1.5s
//! drop
//! ```

use crate::engine::{Action, Engine, Phase};
use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::debug;

/// Clock step used while waiting, matching a 60 FPS game loop
pub const DEFAULT_FRAME: Duration = Duration::from_micros(1_000_000 / 60);

/// One parsed script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Apply an action `count` times
    Act(Action, u32),
    /// Advance the clock, ticking gravity once per frame
    Wait(Duration),
}

/// Parsed command script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// Outcome of a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayStats {
    /// Actions the engine accepted
    pub accepted: u32,
    /// Actions the engine rejected (blocked, paused or game over)
    pub rejected: u32,
    /// Simulated clock at the end of the run
    pub elapsed: Duration,
}

/// Parse an action word
fn parse_action(word: &str) -> Option<Action> {
    match word.to_lowercase().as_str() {
        "left" | "l" => Some(Action::MoveLeft),
        "right" | "r" => Some(Action::MoveRight),
        "down" | "soft" => Some(Action::SoftDrop),
        "rotate" | "up" | "cw" => Some(Action::Rotate),
        "drop" | "hard" | "space" => Some(Action::HardDrop),
        "pause" | "p" => Some(Action::TogglePause),
        _ => None,
    }
}

impl Script {
    /// Parse script text
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let step = Self::parse_line(line)
                .with_context(|| format!("line {}: {:?}", idx + 1, raw))?;
            steps.push(step);
        }
        Ok(Self { steps })
    }

    fn parse_line(line: &str) -> Result<Step> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            bail!("empty command");
        };
        let arg = words.next();
        if let Some(extra) = words.next() {
            bail!("unexpected argument {:?}", extra);
        }

        if matches!(command.to_lowercase().as_str(), "tick" | "wait") {
            let Some(ms) = arg else {
                bail!("{} needs a duration in milliseconds", command);
            };
            let ms: u64 = ms.parse().with_context(|| format!("bad duration {:?}", ms))?;
            return Ok(Step::Wait(Duration::from_millis(ms)));
        }

        let Some(action) = parse_action(command) else {
            bail!("unknown command {:?}", command);
        };
        let count = match arg {
            Some(n) => n.parse().with_context(|| format!("bad repeat count {:?}", n))?,
            None => 1,
        };
        Ok(Step::Act(action, count))
    }

    /// Run against `engine` from clock zero, ticking once per `frame` while
    /// waiting. Stops early at game over.
    pub fn run(&self, engine: &mut Engine, frame: Duration) -> ReplayStats {
        let frame = frame.max(Duration::from_millis(1));
        let mut stats = ReplayStats::default();
        let mut now = Duration::ZERO;
        engine.update(now);

        for step in &self.steps {
            if engine.phase() == Phase::GameOver {
                debug!("replay stopped at game over");
                break;
            }
            match *step {
                Step::Act(action, count) => {
                    for _ in 0..count {
                        if engine.phase() == Phase::GameOver {
                            break;
                        }
                        if engine.apply(action) {
                            stats.accepted += 1;
                        } else {
                            stats.rejected += 1;
                        }
                        engine.update(now);
                    }
                }
                Step::Wait(duration) => {
                    let end = now + duration;
                    while now < end {
                        now = (now + frame).min(end);
                        engine.update(now);
                    }
                }
            }
        }

        stats.elapsed = now;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::randomizer::Randomizer;
    use crate::tetromino::PieceKind;

    #[test]
    fn test_parse_commands() {
        let script = Script::parse(
            "# opener\nleft 2\nROTATE\n\ntick 250  # settle\ndrop\npause\n",
        )
        .unwrap();
        assert_eq!(
            script.steps,
            vec![
                Step::Act(Action::MoveLeft, 2),
                Step::Act(Action::Rotate, 1),
                Step::Wait(Duration::from_millis(250)),
                Step::Act(Action::HardDrop, 1),
                Step::Act(Action::TogglePause, 1),
            ]
        );
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = Script::parse("left\njump\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(Script::parse("tick").is_err());
        assert!(Script::parse("tick soon").is_err());
        assert!(Script::parse("left 1 2").is_err());
    }

    #[test]
    fn test_run_counts_and_clock() {
        let mut engine =
            Engine::with_board(Board::default(), Randomizer::sequence(&[PieceKind::O]));
        let script = Script::parse("left 10\ntick 1000\n").unwrap();
        let stats = script.run(&mut engine, DEFAULT_FRAME);
        // O starts at x=3 and can step left 4 times
        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.rejected, 6);
        assert_eq!(stats.elapsed, Duration::from_millis(1000));
        // gravity fires on frame boundaries: once at ~517ms, the next is past 1s
        assert_eq!(engine.current().unwrap().y, 1);
    }

    #[test]
    fn test_run_stops_at_game_over() {
        let mut engine = Engine::with_board(
            Board::from_rows(&["....", "####", "####", "####"]),
            Randomizer::sequence(&[PieceKind::T]),
        );
        let stats = Script::parse("left\nright\n").unwrap().run(&mut engine, DEFAULT_FRAME);
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(stats, ReplayStats::default());
    }

    #[test]
    fn test_repeated_step_stops_at_game_over() {
        let mut engine = Engine::with_board(
            Board::from_rows(&["...."; 8]),
            Randomizer::sequence(&[PieceKind::O]),
        );
        let stats = Script::parse("drop 10
left
").unwrap().run(&mut engine, DEFAULT_FRAME);
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(stats.accepted, 3);
        assert_eq!(stats.rejected, 0);
    }
}
