//! Deterministic game engines
//!
//! All gameplay logic lives here. Every engine follows the same contract:
//! - Fixed 60 Hz timestep only; timed events are tick counters, never
//!   ambient timers, so leaving a session cancels everything pending
//! - Seeded RNG only
//! - Discrete input events at the presentation boundary
//! - No rendering or platform dependencies

pub mod lane_runner;
pub mod rhythm_tap;
pub mod sequence_match;
pub mod tile_placement;

pub use lane_runner::{LaneRunner, LaneShift, Obstacle, RunPhase};
pub use rhythm_tap::{Marker, RhythmPhase, RhythmTap};
pub use sequence_match::{CellState, SequenceMatch, SequencePhase};
pub use tile_placement::{PuzzlePhase, TilePlacement, TileType};

/// Identifies a game in the shared progress ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameId {
    LaneRunner,
    SequenceMatch,
    RhythmTap,
    TilePlacement,
}

impl GameId {
    /// Ledger number as surfaced to external boundaries (1..=4).
    pub fn number(self) -> u8 {
        match self {
            GameId::LaneRunner => 1,
            GameId::SequenceMatch => 2,
            GameId::RhythmTap => 3,
            GameId::TilePlacement => 4,
        }
    }

    /// Zero-based index into per-game arrays.
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(GameId::LaneRunner),
            2 => Some(GameId::SequenceMatch),
            3 => Some(GameId::RhythmTap),
            4 => Some(GameId::TilePlacement),
            _ => None,
        }
    }
}
