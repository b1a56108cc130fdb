//! Crystal Journey - simulation core for a set of four casual mini-games
//!
//! Core modules:
//! - `games`: Deterministic tick-driven game engines (lane runner, sequence
//!   memory, rhythm timing, tile puzzle)
//! - `progress`: Shared progress ledger backed by durable key-value storage
//! - `onboarding`: First-run onboarding stepper
//!
//! The engines are pure state containers: all timed behavior is advanced by
//! fixed-rate `tick()` calls, all player interaction arrives as discrete
//! events, and rendering/input plumbing lives entirely outside this crate.
//! Identical seeds plus identical input sequences replay identical sessions.

pub mod games;
pub mod onboarding;
pub mod progress;

pub use games::{GameId, LaneRunner, RhythmTap, SequenceMatch, TilePlacement};
pub use onboarding::OnboardingFlow;
pub use progress::{JsonFileStore, KvStore, MemoryStore, ProgressLedger, ProgressSnapshot};

/// Game tuning constants. Timed behaviors are expressed as tick counts
/// derived from the fixed tick rate, so second-denominated tuning survives a
/// rate change.
pub mod consts {
    /// Simulation tick rate in Hz
    pub const TICK_HZ: u32 = 60;

    /// Lane runner: number of lanes
    pub const LANES: u8 = 3;
    /// Lane runner: progress gained per tick (full run ~8.3s)
    pub const RUN_PROGRESS_PER_TICK: f32 = 0.002;
    /// Lane runner: obstacle descent per tick, in field units
    pub const OBSTACLE_SPEED: f32 = 4.0;
    /// Lane runner: ticks between obstacle spawns (1.2s)
    pub const OBSTACLE_SPAWN_TICKS: u32 = TICK_HZ * 6 / 5;
    /// Lane runner: vertical offset where obstacles enter
    pub const OBSTACLE_SPAWN_Y: f32 = -50.0;
    /// Lane runner: obstacles past this offset are dropped
    pub const OBSTACLE_DESPAWN_Y: f32 = 550.0;
    /// Lane runner: center of the player's vertical band
    pub const PLAYER_Y: f32 = 420.0;
    /// Lane runner: player band half-extent
    pub const PLAYER_HALF: f32 = 25.0;
    /// Lane runner: obstacle band half-extent
    pub const OBSTACLE_HALF: f32 = 25.0;
    /// Lane runner: crystals awarded per completed run
    pub const RUN_REWARD_CRYSTALS: u64 = 5;
    /// Lane runner: stars awarded per completed run
    pub const RUN_REWARD_STARS: u64 = 2;

    /// Sequence match: cells in the grid
    pub const SEQUENCE_CELLS: u8 = 9;
    /// Sequence match: sequence length cap
    pub const SEQUENCE_MAX_LEN: usize = 7;
    /// Sequence match: lead-in before the first reveal (1.0s)
    pub const REVEAL_LEAD_TICKS: u64 = TICK_HZ as u64;
    /// Sequence match: highlight duration per element (0.6s)
    pub const REVEAL_ON_TICKS: u64 = TICK_HZ as u64 * 3 / 5;
    /// Sequence match: element-to-element pitch (1.0s)
    pub const REVEAL_PITCH_TICKS: u64 = TICK_HZ as u64;
    /// Sequence match: settle delay before input enables (0.4s)
    pub const REVEAL_SETTLE_TICKS: u64 = TICK_HZ as u64 * 2 / 5;
    /// Sequence match: delay before the matched prefix is revealed on a miss (0.5s)
    pub const MISS_REVEAL_TICKS: u64 = TICK_HZ as u64 / 2;
    /// Sequence match: delay before a missed round transitions to lost (1.5s)
    pub const MISS_LOST_TICKS: u64 = TICK_HZ as u64 * 3 / 2;

    /// Rhythm tap: markers per session
    pub const MARKER_COUNT: u32 = 12;
    /// Rhythm tap: ticks between marker spawns (1.5s)
    pub const MARKER_SPAWN_TICKS: u64 = TICK_HZ as u64 * 3 / 2;
    /// Rhythm tap: marker advance per tick (normalized track units)
    pub const MARKER_SPEED: f32 = 0.008;
    /// Rhythm tap: target line position on the normalized track
    pub const TARGET_X: f32 = 0.5;
    /// Rhythm tap: perfect-hit window around the target
    pub const PERFECT_ZONE: f32 = 0.04;
    /// Rhythm tap: good-hit window around the target
    pub const GOOD_ZONE: f32 = 0.12;
    /// Rhythm tap: markers past this position are dropped
    pub const MARKER_DESPAWN_X: f32 = 1.2;
    /// Rhythm tap: trailing time after the last spawn before the session ends (3.0s)
    pub const FINISH_SETTLE_TICKS: u64 = TICK_HZ as u64 * 3;
    /// Rhythm tap: points for a perfect hit
    pub const PERFECT_POINTS: u64 = 3;
    /// Rhythm tap: points for a good hit
    pub const GOOD_POINTS: u64 = 1;

    /// Tile placement: slots per level (also the tile count)
    pub const SLOT_COUNT: usize = 6;

}
