//! Lane runner engine ("Energy Flow")
//!
//! Continuous-time obstacle dodging across three lanes. Progress fills at a
//! fixed rate while obstacles descend; reaching full progress without a
//! collision wins the run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::games::GameId;
use crate::progress::ProgressLedger;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Playing,
    Won,
    Lost,
}

/// A descending obstacle
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub lane: u8,
    /// Vertical offset of the obstacle's center, increasing downward
    pub y: f32,
}

impl Obstacle {
    /// True when the obstacle's vertical band overlaps the player's band.
    fn in_player_band(&self) -> bool {
        (self.y - PLAYER_Y).abs() <= OBSTACLE_HALF + PLAYER_HALF
    }
}

/// Lane-change input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneShift {
    Left,
    Right,
}

/// The lane runner session
pub struct LaneRunner {
    phase: RunPhase,
    lane: u8,
    progress: f32,
    obstacles: Vec<Obstacle>,
    /// Ticks until the next obstacle spawns
    spawn_countdown: u32,
    /// Wins this session; reset by `start`, reported as the game-1 streak
    wins: u64,
    rng: Pcg32,
}

impl LaneRunner {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: RunPhase::Idle,
            lane: LANES / 2,
            progress: 0.0,
            obstacles: Vec::new(),
            spawn_countdown: OBSTACLE_SPAWN_TICKS,
            wins: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn lane(&self) -> u8 {
        self.lane
    }

    /// Progress toward the goal in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn wins(&self) -> u64 {
        self.wins
    }

    /// Start (or restart) a run. Discards any previous session state, so a
    /// leftover tick from a finished run has nothing to corrupt.
    pub fn start(&mut self) {
        self.phase = RunPhase::Playing;
        self.lane = LANES / 2;
        self.progress = 0.0;
        self.obstacles.clear();
        self.spawn_countdown = OBSTACLE_SPAWN_TICKS;
        self.wins = 0;
    }

    /// Shift the player one lane, clamped to the road. Only while playing.
    pub fn shift_lane(&mut self, shift: LaneShift) {
        if self.phase != RunPhase::Playing {
            return;
        }
        match shift {
            LaneShift::Left => {
                if self.lane > 0 {
                    self.lane -= 1;
                }
            }
            LaneShift::Right => {
                if self.lane < LANES - 1 {
                    self.lane += 1;
                }
            }
        }
    }

    /// Advance one fixed timestep. No-op outside `Playing`.
    pub fn tick(&mut self, ledger: &mut ProgressLedger) {
        if self.phase != RunPhase::Playing {
            return;
        }

        // Spawn cadence runs on the same tick clock as the simulation
        self.spawn_countdown -= 1;
        if self.spawn_countdown == 0 {
            self.spawn_countdown = OBSTACLE_SPAWN_TICKS;
            let lane = self.rng.random_range(0..LANES);
            self.obstacles.push(Obstacle {
                lane,
                y: OBSTACLE_SPAWN_Y,
            });
        }

        for obstacle in &mut self.obstacles {
            obstacle.y += OBSTACLE_SPEED;
        }
        self.obstacles.retain(|o| o.y <= OBSTACLE_DESPAWN_Y);

        if self
            .obstacles
            .iter()
            .any(|o| o.lane == self.lane && o.in_player_band())
        {
            self.phase = RunPhase::Lost;
            log::info!("Lane run lost at progress {:.2}", self.progress);
            return;
        }

        self.progress += RUN_PROGRESS_PER_TICK;
        if self.progress >= 1.0 {
            self.phase = RunPhase::Won;
            self.wins += 1;
            log::info!("Lane run won, session wins: {}", self.wins);
            ledger.earn_reward(RUN_REWARD_CRYSTALS, RUN_REWARD_STARS);
            ledger.update_best_streak(GameId::LaneRunner, self.wins);
        }
    }
}
