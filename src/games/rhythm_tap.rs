//! Rhythm timing engine ("Pulse Sync")
//!
//! A fixed stream of markers slides toward a target line; taps are scored by
//! distance to the target at tap time. Each marker is scored exactly once:
//! by a hit, or by the auto-miss when it slides past the good zone.

use crate::consts::*;
use crate::games::GameId;
use crate::progress::ProgressLedger;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmPhase {
    Idle,
    Playing,
    Finished,
}

/// A sliding marker on the normalized track
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    /// Position in track units; the target line sits at [`TARGET_X`]
    pub x: f32,
    /// Consumed by a tap (hidden by the presentation layer)
    pub hit: bool,
    /// Counted toward exactly one of perfect/good/missed
    pub scored: bool,
}

/// The rhythm tap session
pub struct RhythmTap {
    phase: RhythmPhase,
    markers: Vec<Marker>,
    score: u64,
    perfect_hits: u64,
    good_hits: u64,
    missed_hits: u64,
    spawned: u32,
    session_tick: u64,
    /// Session tick of the next marker spawn
    next_spawn_at: u64,
    /// Session tick at which the session ends regardless of marker state
    finish_at: u64,
}

impl RhythmTap {
    pub fn new() -> Self {
        Self {
            phase: RhythmPhase::Idle,
            markers: Vec::new(),
            score: 0,
            perfect_hits: 0,
            good_hits: 0,
            missed_hits: 0,
            spawned: 0,
            session_tick: 0,
            next_spawn_at: 0,
            finish_at: 0,
        }
    }

    pub fn phase(&self) -> RhythmPhase {
        self.phase
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn perfect_hits(&self) -> u64 {
        self.perfect_hits
    }

    pub fn good_hits(&self) -> u64 {
        self.good_hits
    }

    pub fn missed_hits(&self) -> u64 {
        self.missed_hits
    }

    /// Start (or restart) a session. The first marker spawns immediately;
    /// the finish deadline covers every spawn plus a settle window for the
    /// last marker to cross the track.
    pub fn start(&mut self) {
        self.phase = RhythmPhase::Playing;
        self.markers.clear();
        self.score = 0;
        self.perfect_hits = 0;
        self.good_hits = 0;
        self.missed_hits = 0;
        self.spawned = 0;
        self.session_tick = 0;
        self.next_spawn_at = 0;
        self.finish_at = MARKER_COUNT as u64 * MARKER_SPAWN_TICKS + FINISH_SETTLE_TICKS;
    }

    /// Advance one fixed timestep. No-op outside `Playing`.
    pub fn tick(&mut self, ledger: &mut ProgressLedger) {
        if self.phase != RhythmPhase::Playing {
            return;
        }

        if self.spawned < MARKER_COUNT && self.session_tick >= self.next_spawn_at {
            self.markers.push(Marker {
                x: 0.0,
                hit: false,
                scored: false,
            });
            self.spawned += 1;
            self.next_spawn_at += MARKER_SPAWN_TICKS;
        }

        for marker in &mut self.markers {
            if marker.hit {
                continue;
            }
            marker.x += MARKER_SPEED;
            // Past the reachable window without a tap: miss it, once
            if !marker.scored && marker.x > TARGET_X + GOOD_ZONE {
                marker.scored = true;
                self.missed_hits += 1;
            }
        }
        self.markers.retain(|m| m.x <= MARKER_DESPAWN_X);

        self.session_tick += 1;
        if self.session_tick >= self.finish_at {
            self.finish(ledger);
        }
    }

    /// Score the nearest eligible marker; a tap with none in reach does
    /// nothing.
    pub fn handle_tap(&mut self) {
        if self.phase != RhythmPhase::Playing {
            return;
        }

        let nearest = self
            .markers
            .iter_mut()
            .filter(|m| !m.hit && !m.scored)
            .map(|m| ((m.x - TARGET_X).abs(), m))
            .filter(|(dist, _)| *dist <= GOOD_ZONE)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let Some((distance, marker)) = nearest else {
            return;
        };
        marker.hit = true;
        marker.scored = true;

        if distance <= PERFECT_ZONE {
            self.perfect_hits += 1;
            self.score += PERFECT_POINTS;
        } else {
            self.good_hits += 1;
            self.score += GOOD_POINTS;
        }
    }

    fn finish(&mut self, ledger: &mut ProgressLedger) {
        self.phase = RhythmPhase::Finished;
        log::info!(
            "Rhythm session finished: score {}, {} perfect / {} good / {} missed",
            self.score,
            self.perfect_hits,
            self.good_hits,
            self.missed_hits
        );
        ledger.earn_reward(self.score, (self.score / 2).max(1));
        ledger.update_best_streak(GameId::RhythmTap, self.perfect_hits);
    }
}

impl Default for RhythmTap {
    fn default() -> Self {
        Self::new()
    }
}
