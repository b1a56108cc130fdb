//! Sequence memory engine ("Crystal Memory")
//!
//! Simon-style growing-sequence challenge over a 3x3 cell grid. The reveal is
//! an explicit schedule of timed steps consumed by the tick loop, so the whole
//! show/hide choreography is data: cancellable on exit and testable by
//! fast-forwarding ticks.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::games::GameId;
use crate::progress::ProgressLedger;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePhase {
    Idle,
    /// Revealing the target sequence; input disabled
    Showing,
    /// Accepting player taps
    Waiting,
    Won,
    Lost,
}

/// Per-cell visual state for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Normal,
    Highlighted,
    Correct,
    Wrong,
}

/// One timed step of the reveal choreography
#[derive(Debug, Clone, Copy)]
struct RevealStep {
    /// Session tick at which the step fires
    at: u64,
    action: RevealAction,
}

#[derive(Debug, Clone, Copy)]
enum RevealAction {
    HighlightOn(u8),
    HighlightOff(u8),
    EnableInput,
}

/// Sequence length for a level: starts at 3, +1 every other level, capped.
pub fn sequence_len(level: u32) -> usize {
    (3 + (level.saturating_sub(1) / 2) as usize).min(SEQUENCE_MAX_LEN)
}

/// The sequence match session
pub struct SequenceMatch {
    phase: SequencePhase,
    level: u32,
    sequence: Vec<u8>,
    player: Vec<u8>,
    cell_states: [CellState; SEQUENCE_CELLS as usize],
    highlighted: Option<u8>,
    input_enabled: bool,
    /// Ticks since the current round started
    round_tick: u64,
    /// Pending reveal steps, ascending by `at`; drained as time passes
    schedule: Vec<RevealStep>,
    /// After a wrong tap: when to reveal which prior taps matched
    miss_reveal_at: Option<u64>,
    /// After a wrong tap: when to transition to Lost
    miss_lost_at: Option<u64>,
    rng: Pcg32,
}

impl SequenceMatch {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: SequencePhase::Idle,
            level: 1,
            sequence: Vec::new(),
            player: Vec::new(),
            cell_states: Default::default(),
            highlighted: None,
            input_enabled: false,
            round_tick: 0,
            schedule: Vec::new(),
            miss_reveal_at: None,
            miss_lost_at: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn cell_states(&self) -> &[CellState; SEQUENCE_CELLS as usize] {
        &self.cell_states
    }

    /// Currently glowing cell during the reveal, if any
    pub fn highlighted(&self) -> Option<u8> {
        self.highlighted
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Start from level 1.
    pub fn start(&mut self) {
        self.level = 1;
        self.play_round();
    }

    /// Replay the current level with a freshly drawn sequence.
    pub fn retry(&mut self) {
        self.play_round();
    }

    /// Advance to the next level.
    pub fn next_level(&mut self) {
        self.level += 1;
        self.play_round();
    }

    fn play_round(&mut self) {
        self.phase = SequencePhase::Showing;
        self.player.clear();
        self.cell_states = Default::default();
        self.highlighted = None;
        self.input_enabled = false;
        self.round_tick = 0;
        self.miss_reveal_at = None;
        self.miss_lost_at = None;

        let len = sequence_len(self.level);
        self.sequence.clear();
        let mut last: Option<u8> = None;
        for _ in 0..len {
            // Redraw when the draw repeats its predecessor (only matters for
            // sequences longer than one element)
            let cell = loop {
                let cell = self.rng.random_range(0..SEQUENCE_CELLS);
                if len > 1 && Some(cell) == last {
                    continue;
                }
                break cell;
            };
            self.sequence.push(cell);
            last = Some(cell);
        }

        self.schedule.clear();
        for (i, &cell) in self.sequence.iter().enumerate() {
            let on_at = REVEAL_LEAD_TICKS + i as u64 * REVEAL_PITCH_TICKS;
            self.schedule.push(RevealStep {
                at: on_at,
                action: RevealAction::HighlightOn(cell),
            });
            self.schedule.push(RevealStep {
                at: on_at + REVEAL_ON_TICKS,
                action: RevealAction::HighlightOff(cell),
            });
        }
        let last_off =
            REVEAL_LEAD_TICKS + (len as u64 - 1) * REVEAL_PITCH_TICKS + REVEAL_ON_TICKS;
        self.schedule.push(RevealStep {
            at: last_off + REVEAL_SETTLE_TICKS,
            action: RevealAction::EnableInput,
        });
    }

    /// Advance one fixed timestep. Drives the reveal schedule and the
    /// post-miss delays; inert in Idle/Won/Lost.
    pub fn tick(&mut self) {
        match self.phase {
            SequencePhase::Showing => {
                self.round_tick += 1;
                while let Some(step) = self.schedule.first().copied() {
                    if step.at > self.round_tick {
                        break;
                    }
                    self.schedule.remove(0);
                    match step.action {
                        RevealAction::HighlightOn(cell) => {
                            self.highlighted = Some(cell);
                            self.cell_states[cell as usize] = CellState::Highlighted;
                        }
                        RevealAction::HighlightOff(cell) => {
                            self.highlighted = None;
                            self.cell_states[cell as usize] = CellState::Normal;
                        }
                        RevealAction::EnableInput => {
                            self.phase = SequencePhase::Waiting;
                            self.input_enabled = true;
                        }
                    }
                }
            }
            SequencePhase::Waiting => {
                self.round_tick += 1;
                if self.miss_reveal_at == Some(self.round_tick) {
                    self.reveal_matched_prefix();
                }
                if self.miss_lost_at == Some(self.round_tick) {
                    self.phase = SequencePhase::Lost;
                    log::info!("Sequence round lost at level {}", self.level);
                }
            }
            SequencePhase::Idle | SequencePhase::Won | SequencePhase::Lost => {}
        }
    }

    /// Player tapped a cell. Checked against the target immediately.
    pub fn handle_tap(&mut self, cell: u8, ledger: &mut ProgressLedger) {
        if self.phase != SequencePhase::Waiting
            || !self.input_enabled
            || cell >= SEQUENCE_CELLS
        {
            return;
        }

        self.player.push(cell);
        let i = self.player.len() - 1;

        if self.sequence[i] == cell {
            self.cell_states[cell as usize] = CellState::Correct;
            if self.player.len() == self.sequence.len() {
                self.input_enabled = false;
                self.phase = SequencePhase::Won;
                let crystals = self.level as u64 * 2;
                let stars = self.level as u64;
                log::info!("Sequence level {} cleared", self.level);
                ledger.earn_reward(crystals, stars);
                ledger.update_best_streak(GameId::SequenceMatch, self.level as u64);
            }
        } else {
            self.input_enabled = false;
            self.cell_states[cell as usize] = CellState::Wrong;
            self.miss_reveal_at = Some(self.round_tick + MISS_REVEAL_TICKS);
            self.miss_lost_at = Some(self.round_tick + MISS_LOST_TICKS);
        }
    }

    /// Mark every cell the player got to: correct where the tap matched the
    /// target, wrong where it did not.
    fn reveal_matched_prefix(&mut self) {
        for (i, &target) in self.sequence.iter().enumerate() {
            if let Some(&tapped) = self.player.get(i) {
                self.cell_states[target as usize] = if tapped == target {
                    CellState::Correct
                } else {
                    CellState::Wrong
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryStore;
    use proptest::prelude::*;

    fn ledger() -> ProgressLedger {
        let _ = env_logger::builder().is_test(true).try_init();
        ProgressLedger::load(Box::new(MemoryStore::new()))
    }

    /// Ticks until the reveal finishes and input enables, for a sequence of
    /// the given length.
    fn reveal_duration(len: usize) -> u64 {
        REVEAL_LEAD_TICKS
            + (len as u64 - 1) * REVEAL_PITCH_TICKS
            + REVEAL_ON_TICKS
            + REVEAL_SETTLE_TICKS
    }

    fn fast_forward_to_waiting(game: &mut SequenceMatch) {
        for _ in 0..reveal_duration(game.sequence.len()) {
            game.tick();
        }
        assert_eq!(game.phase(), SequencePhase::Waiting);
    }

    #[test]
    fn test_sequence_lengths() {
        assert_eq!(sequence_len(1), 3);
        assert_eq!(sequence_len(2), 3);
        assert_eq!(sequence_len(3), 4);
        assert_eq!(sequence_len(9), 7);
        assert_eq!(sequence_len(13), 7); // capped
    }

    #[test]
    fn test_reveal_schedule_highlights_in_order() {
        let mut game = SequenceMatch::new(11);
        game.start();
        assert_eq!(game.phase(), SequencePhase::Showing);
        let sequence = game.sequence.clone();

        // Highlight periods are separated by off-gaps, so each rising edge of
        // `highlighted` is one revealed element
        let mut seen = Vec::new();
        let mut prev = None;
        for _ in 0..reveal_duration(sequence.len()) {
            game.tick();
            if game.highlighted() != prev {
                if let Some(cell) = game.highlighted() {
                    seen.push(cell);
                }
                prev = game.highlighted();
            }
        }
        assert_eq!(seen, sequence);
        assert_eq!(game.phase(), SequencePhase::Waiting);
        assert!(game.input_enabled());
    }

    #[test]
    fn test_input_disabled_until_settle() {
        let mut game = SequenceMatch::new(11);
        let mut ledger = ledger();
        game.start();

        // One tick short of the enable step: taps are dropped
        for _ in 0..reveal_duration(game.sequence.len()) - 1 {
            game.tick();
        }
        assert!(!game.input_enabled());
        let first = game.sequence[0];
        game.handle_tap(first, &mut ledger);
        assert!(game.player.is_empty());

        game.tick();
        assert!(game.input_enabled());
    }

    #[test]
    fn test_win_rewards_scale_with_level() {
        let mut game = SequenceMatch::new(11);
        let mut ledger = ledger();
        game.start();
        fast_forward_to_waiting(&mut game);

        for cell in game.sequence.clone() {
            assert_eq!(game.phase(), SequencePhase::Waiting);
            game.handle_tap(cell, &mut ledger);
        }
        assert_eq!(game.phase(), SequencePhase::Won);
        assert_eq!(ledger.snapshot().crystals, 2);
        assert_eq!(ledger.snapshot().stars, 1);
        assert_eq!(ledger.snapshot().best_streaks[1], 1);

        // Level 3 pays 6/3 and raises the streak
        game.next_level();
        game.next_level();
        assert_eq!(game.level(), 3);
        fast_forward_to_waiting(&mut game);
        for cell in game.sequence.clone() {
            game.handle_tap(cell, &mut ledger);
        }
        assert_eq!(ledger.snapshot().crystals, 2 + 6);
        assert_eq!(ledger.snapshot().stars, 1 + 3);
        assert_eq!(ledger.snapshot().best_streaks[1], 3);
    }

    #[test]
    fn test_wrong_tap_reveals_then_loses() {
        let mut game = SequenceMatch::new(11);
        let mut ledger = ledger();
        game.start();
        fast_forward_to_waiting(&mut game);

        let target = game.sequence.clone();
        game.handle_tap(target[0], &mut ledger);
        let wrong = (target[1] + 1) % SEQUENCE_CELLS;
        game.handle_tap(wrong, &mut ledger);

        assert!(!game.input_enabled());
        assert_eq!(game.cell_states()[wrong as usize], CellState::Wrong);
        assert_eq!(game.phase(), SequencePhase::Waiting);

        // Further taps are dead
        game.handle_tap(target[0], &mut ledger);
        assert_eq!(game.player.len(), 2);

        for _ in 0..MISS_REVEAL_TICKS {
            game.tick();
        }
        // The matched first tap is shown as correct
        assert_eq!(game.cell_states()[target[0] as usize], CellState::Correct);
        assert_eq!(game.phase(), SequencePhase::Waiting);

        for _ in 0..MISS_LOST_TICKS - MISS_REVEAL_TICKS {
            game.tick();
        }
        assert_eq!(game.phase(), SequencePhase::Lost);
        assert_eq!(ledger.snapshot().completions, 0);
    }

    #[test]
    fn test_retry_keeps_level_next_level_increments() {
        let mut game = SequenceMatch::new(11);
        game.start();
        game.next_level();
        assert_eq!(game.level(), 2);
        game.retry();
        assert_eq!(game.level(), 2);
        assert_eq!(game.phase(), SequencePhase::Showing);
        assert!(game.player.is_empty());
    }

    proptest! {
        #[test]
        fn prop_no_consecutive_repeats(seed in any::<u64>(), level in 1u32..30) {
            let mut game = SequenceMatch::new(seed);
            game.level = level;
            game.play_round();
            prop_assert_eq!(game.sequence.len(), sequence_len(level));
            for pair in game.sequence.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
            for &cell in &game.sequence {
                prop_assert!(cell < SEQUENCE_CELLS);
            }
        }
    }
}
