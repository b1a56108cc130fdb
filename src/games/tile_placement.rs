//! Tile placement engine ("Matrix Build")
//!
//! Six slots, six tiles. Tiles are selected from a shuffled pool and placed
//! into empty slots; the level is solved when every slot is occupied. Taking
//! a tile back out of a slot does not refund the move, so sloppy building
//! costs reward.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::games::GameId;
use crate::progress::ProgressLedger;

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzlePhase {
    Idle,
    Playing,
    Won,
}

/// Tile flavors. Purely cosmetic: the solution check only cares about
/// occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    Energy,
    Crystal,
    Star,
}

impl TileType {
    const ALL: [TileType; 3] = [TileType::Energy, TileType::Crystal, TileType::Star];

    fn random(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// The tile placement session
pub struct TilePlacement {
    phase: PuzzlePhase,
    slots: [Option<TileType>; SLOT_COUNT],
    pool: Vec<TileType>,
    level: u32,
    move_count: u32,
    selected: Option<usize>,
    rng: Pcg32,
}

impl TilePlacement {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: PuzzlePhase::Idle,
            slots: [None; SLOT_COUNT],
            pool: Vec::new(),
            level: 1,
            move_count: 0,
            selected: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> PuzzlePhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn slots(&self) -> &[Option<TileType>; SLOT_COUNT] {
        &self.slots
    }

    pub fn pool(&self) -> &[TileType] {
        &self.pool
    }

    /// Index into the pool of the currently selected tile, if any
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Start from level 1.
    pub fn start(&mut self) {
        self.level = 1;
        self.setup_level();
    }

    /// Advance to the next level.
    pub fn next_level(&mut self) {
        self.level += 1;
        self.setup_level();
    }

    fn setup_level(&mut self) {
        self.phase = PuzzlePhase::Playing;
        self.slots = [None; SLOT_COUNT];
        self.move_count = 0;
        self.selected = None;

        self.pool.clear();
        for _ in 0..SLOT_COUNT {
            self.pool.push(TileType::random(&mut self.rng));
        }
        self.pool.shuffle(&mut self.rng);
    }

    /// Select a tile from the pool. Out-of-range indices are ignored.
    pub fn select_tile(&mut self, pool_index: usize) {
        if self.phase != PuzzlePhase::Playing || pool_index >= self.pool.len() {
            return;
        }
        self.selected = Some(pool_index);
    }

    /// Tap a slot: place the selected tile into an empty slot, or lift an
    /// occupied slot's tile back into the pool (which never refunds a move).
    pub fn tap_slot(&mut self, slot_index: usize) {
        if self.phase != PuzzlePhase::Playing || slot_index >= SLOT_COUNT {
            return;
        }

        if self.slots[slot_index].is_none() {
            if let Some(pool_index) = self.selected {
                if pool_index < self.pool.len() {
                    self.slots[slot_index] = Some(self.pool.remove(pool_index));
                    self.selected = None;
                    self.move_count += 1;
                }
            }
        } else if let Some(tile) = self.slots[slot_index].take() {
            self.pool.push(tile);
        }
    }

    /// Return every placed tile to the pool and zero the move counter,
    /// keeping the level.
    pub fn reset_puzzle(&mut self) {
        if self.phase != PuzzlePhase::Playing {
            return;
        }
        for slot in &mut self.slots {
            if let Some(tile) = slot.take() {
                self.pool.push(tile);
            }
        }
        self.move_count = 0;
        self.selected = None;
    }

    /// The level is solved when every slot holds a tile; arrangement does not
    /// matter. Returns whether the check succeeded.
    pub fn check_solution(&mut self, ledger: &mut ProgressLedger) -> bool {
        if self.phase != PuzzlePhase::Playing {
            return false;
        }
        if !self.slots.iter().all(|s| s.is_some()) {
            return false;
        }

        self.phase = PuzzlePhase::Won;
        let crystals = (10u64.saturating_sub(self.move_count as u64)).max(3);
        let stars = self.level as u64;
        log::info!(
            "Puzzle level {} solved in {} moves",
            self.level,
            self.move_count
        );
        ledger.earn_reward(crystals, stars);
        ledger.update_best_streak(GameId::TilePlacement, self.level as u64);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryStore;

    fn ledger() -> ProgressLedger {
        let _ = env_logger::builder().is_test(true).try_init();
        ProgressLedger::load(Box::new(MemoryStore::new()))
    }

    fn place_all(game: &mut TilePlacement) {
        for slot in 0..SLOT_COUNT {
            game.select_tile(0);
            game.tap_slot(slot);
        }
    }

    #[test]
    fn test_setup_generates_full_pool() {
        let mut game = TilePlacement::new(42);
        game.start();
        assert_eq!(game.phase(), PuzzlePhase::Playing);
        assert_eq!(game.pool().len(), SLOT_COUNT);
        assert!(game.slots().iter().all(|s| s.is_none()));
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn test_tile_conservation() {
        let mut game = TilePlacement::new(42);
        game.start();

        game.select_tile(2);
        game.tap_slot(0);
        game.select_tile(0);
        game.tap_slot(3);
        game.tap_slot(0); // lift one back out

        let placed = game.slots().iter().filter(|s| s.is_some()).count();
        assert_eq!(placed + game.pool().len(), SLOT_COUNT);
    }

    #[test]
    fn test_move_counter_collection_semantics() {
        let mut game = TilePlacement::new(42);
        game.start();

        game.select_tile(0);
        game.tap_slot(0);
        assert_eq!(game.move_count(), 1);

        // Removing a tile does not refund the move
        game.tap_slot(0);
        assert_eq!(game.move_count(), 1);

        game.select_tile(0);
        game.tap_slot(1);
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn test_placement_requires_selection() {
        let mut game = TilePlacement::new(42);
        game.start();
        game.tap_slot(0);
        assert!(game.slots()[0].is_none());
        assert_eq!(game.move_count(), 0);

        game.select_tile(SLOT_COUNT + 5); // out of range, ignored
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_check_fails_until_all_slots_filled() {
        let mut game = TilePlacement::new(42);
        let mut ledger = ledger();
        game.start();

        for slot in 0..SLOT_COUNT - 1 {
            game.select_tile(0);
            game.tap_slot(slot);
        }
        assert!(!game.check_solution(&mut ledger));
        assert_eq!(game.phase(), PuzzlePhase::Playing);
        assert_eq!(ledger.snapshot().completions, 0);

        game.select_tile(0);
        game.tap_slot(SLOT_COUNT - 1);
        assert!(game.check_solution(&mut ledger));
        assert_eq!(game.phase(), PuzzlePhase::Won);
        // 6 placements: max(3, 10 - 6) = 4 crystals, level 1 star
        assert_eq!(ledger.snapshot().crystals, 4);
        assert_eq!(ledger.snapshot().stars, 1);
        assert_eq!(ledger.snapshot().best_streaks[3], 1);
    }

    #[test]
    fn test_reward_with_four_moves() {
        let mut game = TilePlacement::new(42);
        let mut ledger = ledger();
        game.start();
        place_all(&mut game);
        game.move_count = 4;

        assert!(game.check_solution(&mut ledger));
        assert_eq!(ledger.snapshot().crystals, 6); // max(3, 10 - 4)
        assert_eq!(ledger.snapshot().stars, 1);
    }

    #[test]
    fn test_reward_floor_at_three() {
        let mut game = TilePlacement::new(42);
        let mut ledger = ledger();
        game.start();
        place_all(&mut game);
        game.move_count = 25;

        assert!(game.check_solution(&mut ledger));
        assert_eq!(ledger.snapshot().crystals, 3);
    }

    #[test]
    fn test_reset_keeps_level_and_returns_tiles() {
        let mut game = TilePlacement::new(42);
        game.start();
        game.next_level();
        assert_eq!(game.level(), 2);

        game.select_tile(0);
        game.tap_slot(4);
        game.reset_puzzle();

        assert_eq!(game.level(), 2);
        assert_eq!(game.move_count(), 0);
        assert_eq!(game.pool().len(), SLOT_COUNT);
        assert!(game.slots().iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_won_level_ignores_input_until_next_level() {
        let mut game = TilePlacement::new(42);
        let mut ledger = ledger();
        game.start();
        place_all(&mut game);
        assert!(game.check_solution(&mut ledger));

        game.tap_slot(0);
        assert!(game.slots()[0].is_some());
        assert!(!game.check_solution(&mut ledger));
        assert_eq!(ledger.snapshot().completions, 1);

        game.next_level();
        assert_eq!(game.level(), 2);
        assert_eq!(game.phase(), PuzzlePhase::Playing);
        assert_eq!(game.pool().len(), SLOT_COUNT);
    }

    #[test]
    fn test_determinism() {
        let mut a = TilePlacement::new(7);
        let mut b = TilePlacement::new(7);
        a.start();
        b.start();
        assert_eq!(a.pool(), b.pool());
        a.next_level();
        b.next_level();
        assert_eq!(a.pool(), b.pool());
    }
}
