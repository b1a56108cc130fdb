//! Cross-game progress ledger
//!
//! One consistent source of truth for currencies, completions, and per-game
//! best streaks. The ledger is loaded once at startup and is the only thing
//! in the crate that touches durable storage; every mutation rewrites every
//! field synchronously, so there is no dirty tracking and no partial-write
//! recovery to reason about.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::games::GameId;

/// Storage keys. These keep the names the shipped app used, so an existing
/// install's progress survives a storage-backend swap.
const KEY_CRYSTALS: &str = "totalFeathers";
const KEY_STARS: &str = "totalLanterns";
const KEY_COMPLETIONS: &str = "totalCrossingsCompleted";
const KEY_STREAKS: [&str; 4] = [
    "bestStreakGame1",
    "bestStreakGame2",
    "bestStreakGame3",
    "bestStreakGame4",
];
const KEY_ONBOARDING: &str = "hasCompletedOnboarding";

/// Synchronous durable key-value storage.
///
/// Reads never fail: absent or unreadable keys yield zero/false. Writes are
/// expected to be durable when they return; a failing backend logs and drops
/// the write rather than surfacing an error into the simulation core.
pub trait KvStore {
    fn get_int(&self, key: &str) -> i64;
    fn get_bool(&self, key: &str) -> bool;
    fn set_int(&mut self, key: &str, value: i64);
    fn set_bool(&mut self, key: &str, value: bool);
}

/// A single stored value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoreValue {
    Bool(bool),
    Int(i64),
}

/// In-memory store for tests and embedding without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, StoreValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_int(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(StoreValue::Int(v)) => *v,
            _ => 0,
        }
    }

    fn get_bool(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(StoreValue::Bool(v)) => *v,
            _ => false,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoreValue::Int(value));
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), StoreValue::Bool(value));
    }
}

/// File-backed store: one flat JSON object, rewritten on every set.
///
/// Corrupt or missing files start fresh instead of failing.
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, StoreValue>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(values) => {
                    log::info!("Loaded progress store from {}", path.display());
                    values
                }
                Err(err) => {
                    log::warn!("Progress store corrupt ({err}), starting fresh");
                    HashMap::new()
                }
            },
            Err(_) => {
                log::info!("No progress store at {}, starting fresh", path.display());
                HashMap::new()
            }
        };
        Self { path, values }
    }

    fn flush(&self) {
        match serde_json::to_string(&self.values) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    log::warn!("Failed to write progress store: {err}");
                }
            }
            Err(err) => log::warn!("Failed to serialize progress store: {err}"),
        }
    }
}

impl KvStore for JsonFileStore {
    fn get_int(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(StoreValue::Int(v)) => *v,
            _ => 0,
        }
    }

    fn get_bool(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(StoreValue::Bool(v)) => *v,
            _ => false,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoreValue::Int(value));
        self.flush();
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), StoreValue::Bool(value));
        self.flush();
    }
}

/// Persisted progress totals.
///
/// All counters are high-water marks or running sums: nothing here decreases
/// except through an explicit [`ProgressLedger::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Primary currency (crystals)
    pub crystals: u64,
    /// Secondary currency (stars)
    pub stars: u64,
    /// Total rewarded game completions across all four games
    pub completions: u64,
    /// Per-game best streaks, indexed by `GameId as usize - 1`
    pub best_streaks: [u64; 4],
    /// First-run onboarding finished
    pub onboarding_done: bool,
}

/// The shared progress ledger.
///
/// Owned once by the host and passed to each game engine call that can reach
/// a terminal state. All calls arrive on the host's single-threaded scheduler;
/// a parallel host must serialize access itself since every mutation is a
/// read-modify-persist.
pub struct ProgressLedger {
    snapshot: ProgressSnapshot,
    store: Box<dyn KvStore>,
}

impl ProgressLedger {
    /// Load all fields from the store, defaulting absent keys to zero/false.
    pub fn load(store: Box<dyn KvStore>) -> Self {
        let snapshot = ProgressSnapshot {
            crystals: store.get_int(KEY_CRYSTALS).max(0) as u64,
            stars: store.get_int(KEY_STARS).max(0) as u64,
            completions: store.get_int(KEY_COMPLETIONS).max(0) as u64,
            best_streaks: [
                store.get_int(KEY_STREAKS[0]).max(0) as u64,
                store.get_int(KEY_STREAKS[1]).max(0) as u64,
                store.get_int(KEY_STREAKS[2]).max(0) as u64,
                store.get_int(KEY_STREAKS[3]).max(0) as u64,
            ],
            onboarding_done: store.get_bool(KEY_ONBOARDING),
        };
        log::info!(
            "Progress loaded: {} crystals, {} stars, {} completions",
            snapshot.crystals,
            snapshot.stars,
            snapshot.completions
        );
        Self { snapshot, store }
    }

    /// Read access for the settings/stats surface.
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Add a reward and count the completion. No upper bound.
    pub fn earn_reward(&mut self, crystals: u64, stars: u64) {
        self.snapshot.crystals += crystals;
        self.snapshot.stars += stars;
        self.snapshot.completions += 1;
        self.persist();
    }

    /// Raise a game's best streak to `value` if it beats the stored one.
    pub fn update_best_streak(&mut self, game: GameId, value: u64) {
        let slot = &mut self.snapshot.best_streaks[game.index()];
        if value > *slot {
            *slot = value;
        }
        self.persist();
    }

    /// Untyped variant for boundaries that carry the game as a number.
    /// A number outside 1..=4 is a no-op.
    pub fn update_best_streak_raw(&mut self, game_number: u8, value: u64) {
        if let Some(game) = GameId::from_number(game_number) {
            self.update_best_streak(game, value);
        }
    }

    /// Mark first-run onboarding finished.
    pub fn complete_onboarding(&mut self) {
        self.snapshot.onboarding_done = true;
        self.persist();
    }

    /// Zero currencies, completions, and all best streaks. The onboarding
    /// flag is untouched: first-run gating is independent of progress.
    pub fn reset(&mut self) {
        self.snapshot.crystals = 0;
        self.snapshot.stars = 0;
        self.snapshot.completions = 0;
        self.snapshot.best_streaks = [0; 4];
        self.persist();
        log::info!("Progress reset");
    }

    /// Write every field back to the store.
    fn persist(&mut self) {
        self.store.set_int(KEY_CRYSTALS, self.snapshot.crystals as i64);
        self.store.set_int(KEY_STARS, self.snapshot.stars as i64);
        self.store
            .set_int(KEY_COMPLETIONS, self.snapshot.completions as i64);
        for (key, value) in KEY_STREAKS.iter().zip(self.snapshot.best_streaks) {
            self.store.set_int(key, value as i64);
        }
        self.store
            .set_bool(KEY_ONBOARDING, self.snapshot.onboarding_done);
    }
}
