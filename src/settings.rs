//! Persisted preferences
//!
//! String-keyed ints and strings behind a small store trait, mirroring a
//! platform preference registry. The simulation reads one gameplay key
//! (hold-to-attract); binding overrides and level-completion flags are
//! opaque to everything but the frontend that writes them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const HOLD_TO_ATTRACT_KEY: &str = "Hold to Attract";
pub const BINDING_OVERRIDES_KEY: &str = "Binding Overrides";
pub const DIFFICULTY_KEY: &str = "Difficulty";

/// Backing store for preference values
pub trait PrefStore {
    fn get_int(&self, key: &str) -> Option<i32>;
    fn set_int(&mut self, key: &str, value: i32);
    fn get_string(&self, key: &str) -> Option<&str>;
    fn set_string(&mut self, key: &str, value: String);
    fn has(&self, key: &str) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PrefValue {
    Int(i32),
    Str(String),
}

/// In-memory store, snapshot-able to JSON
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    values: HashMap<String, PrefValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl PrefStore for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i32> {
        match self.values.get(key) {
            Some(PrefValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_owned(), PrefValue::Int(value));
    }

    fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PrefValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), PrefValue::Str(value));
    }

    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Typed view over a [`PrefStore`]. The hold-to-attract flag carries a
/// poll-style change notification so the input layer can re-read it
/// without holding a callback into the settings screen.
pub struct Preferences<S: PrefStore> {
    store: S,
    attract_changed: bool,
}

impl<S: PrefStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            attract_changed: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether holding the launch button while a magnet is out attracts
    pub fn hold_to_attract(&self) -> bool {
        self.store.get_int(HOLD_TO_ATTRACT_KEY).unwrap_or(0) != 0
    }

    pub fn set_hold_to_attract(&mut self, on: bool) {
        let prev = self.hold_to_attract();
        self.store.set_int(HOLD_TO_ATTRACT_KEY, i32::from(on));
        if prev != on {
            self.attract_changed = true;
            log::debug!("hold-to-attract preference set to {on}");
        }
    }

    /// True once per change; consuming the flag clears it
    pub fn take_attract_changed(&mut self) -> bool {
        std::mem::take(&mut self.attract_changed)
    }

    /// Opaque input-binding override blob owned by the rebinding screen
    pub fn binding_overrides(&self) -> Option<&str> {
        self.store.get_string(BINDING_OVERRIDES_KEY)
    }

    pub fn set_binding_overrides(&mut self, blob: String) {
        self.store.set_string(BINDING_OVERRIDES_KEY, blob);
    }

    pub fn clear_binding_overrides(&mut self) {
        // Writing again with an empty blob matches a reset-to-defaults;
        // the attract flag resets alongside it
        self.store.set_string(BINDING_OVERRIDES_KEY, String::new());
        self.set_hold_to_attract(false);
    }

    pub fn difficulty(&self) -> i32 {
        self.store.get_int(DIFFICULTY_KEY).unwrap_or(0)
    }

    pub fn set_difficulty(&mut self, difficulty: i32) {
        self.store.set_int(DIFFICULTY_KEY, difficulty);
    }

    pub fn level_completed(&self, level: u32) -> bool {
        self.store.get_int(&level_key(level)).unwrap_or(0) != 0
    }

    pub fn set_level_completed(&mut self, level: u32) {
        self.store.set_int(&level_key(level), 1);
        log::info!("level {level} marked complete");
    }
}

fn level_key(level: u32) -> String {
    format!("Level {level} Complete")
}
