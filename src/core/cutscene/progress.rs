//=========================================================================
// Progress Store
//=========================================================================
//
// Per-(speaker, flag) integer counters that conversations read and bump,
// e.g. ("granny", "talked") after each chat. Storage format belongs to the
// game; cutscenes only see this trait.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

//=== ProgressStore =======================================================

pub trait ProgressStore {
    fn get(&self, speaker: &str, flag: &str) -> i32;
    fn set(&mut self, speaker: &str, flag: &str, value: i32);

    /// Adds one to the counter and returns the new value.
    fn increment(&mut self, speaker: &str, flag: &str) -> i32 {
        let value = self.get(speaker, flag) + 1;
        self.set(speaker, flag, value);
        value
    }
}

/// Progress store shared between the world and its cutscenes.
pub type SharedProgress = Rc<RefCell<dyn ProgressStore>>;

/// Wraps a store for sharing.
pub fn shared(store: impl ProgressStore + 'static) -> SharedProgress {
    Rc::new(RefCell::new(store))
}

//=== MemoryProgress ======================================================

/// In-memory store; counters start at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryProgress {
    counters: HashMap<(String, String), i32>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgress {
    fn get(&self, speaker: &str, flag: &str) -> i32 {
        self.counters
            .get(&(speaker.to_string(), flag.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn set(&mut self, speaker: &str, flag: &str, value: i32) {
        self.counters.insert((speaker.to_string(), flag.to_string()), value);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
