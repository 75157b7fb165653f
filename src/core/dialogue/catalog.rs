//=========================================================================
// Line Catalog
//=========================================================================
//
// Named conversations loaded from JSON:
//
// ```text
// {
//   "granny": [
//     { "id": "hi", "face": "granny", "text": "Hello!", "choices": ["bye"] },
//     { "id": "bye", "face": "granny", "text": "Bye now.", "end": true }
//   ]
// }
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;

//=== External Dependencies ===============================================

use log::debug;
use serde::Deserialize;

//=== Internal Dependencies ===============================================

use super::line::DialogueLine;
use crate::core::error::CutsceneError;

//=== LineCatalog =========================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LineCatalog {
    conversations: HashMap<String, Vec<DialogueLine>>,
}

impl LineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self, CutsceneError> {
        let catalog: LineCatalog = serde_json::from_str(json)?;
        debug!(target: "dialogue", "Loaded {} conversations", catalog.conversations.len());
        Ok(catalog)
    }

    pub fn insert(&mut self, key: impl Into<String>, lines: Vec<DialogueLine>) {
        self.conversations.insert(key.into(), lines);
    }

    /// A copy of the conversation stored under `key`.
    pub fn lines(&self, key: &str) -> Option<Vec<DialogueLine>> {
        self.conversations.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.conversations.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
