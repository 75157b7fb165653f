//=========================================================================
// Stage
//=========================================================================
//
// Context handed to every step of a cutscene.
//
// Owns the per-cutscene state steps read and write: this tick's controls,
// the line being presented, the letterbox, the cutscene timer, queued
// audio, named puppets and the shared progress store.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::{Ref, RefMut};
use std::collections::HashMap;

//=== External Dependencies ===============================================

use glam::Vec2;
use rand::{rngs::StdRng, SeedableRng};

//=== Internal Dependencies ===============================================

use super::audio::AudioQueue;
use super::progress::{ProgressStore, SharedProgress};
use crate::core::config::DialogueConfig;
use crate::core::dialogue::{ChoiceSelection, Presentation};
use crate::core::input::Controls;

//=== Pose ================================================================

/// Ground-plane placement of a puppet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec2,

    /// Unit vector the puppet looks along.
    pub facing: Vec2,
}

impl Pose {
    pub fn new(position: Vec2, facing: Vec2) -> Self {
        Self {
            position,
            facing: facing.try_normalize().unwrap_or(Vec2::X),
        }
    }

    pub fn at(position: Vec2) -> Self {
        Self::new(position, Vec2::X)
    }
}

//=== Speech ==============================================================

/// Dialogue state of one cutscene.
#[derive(Debug, Default)]
pub struct Speech {
    /// The line on screen, if any.
    pub presentation: Option<Presentation>,

    /// Highlight cursor, carried across choice menus.
    pub selection: ChoiceSelection,

    /// Choices confirmed by the last finished conversation.
    pub(crate) confirmed: Vec<String>,
}

impl Speech {
    pub fn is_presenting(&self) -> bool {
        self.presentation.is_some()
    }
}

//=== Stage ===============================================================

pub struct Stage {
    /// Menu signals pressed this tick.
    pub controls: Controls,

    pub speech: Speech,

    /// Letterbox bars visibility, 0 to 1.
    pub letterbox: f32,

    /// Seconds since the cutscene started.
    pub timer: f32,

    pub audio: AudioQueue,

    pub puppets: HashMap<String, Pose>,

    /// Random source for markup effects, e.g. `Say::with_rng(lines, &mut stage.rng)`.
    pub rng: StdRng,

    pub config: DialogueConfig,

    progress: SharedProgress,
}

impl Stage {
    pub fn new(config: DialogueConfig, progress: SharedProgress) -> Self {
        Self {
            controls: Controls::NONE,
            speech: Speech::default(),
            letterbox: 0.0,
            timer: 0.0,
            audio: AudioQueue::new(),
            puppets: HashMap::new(),
            rng: StdRng::seed_from_u64(rand::random()),
            config,
            progress,
        }
    }

    /// Replaces the random source, for reproducible shake vectors.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Rebinds the stage to the host's config and progress store.
    pub(crate) fn attach(&mut self, config: DialogueConfig, progress: SharedProgress) {
        self.config = config;
        self.progress = progress;
    }

    //--- Progress ---------------------------------------------------------

    pub fn progress(&self) -> Ref<'_, dyn ProgressStore + 'static> {
        self.progress.borrow()
    }

    pub fn progress_mut(&self) -> RefMut<'_, dyn ProgressStore + 'static> {
        self.progress.borrow_mut()
    }

    pub fn shared_progress(&self) -> &SharedProgress {
        &self.progress
    }

    //--- Puppets ----------------------------------------------------------

    pub fn place(&mut self, name: impl Into<String>, pose: Pose) {
        self.puppets.insert(name.into(), pose);
    }

    pub fn puppet(&self, name: &str) -> Option<&Pose> {
        self.puppets.get(name)
    }

    //--- Dialogue ---------------------------------------------------------

    /// Takes the choices confirmed by the last finished conversation.
    pub fn take_confirmed(&mut self) -> Vec<String> {
        std::mem::take(&mut self.speech.confirmed)
    }
}
