//=========================================================================
// World
//=========================================================================
//
// Hosts the live cutscenes of a running game.
//
// Per tick:
//   1. every live cutscene updates with this tick's controls
//   2. queued audio commands drain into the sink, in cutscene order
//   3. finished cutscenes are removed (failures kept for the host)
//
// Every cutscene draws audio handles from the world's counter, so a
// handle names one sound in the sink whichever cutscene stops it.
//
// Cutscenes advance independently; no ordering between them is promised
// beyond insertion order.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::config::DialogueConfig;
use crate::core::cutscene::audio::{AudioSink, HandleCounter, SilentSink};
use crate::core::cutscene::progress::{shared, MemoryProgress, ProgressStore, SharedProgress};
use crate::core::cutscene::Cutscene;
use crate::core::dialogue::{PortraitCatalog, StageSnapshot};
use crate::core::error::CutsceneError;
use crate::core::input::Controls;

//=== World ===============================================================

pub struct World {
    cutscenes: Vec<Cutscene>,
    config: DialogueConfig,
    progress: SharedProgress,
    audio: Box<dyn AudioSink>,
    handles: HandleCounter,
    failures: Vec<(String, CutsceneError)>,
}

impl World {
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            cutscenes: Vec::new(),
            config,
            progress: shared(MemoryProgress::new()),
            audio: Box::new(SilentSink),
            handles: HandleCounter::new(),
            failures: Vec::new(),
        }
    }

    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = sink;
        self
    }

    /// Replaces the progress store cutscenes read and write.
    pub fn with_progress(mut self, store: impl ProgressStore + 'static) -> Self {
        self.progress = shared(store);
        self
    }

    //--- Cutscenes --------------------------------------------------------

    /// Binds `cutscene` to this world and starts updating it next tick.
    pub fn add(&mut self, mut cutscene: Cutscene) {
        debug!(target: "cutscene", "Adding '{}'", cutscene.name());
        cutscene.attach(self.config.clone(), self.progress.clone());
        cutscene.stage_mut().audio.share_handles(&self.handles);
        self.cutscenes.push(cutscene);
    }

    /// Destroys every cutscene named `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.cutscenes.len();
        for cutscene in self.cutscenes.iter_mut().filter(|c| c.name() == name) {
            cutscene.destroy();
            cutscene.stage_mut().audio.flush(self.audio.as_mut());
        }
        self.cutscenes.retain(|c| c.is_running());

        let removed = before - self.cutscenes.len();
        if removed > 0 {
            debug!(target: "cutscene", "Removed {} × '{}'", removed, name);
        }
        removed
    }

    //--- update() ---------------------------------------------------------

    pub fn update(&mut self, dt: f32, controls: Controls) {
        for cutscene in &mut self.cutscenes {
            cutscene.update(dt, controls);
            cutscene.stage_mut().audio.flush(self.audio.as_mut());
        }

        let failures = &mut self.failures;
        self.cutscenes.retain_mut(|cutscene| {
            if cutscene.is_running() {
                return true;
            }
            debug!(target: "cutscene", "'{}' removed", cutscene.name());
            if let Some(err) = cutscene.take_failure() {
                failures.push((cutscene.name().to_string(), err));
            }
            false
        });
    }

    //--- Queries ----------------------------------------------------------

    /// True while any live cutscene asked to freeze everything else.
    pub fn freeze_requested(&self) -> bool {
        self.cutscenes.iter().any(Cutscene::freezes_game)
    }

    pub fn is_idle(&self) -> bool {
        self.cutscenes.is_empty()
    }

    pub fn cutscenes(&self) -> &[Cutscene] {
        &self.cutscenes
    }

    pub fn get(&self, name: &str) -> Option<&Cutscene> {
        self.cutscenes.iter().find(|c| c.name() == name)
    }

    pub fn progress(&self) -> &SharedProgress {
        &self.progress
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// Per-frame view of every live cutscene, in update order.
    pub fn snapshots(&self, portraits: &dyn PortraitCatalog) -> Vec<(&str, StageSnapshot)> {
        self.cutscenes
            .iter()
            .map(|c| (c.name(), c.snapshot(portraits)))
            .collect()
    }

    /// Errors that halted cutscenes since the last call.
    pub fn take_failures(&mut self) -> Vec<(String, CutsceneError)> {
        std::mem::take(&mut self.failures)
    }
}

impl Drop for World {
    fn drop(&mut self) {
        for cutscene in &mut self.cutscenes {
            cutscene.destroy();
            cutscene.stage_mut().audio.flush(self.audio.as_mut());
        }
        if !self.cutscenes.is_empty() {
            info!(target: "cutscene", "World dropped with {} live cutscenes", self.cutscenes.len());
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
