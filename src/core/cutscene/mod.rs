//=========================================================================
// Cutscene Orchestrator
//=========================================================================
//
// Host of one scripted sequence: a stage, a scheduler and the author's
// top-level step.
//
// Lifetime:
// ```text
//   readsign_in → letterbox eases in → author step → readsign_out
//     → letterbox eases out → dialog bus stopped → finished
// ```
//
// However it ends (finishing, failing or `destroy`), the cutscene stops
// its dialog snapshot and the dialog bus. A failure is logged and kept.
// Cancelled steps get no unwind hook, so whoever stops a cutscene must
// release its audio here.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod audio;
pub mod motion;
pub mod progress;
mod stage;

//=== External Dependencies ===============================================

use log::{debug, error};

//=== Internal Dependencies ===============================================

use crate::core::config::DialogueConfig;
use crate::core::coroutine::{BoxedStep, Resume, Scheduler, Step};
use crate::core::dialogue::{PortraitCatalog, StageSnapshot};
use crate::core::ease::approach;
use crate::core::error::CutsceneError;
use crate::core::input::Controls;
use audio::cues;
use progress::{shared, MemoryProgress, SharedProgress};

//=== Public API ==========================================================

pub use stage::{Pose, Speech, Stage};

//=== Types ===============================================================

type Author = Box<dyn FnOnce(&mut Stage) -> Result<BoxedStep<Stage>, CutsceneError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutsceneStatus {
    Running,
    Finished,
}

//=== Perform =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Act {
    Opening,
    EasingIn,
    Author,
    Closing,
    EasingOut,
}

/// Wraps the author step with the sign cues and letterbox easing.
struct Perform {
    act: Act,
    author: Option<Author>,
}

impl Step<Stage> for Perform {
    fn resume(&mut self, stage: &mut Stage, dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        let rate = stage.config.letterbox_ease_rate;

        loop {
            match self.act {
                Act::Opening => {
                    stage.audio.play(cues::READSIGN_IN);
                    self.act = Act::EasingIn;
                }
                Act::EasingIn => {
                    if stage.letterbox >= 1.0 {
                        self.act = Act::Author;
                        continue;
                    }
                    stage.letterbox = approach(stage.letterbox, 1.0, dt * rate);
                    return Ok(Resume::frame());
                }
                Act::Author => {
                    self.act = Act::Closing;
                    if let Some(author) = self.author.take() {
                        return Ok(Resume::await_boxed(author(stage)?));
                    }
                }
                Act::Closing => {
                    stage.audio.play(cues::READSIGN_OUT);
                    self.act = Act::EasingOut;
                }
                Act::EasingOut => {
                    if stage.letterbox <= 0.0 {
                        return Ok(Resume::Done);
                    }
                    stage.letterbox = approach(stage.letterbox, 0.0, dt * rate);
                    return Ok(Resume::frame());
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "perform"
    }
}

//=== Cutscene ============================================================

pub struct Cutscene {
    name: String,
    stage: Stage,
    scheduler: Scheduler<Stage>,
    freeze_game: bool,
    finished: bool,
    failure: Option<CutsceneError>,
}

impl Cutscene {
    /// Creates a cutscene that runs the step built by `author` once the
    /// letterbox is in.
    ///
    /// # Example
    ///
    /// ```
    /// use aetheric_cutscene::core::coroutine::Wait;
    /// use aetheric_cutscene::core::cutscene::Cutscene;
    ///
    /// let cutscene = Cutscene::new("pause", |_stage| Ok(Wait::new(1.0)));
    /// assert!(cutscene.is_running());
    /// ```
    pub fn new<F, S>(name: impl Into<String>, author: F) -> Self
    where
        F: FnOnce(&mut Stage) -> Result<S, CutsceneError> + 'static,
        S: Step<Stage> + 'static,
    {
        let author: Author = Box::new(move |stage| {
            let step: BoxedStep<Stage> = Box::new(author(stage)?);
            Ok(step)
        });

        let mut scheduler = Scheduler::new();
        scheduler.run_step(Perform {
            act: Act::Opening,
            author: Some(author),
        });

        Self {
            name: name.into(),
            stage: Stage::new(DialogueConfig::default(), shared(MemoryProgress::new())),
            scheduler,
            freeze_game: false,
            finished: false,
            failure: None,
        }
    }

    /// Asks the world to freeze everything except this cutscene.
    pub fn with_freeze_game(mut self, freeze: bool) -> Self {
        self.freeze_game = freeze;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.stage = self.stage.with_seed(seed);
        self
    }

    /// Binds the cutscene to its host before the first update.
    pub fn attach(&mut self, config: DialogueConfig, progress: SharedProgress) {
        self.stage.attach(config, progress);
    }

    //--- Update -----------------------------------------------------------

    /// Advances the cutscene by one tick with this tick's `controls`.
    pub fn update(&mut self, dt: f32, controls: Controls) -> CutsceneStatus {
        if self.finished {
            return CutsceneStatus::Finished;
        }

        self.stage.controls = controls;
        let result = self.scheduler.update(&mut self.stage, dt);
        self.stage.timer += dt;
        self.stage.controls = Controls::NONE;

        match result {
            Ok(()) if self.scheduler.is_running() => CutsceneStatus::Running,
            Ok(()) => {
                debug!(target: "cutscene", "'{}' finished after {:.2}s", self.name, self.stage.timer);
                self.release_audio();
                self.finished = true;
                CutsceneStatus::Finished
            }
            Err(err) => {
                error!(target: "cutscene", "'{}' halted: {}", self.name, err);
                self.failure = Some(err);
                self.destroy();
                CutsceneStatus::Finished
            }
        }
    }

    /// Stops the cutscene now, releasing the dialog snapshot and the
    /// dialog bus.
    pub fn destroy(&mut self) {
        self.release_audio();
        self.scheduler.cancel();
        self.finished = true;
    }

    fn release_audio(&mut self) {
        if let Some(presentation) = self.stage.speech.presentation.take() {
            if let Some(handle) = presentation.snapshot() {
                self.stage.audio.stop(handle);
            }
        }
        self.stage.audio.stop_bus(cues::BUS_DIALOG);
    }

    //--- Queries ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        !self.finished
    }

    pub fn freezes_game(&self) -> bool {
        self.freeze_game
    }

    /// The error that halted the cutscene, if any.
    pub fn failure(&self) -> Option<&CutsceneError> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<CutsceneError> {
        self.failure.take()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn snapshot(&self, portraits: &dyn PortraitCatalog) -> StageSnapshot {
        StageSnapshot::capture(&self.stage, portraits)
    }
}

impl std::fmt::Debug for Cutscene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cutscene")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .field("freeze_game", &self.freeze_game)
            .field("failure", &self.failure)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coroutine::{step_fn, Script, Wait};
    use crate::core::cutscene::audio::AudioCommand;
    use crate::core::dialogue::{DialogueLine, Say, SayLine};
    use crate::core::input::MenuAction;
    use std::collections::HashSet;

    const DT: f32 = 0.05;

    fn cues_of(cutscene: &Cutscene) -> Vec<String> {
        cutscene
            .stage()
            .audio
            .commands()
            .iter()
            .map(|command| match command {
                AudioCommand::Play { cue, .. } => cue.clone(),
                AudioCommand::Stop { .. } => "stop".to_string(),
                AudioCommand::StopBus { bus } => bus.clone(),
            })
            .collect()
    }

    //--- Lifecycle --------------------------------------------------------

    #[test]
    fn letterbox_eases_in_before_author_step() {
        let mut cutscene = Cutscene::new("flag", |_| {
            Ok(step_fn(|stage: &mut Stage, _| {
                assert_eq!(stage.letterbox, 1.0);
                stage.place("started", Pose::at(glam::Vec2::ZERO));
                Ok(Resume::Done)
            }))
        });

        // Two ticks at 10/s with dt 0.05 reach the top.
        cutscene.update(DT, Controls::NONE);
        cutscene.update(DT, Controls::NONE);
        assert!(cutscene.stage().puppet("started").is_none());

        cutscene.update(DT, Controls::NONE);
        assert!(cutscene.stage().puppet("started").is_some());
    }

    #[test]
    fn letterbox_eases_out_before_finishing() {
        let mut cutscene = Cutscene::new("empty", |_| Ok(Wait::new(0.0)));

        let mut ticks = 0;
        while cutscene.update(DT, Controls::NONE) == CutsceneStatus::Running {
            ticks += 1;
            assert!(ticks < 100);
        }

        assert!(!cutscene.is_running());
        assert_eq!(cutscene.stage().letterbox, 0.0);
        assert_eq!(
            cues_of(&cutscene),
            vec![cues::READSIGN_IN, cues::READSIGN_OUT, cues::BUS_DIALOG]
        );
        assert!(cutscene.failure().is_none());
    }

    #[test]
    fn timer_counts_every_update() {
        let mut cutscene = Cutscene::new("wait", |_| Ok(Wait::new(10.0)));
        for _ in 0..4 {
            cutscene.update(DT, Controls::NONE);
        }
        assert!((cutscene.stage().timer - 0.2).abs() < 1e-6);
    }

    #[test]
    fn freeze_flag_is_only_reported() {
        let cutscene = Cutscene::new("freeze", |_| Ok(Wait::new(1.0))).with_freeze_game(true);
        assert!(cutscene.freezes_game());
    }

    //--- Failure & Cleanup ------------------------------------------------

    #[test]
    fn failing_author_halts_and_records_error() {
        let mut cutscene = Cutscene::new("broken", |_| {
            Say::new(vec![DialogueLine::new("x", "theo", "<wavy offset=\"far\">no</wavy>")])
        });

        let mut status = CutsceneStatus::Running;
        for _ in 0..10 {
            status = cutscene.update(DT, Controls::NONE);
        }
        assert_eq!(status, CutsceneStatus::Finished);
        assert!(matches!(cutscene.failure(), Some(CutsceneError::Markup { .. })));
        assert_eq!(cues_of(&cutscene).last().map(String::as_str), Some(cues::BUS_DIALOG));
    }

    #[test]
    fn destroy_releases_dialog_audio_mid_line() {
        let mut cutscene = Cutscene::new("chat", |_| {
            Ok(Script::new().then(|_| {
                let step: BoxedStep<Stage> =
                    Box::new(Say::new(vec![DialogueLine::new("a", "granny", "Hello there")])?);
                Ok(step)
            }))
        });
        for _ in 0..6 {
            cutscene.update(DT, Controls::NONE);
        }
        let snapshot = cutscene
            .stage()
            .speech
            .presentation
            .as_ref()
            .and_then(|p| p.snapshot())
            .unwrap();

        cutscene.destroy();
        assert!(!cutscene.is_running());
        assert!(cutscene.stage().speech.presentation.is_none());

        let commands = cutscene.stage().audio.commands();
        assert!(commands.contains(&AudioCommand::Stop { handle: snapshot }));
        assert_eq!(
            commands.last(),
            Some(&AudioCommand::StopBus { bus: cues::BUS_DIALOG.to_string() })
        );
        assert_eq!(cutscene.update(DT, Controls::NONE), CutsceneStatus::Finished);
    }

    #[test]
    fn finishing_on_its_own_stops_the_dialog_bus() {
        let mut cutscene = Cutscene::new("sign", |_| SayLine::new("", "Hi", Some("granny")));
        let confirm = Controls::pressed(&[MenuAction::Confirm]);

        let mut ticks = 0;
        while cutscene.update(DT, confirm) == CutsceneStatus::Running {
            ticks += 1;
            assert!(ticks < 200);
        }

        assert!(cutscene.failure().is_none());
        let commands = cutscene.stage().audio.commands();
        let out = commands
            .iter()
            .position(|c| matches!(c, AudioCommand::Play { cue, .. } if cue == cues::READSIGN_OUT))
            .unwrap();
        assert_eq!(
            commands[out + 1..],
            [AudioCommand::StopBus { bus: cues::BUS_DIALOG.to_string() }]
        );
    }

    //--- Dialogue ---------------------------------------------------------

    #[test]
    fn controls_reach_the_presentation() {
        let mut cutscene = Cutscene::new("sign", |_| {
            Say::new(vec![DialogueLine::new("a", "", "Keep out")])
        });

        for _ in 0..4 {
            cutscene.update(DT, Controls::NONE);
        }
        assert!(cutscene.stage().speech.is_presenting());

        // Skip the reveal, then close.
        let confirm = Controls::pressed(&[MenuAction::Confirm]);
        for _ in 0..3 {
            cutscene.update(DT, Controls::NONE);
        }
        cutscene.update(DT, confirm);
        let line = cutscene.snapshot(&HashSet::new()).line.unwrap();
        assert_eq!(line.text, "Keep out");
        assert_eq!(line.face, None);

        let mut ticks = 0;
        while cutscene.update(DT, confirm) == CutsceneStatus::Running {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(cutscene.failure().is_none());
    }
}
