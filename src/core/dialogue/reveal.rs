//=========================================================================
// Reveal State Machine
//=========================================================================
//
// Presents one line of dialogue: eases the box in, reveals characters
// over time, waits for the player, optionally runs a choice menu, eases
// the box out.
//
// Phases:
// ```text
//   EasingIn ─> Revealing ─> Settling ─┬─> Choosing ─> Confirmed ─┐
//                                      └─> AwaitingClose ─────────┴─> EasingOut ─> Finished
// ```
//
// Several phases may run within one tick: a phase either yields (done
// for this tick) or hands over to the next one immediately.
//
// A confirm/cancel press during EasingIn, Revealing or Settling
// fast-forwards: every char becomes visible and the elapsed time snaps to
// the total duration. A press is consumed by the first phase that acts
// on it, so one press never both fast-forwards and closes the line.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::config::DialogueConfig;
use crate::core::coroutine::WAIT_EPSILON;
use crate::core::cutscene::audio::{cues, AudioHandle, AudioQueue};
use crate::core::ease::approach;
use crate::core::input::Controls;
use crate::core::markup::Document;

use super::choice::ChoiceSelection;

//=== Phase ===============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    EasingIn,
    Revealing,
    Settling,
    Choosing,
    Confirmed,
    AwaitingClose,
    EasingOut,
    Finished,
}

/// Result of advancing a presentation by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStatus {
    Running,
    Finished,
}

enum Flow {
    Yield,
    Next,
}

//=== ChoiceView ==========================================================

/// One entry of a choice menu: the line it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceView {
    /// Identifier of the target line.
    pub target: String,

    /// Face key of the target line's speaker.
    pub face: Option<String>,

    /// Parsed text of the target line; `None` when the target is not in
    /// the conversation (the entry is listed but not drawn).
    pub document: Option<Document>,
}

//=== Presentation ========================================================

/// Mutable state of the line currently on screen.
#[derive(Debug, Clone)]
pub struct Presentation {
    face: Option<String>,
    voice: Option<String>,
    document: Document,
    choices: Vec<ChoiceView>,
    phase: Phase,

    //--- Reveal -----------------------------------------------------------
    revealed: usize,
    time: f32,
    total: f32,
    pending_delay: f32,
    counter: f32,
    talking: bool,

    //--- Visuals ----------------------------------------------------------
    ease: f32,
    choice_ease: f32,
    highlight_ease: f32,

    snapshot: Option<AudioHandle>,
}

impl Presentation {
    /// Starts presenting `document` and opens the dialog mix snapshot.
    pub fn open(
        face: Option<String>,
        document: Document,
        voice: Option<String>,
        choices: Vec<ChoiceView>,
        config: &DialogueConfig,
        audio: &mut AudioQueue,
    ) -> Self {
        let total = document.total_duration(config.character_interval, config.character_ease_in);
        let snapshot = audio.play(cues::SNAPSHOT_DIALOG);

        trace!(
            target: "dialogue",
            "Presenting {} chars ({} choices), total {:.3}s",
            document.len(),
            choices.len(),
            total
        );

        Self {
            face,
            voice,
            document,
            choices,
            phase: Phase::EasingIn,
            revealed: 0,
            time: 0.0,
            total,
            pending_delay: 0.0,
            counter: 0.0,
            talking: false,
            ease: 0.0,
            choice_ease: 0.0,
            highlight_ease: 0.0,
            snapshot: Some(snapshot),
        }
    }

    //--- advance() --------------------------------------------------------

    /// Advances the presentation by one tick.
    pub fn advance(
        &mut self,
        dt: f32,
        controls: Controls,
        selection: &mut ChoiceSelection,
        audio: &mut AudioQueue,
        config: &DialogueConfig,
    ) -> RevealStatus {
        let mut controls = controls;

        loop {
            let flow = match self.phase {
                Phase::EasingIn => self.ease_in(dt, &mut controls, audio, config),
                Phase::Revealing => self.reveal(dt, &mut controls, config),
                Phase::Settling => self.settle(dt, &mut controls, selection),
                Phase::Choosing => self.choose(dt, &mut controls, selection, config),
                Phase::Confirmed => self.close(audio),
                Phase::AwaitingClose => {
                    if controls.skip() {
                        controls = Controls::NONE;
                        self.close(audio)
                    } else {
                        Flow::Yield
                    }
                }
                Phase::EasingOut => self.ease_out(dt, audio, config),
                Phase::Finished => return RevealStatus::Finished,
            };

            if let Flow::Yield = flow {
                return RevealStatus::Running;
            }
        }
    }

    /// Makes every char visible and snaps time to the total duration.
    pub fn fast_forward(&mut self) {
        self.revealed = self.document.len();
        self.time = self.total;
        self.pending_delay = 0.0;
        self.counter = 0.0;
    }

    //--- Phases -----------------------------------------------------------

    fn ease_in(
        &mut self,
        dt: f32,
        controls: &mut Controls,
        audio: &mut AudioQueue,
        config: &DialogueConfig,
    ) -> Flow {
        if controls.skip() {
            *controls = Controls::NONE;
            self.fast_forward();
        }

        if self.ease >= 1.0 {
            self.ease = 1.0;
            if let Some(voice) = &self.voice {
                audio.play(cues::voice(voice));
            }
            self.talking = self.document.len() > config.talking_threshold;
            self.phase = Phase::Revealing;
            return Flow::Next;
        }

        self.ease = (self.ease + dt * config.box_ease_rate).min(1.0);
        Flow::Yield
    }

    fn reveal(&mut self, dt: f32, controls: &mut Controls, config: &DialogueConfig) -> Flow {
        let len = self.document.len();
        if self.revealed >= len {
            self.phase = Phase::Settling;
            return Flow::Next;
        }

        if controls.skip() {
            *controls = Controls::NONE;
            self.fast_forward();
            return Flow::Yield;
        }

        self.time += dt;

        if self.pending_delay > 0.0 {
            self.pending_delay -= dt;
            if self.pending_delay > WAIT_EPSILON {
                return Flow::Yield;
            }
            self.pending_delay = 0.0;
            self.revealed += 1;
        }

        self.counter += dt / config.character_interval;
        while self.counter >= 1.0 && self.revealed < len {
            self.counter -= 1.0;

            let delay = self.document.delay_at(self.revealed);
            if delay > 0.0 {
                self.pending_delay = delay;
                break;
            }
            self.revealed += 1;
        }

        Flow::Yield
    }

    fn settle(&mut self, dt: f32, controls: &mut Controls, selection: &mut ChoiceSelection) -> Flow {
        if self.time >= self.total {
            self.talking = false;
            self.phase = if self.choices.is_empty() {
                Phase::AwaitingClose
            } else {
                selection.open(self.choices.len());
                Phase::Choosing
            };
            return Flow::Next;
        }

        self.time += dt;
        if controls.skip() {
            *controls = Controls::NONE;
            self.fast_forward();
        }
        Flow::Yield
    }

    fn choose(
        &mut self,
        dt: f32,
        controls: &mut Controls,
        selection: &mut ChoiceSelection,
        config: &DialogueConfig,
    ) -> Flow {
        let count = self.choices.len();
        self.choice_ease += dt;
        self.highlight_ease = approach(self.highlight_ease, 1.0, dt * config.highlight_ease_rate);

        if controls.skip() {
            *controls = Controls::NONE;
            self.choice_ease = config.choice_list_ease_time(count);
            let index = selection.confirm();
            trace!(target: "dialogue", "Confirmed choice {} ('{}')", index, self.choices[index].target);
            self.phase = Phase::Confirmed;
            return Flow::Yield;
        }

        if controls.up {
            selection.move_up(count);
            self.highlight_ease = 0.0;
        } else if controls.down {
            selection.move_down(count);
            self.highlight_ease = 0.0;
        }
        Flow::Yield
    }

    fn close(&mut self, audio: &mut AudioQueue) -> Flow {
        audio.play(cues::DIALOG_ADVANCE);
        self.phase = Phase::EasingOut;
        Flow::Next
    }

    fn ease_out(&mut self, dt: f32, audio: &mut AudioQueue, config: &DialogueConfig) -> Flow {
        if self.ease <= 0.0 {
            self.ease = 0.0;
            if let Some(handle) = self.snapshot.take() {
                audio.stop(handle);
            }
            self.phase = Phase::Finished;
            return Flow::Next;
        }

        self.ease = (self.ease - dt * config.box_ease_rate).max(0.0);
        Flow::Yield
    }

    //--- Queries ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn face(&self) -> Option<&str> {
        self.face.as_deref()
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn choices(&self) -> &[ChoiceView] {
        &self.choices
    }

    /// Number of chars currently visible.
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.revealed >= self.document.len()
    }

    /// Visible prefix of the flat text.
    pub fn visible_text(&self) -> &str {
        self.document.visible(self.revealed)
    }

    /// Seconds elapsed since the reveal started.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn total_duration(&self) -> f32 {
        self.total
    }

    pub fn pending_delay(&self) -> f32 {
        self.pending_delay
    }

    pub fn is_talking(&self) -> bool {
        self.talking
    }

    /// Box visibility, 0 (hidden) to 1 (shown).
    pub fn ease(&self) -> f32 {
        self.ease
    }

    pub fn choice_ease(&self) -> f32 {
        self.choice_ease
    }

    pub fn highlight_ease(&self) -> f32 {
        self.highlight_ease
    }

    /// Handle of the dialog snapshot while it is playing.
    pub fn snapshot(&self) -> Option<AudioHandle> {
        self.snapshot
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cutscene::audio::AudioCommand;
    use crate::core::input::MenuAction;
    use crate::core::markup::parse_with_rng;
    use rand::{rngs::StdRng, SeedableRng};

    // Binary-exact timings: 1/32 s ticks, one char per tick, four ticks
    // of box easing.
    const DT: f32 = 1.0 / 32.0;

    struct Harness {
        presentation: Presentation,
        selection: ChoiceSelection,
        audio: AudioQueue,
        config: DialogueConfig,
    }

    impl Harness {
        fn new(markup: &str, choices: &[&str]) -> Self {
            let config = DialogueConfig::default()
                .with_character_interval(DT)
                .with_box_ease_rate(8.0);
            let document = parse_with_rng(markup, &mut StdRng::seed_from_u64(1)).unwrap();
            let choices = choices
                .iter()
                .map(|target| ChoiceView {
                    target: target.to_string(),
                    face: None,
                    document: None,
                })
                .collect();

            let mut audio = AudioQueue::new();
            let presentation = Presentation::open(
                Some("faces/granny".into()),
                document,
                Some("granny".into()),
                choices,
                &config,
                &mut audio,
            );

            Self {
                presentation,
                selection: ChoiceSelection::new(),
                audio,
                config,
            }
        }

        fn tick(&mut self, pressed: &[MenuAction]) -> RevealStatus {
            self.presentation.advance(
                DT,
                Controls::pressed(pressed),
                &mut self.selection,
                &mut self.audio,
                &self.config,
            )
        }

        fn idle(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.tick(&[]);
            }
        }

        fn cues(&self) -> Vec<String> {
            self.audio
                .commands()
                .iter()
                .map(|command| match command {
                    AudioCommand::Play { cue, .. } => cue.clone(),
                    AudioCommand::Stop { .. } => "stop".to_string(),
                    AudioCommand::StopBus { bus } => bus.clone(),
                })
                .collect()
        }
    }

    //--- Easing In --------------------------------------------------------

    #[test]
    fn no_chars_reveal_while_easing_in() {
        let mut h = Harness::new("Hello", &[]);
        for _ in 0..4 {
            h.tick(&[]);
            assert_eq!(h.presentation.revealed(), 0);
            assert_eq!(h.presentation.phase(), Phase::EasingIn);
        }
        assert_eq!(h.presentation.ease(), 1.0);

        h.tick(&[]);
        assert_eq!(h.presentation.phase(), Phase::Revealing);
        assert_eq!(h.presentation.revealed(), 1);
    }

    #[test]
    fn voice_cue_plays_when_reveal_starts() {
        let mut h = Harness::new("Hello", &[]);
        h.idle(4);
        assert_eq!(h.cues(), vec![cues::SNAPSHOT_DIALOG]);

        h.tick(&[]);
        assert_eq!(
            h.cues(),
            vec![cues::SNAPSHOT_DIALOG.to_string(), cues::voice("granny")]
        );
    }

    //--- Revealing --------------------------------------------------------

    #[test]
    fn one_char_per_interval() {
        let mut h = Harness::new("abcd", &[]);
        h.idle(4);
        for expected in 1..=4 {
            h.tick(&[]);
            assert_eq!(h.presentation.revealed(), expected);
        }
        assert_eq!(h.presentation.visible_text(), "abcd");
    }

    #[test]
    fn delay_pauses_before_its_char() {
        // 0.125 s = four ticks of pause before 'c'.
        let mut h = Harness::new("ab<d time=\"0.125\"/>c", &[]);
        h.idle(6);
        assert_eq!(h.presentation.revealed(), 2);

        h.tick(&[]);
        assert_eq!(h.presentation.revealed(), 2);
        assert_eq!(h.presentation.pending_delay(), 0.125);

        h.idle(3);
        assert_eq!(h.presentation.revealed(), 2);

        h.tick(&[]);
        assert_eq!(h.presentation.revealed(), 3);
    }

    #[test]
    fn delay_on_first_char_is_honoured() {
        let mut h = Harness::new("<d time=\"0.0625\"/>ab", &[]);
        h.idle(5);
        assert_eq!(h.presentation.revealed(), 0);
        assert!(h.presentation.pending_delay() > 0.0);

        h.tick(&[]);
        assert_eq!(h.presentation.revealed(), 0);

        // The delayed char and the next one share the tick the delay ends.
        h.tick(&[]);
        assert_eq!(h.presentation.revealed(), 2);
    }

    #[test]
    fn cursor_is_monotonic_and_bounded() {
        let mut h = Harness::new("a<d time=\"0.1\"/>bc<d time=\"0.2\"/>", &[]);
        let mut last = 0;
        for _ in 0..100 {
            h.tick(&[]);
            let revealed = h.presentation.revealed();
            assert!(revealed >= last);
            assert!(revealed <= 3);
            last = revealed;
        }
    }

    #[test]
    fn talking_only_for_longer_lines() {
        let mut short = Harness::new("Hey", &[]);
        short.idle(5);
        assert!(!short.presentation.is_talking());

        let mut long = Harness::new("Hello", &[]);
        long.idle(5);
        assert!(long.presentation.is_talking());
    }

    //--- Fast-Forward -----------------------------------------------------

    #[test]
    fn fast_forward_at_any_point_snaps_to_end() {
        let markup = "Hi<d time=\"0.5\"/> there<d time=\"0.25\"/>";
        for skip_at in 0..40 {
            let mut h = Harness::new(markup, &[]);
            h.idle(skip_at);

            let phase = h.presentation.phase();
            let open = matches!(phase, Phase::EasingIn | Phase::Revealing | Phase::Settling);
            if !open || h.presentation.time() >= h.presentation.total_duration() {
                continue;
            }

            h.tick(&[MenuAction::Confirm]);
            assert_eq!(h.presentation.revealed(), h.presentation.document().len());
            assert_eq!(h.presentation.time(), h.presentation.total_duration());
            assert_eq!(h.presentation.pending_delay(), 0.0);
        }
    }

    #[test]
    fn one_press_never_skips_and_closes() {
        let mut h = Harness::new("Hello", &[]);
        h.idle(4);
        // Press on the tick the reveal would start.
        h.tick(&[MenuAction::Cancel]);
        assert_ne!(h.presentation.phase(), Phase::EasingOut);
        assert!(h.presentation.is_fully_revealed());
    }

    #[test]
    fn trailing_delay_holds_the_line_open() {
        let mut h = Harness::new("a<d time=\"1\"/>", &[]);
        h.idle(6);
        assert!(h.presentation.is_fully_revealed());
        assert_eq!(h.presentation.phase(), Phase::Settling);

        h.idle(60);
        assert_eq!(h.presentation.phase(), Phase::AwaitingClose);
        assert!(!h.presentation.is_talking());
    }

    //--- Closing ----------------------------------------------------------

    #[test]
    fn full_lifecycle_without_choices() {
        let mut h = Harness::new("Hi", &[]);
        h.idle(30);
        assert_eq!(h.presentation.phase(), Phase::AwaitingClose);

        assert_eq!(h.tick(&[MenuAction::Confirm]), RevealStatus::Running);
        assert_eq!(h.presentation.phase(), Phase::EasingOut);

        let mut status = RevealStatus::Running;
        for _ in 0..10 {
            status = h.tick(&[]);
            if status == RevealStatus::Finished {
                break;
            }
        }
        assert_eq!(status, RevealStatus::Finished);
        assert_eq!(h.presentation.snapshot(), None);
        assert_eq!(
            h.cues(),
            vec![
                cues::SNAPSHOT_DIALOG.to_string(),
                cues::voice("granny"),
                cues::DIALOG_ADVANCE.to_string(),
                "stop".to_string(),
            ]
        );
    }

    //--- Choices ----------------------------------------------------------

    #[test]
    fn choice_menu_wraps_and_confirms() {
        let mut h = Harness::new("Pick", &["a", "b", "c"]);
        h.idle(30);
        assert_eq!(h.presentation.phase(), Phase::Choosing);
        assert_eq!(h.selection.highlighted(), 0);

        h.tick(&[MenuAction::Up]);
        assert_eq!(h.selection.highlighted(), 2);
        assert_eq!(h.presentation.highlight_ease(), 0.0);

        h.tick(&[MenuAction::Down]);
        assert_eq!(h.selection.highlighted(), 0);

        h.tick(&[MenuAction::Down]);
        h.tick(&[MenuAction::Confirm]);
        assert_eq!(h.presentation.phase(), Phase::Confirmed);
        assert_eq!(h.selection.last_confirmed(), 1);
        assert!((h.presentation.choice_ease() - 0.7).abs() < 1e-6);

        h.tick(&[]);
        assert_eq!(h.presentation.phase(), Phase::EasingOut);
    }

    #[test]
    fn highlight_eases_towards_one() {
        let mut h = Harness::new("Pick", &["a", "b"]);
        h.idle(30);
        let before = h.presentation.highlight_ease();
        h.idle(100);
        assert!(h.presentation.highlight_ease() > before);
        assert_eq!(h.presentation.highlight_ease(), 1.0);
    }
}
