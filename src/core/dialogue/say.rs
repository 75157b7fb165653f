//=========================================================================
// Say
//=========================================================================
//
// Steps presenting dialogue on a cutscene stage.
//
//   SayLine → presents one line (ease in, reveal, choice/close, ease out)
//   Say     → walks a conversation, awaiting one SayLine per line
//
// Walk rules, per presented line:
//   choices       → record the confirmed target, jump to the line with
//                   that id; an id missing from the conversation ends it
//   end flag      → end
//   otherwise     → next line in order
//
// Every line is parsed when the walk is built, so a markup error surfaces
// before anything is shown.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::line::DialogueLine;
use super::reveal::{ChoiceView, Presentation, RevealStatus};
use crate::core::coroutine::{Resume, Step};
use crate::core::cutscene::audio::cues;
use crate::core::cutscene::Stage;
use crate::core::error::CutsceneError;
use crate::core::markup::{parse_with_rng, Document};

//=== SayLine =============================================================

struct Prepared {
    face: String,
    document: Document,
    voice: Option<String>,
    choices: Vec<ChoiceView>,
}

/// Presents a single line. The confirmed choice index is left in
/// `stage.speech.selection`.
pub struct SayLine {
    prepared: Option<Prepared>,
}

impl SayLine {
    /// Parses `text` and prepares it for presentation.
    pub fn new(face: &str, text: &str, voice: Option<&str>) -> Result<Self, CutsceneError> {
        let document = parse_with_rng(text, &mut rand::rng())
            .map_err(|source| CutsceneError::markup(text, source))?;
        Ok(Self::from_document(face, document, voice.map(str::to_string), Vec::new()))
    }

    pub(crate) fn from_document(
        face: &str,
        document: Document,
        voice: Option<String>,
        choices: Vec<ChoiceView>,
    ) -> Self {
        Self {
            prepared: Some(Prepared {
                face: face.to_string(),
                document,
                voice,
                choices,
            }),
        }
    }

    /// Offers a choice menu once the line is revealed.
    pub fn with_choices(mut self, choices: Vec<ChoiceView>) -> Self {
        if let Some(prepared) = self.prepared.as_mut() {
            prepared.choices = choices;
        }
        self
    }
}

impl Step<Stage> for SayLine {
    fn resume(&mut self, stage: &mut Stage, dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        if let Some(prepared) = self.prepared.take() {
            let face = (!prepared.face.is_empty())
                .then(|| format!("{}{}", stage.config.face_prefix, prepared.face));
            let presentation = Presentation::open(
                face,
                prepared.document,
                prepared.voice,
                prepared.choices,
                &stage.config,
                &mut stage.audio,
            );
            stage.speech.presentation = Some(presentation);
        }

        let Some(presentation) = stage.speech.presentation.as_mut() else {
            warn!(target: "dialogue", "Presentation removed while a line was on screen");
            return Ok(Resume::Done);
        };

        let status = presentation.advance(
            dt,
            stage.controls,
            &mut stage.speech.selection,
            &mut stage.audio,
            &stage.config,
        );

        match status {
            RevealStatus::Running => Ok(Resume::frame()),
            RevealStatus::Finished => {
                stage.speech.presentation = None;
                Ok(Resume::Done)
            }
        }
    }

    fn name(&self) -> &'static str {
        "say_line"
    }
}

//=== Say =================================================================

type FinishAction = Box<dyn FnOnce(&mut Stage, &[String]) -> Result<(), CutsceneError>>;

/// Walks a conversation from a start index.
///
/// The confirmed choice ids, in order, are stored on the stage when the
/// walk ends (see [`Stage::take_confirmed`]) and passed to the
/// [`on_finish`](Say::on_finish) action.
pub struct Say {
    lines: Vec<DialogueLine>,
    documents: Vec<Document>,
    index: usize,
    presenting: bool,
    confirmed: Vec<String>,
    on_finish: Option<FinishAction>,
}

impl Say {
    /// Parses every line of the conversation.
    pub fn new(lines: Vec<DialogueLine>) -> Result<Self, CutsceneError> {
        Self::with_rng(lines, &mut rand::rng())
    }

    /// Like [`Say::new`], drawing shake vectors from `rng`.
    pub fn with_rng<R: Rng>(lines: Vec<DialogueLine>, rng: &mut R) -> Result<Self, CutsceneError> {
        let documents = lines
            .iter()
            .map(|line| {
                parse_with_rng(&line.text, rng).map_err(|source| {
                    let name = if line.id.is_empty() { &line.text } else { &line.id };
                    CutsceneError::markup(name.as_str(), source)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lines,
            documents,
            index: 0,
            presenting: false,
            confirmed: Vec::new(),
            on_finish: None,
        })
    }

    /// Starts the walk at `index` instead of the first line.
    pub fn starting_at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Runs `action` with the confirmed choices once the walk ends.
    pub fn on_finish<F>(mut self, action: F) -> Self
    where
        F: FnOnce(&mut Stage, &[String]) -> Result<(), CutsceneError> + 'static,
    {
        self.on_finish = Some(Box::new(action));
        self
    }

    //--- Internal Helpers -------------------------------------------------

    fn find(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    fn present(&self, stage: &Stage) -> SayLine {
        let line = &self.lines[self.index];
        let choices = line
            .choices
            .iter()
            .map(|target| {
                let found = self.find(target);
                ChoiceView {
                    target: target.clone(),
                    face: found
                        .map(|i| &self.lines[i].face)
                        .filter(|face| !face.is_empty())
                        .map(|face| format!("{}{}", stage.config.face_prefix, face)),
                    document: found.map(|i| self.documents[i].clone()),
                }
            })
            .collect();

        SayLine::from_document(
            &line.face,
            self.documents[self.index].clone(),
            line.voice.clone(),
            choices,
        )
    }

    /// Picks the next line after the one just presented.
    fn follow(&mut self, stage: &Stage) -> Option<usize> {
        let line = &self.lines[self.index];

        if line.has_choices() {
            let chosen = stage.speech.selection.last_confirmed();
            let target = line.choices.get(chosen)?.clone();
            let next = self.find(&target);
            if next.is_none() {
                debug!(
                    target: "dialogue",
                    "Choice '{}' has no matching line, ending conversation",
                    target
                );
            }
            self.confirmed.push(target);
            return next;
        }

        if line.end_dialogue {
            return None;
        }
        Some(self.index + 1)
    }

    fn finish(&mut self, stage: &mut Stage) -> Result<Resume<Stage>, CutsceneError> {
        debug!(
            target: "dialogue",
            "Conversation ended with choices {:?}",
            self.confirmed
        );
        stage.audio.stop_bus(cues::BUS_DIALOG);
        stage.speech.confirmed = self.confirmed.clone();
        if let Some(action) = self.on_finish.take() {
            action(stage, &self.confirmed)?;
        }
        Ok(Resume::Done)
    }
}

impl Step<Stage> for Say {
    fn resume(&mut self, stage: &mut Stage, _dt: f32) -> Result<Resume<Stage>, CutsceneError> {
        if self.presenting {
            self.presenting = false;
            match self.follow(stage) {
                Some(next) => self.index = next,
                None => return self.finish(stage),
            }
        } else if self.index == 0 && self.confirmed.is_empty() {
            debug!(target: "dialogue", "Conversation started ({} lines)", self.lines.len());
        }

        if self.index >= self.lines.len() {
            return self.finish(stage);
        }

        self.presenting = true;
        Ok(Resume::await_step(self.present(stage)))
    }

    fn name(&self) -> &'static str {
        "say"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DialogueConfig;
    use crate::core::coroutine::Scheduler;
    use crate::core::cutscene::audio::AudioCommand;
    use crate::core::cutscene::progress::{shared, MemoryProgress};
    use crate::core::dialogue::Phase;
    use crate::core::input::{Controls, MenuAction};
    use std::collections::VecDeque;

    const DT: f32 = 1.0 / 60.0;

    fn stage() -> Stage {
        Stage::new(DialogueConfig::default(), shared(MemoryProgress::new())).with_seed(3)
    }

    /// Runs the scheduler, closing lines and picking choices by index.
    /// Returns the flat text of every line closed, in order.
    fn drive(
        scheduler: &mut Scheduler<Stage>,
        stage: &mut Stage,
        picks: &[usize],
    ) -> Result<Vec<String>, CutsceneError> {
        let mut picks: VecDeque<usize> = picks.iter().copied().collect();
        let mut closed = Vec::new();

        for _ in 0..10_000 {
            if !scheduler.is_running() {
                return Ok(closed);
            }

            stage.controls = match stage.speech.presentation.as_ref() {
                Some(p) if p.phase() == Phase::AwaitingClose => {
                    closed.push(p.document().text().to_string());
                    Controls::pressed(&[MenuAction::Confirm])
                }
                Some(p) if p.phase() == Phase::Choosing => {
                    let pick = picks.front().copied().unwrap_or(0);
                    if stage.speech.selection.highlighted() == pick {
                        picks.pop_front();
                        closed.push(p.document().text().to_string());
                        Controls::pressed(&[MenuAction::Confirm])
                    } else {
                        Controls::pressed(&[MenuAction::Down])
                    }
                }
                _ => Controls::NONE,
            };

            scheduler.update(stage, DT)?;
        }
        panic!("conversation never ended");
    }

    fn run(lines: Vec<DialogueLine>, picks: &[usize]) -> (Vec<String>, Vec<String>, Stage) {
        let mut stage = stage();
        let mut scheduler = Scheduler::new();
        scheduler.run_step(Say::new(lines).unwrap());
        let closed = drive(&mut scheduler, &mut stage, picks).unwrap();
        let confirmed = stage.take_confirmed();
        (closed, confirmed, stage)
    }

    //--- Walking ----------------------------------------------------------

    #[test]
    fn choice_jumps_to_target_and_end_flag_stops() {
        let lines = vec![
            DialogueLine::new("A", "granny", "Well?").with_choices(["B", "END"]),
            DialogueLine::new("B", "madeline", "Sure.").ending(),
        ];

        let (closed, confirmed, _) = run(lines, &[0]);
        assert_eq!(closed, vec!["Well?", "Sure."]);
        assert_eq!(confirmed, vec!["B"]);
    }

    #[test]
    fn unresolved_choice_ends_conversation() {
        let lines = vec![
            DialogueLine::new("A", "granny", "Well?").with_choices(["B", "END"]),
            DialogueLine::new("B", "madeline", "Sure.").ending(),
        ];

        let (closed, confirmed, _) = run(lines, &[1]);
        assert_eq!(closed, vec!["Well?"]);
        assert_eq!(confirmed, vec!["END"]);
    }

    #[test]
    fn lines_without_choices_advance_in_order() {
        let lines = vec![
            DialogueLine::new("1", "theo", "One"),
            DialogueLine::new("2", "theo", "Two").ending(),
            DialogueLine::new("3", "theo", "Three"),
        ];

        let (closed, confirmed, _) = run(lines, &[]);
        assert_eq!(closed, vec!["One", "Two"]);
        assert!(confirmed.is_empty());
    }

    #[test]
    fn cycles_are_followed() {
        let lines = vec![
            DialogueLine::new("ask", "theo", "Again?").with_choices(["ask", "bye"]),
            DialogueLine::new("bye", "theo", "Bye").ending(),
        ];

        let (closed, confirmed, _) = run(lines, &[0, 0, 1]);
        assert_eq!(closed, vec!["Again?", "Again?", "Again?", "Bye"]);
        assert_eq!(confirmed, vec!["ask", "ask", "bye"]);
    }

    #[test]
    fn starting_index_skips_earlier_lines() {
        let lines = vec![
            DialogueLine::new("1", "theo", "One"),
            DialogueLine::new("2", "theo", "Two"),
        ];

        let mut stage = stage();
        let mut scheduler = Scheduler::new();
        scheduler.run_step(Say::new(lines).unwrap().starting_at(1));
        let closed = drive(&mut scheduler, &mut stage, &[]).unwrap();
        assert_eq!(closed, vec!["Two"]);
    }

    //--- Side Effects -----------------------------------------------------

    #[test]
    fn finish_stops_dialog_bus_and_runs_action() {
        let lines = vec![
            DialogueLine::new("A", "granny", "Tea?").with_choices(["yes"]),
            DialogueLine::new("yes", "madeline", "Yes please.").ending(),
        ];

        let mut stage = stage();
        let mut scheduler = Scheduler::new();
        scheduler.run_step(Say::new(lines).unwrap().on_finish(|stage, choices| {
            if choices.iter().any(|c| c == "yes") {
                stage.progress_mut().increment("granny", "tea");
            }
            Ok(())
        }));
        drive(&mut scheduler, &mut stage, &[0]).unwrap();

        assert_eq!(stage.progress().get("granny", "tea"), 1);
        assert_eq!(
            stage.audio.commands().last(),
            Some(&AudioCommand::StopBus { bus: cues::BUS_DIALOG.to_string() })
        );
        assert!(stage.speech.presentation.is_none());
    }

    #[test]
    fn choice_views_show_target_lines() {
        let lines = vec![
            DialogueLine::new("A", "granny", "Well?").with_choices(["B", "gone"]),
            DialogueLine::new("B", "madeline", "<wavy>Sure</wavy>").ending(),
        ];

        let mut stage = stage();
        let mut scheduler = Scheduler::new();
        scheduler.run_step(Say::new(lines).unwrap());
        scheduler.update(&mut stage, DT).unwrap();

        let presentation = stage.speech.presentation.as_ref().unwrap();
        assert_eq!(presentation.face(), Some("faces/granny"));

        let choices = presentation.choices();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].face.as_deref(), Some("faces/madeline"));
        assert_eq!(choices[0].document.as_ref().unwrap().text(), "Sure");
        assert!(choices[1].document.is_none());
    }

    //--- Errors -----------------------------------------------------------

    #[test]
    fn markup_error_surfaces_before_anything_is_shown() {
        let lines = vec![
            DialogueLine::new("ok", "theo", "Fine"),
            DialogueLine::new("bad", "theo", "<d time=\"later\"/>oops"),
        ];

        match Say::new(lines) {
            Err(CutsceneError::Markup { line, .. }) => assert_eq!(line, "bad"),
            other => panic!("expected markup error, got {:?}", other.err()),
        }
    }

    #[test]
    fn single_line_reports_markup_errors() {
        assert!(SayLine::new("theo", "<c color=\"nope\">x</c>", None).is_err());
        assert!(SayLine::new("theo", "fine", Some("theo")).is_ok());
    }
}
