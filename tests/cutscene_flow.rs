//=========================================================================
// Cutscene Flow
//=========================================================================
//
// Drives whole cutscenes through a World the way the logic thread does:
// one `update` per tick, controls chosen from the presentation snapshot.
//
//=========================================================================

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use aetheric_cutscene::core::coroutine::{BoxedStep, Script, Wait};
use aetheric_cutscene::core::cutscene::audio::{cues, AudioHandle, AudioSink};
use aetheric_cutscene::core::cutscene::{Cutscene, Stage};
use aetheric_cutscene::core::dialogue::{
    talk, DialogueLine, DialoguePool, LineCatalog, Phase, Say,
};
use aetheric_cutscene::core::input::{Controls, MenuAction};
use aetheric_cutscene::core::{CutsceneError, DialogueConfig, World};

const DT: f32 = 1.0 / 60.0;

//=== Helpers =============================================================

#[derive(Clone, Default)]
struct RecordingSink {
    cues: Rc<RefCell<Vec<String>>>,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, _handle: AudioHandle, cue: &str) {
        self.cues.borrow_mut().push(cue.to_string());
    }

    fn stop(&mut self, _handle: AudioHandle) {}

    fn stop_bus(&mut self, bus: &str) {
        self.cues.borrow_mut().push(format!("stop:{bus}"));
    }
}

/// Ticks until the world is idle, closing lines and picking choices by
/// index. Returns the text of every line closed.
fn play(world: &mut World, picks: &[usize]) -> Vec<String> {
    let portraits: HashSet<String> = HashSet::new();
    let mut picks = picks.iter().copied();
    let mut pick = picks.next();
    let mut closed = Vec::new();

    for _ in 0..20_000 {
        if world.is_idle() {
            return closed;
        }

        let line = world
            .snapshots(&portraits)
            .into_iter()
            .find_map(|(_, snapshot)| snapshot.line);

        let controls = match line {
            Some(line) if line.phase == Phase::AwaitingClose => {
                closed.push(line.text);
                Controls::pressed(&[MenuAction::Confirm])
            }
            Some(line) if line.phase == Phase::Choosing => {
                let target = pick.unwrap_or(0);
                if line.choices.get(target).is_some_and(|c| c.highlighted) {
                    closed.push(line.text);
                    pick = picks.next();
                    Controls::pressed(&[MenuAction::Confirm])
                } else {
                    Controls::pressed(&[MenuAction::Down])
                }
            }
            _ => Controls::NONE,
        };

        world.update(DT, controls);
    }
    panic!("world never went idle");
}

fn branching() -> Vec<DialogueLine> {
    vec![
        DialogueLine::new("A", "granny", "Well?").with_choices(["B", "END"]),
        DialogueLine::new("B", "madeline", "Sure.").ending(),
    ]
}

//=== Tests ===============================================================

#[test]
fn branching_conversation_reports_confirmed_choices() {
    let mut world = World::new(DialogueConfig::default());
    let confirmed = Rc::new(RefCell::new(Vec::new()));

    let record = Rc::clone(&confirmed);
    world.add(Cutscene::new("granny", move |_| {
        Ok(Say::new(branching())?.on_finish(move |_, choices| {
            record.borrow_mut().extend_from_slice(choices);
            Ok(())
        }))
    }));

    let closed = play(&mut world, &[0]);
    assert_eq!(closed, vec!["Well?", "Sure."]);
    assert_eq!(*confirmed.borrow(), vec!["B"]);
    assert!(world.take_failures().is_empty());
}

#[test]
fn pool_advances_with_progress() {
    let sink = RecordingSink::default();
    let heard = Rc::clone(&sink.cues);
    let mut world = World::new(DialogueConfig::default()).with_audio(Box::new(sink));

    let pool = DialoguePool::new("granny")
        .with_dialogue(vec![
            Some(branching()),
            Some(vec![DialogueLine::new("again", "granny", "Back already?")]),
            None,
        ])
        .advancing("talked")
        .shared();

    for round in 0..2 {
        let conversation = talk(&pool).expect("conversation available");
        world.add(Cutscene::new(format!("talk-{round}"), move |_| Ok(conversation)));
        play(&mut world, &[1]);
    }

    assert_eq!(world.progress().borrow().get("granny", "talked"), 2);
    assert!(!pool.borrow().is_interactable());
    assert!(matches!(talk(&pool), Err(CutsceneError::MissingDialogue { index: 2, .. })));

    let heard = heard.borrow();
    assert_eq!(heard.first().map(String::as_str), Some(cues::READSIGN_IN));
    assert_eq!(heard.iter().filter(|c| *c == cues::READSIGN_OUT).count(), 2);
    assert!(heard.iter().any(|c| *c == format!("stop:{}", cues::BUS_DIALOG)));
}

#[test]
fn catalog_lines_play_in_sequence() {
    let catalog = LineCatalog::from_json(
        r#"{
            "sign": [
                { "id": "1", "text": "KEEP OUT" },
                { "id": "2", "text": "<shake>really</shake>", "end": true },
                { "id": "3", "text": "never shown" }
            ]
        }"#,
    )
    .expect("valid catalog");
    let lines = catalog.lines("sign").expect("sign lines");

    let mut world = World::new(DialogueConfig::default());
    world.add(
        Cutscene::new("sign", move |stage| Say::with_rng(lines, &mut stage.rng)).with_seed(11),
    );

    assert_eq!(play(&mut world, &[]), vec!["KEEP OUT", "really"]);
}

#[test]
fn scripted_pause_then_dialogue() {
    let mut world = World::new(DialogueConfig::default());
    world.add(Cutscene::new("intro", |_| {
        Ok(Script::new().wait(0.5).then(|_| {
            let say: BoxedStep<Stage> =
                Box::new(Say::new(vec![DialogueLine::new("a", "theo", "Finally.")])?);
            Ok(say)
        }))
    }));

    assert_eq!(play(&mut world, &[]), vec!["Finally."]);
}

#[test]
fn broken_markup_halts_only_its_cutscene() {
    let mut world = World::new(DialogueConfig::default());
    world.add(Cutscene::new("broken", |_| {
        Say::new(vec![DialogueLine::new("bad", "theo", "<blink>hi</blink>")])
    }));
    world.add(Cutscene::new("fine", |_| Ok(Wait::new(0.2))));

    play(&mut world, &[]);

    let failures = world.take_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "broken");
    match &failures[0].1 {
        CutsceneError::Markup { line, .. } => assert_eq!(line, "bad"),
        other => panic!("expected markup error, got {other:?}"),
    }
}
