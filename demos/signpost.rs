//=========================================================================
// Signpost Demo
//=========================================================================
//
// Opens a window and plays a short conversation. Enter/Space confirm,
// arrows pick a reply, Escape skips the reveal.
//
//   RUST_LOG=debug cargo run --example signpost
//
//=========================================================================

use aetheric_cutscene::prelude::*;
use aetheric_cutscene::core::cutscene::audio::AudioHandle;
use glam::Vec2;
use log::info;

/// Prints cues instead of playing them.
struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, handle: AudioHandle, cue: &str) {
        info!(target: "audio", "play #{} {}", handle.id(), cue);
    }

    fn stop(&mut self, handle: AudioHandle) {
        info!(target: "audio", "stop #{}", handle.id());
    }

    fn stop_bus(&mut self, bus: &str) {
        info!(target: "audio", "stop bus {}", bus);
    }
}

fn conversation() -> Vec<DialogueLine> {
    vec![
        DialogueLine::new("sign", "", "<c color=\"a03020\">DANGER</c><d time=\"0.4\"/> Keep out!"),
        DialogueLine::new("ask", "theo", "Should we <wavy>really</wavy> go in?")
            .with_voice("theo")
            .with_choices(["go", "leave"]),
        DialogueLine::new("go", "madeline", "<shake>Obviously.</shake>").ending(),
        DialogueLine::new("leave", "madeline", "Fine, fine.").ending(),
    ]
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    EngineBuilder::new()
        .with_title("Signpost")
        .with_audio(LogSink)
        .build()
        .init(|world| {
            world.add(
                Cutscene::new("signpost", |stage| {
                    stage.place("madeline", Pose::at(Vec2::new(-40.0, 0.0)));
                    stage.place("theo", Pose::at(Vec2::new(60.0, 0.0)));

                    let say = Say::with_rng(conversation(), &mut stage.rng)?.on_finish(
                        |_, choices| {
                            info!("Player chose {:?}", choices);
                            Ok(())
                        },
                    );
                    let say: BoxedStep<Stage> = Box::new(say);
                    Ok(Script::new()
                        .then_step(MoveToDistance::new("madeline", Vec2::new(60.0, 0.0), 16.0))
                        .then_step(FaceEachOther::new("madeline", "theo"))
                        .then(move |_| Ok(say)))
                })
                .with_freeze_game(true),
            );
        })
        .run();
}
