//=========================================================================
// Core Systems
//=========================================================================
//
// Everything that runs on the logic thread, plus the runtime that ticks
// it at a fixed rate.
//
// Each tick:
//   1. EventCollector drains platform messages
//   2. InputSystem turns them into this tick's Controls
//   3. World updates every live cutscene and flushes their audio
//   4. the thread sleeps out the rest of the tick
//
// The World holds `Rc` state and never leaves the logic thread; hosts
// reach it through the `Engine::init` callback.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod config;
pub mod coroutine;
pub mod cutscene;
pub mod dialogue;
pub mod ease;
pub mod error;
pub mod input;
pub mod markup;
pub(crate) mod platform_bridge;
pub mod world;

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== External Dependencies ===============================================

use crossbeam_channel::Receiver;
use log::{info, warn};

//=== Internal Dependencies ===============================================

use cutscene::audio::AudioSink;
use input::{InputEvent, InputSystem};
use platform_bridge::{EventCollector, PlatformEvent, TickControl};

//=== Public API ==========================================================

pub use config::DialogueConfig;
pub use error::{CutsceneError, MarkupError};
pub use world::World;

//=== Types ===============================================================

/// Host setup run against the World on the logic thread.
pub(crate) type WorldInit = Box<dyn FnOnce(&mut World) + Send>;

//=== CoreRuntime =========================================================

/// Owns what the logic thread needs until it is spawned.
pub(crate) struct CoreRuntime {
    config: DialogueConfig,
    audio: Box<dyn AudioSink + Send>,
    init: Vec<WorldInit>,
}

impl CoreRuntime {
    pub(crate) fn new(config: DialogueConfig, audio: Box<dyn AudioSink + Send>) -> Self {
        Self {
            config,
            audio,
            init: Vec::new(),
        }
    }

    /// Queues `init` to run once the World exists, in call order.
    pub(crate) fn add_init(&mut self, init: WorldInit) {
        self.init.push(init);
    }

    //--- spawn_core_thread() ---------------------------------------------

    /// Builds the World on a new thread and ticks it at `tps` until the
    /// window closes or the channel disconnects.
    pub(crate) fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);
        let dt = frame_duration.as_secs_f32();

        thread::spawn(move || {
            let mut world = World::new(self.config).with_audio(self.audio);
            for init in self.init {
                init(&mut world);
            }

            let mut input = InputSystem::new();
            let mut collector = EventCollector::new(receiver);
            let mut ticks: u64 = 0;

            loop {
                let frame_start = Instant::now();

                if collector.collect_frame() == TickControl::Exit {
                    break;
                }
                tick(&mut world, &mut input, collector.batches(), dt);
                ticks += 1;

                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            info!("Core thread exiting after {} ticks", ticks);
        })
    }
}

//=== tick() ==============================================================

/// One logic tick: input, then every cutscene.
pub(crate) fn tick(
    world: &mut World,
    input: &mut InputSystem,
    batches: &[Vec<InputEvent>],
    dt: f32,
) {
    let controls = input.update(batches);
    world.update(dt, controls);

    for (name, err) in world.take_failures() {
        warn!(target: "cutscene", "'{}' dropped after failure: {}", name, err);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
