//=========================================================================
// Aetheric Cutscene Engine
//=========================================================================
//
// Entry point wiring the window, the logic thread and the World.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_tps()              ├─ init(|world| ...)
//         ├─ with_channel_capacity() └─ run(): logic thread + window,
//         ├─ with_dialogue_config()           blocks until exit
//         └─ with_audio()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::bounded;
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::cutscene::audio::{AudioSink, SilentSink};
use crate::core::platform_bridge::PlatformEvent;
use crate::core::{CoreRuntime, DialogueConfig, World};
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic ticks per second)
/// - **Channel capacity**: 128 frames of input
/// - **Dialogue config**: [`DialogueConfig::default`]
/// - **Audio**: silent
///
/// # Panics
///
/// [`with_tps`](Self::with_tps) and
/// [`with_channel_capacity`](Self::with_channel_capacity) panic on
/// non-positive values. No other method of the crate panics on input.
///
/// # Examples
///
/// ```no_run
/// use aetheric_cutscene::EngineBuilder;
/// use aetheric_cutscene::core::DialogueConfig;
///
/// EngineBuilder::new()
///     .with_tps(120.0)
///     .with_dialogue_config(DialogueConfig::default().with_face_prefix("portraits/"))
///     .build()
///     .run();
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    title: String,
    config: DialogueConfig,
    audio: Box<dyn AudioSink + Send>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            title: "Aetheric Cutscene".to_string(),
            config: DialogueConfig::default(),
            audio: Box::new(SilentSink),
        }
    }

    /// Sets the fixed logic rate. Every tick advances cutscenes by
    /// `1 / tps` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Frames of input the platform may queue ahead of the logic thread.
    /// Frames beyond that are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Timing and portrait settings shared by every cutscene.
    pub fn with_dialogue_config(mut self, config: DialogueConfig) -> Self {
        self.config = config;
        self
    }

    /// Sink receiving every cutscene's audio commands, once per tick.
    pub fn with_audio(mut self, sink: impl AudioSink + Send + 'static) -> Self {
        self.audio = Box::new(sink);
        self
    }

    pub fn build(self) -> Engine {
        info!("Engine configured: {} ticks/s, {} queued frames", self.tps, self.channel_capacity);

        Engine {
            runtime: CoreRuntime::new(self.config, self.audio),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            title: self.title,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Cutscene engine runtime.
///
/// ```text
/// Engine (Main Thread)
///   ├─► Logic Thread @ TPS
///   │     └─► InputSystem → World → cutscenes
///   │
///   └─► Platform (winit event loop)
///
/// Communication: bounded channel of PlatformEvent
/// ```
pub struct Engine {
    runtime: CoreRuntime,
    tps: f64,
    channel_capacity: usize,
    title: String,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Registers setup for the World, e.g. adding the opening cutscene.
    ///
    /// The World lives on the logic thread, so `init_fn` runs there once
    /// [`Engine::run`] starts, before the first tick. Multiple calls run in
    /// order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aetheric_cutscene::EngineBuilder;
    /// use aetheric_cutscene::core::cutscene::Cutscene;
    /// use aetheric_cutscene::core::dialogue::{DialogueLine, Say};
    ///
    /// EngineBuilder::new()
    ///     .build()
    ///     .init(|world| {
    ///         world.add(Cutscene::new("sign", |_| {
    ///             Say::new(vec![DialogueLine::new("a", "", "Keep out!")])
    ///         }));
    ///     })
    ///     .run();
    /// ```
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut World) + Send + 'static,
    {
        self.runtime.add_init(Box::new(init_fn));
        self
    }

    //--- Execution --------------------------------------------------------

    /// Starts the logic thread and runs the window on this thread until it
    /// closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the platform → logic channel
    /// 2. Spawns the logic thread, which builds the World and runs `init`
    /// 3. Runs the winit event loop (blocks here)
    /// 4. On close: `WindowClosed` is sent, the logic thread drains and exits
    pub fn run(self) {
        info!("Opening '{}' at {} ticks/s", self.title, self.tps);

        let (tx, rx) = bounded::<PlatformEvent>(self.channel_capacity);

        let logic = self.runtime.spawn_core_thread(rx, self.tps);
        info!("Logic thread started");

        let platform = Platform::new(tx, self.title);
        match platform.run() {
            Ok(()) => info!("Window loop finished"),
            Err(e) => error!("Window loop failed: {}", e),
        }

        if logic.join().is_err() {
            error!("Logic thread panicked");
        }
        info!("Engine stopped");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
