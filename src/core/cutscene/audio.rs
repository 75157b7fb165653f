//=========================================================================
// Audio Queue
//=========================================================================
//
// Audio requests issued by cutscene steps.
//
// Steps never talk to an audio engine directly: they queue commands here
// and the world drains the queue into its `AudioSink` at the end of each
// tick. Handles are allocated by the queue so a step can stop a sound it
// started (the dialog snapshot) before the sink ever saw it.
//
// Queues flushing into the same sink must share one `HandleCounter`;
// `World::add` hands every cutscene the world's counter.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::Cell;
use std::rc::Rc;

//=== External Dependencies ===============================================

use log::trace;

//=== Cues ================================================================

/// Cue names used by cutscenes and dialogue.
pub mod cues {
    /// Mix snapshot active while a dialogue box is open.
    pub const SNAPSHOT_DIALOG: &str = "snapshot:/dialog";

    /// Played when a line is closed.
    pub const DIALOG_ADVANCE: &str = "event:/ui/dialog_advance";

    /// Played when a cutscene starts.
    pub const READSIGN_IN: &str = "event:/sfx/readsign_in";

    /// Played when a cutscene finishes.
    pub const READSIGN_OUT: &str = "event:/sfx/readsign_out";

    /// Bus carrying every dialogue voice.
    pub const BUS_DIALOG: &str = "bus:/dialog";

    /// Event path of a speaker voice cue.
    pub fn voice(voice: &str) -> String {
        format!("event:/sfx/ui/dialog/{voice}")
    }
}

//=== AudioHandle =========================================================

/// Identifies one playing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(u64);

impl AudioHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

//=== HandleCounter =======================================================

/// Shared source of audio handles. Clones count from the same value.
#[derive(Debug, Clone, Default)]
pub struct HandleCounter(Rc<Cell<u64>>);

impl HandleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> AudioHandle {
        let id = self.0.get();
        self.0.set(id + 1);
        AudioHandle(id)
    }
}

//=== AudioCommand ========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCommand {
    Play { handle: AudioHandle, cue: String },
    Stop { handle: AudioHandle },
    StopBus { bus: String },
}

//=== AudioSink ===========================================================

/// Receiver of queued audio commands (the game's audio engine).
///
/// A sink that cannot resolve a cue ignores it.
pub trait AudioSink {
    fn play(&mut self, handle: AudioHandle, cue: &str);
    fn stop(&mut self, handle: AudioHandle);
    fn stop_bus(&mut self, bus: &str);

    /// Applies one queued command.
    fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Play { handle, cue } => self.play(handle, &cue),
            AudioCommand::Stop { handle } => self.stop(handle),
            AudioCommand::StopBus { bus } => self.stop_bus(&bus),
        }
    }
}

/// Sink that discards every command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _handle: AudioHandle, _cue: &str) {}
    fn stop(&mut self, _handle: AudioHandle) {}
    fn stop_bus(&mut self, _bus: &str) {}
}

//=== AudioQueue ==========================================================

/// Commands queued during a tick, in issue order.
#[derive(Debug, Default)]
pub struct AudioQueue {
    handles: HandleCounter,
    commands: Vec<AudioCommand>,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates handles from `handles` from now on.
    pub fn share_handles(&mut self, handles: &HandleCounter) {
        self.handles = handles.clone();
    }

    /// Queues `cue` and returns the handle it will play under.
    pub fn play(&mut self, cue: impl Into<String>) -> AudioHandle {
        let handle = self.handles.next();

        let cue = cue.into();
        trace!(target: "cutscene", "Queue play '{}' as #{}", cue, handle.0);
        self.commands.push(AudioCommand::Play { handle, cue });
        handle
    }

    pub fn stop(&mut self, handle: AudioHandle) {
        self.commands.push(AudioCommand::Stop { handle });
    }

    pub fn stop_bus(&mut self, bus: impl Into<String>) {
        self.commands.push(AudioCommand::StopBus { bus: bus.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Read-only view of the pending commands.
    pub fn commands(&self) -> &[AudioCommand] {
        &self.commands
    }

    /// Takes every pending command, leaving the queue empty.
    pub fn take(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Drains every pending command into `sink`.
    pub fn flush(&mut self, sink: &mut dyn AudioSink) {
        for command in self.commands.drain(..) {
            sink.apply(command);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
