//=========================================================================
// Dialogue Pool
//=========================================================================
//
// Per-speaker set of conversations selected by a dialogue index.
//
// Conversations come either from a list (an empty slot means "nothing to
// say at this index") or from a factory called with the index. The index
// usually mirrors a progress counter, so a speaker picks up where the
// player left off:
//
// ```text
//   index 0 → intro, index 1 → follow-up, index 2 → None (not interactable)
// ```
//
// Finish actions run once a conversation ends, with the confirmed
// choices and the progress store.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::line::DialogueLine;
use super::say::Say;
use crate::core::cutscene::progress::ProgressStore;
use crate::core::error::CutsceneError;

//=== Types ===============================================================

type Factory = Box<dyn Fn(usize) -> Option<Vec<DialogueLine>>>;
type FinishAction = Box<dyn Fn(&mut DialoguePool, &[String], &mut dyn ProgressStore)>;

/// Pool shared between a speaker and the cutscenes it starts.
pub type SharedPool = Rc<RefCell<DialoguePool>>;

enum Source {
    List(Vec<Option<Vec<DialogueLine>>>),
    Factory(Factory),
}

//=== DialoguePool ========================================================

pub struct DialoguePool {
    speaker: String,
    source: Source,
    index: usize,
    interactable: bool,
    finish_actions: Vec<FinishAction>,
}

impl DialoguePool {
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            source: Source::List(Vec::new()),
            index: 0,
            interactable: false,
            finish_actions: Vec::new(),
        }
    }

    /// Wraps the pool for sharing with cutscenes.
    pub fn shared(self) -> SharedPool {
        Rc::new(RefCell::new(self))
    }

    //--- Sources ----------------------------------------------------------

    pub fn set_dialogue(&mut self, conversations: Vec<Option<Vec<DialogueLine>>>) {
        self.source = Source::List(conversations);
        self.check();
    }

    pub fn set_factory<F>(&mut self, factory: F)
    where
        F: Fn(usize) -> Option<Vec<DialogueLine>> + 'static,
    {
        self.source = Source::Factory(Box::new(factory));
        self.check();
    }

    pub fn with_dialogue(mut self, conversations: Vec<Option<Vec<DialogueLine>>>) -> Self {
        self.set_dialogue(conversations);
        self
    }

    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Option<Vec<DialogueLine>> + 'static,
    {
        self.set_factory(factory);
        self
    }

    //--- Index ------------------------------------------------------------

    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves to `index` and re-checks whether there is anything to say.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
        self.check();
    }

    /// Starts from the speaker's `flag` counter in `progress`.
    pub fn with_index_from(mut self, progress: &dyn ProgressStore, flag: &str) -> Self {
        let counter = progress.get(&self.speaker, flag);
        self.set_index(usize::try_from(counter).unwrap_or(0));
        self
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    /// True when the current index has a conversation.
    pub fn is_interactable(&self) -> bool {
        self.interactable
    }

    fn check(&mut self) -> bool {
        self.interactable = self.current().is_some();
        self.interactable
    }

    //--- Conversations ----------------------------------------------------

    /// The conversation at the current index, if any.
    pub fn current(&self) -> Option<Vec<DialogueLine>> {
        match &self.source {
            Source::List(conversations) => conversations.get(self.index).cloned().flatten(),
            Source::Factory(factory) => factory(self.index),
        }
    }

    pub fn require_current(&self) -> Result<Vec<DialogueLine>, CutsceneError> {
        self.current().ok_or_else(|| CutsceneError::MissingDialogue {
            speaker: self.speaker.clone(),
            index: self.index,
        })
    }

    //--- Finish Actions ---------------------------------------------------

    pub fn on_finish<F>(&mut self, action: F)
    where
        F: Fn(&mut DialoguePool, &[String], &mut dyn ProgressStore) + 'static,
    {
        self.finish_actions.push(Box::new(action));
    }

    /// After each conversation, moves to the next index and bumps the
    /// speaker's `flag` counter.
    pub fn advancing(mut self, flag: impl Into<String>) -> Self {
        let flag = flag.into();
        self.on_finish(move |pool, _, progress| {
            pool.set_index(pool.index() + 1);
            progress.increment(&pool.speaker, &flag);
        });
        self
    }

    /// Runs every finish action in registration order.
    pub fn finish(&mut self, choices: &[String], progress: &mut dyn ProgressStore) {
        debug!(
            target: "dialogue",
            "{} finished conversation {} with {:?}",
            self.speaker,
            self.index,
            choices
        );

        let actions = std::mem::take(&mut self.finish_actions);
        for action in &actions {
            action(&mut *self, choices, &mut *progress);
        }

        // Actions registered while running go after the existing ones.
        let added = std::mem::replace(&mut self.finish_actions, actions);
        self.finish_actions.extend(added);
    }
}

impl fmt::Debug for DialoguePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialoguePool")
            .field("speaker", &self.speaker)
            .field("index", &self.index)
            .field("interactable", &self.interactable)
            .field("finish_actions", &self.finish_actions.len())
            .finish()
    }
}

//=== talk() ==============================================================

/// Builds a walk over the pool's current conversation that runs the
/// pool's finish actions when it ends.
pub fn talk(pool: &SharedPool) -> Result<Say, CutsceneError> {
    let lines = pool.borrow().require_current()?;
    let pool = Rc::clone(pool);

    Ok(Say::new(lines)?.on_finish(move |stage, choices| {
        pool.borrow_mut().finish(choices, &mut *stage.progress_mut());
        Ok(())
    }))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cutscene::progress::MemoryProgress;

    fn conversation(text: &str) -> Option<Vec<DialogueLine>> {
        Some(vec![DialogueLine::new("0", "theo", text)])
    }

    #[test]
    fn list_slots_drive_interactability() {
        let mut pool = DialoguePool::new("theo").with_dialogue(vec![
            conversation("Hi"),
            None,
            conversation("Again"),
        ]);
        assert!(pool.is_interactable());

        pool.set_index(1);
        assert!(!pool.is_interactable());
        assert!(pool.current().is_none());

        pool.set_index(2);
        assert_eq!(pool.current().unwrap()[0].text, "Again");

        pool.set_index(3);
        assert!(!pool.is_interactable());
    }

    #[test]
    fn factory_is_called_with_index() {
        let pool = DialoguePool::new("badeline")
            .with_factory(|index| (index < 2).then(|| vec![DialogueLine::new("0", "badeline", format!("#{index}"))]))
            .with_index_from(&MemoryProgress::new(), "talked");
        assert_eq!(pool.current().unwrap()[0].text, "#0");

        let mut progress = MemoryProgress::new();
        progress.set("badeline", "talked", 2);
        let pool = DialoguePool::new("badeline")
            .with_factory(|index| (index < 2).then(Vec::new))
            .with_index_from(&progress, "talked");
        assert!(!pool.is_interactable());
    }

    #[test]
    fn require_current_reports_speaker_and_index() {
        let mut pool = DialoguePool::new("granny");
        pool.set_index(4);
        match pool.require_current() {
            Err(CutsceneError::MissingDialogue { speaker, index }) => {
                assert_eq!(speaker, "granny");
                assert_eq!(index, 4);
            }
            other => panic!("expected missing dialogue, got {other:?}"),
        }
    }

    #[test]
    fn advancing_bumps_index_and_counter() {
        let mut pool = DialoguePool::new("granny")
            .with_dialogue(vec![conversation("One"), conversation("Two")])
            .advancing("talked");
        let mut progress = MemoryProgress::new();

        pool.finish(&[], &mut progress);
        assert_eq!(pool.index(), 1);
        assert_eq!(progress.get("granny", "talked"), 1);

        pool.finish(&[], &mut progress);
        assert_eq!(pool.index(), 2);
        assert!(!pool.is_interactable());
    }

    #[test]
    fn finish_actions_see_choices_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pool = DialoguePool::new("badeline");

        let first = Rc::clone(&seen);
        pool.on_finish(move |_, choices, _| first.borrow_mut().push(format!("a:{}", choices.join(","))));
        let second = Rc::clone(&seen);
        pool.on_finish(move |pool, choices, _| {
            if !choices.iter().any(|c| c == "no") {
                pool.set_index(pool.index() + 1);
            }
            second.borrow_mut().push("b".to_string());
        });

        pool.finish(&["no".to_string()], &mut MemoryProgress::new());
        assert_eq!(pool.index(), 0);
        pool.finish(&["yes".to_string()], &mut MemoryProgress::new());
        assert_eq!(pool.index(), 1);
        assert_eq!(*seen.borrow(), vec!["a:no", "b", "a:yes", "b"]);
    }

    #[test]
    fn talk_fails_without_a_conversation() {
        let pool = DialoguePool::new("theo").shared();
        assert!(matches!(talk(&pool), Err(CutsceneError::MissingDialogue { .. })));

        pool.borrow_mut().set_dialogue(vec![conversation("Hey")]);
        assert!(talk(&pool).is_ok());
    }
}
