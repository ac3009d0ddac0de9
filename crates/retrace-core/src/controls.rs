/// Undo/redo/save affordance state driven by the history engine.
use crate::history::Affordance;

/// Enabled state of one control plus how often it flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub enabled: bool,
    /// Number of enable/disable transitions since creation.
    pub toggles: usize,
}

impl ButtonState {
    fn set(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.toggles += 1;
        }
    }
}

/// Mirrors the latest affordance signal onto the undo, redo and save
/// controls of the editor chrome.
#[derive(Debug, Clone, Default)]
pub struct UndoRedoController {
    undo: ButtonState,
    redo: ButtonState,
    save: ButtonState,
    last: Affordance,
    signals: usize,
}

impl UndoRedoController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an affordance signal. Save follows the dirty flag.
    pub fn apply(&mut self, affordance: Affordance) {
        self.undo.set(affordance.can_undo);
        self.redo.set(affordance.can_redo);
        self.save.set(affordance.is_dirty);
        if self.last != affordance {
            tracing::trace!(
                "Affordance changed: undo={} redo={} dirty={}",
                affordance.can_undo,
                affordance.can_redo,
                affordance.is_dirty
            );
        }
        self.last = affordance;
        self.signals += 1;
    }

    pub fn undo(&self) -> ButtonState {
        self.undo
    }

    pub fn redo(&self) -> ButtonState {
        self.redo
    }

    pub fn save(&self) -> ButtonState {
        self.save
    }

    pub fn undo_enabled(&self) -> bool {
        self.undo.enabled
    }

    pub fn redo_enabled(&self) -> bool {
        self.redo.enabled
    }

    pub fn save_enabled(&self) -> bool {
        self.save.enabled
    }

    /// Whether the document has unsaved changes.
    pub fn is_changed(&self) -> bool {
        self.last.is_dirty
    }

    /// The last signal received.
    pub fn affordance(&self) -> Affordance {
        self.last
    }

    /// Number of signals received.
    pub fn signals(&self) -> usize {
        self.signals
    }
}
