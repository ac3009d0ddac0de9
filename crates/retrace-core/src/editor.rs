//! Editor session combining the workspace with its undo/redo history.
//!
//! An `Editor` owns the live regions (a [`Workspace`]) and the
//! [`HistoryStack`] that records them. Every editing entry point updates the
//! live content first and then hands the new state to the history, the same
//! order an interactive editor follows.

use std::time::Instant;

use anyhow::Result;
use retrace_config::EditorConfig;
use serde::Serialize;

use crate::history::{
    Clock, Delay, EditorHost, HistoryConfig, HistoryStack, RootKey, SystemClock,
};
use crate::region::Region;
use crate::workspace::Workspace;

/// A workspace plus its history.
#[derive(Debug)]
pub struct Editor {
    workspace: Workspace,
    history: HistoryStack,
}

/// Serializable view of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionReport {
    pub key: String,
    pub content: String,
    /// Plain-text offset of the selection start, if there is a selection.
    pub caret: Option<usize>,
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub regions: Vec<RegionReport>,
    pub active: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub is_dirty: bool,
    pub stack_index: Option<usize>,
    pub stack_len: usize,
    pub changes: usize,
}

impl Editor {
    /// Creates an editor with one empty region per configured key.
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Like [`Editor::new`] with a custom clock for delayed commits.
    pub fn with_clock(config: &EditorConfig, clock: impl Clock + 'static) -> Self {
        let workspace = Workspace::with_keys(config.root_keys.iter().map(String::as_str));
        let history = HistoryStack::with_clock(HistoryConfig::from(config), clock);
        Self::from_parts(workspace, history)
    }

    /// Creates an editor over prepared regions; their content is the
    /// baseline.
    pub fn with_regions(
        config: &EditorConfig,
        regions: Vec<Region>,
        clock: impl Clock + 'static,
    ) -> Self {
        let history = HistoryStack::with_clock(HistoryConfig::from(config), clock);
        Self::from_parts(Workspace::new(regions), history)
    }

    fn from_parts(workspace: Workspace, history: HistoryStack) -> Self {
        let mut editor = Self { workspace, history };
        editor.history.init(&mut editor.workspace);
        editor
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Live markup of a region.
    pub fn content(&self, root: &RootKey) -> Option<String> {
        self.workspace.content(root)
    }

    // ── Editing ─────────────────────────────────────────────────────────

    /// Replaces a region's markup and records the edit.
    ///
    /// `caret` is an offset into the region's plain text; an offset past the
    /// end leaves the region without a selection.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a region of this editor.
    pub fn edit(
        &mut self,
        root: &RootKey,
        content: &str,
        caret: Option<usize>,
        delay: impl Into<Delay>,
    ) -> Result<()> {
        let Some(region) = self.workspace.region_mut(root) else {
            anyhow::bail!("unknown region '{root}'");
        };
        region.set_content(content);
        if let Some(range) = caret.and_then(|offset| region.caret_at(offset)) {
            region.select(range.start, range.end);
        }
        self.record(root, delay);
        Ok(())
    }

    /// Inserts markup at a char index of a region's source and records the
    /// edit with the caret after the inserted text.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is unknown or `char_idx` is out of bounds.
    pub fn insert_text(
        &mut self,
        root: &RootKey,
        char_idx: usize,
        text: &str,
        delay: impl Into<Delay>,
    ) -> Result<()> {
        let Some(region) = self.workspace.region_mut(root) else {
            anyhow::bail!("unknown region '{root}'");
        };
        region.insert(char_idx, text)?;
        self.record(root, delay);
        Ok(())
    }

    /// Replaces the char range `[start..end)` of a region's source and
    /// records the edit with the caret after the new text. An empty `text`
    /// deletes the range.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is unknown or the range is invalid.
    pub fn replace_text(
        &mut self,
        root: &RootKey,
        start: usize,
        end: usize,
        text: &str,
        delay: impl Into<Delay>,
    ) -> Result<()> {
        let Some(region) = self.workspace.region_mut(root) else {
            anyhow::bail!("unknown region '{root}'");
        };
        region.replace(start, end, text)?;
        self.record(root, delay);
        Ok(())
    }

    /// Replaces a region's markup without recording it. Pair with
    /// [`Editor::overwrite`] to fold the change into the current step.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a region of this editor.
    pub fn set_content(&mut self, root: &RootKey, content: &str) -> Result<()> {
        let Some(region) = self.workspace.region_mut(root) else {
            anyhow::bail!("unknown region '{root}'");
        };
        region.set_content(content);
        Ok(())
    }

    fn record(&mut self, root: &RootKey, delay: impl Into<Delay>) {
        let (content, range) = match self.workspace.region(root) {
            Some(region) => (region.content(), region.selection().copied()),
            None => return,
        };
        self.history
            .push(&mut self.workspace, &content, range.as_ref(), root, delay);
    }

    // ── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.workspace)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.workspace)
    }

    /// Folds the region's live content into its current history step.
    pub fn overwrite(&mut self, root: &RootKey) {
        self.history.overwrite(&mut self.workspace, root);
    }

    /// Commits a pending delayed edit now.
    pub fn flush(&mut self) -> bool {
        self.history.flush_pending(&mut self.workspace)
    }

    /// Commits a pending delayed edit whose deadline has passed.
    pub fn tick(&mut self) -> bool {
        self.history.tick(&mut self.workspace)
    }

    /// When [`Editor::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.history.next_deadline()
    }

    /// Drops all history; the live content becomes the new baseline.
    pub fn reset(&mut self) {
        self.history.reset(&mut self.workspace);
    }

    /// Marks the current state as saved.
    pub fn mark_saved(&mut self) {
        self.history.flush_pending(&mut self.workspace);
        self.history.mark_clean(&mut self.workspace);
    }

    pub fn destroy(&mut self) {
        self.history.destroy();
    }

    pub fn report(&self) -> Report {
        let regions = self
            .workspace
            .regions()
            .iter()
            .map(|region| RegionReport {
                key: region.key().to_string(),
                content: region.content(),
                caret: region.caret_offset(),
            })
            .collect();
        Report {
            regions,
            active: self.workspace.active().map(RootKey::to_string),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            is_dirty: self.history.is_dirty(),
            stack_index: self.history.stack_index(),
            stack_len: self.history.stack().len(),
            changes: self.workspace.change_count(),
        }
    }
}
