/// The global undo/redo timeline shared by all regions.
///
/// Every region keeps its own [`RootHistory`]; the timeline records which
/// region advanced at each global step, so undo and redo walk the edits of
/// all regions in the order they happened.
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::config::HistoryConfig;
use crate::host::{Affordance, EditorHost, HostNode};
use crate::path::{self, SelectionPaths, TreeRange};
use crate::root::{RootHistory, RootKey, Snapshot};
use crate::scheduler::{Clock, Delay, DelayedCommitScheduler, PendingCommit, SystemClock};

/// Owns the global timeline, every region's history and the pending commit.
pub struct HistoryStack {
    config: HistoryConfig,
    clock: Box<dyn Clock>,
    roots: HashMap<RootKey, RootHistory>,
    /// `stack[i]` names the region that advanced at global step `i`.
    stack: Vec<RootKey>,
    /// `None` until the first commit after a reset.
    stack_index: Option<usize>,
    scheduler: DelayedCommitScheduler,
    /// Global step that matches the saved state, if it still exists.
    clean_index: Option<usize>,
    destroyed: bool,
}

impl std::fmt::Debug for HistoryStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStack")
            .field("roots", &self.roots.len())
            .field("stack_len", &self.stack.len())
            .field("stack_index", &self.stack_index)
            .field("pending", &self.scheduler.is_pending())
            .field("clean_index", &self.clean_index)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryStack {
    /// Creates an empty stack driven by the wall clock.
    ///
    /// No region is tracked until [`HistoryStack::init`] or
    /// [`HistoryStack::reset`] runs.
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Creates an empty stack driven by `clock`.
    pub fn with_clock(config: HistoryConfig, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            roots: HashMap::new(),
            stack: Vec::new(),
            stack_index: None,
            scheduler: DelayedCommitScheduler::new(),
            clean_index: Some(0),
            destroyed: false,
        }
    }

    /// Captures every region's live content as its baseline.
    pub fn init<H: EditorHost>(&mut self, host: &mut H) {
        self.reset(host);
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn stack(&self) -> &[RootKey] {
        &self.stack
    }

    pub fn stack_index(&self) -> Option<usize> {
        self.stack_index
    }

    pub fn root(&self, key: &RootKey) -> Option<&RootHistory> {
        self.roots.get(key)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.stack_index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.stack_index, Some(i) if i + 1 < self.stack.len())
    }

    /// Whether the live state differs from the last clean point.
    pub fn is_dirty(&self) -> bool {
        self.clean_index != Some(self.position())
    }

    pub fn affordance(&self) -> Affordance {
        Affordance {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            is_dirty: self.is_dirty(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// When the pending delayed commit becomes due, for hosts that sleep
    /// between frames.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn position(&self) -> usize {
        self.stack_index.unwrap_or(0)
    }

    // ── Recording ───────────────────────────────────────────────────────

    /// Records an edit of `root`.
    ///
    /// The committed snapshot holds the region's live content at commit
    /// time; `content` only gates the call (an empty edit records nothing).
    /// The selection is encoded immediately, against the tree that is live
    /// now.
    ///
    /// A pending push whose deadline already passed is committed first, as
    /// if its timer had fired. An immediate push drops a pending push for
    /// the same root and commits a pending push for any other root.
    pub fn push<H: EditorHost>(
        &mut self,
        host: &mut H,
        content: &str,
        range: Option<&TreeRange<HostNode<H>>>,
        root: &RootKey,
        delay: impl Into<Delay>,
    ) {
        if self.destroyed {
            return;
        }
        if content.is_empty() {
            tracing::trace!("Ignoring empty push for root {root}");
            return;
        }

        let selection = match host.tree(root) {
            Some(tree) => path::encode(range, tree),
            None => SelectionPaths::default(),
        };

        let now = self.clock.now();
        self.commit_overdue(host, now);

        match delay.into().resolve(self.config.default_delay()) {
            None => {
                match self.scheduler.flush() {
                    Some(pending) if pending.root == *root => {
                        tracing::trace!(
                            "Immediate push for root {root} replaces its pending push"
                        );
                    }
                    Some(pending) => {
                        self.commit(host, &pending.root, pending.selection);
                    }
                    None => {}
                }
                self.commit(host, root, selection);
            }
            Some(wait) => {
                self.scheduler.schedule(PendingCommit {
                    root: root.clone(),
                    content: content.to_string(),
                    selection,
                    due: now + wait,
                });
            }
        }
    }

    /// Records a pending push whose deadline passed before the host fired
    /// it, with the content it was pushed with. Later edits may already be
    /// live, so the live content cannot stand in for it.
    fn commit_overdue<H: EditorHost>(&mut self, host: &mut H, now: Instant) {
        if let Some(pending) = self.scheduler.take_due(now) {
            tracing::debug!("Committing overdue push for root {}", pending.root);
            self.commit_content(host, &pending.root, pending.content, pending.selection);
        }
    }

    /// Commits the pending delayed push now, if there is one.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn flush_pending<H: EditorHost>(&mut self, host: &mut H) -> bool {
        if self.destroyed {
            return false;
        }
        match self.scheduler.flush() {
            Some(pending) => self.commit(host, &pending.root, pending.selection),
            None => false,
        }
    }

    /// Fires the pending delayed push if its deadline has passed.
    ///
    /// Hosts call this from their event loop. Returns whether a snapshot was
    /// recorded.
    pub fn tick<H: EditorHost>(&mut self, host: &mut H) -> bool {
        if self.destroyed {
            return false;
        }
        match self.scheduler.take_due(self.clock.now()) {
            Some(pending) => self.commit(host, &pending.root, pending.selection),
            None => false,
        }
    }

    /// Replaces the live snapshot of `root` with its current content without
    /// creating a new step.
    pub fn overwrite<H: EditorHost>(&mut self, host: &mut H, root: &RootKey) {
        if self.destroyed {
            return;
        }
        self.flush_pending(host);

        let Some(content) = host.content(root) else {
            tracing::warn!("Cannot overwrite unknown root {root}");
            return;
        };
        let Some(history) = self.roots.get_mut(root) else {
            tracing::warn!("Cannot overwrite untracked root {root}");
            return;
        };
        history.overwrite_current(content);
        tracing::debug!("Overwrote root {root} at local index {}", history.index());
    }

    /// Commits the live content of `key`.
    fn commit<H: EditorHost>(
        &mut self,
        host: &mut H,
        key: &RootKey,
        selection: SelectionPaths,
    ) -> bool {
        let Some(current) = host.content(key) else {
            tracing::warn!("Ignoring commit for unknown root {key}");
            return false;
        };
        self.commit_content(host, key, current, selection)
    }

    fn commit_content<H: EditorHost>(
        &mut self,
        host: &mut H,
        key: &RootKey,
        current: String,
        selection: SelectionPaths,
    ) -> bool {
        if current.is_empty() {
            tracing::trace!("Root {key} is empty, nothing to commit");
            return false;
        }
        match self.roots.get(key) {
            Some(root) if root.current().content == current => {
                tracing::trace!("Root {key} unchanged, nothing to commit");
                return false;
            }
            Some(_) => {}
            None => {
                tracing::warn!("Ignoring commit for root {key} that was not present at reset");
                return false;
            }
        }

        if self.can_redo() {
            self.discard_redo_branch(host, key);
        }

        let Some(root) = self.roots.get_mut(key) else {
            return false;
        };
        if !root.is_anchored() {
            root.anchor();
            self.stack.push(key.clone());
        }
        root.append(Snapshot::new(current, selection));
        self.stack.push(key.clone());
        self.stack_index = Some(self.stack.len() - 1);

        tracing::debug!(
            "Committed root {key} at local index {} (global {}/{})",
            root.index(),
            self.stack.len() - 1,
            self.stack.len()
        );

        self.notify(host);
        true
    }

    /// Drops every global step after the current one.
    ///
    /// Regions still referenced by the retained steps lose their local
    /// future; regions that are no longer referenced at all start over from
    /// their live content.
    fn discard_redo_branch<H: EditorHost>(&mut self, host: &H, acting: &RootKey) {
        let Some(index) = self.stack_index else {
            return;
        };
        let discarded = self.stack.split_off(index + 1);
        tracing::debug!("Discarding {} redo step(s)", discarded.len());

        if let Some(root) = self.roots.get_mut(acting) {
            root.truncate_future();
        }

        let mut seen = HashSet::new();
        for key in discarded {
            if !seen.insert(key.clone()) {
                continue;
            }
            let referenced = self.stack.contains(&key);
            let Some(root) = self.roots.get_mut(&key) else {
                continue;
            };
            if referenced {
                root.truncate_future();
            } else if key == *acting {
                root.rebase();
            } else {
                let live = host
                    .content(&key)
                    .unwrap_or_else(|| root.current().content.clone());
                *root = RootHistory::new(live);
            }
        }

        if matches!(self.clean_index, Some(clean) if clean > index) {
            self.clean_index = None;
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────

    /// Steps one global step back. Returns whether content changed.
    pub fn undo<H: EditorHost>(&mut self, host: &mut H) -> bool {
        if self.destroyed {
            return false;
        }
        self.flush_pending(host);
        if !self.can_undo() {
            tracing::trace!("Nothing to undo");
            return false;
        }
        self.navigate(host, -1)
    }

    /// Steps one global step forward. Returns whether content changed.
    pub fn redo<H: EditorHost>(&mut self, host: &mut H) -> bool {
        if self.destroyed {
            return false;
        }
        self.flush_pending(host);
        if !self.can_redo() {
            tracing::trace!("Nothing to redo");
            return false;
        }
        self.navigate(host, 1)
    }

    fn navigate<H: EditorHost>(&mut self, host: &mut H, step: isize) -> bool {
        let Some(prev_index) = self.stack_index else {
            return false;
        };
        let Some(target) = prev_index
            .checked_add_signed(step)
            .filter(|&i| i < self.stack.len())
        else {
            return false;
        };

        let prev_key = self.stack[prev_index].clone();
        let prev_local = self.roots.get(&prev_key).map_or(0, RootHistory::index);

        // Walking back, finish the region we were on before crossing over.
        let named = &self.stack[target];
        let key = if step < 0 && *named != prev_key && prev_local > 0 {
            prev_key.clone()
        } else {
            named.clone()
        };

        let Some(root) = self.roots.get_mut(&key) else {
            tracing::warn!("Timeline names untracked root {key}");
            self.stack_index = Some(target);
            self.notify(host);
            return false;
        };
        if !root.step(step) {
            tracing::warn!(
                "Root {key} cannot move {step} from local index {}",
                root.index()
            );
            self.stack_index = Some(target);
            self.notify(host);
            return false;
        }
        let local = root.index();
        let content = root.current().content.clone();

        // Skip the slot a region's baseline occupies between two regions.
        let switched = key != prev_key;
        let mut index = target;
        if switched && step < 0 && index == 1 {
            index = 0;
        } else if switched && step > 0 && local == 1 {
            index += 1;
        } else if step < 0 && local == 0 {
            index = index.saturating_sub(1);
        }
        let index = index.min(self.stack.len() - 1);
        self.stack_index = Some(index);

        host.set_content(&key, &content);

        // Back at a baseline: hand focus to the region the next undo touches.
        let mut focus = key.clone();
        if step < 0 && index > 0 && local == 0 && self.stack[index - 1] != key {
            focus = self.stack[index - 1].clone();
        }

        tracing::debug!(
            "Moved {step} to root {key} local index {local} (global {index}/{}), focus {focus}",
            self.stack.len()
        );

        host.activate(&focus);
        self.restore_selection(host, &focus);
        self.notify(host);
        true
    }

    fn restore_selection<H: EditorHost>(&self, host: &mut H, key: &RootKey) {
        let Some(selection) = self.roots.get(key).map(|r| r.current().selection()) else {
            return;
        };
        let Some(tree) = host.tree(key) else {
            tracing::warn!("No live tree for root {key}, selection not restored");
            return;
        };
        let start = path::decode_or_start(&selection.start, tree);
        let end = path::decode_or_start(&selection.end, tree);
        host.set_selection(key, start, end);
    }

    fn notify<H: EditorHost>(&self, host: &mut H) {
        host.on_affordance(self.affordance());
        host.on_change();
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Forgets all history and takes every region's live content as the new
    /// baseline. A pending delayed push is dropped; its edit is already part
    /// of the live content.
    pub fn reset<H: EditorHost>(&mut self, host: &mut H) {
        if self.destroyed {
            return;
        }
        self.scheduler.cancel();
        self.stack.clear();
        self.stack_index = None;
        self.roots.clear();
        for key in host.root_keys() {
            let content = host.content(&key).unwrap_or_default();
            self.roots.insert(key, RootHistory::new(content));
        }
        self.clean_index = Some(0);
        tracing::debug!("History reset with {} root(s)", self.roots.len());
        host.on_affordance(self.affordance());
    }

    /// Records the current step as the saved state.
    pub fn mark_clean<H: EditorHost>(&mut self, host: &mut H) {
        if self.destroyed {
            return;
        }
        self.clean_index = Some(self.position());
        host.on_affordance(self.affordance());
    }

    /// Re-sends the affordance signal, e.g. after the host rebuilt its
    /// controls.
    pub fn sync_affordance<H: EditorHost>(&self, host: &mut H) {
        if self.destroyed {
            return;
        }
        host.on_affordance(self.affordance());
    }

    /// Drops all state and cancels the pending commit. Every later call is
    /// a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.cancel();
        self.roots.clear();
        self.stack.clear();
        self.stack_index = None;
        self.clean_index = Some(0);
        self.destroyed = true;
        tracing::debug!("History destroyed");
    }
}
