/// Per-region snapshot history.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::{PathOffset, SelectionPaths};

/// Identifies one editable region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RootKey(String);

impl RootKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RootKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for RootKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorded state of a region: full content plus selection endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub content: String,
    pub start: PathOffset,
    pub end: PathOffset,
}

impl Snapshot {
    pub fn new(content: String, selection: SelectionPaths) -> Self {
        Self {
            content,
            start: selection.start,
            end: selection.end,
        }
    }

    /// A snapshot with the selection at the start of the document.
    pub fn baseline(content: String) -> Self {
        Self::new(content, SelectionPaths::default())
    }

    pub fn selection(&self) -> SelectionPaths {
        SelectionPaths {
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

/// Ordered snapshots of one region and the index of the one that is live.
///
/// Always holds at least the baseline snapshot. A history is *anchored*
/// once its baseline occupies a slot on the global timeline; that happens
/// lazily, on the region's first commit.
#[derive(Debug, Clone)]
pub struct RootHistory {
    values: Vec<Snapshot>,
    index: usize,
    anchored: bool,
}

impl RootHistory {
    /// Creates an unanchored history whose only snapshot is `content`.
    pub fn new(content: String) -> Self {
        Self {
            values: vec![Snapshot::baseline(content)],
            index: 0,
            anchored: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Snapshot] {
        &self.values
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Marks the baseline as placed on the global timeline.
    pub fn anchor(&mut self) {
        self.anchored = true;
    }

    /// The live snapshot.
    pub fn current(&self) -> &Snapshot {
        &self.values[self.index]
    }

    /// Drops every snapshot after the current one.
    pub fn truncate_future(&mut self) {
        self.values.truncate(self.index + 1);
    }

    /// Collapses to the current snapshot as a fresh, unanchored baseline.
    pub fn rebase(&mut self) {
        let current = self.values.swap_remove(self.index);
        self.values = vec![current];
        self.index = 0;
        self.anchored = false;
    }

    /// Appends `snapshot` after the current one, discarding any local future.
    pub fn append(&mut self, snapshot: Snapshot) {
        self.truncate_future();
        self.values.push(snapshot);
        self.index = self.values.len() - 1;
    }

    /// Replaces the current snapshot's content, keeping its selection.
    pub fn overwrite_current(&mut self, content: String) {
        self.values[self.index].content = content;
    }

    /// Moves the local index by `delta`.
    ///
    /// Returns `false` and leaves the index unchanged if the move would
    /// leave `[0, len - 1]`.
    pub fn step(&mut self, delta: isize) -> bool {
        match self.index.checked_add_signed(delta) {
            Some(next) if next < self.values.len() => {
                self.index = next;
                true
            }
            _ => false,
        }
    }
}
