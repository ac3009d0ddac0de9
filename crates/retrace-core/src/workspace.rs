/// The set of editable regions the history engine works against.
use crate::controls::UndoRedoController;
use crate::history::{Affordance, EditorHost, RootKey, TreePosition};
use crate::markup::{MarkupTree, NodeId};
use crate::region::Region;

/// Ordered regions plus focus and affordance state.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    regions: Vec<Region>,
    active: Option<RootKey>,
    controls: UndoRedoController,
    change_count: usize,
}

impl Workspace {
    pub fn new(regions: Vec<Region>) -> Self {
        let active = regions.first().map(|r| r.key().clone());
        Self {
            regions,
            active,
            ..Self::default()
        }
    }

    /// Creates one empty region per key, skipping duplicates.
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<RootKey>,
    {
        let mut regions: Vec<Region> = Vec::new();
        for key in keys {
            let key = key.into();
            if regions.iter().any(|r| *r.key() == key) {
                continue;
            }
            regions.push(Region::new(key, ""));
        }
        Self::new(regions)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, key: &RootKey) -> Option<&Region> {
        self.regions.iter().find(|r| r.key() == key)
    }

    pub fn region_mut(&mut self, key: &RootKey) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.key() == key)
    }

    /// The focused region's key.
    pub fn active(&self) -> Option<&RootKey> {
        self.active.as_ref()
    }

    pub fn controls(&self) -> &UndoRedoController {
        &self.controls
    }

    /// Number of history change notifications received.
    pub fn change_count(&self) -> usize {
        self.change_count
    }
}

impl EditorHost for Workspace {
    type Tree = MarkupTree;

    fn root_keys(&self) -> Vec<RootKey> {
        self.regions.iter().map(|r| r.key().clone()).collect()
    }

    fn content(&self, root: &RootKey) -> Option<String> {
        self.region(root).map(Region::content)
    }

    fn set_content(&mut self, root: &RootKey, content: &str) {
        match self.region_mut(root) {
            Some(region) => region.set_content(content),
            None => tracing::warn!("Cannot set content of unknown region {root}"),
        }
    }

    fn tree(&self, root: &RootKey) -> Option<&MarkupTree> {
        self.region(root).map(Region::tree)
    }

    fn set_selection(
        &mut self,
        root: &RootKey,
        start: TreePosition<NodeId>,
        end: TreePosition<NodeId>,
    ) {
        match self.region_mut(root) {
            Some(region) => region.select(start, end),
            None => tracing::warn!("Cannot select in unknown region {root}"),
        }
    }

    fn activate(&mut self, root: &RootKey) {
        if self.active.as_ref() != Some(root) {
            tracing::debug!("Focus moved to region {root}");
        }
        self.active = Some(root.clone());
    }

    fn on_change(&mut self) {
        self.change_count += 1;
    }

    fn on_affordance(&mut self, affordance: Affordance) {
        self.controls.apply(affordance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_region_is_active() {
        let ws = Workspace::with_keys(["title", "body"]);
        assert_eq!(ws.active().map(RootKey::as_str), Some("title"));
        assert_eq!(ws.root_keys(), vec![RootKey::from("title"), RootKey::from("body")]);
    }

    #[test]
    fn test_duplicate_keys_are_skipped() {
        let ws = Workspace::with_keys(["a", "b", "a"]);
        assert_eq!(ws.regions().len(), 2);
    }

    #[test]
    fn test_content_round_trip() {
        let mut ws = Workspace::with_keys(["main"]);
        let key = RootKey::from("main");
        ws.set_content(&key, "<p>x</p>");
        assert_eq!(ws.content(&key).as_deref(), Some("<p>x</p>"));
        assert_eq!(ws.tree(&key).map(MarkupTree::plain_text).as_deref(), Some("x"));
    }

    #[test]
    fn test_unknown_region_is_ignored() {
        let mut ws = Workspace::with_keys(["main"]);
        let missing = RootKey::from("missing");
        ws.set_content(&missing, "<p>x</p>");
        assert!(ws.content(&missing).is_none());
        assert!(ws.tree(&missing).is_none());
    }

    #[test]
    fn test_notifications_are_recorded() {
        let mut ws = Workspace::with_keys(["main"]);
        ws.on_change();
        ws.on_affordance(Affordance {
            can_undo: true,
            can_redo: false,
            is_dirty: true,
        });
        assert_eq!(ws.change_count(), 1);
        assert!(ws.controls().undo_enabled());
        assert!(ws.controls().is_changed());
    }

    #[test]
    fn test_activate_moves_focus() {
        let mut ws = Workspace::with_keys(["a", "b"]);
        ws.activate(&RootKey::from("b"));
        assert_eq!(ws.active().map(RootKey::as_str), Some("b"));
    }
}
