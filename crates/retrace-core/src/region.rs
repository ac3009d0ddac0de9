/// One editable region: its markup source, parsed tree and selection.
use anyhow::Result;

use crate::buffer::TextBuffer;
use crate::history::{RootKey, TreePosition, TreeRange};
use crate::markup::{MarkupTree, NodeId};

/// An editable region ("root") of the workspace.
///
/// The markup source is the region's serialized content; the tree is
/// reparsed on every change so it always reflects the source.
#[derive(Debug, Clone)]
pub struct Region {
    key: RootKey,
    buffer: TextBuffer,
    tree: MarkupTree,
    selection: Option<TreeRange<NodeId>>,
}

impl Region {
    pub fn new(key: impl Into<RootKey>, content: &str) -> Self {
        Self {
            key: key.into(),
            buffer: TextBuffer::from(content),
            tree: MarkupTree::parse(content),
            selection: None,
        }
    }

    pub fn key(&self) -> &RootKey {
        &self.key
    }

    /// Serialized markup of the region.
    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    pub fn tree(&self) -> &MarkupTree {
        &self.tree
    }

    pub fn selection(&self) -> Option<&TreeRange<NodeId>> {
        self.selection.as_ref()
    }

    /// Replaces the markup wholesale. Node handles from the old tree are
    /// stale afterwards, so the selection is dropped.
    pub fn set_content(&mut self, content: &str) {
        self.buffer.set_text(content);
        self.reparse();
    }

    /// Inserts markup at a char index of the source and puts the caret
    /// after it.
    ///
    /// # Errors
    ///
    /// Returns an error if `char_idx` is past the end of the source.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        self.buffer.insert(char_idx, text)?;
        self.reparse();
        self.caret_after(char_idx + text.chars().count());
        Ok(())
    }

    /// Replaces the char range `[start..end)` of the source and puts the
    /// caret after the new text.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or out of bounds.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        self.buffer.replace(start, end, text)?;
        self.reparse();
        self.caret_after(start + text.chars().count());
        Ok(())
    }

    pub fn select(&mut self, start: TreePosition<NodeId>, end: TreePosition<NodeId>) {
        self.selection = Some(TreeRange { start, end });
    }

    /// Collapsed range at an offset into the region's plain text.
    pub fn caret_at(&self, text_offset: usize) -> Option<TreeRange<NodeId>> {
        self.tree.locate(text_offset).map(TreeRange::collapsed)
    }

    /// Offset of the selection start in the region's plain text.
    pub fn caret_offset(&self) -> Option<usize> {
        let selection = self.selection.as_ref()?;
        self.tree.text_offset(&selection.start)
    }

    /// Collapses the selection where source char `char_idx` lands in the
    /// plain text. A region without text is left without a selection.
    fn caret_after(&mut self, char_idx: usize) {
        let prefix: String = self.buffer.to_string().chars().take(char_idx).collect();
        let offset = MarkupTree::parse(&prefix).plain_text().chars().count();
        self.selection = self.caret_at(offset);
    }

    fn reparse(&mut self) {
        self.tree = MarkupTree::parse(&self.buffer.to_string());
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_region_parses_content() {
        let region = Region::new("body", "<p>hello</p>");
        assert_eq!(region.key().as_str(), "body");
        assert_eq!(region.content(), "<p>hello</p>");
        assert_eq!(region.tree().plain_text(), "hello");
        assert!(region.selection().is_none());
    }

    #[test]
    fn test_set_content_reparses_and_drops_selection() {
        let mut region = Region::new("body", "<p>hello</p>");
        let caret = region.caret_at(2).unwrap();
        region.select(caret.start, caret.end);
        assert_eq!(region.caret_offset(), Some(2));

        region.set_content("<p>a</p><p>b</p>");
        assert_eq!(region.tree().plain_text(), "ab");
        assert!(region.selection().is_none());
    }

    #[test]
    fn test_insert_into_source() {
        let mut region = Region::new("body", "<p>helo</p>");
        region.insert(6, "l").unwrap();
        assert_eq!(region.content(), "<p>hello</p>");
        assert_eq!(region.tree().plain_text(), "hello");
        assert_eq!(region.caret_offset(), Some(4));
    }

    #[test]
    fn test_insert_markup_puts_caret_after_its_text() {
        let mut region = Region::new("body", "<p>ab</p>");
        region.insert(4, "<b>xy</b>").unwrap();
        assert_eq!(region.tree().plain_text(), "axyb");
        assert_eq!(region.caret_offset(), Some(3));
    }

    #[test]
    fn test_insert_out_of_bounds_leaves_region_untouched() {
        let mut region = Region::new("body", "<p>x</p>");
        assert!(region.insert(100, "y").is_err());
        assert_eq!(region.content(), "<p>x</p>");
    }

    #[test]
    fn test_replace_range() {
        let mut region = Region::new("body", "<p>old</p>");
        region.replace(3, 6, "new").unwrap();
        assert_eq!(region.content(), "<p>new</p>");
        assert_eq!(region.caret_offset(), Some(3));
        assert!(region.replace(6, 3, "x").is_err());

        region.replace(4, 6, "").unwrap();
        assert_eq!(region.content(), "<p>n</p>");
        assert_eq!(region.caret_offset(), Some(1));
    }

    #[test]
    fn test_caret_at_past_end_is_none() {
        let region = Region::new("body", "<p>abc</p>");
        assert!(region.caret_at(3).is_some());
        assert!(region.caret_at(4).is_none());
        assert!(Region::new("empty", "").caret_at(0).is_none());
    }
}
