/// Content tree for serialized region markup.
///
/// The parser is lenient in the way editors need: unknown tags are kept,
/// void and self-closing elements take no children, unmatched closing tags
/// are ignored and unclosed elements end with the document. Comments are
/// dropped. Text is kept verbatim, entities included.
use retrace_mod_history::{NodeTree, TreePosition};

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Handle to a node of one [`MarkupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

enum Tag {
    Open { name: String, self_closing: bool },
    Close(String),
    Comment,
}

/// Arena tree parsed from a region's markup.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<NodeData>,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }
}

impl MarkupTree {
    pub fn parse(source: &str) -> Self {
        let mut tree = Self::default();
        let mut open = vec![ROOT];
        let mut text = String::new();
        let mut pos = 0;

        while pos < source.len() {
            let rest = &source[pos..];
            if rest.starts_with('<') {
                if let Some((tag, len)) = scan_tag(rest) {
                    let parent = open.last().copied().unwrap_or(ROOT);
                    tree.flush_text(&mut text, parent);
                    match tag {
                        Tag::Open { name, self_closing } => {
                            let void = self_closing || VOID_ELEMENTS.contains(&name.as_str());
                            let id = tree.add(parent, NodeKind::Element(name));
                            if !void {
                                open.push(id);
                            }
                        }
                        Tag::Close(name) => {
                            let matching =
                                open.iter().rposition(|&id| tree.tag(id) == Some(name.as_str()));
                            if let Some(i) = matching {
                                open.truncate(i);
                            }
                        }
                        Tag::Comment => {}
                    }
                    pos += len;
                    continue;
                }
            }
            // Plain text up to the next '<' (a stray '<' is text too).
            let next = match rest.strip_prefix('<') {
                Some(after) => after.find('<').map_or(rest.len(), |i| i + 1),
                None => rest.find('<').unwrap_or(rest.len()),
            };
            text.push_str(&rest[..next]);
            pos += next;
        }

        let parent = open.last().copied().unwrap_or(ROOT);
        tree.flush_text(&mut text, parent);
        tree
    }

    fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn flush_text(&mut self, text: &mut String, parent: NodeId) {
        if !text.is_empty() {
            self.add(parent, NodeKind::Text(std::mem::take(text)));
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT.0].children.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element(name) => Some(name),
            _ => None,
        }
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text nodes in document order.
    pub fn text_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![ROOT];
        while let Some(id) = pending.pop() {
            if self.text(id).is_some() {
                out.push(id);
            }
            pending.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Concatenated text of the whole tree.
    pub fn plain_text(&self) -> String {
        self.text_nodes()
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Maps an offset into [`MarkupTree::plain_text`] to a text position.
    ///
    /// An offset on the boundary between two text nodes resolves to the end
    /// of the first one. Returns `None` past the end of the text or for a
    /// tree without text.
    pub fn locate(&self, text_offset: usize) -> Option<TreePosition<NodeId>> {
        let mut remaining = text_offset;
        for id in self.text_nodes() {
            let len = self.text(id).map_or(0, |t| t.chars().count());
            if remaining <= len {
                return Some(TreePosition::new(id, remaining));
            }
            remaining -= len;
        }
        None
    }

    /// Inverse of [`MarkupTree::locate`] for positions inside text nodes.
    pub fn text_offset(&self, position: &TreePosition<NodeId>) -> Option<usize> {
        let mut before = 0;
        for id in self.text_nodes() {
            let len = self.text(id).map_or(0, |t| t.chars().count());
            if id == position.node {
                return Some(before + position.offset.min(len));
            }
            before += len;
        }
        None
    }
}

impl NodeTree for MarkupTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        ROOT
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn child(&self, node: NodeId, ordinal: usize) -> Option<NodeId> {
        self.children(node).get(ordinal).copied()
    }

    fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    fn offset_limit(&self, node: NodeId) -> usize {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => text.chars().count(),
            Some(_) => self.children(node).len(),
            None => 0,
        }
    }
}

/// Recognizes a tag, closing tag or comment at the start of `rest`.
///
/// Returns the tag and its length in bytes, or `None` if `rest` does not
/// start with well-formed markup.
fn scan_tag(rest: &str) -> Option<(Tag, usize)> {
    if let Some(body) = rest.strip_prefix("<!--") {
        let end = body.find("-->")?;
        return Some((Tag::Comment, 4 + end + 3));
    }

    let (closing, skip) = if rest.starts_with("</") {
        (true, 2)
    } else {
        (false, 1)
    };
    let body = &rest[skip..];
    if !body.chars().next()?.is_ascii_alphabetic() {
        return None;
    }

    let end = tag_end(body)?;
    let inner = &body[..end];
    let name_len = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_len].to_ascii_lowercase();
    let len = skip + end + 1;

    if closing {
        Some((Tag::Close(name), len))
    } else {
        let self_closing = inner.trim_end().ends_with('/');
        Some((Tag::Open { name, self_closing }, len))
    }
}

/// Byte index of the `>` closing a tag body, skipping quoted attribute values.
fn tag_end(body: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}
