/// Structural selection paths.
///
/// A live selection points at tree nodes that stop existing as soon as a
/// region's content is replaced wholesale. Snapshots therefore store each
/// endpoint as a sequence of child ordinals from the region root plus an
/// offset, and re-resolve that path against whatever tree is live when the
/// snapshot is restored.
use serde::{Deserialize, Serialize};

/// Read-only view of a region's live content tree.
pub trait NodeTree {
    /// Handle to one node of the tree. Only valid for the tree it came from.
    type Node: Copy + Eq + std::fmt::Debug;

    /// The region root. Paths are relative to this node.
    fn root(&self) -> Self::Node;

    /// Parent of `node`, or `None` for the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// The child at `ordinal`, or `None` if out of range.
    fn child(&self, node: Self::Node, ordinal: usize) -> Option<Self::Node>;

    /// Position of `node` among its parent's children.
    fn index_in_parent(&self, node: Self::Node) -> Option<usize>;

    /// Largest valid offset inside `node` (character count for text,
    /// child count for elements).
    fn offset_limit(&self, node: Self::Node) -> usize;
}

/// One selection endpoint in a live tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreePosition<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> TreePosition<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A live selection: two endpoints in the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRange<N> {
    pub start: TreePosition<N>,
    pub end: TreePosition<N>,
}

impl<N: Copy> TreeRange<N> {
    /// A caret: both endpoints at `position`.
    pub fn collapsed(position: TreePosition<N>) -> Self {
        Self {
            start: position,
            end: position,
        }
    }
}

/// An endpoint stored as child ordinals from the region root plus an offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOffset {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl PathOffset {
    /// The canonical "no selection / start of document" endpoint.
    pub fn start_of_document() -> Self {
        Self {
            path: vec![0, 0],
            offset: 0,
        }
    }

    pub fn is_start_of_document(&self) -> bool {
        self.offset == 0 && self.path == [0, 0]
    }
}

impl Default for PathOffset {
    fn default() -> Self {
        Self::start_of_document()
    }
}

/// Both endpoints of an encoded selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionPaths {
    pub start: PathOffset,
    pub end: PathOffset,
}

/// Result of resolving a [`PathOffset`] against a live tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<N> {
    pub position: TreePosition<N>,
    /// False when the walk stopped early because the tree shape changed.
    pub exact: bool,
}

/// Child ordinals from the tree root down to `node`.
///
/// Returns `None` if `node` is not reachable from the root.
pub fn path_to<T: NodeTree>(tree: &T, node: T::Node) -> Option<Vec<usize>> {
    let root = tree.root();
    let mut path = Vec::new();
    let mut current = node;
    while current != root {
        path.push(tree.index_in_parent(current)?);
        current = tree.parent(current)?;
    }
    path.reverse();
    Some(path)
}

/// Encodes a single endpoint. Detached nodes encode to the sentinel.
pub fn encode_position<T: NodeTree>(tree: &T, position: &TreePosition<T::Node>) -> PathOffset {
    match path_to(tree, position.node) {
        Some(path) => PathOffset {
            path,
            offset: position.offset,
        },
        None => {
            tracing::warn!("Selection endpoint {:?} is outside the region", position.node);
            PathOffset::start_of_document()
        }
    }
}

/// Encodes a live selection. A missing range encodes to the sentinel.
pub fn encode<T: NodeTree>(range: Option<&TreeRange<T::Node>>, tree: &T) -> SelectionPaths {
    match range {
        Some(range) => SelectionPaths {
            start: encode_position(tree, &range.start),
            end: encode_position(tree, &range.end),
        },
        None => SelectionPaths::default(),
    }
}

/// Walks `target.path` from the tree root.
///
/// An ordinal that is out of range stops the walk; the deepest node reached
/// so far is returned with `exact == false`. The offset is clamped to the
/// resolved node's limit.
pub fn decode<T: NodeTree>(target: &PathOffset, tree: &T) -> Resolved<T::Node> {
    let mut node = tree.root();
    let mut exact = true;
    for &ordinal in &target.path {
        match tree.child(node, ordinal) {
            Some(child) => node = child,
            None => {
                exact = false;
                break;
            }
        }
    }
    let offset = if exact {
        target.offset.min(tree.offset_limit(node))
    } else {
        0
    };
    Resolved {
        position: TreePosition::new(node, offset),
        exact,
    }
}

/// Decodes `target`, falling back to the start of the document when the
/// stored path no longer fits the tree.
pub fn decode_or_start<T: NodeTree>(target: &PathOffset, tree: &T) -> TreePosition<T::Node> {
    let resolved = decode(target, tree);
    if resolved.exact {
        return resolved.position;
    }
    tracing::debug!("Path {:?} no longer resolves, using start of document", target.path);
    decode(&PathOffset::start_of_document(), tree).position
}
