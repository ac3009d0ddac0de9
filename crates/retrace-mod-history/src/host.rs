/// Collaborator interfaces consumed and fed by the history engine.
use crate::path::{NodeTree, TreePosition};
use crate::root::RootKey;

/// Shorthand for the node handle of a host's content tree.
pub type HostNode<H> = <<H as EditorHost>::Tree as NodeTree>::Node;

/// What the editor around the history engine has to provide.
///
/// The host is passed by `&mut` into every history operation and is only
/// notified once the operation's state change has settled.
pub trait EditorHost {
    /// Live content tree of one region.
    type Tree: NodeTree;

    /// All regions known to the editor, in display order.
    fn root_keys(&self) -> Vec<RootKey>;

    /// Serialized live content of `root`, or `None` if the region is unknown.
    fn content(&self, root: &RootKey) -> Option<String>;

    /// Replaces the live content of `root` wholesale.
    fn set_content(&mut self, root: &RootKey, content: &str);

    /// The live content tree of `root`.
    fn tree(&self, root: &RootKey) -> Option<&Self::Tree>;

    /// Applies a selection inside `root`.
    fn set_selection(
        &mut self,
        root: &RootKey,
        start: TreePosition<<Self::Tree as NodeTree>::Node>,
        end: TreePosition<<Self::Tree as NodeTree>::Node>,
    );

    /// Moves focus to `root`.
    fn activate(&mut self, root: &RootKey);

    /// A commit or navigation changed the history.
    fn on_change(&mut self) {}

    /// Undo/redo/save availability was recomputed.
    fn on_affordance(&mut self, _affordance: Affordance) {}
}

/// Availability of the undo/redo affordances and the unsaved-changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affordance {
    pub can_undo: bool,
    pub can_redo: bool,
    pub is_dirty: bool,
}
