/// Undo/redo history for editors with several editable regions.
///
/// Every region ("root") keeps full-content snapshots of its own, while a
/// single global timeline orders the steps of all regions. Rapid edits are
/// coalesced by a delayed commit, and selections are stored as structural
/// paths so they can be restored after content is replaced wholesale.
pub mod config;
pub mod host;
pub mod path;
pub mod root;
pub mod scheduler;
pub mod stack;

pub use config::HistoryConfig;
pub use host::{Affordance, EditorHost, HostNode};
pub use path::{NodeTree, PathOffset, SelectionPaths, TreePosition, TreeRange};
pub use root::{RootHistory, RootKey, Snapshot};
pub use scheduler::{Clock, Delay, ManualClock, SystemClock};
pub use stack::HistoryStack;
