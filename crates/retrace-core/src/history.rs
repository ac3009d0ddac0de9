// Re-exports from retrace-mod-history.
// Core code and downstream crates reach the history engine through here.
pub use retrace_mod_history::{
    Affordance, Clock, Delay, EditorHost, HistoryConfig, HistoryStack, ManualClock, NodeTree,
    PathOffset, RootKey, SelectionPaths, SystemClock, TreePosition, TreeRange,
};
