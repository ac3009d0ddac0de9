pub mod buffer;
pub mod controls;
pub mod editor;
pub mod history;
pub mod markup;
pub mod region;
pub mod workspace;

pub use editor::{Editor, RegionReport, Report};
pub use region::Region;
pub use workspace::Workspace;
