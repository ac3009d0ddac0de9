use retrace_config::EditorConfig;
use retrace_core::history::{ManualClock, RootKey};
use retrace_core::{Editor, Region};

/// Creates an editor over `(key, markup)` regions driven by a manual clock.
pub fn create_editor(regions: &[(&str, &str)]) -> (Editor, ManualClock) {
    let regions = regions
        .iter()
        .map(|(key, markup)| Region::new(*key, markup))
        .collect();
    let clock = ManualClock::new();
    let editor = Editor::with_regions(&EditorConfig::default(), regions, clock.clone());
    (editor, clock)
}

pub fn key(k: &str) -> RootKey {
    RootKey::from(k)
}

/// Live markup of a region, empty if the region is unknown.
pub fn content(editor: &Editor, k: &str) -> String {
    editor.content(&key(k)).unwrap_or_default()
}
