/// Scripted editing sessions replayed against a virtual clock.
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use retrace_config::EditorConfig;
use retrace_core::history::{Delay, ManualClock, RootKey};
use retrace_core::{Editor, Region, Report};
use serde::Deserialize;

/// Initial content of one region.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionSpec {
    pub key: String,
    #[serde(default)]
    pub content: String,
}

/// Delay of a recorded edit: `true`/`false` or a number of milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DelaySpec {
    Flag(bool),
    Millis(u64),
}

impl Default for DelaySpec {
    fn default() -> Self {
        DelaySpec::Flag(false)
    }
}

impl From<DelaySpec> for Delay {
    fn from(spec: DelaySpec) -> Self {
        match spec {
            DelaySpec::Flag(delayed) => Delay::from(delayed),
            DelaySpec::Millis(ms) => Delay::from(ms),
        }
    }
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Replace a region's markup and record it.
    Edit {
        root: String,
        content: String,
        #[serde(default)]
        caret: Option<usize>,
        #[serde(default)]
        delay: DelaySpec,
    },
    /// Insert markup at a char index of a region's source and record it.
    Insert {
        root: String,
        at: usize,
        text: String,
        #[serde(default)]
        delay: DelaySpec,
    },
    /// Replace a char range of a region's source and record it.
    Replace {
        root: String,
        start: usize,
        end: usize,
        #[serde(default)]
        text: String,
        #[serde(default)]
        delay: DelaySpec,
    },
    /// Replace a region's markup without recording it.
    Set { root: String, content: String },
    /// Advance virtual time, then fire a due commit.
    Wait { ms: u64 },
    Undo,
    Redo,
    Overwrite { root: String },
    Flush,
    Reset,
    Save,
}

/// A replayable session.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Regions to start with. Empty means one empty region per configured
    /// root key.
    #[serde(default)]
    pub regions: Vec<RegionSpec>,
    pub steps: Vec<Step>,
}

impl Script {
    /// Reads a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid script.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid script: {}", path.display()))
    }

    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse script JSON")
    }

    /// Runs every step and reports the final state.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first step that fails.
    pub fn replay(&self, config: &EditorConfig) -> Result<Report> {
        let clock = ManualClock::new();
        let mut editor = if self.regions.is_empty() {
            Editor::with_clock(config, clock.clone())
        } else {
            let regions = self
                .regions
                .iter()
                .map(|r| Region::new(r.key.as_str(), &r.content))
                .collect();
            Editor::with_regions(config, regions, clock.clone())
        };

        for (i, step) in self.steps.iter().enumerate() {
            apply(&mut editor, &clock, step)
                .with_context(|| format!("Step {} ({step:?}) failed", i + 1))?;
        }

        tracing::info!(
            "Replayed {} step(s), history at {:?}",
            self.steps.len(),
            editor.history().stack_index()
        );
        Ok(editor.report())
    }
}

fn apply(editor: &mut Editor, clock: &ManualClock, step: &Step) -> Result<()> {
    tracing::debug!("Applying {step:?}");
    match step {
        Step::Edit {
            root,
            content,
            caret,
            delay,
        } => editor.edit(&RootKey::from(root.as_str()), content, *caret, *delay)?,
        Step::Insert {
            root,
            at,
            text,
            delay,
        } => editor.insert_text(&RootKey::from(root.as_str()), *at, text, *delay)?,
        Step::Replace {
            root,
            start,
            end,
            text,
            delay,
        } => editor.replace_text(&RootKey::from(root.as_str()), *start, *end, text, *delay)?,
        Step::Set { root, content } => {
            editor.set_content(&RootKey::from(root.as_str()), content)?
        }
        Step::Wait { ms } => {
            clock.advance(Duration::from_millis(*ms));
            editor.tick();
        }
        Step::Undo => {
            editor.undo();
        }
        Step::Redo => {
            editor.redo();
        }
        Step::Overwrite { root } => editor.overwrite(&RootKey::from(root.as_str())),
        Step::Flush => {
            editor.flush();
        }
        Step::Reset => editor.reset(),
        Step::Save => editor.mark_saved(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(json: &str) -> Report {
        Script::parse(json)
            .unwrap()
            .replay(&EditorConfig::default())
            .unwrap()
    }

    #[test]
    fn test_parse_steps() {
        let script = Script::parse(
            r#"{"steps": [
                {"op": "edit", "root": "main", "content": "<p>a</p>", "caret": 1, "delay": true},
                {"op": "insert", "root": "main", "at": 4, "text": "b", "delay": 250},
                {"op": "wait", "ms": 400},
                {"op": "undo"}
            ]}"#,
        )
        .unwrap();
        assert!(script.regions.is_empty());
        assert_eq!(script.steps.len(), 4);
        assert_eq!(
            script.steps[1],
            Step::Insert {
                root: "main".to_string(),
                at: 4,
                text: "b".to_string(),
                delay: DelaySpec::Millis(250),
            }
        );
        assert_eq!(script.steps[3], Step::Undo);
    }

    #[test]
    fn test_delay_defaults_to_immediate() {
        let script =
            Script::parse(r#"{"steps": [{"op": "edit", "root": "main", "content": "x"}]}"#)
                .unwrap();
        match &script.steps[0] {
            Step::Edit { delay, caret, .. } => {
                assert_eq!(*delay, DelaySpec::Flag(false));
                assert_eq!(*caret, None);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(Script::parse(r#"{"steps": [{"op": "explode"}]}"#).is_err());
    }

    #[test]
    fn test_replay_typing_burst() {
        let report = run(
            r#"{
                "regions": [{"key": "body", "content": "<p></p>"}],
                "steps": [
                    {"op": "edit", "root": "body", "content": "<p>a</p>", "delay": true},
                    {"op": "wait", "ms": 100},
                    {"op": "edit", "root": "body", "content": "<p>ab</p>", "delay": true},
                    {"op": "wait", "ms": 400},
                    {"op": "edit", "root": "body", "content": "<p>abc</p>"},
                    {"op": "undo"}
                ]
            }"#,
        );
        assert_eq!(report.regions[0].content, "<p>ab</p>");
        assert_eq!(report.stack_len, 3);
        assert!(report.can_undo);
        assert!(report.can_redo);
    }

    #[test]
    fn test_replay_replace_deletes_when_text_is_missing() {
        let report = run(
            r#"{
                "regions": [{"key": "body", "content": "<p>abc</p>"}],
                "steps": [{"op": "replace", "root": "body", "start": 4, "end": 5}]
            }"#,
        );
        assert_eq!(report.regions[0].content, "<p>ac</p>");
        assert!(report.can_undo);
    }

    #[test]
    fn test_replay_uses_configured_regions() {
        let report = run(
            r#"{"steps": [{"op": "edit", "root": "main", "content": "<p>x</p>"}, {"op": "save"}]}"#,
        );
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.regions[0].key, "main");
        assert!(!report.is_dirty);
    }

    #[test]
    fn test_replay_reports_failing_step() {
        let script = Script::parse(
            r#"{"steps": [{"op": "undo"}, {"op": "edit", "root": "nope", "content": "x"}]}"#,
        )
        .unwrap();
        let err = script.replay(&EditorConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Step 2"));
    }

    #[test]
    fn test_overwrite_after_unrecorded_change() {
        let report = run(
            r#"{
                "regions": [{"key": "body"}],
                "steps": [
                    {"op": "edit", "root": "body", "content": "<p>a</p>"},
                    {"op": "set", "root": "body", "content": "<p>A</p>"},
                    {"op": "overwrite", "root": "body"},
                    {"op": "undo"},
                    {"op": "redo"}
                ]
            }"#,
        );
        assert_eq!(report.regions[0].content, "<p>A</p>");
        assert_eq!(report.stack_len, 2);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"steps": [{"op": "reset"}]}"#).unwrap();
        let script = Script::load(&path).unwrap();
        assert_eq!(script.steps, vec![Step::Reset]);

        assert!(Script::load(&dir.path().join("missing.json")).is_err());
    }
}
