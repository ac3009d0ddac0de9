use retrace_config::EditorConfig;

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retrace.json");
    assert!(!path.exists());

    let config = EditorConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config, EditorConfig::default());

    // File should contain valid JSON
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert!(parsed.is_object());
    assert_eq!(parsed["history_stack_delay_ms"], 400);
}

#[test]
fn test_load_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("retrace.json");

    EditorConfig::load_or_create(&path);
    assert!(path.exists());
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retrace.json");
    let json = r#"{
        "history_stack_delay_ms": 120,
        "log_filter": "retrace=debug",
        "root_keys": ["title", "body"]
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config.history_stack_delay_ms, 120);
    assert_eq!(config.log_filter, "retrace=debug");
    assert_eq!(config.root_keys, vec!["title", "body"]);
}

#[test]
fn test_broken_json_returns_defaults_without_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retrace.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config, EditorConfig::default());
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "{ this is not valid json }}}");
}

#[test]
fn test_loaded_config_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retrace.json");
    std::fs::write(
        &path,
        r#"{"history_stack_delay_ms": 999999, "root_keys": []}"#,
    )
    .unwrap();

    let config = EditorConfig::load_or_create(&path);
    assert_eq!(config.history_stack_delay_ms, 10_000);
    assert_eq!(config.root_keys, vec!["main"]);
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retrace.json");
    let config = EditorConfig {
        history_stack_delay_ms: 75,
        log_filter: "warn".to_string(),
        root_keys: vec!["left".to_string(), "right".to_string()],
    };
    config.save(&path).unwrap();

    let loaded = EditorConfig::load_or_create(&path);
    assert_eq!(loaded, config);
}
