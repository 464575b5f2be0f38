use std::collections::HashMap;

use super::*;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut settings = toml::from_str::<Settings>("").expect("empty toml");
    apply_env_overrides(&mut settings, |_| None);
    assert_eq!(settings, Settings::default());

    let path = dir.path().join("absent.toml");
    assert!(!path.exists());
    let loaded = load_settings(&path).expect("load");
    assert_eq!(loaded.history_limit, Settings::default().history_limit);
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefsctl.toml");
    fs::write(
        &path,
        "extension_store = \"/var/prefs/ext.json\"\nhistory_limit = 5\n",
    )
    .expect("write settings");

    let settings = toml::from_str::<Settings>(&fs::read_to_string(&path).expect("read"))
        .expect("parse");
    assert_eq!(settings.extension_store, "/var/prefs/ext.json");
    assert_eq!(settings.history_limit, 5);
    assert_eq!(settings.project_store, Settings::default().project_store);
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefsctl.toml");
    fs::write(&path, "history_limit = \"many\"").expect("write settings");

    let err = load_settings(&path).expect_err("malformed");
    assert!(err.to_string().contains("invalid settings file"));
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("PREFS_EXTENSION_STORE", "plain.json"),
        ("APP__EXTENSION_STORE", "app.json"),
        ("PREFS_PROJECT_STORE", "project.json"),
        ("APP__HISTORY_LIMIT", "not-a-number"),
        ("APP__LOG_FILTER", "prefs_core=debug"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |name| env.get(name).map(|v| v.to_string()));

    assert_eq!(settings.extension_store, "app.json");
    assert_eq!(settings.project_store, "project.json");
    assert_eq!(settings.log_filter, "prefs_core=debug");
    assert_eq!(settings.history_limit, Settings::default().history_limit);
}

#[test]
fn prepares_parent_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = dir.path().join("nested").join("store.json");

    let path = prepare_store_path(&raw.to_string_lossy(), "unused.json").expect("prepare");
    assert!(dir.path().join("nested").is_dir());
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("store.json"));
}

#[test]
fn blank_store_path_uses_fallback() {
    let path = prepare_store_path("   ", "fallback.json").expect("prepare");
    assert_eq!(path, PathBuf::from("fallback.json"));
}
