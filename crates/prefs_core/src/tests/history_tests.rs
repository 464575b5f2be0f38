use std::sync::Arc;

use parking_lot::Mutex;
use storage::{MemoryBackend, StorageBackend, StorageBackends};

use super::*;

fn registry_with(extension: &MemoryBackend) -> PrefsRegistry {
    PrefsRegistry::new(StorageBackends::new(
        Arc::new(extension.clone()),
        Arc::new(MemoryBackend::new()),
    ))
}

#[test]
fn keeps_most_recent_entries_within_limit() {
    let extension = MemoryBackend::new();
    let registry = registry_with(&extension);
    let field = HistoryField::declare(&registry, "history", 3).expect("declare");

    for entry in ["a", "b", "c", "d"] {
        field.push(entry);
    }
    assert_eq!(field.entries(), vec!["b", "c", "d"]);
    assert_eq!(extension.get("history"), Some("[\"b\",\"c\",\"d\"]".to_string()));

    field.push("b");
    assert_eq!(extension.get("history"), Some("[\"c\",\"d\",\"b\"]".to_string()));
    assert_eq!(field.entries_newest_first(), vec!["b", "d", "c"]);
}

#[test]
fn blank_entries_are_ignored() {
    let registry = registry_with(&MemoryBackend::new());
    let field = HistoryField::declare(&registry, "filters", 5).expect("declare");
    field.push("   ");
    field.push("");
    assert!(field.entries().is_empty());
}

#[test]
fn select_applies_validator_and_remembers_selection() {
    let extension = MemoryBackend::new();
    let registry = registry_with(&extension);
    let field = HistoryField::declare(&registry, "filters", 5)
        .expect("declare")
        .with_validator(|proposed| {
            let trimmed = proposed.trim();
            (!trimmed.starts_with('!')).then(|| trimmed.to_lowercase())
        });

    assert_eq!(field.select("  Status:200 "), Some("status:200".to_string()));
    assert_eq!(field.select("!bad"), None);

    assert_eq!(field.selected(), "status:200");
    assert_eq!(field.entries(), vec!["status:200"]);
    assert_eq!(
        extension.get("filters_selected"),
        Some("\"status:200\"".to_string())
    );
}

#[test]
fn silent_selection_bypasses_validator() {
    let registry = registry_with(&MemoryBackend::new());
    let field = HistoryField::declare(&registry, "search", 2)
        .expect("declare")
        .with_validator(|_| None);

    field.select_silently("restored");
    assert_eq!(field.selected(), "restored");
    assert_eq!(field.entries(), vec!["restored"]);
}

#[test]
fn history_survives_registry_restart() {
    let extension = MemoryBackend::new();
    {
        let registry = registry_with(&extension);
        let field = HistoryField::declare(&registry, "history", 3).expect("declare");
        field.push("first");
        field.push("second");
    }

    let registry = registry_with(&extension);
    let field = HistoryField::declare(&registry, "history", 3).expect("redeclare");
    assert_eq!(field.entries_newest_first(), vec!["second", "first"]);
}

#[test]
fn selection_hook_sees_accepted_values_only() {
    let registry = registry_with(&MemoryBackend::new());
    let accepted = Arc::new(Mutex::new(Vec::new()));
    let sink = accepted.clone();
    let field = HistoryField::declare(&registry, "filters", 5)
        .expect("declare")
        .with_validator(|proposed| (!proposed.is_empty()).then(|| proposed.to_uppercase()))
        .on_select(move |value| sink.lock().push(value.to_string()));

    field.select("get");
    field.select("");
    field.select_silently("restored");

    assert_eq!(*accepted.lock(), vec!["GET".to_string()]);
    assert_eq!(field.selected(), "restored");
}
