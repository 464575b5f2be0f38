use super::*;

#[test]
fn memory_backend_round_trip_and_delete() {
    let backend = MemoryBackend::new();
    let store: &dyn StorageBackend = &backend;

    store.set("pref.key", "{\"k\":1}").expect("set");
    assert!(store.exists("pref.key"));
    assert_eq!(store.get("pref.key"), Some("{\"k\":1}".to_string()));

    store.delete("pref.key").expect("delete");
    assert!(!store.exists("pref.key"));
    assert_eq!(store.get("pref.key"), None);
}

#[test]
fn memory_backend_clones_share_entries() {
    let backend = MemoryBackend::new();
    let reloaded = backend.clone();

    backend.set("theme", "\"dark\"").expect("set");
    assert_eq!(reloaded.get("theme"), Some("\"dark\"".to_string()));
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn transient_backend_is_empty_and_successful() {
    let store = TransientBackend;
    store.set("k", "{}").expect("set");
    assert!(!store.exists("k"));
    assert_eq!(store.get("k"), None);
    store.delete("k").expect("delete");
    assert!(store.keys().is_empty());
}

#[test]
fn backends_route_by_scope() {
    let extension = MemoryBackend::new();
    let project = MemoryBackend::new();
    let backends = StorageBackends::new(Arc::new(extension.clone()), Arc::new(project.clone()));

    backends
        .for_scope(Scope::Extension)
        .set("a", "1")
        .expect("extension set");
    backends
        .for_scope(Scope::Project)
        .set("b", "2")
        .expect("project set");
    backends
        .for_scope(Scope::Transient)
        .set("c", "3")
        .expect("transient set");

    assert_eq!(extension.keys(), vec!["a".to_string()]);
    assert_eq!(project.keys(), vec!["b".to_string()]);
    assert!(!backends.for_scope(Scope::Transient).exists("c"));
}
