//! Integration tests for source components: stored pattern lists.

use vigil_core::config::VigilConfig;
use vigil_core::errors::StoreError;
use vigil_store::ReportStore;

fn store() -> ReportStore {
    ReportStore::open_in_memory(VigilConfig::default()).unwrap()
}

fn patterns(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn add_get_list_round_trip() {
    let store = store();
    store
        .add_component(
            "frontend",
            &patterns(&["+src/ui/**", "-src/ui/vendor/**"]),
            Some("UI sources without vendored code"),
        )
        .unwrap();
    store
        .add_component("backend", &patterns(&["src/server/**"]), None)
        .unwrap();

    let row = store.component("frontend").unwrap().unwrap();
    assert_eq!(row.component.name, "frontend");
    assert_eq!(
        row.component.patterns,
        patterns(&["+src/ui/**", "-src/ui/vendor/**"])
    );
    assert_eq!(
        row.component.description.as_deref(),
        Some("UI sources without vendored code")
    );

    // Ordered by name.
    let all = store.list_components().unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["backend", "frontend"]);
}

#[test]
fn duplicate_name_is_rejected() {
    let store = store();
    store
        .add_component("frontend", &patterns(&["src/ui/**"]), None)
        .unwrap();
    let err = store
        .add_component("frontend", &patterns(&["other/**"]), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::ComponentAlreadyExists { .. }));
}

#[test]
fn remove_component() {
    let store = store();
    store
        .add_component("frontend", &patterns(&["src/ui/**"]), None)
        .unwrap();
    store.remove_component("frontend").unwrap();

    assert!(store.component("frontend").unwrap().is_none());
    let err = store.remove_component("frontend").unwrap_err();
    assert!(matches!(err, StoreError::ComponentNotFound { .. }));
}

#[test]
fn replacing_a_component_changes_its_row_id() {
    let store = store();
    store
        .add_component("frontend", &patterns(&["src/ui/**"]), None)
        .unwrap();
    let before = store.component("frontend").unwrap().unwrap().id;

    store.remove_component("frontend").unwrap();
    store
        .add_component("frontend", &patterns(&["src/ui/**", "src/web/**"]), None)
        .unwrap();
    let after = store.component("frontend").unwrap().unwrap();

    // Caches keyed on the row id can never serve the old pattern list.
    assert_ne!(before, after.id);
    assert_eq!(after.component.patterns.len(), 2);
}

#[test]
fn pattern_syntax_is_not_validated_at_store_time() {
    let store = store();
    // The store persists whatever it is given; globs compile lazily in the
    // query layer, which is where a bad pattern surfaces.
    store
        .add_component("broken", &patterns(&["[unclosed"]), None)
        .unwrap();
    assert!(store.component("broken").unwrap().is_some());
}
