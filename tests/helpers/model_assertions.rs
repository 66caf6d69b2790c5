//! Whole-model assertions.

use codemodel::merge::{MergeConfig, MergeEngine};
use codemodel::model::{ModelGraph, TypeTarget};
use codemodel::{FileRecords, TypeId};

/// Engine that checks every invariant after each file and never collects garbage.
pub fn strict_engine() -> MergeEngine {
    MergeEngine::with_config(MergeConfig::strict())
}

/// Merge record sets in order, asserting every file is accepted.
pub fn merge_in_order(files: Vec<(&str, FileRecords)>) -> MergeEngine {
    let mut engine = strict_engine();
    for (file, records) in files {
        if let Err(e) = engine.merge_records(file, records) {
            panic!("merge of '{file}' failed: {e}");
        }
    }
    engine
}

/// Walk every reference in the model and check it names a live entity.
pub fn assert_no_dangling(graph: &ModelGraph) {
    for (id, entity, classifier) in graph.classifiers() {
        classifier.for_each_ref(|site, r| match r.target {
            TypeTarget::Intrinsic => {}
            TypeTarget::Resolved(target) => assert!(
                graph.contains(target),
                "'{}' ({id}) holds dangling {target} at {site:?}",
                entity.name
            ),
            TypeTarget::Pending(local) => panic!(
                "'{}' ({id}) still holds local id {local} at {site:?}",
                entity.name
            ),
        });
    }
    for association in graph.associations() {
        assert!(graph.contains(association.child), "dangling child {}", association.child);
        assert!(graph.contains(association.parent), "dangling parent {}", association.parent);
    }
}

/// Look a type up by spelling, failing the test if it is missing.
pub fn expect_type(graph: &ModelGraph, spelling: &str) -> TypeId {
    match graph.find(spelling) {
        Some(id) => id,
        None => panic!("type '{spelling}' not found"),
    }
}
