#![allow(clippy::unwrap_used)]

use codemodel::error::ModelError;
use codemodel::integrity::ReferenceSite;
use codemodel::merge::{IntegrityCheck, MergeConfig, MergeEngine};
use codemodel::{FileRecords, ReferenceIntegrityChecker};

use crate::helpers::model_assertions::{assert_no_dangling, expect_type, merge_in_order};
use crate::helpers::record_fixtures::{button, canvas_user, pair_template, widget_header, widget_impl};

fn project() -> MergeEngine {
    merge_in_order(vec![
        ("widget.h", widget_header()),
        ("widget.cpp", widget_impl()),
        ("canvas.cpp", canvas_user()),
        ("button.h", button()),
    ])
}

#[test]
fn test_reference_sites_cover_members_bodies_and_edges() {
    let engine = project();
    let graph = engine.graph();
    let widget = expect_type(graph, "Widget");
    let sites = ReferenceIntegrityChecker::new(graph).reference_sites(widget);

    let canvas = expect_type(graph, "Canvas");
    let button = expect_type(graph, "Button");
    assert!(sites.iter().any(|s| matches!(s, ReferenceSite::Member { owner, .. } if *owner == canvas)));
    assert!(sites.iter().any(|s| matches!(s, ReferenceSite::Member { owner, .. } if *owner == widget)));
    assert!(sites.iter().any(|s| matches!(s, ReferenceSite::AssociationParent { .. })));
    assert!(!sites.iter().any(|s| matches!(s, ReferenceSite::Member { owner, .. } if *owner == button)));
}

#[test]
fn test_replace_redirects_everything() {
    let mut engine = project();
    let mut extra = FileRecords::new();
    extra.add_module(1, "src/fancy.h");
    extra.add_class(1, "FancyWidget", 1, 1);
    engine.merge_records("fancy.h", extra).unwrap();

    let graph = engine.graph();
    let widget = expect_type(graph, "Widget");
    let fancy = expect_type(graph, "FancyWidget");
    let button = expect_type(graph, "Button");

    let erased = engine.replace_type(widget, fancy).unwrap();
    assert_eq!(erased.name, "Widget");

    let graph = engine.graph();
    assert!(graph.find("Widget").is_none());
    assert_eq!(graph.parents_of(button).collect::<Vec<_>>(), vec![fancy]);
    let canvas = graph.classifier(expect_type(graph, "Canvas")).unwrap();
    assert!(canvas.attribute("root").unwrap().declared_type.targets(fancy));
    assert_no_dangling(graph);
    assert!(engine.verify().is_ok());
    assert_eq!(engine.report().erased, 1);
}

#[test]
fn test_erase_refuses_then_succeeds() {
    let mut engine = project();
    let button = expect_type(engine.graph(), "Button");
    let bool_id = expect_type(engine.graph(), "bool");

    match engine.erase_type(bool_id) {
        Err(ModelError::StillReferenced { name, .. }) => assert_eq!(name, "bool"),
        other => panic!("unexpected result {other:?}"),
    }

    // An association end counts as a reference.
    assert!(matches!(
        engine.erase_type(button),
        Err(ModelError::StillReferenced { .. })
    ));
    assert!(engine.graph().contains(button));
    assert!(engine.verify().is_ok());
}

#[test]
fn test_finish_collects_unreachable_types() {
    let mut engine = MergeEngine::with_config(MergeConfig {
        integrity_check: IntegrityCheck::EachFile,
        collect_garbage: true,
    });
    engine.merge_records("pair.h", pair_template()).unwrap();
    let mut junk = FileRecords::new();
    junk.add_data_type(1, "Unused").add_data_type(2, "AlsoUnused");
    engine.merge_records("junk.h", junk).unwrap();

    let (graph, report) = engine.finish().unwrap();
    assert!(graph.find("Unused").is_none());
    assert!(graph.find("AlsoUnused").is_none());
    assert!(graph.find("Pair<T,U>").is_some());
    assert!(graph.find("Pair<int, Foo>").is_some());
    assert_eq!(report.erased, 2);
    assert_no_dangling(&graph);
}

#[test]
fn test_is_referenced_ignores_forward_only_uses() {
    let mut records = FileRecords::new();
    records.add_data_type(1, "Hidden");
    records.add_class(2, "Opaque", 0, 0).attribute("hidden", 1);
    let engine = merge_in_order(vec![("opaque.h", records)]);
    let graph = engine.graph();
    let checker = ReferenceIntegrityChecker::new(graph);
    let hidden = expect_type(graph, "Hidden");
    assert!(!checker.is_referenced(hidden));
    assert_eq!(checker.reference_sites(hidden).len(), 1);
    assert!(!checker.reachable().contains(&hidden));
}
