#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet};

use codemodel::error::ModelError;
use codemodel::model::Operation;
use codemodel::{FileRecords, TypeId};
use proptest::prelude::*;

use crate::helpers::model_assertions::{
    assert_no_dangling, expect_type, merge_in_order, strict_engine,
};
use crate::helpers::record_fixtures::{button, canvas_user, widget_header, widget_impl};

proptest! {
    #[test]
    fn prop_find_agrees_with_merged_names(
        names in prop::collection::btree_set("[A-Z][a-z]{0,5}", 1..30),
        queries in prop::collection::vec("[A-Z][a-z]{0,5}", 0..10),
        files in 1usize..4,
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut per_file: Vec<FileRecords> = (0..files).map(|_| FileRecords::new()).collect();
        // Reverse order so insertion order differs from key order.
        for (idx, name) in names.iter().rev().enumerate() {
            per_file[idx % files].add_data_type(idx as u32 + 1, name.as_str());
        }

        let mut engine = strict_engine();
        for (idx, records) in per_file.into_iter().enumerate() {
            engine.merge_records(&format!("f{idx}.cmr"), records).unwrap();
        }
        let graph = engine.graph();
        prop_assert!(graph.store().is_sorted());

        let mut seen = BTreeMap::new();
        for name in &names {
            let id = graph.find(name);
            prop_assert!(id.is_some(), "'{}' not found", name);
            prop_assert_eq!(graph.get(id.unwrap()).unwrap().name.as_str(), name.as_str());
            seen.insert(id.unwrap(), name.clone());
        }
        prop_assert_eq!(seen.len(), names.len());

        let known: BTreeSet<&String> = names.iter().collect();
        for query in queries.iter().filter(|p| !known.contains(p)) {
            prop_assert_eq!(graph.find(query), None);
        }
    }

    #[test]
    fn prop_merged_model_has_no_dangling_refs(order in Just(vec![0usize, 1, 2, 3]).prop_shuffle()) {
        let fixtures = [widget_header(), widget_impl(), canvas_user(), button()];
        let names = ["widget.h", "widget.cpp", "canvas.cpp", "button.h"];
        let files = order
            .iter()
            .map(|&i| (names[i], fixtures[i].clone()))
            .collect();
        let engine = merge_in_order(files);
        assert_no_dangling(engine.graph());
        prop_assert!(engine.verify().is_ok());

        let widget = expect_type(engine.graph(), "Widget");
        let classifier = engine.graph().classifier(widget).unwrap();
        prop_assert!(classifier.is_defined());
        prop_assert!(classifier.operation("draw", false).unwrap().is_definition());
    }
}

#[test]
fn test_upgrade_preserves_identity() {
    let mut first = FileRecords::new();
    first.add_module(1, "src/user.cpp").add_data_type(1, "Foo");
    first.add_class(2, "User", 1, 1).attribute("foo", 1);

    let mut second = FileRecords::new();
    second
        .add_module(1, "src/foo.h")
        .add_data_type(1, "int");
    second.add_class(2, "Foo", 1, 3).attribute("value", 1);

    let engine = merge_in_order(vec![("user.cmr", first), ("foo.cmr", second)]);
    let graph = engine.graph();

    let foo_id = expect_type(graph, "Foo");
    let matches: Vec<TypeId> = graph
        .types()
        .filter(|(_, e)| e.name == "Foo")
        .map(|(id, _)| id)
        .collect();
    assert_eq!(matches, vec![foo_id]);
    assert!(graph.get(foo_id).unwrap().is_classifier());

    let user = graph.classifier(expect_type(graph, "User")).unwrap();
    assert!(user.attribute("foo").unwrap().declared_type.targets(foo_id));
    assert_eq!(engine.report().files[1].upgraded, 1);
}

#[test]
fn test_definition_wins_in_either_order() {
    for order in [[0usize, 1], [1, 0]] {
        let files = [("widget.h", widget_header()), ("widget.cpp", widget_impl())];
        let engine = merge_in_order(order.iter().map(|&i| files[i].clone()).collect());
        let graph = engine.graph();
        let widget = graph.classifier(expect_type(graph, "Widget")).unwrap();

        let draws: Vec<&Operation> = widget
            .operations
            .iter()
            .filter(|op| op.name == "draw" && !op.is_const)
            .collect();
        assert_eq!(draws.len(), 1, "order {order:?}");
        assert!(draws[0].is_definition(), "order {order:?}");
        assert_eq!(draws[0].statements.len(), 4);
    }
}

#[test]
fn test_unbalanced_body_contributes_nothing() {
    for body in [&["{x", "{y", "}"][..], &["}"][..]] {
        let mut records = FileRecords::new();
        records.add_module(1, "src/loop.cpp").add_data_type(1, "int");
        let op = records.add_class(2, "Loop", 1, 1).operation("run");
        op.defined_in(1, 3);
        for item in body {
            match item.strip_prefix('{') {
                Some(condition) => op.open(condition),
                None => op.close(),
            };
        }

        let mut engine = strict_engine();
        let err = engine.merge_records("loop.cmr", records).unwrap_err();
        assert!(matches!(err, ModelError::CorruptSequence { .. }), "{err}");
        assert_eq!(engine.graph().type_count(), 0);
        assert_eq!(engine.graph().modules().count(), 0);
        assert_eq!(engine.report().failed_files(), 1);
    }
}
