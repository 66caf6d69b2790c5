#![allow(clippy::unwrap_used)]

use codemodel::FileRecords;
use codemodel::TextRecords;
use codemodel::merge::MergeWarning;
use codemodel::model::Statement;

use crate::helpers::model_assertions::{assert_no_dangling, expect_type, merge_in_order, strict_engine};
use crate::helpers::record_fixtures::{
    WIDGET_TEXT, button, canvas_user, pair_template, widget_header, widget_impl,
};

#[test]
fn test_data_type_then_class_merges_into_one_classifier() {
    let mut a = FileRecords::new();
    a.add_module(1, "src/panel.cpp").add_data_type(1, "Widget");
    a.add_class(2, "Panel", 1, 5).attribute("child", 1);

    let mut b = FileRecords::new();
    b.add_module(1, "src/widget.h").add_data_type(2, "int");
    b.add_class(1, "Widget", 1, 4).attribute("count", 2);

    let engine = merge_in_order(vec![("a.cmr", a), ("b.cmr", b)]);
    let graph = engine.graph();

    let widget = expect_type(graph, "Widget");
    let classifier = graph.classifier(widget).unwrap();
    assert_eq!(classifier.attributes.len(), 1);
    assert_eq!(classifier.attributes[0].name, "count");
    assert_eq!(graph.type_name(&classifier.attributes[0].declared_type), Some("int"));

    let panel = graph.classifier(expect_type(graph, "Panel")).unwrap();
    assert!(panel.attribute("child").unwrap().declared_type.targets(widget));
}

#[test]
fn test_header_then_implementation() {
    let engine = merge_in_order(vec![
        ("widget.h", widget_header()),
        ("widget.cpp", widget_impl()),
        ("canvas.cpp", canvas_user()),
    ]);
    let graph = engine.graph();
    assert_no_dangling(graph);

    let widget_id = expect_type(graph, "Widget");
    let widget = graph.classifier(widget_id).unwrap();
    assert_eq!(graph.module_path(widget.module.unwrap()), Some("src/widget.h"));
    assert_eq!(widget.line, 4);
    assert_eq!(widget.operations.len(), 2);

    let draw = widget.operation("draw", false).unwrap();
    assert_eq!(graph.module_path(draw.module.unwrap()), Some("src/widget.cpp"));
    assert_eq!(draw.line, 12);
    assert_eq!(draw.params[0].name, "canvas");
    assert_eq!(draw.statements.max_depth(), 1);
    match &draw.statements.as_slice()[2] {
        Statement::VarRef { owner, var_type, .. } => {
            assert!(owner.targets(widget_id));
            assert_eq!(graph.type_name(var_type), Some("int"));
        }
        other => panic!("unexpected statement {other:?}"),
    }

    // Canvas arrived as a DataType from widget.cpp and kept its handle.
    let canvas_id = expect_type(graph, "Canvas");
    assert_eq!(engine.report().summary("canvas.cpp").unwrap().upgraded, 1);
    assert!(draw.params[0].declared_type.targets(canvas_id));
    assert_eq!(graph.call_targets(widget_id), vec![canvas_id]);

    let summary = engine.report().summary("widget.cpp").unwrap();
    assert_eq!(summary.operations_replaced, 1);
    assert_eq!(summary.folded, 2);
}

#[test]
fn test_generalization_across_files() {
    let engine = merge_in_order(vec![("button.h", button()), ("widget.h", widget_header())]);
    let graph = engine.graph();
    let widget = expect_type(graph, "Widget");
    let button = expect_type(graph, "Button");

    assert_eq!(graph.parents_of(button).collect::<Vec<_>>(), vec![widget]);
    assert_eq!(graph.children_of(widget).collect::<Vec<_>>(), vec![button]);
    assert!(graph.classifier(widget).unwrap().is_defined());

    // Re-merging the same edge does not duplicate it.
    let mut engine = engine;
    let summary = engine.merge_records("button-again.h", crate::helpers::record_fixtures::button()).unwrap();
    assert_eq!(summary.associations_added, 0);
    assert_eq!(engine.graph().associations().len(), 1);
}

#[test]
fn test_template_definition_lookup() {
    let engine = merge_in_order(vec![("pair.h", pair_template())]);
    let graph = engine.graph();
    let definition = expect_type(graph, "Pair<T,U>");
    let instance = expect_type(graph, "Pair<int, Foo>");

    assert_eq!(graph.find("Pair<int,Foo>"), None);
    assert_eq!(graph.find_template_definition("Pair<int,Foo>"), Some(definition));
    assert_eq!(graph.defining_classifier(instance), Some(definition));
    assert_eq!(graph.find_template_definition("Tuple<int>"), None);
}

#[test]
fn test_ambiguous_classifier_keeps_first_conflicting_member() {
    let shape = |path: &str, size_type: &str, extra: &str| {
        let mut records = FileRecords::new();
        records.add_module(1, path).add_data_type(1, size_type);
        records
            .add_class(2, "Shape", 1, 1)
            .attribute("size", 1)
            .attribute(extra, 1);
        records
    };
    let engine = merge_in_order(vec![
        ("a.cmr", shape("src/a/shape.h", "int", "width")),
        ("b.cmr", shape("src/b/shape.h", "long", "radius")),
    ]);
    let graph = engine.graph();
    let classifier = graph.classifier(expect_type(graph, "Shape")).unwrap();
    assert_eq!(graph.module_path(classifier.module.unwrap()), Some("src/a/shape.h"));
    assert_eq!(
        graph.type_name(&classifier.attribute("size").unwrap().declared_type),
        Some("int")
    );
    // Members that do not conflict are still merged.
    assert!(classifier.attribute("width").is_some());
    assert!(classifier.attribute("radius").is_some());

    match engine.report().warnings.as_slice() {
        [
            MergeWarning::AmbiguousClassifier {
                name,
                kept_module,
                discarded_module,
                members,
                ..
            },
        ] => {
            assert_eq!(name, "Shape");
            assert_eq!(kept_module, "src/a/shape.h");
            assert_eq!(discarded_module, "src/b/shape.h");
            assert_eq!(members, &vec!["size".to_string()]);
        }
        other => panic!("unexpected warnings {other:?}"),
    }
    assert!(!engine.report().is_clean());
}

#[test]
fn test_definition_from_other_module_fills_declaration() {
    let mut header = FileRecords::new();
    header.add_module(1, "src/widget.h");
    header.add_class(1, "Widget", 1, 4).operation("draw");

    let mut inline_impl = FileRecords::new();
    inline_impl.add_module(1, "src/widget_impl.h");
    inline_impl
        .add_class(1, "Widget", 1, 9)
        .operation("draw")
        .defined_in(1, 10)
        .open("x")
        .close();

    let engine = merge_in_order(vec![("widget.h", header), ("widget_impl.h", inline_impl)]);
    let graph = engine.graph();
    let widget = graph.classifier(expect_type(graph, "Widget")).unwrap();
    assert_eq!(graph.module_path(widget.module.unwrap()), Some("src/widget.h"));

    let draw = widget.operation("draw", false).unwrap();
    assert_eq!(draw.statements.len(), 2);
    assert_eq!(graph.module_path(draw.module.unwrap()), Some("src/widget_impl.h"));
    assert!(engine.report().warnings.is_empty());
    assert_eq!(engine.report().summary("widget_impl.h").unwrap().operations_replaced, 1);
}

#[test]
fn test_ambiguous_operation_keeps_first_body() {
    let mut alternate = widget_impl();
    alternate.modules[0].path = "src/widget_alt.cpp".to_string();

    let engine = merge_in_order(vec![
        ("widget.h", widget_header()),
        ("widget.cpp", widget_impl()),
        ("widget_alt.cpp", alternate),
    ]);
    let graph = engine.graph();
    let widget = graph.classifier(expect_type(graph, "Widget")).unwrap();
    let draw = widget.operation("draw", false).unwrap();
    assert_eq!(graph.module_path(draw.module.unwrap()), Some("src/widget.cpp"));

    let warnings = &engine.report().warnings;
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0],
        MergeWarning::AmbiguousOperation { operation, .. } if operation == "draw"
    ));
    assert_eq!(engine.report().summary("widget_alt.cpp").unwrap().warnings, 1);
}

#[test]
fn test_text_records_merge() {
    let mut engine = strict_engine();
    engine
        .merge_bytes("widget.cmr", WIDGET_TEXT.as_bytes(), &TextRecords)
        .unwrap();
    let graph = engine.graph();
    let widget = graph.classifier(expect_type(graph, "Widget")).unwrap();

    let draw = widget.operation("draw", false).unwrap();
    assert!(draw.is_virtual);
    assert!(draw.params[0].declared_type.is_reference);
    assert_eq!(
        draw.statements.calls().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["paint"]
    );
    match &draw.statements.as_slice()[0] {
        Statement::OpenNest { condition } => assert_eq!(condition, "count > 0"),
        other => panic!("unexpected statement {other:?}"),
    }

    let size = widget.operation("size", true).unwrap();
    assert!(!size.is_defined());
    assert_eq!(graph.type_name(&size.return_type), Some("int"));
}
