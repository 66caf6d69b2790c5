#![allow(clippy::unwrap_used)]

use codemodel::error::ModelError;
use codemodel::loader::LocalGraph;
use codemodel::model::Visibility;
use codemodel::{FileRecords, TextRecords};
use rstest::rstest;

use crate::helpers::model_assertions::{assert_no_dangling, strict_engine};
use crate::helpers::record_fixtures::{canvas_user, widget_header};

fn undefined_attribute_type() -> FileRecords {
    let mut records = FileRecords::new();
    records.add_module(1, "src/broken.h");
    records.add_class(1, "Broken", 1, 1).attribute("x", 99);
    records
}

fn undefined_module() -> FileRecords {
    let mut records = FileRecords::new();
    records.add_class(1, "Stray", 3, 1);
    records
}

fn dangling_generalization() -> FileRecords {
    let mut records = FileRecords::new();
    records.add_module(1, "src/child.h");
    records.add_class(1, "Child", 1, 1);
    records.add_generalization(1, 2, Visibility::Public);
    records
}

fn duplicate_type_id() -> FileRecords {
    let mut records = FileRecords::new();
    records.add_data_type(1, "int").add_data_type(1, "long");
    records
}

#[rstest]
#[case::undefined_attribute_type(undefined_attribute_type())]
#[case::undefined_module(undefined_module())]
#[case::dangling_generalization(dangling_generalization())]
#[case::duplicate_type_id(duplicate_type_id())]
fn test_malformed_file_is_dropped(#[case] bad: FileRecords) {
    let mut engine = strict_engine();
    engine.merge_records("widget.h", widget_header()).unwrap();
    let before = engine.graph().type_count();

    let err = engine.merge_records("bad.cmr", bad).unwrap_err();
    match &err {
        ModelError::MalformedInput { file, .. } => assert_eq!(file, "bad.cmr"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!err.is_fatal());
    assert_eq!(engine.graph().type_count(), before);
    assert_eq!(engine.session().files_merged(), 1);

    engine.merge_records("canvas.cpp", canvas_user()).unwrap();
    let (graph, report) = engine.finish().unwrap();
    assert_no_dangling(&graph);
    assert_eq!(report.merged_files(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "bad.cmr");
}

#[test]
fn test_merge_all_skips_failures() {
    let inputs = vec![
        (
            "widget.h".to_string(),
            LocalGraph::build("widget.h", widget_header()),
        ),
        (
            "broken.h".to_string(),
            LocalGraph::build("broken.h", undefined_attribute_type()),
        ),
        (
            "canvas.cpp".to_string(),
            LocalGraph::build("canvas.cpp", canvas_user()),
        ),
    ];
    let mut engine = strict_engine();
    engine.merge_all(inputs).unwrap();

    assert_eq!(engine.report().merged_files(), 2);
    assert_eq!(engine.report().failed_files(), 1);
    assert!(engine.graph().find("Broken").is_none());
    assert!(engine.graph().find("Canvas").is_some());
}

#[test]
fn test_bad_text_names_file_and_line() {
    let input = "m|1|src/a.h\nd|1|int\nc|2|A|1|1\na|n|7|0|0|-\n";
    let mut engine = strict_engine();
    let err = engine
        .merge_bytes("src/a.cmr", input.as_bytes(), &TextRecords)
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("src/a.cmr"), "{text}");
    assert!(text.contains("A::n"), "{text}");
    assert_eq!(engine.graph().type_count(), 0);

    let err = engine
        .merge_bytes("src/b.cmr", b"m|1|src/b.h\nx|1\n", &TextRecords)
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("src/b.cmr"), "{text}");
    assert!(text.contains("line 2"), "{text}");
    assert_eq!(engine.report().failed_files(), 2);
}
