#![allow(clippy::unwrap_used)]

use std::fs;

use codemodel::loader::ResultFormat;
use codemodel::merge::MergeConfig;
use codemodel::project::{LoaderConfig, WorkspaceLoader};
use codemodel::TextRecords;
use tempfile::TempDir;

use crate::helpers::model_assertions::{assert_no_dangling, expect_type};
use crate::helpers::record_fixtures::{WIDGET_TEXT, canvas_user, widget_header};

fn write_text(dir: &TempDir, relative: &str, content: &[u8]) {
    let path = dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn strict_loader() -> WorkspaceLoader {
    WorkspaceLoader::with_config(LoaderConfig::default().with_merge(MergeConfig::strict()))
}

#[test]
fn test_load_nested_directory() {
    let dir = TempDir::new().unwrap();
    write_text(&dir, "widget/widget.cmr", WIDGET_TEXT.as_bytes());
    write_text(
        &dir,
        "canvas/canvas.cmr",
        &TextRecords.write(&canvas_user()).unwrap(),
    );
    write_text(&dir, "notes.txt", b"not a result file");

    let (graph, report) = strict_loader().load_directory(dir.path()).unwrap();
    assert_eq!(report.merged_files(), 2);
    assert!(report.failures.is_empty());
    assert_no_dangling(&graph);

    let widget = expect_type(&graph, "Widget");
    let canvas = graph.classifier(expect_type(&graph, "Canvas")).unwrap();
    assert!(canvas.attribute("root").unwrap().declared_type.targets(widget));
}

#[test]
fn test_broken_file_does_not_stop_the_load() {
    let dir = TempDir::new().unwrap();
    write_text(&dir, "a.cmr", &TextRecords.write(&widget_header()).unwrap());
    write_text(&dir, "b.cmr", b"c|1|Broken|0|0\na|x|5|0|0|-\n");
    write_text(&dir, "c.cmr", &TextRecords.write(&canvas_user()).unwrap());

    let (graph, report) = strict_loader().load_directory(dir.path()).unwrap();
    assert_eq!(report.merged_files(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].file.ends_with("b.cmr"));
    assert!(graph.find("Broken").is_none());
    assert!(graph.find("Canvas").is_some());
}

#[test]
fn test_extension_filter() {
    let dir = TempDir::new().unwrap();
    write_text(&dir, "a.cmr", WIDGET_TEXT.as_bytes());
    write_text(&dir, "b.rec", WIDGET_TEXT.as_bytes());

    let loader = WorkspaceLoader::with_config(
        LoaderConfig::default()
            .with_extensions(["rec"])
            .with_merge(MergeConfig::strict()),
    );
    let (_, report) = loader.load_directory(dir.path()).unwrap();
    // `.rec` is collected but no format reads it.
    assert_eq!(report.merged_files(), 0);
    assert_eq!(report.failures.len(), 1);
}

#[cfg(feature = "interchange")]
#[test]
fn test_mixed_formats() {
    use codemodel::loader::JsonRecords;

    let dir = TempDir::new().unwrap();
    write_text(&dir, "widget.cmr", WIDGET_TEXT.as_bytes());
    write_text(
        &dir,
        "canvas.json",
        &JsonRecords.write(&canvas_user()).unwrap(),
    );

    let (graph, report) = strict_loader().load_directory(dir.path()).unwrap();
    assert_eq!(report.merged_files(), 2);
    assert!(graph.find("Canvas").is_some());
}
