//! Per-file record sets modelled on a small C++ project.
//!
//! `widget.h` declares `Widget`, `widget.cpp` defines its operations and
//! `canvas.cpp` only uses it.

use codemodel::FileRecords;
use codemodel::model::Visibility;

/// Header: `Widget` with a `count` member and a declared `draw()`.
pub fn widget_header() -> FileRecords {
    let mut records = FileRecords::new();
    records
        .add_module(1, "src/widget.h")
        .add_data_type(2, "int");
    let widget = records.add_class(3, "Widget", 1, 4);
    widget.attribute("count", 2);
    widget.operation("draw").returns(0);
    widget.operation("size").returns(2);
    records
}

/// Implementation: defines `Widget::draw` with a body.
pub fn widget_impl() -> FileRecords {
    let mut records = FileRecords::new();
    records
        .add_module(1, "src/widget.cpp")
        .add_data_type(5, "int")
        .add_data_type(6, "Canvas");
    records
        .add_class(7, "Widget", 0, 0)
        .operation("draw")
        .defined_in(1, 12)
        .param("canvas", 6)
        .open("count > 0")
        .call("paint", 6)
        .var_ref("count", 7, 5, false)
        .close();
    records
}

/// A user of `Widget` that only knows it by name.
pub fn canvas_user() -> FileRecords {
    let mut records = FileRecords::new();
    records
        .add_module(1, "src/canvas.cpp")
        .add_data_type(1, "Widget");
    records
        .add_class(2, "Canvas", 1, 2)
        .attribute("root", 1)
        .operation("paint")
        .defined_in(1, 8)
        .call("draw", 1);
    records
}

/// `Button : public Widget`, both known only in this file.
pub fn button() -> FileRecords {
    let mut records = FileRecords::new();
    records
        .add_module(1, "src/button.h")
        .add_data_type(1, "Widget")
        .add_data_type(2, "bool");
    records
        .add_class(3, "Button", 1, 3)
        .attribute("pressed", 2);
    records.add_generalization(3, 1, Visibility::Public);
    records
}

/// `Pair<T,U>` definition plus a use of `Pair<int,Foo>`.
pub fn pair_template() -> FileRecords {
    let mut records = FileRecords::new();
    records
        .add_module(1, "src/pair.h")
        .add_data_type(1, "T")
        .add_data_type(2, "U")
        .add_data_type(3, "Foo")
        .add_data_type(4, "Pair<int, Foo>");
    records
        .add_class(5, "Pair<T,U>", 1, 2)
        .attribute("first", 1)
        .attribute("second", 2);
    records
        .add_class(6, "Holder", 1, 10)
        .attribute("pair", 4)
        .attribute("foo", 3);
    records
}

/// Text rendering of a header/implementation pair in the `.cmr` dialect.
pub const WIDGET_TEXT: &str = "\
# widget.cpp
m|1|src/widget.cpp
d|2|int
d|3|Canvas
c|4|Widget|1|4
a|count|2|0|0|-
o|draw|+|0|1|1|12|0|0|0|canvas@3@0@1||{count > 0;c=paint@3;v=count@4@2@0;}
o|size|+|1|0|0|0|2|0|0|||
";
