//! Line-oriented text dialect for per-file results (`.cmr`).
//!
//! One record per line, fields separated by `|`. Blank lines and lines
//! starting with `#` are ignored.
//!
//! ```text
//! m|<moduleId>|<path>
//! d|<typeId>|<name>
//! c|<typeId>|<name>|<moduleId or 0>|<line>
//! a|<name>|<typeId>|<const>|<ref>|<vis>
//! o|<name>|<vis>|<const>|<virtual>|<moduleId>|<line>|<ret>|<retConst>|<retRef>|<params>|<bodyVars>|<statements>
//! g|<childId>|<parentId>|<vis>
//! ```
//!
//! `a` and `o` records belong to the closest preceding `c` record. Flags are
//! `0`/`1`; visibility is `+`, `#` or `-`. Params and body variables are
//! `name@typeId@const@ref` joined by `;`. Statements are joined by `;`:
//! `{condition`, `}`, `c=name@typeId` and `v=name@ownerId@varTypeId@write`.
//!
//! Inside any field, `\` escapes `\`, `|`, `;` and `@`; `\n` and `\r` stand
//! for line breaks, so condition text survives a round trip unchanged.

use super::format::{FormatCapability, ResultFormat, UNNAMED_INPUT};
use super::records::{
    AttributeRecord, ClassRecord, FileRecords, GeneralizationRecord, ModuleRecord,
    OperationRecord, ParamRecord, StatementRecord, TypeRecord,
};
use crate::error::{ModelError, ModelResult};
use crate::model::Visibility;

const FORMAT_NAME: &str = "Text records";

/// Text record format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRecords;

impl ResultFormat for TextRecords {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cmr"]
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> ModelResult<FileRecords> {
        let content = decode_utf8(input)?;
        read_records(content)
    }

    fn write(&self, records: &FileRecords) -> ModelResult<Vec<u8>> {
        Ok(write_records(records).into_bytes())
    }

    fn validate(&self, input: &[u8]) -> ModelResult<()> {
        let content = decode_utf8(input)?;
        for (idx, raw) in content.lines().enumerate() {
            let text = raw.trim_end_matches('\r');
            if is_skipped(text) {
                continue;
            }
            let tag = split_escaped(text, '|')[0];
            if !matches!(tag, "m" | "d" | "c" | "a" | "o" | "g") {
                return Err(LineCursor { number: idx + 1 }.error(tag, 0, format!("unknown record tag '{tag}'")));
            }
        }
        Ok(())
    }
}

fn decode_utf8(input: &[u8]) -> ModelResult<&str> {
    std::str::from_utf8(input).map_err(|e| ModelError::format(FORMAT_NAME, format!("Invalid UTF-8: {e}")))
}

fn is_skipped(text: &str) -> bool {
    text.trim().is_empty() || text.starts_with('#')
}

// ============================================================================
// READER
// ============================================================================

/// Position of the record being parsed, for error messages.
#[derive(Debug, Clone, Copy)]
struct LineCursor {
    number: usize,
}

impl LineCursor {
    fn error(&self, entity: &str, local_id: u32, message: impl std::fmt::Display) -> ModelError {
        ModelError::malformed(
            UNNAMED_INPUT,
            entity,
            local_id,
            format!("line {}: {message}", self.number),
        )
    }

    fn expect_fields(&self, fields: &[&str], expected: usize) -> ModelResult<()> {
        if fields.len() == expected {
            Ok(())
        } else {
            Err(self.error(
                fields[0],
                0,
                format!("'{}' record needs {expected} fields, found {}", fields[0], fields.len()),
            ))
        }
    }

    fn number(&self, field: &str, what: &str) -> ModelResult<u32> {
        field
            .trim()
            .parse()
            .map_err(|_| self.error(field, 0, format!("invalid {what} '{field}'")))
    }

    fn flag(&self, field: &str, what: &str) -> ModelResult<bool> {
        match field.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(self.error(other, 0, format!("invalid {what} flag '{other}'"))),
        }
    }

    fn visibility(&self, field: &str) -> ModelResult<Visibility> {
        Visibility::parse(field.trim())
            .ok_or_else(|| self.error(field, 0, format!("invalid visibility '{field}'")))
    }
}

fn read_records(content: &str) -> ModelResult<FileRecords> {
    let mut records = FileRecords::new();

    for (idx, raw) in content.lines().enumerate() {
        let text = raw.trim_end_matches('\r');
        if is_skipped(text) {
            continue;
        }
        let line = LineCursor { number: idx + 1 };
        let fields = split_escaped(text, '|');

        match fields[0] {
            "m" => {
                line.expect_fields(&fields, 3)?;
                records.modules.push(ModuleRecord {
                    id: line.number(fields[1], "module id")?,
                    path: unescape(fields[2]),
                });
            }
            "d" => {
                line.expect_fields(&fields, 3)?;
                records.types.push(TypeRecord {
                    id: line.number(fields[1], "type id")?,
                    name: unescape(fields[2]),
                    class: None,
                });
            }
            "c" => {
                line.expect_fields(&fields, 5)?;
                records.types.push(TypeRecord {
                    id: line.number(fields[1], "type id")?,
                    name: unescape(fields[2]),
                    class: Some(ClassRecord {
                        module: line.number(fields[3], "module id")?,
                        line: line.number(fields[4], "line")?,
                        ..ClassRecord::default()
                    }),
                });
            }
            "a" => {
                line.expect_fields(&fields, 6)?;
                let attribute = AttributeRecord {
                    name: unescape(fields[1]),
                    type_id: line.number(fields[2], "type id")?,
                    is_const: line.flag(fields[3], "const")?,
                    is_ref: line.flag(fields[4], "reference")?,
                    visibility: line.visibility(fields[5])?,
                };
                current_class(&mut records, line, "attribute")?
                    .attributes
                    .push(attribute);
            }
            "o" => {
                line.expect_fields(&fields, 13)?;
                let operation = read_operation(line, &fields)?;
                current_class(&mut records, line, "operation")?
                    .operations
                    .push(operation);
            }
            "g" => {
                line.expect_fields(&fields, 4)?;
                records.generalizations.push(GeneralizationRecord {
                    child: line.number(fields[1], "child id")?,
                    parent: line.number(fields[2], "parent id")?,
                    visibility: line.visibility(fields[3])?,
                });
            }
            other => {
                return Err(line.error(other, 0, format!("unknown record tag '{other}'")));
            }
        }
    }

    Ok(records)
}

/// The class the next member record belongs to.
fn current_class<'r>(
    records: &'r mut FileRecords,
    line: LineCursor,
    what: &str,
) -> ModelResult<&'r mut ClassRecord> {
    match records.types.last_mut() {
        Some(TypeRecord {
            class: Some(class), ..
        }) => Ok(class),
        Some(ty) => Err(line.error(
            &ty.name,
            ty.id,
            format!("{what} record follows a data type record"),
        )),
        None => Err(line.error(what, 0, format!("{what} record outside of a class"))),
    }
}

fn read_operation(line: LineCursor, fields: &[&str]) -> ModelResult<OperationRecord> {
    Ok(OperationRecord {
        name: unescape(fields[1]),
        visibility: line.visibility(fields[2])?,
        is_const: line.flag(fields[3], "const")?,
        is_virtual: line.flag(fields[4], "virtual")?,
        module: line.number(fields[5], "module id")?,
        line: line.number(fields[6], "line")?,
        return_type: line.number(fields[7], "return type id")?,
        return_const: line.flag(fields[8], "const")?,
        return_ref: line.flag(fields[9], "reference")?,
        params: read_params(line, fields[10])?,
        body_vars: read_params(line, fields[11])?,
        statements: read_statements(line, fields[12])?,
    })
}

fn read_params(line: LineCursor, raw: &str) -> ModelResult<Vec<ParamRecord>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    split_escaped(raw, ';')
        .into_iter()
        .map(|item| {
            let tokens = split_escaped(item, '@');
            if tokens.len() != 4 {
                return Err(line.error(item, 0, "parameter needs name@type@const@ref"));
            }
            Ok(ParamRecord {
                name: unescape(tokens[0]),
                type_id: line.number(tokens[1], "type id")?,
                is_const: line.flag(tokens[2], "const")?,
                is_ref: line.flag(tokens[3], "reference")?,
            })
        })
        .collect()
}

fn read_statements(line: LineCursor, raw: &str) -> ModelResult<Vec<StatementRecord>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    split_escaped(raw, ';')
        .into_iter()
        .map(|item| read_statement(line, item))
        .collect()
}

fn read_statement(line: LineCursor, item: &str) -> ModelResult<StatementRecord> {
    if let Some(condition) = item.strip_prefix('{') {
        return Ok(StatementRecord::Open {
            condition: unescape(condition),
        });
    }
    if item == "}" {
        return Ok(StatementRecord::Close);
    }
    if let Some(rest) = item.strip_prefix("c=") {
        let tokens = split_escaped(rest, '@');
        if tokens.len() != 2 {
            return Err(line.error(item, 0, "call needs c=name@typeId"));
        }
        return Ok(StatementRecord::Call {
            name: unescape(tokens[0]),
            type_id: line.number(tokens[1], "type id")?,
        });
    }
    if let Some(rest) = item.strip_prefix("v=") {
        let tokens = split_escaped(rest, '@');
        if tokens.len() != 4 {
            return Err(line.error(item, 0, "variable access needs v=name@owner@type@write"));
        }
        return Ok(StatementRecord::VarRef {
            name: unescape(tokens[0]),
            owner: line.number(tokens[1], "owner id")?,
            var_type: line.number(tokens[2], "type id")?,
            is_write: line.flag(tokens[3], "write")?,
        });
    }
    Err(line.error(item, 0, format!("unrecognized statement '{item}'")))
}

// ============================================================================
// WRITER
// ============================================================================

fn write_records(records: &FileRecords) -> String {
    let mut out = String::new();

    for module in &records.modules {
        push_record(&mut out, &["m".into(), module.id.to_string(), escape(&module.path)]);
    }

    for ty in &records.types {
        let Some(class) = &ty.class else {
            push_record(&mut out, &["d".into(), ty.id.to_string(), escape(&ty.name)]);
            continue;
        };
        push_record(
            &mut out,
            &[
                "c".into(),
                ty.id.to_string(),
                escape(&ty.name),
                class.module.to_string(),
                class.line.to_string(),
            ],
        );
        for attribute in &class.attributes {
            push_record(
                &mut out,
                &[
                    "a".into(),
                    escape(&attribute.name),
                    attribute.type_id.to_string(),
                    flag(attribute.is_const),
                    flag(attribute.is_ref),
                    attribute.visibility.symbol().to_string(),
                ],
            );
        }
        for operation in &class.operations {
            push_record(&mut out, &operation_fields(operation));
        }
    }

    for generalization in &records.generalizations {
        push_record(
            &mut out,
            &[
                "g".into(),
                generalization.child.to_string(),
                generalization.parent.to_string(),
                generalization.visibility.symbol().to_string(),
            ],
        );
    }

    out
}

fn operation_fields(operation: &OperationRecord) -> [String; 13] {
    [
        "o".into(),
        escape(&operation.name),
        operation.visibility.symbol().to_string(),
        flag(operation.is_const),
        flag(operation.is_virtual),
        operation.module.to_string(),
        operation.line.to_string(),
        operation.return_type.to_string(),
        flag(operation.return_const),
        flag(operation.return_ref),
        write_params(&operation.params),
        write_params(&operation.body_vars),
        write_statements(&operation.statements),
    ]
}

fn write_params(params: &[ParamRecord]) -> String {
    params
        .iter()
        .map(|p| {
            format!(
                "{}@{}@{}@{}",
                escape(&p.name),
                p.type_id,
                flag(p.is_const),
                flag(p.is_ref)
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn write_statements(statements: &[StatementRecord]) -> String {
    statements
        .iter()
        .map(|s| match s {
            StatementRecord::Open { condition } => format!("{{{}", escape(condition)),
            StatementRecord::Close => "}".to_string(),
            StatementRecord::Call { name, type_id } => format!("c={}@{type_id}", escape(name)),
            StatementRecord::VarRef {
                name,
                owner,
                var_type,
                is_write,
            } => format!("v={}@{owner}@{var_type}@{}", escape(name), flag(*is_write)),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn push_record(out: &mut String, fields: &[String]) {
    out.push_str(&fields.join("|"));
    out.push('\n');
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

// ============================================================================
// ESCAPING
// ============================================================================

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '|' | ';' | '@' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split on `sep`, skipping escaped separators. Pieces stay escaped.
pub(crate) fn split_escaped(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == sep {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}
