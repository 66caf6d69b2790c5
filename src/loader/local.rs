//! Validated, file-local view of one per-file result.
//!
//! [`LocalGraph::build`] checks a [`FileRecords`] set completely before the
//! merge sees it: every local id a record mentions must be defined in the
//! same file (id `0` is exempt), module ids must be declared, and every
//! operation body must be properly nested. A file that fails any check
//! contributes nothing to the model.
//!
//! The result uses the model's own types, with every type reference still
//! [`Pending`](crate::model::TypeTarget::Pending) and module handles holding
//! the file's local module ids. [`IdRemap`](super::IdRemap) translates both.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::format::ResultFormat;
use super::records::{ClassRecord, FileRecords, OperationRecord, ParamRecord, StatementRecord};
use crate::base::{LocalId, ModuleId, normalize};
use crate::error::{ModelError, ModelResult};
use crate::model::{
    Attribute, Classifier, Operation, Param, Statement, Statements, TypeKind, TypeRef,
    Visibility,
};

/// A type as declared in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalType {
    pub local: LocalId,
    pub name: SmolStr,
    /// Normalized store key of `name`.
    pub key: String,
    pub kind: TypeKind,
}

/// A generalization between two local types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalGeneralization {
    pub child: LocalId,
    pub parent: LocalId,
    pub visibility: Visibility,
}

/// One per-file result, validated and ready to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalGraph {
    pub file: String,
    /// `(local module id, path)` in declaration order.
    pub modules: Vec<(u32, String)>,
    pub types: Vec<LocalType>,
    pub generalizations: Vec<LocalGeneralization>,
}

impl LocalGraph {
    /// Read `input` with `format` and validate it.
    pub fn decode(file: &str, input: &[u8], format: &dyn ResultFormat) -> ModelResult<Self> {
        let records = format.read(input).map_err(|e| e.in_file(file))?;
        Self::build(file, records)
    }

    /// Validate a record set.
    pub fn build(file: &str, records: FileRecords) -> ModelResult<Self> {
        let checker = Checker::new(file, &records)?;

        let mut types = Vec::with_capacity(records.types.len());
        for record in records.types {
            let local = LocalId::new(record.id);
            let kind = match record.class {
                None => TypeKind::DataType,
                Some(class) => TypeKind::Class(checker.classifier(&record.name, class)?),
            };
            types.push(LocalType {
                local,
                key: normalize(&record.name),
                name: SmolStr::new(&record.name),
                kind,
            });
        }

        let mut generalizations = Vec::with_capacity(records.generalizations.len());
        for record in records.generalizations {
            for (id, role) in [(record.child, "child"), (record.parent, "parent")] {
                if id == 0 || !checker.types.contains(&id) {
                    return Err(checker.malformed(
                        "generalization",
                        id,
                        format!("{role} is not a type defined in this file"),
                    ));
                }
            }
            generalizations.push(LocalGeneralization {
                child: LocalId::new(record.child),
                parent: LocalId::new(record.parent),
                visibility: record.visibility,
            });
        }

        trace!(
            "[LOCAL] {}: {} module(s), {} type(s), {} generalization(s)",
            file,
            records.modules.len(),
            types.len(),
            generalizations.len()
        );

        Ok(Self {
            file: file.to_string(),
            modules: records
                .modules
                .into_iter()
                .map(|m| (m.id, m.path))
                .collect(),
            types,
            generalizations,
        })
    }

    /// Path of a local module id.
    pub fn module_path(&self, id: u32) -> Option<&str> {
        self.modules
            .iter()
            .find(|(local, _)| *local == id)
            .map(|(_, path)| path.as_str())
    }

    pub fn find_type(&self, local: LocalId) -> Option<&LocalType> {
        self.types.iter().find(|t| t.local == local)
    }
}

/// Id tables of one record set, and the checks that use them.
struct Checker<'a> {
    file: &'a str,
    types: FxHashSet<u32>,
    modules: FxHashSet<u32>,
}

impl<'a> Checker<'a> {
    fn new(file: &'a str, records: &FileRecords) -> ModelResult<Self> {
        let mut checker = Self {
            file,
            types: FxHashSet::default(),
            modules: FxHashSet::default(),
        };
        for module in &records.modules {
            if module.id == 0 {
                return Err(checker.malformed(&module.path, 0, "module id 0 is reserved"));
            }
            if !checker.modules.insert(module.id) {
                return Err(checker.malformed(&module.path, module.id, "duplicate module id"));
            }
        }
        for ty in &records.types {
            if ty.id == 0 {
                return Err(checker.malformed(&ty.name, 0, "type id 0 is reserved"));
            }
            if !checker.types.insert(ty.id) {
                return Err(checker.malformed(&ty.name, ty.id, "duplicate type id"));
            }
        }
        Ok(checker)
    }

    fn malformed(&self, entity: &str, local_id: u32, message: impl Into<String>) -> ModelError {
        ModelError::malformed(self.file, entity, local_id, message)
    }

    fn type_ref(&self, entity: &str, id: u32, is_const: bool, is_ref: bool) -> ModelResult<TypeRef> {
        if id != 0 && !self.types.contains(&id) {
            return Err(self.malformed(entity, id, "undefined type id"));
        }
        Ok(TypeRef::local(LocalId::new(id), is_const, is_ref))
    }

    fn module(&self, entity: &str, id: u32) -> ModelResult<Option<ModuleId>> {
        match id {
            0 => Ok(None),
            id if self.modules.contains(&id) => Ok(Some(ModuleId(id))),
            id => Err(self.malformed(entity, id, "undefined module id")),
        }
    }

    fn classifier(&self, class_name: &str, record: ClassRecord) -> ModelResult<Classifier> {
        let module = self.module(class_name, record.module)?;

        let mut attributes = Vec::with_capacity(record.attributes.len());
        for attr in record.attributes {
            let entity = format!("{class_name}::{}", attr.name);
            attributes.push(Attribute {
                declared_type: self.type_ref(&entity, attr.type_id, attr.is_const, attr.is_ref)?,
                name: SmolStr::new(&attr.name),
                visibility: attr.visibility,
            });
        }

        let mut operations = Vec::with_capacity(record.operations.len());
        for op in record.operations {
            operations.push(self.operation(class_name, op)?);
        }

        Ok(Classifier {
            attributes,
            operations,
            module,
            line: record.line,
        })
    }

    fn operation(&self, class_name: &str, record: OperationRecord) -> ModelResult<Operation> {
        let entity = format!("{class_name}::{}", record.name);
        let module = self.module(&entity, record.module)?;
        let return_type =
            self.type_ref(&entity, record.return_type, record.return_const, record.return_ref)?;
        let params = self.params(&entity, record.params)?;
        let body_vars = self.params(&entity, record.body_vars)?;

        let mut statements = Statements::new();
        for statement in record.statements {
            statements.push(match statement {
                StatementRecord::Open { condition } => Statement::OpenNest { condition },
                StatementRecord::Close => Statement::CloseNest,
                StatementRecord::Call { name, type_id } => Statement::Call {
                    target: self.type_ref(&entity, type_id, false, false)?,
                    name: SmolStr::new(name),
                },
                StatementRecord::VarRef {
                    name,
                    owner,
                    var_type,
                    is_write,
                } => Statement::VarRef {
                    owner: self.type_ref(&entity, owner, false, false)?,
                    var_type: self.type_ref(&entity, var_type, false, false)?,
                    name: SmolStr::new(name),
                    is_write,
                },
            });
        }
        statements
            .validate_nesting()
            .map_err(|e| ModelError::corrupt_sequence(self.file, &entity, e.to_string()))?;

        Ok(Operation {
            name: SmolStr::new(&record.name),
            visibility: record.visibility,
            is_const: record.is_const,
            is_virtual: record.is_virtual,
            return_type,
            params,
            body_vars,
            statements,
            module,
            line: record.line,
        })
    }

    fn params(&self, entity: &str, records: Vec<ParamRecord>) -> ModelResult<Vec<Param>> {
        records
            .into_iter()
            .map(|p| {
                let declared_type = self.type_ref(entity, p.type_id, p.is_const, p.is_ref)?;
                Ok(Param::new(p.name, declared_type))
            })
            .collect()
    }
}
