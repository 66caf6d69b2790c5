//! The per-file result record set.
//!
//! This is what one per-file analysis produces, before any validation:
//! modules, types (with their members when they are classes) and
//! generalizations, all addressed by file-local integer ids. Id `0` in any
//! type position means "no type / intrinsic".
//!
//! ```text
//! FileRecords
//! ├── modules:          [ModuleRecord { id, path }]
//! ├── types:            [TypeRecord { id, name, class: Option<ClassRecord> }]
//! │                        └── ClassRecord { module, line, attributes, operations }
//! └── generalizations:  [GeneralizationRecord { child, parent, visibility }]
//! ```

use crate::model::Visibility;

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

/// A compilation unit the types were seen in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ModuleRecord {
    pub id: u32,
    pub path: String,
}

/// A type known to one per-file result.
///
/// `class: None` is a DataType, known by name only.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct TypeRecord {
    pub id: u32,
    pub name: String,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub class: Option<ClassRecord>,
}

/// Members and origin of a class record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct ClassRecord {
    /// Defining module, `0` for a forward reference.
    pub module: u32,
    pub line: u32,
    pub attributes: Vec<AttributeRecord>,
    pub operations: Vec<OperationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct AttributeRecord {
    pub name: String,
    pub type_id: u32,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_const: bool,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_ref: bool,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub visibility: Visibility,
}

/// A parameter or a body-local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ParamRecord {
    pub name: String,
    pub type_id: u32,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_const: bool,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub is_ref: bool,
}

/// One flattened body statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "interchange", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StatementRecord {
    Open {
        condition: String,
    },
    Close,
    Call {
        name: String,
        type_id: u32,
    },
    VarRef {
        name: String,
        owner: u32,
        var_type: u32,
        is_write: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct OperationRecord {
    pub name: String,
    pub visibility: Visibility,
    pub is_const: bool,
    pub is_virtual: bool,
    /// Module holding the body, `0` for a pure declaration.
    pub module: u32,
    pub line: u32,
    pub return_type: u32,
    pub return_const: bool,
    pub return_ref: bool,
    pub params: Vec<ParamRecord>,
    pub body_vars: Vec<ParamRecord>,
    pub statements: Vec<StatementRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct GeneralizationRecord {
    pub child: u32,
    pub parent: u32,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub visibility: Visibility,
}

/// Everything one per-file analysis reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct FileRecords {
    pub modules: Vec<ModuleRecord>,
    pub types: Vec<TypeRecord>,
    pub generalizations: Vec<GeneralizationRecord>,
}

impl FileRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.types.is_empty() && self.generalizations.is_empty()
    }

    pub fn add_module(&mut self, id: u32, path: impl Into<String>) -> &mut Self {
        self.modules.push(ModuleRecord {
            id,
            path: path.into(),
        });
        self
    }

    pub fn add_data_type(&mut self, id: u32, name: impl Into<String>) -> &mut Self {
        self.types.push(TypeRecord {
            id,
            name: name.into(),
            class: None,
        });
        self
    }

    /// Add a class record and return it for filling in members.
    pub fn add_class(
        &mut self,
        id: u32,
        name: impl Into<String>,
        module: u32,
        line: u32,
    ) -> &mut ClassRecord {
        let idx = self.types.len();
        self.types.push(TypeRecord {
            id,
            name: name.into(),
            class: None,
        });
        self.types[idx].class.insert(ClassRecord {
            module,
            line,
            ..ClassRecord::default()
        })
    }

    pub fn add_generalization(&mut self, child: u32, parent: u32, visibility: Visibility) -> &mut Self {
        self.generalizations.push(GeneralizationRecord {
            child,
            parent,
            visibility,
        });
        self
    }
}

impl ClassRecord {
    pub fn attribute(&mut self, name: impl Into<String>, type_id: u32) -> &mut Self {
        self.attributes.push(AttributeRecord {
            name: name.into(),
            type_id,
            is_const: false,
            is_ref: false,
            visibility: Visibility::Private,
        });
        self
    }

    /// Add an operation and return it for filling in signature and body.
    pub fn operation(&mut self, name: impl Into<String>) -> &mut OperationRecord {
        self.operations.push(OperationRecord {
            name: name.into(),
            ..OperationRecord::default()
        });
        let last = self.operations.len() - 1;
        &mut self.operations[last]
    }
}

impl OperationRecord {
    /// Mark the operation as having a body in `module`.
    pub fn defined_in(&mut self, module: u32, line: u32) -> &mut Self {
        self.module = module;
        self.line = line;
        self
    }

    pub fn returns(&mut self, type_id: u32) -> &mut Self {
        self.return_type = type_id;
        self
    }

    pub fn param(&mut self, name: impl Into<String>, type_id: u32) -> &mut Self {
        self.params.push(ParamRecord {
            name: name.into(),
            type_id,
            is_const: false,
            is_ref: false,
        });
        self
    }

    pub fn body_var(&mut self, name: impl Into<String>, type_id: u32) -> &mut Self {
        self.body_vars.push(ParamRecord {
            name: name.into(),
            type_id,
            is_const: false,
            is_ref: false,
        });
        self
    }

    pub fn open(&mut self, condition: impl Into<String>) -> &mut Self {
        self.statements.push(StatementRecord::Open {
            condition: condition.into(),
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.statements.push(StatementRecord::Close);
        self
    }

    pub fn call(&mut self, name: impl Into<String>, type_id: u32) -> &mut Self {
        self.statements.push(StatementRecord::Call {
            name: name.into(),
            type_id,
        });
        self
    }

    pub fn var_ref(
        &mut self,
        name: impl Into<String>,
        owner: u32,
        var_type: u32,
        is_write: bool,
    ) -> &mut Self {
        self.statements.push(StatementRecord::VarRef {
            name: name.into(),
            owner,
            var_type,
            is_write,
        });
        self
    }
}
