//! Operations and their flattened statement sequences.
//!
//! An operation body is reduced to the information sequence diagrams and
//! complexity metrics need: branch points (`OpenNest` / `CloseNest`) and the
//! calls and variable accesses inside them.

use smol_str::SmolStr;
use thiserror::Error;

use super::types::{RefSite, TypeRef, Visibility};
use crate::base::ModuleId;

/// A parameter or body variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: SmolStr,
    pub declared_type: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<SmolStr>, declared_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}

/// One element of a flattened operation body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Start of a conditional or loop body; `condition` is the source text.
    OpenNest { condition: String },
    /// End of the innermost open nest.
    CloseNest,
    /// Call of operation `name` on class `target`.
    Call { name: SmolStr, target: TypeRef },
    /// Access to member variable `name` of `owner`, whose type is `var_type`.
    VarRef {
        name: SmolStr,
        owner: TypeRef,
        var_type: TypeRef,
        is_write: bool,
    },
}

/// Nesting imbalance found in a statement sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NestingError {
    #[error("unmatched close at statement {index}")]
    UnmatchedClose { index: usize },
    #[error("{open} nest(s) left open")]
    Unclosed { open: usize },
}

/// A flat, properly nested statement sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statements(Vec<Statement>);

impl Statements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.0.push(statement);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Statement] {
        &self.0
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Statement> {
        self.0.iter_mut()
    }

    /// Check that every `OpenNest` has a matching `CloseNest`.
    pub fn validate_nesting(&self) -> Result<(), NestingError> {
        let mut depth = 0usize;
        for (index, statement) in self.0.iter().enumerate() {
            match statement {
                Statement::OpenNest { .. } => depth += 1,
                Statement::CloseNest => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(NestingError::UnmatchedClose { index })?;
                }
                Statement::Call { .. } | Statement::VarRef { .. } => {}
            }
        }
        if depth == 0 {
            Ok(())
        } else {
            Err(NestingError::Unclosed { open: depth })
        }
    }

    /// Deepest nesting level reached.
    pub fn max_depth(&self) -> usize {
        let mut depth = 0usize;
        let mut max = 0usize;
        for statement in &self.0 {
            match statement {
                Statement::OpenNest { .. } => {
                    depth += 1;
                    max = max.max(depth);
                }
                Statement::CloseNest => depth = depth.saturating_sub(1),
                Statement::Call { .. } | Statement::VarRef { .. } => {}
            }
        }
        max
    }

    /// McCabe-style complexity of the body.
    ///
    /// Starts at 1; each conditional nest adds 1, as does each `&&` / `||`
    /// in its condition. `else` branches add nothing.
    pub fn complexity(&self) -> usize {
        let mut complexity = 1;
        for statement in &self.0 {
            let Statement::OpenNest { condition } = statement else {
                continue;
            };
            let condition = condition.trim();
            if condition.is_empty() || is_else_branch(condition) {
                continue;
            }
            complexity += 1;
            complexity += condition.matches("&&").count() + condition.matches("||").count();
        }
        complexity
    }

    /// Calls in statement order, as `(operation name, target)`.
    pub fn calls(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
        self.0.iter().filter_map(|s| match s {
            Statement::Call { name, target } => Some((name.as_str(), target)),
            _ => None,
        })
    }

    /// Variable accesses in statement order.
    pub fn var_refs(&self) -> impl Iterator<Item = &Statement> {
        self.0
            .iter()
            .filter(|s| matches!(s, Statement::VarRef { .. }))
    }
}

impl From<Vec<Statement>> for Statements {
    fn from(statements: Vec<Statement>) -> Self {
        Self(statements)
    }
}

impl<'a> IntoIterator for &'a Statements {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn is_else_branch(condition: &str) -> bool {
    let bare = condition.trim_start_matches('[').trim_end_matches(']').trim();
    bare.eq_ignore_ascii_case("else")
}

/// A member function.
///
/// Identity is name + const qualification only; overloads that differ in
/// their parameter lists are treated as the same operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: SmolStr,
    pub visibility: Visibility,
    pub is_const: bool,
    pub is_virtual: bool,
    pub return_type: TypeRef,
    pub params: Vec<Param>,
    pub body_vars: Vec<Param>,
    pub statements: Statements,
    pub module: Option<ModuleId>,
    pub line: u32,
}

impl Operation {
    /// A declaration with no parameters, body or module.
    pub fn declaration(name: impl Into<SmolStr>, is_const: bool) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_const,
            is_virtual: false,
            return_type: TypeRef::intrinsic(),
            params: Vec::new(),
            body_vars: Vec::new(),
            statements: Statements::new(),
            module: None,
            line: 0,
        }
    }

    /// Returns true if `other` is the same operation under the model's identity rule.
    pub fn same_identity(&self, other: &Operation) -> bool {
        self.name == other.name && self.is_const == other.is_const
    }

    /// An operation with statements is a definition; an empty body is a declaration.
    pub fn is_definition(&self) -> bool {
        !self.statements.is_empty()
    }

    pub fn is_defined(&self) -> bool {
        self.module.is_some()
    }

    pub fn complexity(&self) -> usize {
        self.statements.complexity()
    }

    pub(crate) fn for_each_ref(&self, operation: usize, f: &mut impl FnMut(RefSite, &TypeRef)) {
        f(RefSite::Return { operation }, &self.return_type);
        for (index, param) in self.params.iter().enumerate() {
            f(RefSite::Param { operation, index }, &param.declared_type);
        }
        for (index, var) in self.body_vars.iter().enumerate() {
            f(RefSite::BodyVar { operation, index }, &var.declared_type);
        }
        for (statement, stmt) in self.statements.iter().enumerate() {
            match stmt {
                Statement::Call { target, .. } => f(RefSite::Call { operation, statement }, target),
                Statement::VarRef {
                    owner, var_type, ..
                } => {
                    f(RefSite::VarOwner { operation, statement }, owner);
                    f(RefSite::VarType { operation, statement }, var_type);
                }
                Statement::OpenNest { .. } | Statement::CloseNest => {}
            }
        }
    }

    pub(crate) fn for_each_ref_mut(
        &mut self,
        operation: usize,
        f: &mut impl FnMut(RefSite, &mut TypeRef),
    ) {
        f(RefSite::Return { operation }, &mut self.return_type);
        for (index, param) in self.params.iter_mut().enumerate() {
            f(RefSite::Param { operation, index }, &mut param.declared_type);
        }
        for (index, var) in self.body_vars.iter_mut().enumerate() {
            f(RefSite::BodyVar { operation, index }, &mut var.declared_type);
        }
        for (statement, stmt) in self.statements.iter_mut().enumerate() {
            match stmt {
                Statement::Call { target, .. } => {
                    f(RefSite::Call { operation, statement }, target)
                }
                Statement::VarRef {
                    owner, var_type, ..
                } => {
                    f(RefSite::VarOwner { operation, statement }, owner);
                    f(RefSite::VarType { operation, statement }, var_type);
                }
                Statement::OpenNest { .. } | Statement::CloseNest => {}
            }
        }
    }
}
