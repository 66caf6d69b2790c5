//! Types, classifiers and the references between them.

use smol_str::SmolStr;

use super::operation::Operation;
use crate::base::{LocalId, ModuleId, TypeId};

// ============================================================================
// VISIBILITY
// ============================================================================

/// Member or inheritance visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "interchange",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// UML-style marker used by the textual record dialect.
    pub fn symbol(self) -> char {
        match self {
            Self::Public => '+',
            Self::Protected => '#',
            Self::Private => '-',
        }
    }

    /// Parse a UML-style marker or a spelled-out keyword.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "+" | "public" => Some(Self::Public),
            "#" | "protected" => Some(Self::Protected),
            "-" | "private" => Some(Self::Private),
            _ => None,
        }
    }
}

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// What a [`TypeRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTarget {
    /// No type, or an intrinsic the model does not track (local id `0`).
    Intrinsic,
    /// A file-local id that has not been remapped yet.
    Pending(LocalId),
    /// A live entity in the model arena.
    Resolved(TypeId),
}

/// A non-owning reference to a type, with the qualifiers of the use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub target: TypeTarget,
    pub is_const: bool,
    pub is_reference: bool,
}

impl TypeRef {
    /// Reference to nothing in particular (`void`, builtins, unknown).
    pub fn intrinsic() -> Self {
        Self {
            target: TypeTarget::Intrinsic,
            is_const: false,
            is_reference: false,
        }
    }

    /// Reference by file-local id. Id `0` yields an intrinsic reference.
    pub fn local(id: LocalId, is_const: bool, is_reference: bool) -> Self {
        let target = if id.is_none() {
            TypeTarget::Intrinsic
        } else {
            TypeTarget::Pending(id)
        };
        Self {
            target,
            is_const,
            is_reference,
        }
    }

    /// Plain reference to a live entity.
    pub fn to(id: TypeId) -> Self {
        Self {
            target: TypeTarget::Resolved(id),
            is_const: false,
            is_reference: false,
        }
    }

    /// The global handle, if this reference has been resolved.
    pub fn type_id(&self) -> Option<TypeId> {
        match self.target {
            TypeTarget::Resolved(id) => Some(id),
            TypeTarget::Intrinsic | TypeTarget::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.target, TypeTarget::Pending(_))
    }

    /// Returns true if this reference targets `id`.
    #[inline]
    pub fn targets(&self, id: TypeId) -> bool {
        self.target == TypeTarget::Resolved(id)
    }
}

/// Where inside a classifier a [`TypeRef`] lives.
///
/// Indices are positions in the classifier's attribute/operation lists and
/// in the operation's parameter, body variable and statement lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefSite {
    Attribute { index: usize },
    Return { operation: usize },
    Param { operation: usize, index: usize },
    BodyVar { operation: usize, index: usize },
    Call { operation: usize, statement: usize },
    VarOwner { operation: usize, statement: usize },
    VarType { operation: usize, statement: usize },
}

impl RefSite {
    /// The operation index for operation-level sites.
    pub fn operation(&self) -> Option<usize> {
        match *self {
            Self::Attribute { .. } => None,
            Self::Return { operation }
            | Self::Param { operation, .. }
            | Self::BodyVar { operation, .. }
            | Self::Call { operation, .. }
            | Self::VarOwner { operation, .. }
            | Self::VarType { operation, .. } => Some(operation),
        }
    }
}

// ============================================================================
// ATTRIBUTES AND CLASSIFIERS
// ============================================================================

/// A data member of a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub declared_type: TypeRef,
    pub visibility: Visibility,
}

/// A type with members.
///
/// A classifier without a module is a forward reference: known by name only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classifier {
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
    pub module: Option<ModuleId>,
    pub line: u32,
}

impl Classifier {
    /// Returns true if the classifier was defined in this build.
    pub fn is_defined(&self) -> bool {
        self.module.is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Find an operation by identity (name + const qualification).
    pub fn operation(&self, name: &str, is_const: bool) -> Option<&Operation> {
        self.operation_index(name, is_const)
            .map(|idx| &self.operations[idx])
    }

    pub(crate) fn operation_index(&self, name: &str, is_const: bool) -> Option<usize> {
        self.operations
            .iter()
            .position(|op| op.name == name && op.is_const == is_const)
    }

    /// Visit every type reference held by this classifier.
    pub fn for_each_ref(&self, mut f: impl FnMut(RefSite, &TypeRef)) {
        for (index, attr) in self.attributes.iter().enumerate() {
            f(RefSite::Attribute { index }, &attr.declared_type);
        }
        for (index, op) in self.operations.iter().enumerate() {
            op.for_each_ref(index, &mut f);
        }
    }

    /// Mutable twin of [`for_each_ref`](Self::for_each_ref); same order, same sites.
    pub(crate) fn for_each_ref_mut(&mut self, mut f: impl FnMut(RefSite, &mut TypeRef)) {
        for (index, attr) in self.attributes.iter_mut().enumerate() {
            f(RefSite::Attribute { index }, &mut attr.declared_type);
        }
        for (index, op) in self.operations.iter_mut().enumerate() {
            op.for_each_ref_mut(index, &mut f);
        }
    }
}

// ============================================================================
// TYPE ENTITIES
// ============================================================================

/// Closed set of type kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A type known only by name (library types, builtins).
    DataType,
    /// A type with members.
    Class(Classifier),
}

/// An entry of the model arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntity {
    pub name: SmolStr,
    pub kind: TypeKind,
}

impl TypeEntity {
    pub fn data_type(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::DataType,
        }
    }

    pub fn class(name: impl Into<SmolStr>, classifier: Classifier) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class(classifier),
        }
    }

    pub fn is_classifier(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }

    /// Returns true for classifiers defined in this build.
    pub fn is_defined(&self) -> bool {
        self.as_classifier().is_some_and(Classifier::is_defined)
    }

    pub fn as_classifier(&self) -> Option<&Classifier> {
        match &self.kind {
            TypeKind::Class(classifier) => Some(classifier),
            TypeKind::DataType => None,
        }
    }

    pub(crate) fn as_classifier_mut(&mut self) -> Option<&mut Classifier> {
        match &mut self.kind {
            TypeKind::Class(classifier) => Some(classifier),
            TypeKind::DataType => None,
        }
    }

    /// Turn a DataType into an empty (forward) classifier, in place.
    ///
    /// The arena slot, and therefore every handle to it, is unchanged.
    pub(crate) fn upgrade(&mut self) -> &mut Classifier {
        if matches!(self.kind, TypeKind::DataType) {
            self.kind = TypeKind::Class(Classifier::default());
        }
        match &mut self.kind {
            TypeKind::Class(classifier) => classifier,
            TypeKind::DataType => unreachable!("upgraded above"),
        }
    }
}
