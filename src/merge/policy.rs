//! Member-level merge rules.
//!
//! Given an existing classifier and the content another file reported for
//! the same type:
//!
//! - A forward classifier adopts the incoming defining module and line.
//!   When both name a different module, the existing one is kept.
//! - Attributes are added when no attribute of that name exists. A same-named
//!   attribute with a different declared type is a conflict; the existing
//!   one stays.
//! - Operations (identity: name + const) are added when absent. An existing
//!   operation without statements is replaced by the incoming one. Two bodies
//!   in different modules are a conflict; the existing body stays.

use smol_str::SmolStr;

use super::report::FileSummary;
use crate::base::ModuleId;
use crate::model::Classifier;

/// An operation body that was dropped because another module defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OperationConflict {
    pub name: SmolStr,
    pub kept: ModuleId,
    pub discarded: ModuleId,
}

/// Outcome of [`merge_classifier`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ClassifierMerge {
    /// Kept and incoming defining module, when they differ.
    pub module_conflict: Option<(ModuleId, ModuleId)>,
    /// Attributes whose incoming declared type was dropped.
    pub attribute_conflicts: Vec<SmolStr>,
    pub operation_conflicts: Vec<OperationConflict>,
}

impl ClassifierMerge {
    /// Both sides claim to define the classifier and some member disagrees.
    pub fn ambiguous_definition(&self) -> Option<(ModuleId, ModuleId)> {
        let conflicting =
            !self.attribute_conflicts.is_empty() || !self.operation_conflicts.is_empty();
        self.module_conflict.filter(|_| conflicting)
    }

    /// Names of the members whose incoming version was dropped.
    pub fn conflicting_members(&self) -> Vec<String> {
        self.attribute_conflicts
            .iter()
            .chain(self.operation_conflicts.iter().map(|c| &c.name))
            .map(|name| name.to_string())
            .collect()
    }
}

pub(crate) fn merge_classifier(
    existing: &mut Classifier,
    incoming: Classifier,
    summary: &mut FileSummary,
) -> ClassifierMerge {
    let mut outcome = ClassifierMerge::default();
    match (existing.module, incoming.module) {
        (Some(kept), Some(discarded)) if kept != discarded => {
            outcome.module_conflict = Some((kept, discarded));
        }
        (None, Some(module)) => {
            existing.module = Some(module);
            existing.line = incoming.line;
        }
        _ => {
            if existing.line == 0 {
                existing.line = incoming.line;
            }
        }
    }

    for attribute in incoming.attributes {
        match existing.attribute(&attribute.name) {
            None => {
                existing.attributes.push(attribute);
                summary.attributes_added += 1;
            }
            Some(kept) if kept.declared_type != attribute.declared_type => {
                outcome.attribute_conflicts.push(attribute.name);
            }
            Some(_) => {}
        }
    }

    for operation in incoming.operations {
        let Some(idx) = existing.operation_index(&operation.name, operation.is_const) else {
            existing.operations.push(operation);
            summary.operations_added += 1;
            continue;
        };
        let kept = &mut existing.operations[idx];
        if !kept.is_definition() {
            *kept = operation;
            summary.operations_replaced += 1;
            continue;
        }
        if let (true, Some(kept_module), Some(discarded)) =
            (operation.is_definition(), kept.module, operation.module)
        {
            if kept_module != discarded {
                outcome.operation_conflicts.push(OperationConflict {
                    name: operation.name.clone(),
                    kept: kept_module,
                    discarded,
                });
            }
        }
    }

    outcome
}
