//! Handle-level edits that keep the model free of dangling references.
//!
//! Each edit validates first and mutates afterwards, so a refused edit
//! leaves the graph untouched.

use tracing::{debug, trace};

use super::checker::{ReferenceIntegrityChecker, ReferenceSite};
use crate::base::TypeId;
use crate::error::{ModelError, ModelResult};
use crate::model::{ModelGraph, TypeEntity, TypeTarget};

/// Redirect every reference to `old` onto `new`, then erase `old`.
///
/// Covers members, signatures, statements and both association ends.
/// Associations that become duplicates are collapsed. Returns the erased
/// entity.
pub fn replace_type(graph: &mut ModelGraph, old: TypeId, new: TypeId) -> ModelResult<TypeEntity> {
    if !graph.contains(old) {
        return Err(ModelError::UnknownEntity(old));
    }
    if !graph.contains(new) {
        return Err(ModelError::UnknownEntity(new));
    }
    if old == new {
        return Err(ModelError::Unsupported(format!(
            "cannot replace {old} with itself"
        )));
    }

    let mut rewritten = 0usize;
    for (_, classifier) in graph.classifiers_mut() {
        classifier.for_each_ref_mut(|_, r| {
            if r.targets(old) {
                r.target = TypeTarget::Resolved(new);
                rewritten += 1;
            }
        });
    }
    for association in graph.associations_mut() {
        if association.child == old {
            association.child = new;
            rewritten += 1;
        }
        if association.parent == old {
            association.parent = new;
            rewritten += 1;
        }
    }
    graph.rebuild_association_index();

    let entity = graph
        .remove_type(old)
        .ok_or(ModelError::UnknownEntity(old))?;
    debug!(
        "[INTEGRITY] replaced '{}' ({}) with {}: {} site(s) rewritten",
        entity.name, old, new, rewritten
    );
    Ok(entity)
}

/// Erase `id` if nothing outside of it references it.
///
/// Fails with [`ModelError::StillReferenced`] otherwise; references an
/// entity holds to itself do not count.
pub fn erase_type(graph: &mut ModelGraph, id: TypeId) -> ModelResult<TypeEntity> {
    let Some(entity) = graph.get(id) else {
        return Err(ModelError::UnknownEntity(id));
    };
    let sites: Vec<ReferenceSite> = ReferenceIntegrityChecker::new(graph)
        .reference_sites(id)
        .into_iter()
        .filter(|site| !matches!(site, ReferenceSite::Member { owner, .. } if *owner == id))
        .collect();
    if !sites.is_empty() {
        return Err(ModelError::StillReferenced {
            id,
            name: entity.name.to_string(),
            sites: sites.len(),
        });
    }

    let entity = graph.remove_type(id).ok_or(ModelError::UnknownEntity(id))?;
    trace!("[INTEGRITY] erased '{}' ({})", entity.name, id);
    Ok(entity)
}

/// Erase every entity that is not reachable from the defined model.
///
/// Returns the number of erased entities.
pub fn collect_garbage(graph: &mut ModelGraph) -> usize {
    let reachable = ReferenceIntegrityChecker::new(graph).reachable();
    let garbage: Vec<TypeId> = graph
        .types()
        .map(|(id, _)| id)
        .filter(|id| !reachable.contains(id))
        .collect();
    for id in &garbage {
        if let Some(entity) = graph.remove_type(*id) {
            trace!("[INTEGRITY] collected '{}' ({})", entity.name, id);
        }
    }
    if !garbage.is_empty() {
        debug!("[INTEGRITY] collected {} unreachable type(s)", garbage.len());
    }
    garbage.len()
}
