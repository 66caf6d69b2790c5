//! Reference-site queries and model invariant checks.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::base::{TypeId, normalize};
use crate::error::{ModelError, ModelResult};
use crate::model::{Classifier, ModelGraph, RefSite, TypeTarget};

/// A place in the model that holds a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSite {
    /// A member, signature or statement of classifier `owner`.
    Member { owner: TypeId, site: RefSite },
    /// The child end of association `index`.
    AssociationChild { index: usize },
    /// The parent end of association `index`.
    AssociationParent { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Only sites that keep an entity alive.
    Defined,
    /// Every site.
    All,
}

/// Read-only queries over the references held by a [`ModelGraph`].
#[derive(Debug, Clone, Copy)]
pub struct ReferenceIntegrityChecker<'g> {
    graph: &'g ModelGraph,
}

impl<'g> ReferenceIntegrityChecker<'g> {
    pub fn new(graph: &'g ModelGraph) -> Self {
        Self { graph }
    }

    /// Returns true if a defined owner or an association references `id`.
    ///
    /// A reference counts when its classifier is defined in this build, or
    /// when it sits in an operation that is.
    pub fn is_referenced(&self, id: TypeId) -> bool {
        !self.sites(id, Scope::Defined).is_empty()
    }

    /// Every site that references `id`, including sites inside forward
    /// classifiers and inside `id` itself.
    pub fn reference_sites(&self, id: TypeId) -> Vec<ReferenceSite> {
        self.sites(id, Scope::All)
    }

    fn sites(&self, id: TypeId, scope: Scope) -> Vec<ReferenceSite> {
        let mut found = Vec::new();
        for (owner, _, classifier) in self.graph.classifiers() {
            let owner_defined = classifier.is_defined();
            classifier.for_each_ref(|site, r| {
                if !r.targets(id) {
                    return;
                }
                if scope == Scope::Defined
                    && !owner_defined
                    && !site_in_defined_operation(classifier, site)
                {
                    return;
                }
                found.push(ReferenceSite::Member { owner, site });
            });
        }
        for (index, association) in self.graph.associations().iter().enumerate() {
            if association.child == id {
                found.push(ReferenceSite::AssociationChild { index });
            }
            if association.parent == id {
                found.push(ReferenceSite::AssociationParent { index });
            }
        }
        found
    }

    /// Entities reachable from the defined part of the model.
    ///
    /// Roots are defined classifiers, classifiers with a defined operation
    /// and both ends of every association. Everything a reachable classifier
    /// references is reachable.
    pub fn reachable(&self) -> FxHashSet<TypeId> {
        let mut stack: Vec<TypeId> = Vec::new();
        for (id, _, classifier) in self.graph.classifiers() {
            if classifier.is_defined() || classifier.operations.iter().any(|op| op.is_defined()) {
                stack.push(id);
            }
        }
        for association in self.graph.associations() {
            stack.push(association.child);
            stack.push(association.parent);
        }

        let mut marked = FxHashSet::default();
        while let Some(id) = stack.pop() {
            if !marked.insert(id) {
                continue;
            }
            if let Some(classifier) = self.graph.classifier(id) {
                classifier.for_each_ref(|_, r| {
                    if let Some(target) = r.type_id() {
                        if !marked.contains(&target) {
                            stack.push(target);
                        }
                    }
                });
            }
        }
        trace!(
            "[INTEGRITY] {} of {} type(s) reachable",
            marked.len(),
            self.graph.type_count()
        );
        marked
    }

    /// Check every model invariant.
    ///
    /// - no reference is still file-local
    /// - every handle names a live entity
    /// - every module handle is registered
    /// - every operation body is properly nested
    /// - the name index is sorted and agrees with the arena in both directions
    ///
    /// `context` names the step that just finished, for the error message.
    pub fn verify(&self, context: &str) -> ModelResult<()> {
        let violation =
            |entity: &str, message: String| Err(ModelError::integrity(context, entity, message));

        for (id, entity, classifier) in self.graph.classifiers() {
            let mut problem = None;
            classifier.for_each_ref(|site, r| {
                if problem.is_some() {
                    return;
                }
                match r.target {
                    TypeTarget::Intrinsic => {}
                    TypeTarget::Pending(local) => {
                        problem = Some(format!("local id {local} survived the merge at {site:?}"));
                    }
                    TypeTarget::Resolved(target) if !self.graph.contains(target) => {
                        problem = Some(format!("dangling handle {target} at {site:?}"));
                    }
                    TypeTarget::Resolved(_) => {}
                }
            });
            if let Some(message) = problem {
                return violation(&entity.name, message);
            }

            if let Some(module) = classifier.module {
                if self.graph.module_path(module).is_none() {
                    return violation(&entity.name, format!("unknown module {}", module.0));
                }
            }
            for op in &classifier.operations {
                let op_name = format!("{}::{}", entity.name, op.name);
                if let Some(module) = op.module {
                    if self.graph.module_path(module).is_none() {
                        return violation(&op_name, format!("unknown module {}", module.0));
                    }
                }
                if let Err(e) = op.statements.validate_nesting() {
                    return violation(&op_name, e.to_string());
                }
            }
            trace!("[INTEGRITY] {} ({}) ok", entity.name, id);
        }

        for association in self.graph.associations() {
            for end in [association.child, association.parent] {
                if !self.graph.contains(end) {
                    return violation("association", format!("dangling handle {end}"));
                }
            }
        }

        let store = self.graph.store();
        if !store.is_sorted() {
            return violation("store", "name index is not sorted".to_string());
        }
        for entry in store.iter() {
            let Some(entity) = self.graph.get(entry.id) else {
                return violation(&entry.key, format!("index points at dead handle {}", entry.id));
            };
            if normalize(&entity.name) != entry.key.as_str() {
                return violation(
                    &entry.key,
                    format!("index key does not match entity name '{}'", entity.name),
                );
            }
        }
        for (id, entity) in self.graph.types() {
            if store.find(&normalize(&entity.name)) != Some(id) {
                return violation(&entity.name, format!("entity {id} is missing from the index"));
            }
        }

        Ok(())
    }
}

fn site_in_defined_operation(classifier: &Classifier, site: RefSite) -> bool {
    site.operation()
        .and_then(|idx| classifier.operations.get(idx))
        .is_some_and(|op| op.is_defined())
}
