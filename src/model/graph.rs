//! The merged model: arena of types, module table and inheritance edges.
//!
//! ```text
//! ModelGraph
//! ├── types: Vec<Option<TypeEntity>>   (arena; index = TypeId, slot 0 unused)
//! ├── store: EntityStore               (normalized name -> TypeId)
//! ├── modules: IndexSet<String>        (index = ModuleId)
//! └── associations: Vec<Association>   (child -> parent, non-owning)
//! ```
//!
//! All cross-entity references are [`TypeId`] handles. A handle stays valid
//! across a DataType → Classifier upgrade because only the slot payload is
//! replaced. Slots become `None` only when an entity is erased.
//!
//! Everything public here is read-only; mutation happens through
//! [`MergeEngine`](crate::merge::MergeEngine) while the merge pass runs.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tracing::trace;

use super::store::EntityStore;
use super::types::{Classifier, TypeEntity, TypeRef, TypeTarget, Visibility};
use crate::base::{ModuleId, TypeId, is_template_spelling, normalize, template_definition_key};

/// An inheritance edge. Both ends are owned by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Association {
    pub child: TypeId,
    pub parent: TypeId,
    pub visibility: Visibility,
}

/// Entity counts, for summaries and logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub types: usize,
    pub classifiers: usize,
    pub defined_classifiers: usize,
    pub operations: usize,
    pub statements: usize,
    pub associations: usize,
    pub modules: usize,
}

/// The cross-file code model.
#[derive(Debug, Clone)]
pub struct ModelGraph {
    types: Vec<Option<TypeEntity>>,
    store: EntityStore,
    modules: IndexSet<String>,
    associations: Vec<Association>,
    association_index: FxHashSet<(TypeId, TypeId)>,
}

impl Default for ModelGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelGraph {
    pub fn new() -> Self {
        Self {
            // Slot 0 is never allocated.
            types: vec![None],
            store: EntityStore::new(),
            modules: IndexSet::new(),
            associations: Vec::new(),
            association_index: FxHashSet::default(),
        }
    }

    // ============================================================
    // Types
    // ============================================================

    /// Get a live entity by handle.
    pub fn get(&self, id: TypeId) -> Option<&TypeEntity> {
        self.types.get(id.index())?.as_ref()
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.get(id).is_some()
    }

    /// Get the classifier payload of a live entity.
    pub fn classifier(&self, id: TypeId) -> Option<&Classifier> {
        self.get(id)?.as_classifier()
    }

    /// Look up a type by any spelling of its name.
    pub fn find(&self, spelling: &str) -> Option<TypeId> {
        self.store.find(&normalize(spelling))
    }

    /// Look up a type by an already-normalized key.
    pub fn find_key(&self, key: &str) -> Option<TypeId> {
        self.store.find(key)
    }

    /// Find the definition of the template used by `spelling`.
    ///
    /// Searches the run of store entries sharing the template-definition key
    /// and returns the first one that is a classifier. A miss is normal for
    /// templates instantiated here but defined in third-party code.
    pub fn find_template_definition(&self, spelling: &str) -> Option<TypeId> {
        let key = template_definition_key(spelling);
        if key.is_empty() {
            return None;
        }
        let found = self
            .store
            .prefix_run(&key)
            .filter(|entry| {
                let rest = entry.key[key.len()..].trim_start();
                rest.is_empty() || rest.starts_with('<')
            })
            .find(|entry| self.get(entry.id).is_some_and(TypeEntity::is_classifier))
            .map(|entry| entry.id);
        if found.is_none() {
            trace!("[MODEL] no template definition for '{}' (key '{}')", spelling, key);
        }
        found
    }

    /// The classifier that defines `id`: itself, or its template definition.
    pub fn defining_classifier(&self, id: TypeId) -> Option<TypeId> {
        let entity = self.get(id)?;
        if entity.is_classifier() {
            return Some(id);
        }
        if is_template_spelling(&entity.name) {
            return self.find_template_definition(&entity.name);
        }
        None
    }

    /// Name of the entity a reference targets.
    pub fn type_name(&self, r: &TypeRef) -> Option<&str> {
        match r.target {
            TypeTarget::Resolved(id) => self.get(id).map(|e| e.name.as_str()),
            TypeTarget::Intrinsic | TypeTarget::Pending(_) => None,
        }
    }

    /// All live types in handle order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeEntity)> {
        self.types
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|e| (TypeId(idx as u32), e)))
    }

    /// All live classifiers in handle order.
    pub fn classifiers(&self) -> impl Iterator<Item = (TypeId, &TypeEntity, &Classifier)> {
        self.types()
            .filter_map(|(id, e)| e.as_classifier().map(|c| (id, e, c)))
    }

    /// Number of live types.
    pub fn type_count(&self) -> usize {
        self.types.iter().filter(|slot| slot.is_some()).count()
    }

    /// One past the highest handle ever allocated.
    pub fn arena_len(&self) -> usize {
        self.types.len()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // ============================================================
    // Modules
    // ============================================================

    pub fn module_path(&self, id: ModuleId) -> Option<&str> {
        self.modules.get_index(id.index()).map(String::as_str)
    }

    pub fn find_module(&self, path: &str) -> Option<ModuleId> {
        self.modules.get_index_of(path).map(ModuleId::new)
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &str)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(idx, path)| (ModuleId::new(idx), path.as_str()))
    }

    /// Classifiers defined in a module.
    pub fn classifiers_in_module(&self, module: ModuleId) -> impl Iterator<Item = TypeId> {
        self.classifiers()
            .filter(move |(_, _, c)| c.module == Some(module))
            .map(|(id, _, _)| id)
    }

    // ============================================================
    // Associations and relations
    // ============================================================

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Direct base classes of `id`.
    pub fn parents_of(&self, id: TypeId) -> impl Iterator<Item = TypeId> {
        self.associations
            .iter()
            .filter(move |a| a.child == id)
            .map(|a| a.parent)
    }

    /// Direct subclasses of `id`.
    pub fn children_of(&self, id: TypeId) -> impl Iterator<Item = TypeId> {
        self.associations
            .iter()
            .filter(move |a| a.parent == id)
            .map(|a| a.child)
    }

    /// Classifiers used as attribute types of `id` (aggregation).
    pub fn member_classifiers(&self, id: TypeId) -> Vec<TypeId> {
        let Some(classifier) = self.classifier(id) else {
            return Vec::new();
        };
        self.distinct_classifiers(classifier.attributes.iter().map(|a| &a.declared_type))
    }

    /// Classifiers used as parameter types of `id`'s operations.
    pub fn param_classifiers(&self, id: TypeId) -> Vec<TypeId> {
        let Some(classifier) = self.classifier(id) else {
            return Vec::new();
        };
        self.distinct_classifiers(
            classifier
                .operations
                .iter()
                .flat_map(|op| op.params.iter().map(|p| &p.declared_type)),
        )
    }

    /// Classifiers used as local variable types inside `id`'s operations.
    pub fn body_var_classifiers(&self, id: TypeId) -> Vec<TypeId> {
        let Some(classifier) = self.classifier(id) else {
            return Vec::new();
        };
        self.distinct_classifiers(
            classifier
                .operations
                .iter()
                .flat_map(|op| op.body_vars.iter().map(|v| &v.declared_type)),
        )
    }

    /// Classifiers called from `id`'s operations.
    pub fn call_targets(&self, id: TypeId) -> Vec<TypeId> {
        let Some(classifier) = self.classifier(id) else {
            return Vec::new();
        };
        self.distinct_classifiers(
            classifier
                .operations
                .iter()
                .flat_map(|op| op.statements.calls().map(|(_, target)| target)),
        )
    }

    fn distinct_classifiers<'a>(&self, refs: impl Iterator<Item = &'a TypeRef>) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        refs.filter_map(TypeRef::type_id)
            .filter_map(|id| self.defining_classifier(id))
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats {
            associations: self.associations.len(),
            modules: self.modules.len(),
            ..ModelStats::default()
        };
        for (_, entity) in self.types() {
            stats.types += 1;
            if let Some(classifier) = entity.as_classifier() {
                stats.classifiers += 1;
                if classifier.is_defined() {
                    stats.defined_classifiers += 1;
                }
                stats.operations += classifier.operations.len();
                stats.statements += classifier
                    .operations
                    .iter()
                    .map(|op| op.statements.len())
                    .sum::<usize>();
            }
        }
        stats
    }

    // ============================================================
    // Mutation (merge pass only)
    // ============================================================

    /// Place a new entity at `id` and index it by name.
    ///
    /// Returns the handle now registered for the entity's key; this differs
    /// from `id` only if the key was already taken, in which case nothing is
    /// stored.
    pub(crate) fn insert_type(&mut self, id: TypeId, entity: TypeEntity) -> TypeId {
        let key = normalize(&entity.name);
        let registered = self.store.insert_sorted(&key, id);
        if registered != id {
            return registered;
        }
        let idx = id.index();
        if idx >= self.types.len() {
            self.types.resize_with(idx + 1, || None);
        }
        self.types[idx] = Some(entity);
        id
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeEntity> {
        self.types.get_mut(id.index())?.as_mut()
    }

    /// Remove an entity from the arena and the name index.
    pub(crate) fn remove_type(&mut self, id: TypeId) -> Option<TypeEntity> {
        let entity = self.types.get_mut(id.index())?.take()?;
        let key = normalize(&entity.name);
        if self.store.find(&key) == Some(id) {
            self.store.remove(&key);
        }
        Some(entity)
    }

    pub(crate) fn intern_module(&mut self, path: &str) -> ModuleId {
        if let Some(idx) = self.modules.get_index_of(path) {
            return ModuleId::new(idx);
        }
        let (idx, _) = self.modules.insert_full(path.to_string());
        ModuleId::new(idx)
    }

    /// Add an edge unless the same child/parent pair already exists.
    pub(crate) fn add_association(&mut self, association: Association) -> bool {
        if !self
            .association_index
            .insert((association.child, association.parent))
        {
            return false;
        }
        self.associations.push(association);
        true
    }

    pub(crate) fn associations_mut(&mut self) -> &mut Vec<Association> {
        &mut self.associations
    }

    /// Re-derive the dedupe index after associations were rewritten in place.
    pub(crate) fn rebuild_association_index(&mut self) {
        self.association_index.clear();
        let mut kept = Vec::with_capacity(self.associations.len());
        for association in self.associations.drain(..) {
            if self
                .association_index
                .insert((association.child, association.parent))
            {
                kept.push(association);
            }
        }
        self.associations = kept;
    }

    /// Mutable access to every live classifier, for whole-graph rewrites.
    pub(crate) fn classifiers_mut(&mut self) -> impl Iterator<Item = (TypeId, &mut Classifier)> {
        self.types
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| {
                slot.as_mut()
                    .and_then(TypeEntity::as_classifier_mut)
                    .map(|c| (TypeId(idx as u32), c))
            })
    }
}
