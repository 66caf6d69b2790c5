//! Translation of file-local ids into global handles.

use rustc_hash::FxHashMap;

use crate::base::{LocalId, ModuleId, TypeId};
use crate::model::{Classifier, TypeRef, TypeTarget};

/// Where one local id ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A fresh entity was created for it.
    Promoted(TypeId),
    /// It matched an entity already in the model.
    Folded(TypeId),
}

impl Placement {
    pub fn id(self) -> TypeId {
        match self {
            Self::Promoted(id) | Self::Folded(id) => id,
        }
    }
}

/// Per-file `LocalId -> TypeId` and local module id -> [`ModuleId`] maps.
///
/// `offset` is the first global id that was free when the file's merge
/// started; every promoted entity of the file gets an id at or above it.
#[derive(Debug, Clone)]
pub struct IdRemap {
    offset: TypeId,
    types: FxHashMap<LocalId, Placement>,
    modules: FxHashMap<u32, ModuleId>,
}

impl IdRemap {
    pub fn new(offset: TypeId) -> Self {
        Self {
            offset,
            types: FxHashMap::default(),
            modules: FxHashMap::default(),
        }
    }

    pub fn offset(&self) -> TypeId {
        self.offset
    }

    pub(crate) fn promote(&mut self, local: LocalId, id: TypeId) {
        self.types.insert(local, Placement::Promoted(id));
    }

    pub(crate) fn fold(&mut self, local: LocalId, id: TypeId) {
        self.types.insert(local, Placement::Folded(id));
    }

    pub(crate) fn bind_module(&mut self, local: u32, id: ModuleId) {
        self.modules.insert(local, id);
    }

    pub fn placement(&self, local: LocalId) -> Option<Placement> {
        self.types.get(&local).copied()
    }

    pub fn get(&self, local: LocalId) -> Option<TypeId> {
        self.placement(local).map(Placement::id)
    }

    pub fn module(&self, local: ModuleId) -> Option<ModuleId> {
        self.modules.get(&local.0).copied()
    }

    /// Resolve one pending reference in place.
    ///
    /// Returns the offending local id if it has no mapping.
    pub fn resolve(&self, r: &mut TypeRef) -> Result<(), LocalId> {
        if let TypeTarget::Pending(local) = r.target {
            let id = self.get(local).ok_or(local)?;
            r.target = TypeTarget::Resolved(id);
        }
        Ok(())
    }

    /// Resolve every reference and module handle of a file-local classifier.
    pub(crate) fn rewrite_classifier(&self, classifier: &mut Classifier) -> Result<(), String> {
        let mut missing = None;
        classifier.for_each_ref_mut(|_, r| {
            if missing.is_none() {
                if let Err(local) = self.resolve(r) {
                    missing = Some(local);
                }
            }
        });
        if let Some(local) = missing {
            return Err(format!("local type id {local} has no global mapping"));
        }

        classifier.module = self.rewrite_module(classifier.module)?;
        for op in &mut classifier.operations {
            op.module = self.rewrite_module(op.module)?;
        }
        Ok(())
    }

    fn rewrite_module(&self, module: Option<ModuleId>) -> Result<Option<ModuleId>, String> {
        match module {
            None => Ok(None),
            Some(local) => self
                .module(local)
                .map(Some)
                .ok_or_else(|| format!("local module id {} has no global mapping", local.0)),
        }
    }

    pub fn promoted(&self) -> usize {
        self.types
            .values()
            .filter(|p| matches!(p, Placement::Promoted(_)))
            .count()
    }

    pub fn folded(&self) -> usize {
        self.types
            .values()
            .filter(|p| matches!(p, Placement::Folded(_)))
            .count()
    }
}
