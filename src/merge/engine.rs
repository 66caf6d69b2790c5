//! The cross-file merge.
//!
//! Files are merged one at a time, in two passes:
//!
//! 1. **Identity.** Every local type is looked up by its normalized key. A
//!    hit folds the local id onto the existing handle; a miss allocates a
//!    fresh handle from the session and registers a shell (a DataType, or an
//!    empty classifier).
//! 2. **Content.** Every reference and module handle of the file is
//!    rewritten through the [`IdRemap`], then class content is folded into
//!    its target following the member rules in `policy`. A DataType
//!    target that receives class content is upgraded in place; its handle
//!    does not change.
//!
//! Generalizations come last; both ends are upgraded to classifiers if they
//! were DataTypes.
//!
//! Validation happens in [`LocalGraph::build`] before any of this, so a
//! failing file never leaves partial state behind.

use tracing::{debug, info, trace, warn};

use super::config::{IntegrityCheck, MergeConfig};
use super::policy;
use super::report::{FileFailure, FileSummary, MergeReport, MergeWarning};
use super::session::MergeSession;
use crate::base::{ModuleId, TypeId};
use crate::error::{ModelError, ModelResult};
use crate::integrity::{self, ReferenceIntegrityChecker};
use crate::loader::{FileRecords, IdRemap, LocalGraph, ResultFormat};
use crate::model::{Association, Classifier, ModelGraph, TypeEntity, TypeKind};

/// Folds per-file results into one [`ModelGraph`].
#[derive(Debug)]
pub struct MergeEngine {
    graph: ModelGraph,
    session: MergeSession,
    config: MergeConfig,
    report: MergeReport,
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::with_config(MergeConfig::default())
    }

    pub fn with_config(config: MergeConfig) -> Self {
        Self {
            graph: ModelGraph::new(),
            session: MergeSession::new(),
            config,
            report: MergeReport::default(),
        }
    }

    pub fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    pub fn session(&self) -> &MergeSession {
        &self.session
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    // ============================================================
    // Merging
    // ============================================================

    /// Validate and merge one record set.
    pub fn merge_records(&mut self, file: &str, records: FileRecords) -> ModelResult<FileSummary> {
        let loaded = LocalGraph::build(file, records);
        self.merge_loaded(file, loaded)
    }

    /// Decode, validate and merge one file's bytes.
    pub fn merge_bytes(
        &mut self,
        file: &str,
        input: &[u8],
        format: &dyn ResultFormat,
    ) -> ModelResult<FileSummary> {
        let loaded = LocalGraph::decode(file, input, format);
        self.merge_loaded(file, loaded)
    }

    /// Merge the outcome of loading one file.
    ///
    /// A load error is recorded in the report and returned; the model is
    /// unchanged and later files can still be merged. Only a
    /// [fatal](ModelError::is_fatal) error means the model is unusable.
    pub fn merge_loaded(
        &mut self,
        file: &str,
        loaded: ModelResult<LocalGraph>,
    ) -> ModelResult<FileSummary> {
        match loaded {
            Ok(local) => self.merge_local(local),
            Err(error) => {
                warn!("[MERGE] dropping {}: {}", file, error);
                self.report.failures.push(FileFailure {
                    file: file.to_string(),
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Merge a sequence of loaded files in order, skipping failed ones.
    ///
    /// Stops at the first fatal error.
    pub fn merge_all<I>(&mut self, inputs: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = (String, ModelResult<LocalGraph>)>,
    {
        for (file, loaded) in inputs {
            if let Err(error) = self.merge_loaded(&file, loaded) {
                if error.is_fatal() {
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    /// Merge one validated file.
    ///
    /// Fails only with a fatal integrity violation.
    pub fn merge_local(&mut self, local: LocalGraph) -> ModelResult<FileSummary> {
        let LocalGraph {
            file,
            modules,
            types,
            generalizations,
        } = local;
        let context = format!("merge of {file}");
        let mut remap = IdRemap::new(self.session.next_id());
        let mut summary = FileSummary::new(&file, remap.offset());

        for (local_module, path) in &modules {
            remap.bind_module(*local_module, self.graph.intern_module(path));
        }

        // Pass 1: identity.
        for ty in &types {
            if let Some(existing) = self.graph.find_key(&ty.key) {
                trace!("[MERGE] {}: '{}' folds onto {}", file, ty.name, existing);
                remap.fold(ty.local, existing);
                continue;
            }
            let id = self.session.allocate();
            let shell = match ty.kind {
                TypeKind::DataType => TypeEntity::data_type(ty.name.clone()),
                TypeKind::Class(_) => TypeEntity::class(ty.name.clone(), Classifier::default()),
            };
            let registered = self.graph.insert_type(id, shell);
            if registered != id {
                return Err(ModelError::integrity(
                    &context,
                    ty.name.as_str(),
                    format!("key '{}' was registered twice", ty.key),
                ));
            }
            trace!("[MERGE] {}: '{}' promoted to {}", file, ty.name, id);
            remap.promote(ty.local, id);
        }
        summary.promoted = remap.promoted();
        summary.folded = remap.folded();

        // Pass 2: content.
        for ty in types {
            let target = remap.get(ty.local).ok_or_else(|| {
                ModelError::integrity(&context, ty.name.as_str(), "local type has no placement")
            })?;
            let TypeKind::Class(mut incoming) = ty.kind else {
                continue;
            };
            remap
                .rewrite_classifier(&mut incoming)
                .map_err(|message| ModelError::integrity(&context, ty.name.as_str(), message))?;
            self.merge_classifier(&file, target, incoming, &mut summary, &context)?;
        }

        for generalization in generalizations {
            let (Some(child), Some(parent)) =
                (remap.get(generalization.child), remap.get(generalization.parent))
            else {
                return Err(ModelError::integrity(
                    &context,
                    "generalization",
                    "end has no placement",
                ));
            };
            self.ensure_classifier(child, &mut summary, &context)?;
            self.ensure_classifier(parent, &mut summary, &context)?;
            if self.graph.add_association(Association {
                child,
                parent,
                visibility: generalization.visibility,
            }) {
                summary.associations_added += 1;
            }
        }

        self.session.file_done();
        if self.config.integrity_check == IntegrityCheck::EachFile {
            ReferenceIntegrityChecker::new(&self.graph).verify(&context)?;
        }

        debug!(
            "[MERGE] {}: offset {}, {} promoted, {} folded, {} upgraded, +{} attribute(s), +{} operation(s), {} replaced, +{} association(s)",
            file,
            summary.offset,
            summary.promoted,
            summary.folded,
            summary.upgraded,
            summary.attributes_added,
            summary.operations_added,
            summary.operations_replaced,
            summary.associations_added
        );
        self.report.files.push(summary.clone());
        Ok(summary)
    }

    fn merge_classifier(
        &mut self,
        file: &str,
        target: TypeId,
        incoming: Classifier,
        summary: &mut FileSummary,
        context: &str,
    ) -> ModelResult<()> {
        let Some(entity) = self.graph.get_mut(target) else {
            return Err(ModelError::integrity(
                context,
                target.to_string(),
                "merge target is not live",
            ));
        };
        let was_data_type = !entity.is_classifier();
        let name = entity.name.clone();
        let existing = entity.upgrade();
        if was_data_type {
            trace!("[MERGE] {}: upgraded '{}' ({}) to a classifier", file, name, target);
            summary.upgraded += 1;
        }

        let outcome = policy::merge_classifier(existing, incoming, summary);
        if let Some((kept, discarded)) = outcome.ambiguous_definition() {
            let warning = MergeWarning::AmbiguousClassifier {
                file: file.to_string(),
                name: name.to_string(),
                kept_module: self.module_label(kept),
                discarded_module: self.module_label(discarded),
                members: outcome.conflicting_members(),
            };
            self.warn(warning, summary);
        }
        for conflict in outcome.operation_conflicts {
            let warning = MergeWarning::AmbiguousOperation {
                file: file.to_string(),
                classifier: name.to_string(),
                operation: conflict.name.to_string(),
                kept_module: self.module_label(conflict.kept),
                discarded_module: self.module_label(conflict.discarded),
            };
            self.warn(warning, summary);
        }
        Ok(())
    }

    fn ensure_classifier(
        &mut self,
        id: TypeId,
        summary: &mut FileSummary,
        context: &str,
    ) -> ModelResult<()> {
        let Some(entity) = self.graph.get_mut(id) else {
            return Err(ModelError::integrity(
                context,
                id.to_string(),
                "association end is not live",
            ));
        };
        if !entity.is_classifier() {
            entity.upgrade();
            summary.upgraded += 1;
            trace!("[MERGE] upgraded '{}' ({}) for a generalization", entity.name, id);
        }
        Ok(())
    }

    fn module_label(&self, module: ModuleId) -> String {
        self.graph
            .module_path(module)
            .map_or_else(|| format!("module {}", module.0), str::to_string)
    }

    fn warn(&mut self, warning: MergeWarning, summary: &mut FileSummary) {
        warn!("[MERGE] {}", warning);
        summary.warnings += 1;
        self.report.warnings.push(warning);
    }

    // ============================================================
    // Checked edits
    // ============================================================

    /// Run every model invariant check now.
    pub fn verify(&self) -> ModelResult<()> {
        ReferenceIntegrityChecker::new(&self.graph).verify("explicit check")
    }

    /// Redirect every reference from `old` to `new` and erase `old`.
    pub fn replace_type(&mut self, old: TypeId, new: TypeId) -> ModelResult<TypeEntity> {
        let entity = integrity::replace_type(&mut self.graph, old, new)?;
        self.report.erased += 1;
        Ok(entity)
    }

    /// Erase an entity nothing references.
    pub fn erase_type(&mut self, id: TypeId) -> ModelResult<TypeEntity> {
        let entity = integrity::erase_type(&mut self.graph, id)?;
        self.report.erased += 1;
        Ok(entity)
    }

    /// Erase every entity unreachable from the defined model.
    pub fn collect_garbage(&mut self) -> usize {
        let erased = integrity::collect_garbage(&mut self.graph);
        self.report.erased += erased;
        erased
    }

    /// Finish the run: collect garbage and check invariants per the config.
    pub fn finish(mut self) -> ModelResult<(ModelGraph, MergeReport)> {
        if self.config.collect_garbage {
            self.collect_garbage();
        }
        if self.config.integrity_check != IntegrityCheck::Never {
            ReferenceIntegrityChecker::new(&self.graph).verify("final merge")?;
        }

        let stats = self.graph.stats();
        info!(
            "[MERGE] {} file(s) merged, {} dropped, {} warning(s): {} type(s), {} classifier(s) ({} defined), {} association(s)",
            self.report.merged_files(),
            self.report.failed_files(),
            self.report.warnings.len(),
            stats.types,
            stats.classifiers,
            stats.defined_classifiers,
            stats.associations
        );
        Ok((self.graph, self.report))
    }
}
