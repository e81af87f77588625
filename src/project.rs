//! The project facade: one handle wiring indices, hierarchy, history, and
//! tags together.
//!
//! # Architecture
//!
//! - [`Project::new`] builds every index once, shares them by `Arc`, and
//!   registers them with the [`IndexUpdater`] in a fixed order with the
//!   hierarchy last, so the hierarchy reads already-updated indices while
//!   reacting to a batch.
//! - [`Project::apply_edit`] is the single write path: under the edit lock
//!   the batch is appended durably to the revision store first and only then
//!   propagated to the indices. A storage failure touches nothing.
//! - Reads go straight to the individual indices and never block edits for
//!   long; every query answers from in-memory structures.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::axiom::Axiom;
use crate::change::{ChangeBatch, OntologyId};
use crate::diff::{ProjectChange, ProjectChangesManager};
use crate::entity::Iri;
use crate::error::{ModelError, ProjectError, SeshatResult};
use crate::hierarchy::ClassHierarchy;
use crate::index::axioms::OntologyAxiomsIndex;
use crate::index::by_reference::AxiomsByIriReferenceIndex;
use crate::index::by_subject::{
    AnnotationAssertionsBySubjectIndex, DataPropertyAssertionsBySubjectIndex,
    EquivalentClassesIndex, SubClassOfBySubClassIndex,
};
use crate::index::by_type::AxiomsByTypeIndex;
use crate::index::signature::{
    EntitiesInProjectSignatureByIriIndex, OntologySignatureIndex, ProjectOntologiesIndex,
    ProjectSignatureIndex,
};
use crate::index::updater::IndexUpdater;
use crate::page::{Page, PageRequest};
use crate::revision::{Revision, RevisionNumber, RevisionStore, UserId};
use crate::tag::TagStore;

/// Unique identity of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// A freshly generated random id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the canonical hyphenated form.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|source| ModelError::MalformedUuid {
                value: value.to_string(),
                source,
            })
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for opening a project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub project_id: ProjectId,
    /// Where revisions and tags are persisted. `None` keeps everything in
    /// memory.
    pub data_dir: Option<PathBuf>,
    /// The designated root of the class hierarchy.
    pub root_class: Iri,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_id: ProjectId::fresh(),
            data_dir: None,
            root_class: Iri::owl_thing(),
        }
    }
}

/// One open project: indices, hierarchy, history, and tags behind a single
/// handle. Cheap to share; all subsystems are `Arc`ed internally.
pub struct Project {
    project_id: ProjectId,
    ontologies: Arc<ProjectOntologiesIndex>,
    axioms: Arc<OntologyAxiomsIndex>,
    by_type: Arc<AxiomsByTypeIndex>,
    by_reference: Arc<AxiomsByIriReferenceIndex>,
    sub_class_of: Arc<SubClassOfBySubClassIndex>,
    equivalent_classes: Arc<EquivalentClassesIndex>,
    annotation_assertions: Arc<AnnotationAssertionsBySubjectIndex>,
    data_property_assertions: Arc<DataPropertyAssertionsBySubjectIndex>,
    signatures: Arc<OntologySignatureIndex>,
    project_signature: Arc<ProjectSignatureIndex>,
    entities_by_iri: Arc<EntitiesInProjectSignatureByIriIndex>,
    hierarchy: Arc<ClassHierarchy>,
    updater: IndexUpdater,
    revisions: Arc<RevisionStore>,
    changes: ProjectChangesManager,
    tags: TagStore,
    edit_lock: Mutex<()>,
}

impl Project {
    /// Open a project, building and wiring every subsystem.
    pub fn new(config: ProjectConfig) -> SeshatResult<Self> {
        let ontologies = Arc::new(ProjectOntologiesIndex::new());
        let axioms = Arc::new(OntologyAxiomsIndex::new());
        let by_type = Arc::new(AxiomsByTypeIndex::new());
        let by_reference = Arc::new(AxiomsByIriReferenceIndex::new());
        let sub_class_of = Arc::new(SubClassOfBySubClassIndex::new());
        let equivalent_classes = Arc::new(EquivalentClassesIndex::new());
        let annotation_assertions = Arc::new(AnnotationAssertionsBySubjectIndex::new());
        let data_property_assertions = Arc::new(DataPropertyAssertionsBySubjectIndex::new());
        let signatures = Arc::new(OntologySignatureIndex::new());
        let project_signature = Arc::new(ProjectSignatureIndex::new(
            Arc::clone(&ontologies),
            Arc::clone(&signatures),
        ));
        let entities_by_iri = Arc::new(EntitiesInProjectSignatureByIriIndex::new(
            Arc::clone(&ontologies),
            Arc::clone(&signatures),
        ));
        let hierarchy = Arc::new(ClassHierarchy::new(
            config.root_class,
            Arc::clone(&ontologies),
            Arc::clone(&sub_class_of),
            Arc::clone(&equivalent_classes),
            Arc::clone(&project_signature),
            Arc::clone(&by_reference),
            Arc::clone(&entities_by_iri),
        ));

        // Fixed propagation order. The hierarchy comes last so its change
        // handling sees every other index already updated.
        let updater = IndexUpdater::new();
        updater.register("ontologies", Arc::clone(&ontologies) as _);
        updater.register("axioms", Arc::clone(&axioms) as _);
        updater.register("by-type", Arc::clone(&by_type) as _);
        updater.register("by-reference", Arc::clone(&by_reference) as _);
        updater.register("sub-class-of", Arc::clone(&sub_class_of) as _);
        updater.register("equivalent-classes", Arc::clone(&equivalent_classes) as _);
        updater.register(
            "annotation-assertions",
            Arc::clone(&annotation_assertions) as _,
        );
        updater.register(
            "data-property-assertions",
            Arc::clone(&data_property_assertions) as _,
        );
        updater.register("signatures", Arc::clone(&signatures) as _);
        updater.register("hierarchy", Arc::clone(&hierarchy) as _);

        let (revisions, tags) = match &config.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|_| ProjectError::DataDir {
                    path: dir.display().to_string(),
                })?;
                (RevisionStore::open(dir)?, TagStore::open(dir)?)
            }
            None => (RevisionStore::in_memory(), TagStore::in_memory()),
        };
        let revisions = Arc::new(revisions);
        let changes = ProjectChangesManager::new(Arc::clone(&revisions));

        Ok(Self {
            project_id: config.project_id,
            ontologies,
            axioms,
            by_type,
            by_reference,
            sub_class_of,
            equivalent_classes,
            annotation_assertions,
            data_property_assertions,
            signatures,
            project_signature,
            entities_by_iri,
            hierarchy,
            updater,
            revisions,
            changes,
            tags,
            edit_lock: Mutex::new(()),
        })
    }

    /// Bootstrap one ontology document into every index, then refresh the
    /// implicit hierarchy roots. Loading the same document twice is a no-op
    /// per index.
    pub fn load_document(&self, ontology: OntologyId, axioms: Vec<Axiom>) {
        let shared: Vec<Arc<Axiom>> = axioms.into_iter().map(Arc::new).collect();
        self.ontologies.register(&ontology);
        self.axioms.load(&ontology, &shared);
        self.by_type.load(&ontology, &shared);
        self.by_reference.load(&ontology, &shared);
        self.sub_class_of.load(&ontology, &shared);
        self.equivalent_classes.load(&ontology, &shared);
        self.annotation_assertions.load(&ontology, &shared);
        self.data_property_assertions.load(&ontology, &shared);
        self.signatures.load(&ontology, &shared);
        self.hierarchy.rebuild_implicit_roots();
    }

    /// Apply one edit: append it durably to the history, then propagate it
    /// to the indices. Returns the new revision. On a storage failure the
    /// error is returned and no index sees the batch.
    pub fn apply_edit(
        &self,
        author: UserId,
        comment: impl Into<String>,
        changes: ChangeBatch,
    ) -> SeshatResult<Revision> {
        let _guard = self.edit_lock.lock().expect("project edit lock poisoned");
        let revision = self.revisions.add_revision(author, changes, comment)?;
        self.updater.propagate(&revision.changes);
        Ok(revision)
    }

    /// Paginated change history, newest first.
    pub fn project_changes(
        &self,
        after: Option<RevisionNumber>,
        request: &PageRequest,
    ) -> Page<ProjectChange> {
        self.changes.project_changes(after, request)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    pub fn revisions(&self) -> &RevisionStore {
        &self.revisions
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn ontologies(&self) -> &ProjectOntologiesIndex {
        &self.ontologies
    }

    pub fn axioms(&self) -> &OntologyAxiomsIndex {
        &self.axioms
    }

    pub fn axioms_by_type(&self) -> &AxiomsByTypeIndex {
        &self.by_type
    }

    pub fn axioms_by_reference(&self) -> &AxiomsByIriReferenceIndex {
        &self.by_reference
    }

    pub fn annotation_assertions(&self) -> &AnnotationAssertionsBySubjectIndex {
        &self.annotation_assertions
    }

    pub fn data_property_assertions(&self) -> &DataPropertyAssertionsBySubjectIndex {
        &self.data_property_assertions
    }

    pub fn signature(&self) -> &ProjectSignatureIndex {
        &self.project_signature
    }

    pub fn entities_by_iri(&self) -> &EntitiesInProjectSignatureByIriIndex {
        &self.entities_by_iri
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("project_id", &self.project_id)
            .field("ontologies", &self.ontologies.ontology_ids().len())
            .field("head", &self.revisions.head())
            .finish()
    }
}
