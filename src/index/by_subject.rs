//! Subject-keyed indices over specific axiom shapes.
//!
//! These are the lookups the hierarchy engine and entity views lean on:
//! `SubClassOf` by subclass, `EquivalentClasses` by any member, and the two
//! assertion indices by their subject IRI.

use std::sync::Arc;

use crate::axiom::Axiom;
use crate::change::{ChangeRecord, OntologyId};
use crate::entity::Iri;
use crate::index::{IndexResult, KeyedAxioms, OntologyChangeListener};

// ---------------------------------------------------------------------------
// SubClassOf by subclass
// ---------------------------------------------------------------------------

fn sub_class_keys(axiom: &Axiom) -> Vec<Iri> {
    match axiom {
        Axiom::SubClassOf { sub_class, .. } => vec![sub_class.clone()],
        _ => Vec::new(),
    }
}

/// `SubClassOf` axioms keyed by their subclass.
pub struct SubClassOfBySubClassIndex {
    store: KeyedAxioms<Iri>,
}

impl SubClassOfBySubClassIndex {
    pub fn new() -> Self {
        Self {
            store: KeyedAxioms::new(),
        }
    }

    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        self.store.load(ontology, axioms, sub_class_keys);
    }

    /// All `SubClassOf` axioms in one ontology whose subclass is `class`.
    pub fn sub_class_of_axioms(&self, ontology: &OntologyId, class: &Iri) -> Vec<Arc<Axiom>> {
        self.store.query(ontology, class)
    }
}

impl Default for SubClassOfBySubClassIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for SubClassOfBySubClassIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        self.store.apply(changes, sub_class_keys);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EquivalentClasses by member
// ---------------------------------------------------------------------------

fn equivalent_keys(axiom: &Axiom) -> Vec<Iri> {
    match axiom {
        Axiom::EquivalentClasses { classes, .. } => classes.clone(),
        _ => Vec::new(),
    }
}

/// `EquivalentClasses` axioms keyed by every member class, so the axiom is
/// retrievable from any participant.
pub struct EquivalentClassesIndex {
    store: KeyedAxioms<Iri>,
}

impl EquivalentClassesIndex {
    pub fn new() -> Self {
        Self {
            store: KeyedAxioms::new(),
        }
    }

    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        self.store.load(ontology, axioms, equivalent_keys);
    }

    /// All `EquivalentClasses` axioms in one ontology that include `class`.
    pub fn equivalent_classes_axioms(
        &self,
        ontology: &OntologyId,
        class: &Iri,
    ) -> Vec<Arc<Axiom>> {
        self.store.query(ontology, class)
    }
}

impl Default for EquivalentClassesIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for EquivalentClassesIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        self.store.apply(changes, equivalent_keys);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AnnotationAssertion by subject
// ---------------------------------------------------------------------------

fn annotation_subject_keys(axiom: &Axiom) -> Vec<Iri> {
    match axiom {
        Axiom::AnnotationAssertion { subject, .. } => vec![subject.clone()],
        _ => Vec::new(),
    }
}

/// `AnnotationAssertion` axioms keyed by their subject IRI.
pub struct AnnotationAssertionsBySubjectIndex {
    store: KeyedAxioms<Iri>,
}

impl AnnotationAssertionsBySubjectIndex {
    pub fn new() -> Self {
        Self {
            store: KeyedAxioms::new(),
        }
    }

    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        self.store.load(ontology, axioms, annotation_subject_keys);
    }

    /// All annotation assertions in one ontology about `subject`.
    pub fn assertions(&self, ontology: &OntologyId, subject: &Iri) -> Vec<Arc<Axiom>> {
        self.store.query(ontology, subject)
    }
}

impl Default for AnnotationAssertionsBySubjectIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for AnnotationAssertionsBySubjectIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        self.store.apply(changes, annotation_subject_keys);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DataPropertyAssertion by subject
// ---------------------------------------------------------------------------

fn data_subject_keys(axiom: &Axiom) -> Vec<Iri> {
    match axiom {
        Axiom::DataPropertyAssertion { subject, .. } => vec![subject.clone()],
        _ => Vec::new(),
    }
}

/// `DataPropertyAssertion` axioms keyed by their subject individual.
pub struct DataPropertyAssertionsBySubjectIndex {
    store: KeyedAxioms<Iri>,
}

impl DataPropertyAssertionsBySubjectIndex {
    pub fn new() -> Self {
        Self {
            store: KeyedAxioms::new(),
        }
    }

    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        self.store.load(ontology, axioms, data_subject_keys);
    }

    /// All data property assertions in one ontology about `subject`.
    pub fn assertions(&self, ontology: &OntologyId, subject: &Iri) -> Vec<Arc<Axiom>> {
        self.store.query(ontology, subject)
    }
}

impl Default for DataPropertyAssertionsBySubjectIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for DataPropertyAssertionsBySubjectIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        self.store.apply(changes, data_subject_keys);
        Ok(())
    }
}
