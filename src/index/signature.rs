//! Entity-level signature indices.
//!
//! Unlike the axiom-set indices, these track entity mentions: an entity is
//! in an ontology's signature while at least one axiom mentions it, and
//! drops out exactly when the last mentioning axiom is removed. Each entity
//! keys the *set* of distinct axioms mentioning it, so duplicate Adds of the
//! same axiom are idempotent here just as they are in the authoritative
//! axiom sets, and a single Remove reverses them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::axiom::Axiom;
use crate::change::{ChangeOp, ChangeRecord, OntologyId};
use crate::entity::{Entity, EntityKind, Iri};
use crate::index::{IndexResult, OntologyChangeListener};

// ---------------------------------------------------------------------------
// Per-ontology signature
// ---------------------------------------------------------------------------

struct SignatureInner {
    loaded: HashSet<OntologyId>,
    /// Entity -> the distinct axioms mentioning it, per ontology. Keying
    /// off axioms (not a bare count) keeps duplicate Adds idempotent and a
    /// Remove symmetric with the set-based authoritative index.
    mentions: HashMap<OntologyId, HashMap<Entity, HashSet<Arc<Axiom>>>>,
}

/// The entity signature of each ontology document.
pub struct OntologySignatureIndex {
    inner: RwLock<SignatureInner>,
}

impl OntologySignatureIndex {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SignatureInner {
                loaded: HashSet::new(),
                mentions: HashMap::new(),
            }),
        }
    }

    fn distinct_entities(axiom: &Axiom) -> Vec<Entity> {
        let mut seen = HashSet::new();
        axiom
            .signature()
            .into_iter()
            .filter(|entity| seen.insert(entity.clone()))
            .collect()
    }

    /// Bootstrap one ontology document. Repeat loads are no-ops.
    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        let mut inner = self.inner.write().expect("signature index lock poisoned");
        if !inner.loaded.insert(ontology.clone()) {
            return;
        }
        let mentions = inner.mentions.entry(ontology.clone()).or_default();
        for axiom in axioms {
            for entity in Self::distinct_entities(axiom) {
                mentions
                    .entry(entity)
                    .or_default()
                    .insert(Arc::clone(axiom));
            }
        }
    }

    /// Whether `entity` is in the signature of one ontology.
    pub fn contains_entity(&self, ontology: &OntologyId, entity: &Entity) -> bool {
        let inner = self.inner.read().expect("signature index lock poisoned");
        inner
            .mentions
            .get(ontology)
            .and_then(|mentions| mentions.get(entity))
            .is_some_and(|axioms| !axioms.is_empty())
    }

    /// The distinct entities in one ontology's signature.
    pub fn signature(&self, ontology: &OntologyId) -> Vec<Entity> {
        let inner = self.inner.read().expect("signature index lock poisoned");
        inner
            .mentions
            .get(ontology)
            .map(|mentions| mentions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The entities of one ontology whose IRI is `iri` (possibly several
    /// kinds, under punning).
    pub fn entities_with_iri(&self, ontology: &OntologyId, iri: &Iri) -> Vec<Entity> {
        let inner = self.inner.read().expect("signature index lock poisoned");
        inner
            .mentions
            .get(ontology)
            .map(|mentions| {
                mentions
                    .keys()
                    .filter(|entity| &entity.iri == iri)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for OntologySignatureIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for OntologySignatureIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        let mut inner = self.inner.write().expect("signature index lock poisoned");
        for record in changes {
            let mentions = inner.mentions.entry(record.ontology.clone()).or_default();
            for entity in Self::distinct_entities(&record.axiom) {
                match record.op {
                    ChangeOp::Add => {
                        mentions
                            .entry(entity)
                            .or_default()
                            .insert(Arc::clone(&record.axiom));
                    }
                    ChangeOp::Remove => {
                        if let Some(axioms) = mentions.get_mut(&entity) {
                            axioms.remove(&record.axiom);
                            if axioms.is_empty() {
                                mentions.remove(&entity);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Project ontology registry
// ---------------------------------------------------------------------------

/// The ordered list of ontology documents in a project.
///
/// Registration order is preserved and is the order project-wide queries
/// visit documents in. The registry also listens for changes so that an edit
/// targeting a never-seen [`OntologyId`] registers it on the fly.
pub struct ProjectOntologiesIndex {
    ontologies: RwLock<Vec<OntologyId>>,
}

impl ProjectOntologiesIndex {
    pub fn new() -> Self {
        Self {
            ontologies: RwLock::new(Vec::new()),
        }
    }

    /// Register an ontology document. Re-registration is a no-op.
    pub fn register(&self, ontology: &OntologyId) {
        let mut ontologies = self
            .ontologies
            .write()
            .expect("ontology registry lock poisoned");
        if !ontologies.contains(ontology) {
            ontologies.push(ontology.clone());
        }
    }

    /// The registered ontology documents, in registration order.
    pub fn ontology_ids(&self) -> Vec<OntologyId> {
        self.ontologies
            .read()
            .expect("ontology registry lock poisoned")
            .clone()
    }
}

impl Default for ProjectOntologiesIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for ProjectOntologiesIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        for record in changes {
            self.register(&record.ontology);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Project-wide composites
// ---------------------------------------------------------------------------

/// Project-wide signature view over every registered ontology.
pub struct ProjectSignatureIndex {
    ontologies: Arc<ProjectOntologiesIndex>,
    signatures: Arc<OntologySignatureIndex>,
}

impl ProjectSignatureIndex {
    pub fn new(
        ontologies: Arc<ProjectOntologiesIndex>,
        signatures: Arc<OntologySignatureIndex>,
    ) -> Self {
        Self {
            ontologies,
            signatures,
        }
    }

    /// The concatenated signatures of every ontology, in registration order.
    /// An entity present in several documents appears once per document.
    pub fn signature(&self) -> Vec<Entity> {
        self.ontologies
            .ontology_ids()
            .iter()
            .flat_map(|ontology| self.signatures.signature(ontology))
            .collect()
    }

    /// The distinct entities across the whole project.
    pub fn signature_set(&self) -> HashSet<Entity> {
        self.signature().into_iter().collect()
    }

    /// The distinct entities of one kind across the whole project.
    pub fn signature_of_kind(&self, kind: EntityKind) -> Vec<Entity> {
        let mut seen = HashSet::new();
        self.signature()
            .into_iter()
            .filter(|entity| entity.kind == kind)
            .filter(|entity| seen.insert(entity.clone()))
            .collect()
    }

    /// Whether any registered ontology mentions `entity`.
    pub fn contains_entity(&self, entity: &Entity) -> bool {
        self.ontologies
            .ontology_ids()
            .iter()
            .any(|ontology| self.signatures.contains_entity(ontology, entity))
    }
}

/// Project-wide lookup of entities by IRI.
pub struct EntitiesInProjectSignatureByIriIndex {
    ontologies: Arc<ProjectOntologiesIndex>,
    signatures: Arc<OntologySignatureIndex>,
}

impl EntitiesInProjectSignatureByIriIndex {
    pub fn new(
        ontologies: Arc<ProjectOntologiesIndex>,
        signatures: Arc<OntologySignatureIndex>,
    ) -> Self {
        Self {
            ontologies,
            signatures,
        }
    }

    /// The distinct entities anywhere in the project whose IRI is `iri`.
    pub fn entities_with_iri(&self, iri: &Iri) -> Vec<Entity> {
        let mut seen = HashSet::new();
        self.ontologies
            .ontology_ids()
            .iter()
            .flat_map(|ontology| self.signatures.entities_with_iri(ontology, iri))
            .filter(|entity| seen.insert(entity.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::{AnnotationValue, Literal};

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    fn ont() -> OntologyId {
        OntologyId::new(iri("onto"))
    }

    #[test]
    fn entity_leaves_signature_with_last_mention() {
        let index = OntologySignatureIndex::new();
        let first = Axiom::sub_class_of(iri("Dog"), iri("Animal"));
        let second = Axiom::sub_class_of(iri("Dog"), iri("Pet"));
        index
            .apply_changes(&[
                ChangeRecord::add(ont(), first.clone()),
                ChangeRecord::add(ont(), second.clone()),
            ])
            .unwrap();
        let dog = Entity::class(iri("Dog"));
        index
            .apply_changes(&[ChangeRecord::remove(ont(), first)])
            .unwrap();
        assert!(index.contains_entity(&ont(), &dog));
        index
            .apply_changes(&[ChangeRecord::remove(ont(), second)])
            .unwrap();
        assert!(!index.contains_entity(&ont(), &dog));
    }

    #[test]
    fn duplicate_add_then_single_remove_clears_entity() {
        // The authoritative axiom set is a set, so a duplicate Add is a
        // no-op there; one Remove must therefore also empty the signature.
        let index = OntologySignatureIndex::new();
        let axiom = Axiom::sub_class_of(iri("A"), iri("B"));
        index
            .apply_changes(&[
                ChangeRecord::add(ont(), axiom.clone()),
                ChangeRecord::add(ont(), axiom.clone()),
            ])
            .unwrap();
        index
            .apply_changes(&[ChangeRecord::remove(ont(), axiom)])
            .unwrap();
        assert!(!index.contains_entity(&ont(), &Entity::class(iri("A"))));
        assert!(index.signature(&ont()).is_empty());
    }

    #[test]
    fn repeated_mention_in_one_axiom_counts_once() {
        let index = OntologySignatureIndex::new();
        let axiom = Axiom::sub_class_of(iri("A"), iri("A"));
        index
            .apply_changes(&[ChangeRecord::add(ont(), axiom.clone())])
            .unwrap();
        index
            .apply_changes(&[ChangeRecord::remove(ont(), axiom)])
            .unwrap();
        assert!(!index.contains_entity(&ont(), &Entity::class(iri("A"))));
    }

    #[test]
    fn punned_iri_yields_one_entity_per_kind() {
        let index = OntologySignatureIndex::new();
        index
            .apply_changes(&[
                ChangeRecord::add(ont(), Axiom::sub_class_of(iri("X"), iri("Y"))),
                ChangeRecord::add(
                    ont(),
                    Axiom::data_property_assertion(iri("p"), iri("X"), Literal::plain("1")),
                ),
            ])
            .unwrap();
        let entities = index.entities_with_iri(&ont(), &iri("X"));
        assert_eq!(entities.len(), 2);
        assert!(entities.contains(&Entity::class(iri("X"))));
        assert!(entities.contains(&Entity::named_individual(iri("X"))));
    }

    #[test]
    fn registry_preserves_order_and_dedupes() {
        let registry = ProjectOntologiesIndex::new();
        let a = OntologyId::new(iri("a"));
        let b = OntologyId::new(iri("b"));
        registry.register(&a);
        registry.register(&b);
        registry.register(&a);
        assert_eq!(registry.ontology_ids(), vec![a, b]);
    }

    #[test]
    fn registry_learns_ontologies_from_changes() {
        let registry = ProjectOntologiesIndex::new();
        registry
            .apply_changes(&[ChangeRecord::add(
                ont(),
                Axiom::sub_class_of(iri("A"), iri("B")),
            )])
            .unwrap();
        assert_eq!(registry.ontology_ids(), vec![ont()]);
    }

    #[test]
    fn project_signature_spans_ontologies() {
        let ontologies = Arc::new(ProjectOntologiesIndex::new());
        let signatures = Arc::new(OntologySignatureIndex::new());
        let other = OntologyId::new(iri("other"));
        ontologies.register(&ont());
        ontologies.register(&other);
        signatures
            .apply_changes(&[
                ChangeRecord::add(ont(), Axiom::sub_class_of(iri("A"), iri("B"))),
                ChangeRecord::add(
                    other.clone(),
                    Axiom::annotation_assertion(
                        iri("label"),
                        iri("A"),
                        AnnotationValue::Literal(Literal::plain("a")),
                    ),
                ),
            ])
            .unwrap();
        let project = ProjectSignatureIndex::new(Arc::clone(&ontologies), Arc::clone(&signatures));
        assert!(project.contains_entity(&Entity::class(iri("A"))));
        assert!(project.contains_entity(&Entity::annotation_property(iri("label"))));
        let classes = project.signature_of_kind(EntityKind::Class);
        assert_eq!(classes.len(), 2);

        let by_iri = EntitiesInProjectSignatureByIriIndex::new(ontologies, signatures);
        // Class mention in `ont` and no other kind anywhere: one distinct hit.
        assert_eq!(by_iri.entities_with_iri(&iri("A")).len(), 1);
    }
}
