//! Reverse index from IRIs to the axioms that mention them.

use std::sync::Arc;

use crate::axiom::Axiom;
use crate::change::{ChangeRecord, OntologyId};
use crate::entity::Iri;
use crate::index::{IndexResult, KeyedAxioms, OntologyChangeListener};

fn keys(axiom: &Axiom) -> Vec<Iri> {
    axiom.referenced_iris()
}

/// Per-ontology reverse index: IRI -> axioms mentioning it anywhere.
///
/// "Anywhere" includes IRIs nested inside annotations-on-annotations at any
/// depth; an axiom annotated with a reference to `X` is retrievable by `X`
/// even though `X` appears nowhere in the axiom's logical structure. This is
/// what makes usage lookups and hierarchy child-extraction complete.
pub struct AxiomsByIriReferenceIndex {
    store: KeyedAxioms<Iri>,
}

impl AxiomsByIriReferenceIndex {
    pub fn new() -> Self {
        Self {
            store: KeyedAxioms::new(),
        }
    }

    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        self.store.load(ontology, axioms, keys);
    }

    /// All axioms in one ontology that mention `iri` at any depth.
    pub fn referencing_axioms(&self, ontology: &OntologyId, iri: &Iri) -> Vec<Arc<Axiom>> {
        self.store.query(ontology, iri)
    }
}

impl Default for AxiomsByIriReferenceIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for AxiomsByIriReferenceIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        self.store.apply(changes, keys);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::{Annotation, AnnotationValue, Literal};

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    fn ont() -> OntologyId {
        OntologyId::new(iri("onto"))
    }

    #[test]
    fn logical_positions_are_indexed() {
        let index = AxiomsByIriReferenceIndex::new();
        index
            .apply_changes(&[ChangeRecord::add(
                ont(),
                Axiom::sub_class_of(iri("Dog"), iri("Animal")),
            )])
            .unwrap();
        assert_eq!(index.referencing_axioms(&ont(), &iri("Dog")).len(), 1);
        assert_eq!(index.referencing_axioms(&ont(), &iri("Animal")).len(), 1);
    }

    #[test]
    fn nested_annotation_iris_resolve_to_root_axiom() {
        let index = AxiomsByIriReferenceIndex::new();
        let deep = Annotation::new(iri("seeAlso"), AnnotationValue::Iri(iri("Target")));
        let axiom = Axiom::sub_class_of(iri("Dog"), iri("Animal")).with_annotation(
            Annotation::new(iri("note"), AnnotationValue::Literal(Literal::plain("x")))
                .with_annotation(deep),
        );
        index
            .apply_changes(&[ChangeRecord::add(ont(), axiom.clone())])
            .unwrap();
        let hits = index.referencing_axioms(&ont(), &iri("Target"));
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0], axiom);
    }

    #[test]
    fn remove_clears_every_key() {
        let index = AxiomsByIriReferenceIndex::new();
        let axiom = Axiom::sub_class_of(iri("Dog"), iri("Animal"));
        index
            .apply_changes(&[ChangeRecord::add(ont(), axiom.clone())])
            .unwrap();
        index
            .apply_changes(&[ChangeRecord::remove(ont(), axiom)])
            .unwrap();
        assert!(index.referencing_axioms(&ont(), &iri("Dog")).is_empty());
        assert!(index.referencing_axioms(&ont(), &iri("Animal")).is_empty());
    }
}
