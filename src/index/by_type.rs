//! Axioms grouped by their type discriminant.

use std::sync::Arc;

use crate::axiom::{Axiom, AxiomType};
use crate::change::{ChangeRecord, OntologyId};
use crate::index::{IndexResult, KeyedAxioms, OntologyChangeListener};

fn keys(axiom: &Axiom) -> Vec<AxiomType> {
    vec![axiom.axiom_type()]
}

/// Per-ontology buckets of axioms keyed by [`AxiomType`].
pub struct AxiomsByTypeIndex {
    store: KeyedAxioms<AxiomType>,
}

impl AxiomsByTypeIndex {
    pub fn new() -> Self {
        Self {
            store: KeyedAxioms::new(),
        }
    }

    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        self.store.load(ontology, axioms, keys);
    }

    /// All axioms of one type in one ontology.
    pub fn axioms_of_type(&self, ontology: &OntologyId, axiom_type: AxiomType) -> Vec<Arc<Axiom>> {
        self.store.query(ontology, &axiom_type)
    }
}

impl Default for AxiomsByTypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for AxiomsByTypeIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        self.store.apply(changes, keys);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, Iri};

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    #[test]
    fn buckets_are_per_type() {
        let index = AxiomsByTypeIndex::new();
        let ont = OntologyId::new(iri("onto"));
        index
            .apply_changes(&[
                ChangeRecord::add(ont.clone(), Axiom::sub_class_of(iri("A"), iri("B"))),
                ChangeRecord::add(ont.clone(), Axiom::declaration(Entity::class(iri("A")))),
            ])
            .unwrap();
        assert_eq!(index.axioms_of_type(&ont, AxiomType::SubClassOf).len(), 1);
        assert_eq!(index.axioms_of_type(&ont, AxiomType::Declaration).len(), 1);
        assert!(index
            .axioms_of_type(&ont, AxiomType::EquivalentClasses)
            .is_empty());
    }
}
