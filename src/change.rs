//! Ontology change records.
//!
//! A [`ChangeRecord`] is the unit of edit history: one Add or Remove of a
//! single axiom against a single ontology document. Batches of records flow
//! from the project edit path into the revision store and out to every
//! registered index listener.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axiom::Axiom;
use crate::entity::Iri;

/// Identity of one ontology document within a project.
///
/// An ontology is identified by its IRI plus an optional version IRI; two
/// documents with the same ontology IRI but different version IRIs are
/// distinct keyspaces in every per-ontology index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OntologyId {
    pub iri: Iri,
    pub version: Option<Iri>,
}

impl OntologyId {
    pub fn new(iri: Iri) -> Self {
        Self { iri, version: None }
    }

    pub fn with_version(iri: Iri, version: Iri) -> Self {
        Self {
            iri,
            version: Some(version),
        }
    }
}

impl std::fmt::Display for OntologyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} @ {version}", self.iri),
            None => write!(f, "{}", self.iri),
        }
    }
}

/// Direction of a change: an axiom entering or leaving an ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeOp {
    Add,
    Remove,
}

impl std::fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeOp::Add => write!(f, "Add"),
            ChangeOp::Remove => write!(f, "Remove"),
        }
    }
}

/// One Add or Remove of an axiom against an ontology document.
///
/// The axiom is held by `Arc` so a record shares structure with the index
/// entries built from it instead of deep-copying the axiom tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub ontology: OntologyId,
    pub op: ChangeOp,
    pub axiom: Arc<Axiom>,
}

impl ChangeRecord {
    pub fn add(ontology: OntologyId, axiom: Axiom) -> Self {
        Self {
            ontology,
            op: ChangeOp::Add,
            axiom: Arc::new(axiom),
        }
    }

    pub fn remove(ontology: OntologyId, axiom: Axiom) -> Self {
        Self {
            ontology,
            op: ChangeOp::Remove,
            axiom: Arc::new(axiom),
        }
    }
}

impl std::fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) in {}", self.op, self.axiom, self.ontology)
    }
}

/// An ordered batch of change records, applied as one edit.
pub type ChangeBatch = Vec<ChangeRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    #[test]
    fn ontology_ids_distinguish_versions() {
        let plain = OntologyId::new(iri("onto"));
        let versioned = OntologyId::with_version(iri("onto"), iri("v2"));
        assert_ne!(plain, versioned);
        assert_ne!(
            versioned,
            OntologyId::with_version(iri("onto"), iri("v3"))
        );
    }

    #[test]
    fn add_and_remove_of_same_axiom_differ_only_in_op() {
        let ont = OntologyId::new(iri("onto"));
        let add = ChangeRecord::add(ont.clone(), Axiom::sub_class_of(iri("A"), iri("B")));
        let remove = ChangeRecord::remove(ont, Axiom::sub_class_of(iri("A"), iri("B")));
        assert_eq!(add.axiom, remove.axiom);
        assert_ne!(add.op, remove.op);
    }

    #[test]
    fn display_names_op_axiom_and_ontology() {
        let record = ChangeRecord::add(
            OntologyId::new(iri("onto")),
            Axiom::sub_class_of(iri("A"), iri("B")),
        );
        let text = record.to_string();
        assert!(text.starts_with("Add(SubClassOf("));
        assert!(text.contains("onto"));
    }
}
