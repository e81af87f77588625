//! Incremental axiom indices.
//!
//! Every index answers queries from its own in-memory structures and stays
//! current by consuming the same [`ChangeRecord`] batches that the revision
//! store persists. Indices share two lifecycle entry points:
//!
//! - `load` bootstraps an index from a full ontology document, once per
//!   document (repeat loads of the same [`OntologyId`] are no-ops),
//! - [`OntologyChangeListener::apply_changes`] folds an edit batch in,
//!   incrementally and in batch order.
//!
//! # Architecture
//!
//! - [`KeyedAxioms`] is the shared multimap core: ontology -> key -> axiom set,
//!   parameterized over the key type and a key-extraction function.
//! - Concrete indices ([`axioms`], [`by_type`], [`by_reference`],
//!   [`by_subject`]) are thin shells over that core, each choosing its keys.
//! - [`signature`] holds the entity-level indices, which count references
//!   rather than store axiom sets.
//! - [`updater`] fans change batches out to every registered listener.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::axiom::Axiom;
use crate::change::{ChangeOp, ChangeRecord, OntologyId};
use crate::error::IndexError;

pub mod axioms;
pub mod by_reference;
pub mod by_subject;
pub mod by_type;
pub mod signature;
pub mod updater;

pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// A consumer of ontology change batches.
///
/// Listeners must tolerate being called with batches that are irrelevant to
/// them; extracting no keys from a record is the normal way to skip it.
pub trait OntologyChangeListener: Send + Sync {
    /// Fold a batch of changes into the index, in batch order.
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()>;
}

// ---------------------------------------------------------------------------
// Shared keyed-multimap core
// ---------------------------------------------------------------------------

struct KeyedAxiomsInner<K> {
    /// Ontology documents already bootstrapped via `load`.
    loaded: HashSet<OntologyId>,
    map: HashMap<OntologyId, HashMap<K, HashSet<Arc<Axiom>>>>,
}

/// Ontology-scoped multimap from keys to axiom sets.
///
/// This is the storage core behind every axiom-set index: each concrete
/// index supplies a key-extraction function and this type handles loading,
/// incremental maintenance, and querying. Axioms are shared by `Arc` so the
/// same axiom held under several keys costs one allocation.
pub(crate) struct KeyedAxioms<K> {
    inner: RwLock<KeyedAxiomsInner<K>>,
}

impl<K: Eq + std::hash::Hash + Clone> KeyedAxioms<K> {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(KeyedAxiomsInner {
                loaded: HashSet::new(),
                map: HashMap::new(),
            }),
        }
    }

    /// Bootstrap the index for one ontology document.
    ///
    /// A repeat load of an already-loaded document is a no-op, so callers can
    /// re-run project bootstrap without doubling index contents.
    pub(crate) fn load(
        &self,
        ontology: &OntologyId,
        axioms: &[Arc<Axiom>],
        keys_fn: impl Fn(&Axiom) -> Vec<K>,
    ) {
        let mut inner = self.inner.write().expect("keyed index lock poisoned");
        if !inner.loaded.insert(ontology.clone()) {
            return;
        }
        let by_key = inner.map.entry(ontology.clone()).or_default();
        for axiom in axioms {
            for key in keys_fn(axiom) {
                by_key.entry(key).or_default().insert(Arc::clone(axiom));
            }
        }
    }

    /// Fold a change batch in. Records whose key extraction yields nothing
    /// are skipped; empty key entries are dropped on removal.
    pub(crate) fn apply(
        &self,
        changes: &[ChangeRecord],
        keys_fn: impl Fn(&Axiom) -> Vec<K>,
    ) {
        let mut inner = self.inner.write().expect("keyed index lock poisoned");
        for record in changes {
            let mut keys = keys_fn(&record.axiom);
            keys.dedup();
            if keys.is_empty() {
                continue;
            }
            let by_key = inner.map.entry(record.ontology.clone()).or_default();
            match record.op {
                ChangeOp::Add => {
                    for key in keys {
                        by_key
                            .entry(key)
                            .or_default()
                            .insert(Arc::clone(&record.axiom));
                    }
                }
                ChangeOp::Remove => {
                    for key in keys {
                        if let Some(set) = by_key.get_mut(&key) {
                            set.remove(&record.axiom);
                            if set.is_empty() {
                                by_key.remove(&key);
                            }
                        }
                    }
                }
            }
        }
    }

    /// All axioms stored under a key in one ontology.
    pub(crate) fn query(&self, ontology: &OntologyId, key: &K) -> Vec<Arc<Axiom>> {
        let inner = self.inner.read().expect("keyed index lock poisoned");
        inner
            .map
            .get(ontology)
            .and_then(|by_key| by_key.get(key))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether an axiom is stored under a key in one ontology.
    pub(crate) fn contains(&self, ontology: &OntologyId, key: &K, axiom: &Axiom) -> bool {
        let inner = self.inner.read().expect("keyed index lock poisoned");
        inner
            .map
            .get(ontology)
            .and_then(|by_key| by_key.get(key))
            .is_some_and(|set| set.contains(axiom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Iri;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    fn ont() -> OntologyId {
        OntologyId::new(iri("onto"))
    }

    fn sub_class_keys(axiom: &Axiom) -> Vec<Iri> {
        match axiom {
            Axiom::SubClassOf { sub_class, .. } => vec![sub_class.clone()],
            _ => Vec::new(),
        }
    }

    #[test]
    fn load_is_idempotent_per_ontology() {
        let index = KeyedAxioms::new();
        let axioms = vec![Arc::new(Axiom::sub_class_of(iri("A"), iri("B")))];
        index.load(&ont(), &axioms, sub_class_keys);
        index.load(&ont(), &axioms, sub_class_keys);
        assert_eq!(index.query(&ont(), &iri("A")).len(), 1);
    }

    #[test]
    fn apply_add_then_remove_restores_empty() {
        let index = KeyedAxioms::new();
        let axiom = Axiom::sub_class_of(iri("A"), iri("B"));
        index.apply(
            &[ChangeRecord::add(ont(), axiom.clone())],
            sub_class_keys,
        );
        assert_eq!(index.query(&ont(), &iri("A")).len(), 1);
        index.apply(&[ChangeRecord::remove(ont(), axiom)], sub_class_keys);
        assert!(index.query(&ont(), &iri("A")).is_empty());
    }

    #[test]
    fn irrelevant_records_are_skipped() {
        let index = KeyedAxioms::new();
        index.apply(
            &[ChangeRecord::add(
                ont(),
                Axiom::declaration(crate::entity::Entity::class(iri("A"))),
            )],
            sub_class_keys,
        );
        assert!(index.query(&ont(), &iri("A")).is_empty());
    }

    #[test]
    fn ontologies_are_independent_keyspaces() {
        let index = KeyedAxioms::new();
        let other = OntologyId::new(iri("other"));
        index.apply(
            &[ChangeRecord::add(
                ont(),
                Axiom::sub_class_of(iri("A"), iri("B")),
            )],
            sub_class_keys,
        );
        assert!(index.query(&other, &iri("A")).is_empty());
    }
}
