//! The authoritative per-ontology axiom sets.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::axiom::Axiom;
use crate::change::{ChangeOp, ChangeRecord, OntologyId};
use crate::index::{IndexResult, OntologyChangeListener};

struct Inner {
    loaded: HashSet<OntologyId>,
    axioms: HashMap<OntologyId, HashSet<Arc<Axiom>>>,
}

/// The full axiom set of each ontology document.
///
/// This is the ground truth the other indices are projections of: membership
/// checks and whole-document enumeration both come from here.
pub struct OntologyAxiomsIndex {
    inner: RwLock<Inner>,
}

impl OntologyAxiomsIndex {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                loaded: HashSet::new(),
                axioms: HashMap::new(),
            }),
        }
    }

    /// Bootstrap one ontology document. Repeat loads are no-ops.
    pub fn load(&self, ontology: &OntologyId, axioms: &[Arc<Axiom>]) {
        let mut inner = self.inner.write().expect("axioms index lock poisoned");
        if !inner.loaded.insert(ontology.clone()) {
            return;
        }
        inner
            .axioms
            .entry(ontology.clone())
            .or_default()
            .extend(axioms.iter().cloned());
    }

    /// All axioms of one ontology document, in no particular order.
    pub fn axioms(&self, ontology: &OntologyId) -> Vec<Arc<Axiom>> {
        let inner = self.inner.read().expect("axioms index lock poisoned");
        inner
            .axioms
            .get(ontology)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the ontology contains this exact axiom (structural equality,
    /// annotations included).
    pub fn contains(&self, ontology: &OntologyId, axiom: &Axiom) -> bool {
        let inner = self.inner.read().expect("axioms index lock poisoned");
        inner
            .axioms
            .get(ontology)
            .is_some_and(|set| set.contains(axiom))
    }

    /// Number of axioms in one ontology document.
    pub fn axiom_count(&self, ontology: &OntologyId) -> usize {
        let inner = self.inner.read().expect("axioms index lock poisoned");
        inner.axioms.get(ontology).map_or(0, HashSet::len)
    }
}

impl Default for OntologyAxiomsIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyChangeListener for OntologyAxiomsIndex {
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        let mut inner = self.inner.write().expect("axioms index lock poisoned");
        for record in changes {
            let set = inner.axioms.entry(record.ontology.clone()).or_default();
            match record.op {
                ChangeOp::Add => {
                    set.insert(Arc::clone(&record.axiom));
                }
                ChangeOp::Remove => {
                    set.remove(&record.axiom);
                }
            }
        }
        Ok(())
    }
}
