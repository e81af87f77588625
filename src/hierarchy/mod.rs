//! The asserted class hierarchy.
//!
//! [`ClassHierarchy`] answers parent/child/equivalence queries by reading
//! the subject and reference indices on demand; nothing is materialized
//! beyond the implicit-root set. The engine is itself a change listener and
//! must be registered with the updater *after* the indices it reads, so an
//! incoming batch is already visible in them when the hierarchy reacts.
//!
//! # Architecture
//!
//! - `parents`/`children`/`equivalents` are pure index queries, unioned
//!   across every registered ontology document.
//! - [`roots::ImplicitRootFinder`] keeps detached classes reachable by
//!   attaching them under the designated root.
//! - [`HierarchyObserver`]s are notified once per class whose neighborhood
//!   a batch may have changed.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::info;

use crate::axiom::Axiom;
use crate::change::ChangeRecord;
use crate::entity::Iri;
use crate::index::by_reference::AxiomsByIriReferenceIndex;
use crate::index::by_subject::{EquivalentClassesIndex, SubClassOfBySubClassIndex};
use crate::index::signature::{
    EntitiesInProjectSignatureByIriIndex, ProjectOntologiesIndex, ProjectSignatureIndex,
};
use crate::index::{IndexResult, OntologyChangeListener};

pub mod roots;

use roots::{ImplicitRootFinder, ancestor_closure};

/// Notified when the neighborhood of a class may have changed.
pub trait HierarchyObserver: Send + Sync {
    fn node_changed(&self, class: &Iri);
}

/// The asserted class hierarchy of a project.
pub struct ClassHierarchy {
    root: Iri,
    ontologies: Arc<ProjectOntologiesIndex>,
    sub_class_of: Arc<SubClassOfBySubClassIndex>,
    equivalent_classes: Arc<EquivalentClassesIndex>,
    project_signature: Arc<ProjectSignatureIndex>,
    by_reference: Arc<AxiomsByIriReferenceIndex>,
    entities_by_iri: Arc<EntitiesInProjectSignatureByIriIndex>,
    root_finder: RwLock<ImplicitRootFinder>,
    observers: RwLock<Vec<Arc<dyn HierarchyObserver>>>,
}

impl ClassHierarchy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        root: Iri,
        ontologies: Arc<ProjectOntologiesIndex>,
        sub_class_of: Arc<SubClassOfBySubClassIndex>,
        equivalent_classes: Arc<EquivalentClassesIndex>,
        project_signature: Arc<ProjectSignatureIndex>,
        by_reference: Arc<AxiomsByIriReferenceIndex>,
        entities_by_iri: Arc<EntitiesInProjectSignatureByIriIndex>,
    ) -> Self {
        Self {
            root_finder: RwLock::new(ImplicitRootFinder::new(root.clone())),
            root,
            ontologies,
            sub_class_of,
            equivalent_classes,
            project_signature,
            by_reference,
            entities_by_iri,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// The designated root class.
    pub fn root(&self) -> &Iri {
        &self.root
    }

    /// The top of the hierarchy: always exactly the designated root.
    pub fn roots(&self) -> Vec<Iri> {
        vec![self.root.clone()]
    }

    /// Register an observer for node-changed notifications.
    pub fn add_observer(&self, observer: Arc<dyn HierarchyObserver>) {
        self.observers
            .write()
            .expect("hierarchy observer lock poisoned")
            .push(observer);
    }

    /// Whether any project document mentions `class` as a class.
    pub fn contains_reference(&self, class: &Iri) -> bool {
        self.entities_by_iri
            .entities_with_iri(class)
            .iter()
            .any(|entity| entity.is_class())
    }

    /// The asserted parents of `class`: `SubClassOf` superclasses plus
    /// `EquivalentClasses` partners, across every document. Self-parents
    /// are filtered out. The implicit-root attachment is *not* applied
    /// here; this is the raw edge relation terminality is judged on.
    fn asserted_parents(&self, class: &Iri) -> Vec<Iri> {
        let mut seen = HashSet::new();
        let mut parents = Vec::new();
        for ontology in self.ontologies.ontology_ids() {
            for axiom in self.sub_class_of.sub_class_of_axioms(&ontology, class) {
                if let Axiom::SubClassOf { super_class, .. } = &*axiom
                    && super_class != class
                    && seen.insert(super_class.clone())
                {
                    parents.push(super_class.clone());
                }
            }
            for axiom in self
                .equivalent_classes
                .equivalent_classes_axioms(&ontology, class)
            {
                if let Axiom::EquivalentClasses { classes, .. } = &*axiom {
                    for member in classes {
                        if member != class && seen.insert(member.clone()) {
                            parents.push(member.clone());
                        }
                    }
                }
            }
        }
        parents
    }

    /// The parents of `class` as shown in the tree: the asserted parents,
    /// plus the root if `class` is an implicit root. The root has none.
    pub fn parents(&self, class: &Iri) -> Vec<Iri> {
        if *class == self.root {
            return Vec::new();
        }
        let mut parents = self.asserted_parents(class);
        let is_implicit_root = self
            .root_finder
            .read()
            .expect("root finder lock poisoned")
            .roots()
            .contains(class);
        if is_implicit_root && !parents.contains(&self.root) {
            parents.push(self.root.clone());
        }
        parents
    }

    /// The children of `class`: subclasses and equivalence partners
    /// extracted from the axioms that mention it. The root additionally
    /// has every implicit root as a child.
    pub fn children(&self, class: &Iri) -> Vec<Iri> {
        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for ontology in self.ontologies.ontology_ids() {
            for axiom in self.by_reference.referencing_axioms(&ontology, class) {
                for child in extract_children(&axiom, class) {
                    if child != *class && seen.insert(child.clone()) {
                        children.push(child);
                    }
                }
            }
        }
        if *class == self.root {
            let finder = self.root_finder.read().expect("root finder lock poisoned");
            for implicit in finder.roots() {
                if *implicit != self.root && seen.insert(implicit.clone()) {
                    children.push(implicit.clone());
                }
            }
        }
        children
    }

    /// The classes equivalent to `class`: direct `EquivalentClasses`
    /// partners plus every class on a parent-cycle through it. Excludes
    /// `class` itself and the root.
    pub fn equivalents(&self, class: &Iri) -> Vec<Iri> {
        let mut seen = HashSet::new();
        let mut equivalents = Vec::new();
        for ontology in self.ontologies.ontology_ids() {
            for axiom in self
                .equivalent_classes
                .equivalent_classes_axioms(&ontology, class)
            {
                if let Axiom::EquivalentClasses { classes, .. } = &*axiom {
                    for member in classes {
                        if member != class && *member != self.root && seen.insert(member.clone())
                        {
                            equivalents.push(member.clone());
                        }
                    }
                }
            }
        }
        let parents_fn = |c: &Iri| self.asserted_parents(c);
        let ancestors = ancestor_closure(class, &parents_fn);
        if ancestors.contains(class) {
            for ancestor in &ancestors {
                if ancestor != class
                    && *ancestor != self.root
                    && ancestor_closure(ancestor, &parents_fn).contains(class)
                    && seen.insert(ancestor.clone())
                {
                    equivalents.push(ancestor.clone());
                }
            }
        }
        equivalents
    }

    /// Every class reachable from `class` by repeatedly following
    /// [`Self::parents`]. Cycle-safe; may include the root.
    pub fn ancestors(&self, class: &Iri) -> HashSet<Iri> {
        let mut closure = HashSet::new();
        let mut frontier = self.parents(class);
        while let Some(current) = frontier.pop() {
            if closure.insert(current.clone()) {
                frontier.extend(self.parents(&current));
            }
        }
        closure
    }

    /// The current implicit-root set.
    pub fn implicit_roots(&self) -> HashSet<Iri> {
        self.root_finder
            .read()
            .expect("root finder lock poisoned")
            .roots()
            .clone()
    }

    /// Recompute the implicit-root set from the full project signature.
    /// Called once after document loading; thereafter the set is maintained
    /// incrementally per change batch.
    pub fn rebuild_implicit_roots(&self) {
        let started = Instant::now();
        let classes: Vec<Iri> = self
            .project_signature
            .signature_of_kind(crate::entity::EntityKind::Class)
            .into_iter()
            .map(|entity| entity.iri)
            .collect();
        let class_count = classes.len();
        let parents_fn = |c: &Iri| self.asserted_parents(c);
        let mut finder = self.root_finder.write().expect("root finder lock poisoned");
        finder.rebuild(&classes, &parents_fn);
        info!(
            classes = class_count,
            implicit_roots = finder.roots().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rebuilt implicit hierarchy roots"
        );
    }

    fn notify(&self, changed: &HashSet<Iri>) {
        let observers = self
            .observers
            .read()
            .expect("hierarchy observer lock poisoned");
        for class in changed {
            for observer in observers.iter() {
                observer.node_changed(class);
            }
        }
    }
}

/// Child IRIs contributed by one axiom that mentions `class`.
fn extract_children(axiom: &Axiom, class: &Iri) -> Vec<Iri> {
    if !axiom.is_logical() {
        return Vec::new();
    }
    match axiom {
        Axiom::SubClassOf {
            sub_class,
            super_class,
            ..
        } if super_class == class => vec![sub_class.clone()],
        Axiom::EquivalentClasses { classes, .. } if classes.contains(class) => classes
            .iter()
            .filter(|member| *member != class)
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

impl OntologyChangeListener for ClassHierarchy {
    /// React to a batch the indices have already absorbed: refresh the
    /// implicit-root set for the touched classes only, then notify
    /// observers at most once per affected class.
    fn apply_changes(&self, changes: &[ChangeRecord]) -> IndexResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut touched: HashSet<Iri> = HashSet::new();
        for record in changes {
            touched.extend(record.axiom.classes_in_signature());
        }
        // Classes the batch erased from the project entirely cannot be
        // implicit roots; everything else touched gets re-tested, as does
        // the previous root set (an untouched root may have gained a path
        // to the root through a touched ancestor).
        let dropped: HashSet<Iri> = touched
            .iter()
            .filter(|class| !self.contains_reference(class))
            .cloned()
            .collect();

        let old_roots = self.implicit_roots();
        let mut candidates: HashSet<Iri> =
            touched.difference(&dropped).cloned().collect();
        candidates.extend(old_roots.difference(&dropped).cloned());

        let parents_fn = |c: &Iri| self.asserted_parents(c);
        let new_roots = {
            let mut finder = self.root_finder.write().expect("root finder lock poisoned");
            for class in &dropped {
                finder.remove(class);
            }
            finder.refine(&candidates, &parents_fn);
            finder.roots().clone()
        };

        let mut changed = touched;
        changed.extend(old_roots.symmetric_difference(&new_roots).cloned());
        changed.insert(self.root.clone());
        self.notify(&changed);
        Ok(())
    }
}
