//! Implicit root detection for the class hierarchy.
//!
//! A class with no asserted path to the hierarchy root would be unreachable
//! from the tree view. Such classes are attached directly under the root as
//! *implicit roots*. Detection must tolerate cycles: a parent-cycle whose
//! members have no path out of the cycle is represented by attaching every
//! member under the root, so the whole cycle stays reachable no matter which
//! member a user expands first.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::entity::Iri;

/// Maintains the set of implicit roots under a fixed hierarchy root.
///
/// The finder never reads indices itself; callers pass a `parents_fn`
/// returning the asserted parents of a class (self-parents already filtered
/// out), which keeps the terminality test decoupled from index plumbing.
pub struct ImplicitRootFinder {
    root: Iri,
    roots: HashSet<Iri>,
}

impl ImplicitRootFinder {
    pub fn new(root: Iri) -> Self {
        Self {
            root,
            roots: HashSet::new(),
        }
    }

    /// The current implicit roots.
    pub fn roots(&self) -> &HashSet<Iri> {
        &self.roots
    }

    /// Recompute the whole set from scratch over `classes`.
    pub fn rebuild<F>(&mut self, classes: &[Iri], parents_fn: &F)
    where
        F: Fn(&Iri) -> Vec<Iri> + Sync,
    {
        let root = self.root.clone();
        self.roots = classes
            .par_iter()
            .filter(|class| **class != root && terminal(&root, class, parents_fn))
            .cloned()
            .collect();
    }

    /// Re-test only `candidates`: each becomes a root or stops being one
    /// according to the terminality test; classes outside the candidate set
    /// keep their current status.
    ///
    /// Terminality via a cycle is all-or-nothing: the members of a detached
    /// parent-cycle lose their path to the root together, so when a
    /// candidate tests terminal its whole ancestor set (the co-members of
    /// its cycle) is marked too, even if no co-member was itself a
    /// candidate.
    pub fn refine<F>(&mut self, candidates: &HashSet<Iri>, parents_fn: &F)
    where
        F: Fn(&Iri) -> Vec<Iri> + Sync,
    {
        for candidate in candidates {
            if *candidate == self.root {
                continue;
            }
            match terminal_ancestry(&self.root, candidate, parents_fn) {
                Some(cycle_members) => {
                    self.roots.insert(candidate.clone());
                    self.roots.extend(cycle_members);
                }
                None => {
                    self.roots.remove(candidate);
                }
            }
        }
    }

    /// Drop a class that no longer exists in the project.
    pub fn remove(&mut self, class: &Iri) -> bool {
        self.roots.remove(class)
    }

    /// Whether `class` has no asserted path to the hierarchy root.
    pub fn is_terminal<F>(&self, class: &Iri, parents_fn: &F) -> bool
    where
        F: Fn(&Iri) -> Vec<Iri>,
    {
        terminal(&self.root, class, parents_fn)
    }
}

/// The terminality test behind [`ImplicitRootFinder`].
///
/// A class is terminal when its ancestor closure (the root excluded) is
/// empty, or when the class sits on a parent-cycle none of whose ancestors
/// escape back to the rest of the hierarchy: every ancestor can reach the
/// class again, so no path leads to the root.
fn terminal<F>(root: &Iri, class: &Iri, parents_fn: &F) -> bool
where
    F: Fn(&Iri) -> Vec<Iri>,
{
    terminal_ancestry(root, class, parents_fn).is_some()
}

/// Terminality test that also reports *how* a class is terminal: `None`
/// when the class has a path to the root, otherwise the ancestor set. For
/// a parentless class that set is empty; for a detached cycle it is the
/// cycle's co-members, which are then terminal by the same argument (every
/// path between two co-members stays inside the root-free closure).
fn terminal_ancestry<F>(root: &Iri, class: &Iri, parents_fn: &F) -> Option<HashSet<Iri>>
where
    F: Fn(&Iri) -> Vec<Iri>,
{
    let ancestors = ancestor_closure(class, parents_fn);
    if ancestors.contains(root) {
        return None;
    }
    if ancestors.is_empty() {
        return Some(ancestors);
    }
    // Non-empty, root-free ancestry. Terminal only if the class is on a
    // cycle and the whole ancestry loops back to it.
    let on_terminal_cycle = ancestors.contains(class)
        && ancestors
            .iter()
            .all(|ancestor| reaches(ancestor, class, parents_fn));
    on_terminal_cycle.then_some(ancestors)
}

/// The set of classes reachable from `start` by repeatedly following
/// parents. Includes `start` itself only if a cycle leads back to it.
pub(crate) fn ancestor_closure<F>(start: &Iri, parents_fn: &F) -> HashSet<Iri>
where
    F: Fn(&Iri) -> Vec<Iri>,
{
    let mut closure = HashSet::new();
    let mut frontier = parents_fn(start);
    while let Some(class) = frontier.pop() {
        if closure.insert(class.clone()) {
            frontier.extend(parents_fn(&class));
        }
    }
    closure
}

/// Whether `target` is reachable from `start` by following parents.
fn reaches<F>(start: &Iri, target: &Iri, parents_fn: &F) -> bool
where
    F: Fn(&Iri) -> Vec<Iri>,
{
    let mut visited = HashSet::new();
    let mut frontier = parents_fn(start);
    while let Some(class) = frontier.pop() {
        if class == *target {
            return true;
        }
        if visited.insert(class.clone()) {
            frontier.extend(parents_fn(&class));
        }
    }
    false
}
