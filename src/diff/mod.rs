//! Paginated change-history views.
//!
//! [`ProjectChangesManager`] turns the raw revision log into presentation
//! records: one [`ProjectChange`] per revision, newest first, with each
//! revision's change records rendered and deterministically ordered.
//! Pagination counts revisions, not individual records, so one large edit
//! stays one history entry however many axioms it touched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::change::{ChangeOp, OntologyId};
use crate::page::{Page, PageRequest};
use crate::revision::{Revision, RevisionNumber, RevisionStore, UserId};

pub mod comparator;

/// One rendered line of a revision diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffElement {
    pub op: ChangeOp,
    pub ontology: OntologyId,
    /// The rendered axiom text.
    pub source: String,
}

/// One revision, prepared for history display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectChange {
    pub revision_number: RevisionNumber,
    pub author: UserId,
    pub timestamp_ms: u64,
    pub comment: String,
    /// Literal number of change records in the revision, even when several
    /// describe the same axiom.
    pub change_count: usize,
    pub diff: Vec<DiffElement>,
}

/// Builds paginated change histories from the revision store.
pub struct ProjectChangesManager {
    revisions: Arc<RevisionStore>,
}

impl ProjectChangesManager {
    pub fn new(revisions: Arc<RevisionStore>) -> Self {
        Self { revisions }
    }

    /// The revisions strictly after `after` (all of them when `None`),
    /// newest first, paginated by revision.
    pub fn project_changes(
        &self,
        after: Option<RevisionNumber>,
        request: &PageRequest,
    ) -> Page<ProjectChange> {
        let mut revisions = self.revisions.revisions_after(after);
        revisions.reverse();

        // The fields of `PageRequest` are public, so clamp degenerate
        // values here as well as at construction.
        let page_size = request.page_size.max(1);
        let total = revisions.len();
        let page_count = total.div_ceil(page_size).max(1);
        let start = request.page_number.saturating_sub(1) * page_size;
        let elements = if start >= total {
            Vec::new()
        } else {
            let end = (start + page_size).min(total);
            revisions[start..end].iter().map(render_revision).collect()
        };

        Page {
            page_number: request.page_number,
            page_count,
            total_elements: total,
            elements,
        }
    }
}

fn render_revision(revision: &Revision) -> ProjectChange {
    let mut records = revision.changes.clone();
    records.sort_by(comparator::compare_change_records);
    let diff = records
        .into_iter()
        .map(|record| DiffElement {
            op: record.op,
            ontology: record.ontology,
            source: record.axiom.to_string(),
        })
        .collect();
    ProjectChange {
        revision_number: revision.number,
        author: revision.author.clone(),
        timestamp_ms: revision.timestamp_ms,
        comment: revision.comment.clone(),
        change_count: revision.change_count(),
        diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::Axiom;
    use crate::change::ChangeRecord;
    use crate::entity::Iri;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    fn ont() -> OntologyId {
        OntologyId::new(iri("onto"))
    }

    fn manager_with_revisions(count: usize) -> ProjectChangesManager {
        let store = Arc::new(RevisionStore::in_memory());
        for n in 0..count {
            store
                .add_revision(
                    UserId::new("alice"),
                    vec![ChangeRecord::add(
                        ont(),
                        Axiom::sub_class_of(iri(&format!("C{n}")), iri("Root")),
                    )],
                    format!("edit {n}"),
                )
                .unwrap();
        }
        ProjectChangesManager::new(store)
    }

    #[test]
    fn newest_revision_comes_first() {
        let manager = manager_with_revisions(3);
        let page = manager.project_changes(None, &PageRequest::first_page());
        let numbers: Vec<u64> = page
            .elements
            .iter()
            .map(|c| c.revision_number.value())
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn pagination_counts_revisions() {
        let manager = manager_with_revisions(5);
        let page = manager.project_changes(None, &PageRequest::new(2, 2));
        assert_eq!(page.page_count, 3);
        assert_eq!(page.total_elements, 5);
        let numbers: Vec<u64> = page
            .elements
            .iter()
            .map(|c| c.revision_number.value())
            .collect();
        assert_eq!(numbers, vec![3, 2]);
    }

    #[test]
    fn zero_page_size_yields_a_page_instead_of_panicking() {
        let manager = manager_with_revisions(3);
        // Bypasses the clamping constructor on purpose.
        let request = PageRequest {
            page_number: 1,
            page_size: 0,
        };
        let page = manager.project_changes(None, &request);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.elements.len(), 1);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_but_counted() {
        let manager = manager_with_revisions(2);
        let page = manager.project_changes(None, &PageRequest::new(9, 10));
        assert!(page.elements.is_empty());
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.page_count, 1);
    }

    #[test]
    fn after_filter_is_exclusive() {
        let manager = manager_with_revisions(4);
        let page = manager.project_changes(
            Some(RevisionNumber::new(2)),
            &PageRequest::first_page(),
        );
        let numbers: Vec<u64> = page
            .elements
            .iter()
            .map(|c| c.revision_number.value())
            .collect();
        assert_eq!(numbers, vec![4, 3]);
    }

    #[test]
    fn diff_lines_are_sorted_not_storage_ordered() {
        let store = Arc::new(RevisionStore::in_memory());
        store
            .add_revision(
                UserId::new("alice"),
                vec![
                    ChangeRecord::add(ont(), Axiom::sub_class_of(iri("Zed"), iri("Root"))),
                    ChangeRecord::add(ont(), Axiom::sub_class_of(iri("Ant"), iri("Root"))),
                ],
                "two adds",
            )
            .unwrap();
        let manager = ProjectChangesManager::new(store);
        let page = manager.project_changes(None, &PageRequest::first_page());
        let change = &page.elements[0];
        assert_eq!(change.change_count, 2);
        assert!(change.diff[0].source.contains("Ant"));
        assert!(change.diff[1].source.contains("Zed"));
    }
}
