//! Deterministic ordering for change-diff lines.
//!
//! Diff output must not depend on the iteration order of any hash-based
//! index, so the comparator chain is total over distinct records: grouped by
//! rendered subject, then by the fixed axiom-type ordering, then by the full
//! rendered axiom text, and finally Add before Remove.

use std::cmp::Ordering;

use crate::axiom::Axiom;
use crate::change::ChangeRecord;

/// Compare two axioms for diff presentation.
pub fn compare_axioms(a: &Axiom, b: &Axiom) -> Ordering {
    let subject_a = a.subject().map(ToString::to_string);
    let subject_b = b.subject().map(ToString::to_string);
    // Subject-less axioms sort after everything with a subject.
    match (subject_a, subject_b) {
        (Some(sa), Some(sb)) => sa.cmp(&sb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| {
        a.axiom_type()
            .ordering_index()
            .cmp(&b.axiom_type().ordering_index())
    })
    .then_with(|| a.to_string().cmp(&b.to_string()))
}

/// Compare two change records: by axiom, Adds before Removes.
pub fn compare_change_records(a: &ChangeRecord, b: &ChangeRecord) -> Ordering {
    compare_axioms(&a.axiom, &b.axiom).then_with(|| a.op.cmp(&b.op))
}
