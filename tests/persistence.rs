//! Persistence and recovery tests for the seshat engine.
//!
//! These tests verify that revision history and tags survive a full
//! close-and-reopen cycle of a durable project.

use std::path::Path;

use seshat::axiom::Axiom;
use seshat::change::{ChangeRecord, OntologyId};
use seshat::entity::Iri;
use seshat::page::PageRequest;
use seshat::project::{Project, ProjectConfig, ProjectId};
use seshat::revision::{RevisionNumber, UserId};
use seshat::tag::{Tag, TagId};

fn iri(s: &str) -> Iri {
    Iri::new(format!("http://example.org/onto#{s}")).unwrap()
}

fn ont() -> OntologyId {
    OntologyId::new(iri("onto"))
}

fn durable_project(project_id: ProjectId, dir: &Path) -> Project {
    Project::new(ProjectConfig {
        project_id,
        data_dir: Some(dir.to_path_buf()),
        root_class: iri("Root"),
    })
    .unwrap()
}

#[test]
fn revision_history_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let project_id = ProjectId::fresh();

    {
        let project = durable_project(project_id, dir.path());
        project
            .apply_edit(
                UserId::new("alice"),
                "first edit",
                vec![ChangeRecord::add(
                    ont(),
                    Axiom::sub_class_of(iri("A"), iri("Root")),
                )],
            )
            .unwrap();
        project
            .apply_edit(
                UserId::new("bob"),
                "second edit",
                vec![
                    ChangeRecord::add(ont(), Axiom::sub_class_of(iri("B"), iri("A"))),
                    ChangeRecord::add(ont(), Axiom::sub_class_of(iri("C"), iri("A"))),
                ],
            )
            .unwrap();
    }

    let project = durable_project(project_id, dir.path());
    assert_eq!(project.revisions().head().value(), 2);

    let second = project
        .revisions()
        .get_revision(RevisionNumber::new(2))
        .unwrap();
    assert_eq!(second.author, UserId::new("bob"));
    assert_eq!(second.comment, "second edit");
    assert_eq!(second.change_count(), 2);

    // Change history renders straight off the reloaded log.
    let page = project.project_changes(None, &PageRequest::first_page());
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.elements[0].revision_number.value(), 2);
    assert_eq!(page.elements[1].change_count, 1);

    // New edits continue from the persisted head.
    let next = project
        .apply_edit(
            UserId::new("carol"),
            "third edit",
            vec![ChangeRecord::add(
                ont(),
                Axiom::sub_class_of(iri("D"), iri("Root")),
            )],
        )
        .unwrap();
    assert_eq!(next.number.value(), 3);
}

#[test]
fn replaying_reloaded_history_rebuilds_the_indices() {
    let dir = tempfile::TempDir::new().unwrap();
    let project_id = ProjectId::fresh();

    {
        let project = durable_project(project_id, dir.path());
        project
            .apply_edit(
                UserId::new("alice"),
                "taxonomy",
                vec![
                    ChangeRecord::add(ont(), Axiom::sub_class_of(iri("A"), iri("Root"))),
                    ChangeRecord::add(ont(), Axiom::sub_class_of(iri("B"), iri("A"))),
                ],
            )
            .unwrap();
    }

    // Indices are in-memory only; a reopened project starts empty and is
    // rebuilt by replaying the persisted change history.
    let project = durable_project(project_id, dir.path());
    assert_eq!(project.axioms().axiom_count(&ont()), 0);
    let replayed = project.revisions().revisions_after(None);
    assert_eq!(replayed.len(), 1);
    let axioms: Vec<Axiom> = replayed
        .iter()
        .flat_map(|revision| revision.changes.iter())
        .map(|record| (*record.axiom).clone())
        .collect();
    project.load_document(ont(), axioms);

    assert_eq!(project.axioms().axiom_count(&ont()), 2);
    assert_eq!(project.hierarchy().parents(&iri("B")), vec![iri("A")]);
    assert_eq!(project.hierarchy().parents(&iri("A")), vec![iri("Root")]);
}

#[test]
fn tags_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let project_id = ProjectId::fresh();
    let tag_id = TagId::fresh();

    {
        let project = durable_project(project_id, dir.path());
        project
            .tags()
            .save_tag(Tag {
                id: tag_id,
                project: project_id,
                label: "needs-review".to_string(),
                description: "flag for curation".to_string(),
                color: "#ff8800".to_string(),
            })
            .unwrap();
    }

    let project = durable_project(project_id, dir.path());
    let reloaded = project.tags().find_by_id(tag_id).unwrap();
    assert_eq!(reloaded.label, "needs-review");
    assert_eq!(reloaded.color, "#ff8800");

    // The (project, label) constraint still holds against reloaded tags.
    let duplicate = Tag {
        id: TagId::fresh(),
        project: project_id,
        label: "needs-review".to_string(),
        description: String::new(),
        color: "#000000".to_string(),
    };
    assert!(project.tags().save_tag(duplicate).is_err());

    // Upsert of the reloaded tag by its own id still works.
    let mut updated = reloaded;
    updated.description = "second pass".to_string();
    project.tags().save_tag(updated).unwrap();
    assert_eq!(
        project.tags().find_by_id(tag_id).unwrap().description,
        "second pass"
    );
}

#[test]
fn tag_removal_is_durable() {
    let dir = tempfile::TempDir::new().unwrap();
    let project_id = ProjectId::fresh();
    let tag_id = TagId::fresh();

    {
        let project = durable_project(project_id, dir.path());
        project
            .tags()
            .save_tag(Tag {
                id: tag_id,
                project: project_id,
                label: "ephemeral".to_string(),
                description: String::new(),
                color: "#123456".to_string(),
            })
            .unwrap();
        assert!(project.tags().remove(tag_id).unwrap());
    }

    let project = durable_project(project_id, dir.path());
    assert!(project.tags().find_by_id(tag_id).is_none());
    assert!(project.tags().find_by_project(project_id).is_empty());
}
