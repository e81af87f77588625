//! # seshat
//!
//! The backend engine of a collaborative ontology editor: incremental axiom
//! indices, an asserted class hierarchy with implicit-root maintenance, an
//! append-only revision history, and paginated change diffs.
//!
//! ## Architecture
//!
//! - **Model** (`entity`, `axiom`, `change`): immutable value objects with
//!   validated IRIs, structurally-hashed axioms, Add/Remove change records
//! - **Indices** (`index`): per-ontology in-memory indices kept current by a
//!   registration-ordered change-listener fan-out
//! - **Hierarchy** (`hierarchy`): on-demand parent/child/equivalence queries
//!   with cycle-tolerant implicit roots under a designated root class
//! - **History** (`revision`, `diff`): durable (redb) gap-free revision log
//!   and deterministic, revision-paginated diff rendering
//! - **Project** (`project`, `tag`): the facade wiring it all together, plus
//!   durable per-project tags
//!
//! ## Library usage
//!
//! ```no_run
//! use seshat::axiom::Axiom;
//! use seshat::change::{ChangeRecord, OntologyId};
//! use seshat::entity::Iri;
//! use seshat::project::{Project, ProjectConfig};
//! use seshat::revision::UserId;
//!
//! let project = Project::new(ProjectConfig::default()).unwrap();
//! let ontology = OntologyId::new(Iri::new("http://example.org/onto").unwrap());
//! let dog = Iri::new("http://example.org/onto#Dog").unwrap();
//! let animal = Iri::new("http://example.org/onto#Animal").unwrap();
//! project
//!     .apply_edit(
//!         UserId::new("alice"),
//!         "Dog is an Animal",
//!         vec![ChangeRecord::add(ontology, Axiom::sub_class_of(dog.clone(), animal))],
//!     )
//!     .unwrap();
//! assert_eq!(project.hierarchy().parents(&dog).len(), 1);
//! ```

pub mod axiom;
pub mod change;
pub mod diff;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod index;
pub mod page;
pub mod project;
pub mod revision;
pub mod tag;
