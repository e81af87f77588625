//! Durable project tags.
//!
//! Tags are small labelled markers users attach to entities and discussions.
//! They live outside the ontology model and the revision history: a tag
//! edit is not an ontology change. Labels are unique per project.

use std::path::Path;

use dashmap::DashMap;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, TagError};
use crate::project::ProjectId;

/// Tag id (as u128) → bincode-encoded [`Tag`].
const TAGS_TABLE: TableDefinition<u128, &[u8]> = TableDefinition::new("tags");

pub type TagResult<T> = std::result::Result<T, TagError>;

/// Unique identity of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(Uuid);

impl TagId {
    /// A freshly generated random id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the canonical hyphenated form.
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|source| ModelError::MalformedUuid {
                value: value.to_string(),
                source,
            })
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A labelled marker scoped to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub project: ProjectId,
    pub label: String,
    pub description: String,
    /// Display color, e.g. `#ff8800`.
    pub color: String,
}

/// Tag storage: a DashMap read cache in front of an optional redb database.
///
/// Writes go to the database first; the cache is only updated after a
/// successful commit, so readers never observe a tag that was not persisted.
pub struct TagStore {
    db: Option<Database>,
    cache: DashMap<TagId, Tag>,
}

impl TagStore {
    /// Open or create a durable store in `data_dir`, loading existing tags.
    pub fn open(data_dir: &Path) -> TagResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| TagError::Storage {
            message: format!("failed to create {}: {e}", data_dir.display()),
        })?;
        let db_path = data_dir.join("tags.redb");
        let db = Database::create(&db_path).map_err(|e| TagError::Storage {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;

        let txn = db.begin_write().map_err(|e| TagError::Storage {
            message: format!("begin_write failed: {e}"),
        })?;
        txn.open_table(TAGS_TABLE).map_err(|e| TagError::Storage {
            message: format!("open_table failed: {e}"),
        })?;
        txn.commit().map_err(|e| TagError::Storage {
            message: format!("commit failed: {e}"),
        })?;

        let cache = DashMap::new();
        let txn = db.begin_read().map_err(|e| TagError::Storage {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = txn.open_table(TAGS_TABLE).map_err(|e| TagError::Storage {
            message: format!("open_table failed: {e}"),
        })?;
        let entries = table.iter().map_err(|e| TagError::Storage {
            message: format!("iter failed: {e}"),
        })?;
        for entry in entries {
            let (_, bytes) = entry.map_err(|e| TagError::Storage {
                message: format!("range read failed: {e}"),
            })?;
            let tag: Tag = bincode::deserialize(bytes.value()).map_err(|e| TagError::Encoding {
                message: format!("failed to decode tag: {e}"),
            })?;
            cache.insert(tag.id, tag);
        }

        Ok(Self {
            db: Some(db),
            cache,
        })
    }

    /// A store with no durability, for tests and ephemeral projects.
    pub fn in_memory() -> Self {
        Self {
            db: None,
            cache: DashMap::new(),
        }
    }

    /// Insert or update a tag.
    ///
    /// Upsert is by id; saving under a (project, label) pair already taken
    /// by a *different* tag is rejected with [`TagError::DuplicateLabel`].
    pub fn save_tag(&self, tag: Tag) -> TagResult<()> {
        let conflict = self.cache.iter().any(|existing| {
            existing.project == tag.project
                && existing.label == tag.label
                && existing.id != tag.id
        });
        if conflict {
            return Err(TagError::DuplicateLabel { label: tag.label });
        }

        if let Some(db) = &self.db {
            let encoded = bincode::serialize(&tag).map_err(|e| TagError::Encoding {
                message: format!("failed to encode tag {}: {e}", tag.id),
            })?;
            let txn = db.begin_write().map_err(|e| TagError::Storage {
                message: format!("begin_write failed: {e}"),
            })?;
            {
                let mut table = txn.open_table(TAGS_TABLE).map_err(|e| TagError::Storage {
                    message: format!("open_table failed: {e}"),
                })?;
                table
                    .insert(tag.id.as_uuid().as_u128(), encoded.as_slice())
                    .map_err(|e| TagError::Storage {
                        message: format!("insert failed: {e}"),
                    })?;
            }
            txn.commit().map_err(|e| TagError::Storage {
                message: format!("commit failed: {e}"),
            })?;
        }

        self.cache.insert(tag.id, tag);
        Ok(())
    }

    /// One tag by id.
    pub fn find_by_id(&self, id: TagId) -> Option<Tag> {
        self.cache.get(&id).map(|entry| entry.clone())
    }

    /// All tags of one project, sorted by label.
    pub fn find_by_project(&self, project: ProjectId) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .cache
            .iter()
            .filter(|entry| entry.project == project)
            .map(|entry| entry.clone())
            .collect();
        tags.sort_by(|a, b| a.label.cmp(&b.label));
        tags
    }

    /// Delete a tag. Returns whether it existed.
    pub fn remove(&self, id: TagId) -> TagResult<bool> {
        if let Some(db) = &self.db {
            let txn = db.begin_write().map_err(|e| TagError::Storage {
                message: format!("begin_write failed: {e}"),
            })?;
            {
                let mut table = txn.open_table(TAGS_TABLE).map_err(|e| TagError::Storage {
                    message: format!("open_table failed: {e}"),
                })?;
                table
                    .remove(id.as_uuid().as_u128())
                    .map_err(|e| TagError::Storage {
                        message: format!("remove failed: {e}"),
                    })?;
            }
            txn.commit().map_err(|e| TagError::Storage {
                message: format!("commit failed: {e}"),
            })?;
        }
        Ok(self.cache.remove(&id).is_some())
    }
}

impl std::fmt::Debug for TagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagStore")
            .field("durable", &self.db.is_some())
            .field("tags", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(store_project: ProjectId, label: &str) -> Tag {
        Tag {
            id: TagId::fresh(),
            project: store_project,
            label: label.to_string(),
            description: String::new(),
            color: "#808080".to_string(),
        }
    }

    #[test]
    fn malformed_tag_id_is_rejected() {
        let err = TagId::parse("not-a-uuid").unwrap_err();
        assert!(matches!(err, ModelError::MalformedUuid { .. }));
        let id = TagId::fresh();
        assert_eq!(TagId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn duplicate_label_in_same_project_rejected() {
        let store = TagStore::in_memory();
        let project = ProjectId::fresh();
        store.save_tag(tag(project, "deprecated")).unwrap();
        let err = store.save_tag(tag(project, "deprecated")).unwrap_err();
        assert!(matches!(err, TagError::DuplicateLabel { .. }));
    }

    #[test]
    fn same_label_allowed_across_projects() {
        let store = TagStore::in_memory();
        store.save_tag(tag(ProjectId::fresh(), "deprecated")).unwrap();
        store.save_tag(tag(ProjectId::fresh(), "deprecated")).unwrap();
    }

    #[test]
    fn upsert_by_id_can_keep_its_own_label() {
        let store = TagStore::in_memory();
        let project = ProjectId::fresh();
        let mut original = tag(project, "review");
        store.save_tag(original.clone()).unwrap();
        original.color = "#ff0000".to_string();
        store.save_tag(original.clone()).unwrap();
        assert_eq!(store.find_by_id(original.id).unwrap().color, "#ff0000");
        assert_eq!(store.find_by_project(project).len(), 1);
    }

    #[test]
    fn find_by_project_sorts_by_label() {
        let store = TagStore::in_memory();
        let project = ProjectId::fresh();
        for label in ["zeta", "alpha", "mid"] {
            store.save_tag(tag(project, label)).unwrap();
        }
        let labels: Vec<String> = store
            .find_by_project(project)
            .into_iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn remove_reports_existence() {
        let store = TagStore::in_memory();
        let saved = tag(ProjectId::fresh(), "gone");
        let id = saved.id;
        store.save_tag(saved).unwrap();
        assert!(store.remove(id).unwrap());
        assert!(!store.remove(id).unwrap());
        assert!(store.find_by_id(id).is_none());
    }

    #[test]
    fn durable_tags_survive_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let project = ProjectId::fresh();
        let saved = tag(project, "persisted");
        let id = saved.id;
        {
            let store = TagStore::open(dir.path()).unwrap();
            store.save_tag(saved).unwrap();
        }
        let store = TagStore::open(dir.path()).unwrap();
        assert_eq!(store.find_by_id(id).unwrap().label, "persisted");
        assert_eq!(store.find_by_project(project).len(), 1);
    }
}
