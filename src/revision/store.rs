//! Durable append-only storage for revisions, backed by redb.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::info;

use crate::change::ChangeBatch;
use crate::error::RevisionError;
use crate::revision::{Revision, RevisionNumber, RevisionResult, UserId};

/// Revision number → bincode-encoded [`Revision`].
const REVISIONS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("revisions");

/// Append-only revision log with an in-memory read path.
///
/// Reads are served from the in-memory `BTreeMap`; the embedded database is
/// the durability layer. An append commits to disk *before* the revision is
/// published to the log, so a storage failure leaves no half-visible
/// revision behind, and the single append mutex keeps numbers gap-free
/// under concurrent editing.
pub struct RevisionStore {
    db: Option<Database>,
    log: RwLock<BTreeMap<u64, Revision>>,
    append_lock: Mutex<()>,
}

impl RevisionStore {
    /// Open or create a durable store in `data_dir`, loading any existing
    /// revisions.
    pub fn open(data_dir: &Path) -> RevisionResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| RevisionError::Storage {
            message: format!("failed to create {}: {e}", data_dir.display()),
        })?;
        let db_path = data_dir.join("revisions.redb");
        let db = Database::create(&db_path).map_err(|e| RevisionError::Storage {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;

        // Ensure the table exists so a fresh database reads back cleanly.
        let txn = db.begin_write().map_err(|e| RevisionError::Storage {
            message: format!("begin_write failed: {e}"),
        })?;
        txn.open_table(REVISIONS_TABLE)
            .map_err(|e| RevisionError::Storage {
                message: format!("open_table failed: {e}"),
            })?;
        txn.commit().map_err(|e| RevisionError::Storage {
            message: format!("commit failed: {e}"),
        })?;

        let mut log = BTreeMap::new();
        let txn = db.begin_read().map_err(|e| RevisionError::Storage {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = txn
            .open_table(REVISIONS_TABLE)
            .map_err(|e| RevisionError::Storage {
                message: format!("open_table failed: {e}"),
            })?;
        let entries = table.iter().map_err(|e| RevisionError::Storage {
            message: format!("iter failed: {e}"),
        })?;
        for entry in entries {
            let (number, bytes) = entry.map_err(|e| RevisionError::Storage {
                message: format!("range read failed: {e}"),
            })?;
            let revision: Revision =
                bincode::deserialize(bytes.value()).map_err(|e| RevisionError::Encoding {
                    message: format!("failed to decode revision {}: {e}", number.value()),
                })?;
            log.insert(number.value(), revision);
        }
        if !log.is_empty() {
            info!(revisions = log.len(), "loaded revision history");
        }

        Ok(Self {
            db: Some(db),
            log: RwLock::new(log),
            append_lock: Mutex::new(()),
        })
    }

    /// A store with no durability, for tests and ephemeral projects.
    pub fn in_memory() -> Self {
        Self {
            db: None,
            log: RwLock::new(BTreeMap::new()),
            append_lock: Mutex::new(()),
        }
    }

    /// Append a new revision: assign the next number, persist, publish.
    pub fn add_revision(
        &self,
        author: UserId,
        changes: ChangeBatch,
        comment: impl Into<String>,
    ) -> RevisionResult<Revision> {
        let _guard = self.append_lock.lock().expect("revision append lock poisoned");

        let next = self.head().value() + 1;
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let revision = Revision {
            number: RevisionNumber::new(next),
            author,
            timestamp_ms,
            comment: comment.into(),
            changes,
        };

        if let Some(db) = &self.db {
            let encoded = bincode::serialize(&revision).map_err(|e| RevisionError::Encoding {
                message: format!("failed to encode revision {next}: {e}"),
            })?;
            let txn = db.begin_write().map_err(|e| RevisionError::Storage {
                message: format!("begin_write failed: {e}"),
            })?;
            {
                let mut table =
                    txn.open_table(REVISIONS_TABLE)
                        .map_err(|e| RevisionError::Storage {
                            message: format!("open_table failed: {e}"),
                        })?;
                table
                    .insert(next, encoded.as_slice())
                    .map_err(|e| RevisionError::Storage {
                        message: format!("insert failed: {e}"),
                    })?;
            }
            txn.commit().map_err(|e| RevisionError::Storage {
                message: format!("commit failed: {e}"),
            })?;
        }

        self.log
            .write()
            .expect("revision log lock poisoned")
            .insert(next, revision.clone());
        info!(
            revision = %revision.number,
            author = %revision.author,
            changes = revision.change_count(),
            "appended revision"
        );
        Ok(revision)
    }

    /// The highest revision number, or 0 if the history is empty.
    pub fn head(&self) -> RevisionNumber {
        let log = self.log.read().expect("revision log lock poisoned");
        RevisionNumber::new(log.keys().next_back().copied().unwrap_or(0))
    }

    /// One revision by number.
    pub fn get_revision(&self, number: RevisionNumber) -> Option<Revision> {
        self.log
            .read()
            .expect("revision log lock poisoned")
            .get(&number.value())
            .cloned()
    }

    /// All revisions strictly after `since`, ascending. `None` means the
    /// whole history.
    pub fn revisions_after(&self, since: Option<RevisionNumber>) -> Vec<Revision> {
        let from = since.map_or(0, RevisionNumber::value);
        let log = self.log.read().expect("revision log lock poisoned");
        log.range((from + 1)..).map(|(_, rev)| rev.clone()).collect()
    }

    /// Number of revisions in the history.
    pub fn revision_count(&self) -> usize {
        self.log.read().expect("revision log lock poisoned").len()
    }
}

impl std::fmt::Debug for RevisionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionStore")
            .field("durable", &self.db.is_some())
            .field("head", &self.head())
            .finish()
    }
}
