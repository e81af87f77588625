//! Rich diagnostic error types for the seshat engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly what went wrong
//! and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the seshat engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum SeshatError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Revision(#[from] RevisionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Project(#[from] ProjectError),
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing model value objects (IRIs, identifiers).
///
/// Malformed identifiers are rejected synchronously at construction and are
/// never silently coerced into something valid-looking.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("malformed IRI `{iri}`: {reason}")]
    #[diagnostic(
        code(seshat::model::malformed_iri),
        help(
            "IRIs must be non-empty, contain no whitespace, and carry a scheme \
             separator (`:`). Check the identifier for typos or use a full \
             `http://...` form."
        )
    )]
    MalformedIri { iri: String, reason: &'static str },

    #[error("malformed UUID `{value}`")]
    #[diagnostic(
        code(seshat::model::malformed_uuid),
        help(
            "Project and tag identifiers are UUIDs in the canonical hyphenated \
             form, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`."
        )
    )]
    MalformedUuid {
        value: String,
        #[source]
        source: uuid::Error,
    },
}

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

/// Errors raised by axiom indices while applying change batches.
///
/// The [`IndexUpdater`](crate::index::updater::IndexUpdater) treats these as
/// per-listener failures: they are logged and propagation continues, so one
/// faulty index cannot abort an edit or starve other indices.
#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error("index `{index}` failed to apply change batch: {message}")]
    #[diagnostic(
        code(seshat::index::apply_failed),
        help(
            "The index could not incorporate the change batch and may now lag \
             behind the authoritative axiom sets. Reload the project to force \
             a full bootstrap of this index."
        )
    )]
    ApplyFailed { index: String, message: String },
}

// ---------------------------------------------------------------------------
// Revision errors
// ---------------------------------------------------------------------------

/// Errors raised by the append-only revision store.
#[derive(Debug, Error, Diagnostic)]
pub enum RevisionError {
    #[error("revision storage error: {message}")]
    #[diagnostic(
        code(seshat::revision::storage),
        help(
            "The embedded database failed during a revision append or load. \
             Check that the data directory exists, has correct permissions, \
             and that the disk is not full. No revision was published."
        )
    )]
    Storage { message: String },

    #[error("revision encoding error: {message}")]
    #[diagnostic(
        code(seshat::revision::encoding),
        help(
            "Failed to serialize or deserialize a revision record. This usually \
             means the stored change-history format has changed between versions."
        )
    )]
    Encoding { message: String },
}

// ---------------------------------------------------------------------------
// Tag errors
// ---------------------------------------------------------------------------

/// Errors raised by the durable tag store.
#[derive(Debug, Error, Diagnostic)]
pub enum TagError {
    #[error("a tag labelled `{label}` already exists in this project")]
    #[diagnostic(
        code(seshat::tag::duplicate_label),
        help(
            "Tag labels are unique per project (composite (project, label) key). \
             Pick a different label, or update the existing tag by its id."
        )
    )]
    DuplicateLabel { label: String },

    #[error("tag storage error: {message}")]
    #[diagnostic(
        code(seshat::tag::storage),
        help("The embedded database failed while reading or writing tag records.")
    )]
    Storage { message: String },

    #[error("tag encoding error: {message}")]
    #[diagnostic(
        code(seshat::tag::encoding),
        help("Failed to serialize or deserialize a tag record.")
    )]
    Encoding { message: String },
}

// ---------------------------------------------------------------------------
// Project errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing or operating a project context.
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("data directory error: {path}")]
    #[diagnostic(
        code(seshat::project::data_dir),
        help(
            "The project data directory could not be created or accessed. \
             Ensure the path exists and has read/write permissions."
        )
    )]
    DataDir { path: String },
}

/// Convenience alias for functions returning seshat results.
pub type SeshatResult<T> = std::result::Result<T, SeshatError>;
