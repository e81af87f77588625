//! Entity and IRI value types.
//!
//! Entities are the named objects of an ontology: classes, properties,
//! individuals, and datatypes. Every entity pairs an [`Iri`] with an
//! [`EntityKind`] tag; equality is by (kind, IRI). Both types are immutable
//! value objects that are cheap to clone and safe to share across threads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The IRI of `owl:Thing`, the conventional explicit root of class hierarchies.
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

/// A validated IRI.
///
/// Backed by `Arc<str>` so clones are pointer copies; a single IRI is
/// typically shared between the authoritative axiom sets and several index
/// keyspaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(Arc<str>);

impl Iri {
    /// Create an IRI, rejecting malformed input.
    ///
    /// An IRI must be non-empty, contain no whitespace, and carry a `:`
    /// scheme separator. Anything else is a descriptive [`ModelError`];
    /// nothing is silently coerced.
    pub fn new(iri: impl Into<String>) -> Result<Self, ModelError> {
        let iri = iri.into();
        if iri.is_empty() {
            return Err(ModelError::MalformedIri {
                iri,
                reason: "empty string",
            });
        }
        if iri.chars().any(char::is_whitespace) {
            return Err(ModelError::MalformedIri {
                iri,
                reason: "contains whitespace",
            });
        }
        if !iri.contains(':') {
            return Err(ModelError::MalformedIri {
                iri,
                reason: "missing scheme separator",
            });
        }
        Ok(Self(Arc::from(iri.as_str())))
    }

    /// The IRI of `owl:Thing`.
    pub fn owl_thing() -> Self {
        Self(Arc::from(OWL_THING))
    }

    /// The IRI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// Classification of an entity in the ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// A class of individuals.
    Class,
    /// A relation between individuals.
    ObjectProperty,
    /// A relation from individuals to literal values.
    DataProperty,
    /// A property used in annotations.
    AnnotationProperty,
    /// A named individual.
    NamedIndividual,
    /// A datatype for literals.
    Datatype,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Class => "Class",
            EntityKind::ObjectProperty => "ObjectProperty",
            EntityKind::DataProperty => "DataProperty",
            EntityKind::AnnotationProperty => "AnnotationProperty",
            EntityKind::NamedIndividual => "NamedIndividual",
            EntityKind::Datatype => "Datatype",
        };
        write!(f, "{name}")
    }
}

/// A named entity: an IRI tagged with what kind of thing it names.
///
/// The same IRI may legitimately occur with several kinds ("punning"); each
/// (kind, IRI) pair is a distinct entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub iri: Iri,
}

impl Entity {
    pub fn new(kind: EntityKind, iri: Iri) -> Self {
        Self { kind, iri }
    }

    pub fn class(iri: Iri) -> Self {
        Self::new(EntityKind::Class, iri)
    }

    pub fn object_property(iri: Iri) -> Self {
        Self::new(EntityKind::ObjectProperty, iri)
    }

    pub fn data_property(iri: Iri) -> Self {
        Self::new(EntityKind::DataProperty, iri)
    }

    pub fn annotation_property(iri: Iri) -> Self {
        Self::new(EntityKind::AnnotationProperty, iri)
    }

    pub fn named_individual(iri: Iri) -> Self {
        Self::new(EntityKind::NamedIndividual, iri)
    }

    pub fn datatype(iri: Iri) -> Self {
        Self::new(EntityKind::Datatype, iri)
    }

    /// Whether this entity is a class.
    pub fn is_class(&self) -> bool {
        self.kind == EntityKind::Class
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind, self.iri)
    }
}
