//! The axiom model: tagged logical statements with nested annotations.
//!
//! An [`Axiom`] is an immutable value representing one statement about
//! entities. Axioms expose their *signature* (the entities and IRIs they
//! mention, recursively through nested annotations) and render to a
//! deterministic functional-style text form used as the final tiebreaker
//! when ordering change diffs.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityKind, Iri};

/// Maximum depth of annotations-on-annotations that signature extraction
/// will walk. Frames beyond this are skipped (with a warning) rather than
/// recursed into, so adversarial input cannot blow the stack.
pub const MAX_ANNOTATION_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Literals and annotations
// ---------------------------------------------------------------------------

/// A literal value with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub lang: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            lang: None,
        }
    }

    pub fn with_lang(lexical: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            lang: Some(lang.into()),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.lang {
            Some(lang) => write!(f, "\"{}\"@{lang}", self.lexical),
            None => write!(f, "\"{}\"", self.lexical),
        }
    }
}

/// The value of an annotation: either an IRI or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationValue {
    Iri(Iri),
    Literal(Literal),
}

impl std::fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationValue::Iri(iri) => write!(f, "{iri}"),
            AnnotationValue::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// One annotation: a property, a value, and optional annotations on the
/// annotation itself. The nesting is first-class: IRIs mentioned at any
/// depth count as mentions by the root axiom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub property: Iri,
    pub value: AnnotationValue,
    pub annotations: Vec<Annotation>,
}

impl Annotation {
    pub fn new(property: Iri, value: AnnotationValue) -> Self {
        Self {
            property,
            value,
            annotations: Vec::new(),
        }
    }

    /// Attach a nested annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Annotation(")?;
        for nested in &self.annotations {
            write!(f, "{nested} ")?;
        }
        write!(f, "{} {})", self.property, self.value)
    }
}

// ---------------------------------------------------------------------------
// Axiom types
// ---------------------------------------------------------------------------

/// Discriminant for the axiom variants.
///
/// The declaration order here is also the fixed display ordering used by the
/// change-diff comparator (logical statements before annotation statements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxiomType {
    Declaration,
    SubClassOf,
    EquivalentClasses,
    DataPropertyAssertion,
    AnnotationAssertion,
    AnnotationPropertyDomain,
    AnnotationPropertyRange,
}

impl AxiomType {
    /// All axiom types in display order.
    pub const ALL: [AxiomType; 7] = [
        AxiomType::Declaration,
        AxiomType::SubClassOf,
        AxiomType::EquivalentClasses,
        AxiomType::DataPropertyAssertion,
        AxiomType::AnnotationAssertion,
        AxiomType::AnnotationPropertyDomain,
        AxiomType::AnnotationPropertyRange,
    ];

    /// Position of this type in the fixed display ordering.
    pub fn ordering_index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Axioms
// ---------------------------------------------------------------------------

/// One logical statement about entities.
///
/// Equality and hashing are structural (bit-for-bit over the whole tree,
/// annotations included): a Remove only reverses an Add of the identical
/// axiom, never one that merely shares a subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axiom {
    Declaration {
        entity: Entity,
        annotations: Vec<Annotation>,
    },
    SubClassOf {
        sub_class: Iri,
        super_class: Iri,
        annotations: Vec<Annotation>,
    },
    EquivalentClasses {
        classes: Vec<Iri>,
        annotations: Vec<Annotation>,
    },
    AnnotationAssertion {
        property: Iri,
        subject: Iri,
        value: AnnotationValue,
        annotations: Vec<Annotation>,
    },
    AnnotationPropertyDomain {
        property: Iri,
        domain: Iri,
        annotations: Vec<Annotation>,
    },
    AnnotationPropertyRange {
        property: Iri,
        range: Iri,
        annotations: Vec<Annotation>,
    },
    DataPropertyAssertion {
        property: Iri,
        subject: Iri,
        value: Literal,
        annotations: Vec<Annotation>,
    },
}

impl Axiom {
    pub fn declaration(entity: Entity) -> Self {
        Axiom::Declaration {
            entity,
            annotations: Vec::new(),
        }
    }

    pub fn sub_class_of(sub_class: Iri, super_class: Iri) -> Self {
        Axiom::SubClassOf {
            sub_class,
            super_class,
            annotations: Vec::new(),
        }
    }

    pub fn equivalent_classes(classes: Vec<Iri>) -> Self {
        Axiom::EquivalentClasses {
            classes,
            annotations: Vec::new(),
        }
    }

    pub fn annotation_assertion(property: Iri, subject: Iri, value: AnnotationValue) -> Self {
        Axiom::AnnotationAssertion {
            property,
            subject,
            value,
            annotations: Vec::new(),
        }
    }

    pub fn annotation_property_domain(property: Iri, domain: Iri) -> Self {
        Axiom::AnnotationPropertyDomain {
            property,
            domain,
            annotations: Vec::new(),
        }
    }

    pub fn annotation_property_range(property: Iri, range: Iri) -> Self {
        Axiom::AnnotationPropertyRange {
            property,
            range,
            annotations: Vec::new(),
        }
    }

    pub fn data_property_assertion(property: Iri, subject: Iri, value: Literal) -> Self {
        Axiom::DataPropertyAssertion {
            property,
            subject,
            value,
            annotations: Vec::new(),
        }
    }

    /// Attach an axiom-level annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations_mut().push(annotation);
        self
    }

    /// The discriminant of this axiom.
    pub fn axiom_type(&self) -> AxiomType {
        match self {
            Axiom::Declaration { .. } => AxiomType::Declaration,
            Axiom::SubClassOf { .. } => AxiomType::SubClassOf,
            Axiom::EquivalentClasses { .. } => AxiomType::EquivalentClasses,
            Axiom::AnnotationAssertion { .. } => AxiomType::AnnotationAssertion,
            Axiom::AnnotationPropertyDomain { .. } => AxiomType::AnnotationPropertyDomain,
            Axiom::AnnotationPropertyRange { .. } => AxiomType::AnnotationPropertyRange,
            Axiom::DataPropertyAssertion { .. } => AxiomType::DataPropertyAssertion,
        }
    }

    /// Whether this is a logical axiom (as opposed to a declaration or a
    /// purely annotative statement).
    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            Axiom::SubClassOf { .. }
                | Axiom::EquivalentClasses { .. }
                | Axiom::DataPropertyAssertion { .. }
        )
    }

    /// The axiom-level annotations.
    pub fn annotations(&self) -> &[Annotation] {
        match self {
            Axiom::Declaration { annotations, .. }
            | Axiom::SubClassOf { annotations, .. }
            | Axiom::EquivalentClasses { annotations, .. }
            | Axiom::AnnotationAssertion { annotations, .. }
            | Axiom::AnnotationPropertyDomain { annotations, .. }
            | Axiom::AnnotationPropertyRange { annotations, .. }
            | Axiom::DataPropertyAssertion { annotations, .. } => annotations,
        }
    }

    fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        match self {
            Axiom::Declaration { annotations, .. }
            | Axiom::SubClassOf { annotations, .. }
            | Axiom::EquivalentClasses { annotations, .. }
            | Axiom::AnnotationAssertion { annotations, .. }
            | Axiom::AnnotationPropertyDomain { annotations, .. }
            | Axiom::AnnotationPropertyRange { annotations, .. }
            | Axiom::DataPropertyAssertion { annotations, .. } => annotations,
        }
    }

    /// The subject entity IRI used to group diff lines, if the axiom has one.
    pub fn subject(&self) -> Option<&Iri> {
        match self {
            Axiom::Declaration { entity, .. } => Some(&entity.iri),
            Axiom::SubClassOf { sub_class, .. } => Some(sub_class),
            Axiom::EquivalentClasses { classes, .. } => classes.first(),
            Axiom::AnnotationAssertion { subject, .. } => Some(subject),
            Axiom::AnnotationPropertyDomain { property, .. } => Some(property),
            Axiom::AnnotationPropertyRange { property, .. } => Some(property),
            Axiom::DataPropertyAssertion { subject, .. } => Some(subject),
        }
    }

    /// The typed entities this axiom mentions, including the annotation
    /// properties of nested annotations at every depth.
    pub fn signature(&self) -> Vec<Entity> {
        let mut out = Vec::new();
        match self {
            Axiom::Declaration { entity, .. } => out.push(entity.clone()),
            Axiom::SubClassOf {
                sub_class,
                super_class,
                ..
            } => {
                out.push(Entity::class(sub_class.clone()));
                out.push(Entity::class(super_class.clone()));
            }
            Axiom::EquivalentClasses { classes, .. } => {
                out.extend(classes.iter().cloned().map(Entity::class));
            }
            Axiom::AnnotationAssertion { property, .. } => {
                out.push(Entity::annotation_property(property.clone()));
            }
            Axiom::AnnotationPropertyDomain { property, .. }
            | Axiom::AnnotationPropertyRange { property, .. } => {
                out.push(Entity::annotation_property(property.clone()));
            }
            Axiom::DataPropertyAssertion {
                property, subject, ..
            } => {
                out.push(Entity::data_property(property.clone()));
                out.push(Entity::named_individual(subject.clone()));
            }
        }
        visit_annotations(self.annotations(), &mut |annotation| {
            out.push(Entity::annotation_property(annotation.property.clone()));
        });
        out
    }

    /// The classes in this axiom's signature, deduplicated.
    pub fn classes_in_signature(&self) -> Vec<Iri> {
        let mut seen = std::collections::HashSet::new();
        self.signature()
            .into_iter()
            .filter(|entity| entity.kind == EntityKind::Class)
            .map(|entity| entity.iri)
            .filter(|iri| seen.insert(iri.clone()))
            .collect()
    }

    /// Every IRI this axiom mentions anywhere, including IRIs nested inside
    /// annotations-on-annotations. These are the keys of the reference-by-IRI
    /// index: an IRI mention at any depth points back to the root axiom.
    pub fn referenced_iris(&self) -> Vec<Iri> {
        let mut out = Vec::new();
        match self {
            Axiom::Declaration { entity, .. } => out.push(entity.iri.clone()),
            Axiom::SubClassOf {
                sub_class,
                super_class,
                ..
            } => {
                out.push(sub_class.clone());
                out.push(super_class.clone());
            }
            Axiom::EquivalentClasses { classes, .. } => out.extend(classes.iter().cloned()),
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
                ..
            } => {
                out.push(property.clone());
                out.push(subject.clone());
                if let AnnotationValue::Iri(iri) = value {
                    out.push(iri.clone());
                }
            }
            Axiom::AnnotationPropertyDomain {
                property, domain, ..
            } => {
                out.push(property.clone());
                out.push(domain.clone());
            }
            Axiom::AnnotationPropertyRange {
                property, range, ..
            } => {
                out.push(property.clone());
                out.push(range.clone());
            }
            Axiom::DataPropertyAssertion {
                property, subject, ..
            } => {
                out.push(property.clone());
                out.push(subject.clone());
            }
        }
        visit_annotations(self.annotations(), &mut |annotation| {
            out.push(annotation.property.clone());
            if let AnnotationValue::Iri(iri) = &annotation.value {
                out.push(iri.clone());
            }
        });
        let mut seen = std::collections::HashSet::new();
        out.retain(|iri| seen.insert(iri.clone()));
        out
    }
}

/// Walk an annotation tree with an explicit work stack, visiting every
/// annotation at every nesting level. Frames deeper than
/// [`MAX_ANNOTATION_DEPTH`] are skipped with a warning.
fn visit_annotations<'a>(roots: &'a [Annotation], visit: &mut impl FnMut(&'a Annotation)) {
    let mut stack: Vec<(&'a Annotation, usize)> =
        roots.iter().rev().map(|ann| (ann, 0)).collect();
    while let Some((annotation, depth)) = stack.pop() {
        if depth >= MAX_ANNOTATION_DEPTH {
            tracing::warn!(
                depth,
                "annotation nesting exceeds maximum depth; deeper levels not indexed"
            );
            continue;
        }
        visit(annotation);
        for nested in annotation.annotations.iter().rev() {
            stack.push((nested, depth + 1));
        }
    }
}

impl std::fmt::Display for Axiom {
    /// Deterministic functional-style rendering. Two structurally equal
    /// axioms always render identically, which makes this the final
    /// tiebreaker for diff ordering.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let write_annotations =
            |f: &mut std::fmt::Formatter<'_>, annotations: &[Annotation]| -> std::fmt::Result {
                for annotation in annotations {
                    write!(f, "{annotation} ")?;
                }
                Ok(())
            };
        match self {
            Axiom::Declaration {
                entity,
                annotations,
            } => {
                write!(f, "Declaration(")?;
                write_annotations(f, annotations)?;
                write!(f, "{entity})")
            }
            Axiom::SubClassOf {
                sub_class,
                super_class,
                annotations,
            } => {
                write!(f, "SubClassOf(")?;
                write_annotations(f, annotations)?;
                write!(f, "{sub_class} {super_class})")
            }
            Axiom::EquivalentClasses {
                classes,
                annotations,
            } => {
                write!(f, "EquivalentClasses(")?;
                write_annotations(f, annotations)?;
                let mut first = true;
                for class in classes {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{class}")?;
                    first = false;
                }
                write!(f, ")")
            }
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
                annotations,
            } => {
                write!(f, "AnnotationAssertion(")?;
                write_annotations(f, annotations)?;
                write!(f, "{property} {subject} {value})")
            }
            Axiom::AnnotationPropertyDomain {
                property,
                domain,
                annotations,
            } => {
                write!(f, "AnnotationPropertyDomain(")?;
                write_annotations(f, annotations)?;
                write!(f, "{property} {domain})")
            }
            Axiom::AnnotationPropertyRange {
                property,
                range,
                annotations,
            } => {
                write!(f, "AnnotationPropertyRange(")?;
                write_annotations(f, annotations)?;
                write!(f, "{property} {range})")
            }
            Axiom::DataPropertyAssertion {
                property,
                subject,
                value,
                annotations,
            } => {
                write!(f, "DataPropertyAssertion(")?;
                write_annotations(f, annotations)?;
                write!(f, "{property} {subject} {value})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/ont#{s}")).unwrap()
    }

    #[test]
    fn sub_class_of_signature() {
        let ax = Axiom::sub_class_of(iri("Dog"), iri("Animal"));
        let sig = ax.signature();
        assert_eq!(sig.len(), 2);
        assert!(sig.contains(&Entity::class(iri("Dog"))));
        assert!(sig.contains(&Entity::class(iri("Animal"))));
    }

    #[test]
    fn structural_equality_includes_annotations() {
        let plain = Axiom::sub_class_of(iri("Dog"), iri("Animal"));
        let annotated = Axiom::sub_class_of(iri("Dog"), iri("Animal")).with_annotation(
            Annotation::new(iri("comment"), AnnotationValue::Literal(Literal::plain("x"))),
        );
        assert_ne!(plain, annotated);
        assert_eq!(plain, Axiom::sub_class_of(iri("Dog"), iri("Animal")));
    }

    #[test]
    fn nested_annotation_iris_are_referenced() {
        // AnnotationAssertion annotated by an annotation whose own nested
        // annotation carries an IRI value: every level must surface as a
        // mention of the root axiom.
        let deep = Annotation::new(iri("source"), AnnotationValue::Iri(iri("DeepTarget")));
        let outer = Annotation::new(
            iri("note"),
            AnnotationValue::Literal(Literal::plain("hi")),
        )
        .with_annotation(deep);
        let ax = Axiom::annotation_assertion(
            iri("label"),
            iri("Dog"),
            AnnotationValue::Literal(Literal::with_lang("Hund", "de")),
        )
        .with_annotation(outer);

        let iris = ax.referenced_iris();
        assert!(iris.contains(&iri("label")));
        assert!(iris.contains(&iri("Dog")));
        assert!(iris.contains(&iri("note")));
        assert!(iris.contains(&iri("source")));
        assert!(iris.contains(&iri("DeepTarget")));
    }

    #[test]
    fn referenced_iris_are_deduplicated() {
        let ax = Axiom::sub_class_of(iri("Dog"), iri("Dog"));
        assert_eq!(ax.referenced_iris().len(), 1);
    }

    #[test]
    fn annotation_depth_guard_terminates() {
        // Build a chain of annotations deeper than the guard.
        let mut annotation =
            Annotation::new(iri("p"), AnnotationValue::Literal(Literal::plain("leaf")));
        for _ in 0..(MAX_ANNOTATION_DEPTH + 10) {
            annotation = Annotation::new(iri("p"), AnnotationValue::Literal(Literal::plain("n")))
                .with_annotation(annotation);
        }
        let ax = Axiom::annotation_assertion(
            iri("p"),
            iri("s"),
            AnnotationValue::Literal(Literal::plain("v")),
        )
        .with_annotation(annotation);
        // Must terminate and report at most the guarded depth.
        let sig = ax.signature();
        assert!(sig.len() <= MAX_ANNOTATION_DEPTH + 2);
    }

    #[test]
    fn rendering_is_deterministic() {
        let ax = Axiom::equivalent_classes(vec![iri("A"), iri("B")]);
        assert_eq!(ax.to_string(), ax.clone().to_string());
        assert_eq!(
            ax.to_string(),
            "EquivalentClasses(<http://example.org/ont#A> <http://example.org/ont#B>)"
        );
    }

    #[test]
    fn axiom_type_ordering_puts_logical_before_annotations() {
        assert!(
            AxiomType::SubClassOf.ordering_index()
                < AxiomType::AnnotationAssertion.ordering_index()
        );
        assert_eq!(AxiomType::ALL.len(), 7);
    }

    #[test]
    fn subject_extraction() {
        assert_eq!(
            Axiom::sub_class_of(iri("Dog"), iri("Animal")).subject(),
            Some(&iri("Dog"))
        );
        assert_eq!(
            Axiom::annotation_assertion(
                iri("label"),
                iri("Dog"),
                AnnotationValue::Literal(Literal::plain("dog"))
            )
            .subject(),
            Some(&iri("Dog"))
        );
    }

    #[test]
    fn classes_in_signature_excludes_properties() {
        let ax = Axiom::data_property_assertion(
            iri("age"),
            iri("rex"),
            Literal::plain("7"),
        );
        assert!(ax.classes_in_signature().is_empty());
    }
}
