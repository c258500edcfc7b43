use std::sync::Arc;

use jsonapi_utils::hash::HashSet;
use jsonapi_utils::{English, Inflector};
use serde_json::Value;

use super::rules::{Accessor, Predicate};
use super::{AttributeRule, DescriptorError, RelationshipKind, RelationshipOptions};
use super::{RelationshipRule, ResourceDescriptor};
use crate::resource::{AccessResult, Resource, Scope};

// -----------------------------------------------------------------------------
// Pending declarations

struct PendingRelationship {
    name: String,
    kind: Result<RelationshipKind, String>,
    options: RelationshipOptions,
    inferred: bool,
}

// -----------------------------------------------------------------------------
// DescriptorBuilder

/// Collects declarations for one type and compiles them into a [`ResourceDescriptor`].
///
/// Declarations are recorded in order; [`build`](Self::build) validates them and
/// produces the ordered `(name, accessor, predicate)` lists the serializer walks.
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::{RelationshipKind, RelationshipOptions, ResourceDescriptor, json};
///
/// let descriptor = ResourceDescriptor::builder("Post")
///     .attributes(["id", "title", "body", "author_id", "tag_ids"])
///     .has_many("comments", RelationshipOptions::included())
///     .accessor("body", |_post, _scope| Ok(json!("redacted")))
///     .build()
///     .unwrap();
///
/// assert_eq!(descriptor.name(), "PostDescriptor");
///
/// let attributes: Vec<_> = descriptor.attributes().iter().map(|a| a.name()).collect();
/// assert_eq!(attributes, ["title", "body"]);
///
/// let author = descriptor.relationship("author").unwrap();
/// assert_eq!(author.kind(), RelationshipKind::HasOne);
/// assert_eq!(author.foreign_key(), "author_id");
///
/// let tags = descriptor.relationship("tags").unwrap();
/// assert_eq!(tags.kind(), RelationshipKind::HasMany);
/// assert_eq!(tags.foreign_key(), "tag_ids");
///
/// assert!(descriptor.relationship("comments").unwrap().is_included());
/// ```
pub struct DescriptorBuilder {
    type_name: String,
    name: Option<String>,
    inflector: &'static dyn Inflector,
    attributes: Vec<String>,
    relationships: Vec<PendingRelationship>,
    accessors: Vec<(String, Accessor)>,
    predicates: Vec<(String, Predicate)>,
}

impl DescriptorBuilder {
    /// Starts a descriptor for the type called `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            inflector: &English,
            attributes: Vec::new(),
            relationships: Vec::new(),
            accessors: Vec::new(),
            predicates: Vec::new(),
        }
    }

    /// Registers the descriptor under `name` instead of `<TypeName>Descriptor`.
    ///
    /// Useful to keep several rule sets for the same type side by side.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Uses `inflector` for the relationship names and linkage types of this descriptor.
    pub fn inflector(mut self, inflector: &'static dyn Inflector) -> Self {
        self.inflector = inflector;
        self
    }

    /// Declares attributes.
    ///
    /// - `id` and `type` are skipped, they are structural.
    /// - `<stem>_id` declares a has-one relationship named `<stem>`.
    /// - `<stem>_ids` declares a has-many relationship named after the pluralized stem.
    /// - anything else becomes an attribute, in declaration order.
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.declare_attribute(name.as_ref());
        }
        self
    }

    /// Declares a single attribute, see [`attributes`](Self::attributes).
    pub fn attribute(mut self, name: impl AsRef<str>) -> Self {
        self.declare_attribute(name.as_ref());
        self
    }

    fn declare_attribute(&mut self, name: &str) {
        if name == "id" || name == "type" {
            return;
        }

        if let Some(stem) = name.strip_suffix("_ids") {
            let relationship = self.inflector.pluralize(stem);
            self.push_relationship(
                relationship,
                Ok(RelationshipKind::HasMany),
                RelationshipOptions::new(),
                true,
            );
        } else if let Some(stem) = name.strip_suffix("_id") {
            self.push_relationship(
                String::from(stem),
                Ok(RelationshipKind::HasOne),
                RelationshipOptions::new(),
                true,
            );
        } else {
            self.attributes.push(String::from(name));
        }
    }

    fn push_relationship(
        &mut self,
        name: String,
        kind: Result<RelationshipKind, String>,
        options: RelationshipOptions,
        inferred: bool,
    ) {
        self.relationships.push(PendingRelationship {
            name,
            kind,
            options,
            inferred,
        });
    }

    /// Declares a has-one relationship.
    pub fn has_one(mut self, name: impl Into<String>, options: RelationshipOptions) -> Self {
        self.push_relationship(name.into(), Ok(RelationshipKind::HasOne), options, false);
        self
    }

    /// Declares a has-many relationship.
    pub fn has_many(mut self, name: impl Into<String>, options: RelationshipOptions) -> Self {
        self.push_relationship(name.into(), Ok(RelationshipKind::HasMany), options, false);
        self
    }

    /// Declares a relationship whose kind is given by name, see [`RelationshipKind::parse`].
    ///
    /// An unrecognized kind makes [`build`](Self::build) fail.
    pub fn relationship(
        mut self,
        name: impl Into<String>,
        kind: &str,
        options: RelationshipOptions,
    ) -> Self {
        let kind = RelationshipKind::parse(kind).ok_or_else(|| String::from(kind));
        self.push_relationship(name.into(), kind, options, false);
        self
    }

    /// Defines the value of attribute `name` on the descriptor itself.
    ///
    /// The accessor takes precedence over reading the field from the object.
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&dyn Resource, Scope<'_>) -> AccessResult<Value> + Send + Sync + 'static,
    {
        self.accessors.push((name.into(), Arc::new(accessor)));
        self
    }

    /// Sets the `include_<name>` predicate of the attribute and/or relationship `name`.
    ///
    /// Without a predicate a field is always emitted. A relationship predicate
    /// only removes that relationship entry from the object being serialized;
    /// the related resource can still reach `included` through another path.
    pub fn include_if<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&dyn Resource, Scope<'_>) -> bool + Send + Sync + 'static,
    {
        self.predicates.push((name.into(), Arc::new(predicate)));
        self
    }

    /// Compiles the declarations.
    ///
    /// # Errors
    ///
    /// - [`DescriptorError::UnsupportedKind`] for a relationship declared with an unknown kind.
    /// - [`DescriptorError::Duplicate`] when a name is declared twice, across attributes and relationships.
    /// - [`DescriptorError::UnknownField`] for a predicate naming nothing declared.
    /// - [`DescriptorError::UnknownAttribute`] for an accessor naming no attribute.
    pub fn build(self) -> Result<ResourceDescriptor, DescriptorError> {
        let descriptor = self
            .name
            .unwrap_or_else(|| super::descriptor_name(&self.type_name));
        let inflector = self.inflector;

        {
            let mut seen: HashSet<&str> = HashSet::default();
            for name in self
                .attributes
                .iter()
                .chain(self.relationships.iter().map(|r| &r.name))
            {
                if !seen.insert(name.as_str()) {
                    return Err(DescriptorError::Duplicate {
                        descriptor,
                        name: name.clone(),
                    });
                }
            }

            for (name, _) in &self.predicates {
                if !seen.contains(name.as_str()) {
                    return Err(DescriptorError::UnknownField {
                        descriptor,
                        name: name.clone(),
                    });
                }
            }
        }

        for (name, _) in &self.accessors {
            if !self.attributes.contains(name) {
                return Err(DescriptorError::UnknownAttribute {
                    descriptor,
                    name: name.clone(),
                });
            }
        }

        // Last declaration wins, like redefining a method.
        let predicate_of = |name: &str| {
            self.predicates
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, p)| Arc::clone(p))
        };
        let accessor_of = |name: &str| {
            self.accessors
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, a)| Arc::clone(a))
        };

        let attributes = self
            .attributes
            .iter()
            .map(|name| AttributeRule {
                name: name.clone(),
                accessor: accessor_of(name),
                predicate: predicate_of(name),
            })
            .collect();

        let mut relationships = Vec::with_capacity(self.relationships.len());
        for pending in self.relationships {
            let PendingRelationship {
                name,
                kind,
                mut options,
                inferred,
            } = pending;

            let kind = match kind {
                Ok(kind) => kind,
                Err(kind) => {
                    return Err(DescriptorError::UnsupportedKind {
                        descriptor,
                        name,
                        kind,
                    });
                }
            };

            let foreign_key = match kind {
                RelationshipKind::HasOne => format!("{name}_id"),
                RelationshipKind::HasMany => format!("{}_ids", inflector.singularize(&name)),
            };
            let related_type: Arc<str> = match options.take_type_name() {
                Some(type_name) => type_name.into(),
                None => inflector.pluralize(&name).into(),
            };

            relationships.push(RelationshipRule {
                predicate: predicate_of(&name),
                include: options.is_included(),
                name,
                kind,
                inferred,
                foreign_key,
                related_type,
            });
        }

        log::trace!("compiled descriptor {descriptor}");

        Ok(ResourceDescriptor {
            name: descriptor,
            type_name: self.type_name,
            attributes,
            relationships,
        })
    }
}

// -----------------------------------------------------------------------------
// Tests
