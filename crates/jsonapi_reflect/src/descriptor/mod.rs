//! Per-type serialization rules.
//!
//! ## Menu
//!
//! - [`DescriptorBuilder`]: records attribute, relationship, accessor and predicate declarations.
//! - [`ResourceDescriptor`]: the compiled, immutable result.
//! - [`AttributeRule`] / [`RelationshipRule`]: one compiled field each.
//! - [`DescriptorError`]: a declaration that cannot be compiled.
//!
//! A descriptor is never modified after [`DescriptorBuilder::build`]. Different
//! rules for the same type are expressed as a second descriptor with its own
//! [name](DescriptorBuilder::name).

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod error;
mod rules;

// -----------------------------------------------------------------------------
// Exports

pub use builder::DescriptorBuilder;
pub use error::DescriptorError;
pub use rules::{Accessor, Predicate};
pub use rules::{AttributeRule, RelationshipKind, RelationshipOptions, RelationshipRule};

// -----------------------------------------------------------------------------
// ResourceDescriptor

/// The registry name of the descriptor for `type_name`: `Author` -> `AuthorDescriptor`.
///
/// ```
/// assert_eq!(jsonapi_reflect::descriptor::descriptor_name("Author"), "AuthorDescriptor");
/// ```
#[inline]
pub fn descriptor_name(type_name: &str) -> String {
    format!("{type_name}Descriptor")
}

/// Name of the descriptor returned for types without a registered one.
pub const GENERIC_DESCRIPTOR: &str = "GenericDescriptor";

/// The compiled rule set of one type: ordered attributes and relationships.
///
/// Build one with [`ResourceDescriptor::builder`], share it behind an `Arc`.
#[derive(Debug)]
pub struct ResourceDescriptor {
    name: String,
    type_name: String,
    attributes: Vec<AttributeRule>,
    relationships: Vec<RelationshipRule>,
}

impl ResourceDescriptor {
    /// Starts declaring the descriptor of `type_name`.
    #[inline]
    pub fn builder(type_name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(type_name)
    }

    /// The descriptor used for unregistered types.
    ///
    /// It emits the resource identifier only: no attributes, no relationships.
    pub fn generic() -> Self {
        Self {
            name: String::from(GENERIC_DESCRIPTOR),
            type_name: String::new(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// The registry name, `<TypeName>Descriptor` unless overridden.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type this descriptor was declared for, empty for the generic descriptor.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns `true` for the fallback descriptor.
    #[inline]
    pub fn is_generic(&self) -> bool {
        self.name == GENERIC_DESCRIPTOR
    }

    /// Attributes in declaration order.
    #[inline]
    pub fn attributes(&self) -> &[AttributeRule] {
        &self.attributes
    }

    /// Relationships in declaration order.
    #[inline]
    pub fn relationships(&self) -> &[RelationshipRule] {
        &self.relationships
    }

    /// Returns the attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&AttributeRule> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Returns the relationship called `name`.
    pub fn relationship(&self, name: &str) -> Option<&RelationshipRule> {
        self.relationships.iter().find(|r| r.name() == name)
    }
}

// -----------------------------------------------------------------------------
// Tests
