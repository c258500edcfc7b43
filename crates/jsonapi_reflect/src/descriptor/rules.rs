use core::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::resource::{AccessResult, Resource, Scope};

// -----------------------------------------------------------------------------
// Callbacks

/// An `include_<name>` predicate: decides per object whether a field is emitted.
pub type Predicate = Arc<dyn Fn(&dyn Resource, Scope<'_>) -> bool + Send + Sync>;

/// A descriptor-defined ("virtual") attribute reader.
pub type Accessor = Arc<dyn Fn(&dyn Resource, Scope<'_>) -> AccessResult<Value> + Send + Sync>;

// -----------------------------------------------------------------------------
// RelationshipKind

/// The cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    HasOne,
    HasMany,
}

impl RelationshipKind {
    /// Parses a declared kind.
    ///
    /// `belongs_to` is accepted as a spelling of `has_one`: on the wire both
    /// are a single resource identifier.
    ///
    /// ```
    /// use jsonapi_reflect::RelationshipKind;
    ///
    /// assert_eq!(RelationshipKind::parse("has_many"), Some(RelationshipKind::HasMany));
    /// assert_eq!(RelationshipKind::parse("belongs_to"), Some(RelationshipKind::HasOne));
    /// assert_eq!(RelationshipKind::parse("has_some"), None);
    /// ```
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "has_one" | "belongs_to" => Some(RelationshipKind::HasOne),
            "has_many" => Some(RelationshipKind::HasMany),
            _ => None,
        }
    }

    /// Returns the declaration spelling of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::HasOne => "has_one",
            RelationshipKind::HasMany => "has_many",
        }
    }
}

// -----------------------------------------------------------------------------
// RelationshipOptions

/// Options of an explicitly declared relationship.
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::RelationshipOptions;
///
/// let options = RelationshipOptions::new().include(true).type_name("people");
/// assert!(options.is_included());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelationshipOptions {
    include: bool,
    type_name: Option<String>,
}

impl RelationshipOptions {
    /// Identifier-only linkage, JSON:API type derived from the relationship name.
    #[inline]
    pub const fn new() -> Self {
        Self {
            include: false,
            type_name: None,
        }
    }

    /// Shorthand for `RelationshipOptions::new().include(true)`.
    #[inline]
    pub const fn included() -> Self {
        Self {
            include: true,
            type_name: None,
        }
    }

    /// Inline the related resources into `included`.
    #[inline]
    pub const fn include(mut self, include: bool) -> Self {
        self.include = include;
        self
    }

    /// Overrides the JSON:API type written into the linkage identifiers.
    ///
    /// By default it is the pluralized relationship name. Only identifier-only
    /// linkage uses it: an [included](Self::include) relationship links each
    /// related object by its own resource type, so the two can differ.
    #[inline]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Returns `true` if related resources are inlined.
    #[inline]
    pub const fn is_included(&self) -> bool {
        self.include
    }

    pub(super) fn take_type_name(&mut self) -> Option<String> {
        self.type_name.take()
    }
}

// -----------------------------------------------------------------------------
// AttributeRule

/// A compiled attribute: `(name, accessor, predicate)`.
#[derive(Clone)]
pub struct AttributeRule {
    pub(super) name: String,
    pub(super) accessor: Option<Accessor>,
    pub(super) predicate: Option<Predicate>,
}

impl AttributeRule {
    /// The attribute name, also its key in `attributes`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the value comes from the descriptor rather than the object.
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.accessor.is_some()
    }

    /// Evaluates the `include_<name>` predicate; `true` when none was declared.
    #[inline]
    pub fn should_include(&self, object: &dyn Resource, scope: Scope<'_>) -> bool {
        self.predicate.as_ref().is_none_or(|p| p(object, scope))
    }

    /// Reads the value, preferring the descriptor accessor over the object field.
    pub fn value(&self, object: &dyn Resource, scope: Scope<'_>) -> AccessResult<Value> {
        match &self.accessor {
            Some(accessor) => accessor(object, scope),
            None => object.attribute(&self.name),
        }
    }
}

impl Debug for AttributeRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeRule")
            .field("name", &self.name)
            .field("virtual", &self.accessor.is_some())
            .field("conditional", &self.predicate.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// RelationshipRule

/// A compiled relationship.
///
/// Accessor names and the linkage type are computed when the descriptor is
/// built, so serialization does no inflection.
#[derive(Clone)]
pub struct RelationshipRule {
    pub(super) name: String,
    pub(super) kind: RelationshipKind,
    pub(super) include: bool,
    pub(super) inferred: bool,
    pub(super) foreign_key: String,
    pub(super) related_type: Arc<str>,
    pub(super) predicate: Option<Predicate>,
}

impl RelationshipRule {
    /// The relationship name, also its key in `relationships`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    /// Returns `true` if related resources are inlined into `included`.
    #[inline]
    pub fn is_included(&self) -> bool {
        self.include
    }

    /// Returns `true` if the rule was inferred from a `_id` / `_ids` attribute.
    #[inline]
    pub fn is_inferred(&self) -> bool {
        self.inferred
    }

    /// The foreign key accessor: `<name>_id` for has-one, `<singular>_ids` for has-many.
    #[inline]
    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    /// The JSON:API type written into linkage identifiers.
    #[inline]
    pub fn related_type(&self) -> &Arc<str> {
        &self.related_type
    }

    /// Evaluates the `include_<name>` predicate; `true` when none was declared.
    #[inline]
    pub fn should_include(&self, object: &dyn Resource, scope: Scope<'_>) -> bool {
        self.predicate.as_ref().is_none_or(|p| p(object, scope))
    }
}

impl Debug for RelationshipRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RelationshipRule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("include", &self.include)
            .field("inferred", &self.inferred)
            .field("foreign_key", &self.foreign_key)
            .field("related_type", &self.related_type)
            .field("conditional", &self.predicate.is_some())
            .finish()
    }
}
