//! The interface between the serializer and the domain objects it reads.
//!
//! The serializer never owns or mutates domain objects. It asks a
//! [`Resource`] for its identifier, its type name, attribute values and
//! related objects, and turns the answers into resource objects.
//!
//! Accessor names follow the conventions of an object-relational layer:
//! a has-one relationship `author` may expose a foreign key accessor
//! `author_id`; a has-many relationship `posts` may expose a bulk accessor
//! `post_ids`.

use core::any::Any;
use core::fmt::{Debug, Display};
use core::num::TryFromIntError;

use serde_core::{Serialize, Serializer};
use serde_json::Value;
use std::rc::Rc;
use thiserror::Error;

// -----------------------------------------------------------------------------
// ResourceId

/// The `id` of a resource.
///
/// Identifiers are compared by value: two objects of the same type with
/// equal ids are the same resource, even if they are distinct instances.
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::ResourceId;
///
/// assert_eq!(ResourceId::from(1), ResourceId::Int(1));
/// assert_eq!(serde_json::to_string(&ResourceId::from(7)).unwrap(), "7");
/// assert_eq!(serde_json::to_string(&ResourceId::from("a7")).unwrap(), r#""a7""#);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// A numeric id, emitted as a JSON number.
    Int(i64),
    /// A textual id (uuid, slug...), emitted as a JSON string.
    Str(String),
}

impl Debug for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ResourceId::Int(id) => Debug::fmt(id, f),
            ResourceId::Str(id) => Debug::fmt(id, f),
        }
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ResourceId::Int(id) => Display::fmt(id, f),
            ResourceId::Str(id) => Display::fmt(id, f),
        }
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResourceId::Int(id) => serializer.serialize_i64(*id),
            ResourceId::Str(id) => serializer.serialize_str(id),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ResourceId {
                #[inline]
                fn from(value: $ty) -> Self {
                    ResourceId::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Wider integers convert only when they fit in an `i64`.
macro_rules! impl_try_from_int {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for ResourceId {
                type Error = TryFromIntError;

                #[inline]
                fn try_from(value: $ty) -> Result<Self, Self::Error> {
                    i64::try_from(value).map(ResourceId::Int)
                }
            }
        )*
    };
}

impl_try_from_int!(isize, usize, u64, i128, u128);

impl From<&str> for ResourceId {
    #[inline]
    fn from(value: &str) -> Self {
        ResourceId::Str(String::from(value))
    }
}

impl From<String> for ResourceId {
    #[inline]
    fn from(value: String) -> Self {
        ResourceId::Str(value)
    }
}

impl From<ResourceId> for Value {
    fn from(value: ResourceId) -> Self {
        match value {
            ResourceId::Int(id) => Value::from(id),
            ResourceId::Str(id) => Value::String(id),
        }
    }
}

// -----------------------------------------------------------------------------
// Scope

/// An opaque, caller supplied value handed to every inclusion predicate.
///
/// Typically the current user, so predicates can make authorization decisions.
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::Scope;
///
/// struct User { admin: bool }
///
/// let user = User { admin: true };
/// let scope = Scope::new(&user);
///
/// assert!(scope.get::<User>().is_some_and(|u| u.admin));
/// assert!(scope.get::<String>().is_none());
/// assert!(Scope::none().get::<User>().is_none());
/// ```
#[derive(Clone, Copy, Default)]
pub struct Scope<'a>(Option<&'a dyn Any>);

impl<'a> Scope<'a> {
    /// A scope carrying nothing.
    #[inline]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Wraps a reference to any `'static` value.
    #[inline]
    pub fn new<T: Any>(value: &'a T) -> Self {
        Self(Some(value))
    }

    /// Returns the scope value if it has type `T`.
    #[inline]
    pub fn get<T: Any>(&self) -> Option<&'a T> {
        self.0.and_then(<dyn Any>::downcast_ref::<T>)
    }

    /// Returns `true` if no value was supplied.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl Debug for Scope<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Scope(..)"),
            None => f.write_str("Scope(None)"),
        }
    }
}

// -----------------------------------------------------------------------------
// AccessError

/// A failure reported by a [`Resource`] accessor.
///
/// The serializer never inspects or recovers from these; they are returned
/// to the caller as they were produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccessError {
    #[error("type `{type_name}` has no accessor `{name}`")]
    Unsupported { type_name: String, name: String },

    #[error(transparent)]
    Custom(Box<dyn core::error::Error + Send + Sync>),
}

impl AccessError {
    /// The object does not expose an accessor called `name`.
    #[cold]
    pub fn unsupported(type_name: &str, name: &str) -> Self {
        AccessError::Unsupported {
            type_name: String::from(type_name),
            name: String::from(name),
        }
    }

    /// Wraps an error raised by the domain layer (a failed load, a broken row...).
    #[cold]
    pub fn custom(error: impl Into<Box<dyn core::error::Error + Send + Sync>>) -> Self {
        AccessError::Custom(error.into())
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

// -----------------------------------------------------------------------------
// Resource

/// A shared handle to a related domain object.
pub type ResourceRef = Rc<dyn Resource>;

/// A domain object that can be serialized as a JSON:API resource.
///
/// Only [`id`](Resource::id), [`type_name`](Resource::type_name) and
/// [`attribute`](Resource::attribute) are required. Relationship accessors
/// default to "not available"; implement the ones your relationships need.
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::{AccessError, AccessResult, Resource, ResourceId, Value};
///
/// struct Author {
///     id: i64,
///     name: String,
/// }
///
/// impl Resource for Author {
///     fn id(&self) -> ResourceId {
///         self.id.into()
///     }
///
///     fn type_name(&self) -> &str {
///         "Author"
///     }
///
///     fn attribute(&self, name: &str) -> AccessResult<Value> {
///         match name {
///             "name" => Ok(self.name.clone().into()),
///             _ => Err(AccessError::unsupported(self.type_name(), name)),
///         }
///     }
/// }
///
/// let author = Author { id: 1, name: "fred".into() };
/// assert_eq!(author.attribute("name").unwrap(), "fred");
/// assert!(author.foreign_key("publisher_id").is_none());
/// ```
pub trait Resource {
    /// The resource identifier.
    fn id(&self) -> ResourceId;

    /// The type name, e.g. `Author`. Lowercased and pluralized it becomes the JSON:API `type`.
    fn type_name(&self) -> &str;

    /// Reads the field `name`.
    fn attribute(&self, name: &str) -> AccessResult<Value>;

    /// Reads a has-one foreign key such as `author_id`.
    ///
    /// Returns `None` when the object has no such accessor, `Some(Ok(None))`
    /// when the key is null.
    fn foreign_key(&self, accessor: &str) -> Option<AccessResult<Option<ResourceId>>> {
        let _ = accessor;
        None
    }

    /// Returns the object related through the has-one relationship `name`.
    fn related_one(&self, name: &str) -> AccessResult<Option<ResourceRef>> {
        Err(AccessError::unsupported(self.type_name(), name))
    }

    /// Reads a has-many bulk foreign key accessor such as `post_ids`.
    ///
    /// Returns `None` when the object has no such accessor.
    fn foreign_keys(&self, accessor: &str) -> Option<AccessResult<Vec<ResourceId>>> {
        let _ = accessor;
        None
    }

    /// Returns the has-many association `name` if it is already in memory.
    ///
    /// `None` means "not loaded", including when `name` is not an
    /// association at all. Never an error.
    fn loaded_many(&self, name: &str) -> Option<Vec<ResourceRef>> {
        let _ = name;
        None
    }

    /// Loads the objects related through the has-many relationship `name`.
    fn related_many(&self, name: &str) -> AccessResult<Vec<ResourceRef>> {
        Err(AccessError::unsupported(self.type_name(), name))
    }
}

impl<T: Resource + ?Sized> Resource for Rc<T> {
    #[inline]
    fn id(&self) -> ResourceId {
        (**self).id()
    }

    #[inline]
    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    #[inline]
    fn attribute(&self, name: &str) -> AccessResult<Value> {
        (**self).attribute(name)
    }

    #[inline]
    fn foreign_key(&self, accessor: &str) -> Option<AccessResult<Option<ResourceId>>> {
        (**self).foreign_key(accessor)
    }

    #[inline]
    fn related_one(&self, name: &str) -> AccessResult<Option<ResourceRef>> {
        (**self).related_one(name)
    }

    #[inline]
    fn foreign_keys(&self, accessor: &str) -> Option<AccessResult<Vec<ResourceId>>> {
        (**self).foreign_keys(accessor)
    }

    #[inline]
    fn loaded_many(&self, name: &str) -> Option<Vec<ResourceRef>> {
        (**self).loaded_many(name)
    }

    #[inline]
    fn related_many(&self, name: &str) -> AccessResult<Vec<ResourceRef>> {
        (**self).related_many(name)
    }
}

// -----------------------------------------------------------------------------
// Tests
