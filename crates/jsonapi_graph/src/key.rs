use core::fmt::{Debug, Display};
use std::sync::Arc;

use jsonapi_reflect::ResourceId;

use crate::object::ResourceIdentifier;

/// Identity of a resource inside one document: `(id, type)`.
///
/// The type is the emitted JSON:API type (`authors`), not the Rust-side
/// type name. Keys compare by value, two objects with the same id and
/// type are the same resource.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    id: ResourceId,
    ty: Arc<str>,
}

impl ResourceKey {
    #[inline]
    pub fn new(id: impl Into<ResourceId>, ty: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            ty: ty.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    #[inline]
    pub fn resource_type(&self) -> &Arc<str> {
        &self.ty
    }

    /// The `{ id, type }` reference form of this key.
    #[inline]
    pub fn to_identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.id.clone(), Arc::clone(&self.ty))
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.ty, self.id)
    }
}

impl Debug for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}
