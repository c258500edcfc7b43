//! The pieces of a document: resource objects, relationships and identifiers.
//!
//! All of them serialize to the JSON:API wire format through [`serde_core::Serialize`].
//! Empty `attributes` and `relationships` members are left out.

use std::sync::Arc;

use jsonapi_reflect::{ResourceId, Value};
use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};
use serde_json::Map;

use crate::key::ResourceKey;

// -----------------------------------------------------------------------------
// ResourceIdentifier

/// The `{ "id", "type" }` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    pub id: ResourceId,
    pub ty: Arc<str>,
}

impl ResourceIdentifier {
    #[inline]
    pub fn new(id: impl Into<ResourceId>, ty: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            ty: ty.into(),
        }
    }

    /// The identity this identifier refers to.
    #[inline]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.id.clone(), Arc::clone(&self.ty))
    }
}

impl Serialize for ResourceIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("type", &*self.ty)?;
        map.end()
    }
}

// -----------------------------------------------------------------------------
// RelationshipObject

/// Resource linkage of one relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipData {
    /// To-one linkage, `None` serializes as `null`.
    One(Option<ResourceIdentifier>),
    /// To-many linkage, in source order.
    Many(Vec<ResourceIdentifier>),
}

impl RelationshipData {
    /// Iterates the linked identifiers.
    pub fn identifiers(&self) -> impl Iterator<Item = &ResourceIdentifier> {
        let slice = match self {
            RelationshipData::One(one) => one.as_slice(),
            RelationshipData::Many(many) => many.as_slice(),
        };
        slice.iter()
    }
}

impl Serialize for RelationshipData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RelationshipData::One(one) => one.serialize(serializer),
            RelationshipData::Many(many) => many.serialize(serializer),
        }
    }
}

/// `{ "data": linkage }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipObject {
    pub data: RelationshipData,
}

impl Serialize for RelationshipObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("data", &self.data)?;
        map.end()
    }
}

// -----------------------------------------------------------------------------
// ResourceObject

/// A fully built resource: identity, attributes and relationships.
///
/// Attributes and relationships keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject {
    id: ResourceId,
    ty: Arc<str>,
    attributes: Map<String, Value>,
    relationships: Vec<(String, RelationshipObject)>,
}

impl ResourceObject {
    /// An object with no attributes and no relationships.
    pub fn new(key: &ResourceKey) -> Self {
        Self {
            id: key.id().clone(),
            ty: Arc::clone(key.resource_type()),
            attributes: Map::new(),
            relationships: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.ty
    }

    #[inline]
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.id.clone(), Arc::clone(&self.ty))
    }

    #[inline]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    #[inline]
    pub fn relationships(&self) -> &[(String, RelationshipObject)] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipObject> {
        self.relationships
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub(crate) fn insert_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(String::from(name), value);
    }

    pub(crate) fn push_relationship(&mut self, name: &str, relationship: RelationshipObject) {
        self.relationships.push((String::from(name), relationship));
    }
}

struct Relationships<'a>(&'a [(String, RelationshipObject)]);

impl Serialize for Relationships<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, relationship) in self.0 {
            map.serialize_entry(name, relationship)?;
        }
        map.end()
    }
}

impl Serialize for ResourceObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2
            + usize::from(!self.attributes.is_empty())
            + usize::from(!self.relationships.is_empty());

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("type", &*self.ty)?;
        if !self.attributes.is_empty() {
            map.serialize_entry("attributes", &self.attributes)?;
        }
        if !self.relationships.is_empty() {
            map.serialize_entry("relationships", &Relationships(&self.relationships))?;
        }
        map.end()
    }
}

// -----------------------------------------------------------------------------
// Tests
