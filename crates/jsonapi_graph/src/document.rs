use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};

use crate::context::SerializationContext;
use crate::object::ResourceObject;

// -----------------------------------------------------------------------------
// PrimaryData

/// The `data` member: one resource or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    One(ResourceObject),
    Many(Vec<ResourceObject>),
}

impl PrimaryData {
    /// The primary resources, in order.
    pub fn resources(&self) -> &[ResourceObject] {
        match self {
            PrimaryData::One(one) => core::slice::from_ref(one),
            PrimaryData::Many(many) => many,
        }
    }
}

impl Serialize for PrimaryData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PrimaryData::One(one) => one.serialize(serializer),
            PrimaryData::Many(many) => many.serialize(serializer),
        }
    }
}

// -----------------------------------------------------------------------------
// Document

/// A JSON:API document: `{ "data": .., "included": [..] }`.
///
/// `included` is left out when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    data: PrimaryData,
    included: Vec<ResourceObject>,
}

impl Document {
    /// Wraps `data` and collects `included` from `context`.
    ///
    /// `included` holds the built resource of every key in the included set
    /// that is not primary data, in the order the keys were discovered.
    /// Nothing is traversed here.
    pub fn assemble(data: PrimaryData, context: &SerializationContext<'_>) -> Self {
        debug_assert!(
            context.included_keys().all(|key| context.get(key).is_some()),
            "every included key must have been built"
        );
        let included = context
            .included_keys()
            .filter_map(|key| context.get(key))
            .cloned()
            .collect();
        Self { data, included }
    }

    #[inline]
    pub fn data(&self) -> &PrimaryData {
        &self.data
    }

    #[inline]
    pub fn included(&self) -> &[ResourceObject] {
        &self.included
    }

    pub fn into_parts(self) -> (PrimaryData, Vec<ResourceObject>) {
        (self.data, self.included)
    }

    /// Renders the document as a [`serde_json::Value`].
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Renders the document as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Renders the document as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + usize::from(!self.included.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("data", &self.data)?;
        if !self.included.is_empty() {
            map.serialize_entry("included", &self.included)?;
        }
        map.end()
    }
}

// -----------------------------------------------------------------------------
// Tests
