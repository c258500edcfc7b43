#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

pub mod builder;
pub mod context;
pub mod document;
pub mod error;
pub mod key;
pub mod object;
pub mod serializer;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use builder::GraphBuilder;
pub use context::SerializationContext;
pub use document::{Document, PrimaryData};
pub use error::SerializeError;
pub use key::ResourceKey;
pub use object::{RelationshipData, RelationshipObject, ResourceIdentifier, ResourceObject};
pub use serializer::{CollectionSerializer, ResourceSerializer};
