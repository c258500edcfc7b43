#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// `submit_descriptor!` expands to `$crate::...` paths; doc tests and the
// crate itself both need to resolve `jsonapi_reflect`.
extern crate self as jsonapi_reflect;

// -----------------------------------------------------------------------------
// Modules

pub mod descriptor;
pub mod registry;
pub mod resolver;
pub mod resource;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use descriptor::{DescriptorBuilder, DescriptorError, RelationshipKind, RelationshipOptions};
pub use descriptor::{AttributeRule, RelationshipRule, ResourceDescriptor};
pub use registry::{DescriptorRegistry, DescriptorRegistryArc};
pub use resolver::Resolver;
pub use resource::{AccessError, AccessResult, Resource, ResourceId, ResourceRef, Scope};

/// Re-exported so collaborators can build attribute values without a direct dependency.
pub use serde_json::{Value, json};
