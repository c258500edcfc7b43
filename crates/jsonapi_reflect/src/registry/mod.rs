//! Provide the descriptor registry.
//!
//! ## Menu
//!
//! - [`DescriptorRegistry`]: descriptors by name, populated at startup.
//! - [`DescriptorRegistryArc`]: the registry behind an `Arc<RwLock<_>>`.
//! - [`submit_descriptor!`]: static registration, see [`DescriptorRegistry::auto_register`].
//!
//! ## auto_register
//!
//! We use [`inventory`] crate to implement static registration,
//! not all platforms support it (although major platforms do).
//! On an unsupported platform nothing is collected and
//! [`DescriptorRegistry::auto_register`] registers nothing.
//!
//! [`submit_descriptor!`]: crate::submit_descriptor

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod descriptor_registry;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegisterDescriptor;
pub use descriptor_registry::{DescriptorRegistry, DescriptorRegistryArc};
