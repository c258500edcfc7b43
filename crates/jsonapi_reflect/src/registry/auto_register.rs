use super::DescriptorRegistry;
use crate::descriptor::{DescriptorError, ResourceDescriptor};

// -----------------------------------------------------------------------------
// AutoRegisterDescriptor

/// A descriptor factory collected at link time by `inventory`.
///
/// Created by [`submit_descriptor!`](crate::submit_descriptor); not meant to be built by hand.
#[doc(hidden)]
pub struct AutoRegisterDescriptor(pub fn() -> Result<ResourceDescriptor, DescriptorError>);

inventory::collect!(AutoRegisterDescriptor);

pub(super) fn register_submitted(registry: &mut DescriptorRegistry) -> Result<usize, DescriptorError> {
    let mut count = 0;
    for submitted in inventory::iter::<AutoRegisterDescriptor> {
        let descriptor = (submitted.0)()?;
        if registry.contains(descriptor.name()) {
            continue;
        }
        if registry.register(descriptor) {
            count += 1;
        }
    }
    log::debug!("auto registered {count} descriptors");
    Ok(count)
}

// -----------------------------------------------------------------------------
// submit_descriptor

/// Submits a descriptor factory for [`DescriptorRegistry::auto_register`].
///
/// The argument is a `fn() -> Result<ResourceDescriptor, DescriptorError>`.
///
/// Requires the `auto_register` feature.
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::{DescriptorError, DescriptorRegistry, ResourceDescriptor};
///
/// fn comment_descriptor() -> Result<ResourceDescriptor, DescriptorError> {
///     ResourceDescriptor::builder("Comment")
///         .attributes(["body", "post_id"])
///         .build()
/// }
///
/// jsonapi_reflect::submit_descriptor!(comment_descriptor);
///
/// let mut registry = DescriptorRegistry::new();
/// registry.auto_register().unwrap();
/// assert!(registry.contains("CommentDescriptor"));
/// ```
#[macro_export]
macro_rules! submit_descriptor {
    ($factory:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegisterDescriptor($factory)
        }
    };
}

// -----------------------------------------------------------------------------
// Tests
