use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jsonapi_utils::hash::HashMap;

use crate::descriptor::{DescriptorError, ResourceDescriptor, descriptor_name};

// -----------------------------------------------------------------------------
// DescriptorRegistry

/// The central store of [`ResourceDescriptor`]s, keyed by descriptor name.
///
/// Populated at startup, read-only afterwards. Lookups by type follow the
/// `<TypeName>Descriptor` naming convention.
///
/// # Example
///
/// ```
/// use jsonapi_reflect::{DescriptorRegistry, ResourceDescriptor};
///
/// let mut registry = DescriptorRegistry::new();
/// let author = ResourceDescriptor::builder("Author")
///     .attributes(["name", "email"])
///     .build()
///     .unwrap();
///
/// assert!(registry.register(author));
/// assert!(registry.contains("AuthorDescriptor"));
/// assert!(registry.get_for_type("Author").is_some());
/// assert!(registry.get_for_type("Post").is_none());
/// ```
#[derive(Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, Arc<ResourceDescriptor>>,
}

impl DescriptorRegistry {
    /// Create a empty [`DescriptorRegistry`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try add or do nothing.
    ///
    /// - If a descriptor with the same [name](ResourceDescriptor::name) already
    ///   exists, the registry is left unchanged and `false` is returned.
    /// - Otherwise the descriptor is inserted and `true` is returned.
    ///
    /// Descriptors are never replaced: a descriptor may already be shared
    /// with a running serialization.
    #[inline]
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> bool {
        self.register_arc(Arc::new(descriptor))
    }

    /// Same as [`register`](Self::register) for an already shared descriptor.
    pub fn register_arc(&mut self, descriptor: Arc<ResourceDescriptor>) -> bool {
        if self.descriptors.contains_key(descriptor.name()) {
            log::warn!(
                "descriptor `{}` is already registered, keeping the first one",
                descriptor.name()
            );
            return false;
        }
        self.descriptors
            .insert(String::from(descriptor.name()), descriptor);
        true
    }

    /// Builds and registers every descriptor submitted with
    /// [`submit_descriptor!`](crate::submit_descriptor).
    ///
    /// Repeated calls are cheap and will not insert duplicates.
    /// Returns the number of newly registered descriptors.
    ///
    /// ## Feature Dependency
    ///
    /// This method requires the `auto_register` feature. When disabled, it
    /// does nothing and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// The first submitted declaration that fails to compile.
    pub fn auto_register(&mut self) -> Result<usize, DescriptorError> {
        #[cfg(feature = "auto_register")]
        {
            super::auto_register::register_submitted(self)
        }
        #[cfg(not(feature = "auto_register"))]
        {
            Ok(0)
        }
    }

    /// Whether a descriptor called `name` has been registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Returns the descriptor called `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.descriptors.get(name)
    }

    /// Returns the descriptor of `type_name`, by naming convention.
    #[inline]
    pub fn get_for_type(&self, type_name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.get(&descriptor_name(type_name))
    }

    /// Returns the number of registered descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns an iterator over the registered descriptors, in no particular order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<ResourceDescriptor>> {
        self.descriptors.values()
    }
}

impl core::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.descriptors.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// DescriptorRegistryArc

/// A shared, lockable [`DescriptorRegistry`].
///
/// Written during startup, read by every serialization afterwards.
#[derive(Clone, Default)]
pub struct DescriptorRegistryArc {
    /// The wrapped [`DescriptorRegistry`].
    pub internal: Arc<RwLock<DescriptorRegistry>>,
}

impl DescriptorRegistryArc {
    /// Takes a read lock on the underlying [`DescriptorRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, DescriptorRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`DescriptorRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, DescriptorRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<DescriptorRegistry> for DescriptorRegistryArc {
    #[inline]
    fn from(registry: DescriptorRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }
}

impl core::fmt::Debug for DescriptorRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests
