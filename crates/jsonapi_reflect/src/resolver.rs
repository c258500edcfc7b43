//! Maps runtime type names to their descriptors.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use jsonapi_utils::hash::HashMap;
use jsonapi_utils::{English, Inflector};

use crate::descriptor::ResourceDescriptor;
use crate::registry::{DescriptorRegistry, DescriptorRegistryArc};

// -----------------------------------------------------------------------------
// Resolver

/// Finds the [`ResourceDescriptor`] of a type, by naming convention.
///
/// `Author` resolves to the descriptor registered as `AuthorDescriptor`.
/// Types without one resolve to the [generic descriptor](ResourceDescriptor::generic),
/// resolution never fails.
///
/// Answers are cached per type name, so a descriptor registered after the
/// first lookup of its type is only seen through [`Resolver::register`] or
/// after [`Resolver::clear_cache`].
///
/// A resolver is meant to live as long as the process and be shared, see
/// [`Resolver::global`].
///
/// # Examples
///
/// ```
/// use jsonapi_reflect::{DescriptorRegistry, Resolver, ResourceDescriptor};
///
/// let mut registry = DescriptorRegistry::new();
/// registry.register(ResourceDescriptor::builder("Author").attributes(["name"]).build().unwrap());
///
/// let resolver = Resolver::new(registry);
/// assert_eq!(resolver.resolve("Author").name(), "AuthorDescriptor");
/// assert!(resolver.resolve("Comment").is_generic());
/// assert_eq!(&*resolver.type_of("Author"), "authors");
/// ```
pub struct Resolver {
    registry: DescriptorRegistryArc,
    inflector: &'static dyn Inflector,
    generic: Arc<ResourceDescriptor>,
    descriptors: RwLock<HashMap<String, Arc<ResourceDescriptor>>>,
    types: RwLock<HashMap<String, Arc<str>>>,
}

impl Resolver {
    /// Creates a resolver over `registry` with the [`English`] inflector.
    pub fn new(registry: impl Into<DescriptorRegistryArc>) -> Self {
        Self {
            registry: registry.into(),
            inflector: &English,
            generic: Arc::new(ResourceDescriptor::generic()),
            descriptors: RwLock::default(),
            types: RwLock::default(),
        }
    }

    /// Replaces the inflector used by [`type_of`](Self::type_of).
    pub fn with_inflector(mut self, inflector: &'static dyn Inflector) -> Self {
        self.inflector = inflector;
        self.types
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self
    }

    /// A process-wide resolver over the auto-registered descriptors.
    ///
    /// Built on first use from every [`submit_descriptor!`](crate::submit_descriptor)
    /// declaration. A declaration that fails to build is logged and skipped.
    pub fn global() -> &'static Resolver {
        static GLOBAL: OnceLock<Resolver> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let mut registry = DescriptorRegistry::new();
            if let Err(err) = registry.auto_register() {
                log::error!("auto registration stopped: {err}");
            }
            Resolver::new(registry)
        })
    }

    /// Returns the descriptor of `type_name`, or the generic descriptor.
    pub fn resolve(&self, type_name: &str) -> Arc<ResourceDescriptor> {
        {
            let cache = self.descriptors.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(descriptor) = cache.get(type_name) {
                log::trace!("descriptor cache hit for `{type_name}`");
                return Arc::clone(descriptor);
            }
        }

        let descriptor = match self.registry.read().get_for_type(type_name) {
            Some(descriptor) => Arc::clone(descriptor),
            None => {
                log::debug!("no descriptor for `{type_name}`, using the generic descriptor");
                Arc::clone(&self.generic)
            }
        };

        self.descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(String::from(type_name))
            .or_insert(descriptor)
            .clone()
    }

    /// The JSON:API `type` of `type_name`: lowercased and pluralized, `Author` -> `authors`.
    pub fn type_of(&self, type_name: &str) -> Arc<str> {
        {
            let cache = self.types.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ty) = cache.get(type_name) {
                return Arc::clone(ty);
            }
        }

        let ty: Arc<str> = self.inflector.resource_type(type_name).into();
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(String::from(type_name))
            .or_insert(ty)
            .clone()
    }

    /// Registers `descriptor` and forgets any cached answer for its type.
    ///
    /// Returns `false` if the name was already taken, see [`DescriptorRegistry::register`].
    pub fn register(&self, descriptor: ResourceDescriptor) -> bool {
        let type_name = String::from(descriptor.type_name());
        let registered = self.registry.write().register(descriptor);
        if registered {
            self.descriptors
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&type_name);
        }
        registered
    }

    /// Forgets every cached resolution.
    pub fn clear_cache(&self) {
        self.descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The registry this resolver reads from.
    #[inline]
    pub fn registry(&self) -> &DescriptorRegistryArc {
        &self.registry
    }

    /// The inflector used for relationship and resource types.
    #[inline]
    pub fn inflector(&self) -> &'static dyn Inflector {
        self.inflector
    }
}

impl core::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
