//! The resource graph traversal.
//!
//! [`GraphBuilder`] turns one domain object into a [`ResourceObject`] and
//! follows its inlined relationships depth-first. Every resource key is built
//! at most once per [`SerializationContext`]: primary resources are recorded
//! in the data set, inlined ones in the included set, and a key already in
//! either set is only referenced, never rebuilt. This is also what stops
//! cycles such as post -> author -> posts -> post.
//!
//! A failed build leaves the context as it found it, so the context can be
//! reused after an error.

use jsonapi_reflect::{RelationshipKind, RelationshipRule, Resolver};
use jsonapi_reflect::{Resource, ResourceDescriptor, ResourceId, ResourceRef};

use crate::context::SerializationContext;
use crate::error::SerializeError;
use crate::key::ResourceKey;
use crate::object::{RelationshipData, RelationshipObject, ResourceIdentifier, ResourceObject};

// -----------------------------------------------------------------------------
// GraphBuilder

/// Builds resource objects into a [`SerializationContext`].
///
/// Most callers go through [`ResourceSerializer`](crate::ResourceSerializer)
/// instead; the builder is the lower level used to compose documents by hand.
///
/// # Examples
///
/// ```
/// use jsonapi_graph::{GraphBuilder, ResourceKey, SerializationContext};
/// use jsonapi_reflect::{AccessError, AccessResult, DescriptorRegistry, Resolver};
/// use jsonapi_reflect::{Resource, ResourceId, Value};
///
/// struct Tag(&'static str);
///
/// impl Resource for Tag {
///     fn id(&self) -> ResourceId {
///         self.0.into()
///     }
///     fn type_name(&self) -> &str {
///         "Tag"
///     }
///     fn attribute(&self, name: &str) -> AccessResult<Value> {
///         Err(AccessError::unsupported(self.type_name(), name))
///     }
/// }
///
/// let resolver = Resolver::new(DescriptorRegistry::new());
/// let mut context = SerializationContext::new();
///
/// let tag = GraphBuilder::new(&resolver, &mut context)
///     .build_primary(&Tag("rust"))
///     .unwrap();
///
/// assert_eq!(tag.resource_type(), "tags");
/// assert!(context.is_primary(&ResourceKey::new("rust", "tags")));
/// ```
pub struct GraphBuilder<'a, 's> {
    resolver: &'a Resolver,
    context: &'a mut SerializationContext<'s>,
}

impl<'a, 's> GraphBuilder<'a, 's> {
    #[inline]
    pub fn new(resolver: &'a Resolver, context: &'a mut SerializationContext<'s>) -> Self {
        Self { resolver, context }
    }

    /// The key of `object`: its id and its pluralized type.
    #[inline]
    pub fn key_of(&self, object: &dyn Resource) -> ResourceKey {
        ResourceKey::new(object.id(), self.resolver.type_of(object.type_name()))
    }

    /// Builds `object` as part of the primary data, with its resolved descriptor.
    ///
    /// The key joins the data set. If the resource was already built in
    /// this context, the cached object is returned.
    pub fn build_primary(&mut self, object: &dyn Resource) -> Result<ResourceObject, SerializeError> {
        self.primary(object, None)
    }

    /// Same as [`build_primary`](Self::build_primary) with an explicit descriptor
    /// for `object`. Related resources still use their resolved descriptors.
    pub fn build_primary_with(
        &mut self,
        object: &dyn Resource,
        descriptor: &ResourceDescriptor,
    ) -> Result<ResourceObject, SerializeError> {
        self.primary(object, Some(descriptor))
    }

    /// Builds every object of `objects` as primary data, in order.
    pub fn build_collection<R: Resource>(
        &mut self,
        objects: &[R],
    ) -> Result<Vec<ResourceObject>, SerializeError> {
        objects
            .iter()
            .map(|object| self.build_primary(object))
            .collect()
    }

    fn primary(
        &mut self,
        object: &dyn Resource,
        descriptor: Option<&ResourceDescriptor>,
    ) -> Result<ResourceObject, SerializeError> {
        let key = self.key_of(object);
        let marked = self.context.mark_primary(key.clone());

        if let Some(cached) = self.context.get(&key) {
            log::trace!("`{key}` already built");
            return Ok(cached.clone());
        }

        let checkpoint = self.context.checkpoint();
        let result = match descriptor {
            Some(descriptor) => self.build_object(object, &key, descriptor),
            None => {
                let descriptor = self.resolver.resolve(object.type_name());
                self.build_object(object, &key, &descriptor)
            }
        };

        match result {
            Ok(built) => {
                self.context.store(key, built.clone());
                Ok(built)
            }
            Err(err) => {
                self.context.rollback(checkpoint);
                if marked {
                    self.context.unmark_primary(&key);
                }
                Err(err)
            }
        }
    }

    /// References `related` and, the first time it is reached, builds it for `included`.
    fn inline(&mut self, related: &dyn Resource) -> Result<ResourceIdentifier, SerializeError> {
        let key = self.key_of(related);

        if self.context.is_primary(&key) || self.context.is_scheduled(&key) {
            log::trace!("`{key}` already scheduled");
            return Ok(key.to_identifier());
        }

        let checkpoint = self.context.checkpoint();
        self.context.schedule(key.clone());

        let descriptor = self.resolver.resolve(related.type_name());
        match self.build_object(related, &key, &descriptor) {
            Ok(built) => {
                let identifier = key.to_identifier();
                self.context.store(key, built);
                Ok(identifier)
            }
            Err(err) => {
                self.context.rollback(checkpoint);
                Err(err)
            }
        }
    }

    fn build_object(
        &mut self,
        object: &dyn Resource,
        key: &ResourceKey,
        descriptor: &ResourceDescriptor,
    ) -> Result<ResourceObject, SerializeError> {
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.context.stack.push(key.clone());

        let result = self.build_fields(object, key, descriptor);

        #[cfg(all(debug_assertions, feature = "debug"))]
        {
            if let Err(err) = &result
                && self.context.stack.report()
            {
                log::error!("{err} (stack:\n{:?})", self.context.stack);
            }
            self.context.stack.pop();
        }

        result
    }

    fn build_fields(
        &mut self,
        object: &dyn Resource,
        key: &ResourceKey,
        descriptor: &ResourceDescriptor,
    ) -> Result<ResourceObject, SerializeError> {
        let scope = self.context.scope();
        let mut resource = ResourceObject::new(key);

        for rule in descriptor.attributes() {
            if rule.should_include(object, scope) {
                resource.insert_attribute(rule.name(), rule.value(object, scope)?);
            }
        }

        for rule in descriptor.relationships() {
            if rule.should_include(object, scope) {
                let relationship = self.build_relationship(object, rule)?;
                resource.push_relationship(rule.name(), relationship);
            }
        }

        Ok(resource)
    }

    fn build_relationship(
        &mut self,
        object: &dyn Resource,
        rule: &RelationshipRule,
    ) -> Result<RelationshipObject, SerializeError> {
        let data = match (rule.kind(), rule.is_included()) {
            (RelationshipKind::HasOne, false) => {
                let id = match object.foreign_key(rule.foreign_key()) {
                    Some(id) => id?,
                    None => object.related_one(rule.name())?.map(|related| related.id()),
                };
                RelationshipData::One(id.map(|id| linkage(rule, id)))
            }
            (RelationshipKind::HasOne, true) => match object.related_one(rule.name())? {
                Some(related) => RelationshipData::One(Some(self.inline(&*related)?)),
                None => RelationshipData::One(None),
            },
            (RelationshipKind::HasMany, false) => {
                let ids = if let Some(loaded) = object.loaded_many(rule.name()) {
                    ids_of(&loaded)
                } else if let Some(ids) = object.foreign_keys(rule.foreign_key()) {
                    ids?
                } else {
                    ids_of(&object.related_many(rule.name())?)
                };
                RelationshipData::Many(ids.into_iter().map(|id| linkage(rule, id)).collect())
            }
            (RelationshipKind::HasMany, true) => {
                let related = match object.loaded_many(rule.name()) {
                    Some(loaded) => loaded,
                    None => object.related_many(rule.name())?,
                };
                let mut identifiers = Vec::with_capacity(related.len());
                for related in &related {
                    identifiers.push(self.inline(&**related)?);
                }
                RelationshipData::Many(identifiers)
            }
        };

        Ok(RelationshipObject { data })
    }
}

#[inline]
fn linkage(rule: &RelationshipRule, id: ResourceId) -> ResourceIdentifier {
    ResourceIdentifier::new(id, std::sync::Arc::clone(rule.related_type()))
}

fn ids_of(objects: &[ResourceRef]) -> Vec<ResourceId> {
    objects.iter().map(|object| object.id()).collect()
}

// -----------------------------------------------------------------------------
// Tests
