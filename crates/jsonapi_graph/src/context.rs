use core::fmt::{Debug, Formatter};

use jsonapi_reflect::Scope;
use jsonapi_utils::IndexSet;
use jsonapi_utils::hash::{HashMap, HashSet};

use crate::key::ResourceKey;
use crate::object::ResourceObject;

// -----------------------------------------------------------------------------
// SerializationContext

/// State shared by every builder taking part in one document.
///
/// - the data set: keys of the primary `data` resources;
/// - the included set: keys scheduled for `included`, in discovery order;
/// - the resource cache: every resource built so far, so that none is built twice;
/// - the scope handed to inclusion predicates and accessors.
///
/// Create one per document, or pass the same context to several serializers
/// to deduplicate across them, as [`CollectionSerializer`] does.
///
/// [`CollectionSerializer`]: crate::serializer::CollectionSerializer
#[derive(Default)]
pub struct SerializationContext<'s> {
    scope: Scope<'s>,
    data_set: HashSet<ResourceKey>,
    included_set: IndexSet<ResourceKey>,
    resource_cache: HashMap<ResourceKey, ResourceObject>,
    #[cfg(all(debug_assertions, feature = "debug"))]
    pub(crate) stack: KeyStack,
}

impl<'s> SerializationContext<'s> {
    /// An empty context without scope.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty context carrying `scope`.
    #[inline]
    pub fn with_scope(scope: Scope<'s>) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    #[inline]
    pub fn scope(&self) -> Scope<'s> {
        self.scope
    }

    #[inline]
    pub fn set_scope(&mut self, scope: Scope<'s>) {
        self.scope = scope;
    }

    /// Whether `key` is part of the primary data.
    #[inline]
    pub fn is_primary(&self, key: &ResourceKey) -> bool {
        self.data_set.contains(key)
    }

    /// Whether `key` was reached through an inlined relationship.
    ///
    /// A key can be both scheduled and primary; it is emitted in `data` only.
    #[inline]
    pub fn is_scheduled(&self, key: &ResourceKey) -> bool {
        self.included_set.contains(key)
    }

    /// Returns the resource built for `key`, if any.
    #[inline]
    pub fn get(&self, key: &ResourceKey) -> Option<&ResourceObject> {
        self.resource_cache.get(key)
    }

    /// Number of resources built so far.
    #[inline]
    pub fn built(&self) -> usize {
        self.resource_cache.len()
    }

    /// Keys that end up in `included`: the included set minus the data set, in discovery order.
    pub fn included_keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.included_set
            .iter()
            .filter(|key| !self.data_set.contains(*key))
    }

    /// Returns `false` if the key was already primary.
    pub(crate) fn mark_primary(&mut self, key: ResourceKey) -> bool {
        self.data_set.insert(key)
    }

    pub(crate) fn unmark_primary(&mut self, key: &ResourceKey) {
        self.data_set.remove(key);
    }

    /// Returns `false` if the key was already scheduled.
    pub(crate) fn schedule(&mut self, key: ResourceKey) -> bool {
        self.included_set.insert(key)
    }

    pub(crate) fn store(&mut self, key: ResourceKey, object: ResourceObject) {
        self.resource_cache.insert(key, object);
    }

    /// Marks the current end of the included set for [`rollback`](Self::rollback).
    #[inline]
    pub(crate) fn checkpoint(&self) -> usize {
        self.included_set.len()
    }

    /// Forgets every key scheduled since `checkpoint`, along with what was built for it.
    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        for key in self.included_set.split_off(checkpoint) {
            log::trace!("`{key}` unscheduled");
            self.resource_cache.remove(&key);
        }
    }
}

impl Debug for SerializationContext<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerializationContext")
            .field("scope", &self.scope)
            .field("data_set", &self.data_set)
            .field("included_set", &self.included_set)
            .field("built", &self.resource_cache.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// KeyStack

/// The chain of resources being built, innermost last.
#[cfg(all(debug_assertions, feature = "debug"))]
#[derive(Default, Clone)]
pub(crate) struct KeyStack {
    keys: Vec<ResourceKey>,
    reported: bool,
}

#[cfg(all(debug_assertions, feature = "debug"))]
impl KeyStack {
    pub fn push(&mut self, key: ResourceKey) {
        if self.keys.is_empty() {
            self.reported = false;
        }
        self.keys.push(key);
    }

    pub fn pop(&mut self) {
        self.keys.pop();
    }

    /// Returns `true` the first time it is called for a failing traversal.
    pub fn report(&mut self) -> bool {
        !core::mem::replace(&mut self.reported, true)
    }
}

#[cfg(all(debug_assertions, feature = "debug"))]
impl Debug for KeyStack {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.keys.iter();

        if let Some(first) = iter.next() {
            writeln!(f, "`{first}`")?;
        }

        for key in iter {
            writeln!(f, " -> `{key}`")?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::SerializationContext;
    use crate::key::ResourceKey;
    use crate::object::ResourceObject;

    #[test]
    fn included_keys_skip_primary_data() {
        let mut context = SerializationContext::new();
        let author = ResourceKey::new(1, "authors");
        let post = ResourceKey::new(2, "posts");
        let other = ResourceKey::new(3, "posts");

        assert!(context.schedule(other.clone()));
        assert!(context.schedule(author.clone()));
        assert!(context.schedule(post.clone()));
        assert!(!context.schedule(author.clone()));
        context.mark_primary(post.clone());

        let included: Vec<_> = context.included_keys().cloned().collect();
        assert_eq!(included, [other, author]);
        assert!(context.is_primary(&post));
        assert!(context.is_scheduled(&post));
    }

    #[test]
    fn cache_by_key() {
        let mut context = SerializationContext::new();
        let key = ResourceKey::new(1, "authors");
        context.store(key.clone(), ResourceObject::new(&key));
        assert_eq!(context.built(), 1);
        assert_eq!(context.get(&ResourceKey::new(1_u8, "authors")).map(|o| o.key()), Some(key));
        assert!(context.scope().is_none());
    }

    #[test]
    fn rollback_forgets_later_keys() {
        let mut context = SerializationContext::new();
        let author = ResourceKey::new(1, "authors");
        let post = ResourceKey::new(2, "posts");

        context.schedule(author.clone());
        context.store(author.clone(), ResourceObject::new(&author));
        let checkpoint = context.checkpoint();
        context.schedule(post.clone());
        context.store(post.clone(), ResourceObject::new(&post));

        context.rollback(checkpoint);
        assert!(context.is_scheduled(&author));
        assert!(!context.is_scheduled(&post));
        assert!(context.get(&post).is_none());
        assert_eq!(context.built(), 1);

        assert!(context.mark_primary(post.clone()));
        assert!(!context.mark_primary(post.clone()));
        context.unmark_primary(&post);
        assert!(!context.is_primary(&post));
    }

    #[cfg(all(debug_assertions, feature = "debug"))]
    #[test]
    fn stack_reports_once() {
        let mut context = SerializationContext::new();
        context.stack.push(ResourceKey::new(1, "posts"));
        context.stack.push(ResourceKey::new(1, "authors"));
        assert_eq!(format!("{:?}", context.stack), "`posts:1`\n -> `authors:1`\n");
        assert!(context.stack.report());
        assert!(!context.stack.report());
        context.stack.pop();
        context.stack.pop();
        context.stack.push(ResourceKey::new(2, "posts"));
        assert!(context.stack.report());
    }
}
