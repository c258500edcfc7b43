//! Entry points: one root object, or a collection of them.

use core::any::Any;
use std::sync::Arc;

use jsonapi_reflect::{Resolver, Resource, ResourceDescriptor, Scope, Value};

use crate::builder::GraphBuilder;
use crate::context::SerializationContext;
use crate::document::{Document, PrimaryData};
use crate::error::SerializeError;
use crate::object::ResourceObject;

// -----------------------------------------------------------------------------
// ResourceSerializer

/// Serializes one object and everything it inlines.
///
/// # Options
///
/// - [`scope`](Self::scope): a value handed to every predicate and accessor.
/// - [`descriptor`](Self::descriptor): rules for the root object instead of its resolved descriptor.
/// - [`context`](Self::context): build into a context shared with other serializers.
///
/// # Examples
///
/// ```
/// use jsonapi_graph::ResourceSerializer;
/// use jsonapi_reflect::{AccessError, AccessResult, DescriptorRegistry, Resolver};
/// use jsonapi_reflect::{Resource, ResourceDescriptor, ResourceId, Value, json};
///
/// struct Post {
///     id: i64,
///     title: &'static str,
///     author_id: i64,
/// }
///
/// impl Resource for Post {
///     fn id(&self) -> ResourceId {
///         self.id.into()
///     }
///     fn type_name(&self) -> &str {
///         "Post"
///     }
///     fn attribute(&self, name: &str) -> AccessResult<Value> {
///         match name {
///             "title" => Ok(self.title.into()),
///             _ => Err(AccessError::unsupported(self.type_name(), name)),
///         }
///     }
///     fn foreign_key(&self, accessor: &str) -> Option<AccessResult<Option<ResourceId>>> {
///         (accessor == "author_id").then(|| Ok(Some(self.author_id.into())))
///     }
/// }
///
/// let mut registry = DescriptorRegistry::new();
/// registry.register(
///     ResourceDescriptor::builder("Post")
///         .attributes(["title", "author_id"])
///         .build()
///         .unwrap(),
/// );
/// let resolver = Resolver::new(registry);
///
/// let post = Post { id: 5, title: "t", author_id: 1 };
/// let document = ResourceSerializer::new(&post, &resolver).to_value().unwrap();
///
/// assert_eq!(document, json!({
///     "data": {
///         "id": 5,
///         "type": "posts",
///         "attributes": { "title": "t" },
///         "relationships": { "author": { "data": { "id": 1, "type": "authors" } } },
///     }
/// }));
/// ```
pub struct ResourceSerializer<'a, 's> {
    object: &'a dyn Resource,
    resolver: &'a Resolver,
    scope: Option<Scope<'s>>,
    descriptor: Option<Arc<ResourceDescriptor>>,
    context: Option<&'a mut SerializationContext<'s>>,
}

impl<'a, 's> ResourceSerializer<'a, 's> {
    pub fn new(object: &'a dyn Resource, resolver: &'a Resolver) -> Self {
        Self {
            object,
            resolver,
            scope: None,
            descriptor: None,
            context: None,
        }
    }

    /// Hands `value` to predicates and accessors, see [`Scope::get`].
    ///
    /// With a shared [`context`](Self::context), this replaces the context's scope.
    pub fn scope<T: Any>(mut self, value: &'s T) -> Self {
        self.scope = Some(Scope::new(value));
        self
    }

    /// Serializes the root object with `descriptor`.
    pub fn descriptor(mut self, descriptor: Arc<ResourceDescriptor>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Builds into `context` instead of a fresh one.
    pub fn context(mut self, context: &'a mut SerializationContext<'s>) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the root resource object into the context, without assembling a document.
    pub fn resource_object(self) -> Result<ResourceObject, SerializeError> {
        let mut own = SerializationContext::new();
        let (object, resolver, descriptor, context) = self.prepare(&mut own);
        build(object, resolver, descriptor.as_deref(), context)
    }

    /// Builds the document.
    ///
    /// # Errors
    ///
    /// The first failing [`Resource`] accessor.
    pub fn document(self) -> Result<Document, SerializeError> {
        let mut own = SerializationContext::new();
        let (object, resolver, descriptor, context) = self.prepare(&mut own);
        let data = build(object, resolver, descriptor.as_deref(), context)?;
        Ok(Document::assemble(PrimaryData::One(data), context))
    }

    pub fn to_value(self) -> Result<Value, SerializeError> {
        Ok(self.document()?.to_value()?)
    }

    pub fn to_json(self) -> Result<String, SerializeError> {
        Ok(self.document()?.to_json()?)
    }

    pub fn to_json_pretty(self) -> Result<String, SerializeError> {
        Ok(self.document()?.to_json_pretty()?)
    }

    fn prepare<'c>(
        self,
        own: &'c mut SerializationContext<'s>,
    ) -> (
        &'a dyn Resource,
        &'a Resolver,
        Option<Arc<ResourceDescriptor>>,
        &'c mut SerializationContext<'s>,
    )
    where
        'a: 'c,
    {
        let context = match self.context {
            Some(shared) => shared,
            None => own,
        };
        if let Some(scope) = self.scope {
            context.set_scope(scope);
        }
        (self.object, self.resolver, self.descriptor, context)
    }
}

fn build(
    object: &dyn Resource,
    resolver: &Resolver,
    descriptor: Option<&ResourceDescriptor>,
    context: &mut SerializationContext<'_>,
) -> Result<ResourceObject, SerializeError> {
    let mut builder = GraphBuilder::new(resolver, context);
    match descriptor {
        Some(descriptor) => builder.build_primary_with(object, descriptor),
        None => builder.build_primary(object),
    }
}

// -----------------------------------------------------------------------------
// CollectionSerializer

/// Serializes a list of objects as one document.
///
/// Every item goes through a [`ResourceSerializer`] sharing one context, so
/// a resource reached from several items is included once, and an item
/// reached from another item stays in `data` only.
pub struct CollectionSerializer<'a, 's, R> {
    objects: &'a [R],
    resolver: &'a Resolver,
    scope: Option<Scope<'s>>,
    descriptor: Option<Arc<ResourceDescriptor>>,
    context: Option<&'a mut SerializationContext<'s>>,
}

impl<'a, 's, R: Resource> CollectionSerializer<'a, 's, R> {
    pub fn new(objects: &'a [R], resolver: &'a Resolver) -> Self {
        Self {
            objects,
            resolver,
            scope: None,
            descriptor: None,
            context: None,
        }
    }

    /// See [`ResourceSerializer::scope`].
    pub fn scope<T: Any>(mut self, value: &'s T) -> Self {
        self.scope = Some(Scope::new(value));
        self
    }

    /// Serializes every item with `descriptor`.
    pub fn descriptor(mut self, descriptor: Arc<ResourceDescriptor>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// See [`ResourceSerializer::context`].
    pub fn context(mut self, context: &'a mut SerializationContext<'s>) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the document. An empty list yields `{"data": []}`.
    pub fn document(self) -> Result<Document, SerializeError> {
        let mut own = SerializationContext::new();
        let context = match self.context {
            Some(shared) => shared,
            None => &mut own,
        };
        if let Some(scope) = self.scope {
            context.set_scope(scope);
        }

        let mut data = Vec::with_capacity(self.objects.len());
        for object in self.objects {
            let mut item = ResourceSerializer::new(object, self.resolver).context(&mut *context);
            if let Some(descriptor) = &self.descriptor {
                item = item.descriptor(Arc::clone(descriptor));
            }
            data.push(item.resource_object()?);
        }

        Ok(Document::assemble(PrimaryData::Many(data), context))
    }

    pub fn to_value(self) -> Result<Value, SerializeError> {
        Ok(self.document()?.to_value()?)
    }

    pub fn to_json(self) -> Result<String, SerializeError> {
        Ok(self.document()?.to_json()?)
    }

    pub fn to_json_pretty(self) -> Result<String, SerializeError> {
        Ok(self.document()?.to_json_pretty()?)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use jsonapi_reflect::{RelationshipOptions, ResourceDescriptor, ResourceId, ResourceRef, json};

    use super::{CollectionSerializer, ResourceSerializer};
    use crate::context::SerializationContext;
    use crate::fixtures::{self, Comment};
    use crate::key::ResourceKey;

    struct Viewer {
        admin: bool,
    }

    #[test]
    fn generic_descriptor_emits_the_identifier() {
        let resolver = fixtures::resolver();
        let value = ResourceSerializer::new(&Comment("c1"), &resolver)
            .to_value()
            .unwrap();
        assert_eq!(value, json!({ "data": { "id": "c1", "type": "comments" } }));
    }

    #[test]
    fn attributes_in_declaration_order() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = ResourceDescriptor::builder("Author")
            .attributes(["name", "email"])
            .build()
            .unwrap();

        let json = ResourceSerializer::new(&*blog.author, &resolver)
            .descriptor(Arc::new(descriptor))
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"data":{"id":1,"type":"authors","attributes":{"name":"fred","email":"fred@x"}}}"#
        );
    }

    #[test]
    fn foreign_keys_become_relationships() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let value = ResourceSerializer::new(&*blog.second, &resolver)
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "data": {
                    "id": 2,
                    "type": "posts",
                    "attributes": { "title": "again", "body": "second post" },
                    "relationships": { "author": { "data": { "id": 1, "type": "authors" } } },
                }
            })
        );
        assert!(value["data"]["attributes"].get("author_id").is_none());
    }

    #[test]
    fn has_many_emits_identifiers_in_source_order() {
        let blog = fixtures::blog();
        blog.author.posts.borrow_mut().reverse();
        let resolver = fixtures::resolver();

        let value = ResourceSerializer::new(&*blog.author, &resolver)
            .to_value()
            .unwrap();
        assert_eq!(
            value["data"]["relationships"]["posts"],
            json!({ "data": [
                { "id": 2, "type": "posts" },
                { "id": 1, "type": "posts" },
            ] })
        );
        assert!(value.get("included").is_none());
    }

    #[test]
    fn predicates_remove_fields_per_object() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = Arc::new(
            ResourceDescriptor::builder("Post")
                .attributes(["title", "body", "author_id"])
                .include_if("body", |post, _| post.id() != ResourceId::Int(1))
                .include_if("author", |_, _| false)
                .build()
                .unwrap(),
        );

        let value = CollectionSerializer::new(&[blog.first.clone(), blog.second.clone()], &resolver)
            .descriptor(descriptor)
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "data": [
                    { "id": 1, "type": "posts", "attributes": { "title": "hello" } },
                    { "id": 2, "type": "posts", "attributes": { "title": "again", "body": "second post" } },
                ]
            })
        );
    }

    #[test]
    fn relationship_predicate_gates_the_edge_only() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = Arc::new(
            ResourceDescriptor::builder("Post")
                .attributes(["title"])
                .has_one("author", RelationshipOptions::included())
                .include_if("author", |post, _| post.id() != ResourceId::Int(1))
                .build()
                .unwrap(),
        );

        let value = CollectionSerializer::new(&[blog.first.clone(), blog.second.clone()], &resolver)
            .descriptor(descriptor)
            .to_value()
            .unwrap();

        // The first post drops the edge; the second still reaches the author.
        assert!(value["data"][0].get("relationships").is_none());
        assert_eq!(
            value["data"][1]["relationships"]["author"]["data"],
            json!({ "id": 1, "type": "authors" })
        );
        assert_eq!(
            value["included"],
            json!([{
                "id": 1,
                "type": "authors",
                "attributes": { "name": "fred", "email": "fred@x" },
                "relationships": {
                    "posts": { "data": [{ "id": 1, "type": "posts" }, { "id": 2, "type": "posts" }] },
                },
            }])
        );
    }

    #[test]
    fn scope_reaches_predicates() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = Arc::new(
            ResourceDescriptor::builder("Author")
                .attributes(["name", "email"])
                .include_if("email", |_, scope| {
                    scope.get::<Viewer>().is_some_and(|viewer| viewer.admin)
                })
                .build()
                .unwrap(),
        );

        let render = |viewer: &Viewer| {
            ResourceSerializer::new(&*blog.author, &resolver)
                .descriptor(Arc::clone(&descriptor))
                .scope(viewer)
                .to_value()
                .unwrap()
        };

        let admin = render(&Viewer { admin: true });
        assert_eq!(admin["data"]["attributes"]["email"], "fred@x");

        let guest = render(&Viewer { admin: false });
        assert_eq!(guest["data"]["attributes"], json!({ "name": "fred" }));
    }

    #[test]
    fn virtual_attributes() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = ResourceDescriptor::builder("Author")
            .attributes(["name", "signature"])
            .accessor("signature", |author, _| {
                let name = author.attribute("name")?;
                let email = author.attribute("email")?;
                Ok(json!(format!(
                    "{} <{}>",
                    name.as_str().unwrap_or_default(),
                    email.as_str().unwrap_or_default()
                )))
            })
            .accessor("name", |_, _| Ok(json!("Fred")))
            .build()
            .unwrap();

        let value = ResourceSerializer::new(&*blog.author, &resolver)
            .descriptor(Arc::new(descriptor))
            .to_value()
            .unwrap();
        assert_eq!(
            value["data"]["attributes"],
            json!({ "name": "Fred", "signature": "fred <fred@x>" })
        );
    }

    #[test]
    fn explicit_relationships() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = ResourceDescriptor::builder("Author")
            .has_many("posts", RelationshipOptions::new())
            .build()
            .unwrap();
        let value = ResourceSerializer::new(&*blog.author, &resolver)
            .descriptor(Arc::new(descriptor))
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "data": {
                    "id": 1,
                    "type": "authors",
                    "relationships": { "posts": { "data": [
                        { "id": 1, "type": "posts" },
                        { "id": 2, "type": "posts" },
                    ] } },
                }
            })
        );

        let descriptor = ResourceDescriptor::builder("Post")
            .relationship("writer", "belongs_to", RelationshipOptions::new().type_name("authors"))
            .build()
            .unwrap();
        let err = ResourceSerializer::new(&*blog.first, &resolver)
            .descriptor(Arc::new(descriptor))
            .document()
            .unwrap_err();
        assert_eq!(err.to_string(), "type `Post` has no accessor `writer`");
    }

    #[test]
    fn included_has_one_with_back_reference() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = ResourceDescriptor::builder("Post")
            .attributes(["title"])
            .has_one("author", RelationshipOptions::included())
            .build()
            .unwrap();

        let value = ResourceSerializer::new(&*blog.first, &resolver)
            .descriptor(Arc::new(descriptor))
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "data": {
                    "id": 1,
                    "type": "posts",
                    "attributes": { "title": "hello" },
                    "relationships": { "author": { "data": { "id": 1, "type": "authors" } } },
                },
                "included": [{
                    "id": 1,
                    "type": "authors",
                    "attributes": { "name": "fred", "email": "fred@x" },
                    "relationships": { "posts": { "data": [
                        { "id": 1, "type": "posts" },
                        { "id": 2, "type": "posts" },
                    ] } },
                }],
            })
        );
    }

    #[test]
    fn cycles_keep_the_root_in_data() {
        let blog = fixtures::blog();
        let resolver = fixtures::linked_resolver();

        let document = ResourceSerializer::new(&*blog.first, &resolver)
            .document()
            .unwrap();
        let included: Vec<_> = document.included().iter().map(|r| r.key()).collect();
        assert_eq!(
            included,
            [ResourceKey::new(1, "authors"), ResourceKey::new(2, "posts")]
        );
        assert_eq!(document.data().resources()[0].key(), ResourceKey::new(1, "posts"));
    }

    #[test]
    fn collection_with_includes() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = ResourceDescriptor::builder("Post")
            .attributes(["title"])
            .has_one("author", RelationshipOptions::included())
            .build()
            .unwrap();

        let posts: [ResourceRef; 2] = [blog.second.clone(), blog.first.clone()];
        let value = CollectionSerializer::new(&posts, &resolver)
            .descriptor(Arc::new(descriptor))
            .to_value()
            .unwrap();

        let data: Vec<_> = value["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["id"].clone())
            .collect();
        assert_eq!(data, [json!(2), json!(1)]);
        assert_eq!(value["included"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            value["included"][0]["relationships"]["posts"]["data"],
            json!([{ "id": 1, "type": "posts" }, { "id": 2, "type": "posts" }])
        );
    }

    #[test]
    fn primary_data_is_never_included() {
        let blog = fixtures::blog();
        let resolver = fixtures::linked_resolver();

        // The author is inlined by the first post before it becomes primary itself.
        let objects: [ResourceRef; 3] = [
            blog.first.clone(),
            blog.author.clone(),
            blog.second.clone(),
        ];
        let document = CollectionSerializer::new(&objects, &resolver)
            .document()
            .unwrap();

        let data: Vec<_> = document.data().resources().iter().map(|r| r.key()).collect();
        assert_eq!(
            data,
            [
                ResourceKey::new(1, "posts"),
                ResourceKey::new(1, "authors"),
                ResourceKey::new(2, "posts"),
            ]
        );
        assert!(document.included().is_empty());
        assert!(document.to_value().unwrap().get("included").is_none());
    }

    #[test]
    fn shared_target_is_included_once_in_any_order() {
        let blog = fixtures::blog();
        let resolver = fixtures::resolver();
        let descriptor = Arc::new(
            ResourceDescriptor::builder("Post")
                .has_one("author", RelationshipOptions::included())
                .build()
                .unwrap(),
        );

        for posts in [
            [blog.first.clone(), blog.second.clone()],
            [blog.second.clone(), blog.first.clone()],
        ] {
            let document = CollectionSerializer::new(&posts, &resolver)
                .descriptor(Arc::clone(&descriptor))
                .document()
                .unwrap();
            let included: Vec<_> = document.included().iter().map(|r| r.key()).collect();
            assert_eq!(included, [ResourceKey::new(1, "authors")]);
        }
    }

    #[test]
    fn empty_collection() {
        let resolver = fixtures::resolver();
        let posts: [Rc<fixtures::Post>; 0] = [];
        let json = CollectionSerializer::new(&posts, &resolver).to_json().unwrap();
        assert_eq!(json, r#"{"data":[]}"#);
    }

    #[test]
    fn deterministic_output() {
        let blog = fixtures::blog();
        let resolver = fixtures::linked_resolver();
        let render = || {
            ResourceSerializer::new(&*blog.second, &resolver)
                .to_json_pretty()
                .unwrap()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn shared_context_across_serializers() {
        let blog = fixtures::blog();
        let resolver = fixtures::linked_resolver();
        let mut context = SerializationContext::new();

        let first = ResourceSerializer::new(&*blog.first, &resolver)
            .context(&mut context)
            .document()
            .unwrap();
        assert_eq!(first.included().len(), 2);

        // The second post is now primary: it leaves `included`.
        let second = ResourceSerializer::new(&*blog.second, &resolver)
            .context(&mut context)
            .document()
            .unwrap();
        let included: Vec<_> = second.included().iter().map(|r| r.key()).collect();
        assert_eq!(included, [ResourceKey::new(1, "authors")]);
        assert_eq!(context.built(), 3);
    }

    #[test]
    fn accessor_errors_are_returned_unchanged() {
        let blog = fixtures::blog();
        let resolver = fixtures::linked_resolver();
        blog.second.broken.set(true);

        let err = ResourceSerializer::new(&*blog.first, &resolver)
            .to_value()
            .unwrap_err();
        assert_eq!(err.to_string(), "post 2 is unreadable");
    }

    #[test]
    fn shared_context_recovers_after_an_error() {
        let blog = fixtures::blog();
        let resolver = fixtures::linked_resolver();
        let mut context = SerializationContext::new();

        blog.second.broken.set(true);
        let err = ResourceSerializer::new(&*blog.first, &resolver)
            .context(&mut context)
            .document()
            .unwrap_err();
        assert_eq!(err.to_string(), "post 2 is unreadable");

        blog.second.broken.set(false);
        let document = ResourceSerializer::new(&*blog.first, &resolver)
            .context(&mut context)
            .document()
            .unwrap();
        assert_eq!(
            document.data().resources()[0].relationship("author").map(|r| &r.data),
            Some(&crate::object::RelationshipData::One(Some(
                ResourceKey::new(1, "authors").to_identifier()
            )))
        );
        let included: Vec<_> = document.included().iter().map(|r| r.key()).collect();
        assert_eq!(
            included,
            [ResourceKey::new(1, "authors"), ResourceKey::new(2, "posts")]
        );
    }
}
