//! An in-memory blog standing in for a database-backed domain layer.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use jsonapi_reflect::{AccessError, AccessResult, DescriptorRegistry, RelationshipOptions};
use jsonapi_reflect::{Resolver, Resource, ResourceDescriptor, ResourceId, ResourceRef, Value};

// -----------------------------------------------------------------------------
// Author

pub struct Author {
    pub id: i64,
    pub name: &'static str,
    pub email: &'static str,
    pub posts: RefCell<Vec<Rc<Post>>>,
    /// Report `posts` as already loaded.
    pub preloaded: Cell<bool>,
    /// Expose a `post_ids` accessor.
    pub bulk_ids: Cell<bool>,
    /// Number of `posts` loads.
    pub loads: Cell<usize>,
}

impl Author {
    pub fn new(id: i64, name: &'static str, email: &'static str) -> Self {
        Self {
            id,
            name,
            email,
            posts: RefCell::default(),
            preloaded: Cell::new(false),
            bulk_ids: Cell::new(true),
            loads: Cell::new(0),
        }
    }

    fn post_refs(&self) -> Vec<ResourceRef> {
        self.posts
            .borrow()
            .iter()
            .map(|post| Rc::clone(post) as ResourceRef)
            .collect()
    }
}

impl Resource for Author {
    fn id(&self) -> ResourceId {
        self.id.into()
    }

    fn type_name(&self) -> &str {
        "Author"
    }

    fn attribute(&self, name: &str) -> AccessResult<Value> {
        match name {
            "name" => Ok(self.name.into()),
            "email" => Ok(self.email.into()),
            _ => Err(AccessError::unsupported(self.type_name(), name)),
        }
    }

    fn foreign_keys(&self, accessor: &str) -> Option<AccessResult<Vec<ResourceId>>> {
        if accessor != "post_ids" || !self.bulk_ids.get() {
            return None;
        }
        Some(Ok(self.posts.borrow().iter().map(|p| p.id()).collect()))
    }

    fn loaded_many(&self, name: &str) -> Option<Vec<ResourceRef>> {
        (name == "posts" && self.preloaded.get()).then(|| self.post_refs())
    }

    fn related_many(&self, name: &str) -> AccessResult<Vec<ResourceRef>> {
        match name {
            "posts" => {
                self.loads.set(self.loads.get() + 1);
                Ok(self.post_refs())
            }
            _ => Err(AccessError::unsupported(self.type_name(), name)),
        }
    }
}

// -----------------------------------------------------------------------------
// Post

pub struct Post {
    pub id: i64,
    pub title: &'static str,
    pub body: &'static str,
    pub author: RefCell<Weak<Author>>,
    /// Expose an `author_id` accessor.
    pub foreign_key: Cell<bool>,
    /// Fail every attribute read.
    pub broken: Cell<bool>,
    /// Number of attribute reads.
    pub reads: Cell<usize>,
}

impl Post {
    pub fn new(id: i64, title: &'static str, body: &'static str) -> Self {
        Self {
            id,
            title,
            body,
            author: RefCell::default(),
            foreign_key: Cell::new(true),
            broken: Cell::new(false),
            reads: Cell::new(0),
        }
    }
}

impl Resource for Post {
    fn id(&self) -> ResourceId {
        self.id.into()
    }

    fn type_name(&self) -> &str {
        "Post"
    }

    fn attribute(&self, name: &str) -> AccessResult<Value> {
        self.reads.set(self.reads.get() + 1);
        if self.broken.get() {
            return Err(AccessError::custom(format!("post {} is unreadable", self.id)));
        }
        match name {
            "title" => Ok(self.title.into()),
            "body" => Ok(self.body.into()),
            _ => Err(AccessError::unsupported(self.type_name(), name)),
        }
    }

    fn foreign_key(&self, accessor: &str) -> Option<AccessResult<Option<ResourceId>>> {
        if accessor != "author_id" || !self.foreign_key.get() {
            return None;
        }
        Some(Ok(self.author.borrow().upgrade().map(|a| a.id())))
    }

    fn related_one(&self, name: &str) -> AccessResult<Option<ResourceRef>> {
        match name {
            "author" => Ok(self
                .author
                .borrow()
                .upgrade()
                .map(|author| author as ResourceRef)),
            _ => Err(AccessError::unsupported(self.type_name(), name)),
        }
    }
}

// -----------------------------------------------------------------------------
// Comment

/// A type with no registered descriptor and a textual id.
pub struct Comment(pub &'static str);

impl Resource for Comment {
    fn id(&self) -> ResourceId {
        self.0.into()
    }

    fn type_name(&self) -> &str {
        "Comment"
    }

    fn attribute(&self, name: &str) -> AccessResult<Value> {
        Err(AccessError::unsupported(self.type_name(), name))
    }
}

// -----------------------------------------------------------------------------
// Blog

/// `fred` and his two posts, linked both ways.
pub struct Blog {
    pub author: Rc<Author>,
    pub first: Rc<Post>,
    pub second: Rc<Post>,
}

pub fn blog() -> Blog {
    let author = Rc::new(Author::new(1, "fred", "fred@x"));
    let first = Rc::new(Post::new(1, "hello", "first post"));
    let second = Rc::new(Post::new(2, "again", "second post"));

    for post in [&first, &second] {
        *post.author.borrow_mut() = Rc::downgrade(&author);
        author.posts.borrow_mut().push(Rc::clone(post));
    }

    Blog {
        author,
        first,
        second,
    }
}

// -----------------------------------------------------------------------------
// Descriptors

pub fn author_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("Author")
        .attributes(["id", "name", "email", "post_ids"])
        .build()
        .unwrap()
}

pub fn post_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::builder("Post")
        .attributes(["id", "title", "body", "author_id"])
        .build()
        .unwrap()
}

/// Identifiers only, nothing inlined.
pub fn resolver() -> Resolver {
    let mut registry = DescriptorRegistry::new();
    registry.register(author_descriptor());
    registry.register(post_descriptor());
    Resolver::new(registry)
}

/// Posts inline their author, authors inline their posts.
pub fn linked_resolver() -> Resolver {
    let mut registry = DescriptorRegistry::new();
    registry.register(
        ResourceDescriptor::builder("Author")
            .attributes(["name", "email"])
            .has_many("posts", RelationshipOptions::included())
            .build()
            .unwrap(),
    );
    registry.register(
        ResourceDescriptor::builder("Post")
            .attributes(["title"])
            .has_one("author", RelationshipOptions::included())
            .build()
            .unwrap(),
    );
    Resolver::new(registry)
}
