//! # Group Module
//!
//! A *group* is a type whose members become routes. Instead of reflecting on
//! the type at runtime, a group declares its members explicitly: each member
//! gets a name, the declared types of its formal parameters, and a function
//! taking the instance plus positional [`Args`].
//!
//! ```rust,ignore
//! impl Group for UserController {
//!     fn declare(decl: &mut Declaration<Self>) -> Result<(), ConfigError> {
//!         decl.group(group("/user").tag("user"));
//!         decl.method("list_users", &["boolean", "string", "Response"], Self::list_users)
//!             .with(http_get("/"))
//!             .param(0, query("active"))?
//!             .param(1, query("name"))?
//!             .param(2, response())?;
//!         Ok(())
//!     }
//! }
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::annotations::{GroupBinder, MethodBinder, ParamBinder};
use crate::dispatcher::{HandlerRequest, Responder};
use crate::error::ConfigError;
use crate::metadata::{Concept, MetaValue, MetadataStore, Target};

/// A type whose members are wired as routes
pub trait Group: Send + Sync + Sized + 'static {
    /// Record group and member metadata
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a parameter annotation does not fit the
    /// member signature.
    fn declare(decl: &mut Declaration<Self>) -> Result<(), ConfigError>;
}

/// Member implementation: instance plus positional arguments
pub type MemberFn<G> = Arc<dyn Fn(&G, Args) + Send + Sync>;

struct Member<G> {
    name: String,
    func: MemberFn<G>,
}

/// Declared metadata and members of one group type
pub struct Declaration<G> {
    target: Target,
    store: MetadataStore,
    members: Vec<Member<G>>,
}

impl<G: Group> Default for Declaration<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Group> Declaration<G> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: Target::of::<G>(),
            store: MetadataStore::new(),
            members: Vec::new(),
        }
    }

    /// Run `G::declare` on a fresh declaration
    ///
    /// # Errors
    ///
    /// Propagates the first [`ConfigError`] raised while declaring.
    pub fn of() -> Result<Self, ConfigError> {
        let mut decl = Self::new();
        G::declare(&mut decl)?;
        Ok(decl)
    }

    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    #[must_use]
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MetadataStore {
        &mut self.store
    }

    /// Apply a group-level annotation
    pub fn group(&mut self, binder: GroupBinder) -> &mut Self {
        binder.bind(&mut self.store, self.target);
        self
    }

    /// Declare a member
    ///
    /// `signature` lists the declared type of every formal parameter; its
    /// length is the member arity. Declaring the same name again replaces the
    /// implementation and signature, drops its parameter annotations and keeps
    /// the original position.
    pub fn method<F>(&mut self, name: &str, signature: &[&str], func: F) -> MethodDecl<'_, G>
    where
        F: Fn(&G, Args) + Send + Sync + 'static,
    {
        // Descriptors bound against the previous signature no longer apply
        self.store.remove(self.target, Some(name), Concept::Parameters);
        self.store.define(
            self.target,
            Some(name),
            Concept::ParamTypes,
            MetaValue::ParamTypes(signature.iter().map(|s| (*s).to_string()).collect()),
        );
        let func: MemberFn<G> = Arc::new(func);
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.func = func,
            None => self.members.push(Member {
                name: name.to_string(),
                func,
            }),
        }
        MethodDecl {
            decl: self,
            member: name.to_string(),
        }
    }

    /// Member names in declaration order
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    #[must_use]
    pub fn member_fn(&self, name: &str) -> Option<MemberFn<G>> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| Arc::clone(&m.func))
    }
}

impl<G> fmt::Debug for Declaration<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("target", &self.target)
            .field(
                "members",
                &self.members.iter().map(|m| &m.name).collect::<Vec<_>>(),
            )
            .field("entries", &self.store.len())
            .finish()
    }
}

/// Builder returned by [`Declaration::method`] to annotate one member
pub struct MethodDecl<'a, G> {
    decl: &'a mut Declaration<G>,
    member: String,
}

impl<G: Group> MethodDecl<'_, G> {
    /// Apply a member-level annotation
    pub fn with(mut self, binder: impl MethodBinder) -> Self {
        binder.bind(&mut self.decl.store, self.decl.target, &self.member);
        self
    }

    /// Annotate formal parameter `index`
    ///
    /// # Errors
    ///
    /// See [`ParamBinder::bind`].
    pub fn param(mut self, index: usize, binder: ParamBinder) -> Result<Self, ConfigError> {
        binder.bind(&mut self.decl.store, self.decl.target, &self.member, index)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.member
    }
}

/// One positional argument handed to a member
#[derive(Debug, Clone)]
pub enum Arg {
    /// The inbound request
    Request(HandlerRequest),
    /// The response channel
    Response(Responder),
    /// Raw body, query or path value; `None` when the client omitted it
    Value(Option<Value>),
    /// Position without a parameter annotation
    Unbound,
}

impl Arg {
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(v) => v.as_ref(),
            _ => None,
        }
    }
}

/// Positional arguments of one invocation, one per formal parameter
#[derive(Debug, Clone, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    #[must_use]
    pub fn new(args: Vec<Arg>) -> Self {
        Self(args)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.0.iter()
    }

    /// Value at `index`, `None` if absent or not a value slot
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.get(index).and_then(Arg::as_value)
    }

    #[must_use]
    pub fn str(&self, index: usize) -> Option<&str> {
        self.value(index).and_then(Value::as_str)
    }

    /// Boolean value; query strings `"true"`/`"false"` are accepted too
    #[must_use]
    pub fn bool(&self, index: usize) -> Option<bool> {
        match self.value(index)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn request(&self, index: usize) -> Option<&HandlerRequest> {
        match self.get(index) {
            Some(Arg::Request(req)) => Some(req),
            _ => None,
        }
    }

    #[must_use]
    pub fn responder(&self, index: usize) -> Option<&Responder> {
        match self.get(index) {
            Some(Arg::Response(res)) => Some(res),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Arg> {
        self.0
    }
}

impl IntoIterator for Args {
    type Item = Arg;
    type IntoIter = std::vec::IntoIter<Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
