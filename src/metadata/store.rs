use indexmap::IndexMap;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use super::types::{
    HttpVerb, ParameterDescriptor, ParameterList, RequestBodyDescriptor, ResponseDescriptor,
    SecurityRequirement,
};
use crate::middleware::Middleware;

/// Identity of a group type the metadata is attached to
#[derive(Clone, Copy)]
pub struct Target {
    id: TypeId,
    name: &'static str,
}

impl Target {
    /// Target for the group type `T`
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        let full = std::any::type_name::<T>();
        let name = full.rsplit("::").next().unwrap_or(full);
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    /// Short type name, used in logs and error messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Target {}

impl std::hash::Hash for Target {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Metadata concept names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    GroupPath,
    GroupTag,
    GroupDescription,
    Verb,
    RoutePath,
    RouteDescription,
    Responses,
    RequestBody,
    Parameters,
    /// Declared formal parameter types of a member
    ParamTypes,
    Middleware,
    Security,
}

/// A value stored under one concept
#[derive(Clone)]
pub enum MetaValue {
    Text(String),
    Verb(HttpVerb),
    Responses(Vec<ResponseDescriptor>),
    RequestBody(RequestBodyDescriptor),
    Parameters(ParameterList),
    ParamTypes(Vec<String>),
    Middleware(Vec<Arc<dyn Middleware>>),
    Security(Vec<SecurityRequirement>),
}

impl fmt::Debug for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            MetaValue::Verb(v) => f.debug_tuple("Verb").field(v).finish(),
            MetaValue::Responses(r) => f.debug_tuple("Responses").field(r).finish(),
            MetaValue::RequestBody(b) => f.debug_tuple("RequestBody").field(b).finish(),
            MetaValue::Parameters(p) => f.debug_tuple("Parameters").field(p).finish(),
            MetaValue::ParamTypes(t) => f.debug_tuple("ParamTypes").field(t).finish(),
            MetaValue::Middleware(m) => write!(f, "Middleware({} interceptors)", m.len()),
            MetaValue::Security(s) => f.debug_tuple("Security").field(s).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MetaKey {
    target: Target,
    member: Option<String>,
    concept: Concept,
}

impl MetaKey {
    fn new(target: Target, member: Option<&str>, concept: Concept) -> Self {
        Self {
            target,
            member: member.map(str::to_owned),
            concept,
        }
    }
}

/// Keyed store of declarative endpoint metadata
///
/// Entries are addressed by `(target, member, concept)`; `member` is `None`
/// for group-level concepts. Writes either replace a value (`define`) or
/// extend an accumulating one (`push_response`, `set_parameter`). Readers
/// return empty defaults for absent entries.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: IndexMap<MetaKey, MetaValue>,
}

impl MetadataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value under the key
    pub fn define(
        &mut self,
        target: Target,
        member: Option<&str>,
        concept: Concept,
        value: MetaValue,
    ) {
        self.entries
            .insert(MetaKey::new(target, member, concept), value);
    }

    /// Remove the value under the key, returning it
    pub fn remove(
        &mut self,
        target: Target,
        member: Option<&str>,
        concept: Concept,
    ) -> Option<MetaValue> {
        self.entries
            .shift_remove(&MetaKey::new(target, member, concept))
    }

    #[must_use]
    pub fn get(&self, target: Target, member: Option<&str>, concept: Concept) -> Option<&MetaValue> {
        self.entries.get(&MetaKey::new(target, member, concept))
    }

    #[must_use]
    pub fn contains(&self, target: Target, member: Option<&str>, concept: Concept) -> bool {
        self.get(target, member, concept).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text-valued concept (paths, tag, descriptions)
    #[must_use]
    pub fn text(&self, target: Target, member: Option<&str>, concept: Concept) -> Option<&str> {
        match self.get(target, member, concept) {
            Some(MetaValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn group_path(&self, target: Target) -> Option<&str> {
        self.text(target, None, Concept::GroupPath)
    }

    #[must_use]
    pub fn group_tag(&self, target: Target) -> Option<&str> {
        self.text(target, None, Concept::GroupTag)
    }

    #[must_use]
    pub fn group_description(&self, target: Target) -> Option<&str> {
        self.text(target, None, Concept::GroupDescription)
    }

    /// Verb bound to a member; anything stored that is not a verb reads as absent
    #[must_use]
    pub fn verb(&self, target: Target, member: &str) -> Option<HttpVerb> {
        match self.get(target, Some(member), Concept::Verb) {
            Some(MetaValue::Verb(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn route_path(&self, target: Target, member: &str) -> Option<&str> {
        self.text(target, Some(member), Concept::RoutePath)
    }

    #[must_use]
    pub fn route_description(&self, target: Target, member: &str) -> Option<&str> {
        self.text(target, Some(member), Concept::RouteDescription)
    }

    /// Response descriptors in application order
    #[must_use]
    pub fn responses(&self, target: Target, member: &str) -> &[ResponseDescriptor] {
        match self.get(target, Some(member), Concept::Responses) {
            Some(MetaValue::Responses(r)) => r,
            _ => &[],
        }
    }

    /// Append a response descriptor
    pub fn push_response(&mut self, target: Target, member: &str, response: ResponseDescriptor) {
        let entry = self
            .entries
            .entry(MetaKey::new(target, Some(member), Concept::Responses))
            .or_insert_with(|| MetaValue::Responses(Vec::new()));
        match entry {
            MetaValue::Responses(list) => list.push(response),
            other => *other = MetaValue::Responses(vec![response]),
        }
    }

    #[must_use]
    pub fn request_body(&self, target: Target, member: &str) -> Option<&RequestBodyDescriptor> {
        match self.get(target, Some(member), Concept::RequestBody) {
            Some(MetaValue::RequestBody(b)) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn parameters(&self, target: Target, member: &str) -> Option<&ParameterList> {
        match self.get(target, Some(member), Concept::Parameters) {
            Some(MetaValue::Parameters(p)) => Some(p),
            _ => None,
        }
    }

    /// Write a parameter descriptor at `index`, creating the list on first use
    pub fn set_parameter(
        &mut self,
        target: Target,
        member: &str,
        index: usize,
        descriptor: ParameterDescriptor,
    ) {
        let entry = self
            .entries
            .entry(MetaKey::new(target, Some(member), Concept::Parameters))
            .or_insert_with(|| MetaValue::Parameters(ParameterList::new()));
        match entry {
            MetaValue::Parameters(list) => list.set(index, descriptor),
            other => {
                let mut list = ParameterList::new();
                list.set(index, descriptor);
                *other = MetaValue::Parameters(list);
            }
        }
    }

    /// Declared formal parameter types of a member
    #[must_use]
    pub fn param_types(&self, target: Target, member: &str) -> Option<&[String]> {
        match self.get(target, Some(member), Concept::ParamTypes) {
            Some(MetaValue::ParamTypes(t)) => Some(t),
            _ => None,
        }
    }

    /// Interceptors attached to a member, empty when none were recorded
    #[must_use]
    pub fn middleware(&self, target: Target, member: &str) -> &[Arc<dyn Middleware>] {
        match self.get(target, Some(member), Concept::Middleware) {
            Some(MetaValue::Middleware(m)) => m,
            _ => &[],
        }
    }

    #[must_use]
    pub fn security(&self, target: Target, member: &str) -> Option<&[SecurityRequirement]> {
        match self.get(target, Some(member), Concept::Security) {
            Some(MetaValue::Security(s)) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ParameterRole;

    struct Users;
    struct Orders;

    fn response(code: u16) -> ResponseDescriptor {
        ResponseDescriptor {
            status_code: code,
            description: format!("status {code}"),
            content_type: None,
            example: None,
        }
    }

    #[test]
    fn test_define_overwrites() {
        let mut store = MetadataStore::new();
        let t = Target::of::<Users>();
        store.define(t, None, Concept::GroupPath, MetaValue::Text("/a".into()));
        store.define(t, None, Concept::GroupPath, MetaValue::Text("/b".into()));
        assert_eq!(store.group_path(t), Some("/b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_targets_are_isolated() {
        let mut store = MetadataStore::new();
        store.define(
            Target::of::<Users>(),
            None,
            Concept::GroupTag,
            MetaValue::Text("user".into()),
        );
        assert_eq!(store.group_tag(Target::of::<Orders>()), None);
        assert_eq!(Target::of::<Users>().name(), "Users");
    }

    #[test]
    fn test_push_response_preserves_order() {
        let mut store = MetadataStore::new();
        let t = Target::of::<Users>();
        for code in [201, 400, 403, 409] {
            store.push_response(t, "create", response(code));
        }
        let codes: Vec<u16> = store
            .responses(t, "create")
            .iter()
            .map(|r| r.status_code)
            .collect();
        assert_eq!(codes, vec![201, 400, 403, 409]);
        assert!(store.responses(t, "other").is_empty());
    }

    #[test]
    fn test_set_parameter_sparse() {
        let mut store = MetadataStore::new();
        let t = Target::of::<Users>();
        store.set_parameter(
            t,
            "find",
            3,
            ParameterDescriptor {
                key: "name".into(),
                role: ParameterRole::QueryField,
                declared_type: Some("String".into()),
                summary: None,
                example: None,
                required: None,
                deprecated: None,
            },
        );
        let params = store.parameters(t, "find").unwrap();
        assert_eq!(params.len(), 4);
        assert!(params.get(0).is_none());
        assert_eq!(params.get(3).unwrap().key, "name");
    }

    #[test]
    fn test_verb_reader_ignores_wrong_shape() {
        let mut store = MetadataStore::new();
        let t = Target::of::<Users>();
        store.define(t, Some("m"), Concept::Verb, MetaValue::Text("patch".into()));
        assert_eq!(store.verb(t, "m"), None);
        store.define(t, Some("m"), Concept::Verb, MetaValue::Verb(HttpVerb::Get));
        assert_eq!(store.verb(t, "m"), Some(HttpVerb::Get));
    }

    #[test]
    fn test_middleware_defaults_empty() {
        let store = MetadataStore::new();
        assert!(store.middleware(Target::of::<Users>(), "list").is_empty());
        assert!(store.security(Target::of::<Users>(), "list").is_none());
    }
}
