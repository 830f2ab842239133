use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP verbs a member can be bound to
///
/// Serialized lowercase, which is also the key used for operations inside an
/// OpenAPI path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// All supported verbs in declaration order
    pub const ALL: [HttpVerb; 4] = [HttpVerb::Get, HttpVerb::Post, HttpVerb::Put, HttpVerb::Delete];

    /// Lowercase name used in the OpenAPI document
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
        }
    }

    /// Equivalent `http::Method`
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Delete => Method::DELETE,
        }
    }

    /// Map an `http::Method` back to a verb, `None` for anything unsupported
    #[must_use]
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(HttpVerb::Get),
            Method::POST => Some(HttpVerb::Post),
            Method::PUT => Some(HttpVerb::Put),
            Method::DELETE => Some(HttpVerb::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// Where a parameter's runtime value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterRole {
    /// A field of the parsed request body
    BodyField,
    /// A query-string field
    QueryField,
    /// A captured path segment
    UrlSegment,
    /// The inbound request itself
    InjectRequest,
    /// The response channel
    InjectResponse,
}

impl ParameterRole {
    /// Roles that describe a client-visible value and so carry a declared type
    #[must_use]
    pub fn needs_declared_type(&self) -> bool {
        matches!(
            self,
            ParameterRole::BodyField | ParameterRole::QueryField | ParameterRole::UrlSegment
        )
    }

    /// Roles rendered into `operation.parameters`
    #[must_use]
    pub fn is_operation_parameter(&self) -> bool {
        matches!(self, ParameterRole::QueryField | ParameterRole::UrlSegment)
    }
}

/// One annotated formal parameter of a member
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Field/segment name, or `request`/`response` for injected slots
    pub key: String,
    pub role: ParameterRole,
    /// Type name taken from the member signature at this position
    pub declared_type: Option<String>,
    pub summary: Option<String>,
    pub example: Option<Value>,
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
}

impl ParameterDescriptor {
    /// Whether the parameter is flagged required (absent means optional)
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Positional, possibly sparse, list of parameter descriptors
///
/// Slot `i` describes formal parameter `i`. Positions that were never
/// annotated stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    slots: Vec<Option<ParameterDescriptor>>,
}

impl ParameterList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `descriptor` at `index`, growing the list with empty slots
    pub fn set(&mut self, index: usize, descriptor: ParameterDescriptor) {
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(descriptor);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ParameterDescriptor> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Length including empty slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<ParameterDescriptor>] {
        &self.slots
    }

    /// Filled slots in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ParameterDescriptor)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|d| (i, d)))
    }
}

/// A possible response of a member
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status_code: u16,
    pub description: String,
    pub content_type: Option<String>,
    pub example: Option<Value>,
}

/// Request body declared on a member
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyDescriptor {
    pub content_type: String,
    pub description: Option<String>,
    pub required: Option<bool>,
}

/// Named security requirement: scheme name to required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(key: &str) -> ParameterDescriptor {
        ParameterDescriptor {
            key: key.to_string(),
            role: ParameterRole::QueryField,
            declared_type: Some("String".to_string()),
            summary: None,
            example: None,
            required: None,
            deprecated: None,
        }
    }

    #[test]
    fn test_parameter_list_sparse_set() {
        let mut list = ParameterList::new();
        list.set(2, descriptor("name"));
        assert_eq!(list.len(), 3);
        assert!(list.get(0).is_none());
        assert!(list.get(1).is_none());
        assert_eq!(list.get(2).map(|d| d.key.as_str()), Some("name"));
        let filled: Vec<usize> = list.iter().map(|(i, _)| i).collect();
        assert_eq!(filled, vec![2]);
    }

    #[test]
    fn test_parameter_list_overwrite_keeps_length() {
        let mut list = ParameterList::new();
        list.set(1, descriptor("a"));
        list.set(0, descriptor("b"));
        list.set(1, descriptor("c"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).map(|d| d.key.as_str()), Some("c"));
    }

    #[test]
    fn test_verb_names() {
        assert_eq!(HttpVerb::Delete.as_str(), "delete");
        assert_eq!(HttpVerb::Post.to_string(), "POST");
        assert_eq!(HttpVerb::from_method(&Method::PATCH), None);
        assert_eq!(HttpVerb::from_method(&Method::PUT), Some(HttpVerb::Put));
    }
}
