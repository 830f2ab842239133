//! OpenAPI 3.0 document model.
//!
//! Only the parts the synthesizer writes are typed; overlay sections it merely
//! carries through (`servers`, `components`, `security`, ...) stay as raw JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::metadata::{HttpVerb, SecurityRequirement};

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Default `info` block
#[must_use]
pub fn default_info() -> Value {
    json!({ "title": "General API", "version": "1" })
}

/// OpenAPI document root object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub openapi: String,
    pub info: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, PathItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: default_info(),
            servers: None,
            paths: None,
            webhooks: None,
            components: None,
            security: None,
            tags: None,
            external_docs: None,
        }
    }
}

impl Document {
    /// Operation for `path` and `verb`, created if absent
    pub fn operation_mut(&mut self, path: &str, verb: HttpVerb) -> &mut Operation {
        self.paths
            .get_or_insert_with(IndexMap::new)
            .entry(path.to_string())
            .or_default()
            .entry(verb)
            .or_default()
    }

    #[must_use]
    pub fn operation(&self, path: &str, verb: HttpVerb) -> Option<&Operation> {
        self.paths.as_ref()?.get(path)?.get(&verb)
    }

    /// Append a global tag unless one with the same name exists
    pub fn add_tag_if_absent(&mut self, tag: Tag) -> bool {
        let tags = self.tags.get_or_insert_with(Vec::new);
        if tags.iter().any(|t| t.name == tag.name) {
            return false;
        }
        tags.push(tag);
        true
    }
}

/// Operations of one path keyed by verb
pub type PathItem = IndexMap<HttpVerb, Operation>;

/// One operation of a path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Keyed by status code rendered as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, Response>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// The small schema subset the synthesizer emits
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Schema {
    #[must_use]
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: IndexMap<String, MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Path,
}

/// Query or path parameter of an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Global tag object
///
/// Fields beyond `name` and `description` (e.g. `externalDocs`) are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_description(name: &str, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::new(name)
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::new(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag {
            name,
            description: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_shape() {
        let value = serde_json::to_value(Document::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "openapi": "3.0.1",
                "info": { "title": "General API", "version": "1" }
            })
        );
    }

    #[test]
    fn test_operation_mut_creates_path_and_verb() {
        let mut doc = Document::default();
        doc.operation_mut("/user", HttpVerb::Post).description = Some("Create".into());
        doc.operation_mut("/user", HttpVerb::Get);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["paths"]["/user"]["post"]["description"], "Create");
        assert!(value["paths"]["/user"]["get"].is_object());
        let verbs: Vec<&String> = value["paths"]["/user"].as_object().unwrap().keys().collect();
        assert_eq!(verbs, vec!["post", "get"]);
    }

    #[test]
    fn test_tag_keeps_extra_fields() {
        let tag: Tag = serde_json::from_value(json!({
            "name": "pets",
            "externalDocs": { "url": "https://example.com" }
        }))
        .unwrap();
        assert_eq!(tag.name, "pets");
        assert!(tag.extra.contains_key("externalDocs"));
        let back = serde_json::to_value(&tag).unwrap();
        assert_eq!(back["externalDocs"]["url"], "https://example.com");
        assert!(back.get("description").is_none());
    }

    #[test]
    fn test_add_tag_if_absent() {
        let mut doc = Document::default();
        assert!(doc.add_tag_if_absent(Tag::with_description("user", "first")));
        assert!(!doc.add_tag_if_absent(Tag::with_description("user", "second")));
        let tags = doc.tags.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].description.as_deref(), Some("first"));
    }
}
