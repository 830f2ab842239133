use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info};

use super::overlay::{default_overlay_path, Overlay};
use super::types::{
    Document, MediaType, Parameter, ParameterLocation, RequestBody, Response, Schema, Tag,
};
use crate::dispatcher::{join_paths, HandlerRequest, Responder, RouteHandler};
use crate::error::DocumentError;
use crate::metadata::{MetadataStore, ParameterRole, Target};

#[derive(Debug, Default)]
struct OverlayState {
    /// Explicit overlay path; the default location is used when unset
    path: Option<PathBuf>,
    /// Path the overlay was last loaded from
    loaded: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct Inner {
    document: RwLock<Document>,
    overlay: Mutex<OverlayState>,
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.document.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide OpenAPI document built from route metadata
///
/// Cloning is cheap; every clone shares the same document. Pass one
/// instance to every [`register_group`](crate::dispatcher::register_group)
/// call and serve it through [`DocumentService::get_document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentService {
    inner: Arc<Inner>,
}

impl DocumentService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service whose overlay is read from `path` instead of the default location
    #[must_use]
    pub fn with_overlay_path(path: impl Into<PathBuf>) -> Self {
        let service = Self::new();
        service.set_overlay_path(path);
        service
    }

    /// Use `path` for the overlay; it is loaded on the next document request
    pub fn set_overlay_path(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(path = %path.display(), "Overlay path set");
        let mut state = self.inner.overlay.lock().unwrap_or_else(PoisonError::into_inner);
        state.path = Some(path);
    }

    /// Overlay path currently in effect
    #[must_use]
    pub fn overlay_path(&self) -> PathBuf {
        let state = self.inner.overlay.lock().unwrap_or_else(PoisonError::into_inner);
        state.path.clone().unwrap_or_else(default_overlay_path)
    }

    /// Load the overlay unless it was already loaded from the current path
    ///
    /// A missing file counts as loaded. Returns `true` when this call read
    /// the overlay location.
    ///
    /// # Errors
    ///
    /// Propagates read and parse failures; the load is retried on the next call.
    pub fn load_overlay(&self) -> Result<bool, DocumentError> {
        let mut state = self.inner.overlay.lock().unwrap_or_else(PoisonError::into_inner);
        let path = state.path.clone().unwrap_or_else(default_overlay_path);
        if state.loaded.as_ref() == Some(&path) {
            return Ok(false);
        }

        match Overlay::load(&path) {
            Ok(Some(overlay)) => {
                let applied = overlay.apply(&mut self.inner.write());
                info!(path = %path.display(), sections = ?applied, "Overlay applied");
            }
            Ok(None) => {}
            Err(e) => {
                error!(path = %path.display(), error = %e, "Overlay load failed");
                return Err(e);
            }
        }
        state.loaded = Some(path);
        Ok(true)
    }

    /// Document request handler
    ///
    /// Loads the overlay on first use. The returned handler renders the live
    /// document on every call, so later registrations and mutations show up.
    ///
    /// # Errors
    ///
    /// Returns the overlay [`DocumentError`] when the overlay is unreadable
    /// or malformed.
    pub fn get_document(&self) -> Result<DocumentHandler, DocumentError> {
        self.load_overlay()?;
        Ok(DocumentHandler {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Replace the `info` block
    pub fn set_info(&self, info: Value) {
        self.inner.write().info = info;
    }

    /// Shallow-merge `fields` into the `info` block
    pub fn merge_info(&self, fields: Map<String, Value>) {
        let mut doc = self.inner.write();
        match doc.info.as_object_mut() {
            Some(info) => info.extend(fields),
            None => doc.info = Value::Object(fields),
        }
    }

    /// Append global tags; names and full tag objects are both accepted
    pub fn add_tags<I, T>(&self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        let mut doc = self.inner.write();
        doc.tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
    }

    /// Restore the default document and forget the loaded overlay
    ///
    /// The overlay path is kept.
    pub fn reset(&self) {
        *self.inner.write() = Document::default();
        let mut state = self.inner.overlay.lock().unwrap_or_else(PoisonError::into_inner);
        state.loaded = None;
        debug!("Document reset");
    }

    /// Copy of the current document
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.inner.read().clone()
    }

    /// Render one wired member into the document
    ///
    /// Reads the member's verb, paths, responses, request body, parameters
    /// and security from `store`. Members without a verb are ignored.
    pub fn record_route(&self, store: &MetadataStore, target: Target, member: &str) {
        let Some(verb) = store.verb(target, member) else {
            debug!(group = %target.name(), member = %member, "No verb - not documented");
            return;
        };
        let path = join_paths(
            store.group_path(target).unwrap_or(""),
            store.route_path(target, member).unwrap_or(""),
        );
        let tag = store.group_tag(target);
        let params = store.parameters(target, member);

        let mut doc = self.inner.write();
        let operation = doc.operation_mut(&path, verb);

        if let Some(description) = store.route_description(target, member) {
            operation.description = Some(description.to_string());
        }
        if let Some(tag) = tag {
            operation.tags = Some(vec![tag.to_string()]);
        }

        for descriptor in store.responses(target, member) {
            let mut response = Response {
                description: descriptor.description.clone(),
                content: None,
            };
            if let Some(content_type) = &descriptor.content_type {
                let schema_type = match descriptor.example {
                    Some(Value::Array(_)) => "array",
                    _ => "string",
                };
                let mut content = IndexMap::new();
                content.insert(
                    content_type.clone(),
                    MediaType {
                        schema: Some(Schema::of_type(schema_type)),
                        example: descriptor.example.clone(),
                    },
                );
                response.content = Some(content);
            }
            operation
                .responses
                .get_or_insert_with(IndexMap::new)
                .insert(descriptor.status_code.to_string(), response);
        }

        if let Some(body) = store.request_body(target, member) {
            let mut request_body = RequestBody {
                description: body.description.clone(),
                content: IndexMap::new(),
                required: body.required,
            };
            let body_params = params
                .into_iter()
                .flat_map(|p| p.iter())
                .filter(|(_, p)| p.role == ParameterRole::BodyField);
            for (_, param) in body_params {
                let media = request_body
                    .content
                    .entry(body.content_type.clone())
                    .or_insert_with(|| MediaType {
                        schema: Some(Schema::of_type("object")),
                        example: None,
                    });
                let schema = media.schema.get_or_insert_with(|| Schema::of_type("object"));
                schema.properties.get_or_insert_with(IndexMap::new).insert(
                    param.key.clone(),
                    Schema {
                        schema_type: param.declared_type.clone(),
                        ..Schema::default()
                    },
                );
                if let Some(example) = &param.example {
                    schema
                        .example
                        .get_or_insert_with(Map::new)
                        .insert(param.key.clone(), example.clone());
                }
                if param.is_required() {
                    schema
                        .required
                        .get_or_insert_with(Vec::new)
                        .push(param.key.clone());
                }
            }
            operation.request_body = Some(request_body);
        }

        let parameters: Vec<Parameter> = params
            .into_iter()
            .flat_map(|p| p.iter())
            .filter(|(_, p)| p.role.is_operation_parameter())
            .map(|(_, param)| Parameter {
                name: param.key.clone(),
                location: if param.role == ParameterRole::UrlSegment {
                    ParameterLocation::Path
                } else {
                    ParameterLocation::Query
                },
                description: param.summary.clone(),
                required: param.is_required(),
                deprecated: param.deprecated,
                schema: Schema {
                    schema_type: param.declared_type.as_ref().map(|t| t.to_lowercase()),
                    ..Schema::default()
                },
                example: param.example.clone(),
            })
            .collect();
        operation.parameters = if parameters.is_empty() {
            None
        } else {
            Some(parameters)
        };

        if let Some(security) = store.security(target, member) {
            operation.security = Some(security.to_vec());
        }

        if let (Some(tag), Some(description)) = (tag, store.group_description(target)) {
            doc.add_tag_if_absent(Tag::with_description(tag, description));
        }

        debug!(
            group = %target.name(),
            member = %member,
            verb = %verb,
            path = %path,
            "Route documented"
        );
    }
}

/// Serves the live document
#[derive(Debug, Clone)]
pub struct DocumentHandler {
    inner: Arc<Inner>,
}

impl DocumentHandler {
    /// Serialize the current document
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only happens for non-JSON values.
    pub fn render(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&*self.inner.read())
    }

    /// Answer a document request on `res`
    pub fn handle(&self, req: &HandlerRequest, res: &Responder) {
        match self.render() {
            Ok(document) => res.send(document),
            Err(e) => {
                error!(request_id = %req.request_id, error = %e, "Document render failed");
                res.send_status(500, serde_json::json!({ "error": e.to_string() }));
            }
        }
    }

    /// Route handler answering with the document
    #[must_use]
    pub fn into_route_handler(self) -> RouteHandler {
        RouteHandler::new("DocumentHandler", move |req: HandlerRequest| {
            let res = req.responder();
            self.handle(&req, &res);
        })
    }
}
