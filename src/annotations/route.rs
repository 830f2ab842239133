use serde_json::Value;
use std::sync::Arc;

use super::MethodBinder;
use crate::metadata::{
    Concept, HttpVerb, MetaValue, MetadataStore, RequestBodyDescriptor, ResponseDescriptor,
    SecurityRequirement, Target,
};
use crate::middleware::Middleware;

/// Binds a verb and a route path (plus optional description) to a member
#[derive(Debug, Clone)]
pub struct RouteBinder {
    verb: HttpVerb,
    path: String,
    description: Option<String>,
}

impl RouteBinder {
    #[must_use]
    pub fn new(verb: HttpVerb, path: &str) -> Self {
        Self {
            verb,
            path: path.to_string(),
            description: None,
        }
    }

    /// Operation description rendered into the document
    #[must_use]
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

impl MethodBinder for RouteBinder {
    fn bind(self, store: &mut MetadataStore, target: Target, member: &str) {
        store.define(target, Some(member), Concept::Verb, MetaValue::Verb(self.verb));
        store.define(
            target,
            Some(member),
            Concept::RoutePath,
            MetaValue::Text(self.path),
        );
        if let Some(description) = self.description {
            store.define(
                target,
                Some(member),
                Concept::RouteDescription,
                MetaValue::Text(description),
            );
        }
    }
}

#[must_use]
pub fn http_get(path: &str) -> RouteBinder {
    RouteBinder::new(HttpVerb::Get, path)
}

#[must_use]
pub fn http_post(path: &str) -> RouteBinder {
    RouteBinder::new(HttpVerb::Post, path)
}

#[must_use]
pub fn http_put(path: &str) -> RouteBinder {
    RouteBinder::new(HttpVerb::Put, path)
}

#[must_use]
pub fn http_delete(path: &str) -> RouteBinder {
    RouteBinder::new(HttpVerb::Delete, path)
}

/// Appends one possible response to a member
#[derive(Debug, Clone)]
pub struct ResponseBinder {
    descriptor: ResponseDescriptor,
}

impl ResponseBinder {
    /// Attach a content type and an example payload to the response
    #[must_use]
    pub fn content(mut self, content_type: &str, example: impl Into<Value>) -> Self {
        self.descriptor.content_type = Some(content_type.to_string());
        self.descriptor.example = Some(example.into());
        self
    }

    /// Attach a content type without an example
    #[must_use]
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.descriptor.content_type = Some(content_type.to_string());
        self
    }
}

impl MethodBinder for ResponseBinder {
    fn bind(self, store: &mut MetadataStore, target: Target, member: &str) {
        store.push_response(target, member, self.descriptor);
    }
}

#[must_use]
pub fn http_response(status_code: u16, description: &str) -> ResponseBinder {
    ResponseBinder {
        descriptor: ResponseDescriptor {
            status_code,
            description: description.to_string(),
            content_type: None,
            example: None,
        },
    }
}

/// Declares the request body of a member
#[derive(Debug, Clone)]
pub struct RequestBodyBinder {
    descriptor: RequestBodyDescriptor,
}

impl RequestBodyBinder {
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.descriptor.description = Some(description.to_string());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.descriptor.required = Some(required);
        self
    }
}

impl MethodBinder for RequestBodyBinder {
    fn bind(self, store: &mut MetadataStore, target: Target, member: &str) {
        store.define(
            target,
            Some(member),
            Concept::RequestBody,
            MetaValue::RequestBody(self.descriptor),
        );
    }
}

#[must_use]
pub fn request_body(content_type: &str) -> RequestBodyBinder {
    RequestBodyBinder {
        descriptor: RequestBodyDescriptor {
            content_type: content_type.to_string(),
            description: None,
            required: None,
        },
    }
}

/// Records interceptors and/or security requirements on a member
///
/// Each list is written only when it was set, so `middleware(..)` and
/// `security(..)` can be applied separately without clearing each other.
#[derive(Clone, Default)]
pub struct MiddlewareBinder {
    middleware: Option<Vec<Arc<dyn Middleware>>>,
    security: Option<Vec<SecurityRequirement>>,
}

impl MiddlewareBinder {
    #[must_use]
    pub fn security(mut self, requirements: Vec<SecurityRequirement>) -> Self {
        self.security = Some(requirements);
        self
    }

    #[must_use]
    pub fn middleware(mut self, interceptors: Vec<Arc<dyn Middleware>>) -> Self {
        self.middleware = Some(interceptors);
        self
    }
}

impl MethodBinder for MiddlewareBinder {
    fn bind(self, store: &mut MetadataStore, target: Target, member: &str) {
        if let Some(list) = self.middleware {
            store.define(
                target,
                Some(member),
                Concept::Middleware,
                MetaValue::Middleware(list),
            );
        }
        if let Some(list) = self.security {
            store.define(
                target,
                Some(member),
                Concept::Security,
                MetaValue::Security(list),
            );
        }
    }
}

#[must_use]
pub fn middleware(interceptors: Vec<Arc<dyn Middleware>>) -> MiddlewareBinder {
    MiddlewareBinder::default().middleware(interceptors)
}

#[must_use]
pub fn security(requirements: Vec<SecurityRequirement>) -> MiddlewareBinder {
    MiddlewareBinder::default().security(requirements)
}

/// Build a single security requirement from `(scheme, scopes)` pairs
#[must_use]
pub fn requirement<'a, I>(schemes: I) -> SecurityRequirement
where
    I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
{
    schemes
        .into_iter()
        .map(|(name, scopes)| {
            (
                name.to_string(),
                scopes.iter().map(|s| (*s).to_string()).collect(),
            )
        })
        .collect()
}
