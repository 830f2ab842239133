//! # Annotations Module
//!
//! Functions that describe a group or one of its members. Each returns a
//! binder value; applying the binder writes its description into a
//! [`MetadataStore`](crate::metadata::MetadataStore).
//!
//! ## Example
//!
//! ```rust,ignore
//! use routedoc::annotations::*;
//!
//! decl.group(group("/user").tag("user").description("Create and manage users"));
//! decl.method("list_users", &["boolean", "string", "Response"], UserController::list_users)
//!     .with(http_get("/"))
//!     .with(http_response(200, "Success"))
//!     .param(0, query("active"))?
//!     .param(1, query("name"))?
//!     .param(2, response())?;
//! ```
//!
//! Group and route binders overwrite what was recorded before. Response
//! binders accumulate in application order. Parameter binders write a single
//! position of the member's parameter list.

mod param;
mod route;

pub use param::{body_field, query, request, response, url_param, ParamBinder};
pub use route::{
    http_delete, http_get, http_post, http_put, http_response, middleware, request_body,
    requirement, security, MiddlewareBinder, RequestBodyBinder, ResponseBinder, RouteBinder,
};

use crate::metadata::{Concept, MetaValue, MetadataStore, Target};

/// A member-level annotation
pub trait MethodBinder {
    fn bind(self, store: &mut MetadataStore, target: Target, member: &str);
}

/// Group-level annotation: path prefix, tag and tag description
#[derive(Debug, Clone, Default)]
pub struct GroupBinder {
    path: Option<String>,
    tag: Option<String>,
    description: Option<String>,
}

impl GroupBinder {
    #[must_use]
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Write all three group concepts; unset values clear earlier ones
    pub fn bind(self, store: &mut MetadataStore, target: Target) {
        for (concept, value) in [
            (Concept::GroupPath, self.path),
            (Concept::GroupTag, self.tag),
            (Concept::GroupDescription, self.description),
        ] {
            match value {
                Some(text) => store.define(target, None, concept, MetaValue::Text(text)),
                None => {
                    store.remove(target, None, concept);
                }
            }
        }
    }
}

/// Group annotation with a path prefix
#[must_use]
pub fn group(path: &str) -> GroupBinder {
    GroupBinder {
        path: Some(path.to_string()),
        ..GroupBinder::default()
    }
}
