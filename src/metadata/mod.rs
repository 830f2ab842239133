//! # Metadata Module
//!
//! Declarative endpoint metadata attached to group types and their members.
//!
//! ## Overview
//!
//! Every annotation applied while a group declares itself writes into a
//! [`MetadataStore`]. The dispatcher reads the store to wire routes and the
//! document synthesizer reads the same entries to render OpenAPI operations.
//!
//! Entries are keyed by `(target, member, concept)`:
//!
//! | Concept | Level | Written by |
//! |---|---|---|
//! | `GroupPath`, `GroupTag`, `GroupDescription` | group | `annotations::group` |
//! | `Verb`, `RoutePath`, `RouteDescription` | member | `annotations::http_get` and friends |
//! | `Responses` | member | `annotations::http_response` (accumulates) |
//! | `RequestBody` | member | `annotations::request_body` |
//! | `Parameters` | member | parameter binders (positional) |
//! | `ParamTypes` | member | `Declaration::method` signature |
//! | `Middleware`, `Security` | member | `annotations::middleware`, `annotations::security` |

mod store;
mod types;

pub use store::{Concept, MetaValue, MetadataStore, Target};
pub use types::{
    HttpVerb, ParameterDescriptor, ParameterList, ParameterRole, RequestBodyDescriptor,
    ResponseDescriptor, SecurityRequirement,
};
