//! # OpenAPI Module
//!
//! Synthesizes an OpenAPI 3.0.1 document from the metadata of wired routes.
//!
//! ## Overview
//!
//! - [`DocumentService`] holds one live [`Document`] shared by every clone
//! - [`DocumentService::record_route`] is called once per wired member and
//!   renders its path, verb, description, tags, responses, request body,
//!   query/path parameters and security into the document
//! - A static overlay file (`OpenAPI.json` next to the executable by default)
//!   replaces the top-level `info`, `servers`, `webhooks`, `components`,
//!   `security`, `tags` and `externalDocs` sections. It is loaded lazily on the
//!   first [`DocumentService::get_document`] call.
//! - [`DocumentHandler`] renders the live document on every request
//!
//! ## Example
//!
//! ```rust,ignore
//! use routedoc::openapi::DocumentService;
//!
//! let docs = DocumentService::with_overlay_path("config/OpenAPI.json");
//! let router = routedoc::dispatcher::register_group(UserController::default(), &docs)?;
//! let handler = docs.get_document()?;
//! println!("{}", handler.render()?);
//! ```
//!
//! Overwrites are last-write-wins: registering the same path and verb twice
//! updates the existing operation in place.

mod overlay;
mod service;
mod types;

pub use overlay::{default_overlay_path, Overlay, OVERLAY_FILE_NAME};
pub use service::{DocumentHandler, DocumentService};
pub use types::{
    default_info, Document, MediaType, Operation, Parameter, ParameterLocation, PathItem,
    RequestBody, Response, Schema, Tag, OPENAPI_VERSION,
};
