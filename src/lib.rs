//! # routedoc
//!
//! **routedoc** turns declarative endpoint metadata into two artifacts: a
//! coroutine-backed request router and an OpenAPI 3.0.1 document.
//!
//! ## Overview
//!
//! A *group* type declares its route path, tag and members once. Each member
//! is annotated with a verb and path, its documented responses, an optional
//! request body and the role of every formal parameter (body field, query
//! field, URL segment, or the injected request/response). The same metadata
//! is then read twice:
//!
//! - the dispatcher wires every member that has a verb onto a [`Routable`]
//!   and extracts the member's positional arguments from each request
//! - the [`DocumentService`] renders the member into the live OpenAPI document
//!
//! ## Architecture
//!
//! - **[`metadata`]** - keyed metadata store and descriptor types
//! - **[`annotations`]** - builder functions that write into the store
//! - **[`group`]** - the [`Group`] trait and member declarations
//! - **[`router`]** - the host route-table contract and a regex [`Router`]
//! - **[`dispatcher`]** - route wiring and coroutine dispatch
//! - **[`openapi`]** - document model, synthesizer and overlay loading
//! - **[`middleware`]** - request interceptors
//! - **[`server`]** - `may_minihttp` transport glue
//! - **[`runtime_config`]** / **[`logging`]** - environment-driven settings
//!
//! ## Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as AppService<br/>(may_minihttp)
//!     participant Router as Router
//!     participant Dispatcher as Dispatcher
//!     participant Handler as Member<br/>(Coroutine)
//!
//!     Client->>Server: POST /api/user
//!     Server->>Server: Parse headers, query, body
//!     Server->>Router: route(POST, /api/user)
//!     Router-->>Server: RouteMatch("POST /api/user")
//!     Server->>Dispatcher: dispatch(route_match, body)
//!     Dispatcher->>Dispatcher: middleware before hooks
//!     Dispatcher->>Handler: HandlerRequest via channel
//!     Handler->>Handler: extract args by role
//!     Handler-->>Dispatcher: Responder::send_status(201, user)
//!     Dispatcher->>Dispatcher: middleware after hooks
//!     Dispatcher-->>Server: HandlerResponse
//!     Server-->>Client: 201 Created
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use routedoc::annotations::*;
//! use routedoc::{register_group, Args, ConfigError, Declaration, DocumentService, Group};
//!
//! #[derive(Default)]
//! struct HelloController;
//!
//! impl HelloController {
//!     fn hello(&self, args: Args) {
//!         if let Some(res) = args.responder(0) {
//!             res.send("Hello, World!");
//!         }
//!     }
//! }
//!
//! impl Group for HelloController {
//!     fn declare(decl: &mut Declaration<Self>) -> Result<(), ConfigError> {
//!         decl.group(group("/hello").tag("hello"));
//!         decl.method("hello", &["Response"], Self::hello)
//!             .with(http_get("/").describe("Say hello"))
//!             .with(http_response(200, "Success"))
//!             .param(0, response())?;
//!         Ok(())
//!     }
//! }
//!
//! let docs = DocumentService::new();
//! let router = register_group(HelloController, &docs)?;
//! let document = docs.get_document()?.render()?;
//! ```

pub mod annotations;
pub mod cli;
pub mod controllers;
pub mod dispatcher;
pub mod error;
pub mod group;
pub mod ids;
pub mod logging;
pub mod metadata;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{register_group, Dispatcher, HandlerRequest, HandlerResponse, Responder};
pub use error::{ConfigError, DocumentError};
pub use group::{Arg, Args, Declaration, Group};
pub use metadata::{HttpVerb, MetadataStore, Target};
pub use openapi::{Document, DocumentHandler, DocumentService};
pub use router::{Routable, Router};
