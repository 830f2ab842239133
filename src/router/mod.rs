//! # Router Module
//!
//! Path matching and route resolution for groups wired by the dispatcher.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Accepting route registrations through the [`Routable`] contract
//! - Compiling route paths (`/user/:userId` or `/user/{userId}`) into regex matchers
//! - Matching incoming requests and extracting path parameters
//! - Mounting one router under a prefix of another ([`Router::nest`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use routedoc::router::{Routable, Router};
//!
//! let mut router = Router::new();
//! router.get("/user/:id", Vec::new(), handler);
//!
//! if let Some(route_match) = router.route(http::Method::GET, "/user/42") {
//!     println!("Handler: {}", route_match.handler_name);
//!     println!("Path params: {:?}", route_match.path_params);
//! }
//! ```
//!
//! Matching is a linear scan in registration order; the first route whose
//! verb and pattern both match wins.

mod core;

pub use core::{ParamVec, Routable, RouteEntry, RouteMatch, Router, MAX_INLINE_PARAMS};
