//! # Dispatcher Module
//!
//! Turns declared groups into routes and runs route handlers in coroutines.
//!
//! ## Overview
//!
//! Registration ([`register_group`] / [`build_router`]):
//! - Reads the group and member metadata recorded by the annotations
//! - Joins the group path and route path ([`join_paths`])
//! - Builds a [`RouteHandler`] that extracts positional arguments by role
//! - Adds the route to a [`Routable`](crate::router::Routable) with its middleware
//! - Notifies the [`DocumentService`](crate::openapi::DocumentService) once per route
//!
//! Runtime ([`Dispatcher`]):
//! - Each route key owns a handler coroutine fed through an MPSC channel
//! - Global middleware runs first, then the route's own middleware
//! - Handlers answer through the [`Responder`] on the request's reply channel
//! - Panics become 500 responses; a handler that never replies yields 503
//!
//! ## Request Flow
//!
//! 1. Router matches the request to a route key (`POST /api/user`)
//! 2. Dispatcher runs the `before` hooks; an early response short-circuits
//! 3. The request is sent to the route's coroutine
//! 4. The bound handler extracts arguments and invokes the member
//! 5. The member replies; `after` hooks see the final response
//!
//! Stack size of handler coroutines comes from
//! [`RuntimeConfig`](crate::runtime_config::RuntimeConfig) (`ROUTEDOC_STACK_SIZE`).

mod bind;
mod core;

pub use bind::{bind_handler, build_router, extract_args, join_paths, register_group};
pub use core::{
    generate_request_id, Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec,
    Responder, RouteHandler, MAX_INLINE_HEADERS,
};
