//! Demo groups served by `routedoc-demo`.
//!
//! [`HelloWorldController`] is mounted at the root and [`UserController`]
//! under `/api`, so `POST /api/user` creates a user while the document lists
//! the group path `/user`.

mod hello_world;
mod user;

pub use hello_world::HelloWorldController;
pub use user::{User, UserController, API_KEY_HEADER};

use crate::dispatcher::register_group;
use crate::error::ConfigError;
use crate::openapi::DocumentService;
use crate::router::Router;

/// Prefix the user group is mounted under
pub const API_PREFIX: &str = "/api";

/// Register the demo groups and mount them into one router
///
/// # Errors
///
/// Returns the [`ConfigError`] of the first group that fails to declare.
pub fn demo_router(docs: &DocumentService) -> Result<Router, ConfigError> {
    let mut router = register_group(HelloWorldController::default(), docs)?;
    router.nest(API_PREFIX, register_group(UserController::default(), docs)?);
    Ok(router)
}
