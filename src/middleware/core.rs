use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Request interceptor run around a handler
///
/// `before` hooks run in chain order; the first one returning a response
/// short-circuits the handler. Every `after` hook runs with the final response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}

/// Middleware backed by a `before` closure
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> FnMiddleware<F> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&HandlerRequest) -> Option<HandlerResponse> + Send + Sync,
{
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        (self.func)(req)
    }
}

/// Wrap a closure as route middleware
///
/// ```rust,ignore
/// let require_key = from_fn("require_api_key", |req| match req.get_header("x-api-key") {
///     Some(_) => None,
///     None => Some(HandlerResponse::error(401, "Unauthorized")),
/// });
/// ```
pub fn from_fn<F>(name: &'static str, func: F) -> Arc<dyn Middleware>
where
    F: Fn(&HandlerRequest) -> Option<HandlerResponse> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware { name, func })
}
