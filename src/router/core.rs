//! Router core: route table, regex path matching and the `Routable` contract.

use crate::dispatcher::{join_paths, RouteHandler};
use crate::metadata::HttpVerb;
use crate::middleware::Middleware;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Percent-decode one captured path segment, keeping the raw text when the
/// decoded bytes are not UTF-8
fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

/// Stack-allocated parameter storage.
///
/// Param names use `Arc<str>` because they come from the route table built at
/// startup; values are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Host routing contract
///
/// Anything that can accept `(verb, path, middleware, handler)` registrations.
/// The verb shortcuts mirror the usual `get/post/put/delete` surface.
pub trait Routable {
    fn add_route(
        &mut self,
        verb: HttpVerb,
        path: &str,
        middleware: Vec<Arc<dyn Middleware>>,
        handler: RouteHandler,
    );

    fn get(&mut self, path: &str, middleware: Vec<Arc<dyn Middleware>>, handler: RouteHandler) {
        self.add_route(HttpVerb::Get, path, middleware, handler);
    }

    fn post(&mut self, path: &str, middleware: Vec<Arc<dyn Middleware>>, handler: RouteHandler) {
        self.add_route(HttpVerb::Post, path, middleware, handler);
    }

    fn put(&mut self, path: &str, middleware: Vec<Arc<dyn Middleware>>, handler: RouteHandler) {
        self.add_route(HttpVerb::Put, path, middleware, handler);
    }

    fn delete(&mut self, path: &str, middleware: Vec<Arc<dyn Middleware>>, handler: RouteHandler) {
        self.add_route(HttpVerb::Delete, path, middleware, handler);
    }
}

/// One registered route
#[derive(Clone)]
pub struct RouteEntry {
    pub verb: HttpVerb,
    /// Path as registered, e.g. `/user/:userId`
    pub path_pattern: String,
    /// Route-level interceptors, run after the dispatcher's global chain
    pub middleware: Vec<Arc<dyn Middleware>>,
    pub handler: RouteHandler,
    key: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl RouteEntry {
    /// Route key (`POST /user`), also the dispatcher handler name
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("key", &self.key)
            .field("handler", &self.handler.name())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<RouteEntry>,
    /// Request path that matched
    pub path: String,
    /// Path parameters extracted from the URL (e.g., `:id` → `("id", "123")`)
    pub path_params: ParamVec,
    /// Name of the handler that should process this request
    pub handler_name: String,
    /// Query string parameters (populated by the server)
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name ("last write wins")
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name ("last write wins")
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Ordered route table
///
/// Routes are tested in registration order; registering the same verb and
/// path again replaces the earlier route in place.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Arc<RouteEntry>>,
}

impl Routable for Router {
    fn add_route(
        &mut self,
        verb: HttpVerb,
        path: &str,
        middleware: Vec<Arc<dyn Middleware>>,
        handler: RouteHandler,
    ) {
        let (regex, param_names) = match Self::path_to_regex(path) {
            Ok(compiled) => compiled,
            Err(e) => {
                error!(
                    verb = %verb,
                    path = %path,
                    error = %e,
                    "Failed to compile route pattern - route skipped"
                );
                return;
            }
        };
        let key = format!("{} {}", verb, path);
        let entry = Arc::new(RouteEntry {
            verb,
            path_pattern: path.to_string(),
            middleware,
            handler,
            key,
            regex,
            param_names,
        });

        if let Some(existing) = self.routes.iter_mut().find(|r| r.key == entry.key) {
            warn!(
                route_key = %entry.key,
                previous_handler = %existing.handler.name(),
                handler = %entry.handler.name(),
                "Replaced existing route"
            );
            *existing = entry;
            return;
        }

        debug!(
            route_key = %entry.key,
            handler = %entry.handler.name(),
            param_names = ?entry.param_names,
            "Route registered"
        );
        self.routes.push(entry);
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered routes in match order
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteEntry>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route keys (`GET /api/user`) in match order
    #[must_use]
    pub fn route_keys(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.key.clone()).collect()
    }

    /// Mount every route of `other` under `prefix`
    pub fn nest(&mut self, prefix: &str, other: Router) {
        let count = other.routes.len();
        for route in other.routes {
            let route = Arc::unwrap_or_clone(route);
            let path = join_paths(prefix, &route.path_pattern);
            self.add_route(route.verb, &path, route.middleware, route.handler);
        }
        info!(prefix = %prefix, routes_count = count, "Router nested");
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!("[route] {} -> {}", route.key, route.handler.name());
        }
    }

    /// Match an HTTP request to a route
    ///
    /// A trailing slash on the request path is ignored. Matching runs on the
    /// raw path; captured values are percent-decoded.
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        // RT1: Route match attempt
        debug!(method = %method, path = %path, "Route match attempt");

        let verb = HttpVerb::from_method(&method)?;
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        for route in &self.routes {
            if route.verb != verb {
                continue;
            }
            let Some(caps) = route.regex.captures(trimmed) else {
                continue;
            };
            let mut path_params = ParamVec::new();
            for (i, name) in route.param_names.iter().enumerate() {
                if let Some(value) = caps.get(i + 1) {
                    path_params.push((Arc::clone(name), decode_segment(value.as_str())));
                }
            }

            // RT3: Route matched
            info!(
                method = %method,
                path = %path,
                route_key = %route.key,
                handler = %route.handler.name(),
                path_params = ?path_params,
                "Route matched"
            );

            return Some(RouteMatch {
                route: Arc::clone(route),
                path: path.to_string(),
                path_params,
                handler_name: route.key.clone(),
                query_params: ParamVec::new(),
            });
        }

        // RT4: No route found (404)
        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Convert a route path to a regex and extract parameter names
    ///
    /// Both `:name` and `{name}` segments become captures, so `/users/:id` and
    /// `/users/{id}` compile to `^/users/([^/]+)$` with params `["id"]`.
    /// Literal segments are escaped.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::new();

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let param = segment
                .strip_prefix(':')
                .or_else(|| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')));
            match param {
                Some(name) if !name.is_empty() => {
                    pattern.push_str("/([^/]+)");
                    param_names.push(Arc::from(name));
                }
                _ => {
                    pattern.push('/');
                    pattern.push_str(&regex::escape(segment));
                }
            }
        }

        if param_names.is_empty() && pattern.len() == 1 {
            pattern.push('/');
        }
        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}
