//! Dispatcher core: request/response types and coroutine-backed dispatch.

use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch, Router};
use crate::runtime_config::RuntimeConfig;
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum inline headers/cookies before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage
///
/// Header names use `Arc<str>` since the same names repeat on every request.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Generate a unique request ID for tracing (ULID string)
#[must_use]
pub fn generate_request_id() -> String {
    RequestId::new().to_string()
}

/// Request data passed to a handler coroutine
///
/// Contains the extracted HTTP request information and the reply channel the
/// handler answers on.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Request path as received (without query string)
    pub path: String,
    /// Route key of the matched route, e.g. `POST /api/user`
    pub handler_name: String,
    /// Path segments captured by the route pattern
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    pub cookies: HeaderVec,
    /// Parsed request body (JSON or form-urlencoded)
    pub body: Option<Value>,
    /// Channel for sending the response back to the dispatcher
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name repeats in the pattern.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: `?limit=10&limit=20` yields `20`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Field of the request body, `None` when there is no body or no such field
    #[must_use]
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(key))
    }

    /// Response channel for this request
    #[must_use]
    pub fn responder(&self) -> Responder {
        Responder::new(self.reply_tx.clone())
    }

    // Copy handed to `after` hooks. Its reply channel is not connected, so the
    // dispatcher notices when every live sender has been dropped.
    fn detached(&self) -> HandlerRequest {
        let (reply_tx, _) = mpsc::channel();
        HandlerRequest {
            reply_tx,
            ..self.clone()
        }
    }
}

/// Response data sent back from a handler coroutine
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body; strings are written as text, everything else as JSON
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Response channel handed to members that inject the response
///
/// The first reply resolves the request; later replies are dropped by the
/// dispatcher.
#[derive(Debug, Clone)]
pub struct Responder {
    reply_tx: mpsc::Sender<HandlerResponse>,
}

impl Responder {
    #[must_use]
    pub fn new(reply_tx: mpsc::Sender<HandlerResponse>) -> Self {
        Self { reply_tx }
    }

    /// Resolve the request with `200` and `body`
    pub fn send(&self, body: impl Into<Value>) {
        self.send_status(200, body);
    }

    /// Resolve the request with an explicit status
    pub fn send_status(&self, status: u16, body: impl Into<Value>) {
        self.send_response(HandlerResponse::json(status, body.into()));
    }

    pub fn send_response(&self, response: HandlerResponse) {
        let status = response.status;
        if self.reply_tx.send(response).is_err() {
            debug!(status = status, "Reply dropped - request already resolved");
        }
    }
}

/// Callable bound to one route
///
/// Built by the dispatcher for every wired member (or by the document
/// service for the document endpoint) and executed inside a handler coroutine.
#[derive(Clone)]
pub struct RouteHandler {
    name: Arc<str>,
    func: Arc<dyn Fn(HandlerRequest) + Send + Sync>,
}

impl RouteHandler {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(HandlerRequest) + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    /// Descriptive name (`Group::member`) used in logs
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, req: HandlerRequest) {
        (self.func)(req);
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandler")
            .field("name", &self.name)
            .finish()
    }
}

/// Type alias for a channel sender that dispatches requests to a handler
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Dispatcher that routes requests to registered handler coroutines
///
/// Maintains a registry of route keys to channel senders plus the global
/// middleware chain. Route-level middleware travels with the `RouteMatch`.
#[derive(Clone)]
pub struct Dispatcher {
    /// Map of route keys to their channel senders
    pub handlers: HashMap<String, HandlerSender>,
    /// Ordered list of middleware applied to every request
    pub middlewares: Vec<Arc<dyn Middleware>>,
    stack_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create an empty dispatcher using the stack size from the environment
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: &RuntimeConfig) -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            middlewares: Vec::new(),
            stack_size: config.stack_size,
        }
    }

    /// Add middleware to the global chain
    ///
    /// Global middleware runs before the route's own middleware, in the order
    /// it was added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Spawn one handler coroutine per route of `router`
    ///
    /// # Safety
    ///
    /// Same requirements as [`Dispatcher::register_handler`].
    pub unsafe fn register_router(&mut self, router: &Router) {
        for route in router.routes() {
            let handler = route.handler.clone();
            // SAFETY: forwarded to the caller's contract.
            unsafe {
                self.register_handler(route.key(), move |req| handler.call(req));
            }
        }
        info!(
            total_handlers = self.handlers.len(),
            "Router handlers registered"
        );
    }

    /// Registers a handler function that processes requests for the given route key.
    ///
    /// Spawns a coroutine that processes requests from a channel. The handler is
    /// wrapped with panic recovery so one failing handler cannot crash the server.
    /// Registering the same key again replaces the previous coroutine.
    ///
    /// # Safety
    ///
    /// This function is marked unsafe because it calls `may::coroutine::Builder::spawn()`,
    /// which is unsafe in the `may` runtime. The caller must ensure the May coroutine
    /// runtime is properly initialized before calling this.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let name = name.to_string();
        let handler_name_for_logging = name.clone();
        let stack_size = self.stack_size;

        // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may runtime.
        // The handler function is Send + 'static and errors are reported through the
        // reply channel.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .stack_size(stack_size)
                .spawn(move || {
                    // H1: Handler coroutine start
                    debug!(
                        handler_name = %handler_name_for_logging,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );

                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let handler_name = req.handler_name.clone();
                        let request_id = req.request_id;

                        // H2: Handler execution start
                        info!(
                            request_id = %request_id,
                            handler_name = %handler_name,
                            path_params = ?req.path_params,
                            query_params = ?req.query_params,
                            "Handler execution start"
                        );

                        let execution_start = Instant::now();

                        if let Err(panic) =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                                handler_fn(req);
                            }))
                        {
                            // H3: Handler panic caught
                            let panic_message = panic
                                .downcast_ref::<&str>()
                                .map(|s| (*s).to_string())
                                .or_else(|| panic.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| format!("{panic:?}"));

                            error!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                panic_message = %panic_message,
                                "Handler panicked - CRITICAL"
                            );

                            let error_response = HandlerResponse::error(
                                500,
                                &format!("Handler panicked: {}", panic_message),
                            );
                            let _ = reply_tx.send(error_response);
                        } else {
                            // H4: Handler execution complete
                            info!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                execution_time_ms = execution_start.elapsed().as_millis() as u64,
                                "Handler execution complete"
                            );
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size = stack_size,
                "Failed to spawn handler coroutine - CRITICAL"
            );
            return;
        }

        if self.handlers.insert(name.clone(), tx).is_some() {
            warn!(
                handler_name = %name,
                "Replaced existing handler - old coroutine will exit"
            );
        }
    }

    /// Dispatch a request to the handler of the matched route
    ///
    /// Runs the global and route middleware `before` hooks, forwards the request
    /// to the handler coroutine and waits for its reply, then runs every
    /// `after` hook. Returns `None` if no handler is registered for the route.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        body: Option<Value>,
        headers: HeaderVec,
        cookies: HeaderVec,
    ) -> Option<HandlerResponse> {
        let request_id = generate_request_id();
        self.dispatch_with_request_id(route_match, body, headers, cookies, &request_id)
    }

    /// Dispatch a request with a pre-determined request_id (for correlation)
    #[must_use]
    pub fn dispatch_with_request_id(
        &self,
        route_match: RouteMatch,
        body: Option<Value>,
        headers: HeaderVec,
        cookies: HeaderVec,
        request_id: &str,
    ) -> Option<HandlerResponse> {
        let (reply_tx, reply_rx) = mpsc::channel();

        // D1: Handler lookup
        debug!(
            handler_name = %route_match.handler_name,
            available_handlers = self.handlers.len(),
            "Handler lookup"
        );

        let tx = match self.handlers.get(&route_match.handler_name) {
            Some(tx) => tx,
            None => {
                // D2: Handler not found
                let available_handlers: Vec<&String> = self.handlers.keys().collect();
                error!(
                    handler_name = %route_match.handler_name,
                    available_handlers = ?available_handlers,
                    "Handler not found - CRITICAL"
                );
                return None;
            }
        };

        let route_middleware = route_match.route.middleware.clone();
        let request = HandlerRequest {
            request_id: RequestId::from_header_or_new(Some(request_id)),
            method: route_match.route.verb.method(),
            path: route_match.path,
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            query_params: route_match.query_params,
            headers,
            cookies,
            body,
            reply_tx,
        };
        let chain: Vec<&Arc<dyn Middleware>> = self
            .middlewares
            .iter()
            .chain(route_middleware.iter())
            .collect();

        // D4: Middleware before execution
        debug!(
            request_id = %request.request_id,
            middleware_count = chain.len(),
            "Middleware before execution"
        );

        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in chain.iter().enumerate() {
            if let Some(resp) = mw.before(&request) {
                debug!(
                    request_id = %request.request_id,
                    middleware_idx = idx,
                    status = resp.status,
                    "Middleware returned early response"
                );
                early_resp = Some(resp);
                break;
            }
        }

        let observed = request.detached();

        let (mut resp, latency) = if let Some(r) = early_resp {
            (r, Duration::from_millis(0))
        } else {
            // D3: Request dispatched to handler
            info!(
                request_id = %observed.request_id,
                handler_name = %observed.handler_name,
                method = %observed.method,
                path = %observed.path,
                "Request dispatched to handler"
            );

            let start = Instant::now();
            if let Err(e) = tx.send(request) {
                error!(
                    request_id = %observed.request_id,
                    handler_name = %observed.handler_name,
                    error = %e,
                    "Failed to send request to handler"
                );
                return None;
            }

            // D6: Waiting for handler response
            debug!(
                request_id = %observed.request_id,
                handler_name = %observed.handler_name,
                "Waiting for handler response"
            );

            let r = match reply_rx.recv() {
                Ok(response) => {
                    info!(
                        request_id = %observed.request_id,
                        handler_name = %observed.handler_name,
                        latency_ms = start.elapsed().as_millis() as u64,
                        status = response.status,
                        "Handler response received"
                    );
                    response
                }
                Err(e) => {
                    // D7: every reply sender dropped without answering
                    error!(
                        request_id = %observed.request_id,
                        handler_name = %observed.handler_name,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Handler finished without responding"
                    );
                    HandlerResponse::error(
                        503,
                        &format!(
                            "Handler '{}' completed without sending a response",
                            observed.handler_name
                        ),
                    )
                }
            };
            (r, start.elapsed())
        };

        // D5: Middleware after execution
        debug!(
            request_id = %observed.request_id,
            middleware_count = chain.len(),
            response_status = resp.status,
            latency_ms = latency.as_millis() as u64,
            "Middleware after execution"
        );

        for mw in &chain {
            mw.after(&observed, &mut resp, latency);
        }

        Some(resp)
    }
}
