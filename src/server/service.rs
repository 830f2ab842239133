use super::request::{parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json_error};
use crate::dispatcher::{generate_request_id, Dispatcher, HandlerResponse};
use crate::openapi::DocumentHandler;
use crate::router::Router;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Host transport service: health check, document endpoint, routed handlers
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    docs: Option<(String, DocumentHandler)>,
}

impl AppService {
    #[must_use]
    pub fn new(router: Arc<Router>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            router,
            dispatcher,
            docs: None,
        }
    }

    /// Serve the live document on `GET path`
    #[must_use]
    pub fn with_docs(mut self, path: &str, handler: DocumentHandler) -> Self {
        self.docs = Some((path.to_string(), handler));
        self
    }

    #[must_use]
    pub fn docs_path(&self) -> Option<&str> {
        self.docs.as_ref().map(|(path, _)| path.as_str())
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_handler_response(res, HandlerResponse::json(200, json!({ "status": "ok" })));
    Ok(())
}

/// Document endpoint rendering the live OpenAPI document
pub fn document_endpoint(res: &mut Response, handler: &DocumentHandler) -> io::Result<()> {
    match handler.render() {
        Ok(document) => write_handler_response(res, HandlerResponse::json(200, document)),
        Err(e) => {
            error!(error = %e, "Document render failed");
            write_json_error(res, 500, json!({ "error": e.to_string() }));
        }
    }
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let request_id = parsed
            .header("x-request-id")
            .map(str::to_string)
            .unwrap_or_else(generate_request_id);
        let ParsedRequest {
            method,
            path,
            headers,
            cookies,
            query_params,
            body,
        } = parsed;

        if method == "GET" && path == "/health" {
            return health_endpoint(res);
        }
        if let Some((docs_path, handler)) = &self.docs {
            if method == "GET" && &path == docs_path {
                return document_endpoint(res, handler);
            }
        }

        let Ok(http_method) = method.parse::<Method>() else {
            warn!(method = %method, path = %path, "Unparseable request method");
            write_json_error(res, 400, json!({"error": "Invalid method", "method": method}));
            return Ok(());
        };

        let Some(mut route_match) = self.router.route(http_method, &path) else {
            // S1: No route
            debug!(method = %method, path = %path, "No route matched");
            write_json_error(
                res,
                404,
                json!({"error": "Not Found", "method": method, "path": path}),
            );
            return Ok(());
        };
        route_match.query_params = query_params;

        match self.dispatcher.dispatch_with_request_id(
            route_match,
            body,
            headers,
            cookies,
            &request_id,
        ) {
            Some(hr) => write_handler_response(res, hr),
            None => write_json_error(
                res,
                500,
                json!({
                    "error": "Handler failed or not registered",
                    "method": method,
                    "path": path
                }),
            ),
        }
        Ok(())
    }
}
