use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs one line per request when it enters and leaves the chain
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        // T1: Request received
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler_name = %req.handler_name,
            "Request received"
        );
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        if res.status >= 500 {
            // T2: Request failed
            warn!(
                request_id = %req.request_id,
                handler_name = %req.handler_name,
                status = res.status,
                latency_ms = latency_ms,
                "Request failed"
            );
        } else {
            // T3: Request completed
            info!(
                request_id = %req.request_id,
                handler_name = %req.handler_name,
                status = res.status,
                latency_ms = latency_ms,
                "Request completed"
            );
        }
    }
}
