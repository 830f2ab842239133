use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;
use may_minihttp::Request;
use serde_json::{Map, Value};
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Parsed cookies from the Cookie header
    pub cookies: HeaderVec,
    pub query_params: ParamVec,
    /// JSON or form-urlencoded body as a JSON value
    pub body: Option<Value>,
}

impl ParsedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Split the `cookie` header into name/value pairs
#[must_use]
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("cookie"))
        .flat_map(|(_, c)| c.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((Arc::<str>::from(name), value))
        })
        .collect()
}

/// Parse and URL-decode the query string of `path`
///
/// Repeated names are all kept in order; lookups use the last one.
#[must_use]
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::<str>::from(k), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Decode a request body by content type
///
/// `application/x-www-form-urlencoded` bodies become a JSON object of strings;
/// everything else is parsed as JSON. Unparseable bodies yield `None`.
#[must_use]
pub fn parse_body(content_type: &str, raw: &[u8]) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if media_type == "application/x-www-form-urlencoded" {
        let fields: Map<String, Value> = url::form_urlencoded::parse(raw)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        return Some(Value::Object(fields));
    }
    serde_json::from_slice(raw).ok()
}

/// Extract method, path, headers, cookies, query and body from a request
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    // R1: Headers extracted
    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::<str>::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    debug!(header_count = headers.len(), "Headers extracted");

    // R2: Cookies extracted
    let cookies = parse_cookies(&headers);
    debug!(cookie_count = cookies.len(), "Cookies extracted");

    // R3: Query params parsed
    let query_params = parse_query_params(&raw_path);
    debug!(
        param_count = query_params.len(),
        query_params = ?query_params,
        "Query params parsed"
    );

    let content_type = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "content-type")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();

    // R4: Request body read
    let mut raw = Vec::new();
    let body = match req.body().read_to_end(&mut raw) {
        Ok(size) if size > 0 => {
            let parsed = parse_body(&content_type, &raw);
            debug!(
                body_size_bytes = size,
                content_type = %content_type,
                parsed = parsed.is_some(),
                "Request body read"
            );
            parsed
        }
        _ => None,
    };

    // R5: HTTP request parsed
    info!(
        method = %method,
        path = %path,
        headers_count = headers.len(),
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        cookies,
        query_params,
        body,
    }
}
