pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_body, parse_cookies, parse_query_params, parse_request, ParsedRequest};
pub use response::{write_handler_response, write_json_error};
pub use service::{document_endpoint, health_endpoint, AppService};
