mod core;
mod tracing;

pub use core::{from_fn, FnMiddleware, Middleware};
pub use tracing::TracingMiddleware;
