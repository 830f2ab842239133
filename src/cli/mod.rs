//! # CLI Module
//!
//! Command line of the `routedoc-demo` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Register the demo groups, serve them and the live document:
//!
//! ```bash
//! routedoc-demo serve --addr 127.0.0.1:4000 --docs-path /api-docs
//! ```
//!
//! Options:
//! - `--addr <ADDR>` - Bind address (default: `127.0.0.1:4000`)
//! - `--overlay <FILE>` - Overlay file (env: `ROUTEDOC_OPENAPI_JSON`)
//! - `--docs-path <PATH>` - Document endpoint (env: `ROUTEDOC_DOCS_PATH`, default `/api-docs`)
//!
//! The server stops on SIGINT or SIGTERM.
//!
//! ### `document`
//!
//! Print the synthesized document without starting a server:
//!
//! ```bash
//! routedoc-demo document --overlay OpenAPI.json --pretty
//! ```
//!
//! ### `routes`
//!
//! List the wired route keys and their handlers.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, Cli, Commands};
