//! # Runtime Configuration Module
//!
//! Environment-driven settings for the dispatcher and the document endpoint.
//!
//! ## Environment Variables
//!
//! ### `ROUTEDOC_STACK_SIZE`
//!
//! Stack size for handler coroutines. Accepts decimal (`16384`) or
//! hexadecimal (`0x4000`). Invalid values fall back to the default.
//!
//! Default: `0x4000` (16 KB)
//!
//! ### `ROUTEDOC_OPENAPI_JSON`
//!
//! Path of the static overlay file. When unset the overlay is looked up as
//! `OpenAPI.json` next to the running executable.
//!
//! ### `ROUTEDOC_DOCS_PATH`
//!
//! Request path serving the synthesized document. Default: `/api-docs`
//!
//! ## Usage
//!
//! ```rust
//! use routedoc::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;
use std::path::PathBuf;

/// Default coroutine stack size (16 KB)
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Default path of the document endpoint
pub const DEFAULT_DOCS_PATH: &str = "/api-docs";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
    /// Explicit overlay file; `None` means the default location
    pub overlay_path: Option<PathBuf>,
    pub docs_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            overlay_path: None,
            docs_path: DEFAULT_DOCS_PATH.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("ROUTEDOC_STACK_SIZE")
            .ok()
            .and_then(|val| parse_stack_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let overlay_path = env::var_os("ROUTEDOC_OPENAPI_JSON")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let docs_path = env::var("ROUTEDOC_DOCS_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCS_PATH.to_string());
        RuntimeConfig {
            stack_size,
            overlay_path,
            docs_path,
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal stack size
#[must_use]
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stack_size() {
        assert_eq!(parse_stack_size("0x4000"), Some(0x4000));
        assert_eq!(parse_stack_size("0X8000"), Some(0x8000));
        assert_eq!(parse_stack_size("32768"), Some(32768));
        assert_eq!(parse_stack_size(" 1024 "), Some(1024));
        assert_eq!(parse_stack_size("0xZZ"), None);
        assert_eq!(parse_stack_size("lots"), None);
    }

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.stack_size, 0x4000);
        assert_eq!(config.overlay_path, None);
        assert_eq!(config.docs_path, "/api-docs");
    }
}
