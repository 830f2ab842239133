//! Error types surfaced by group registration and document synthesis.
//!
//! Both enums are plain data with hand-written `Display` impls so callers can
//! match on the variant. Binaries and server glue wrap them in `anyhow`.

use std::fmt;
use std::path::PathBuf;

/// Declaration-time configuration error
///
/// Returned while a group declares its members, before any route is wired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A parameter annotation needs the declared type of its slot but the
    /// member was declared without a signature.
    MissingSignature {
        /// Group type name
        target: &'static str,
        /// Member (method) name
        member: String,
    },
    /// A parameter annotation targets a position past the method arity.
    ParameterIndexOutOfRange {
        /// Group type name
        target: &'static str,
        /// Member (method) name
        member: String,
        /// Requested parameter position
        index: usize,
        /// Number of formal parameters the member declares
        arity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSignature { target, member } => {
                write!(
                    f,
                    "Group configuration error: {}::{} has parameter annotations but no declared signature",
                    target, member
                )
            }
            ConfigError::ParameterIndexOutOfRange {
                target,
                member,
                index,
                arity,
            } => {
                write!(
                    f,
                    "Group configuration error: parameter index {} is out of range for {}::{} (arity {})",
                    index, target, member, arity
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error raised while loading the overlay document
///
/// Surfaces at the first document request after the overlay path is resolved.
#[derive(Debug)]
pub enum DocumentError {
    /// The overlay file exists but could not be read.
    Io {
        /// Overlay path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The overlay file is not valid JSON or has the wrong shape.
    Parse {
        /// Overlay path
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io { path, source } => {
                write!(f, "failed to read overlay '{}': {}", path.display(), source)
            }
            DocumentError::Parse { path, source } => {
                write!(f, "failed to parse overlay '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io { source, .. } => Some(source),
            DocumentError::Parse { source, .. } => Some(source),
        }
    }
}
