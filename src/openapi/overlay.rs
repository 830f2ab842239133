use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::{Document, Tag};
use crate::error::DocumentError;

/// File name of the static overlay looked up next to the executable
pub const OVERLAY_FILE_NAME: &str = "OpenAPI.json";

/// Default overlay location: `OpenAPI.json` in the directory of the running
/// executable, falling back to the working directory.
#[must_use]
pub fn default_overlay_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
        .join(OVERLAY_FILE_NAME)
}

/// Top-level sections a static overlay may provide
///
/// Every present, non-null section replaces the document's own wholesale.
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub info: Option<Value>,
    pub servers: Option<Value>,
    pub webhooks: Option<Value>,
    pub components: Option<Value>,
    pub security: Option<Value>,
    pub tags: Option<Vec<Tag>>,
    pub external_docs: Option<Value>,
}

impl Overlay {
    /// Read and parse the overlay at `path`
    ///
    /// Returns `Ok(None)` when no file exists there.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Io`] when the file cannot be read and
    /// [`DocumentError::Parse`] when it is not a valid overlay.
    pub fn load(path: &Path) -> Result<Option<Self>, DocumentError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No overlay file");
                return Ok(None);
            }
            Err(source) => {
                return Err(DocumentError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| DocumentError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Replace the sections of `doc` this overlay provides; returns their names
    pub fn apply(self, doc: &mut Document) -> Vec<&'static str> {
        let mut applied = Vec::new();
        if let Some(info) = self.info {
            doc.info = info;
            applied.push("info");
        }
        if let Some(servers) = self.servers {
            doc.servers = Some(servers);
            applied.push("servers");
        }
        if let Some(webhooks) = self.webhooks {
            doc.webhooks = Some(webhooks);
            applied.push("webhooks");
        }
        if let Some(components) = self.components {
            doc.components = Some(components);
            applied.push("components");
        }
        if let Some(security) = self.security {
            doc.security = Some(security);
            applied.push("security");
        }
        if let Some(tags) = self.tags {
            doc.tags = Some(tags);
            applied.push("tags");
        }
        if let Some(external_docs) = self.external_docs {
            doc.external_docs = Some(external_docs);
            applied.push("externalDocs");
        }
        applied
    }
}
