//! JSON document source for layout documents produced by an external parser

use std::path::PathBuf;

use docgraph_core::{DocGraphError, DocumentInput, DocumentSource, Result};

/// Reads a `DocumentInput` serialized as JSON
pub struct JsonDocumentSource {
    path: PathBuf,
}

impl JsonDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for JsonDocumentSource {
    fn load(&self) -> Result<DocumentInput> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            DocGraphError::DocumentUnreadable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DocGraphError::DocumentUnreadable(format!("{}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
