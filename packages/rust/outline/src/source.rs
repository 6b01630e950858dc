//! Where an outline comes from: a finished job or a file on disk.

use std::path::Path;

use tracing::{debug, instrument};

use docview_shared::{DocViewError, GeneratedDocs, Result, StructuredDocs};

/// The two mutually exclusive document organizations.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineSource {
    /// Server-organized sidebar plus filename-keyed bodies.
    Structured(StructuredDocs),
    /// One flat Markdown body.
    Flat(String),
}

impl From<GeneratedDocs> for OutlineSource {
    /// Structured docs win when present; otherwise the flat body (possibly empty).
    fn from(docs: GeneratedDocs) -> Self {
        match docs.structured {
            Some(structured) => Self::Structured(structured),
            None => Self::Flat(docs.markdown.unwrap_or_default()),
        }
    }
}

impl OutlineSource {
    /// Load a saved job result (`.json`) or a plain Markdown file.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocViewError::io(path, e))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if !is_json {
            debug!(len = content.len(), "loaded flat markdown");
            return Ok(Self::Flat(content));
        }

        let docs: GeneratedDocs = serde_json::from_str(&content).map_err(|e| {
            DocViewError::parse(format!("{} is not a saved job result: {e}", path.display()))
        })?;
        debug!(structured = docs.structured.is_some(), "loaded saved job result");
        Ok(docs.into())
    }
}
