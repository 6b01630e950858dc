//! Core domain types for docview: jobs and generated documentation.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Slug prefix stripped when deriving a document filename.
pub const SLUG_PREFIX: &str = "/docs/";

/// Extension appended when deriving a document filename.
pub const DOCUMENT_EXTENSION: &str = ".md";

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Lifecycle state of a generation job as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    /// Nothing submitted (or explicitly reset).
    #[default]
    Idle,
    /// Creation request in flight.
    Starting,
    /// Job accepted; status is being polled.
    Polling,
    /// Job finished and a result is available.
    Completed,
    /// Submission or generation failed; see [`Job::error`].
    Failed,
}

impl JobStatus {
    /// Whether the job has reached `Completed` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A single documentation-generation job tracked by the client.
#[derive(Debug, Clone, Default)]
pub struct Job {
    /// Backend-assigned handle, absent until submission succeeds.
    pub id: Option<String>,
    pub status: JobStatus,
    /// Human-readable milestones, oldest first.
    pub progress_log: Vec<String>,
    /// Present only once `status == Completed`.
    pub result: Option<GeneratedDocs>,
    /// Present only once `status == Failed`.
    pub error: Option<String>,
    /// When submission began.
    pub started_at: Option<Instant>,
}

impl Job {
    /// Append a log line unless it repeats the last one.
    ///
    /// Returns `true` if the log changed.
    pub fn push_log(&mut self, line: impl Into<String>) -> bool {
        let line = line.into();
        if self.progress_log.last() == Some(&line) {
            return false;
        }
        self.progress_log.push(line);
        true
    }

    /// Most recent log line, if any.
    pub fn last_log(&self) -> Option<&str> {
        self.progress_log.last().map(String::as_str)
    }

    /// Time since submission began (zero when idle).
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Generated documentation
// ---------------------------------------------------------------------------

/// Payload of a completed job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocs {
    /// Single flat Markdown body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Server-organized sidebar plus per-module bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<StructuredDocs>,
}

/// The structured pair: sidebar description and filename-keyed bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocs {
    pub sidebar: SidebarStructure,
    pub documents: DocumentMap,
}

/// Filename (e.g. `platform-overview.md`) to Markdown body.
pub type DocumentMap = BTreeMap<String, String>;

/// Derive the [`DocumentMap`] key for an item slug.
pub fn document_key(slug: &str) -> String {
    let stem = slug.strip_prefix(SLUG_PREFIX).unwrap_or(slug);
    format!("{stem}{DOCUMENT_EXTENSION}")
}

// ---------------------------------------------------------------------------
// SidebarStructure
// ---------------------------------------------------------------------------

/// Server-organized outline (`sidebar_structure` in the status response).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidebarStructure {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl SidebarStructure {
    /// All items in navigation order (categories flattened as declared).
    pub fn items(&self) -> impl Iterator<Item = &SidebarItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// A top-level sidebar group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Machine-style name, e.g. `USER_GUIDES`.
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<SidebarItem>,
}

impl Category {
    /// Name with underscores replaced by spaces, for breadcrumbs.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// One navigable document in the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidebarItem {
    pub title: String,
    /// Unique key, e.g. `/docs/platform-overview`.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probed_tabs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probed_buttons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probed_modals: Option<u32>,
}
