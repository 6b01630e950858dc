//! Shared types, error model, and configuration for docview.
//!
//! This crate is the foundation depended on by all other docview crates.
//! It provides:
//! - [`DocViewError`]: the unified error type
//! - Domain types ([`Job`], [`GeneratedDocs`], [`SidebarStructure`])
//! - Configuration ([`AppConfig`], [`TrackerConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PollingConfig, ServerConfig, TrackerConfig, config_dir,
    config_file_path, init_config, join_api_root, load_config, load_config_from,
    validate_server,
};
pub use error::{DocViewError, Result};
pub use types::{
    Category, DOCUMENT_EXTENSION, DocumentMap, GeneratedDocs, Job, JobStatus, SLUG_PREFIX,
    SidebarItem, SidebarStructure, StructuredDocs, document_key,
};
