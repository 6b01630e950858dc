//! Client-side tracking of documentation-generation jobs.
//!
//! This crate provides:
//! - [`JobTracker`]: submit a job, poll it to completion, reset
//! - [`JobBackend`]: the transport seam, with [`HttpBackend`] for the real server

mod backend;
mod tracker;

pub use backend::{HttpBackend, JobBackend, StatusResponse, SubmitRequest, SubmitResponse};
pub use tracker::{JobTracker, PollOutcome, progress_message};
