//! Core of transdoc: drives PDF translation jobs against a pdf2zh-style server.
//!
//! A batch flows through `orchestrator::prepare_jobs` → `BatchOrchestrator::run`,
//! which submits each job through a `transport::TranslationServer`, polls
//! accepted tasks with `poller::JobPoller`, and hands produced files to an
//! `collaborators::AttachmentImporter`. Progress goes out as `events::BatchEvent`s.

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod poller;
pub mod retry;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::{TranslateError, ValidationError};
