//! Data model shared by the transport client, poller and orchestrator.

mod job;
mod server_config;
mod variant;

pub use job::{
    DocumentRef, Endpoint, Job, JobOutcome, ProducedFile, RemoteTaskHandle, TaskState,
};
pub use server_config::{Credential, Engine, ServerConfig, TranslationOptions};
pub use variant::Variant;
