//! Batch orchestration.
//!
//! Documents are resolved into jobs (`prepare`), then run strictly one after
//! another: submit → poll (if accepted) → stage produced files → import.
//! Progress of each job is mapped onto its slice of the batch.

mod prepare;
mod progress;
mod run;
mod stage;

pub use prepare::{prepare_jobs, PreparedBatch};
pub use progress::batch_percent;
pub use run::{BatchOrchestrator, BatchReport};
pub use stage::OutputOptions;
