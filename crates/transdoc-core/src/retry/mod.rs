//! Retry and backoff policy.
//!
//! Classifies job errors (only transport-level failures are worth another
//! attempt) and decides linear backoff, so every server call site shares one
//! policy while choosing its own attempt budget.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
