//! CLI command handlers, one per file. Each returns the process exit code.

mod config;
mod health;
mod progress;
mod translate;

pub use config::run_config;
pub use health::run_health;
pub use progress::run_progress;
pub use translate::{run_translate, TranslateArgs};
