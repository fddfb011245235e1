//! Core library for the `weather-readme` job.
//!
//! This crate defines:
//! - Credential loading & validation
//! - Weather scraping behind a swappable source/extractor pair
//! - Reading and committing a file through the GitHub contents API
//! - README template rendering
//! - The refresh cycle and the cron scheduler that drives it
//!
//! It is used by `weather-readme-cli`, but the cycle can be driven by any
//! other binary with its own [`WeatherSource`] or [`ContentStore`].

pub mod config;
pub mod cycle;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod store;
pub mod template;
pub mod weather;

pub use config::{Credential, DEFAULT_CREDENTIALS_PATH, FailurePolicy};
pub use cycle::RefreshCycle;
pub use error::{ConfigError, CycleError, Stage, TemplateError};
pub use model::{CommitRequest, CycleReport, Identity, RemoteFileDescriptor};
pub use scheduler::{CronSchedule, Scheduler, TickSummary};
pub use store::{ContentStore, GitHubContents};
pub use weather::{PreBlockExtractor, TextExtractor, WeatherSource, WeatherText, WttrSource};

/// Wire the production weather source and content store for `credential`.
pub fn default_cycle(credential: Credential) -> RefreshCycle {
    let weather = WttrSource::new(&credential);
    RefreshCycle::new(credential, Box::new(weather), Box::new(GitHubContents::new()))
}
