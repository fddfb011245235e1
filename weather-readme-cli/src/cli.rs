use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use weather_readme_core::{
    CronSchedule, Credential, DEFAULT_CREDENTIALS_PATH, FailurePolicy, Scheduler, default_cycle,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-readme",
    version,
    about = "Commit the current weather into a GitHub README on a cron schedule"
)]
pub struct Cli {
    /// Credential file (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CREDENTIALS_PATH)]
    pub config: PathBuf,

    /// README template; overrides `template_path` from the credential file.
    #[arg(long, global = true)]
    pub template: Option<PathBuf>,

    /// What to do when a cycle fails: "skip" or "abort".
    #[arg(long, global = true, value_parser = parse_policy)]
    pub on_failure: Option<FailurePolicy>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the refresh cycle on every cron tick (default).
    Run,

    /// Run a single refresh cycle now and exit.
    Once,

    /// Print the next tick times of the configured cron expression.
    Next {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
}

fn parse_policy(value: &str) -> Result<FailurePolicy, String> {
    FailurePolicy::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut credential = Credential::load(&self.config)
            .with_context(|| format!("Failed to load credentials from {}", self.config.display()))?;

        if let Some(template) = self.template {
            credential.template_path = template;
        }
        if let Some(policy) = self.on_failure {
            credential.on_failure = policy;
        }

        let schedule = CronSchedule::parse(&credential.cron_expression)?;

        match self.command.unwrap_or(Command::Run) {
            Command::Run => {
                let scheduler = Scheduler::new(schedule, credential.on_failure);
                let cycle = default_cycle(credential);

                let summary = scheduler.run_forever(&cycle).await.context("Scheduler aborted")?;
                tracing::info!(
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Scheduler stopped"
                );
            }
            Command::Once => {
                let cycle = default_cycle(credential);
                let report = cycle.run().await.context("Refresh cycle failed")?;
                println!(
                    "Updated README (replaced {}, {} bytes)",
                    report.previous_sha, report.bytes_written
                );
            }
            Command::Next { count } => {
                let ticks = schedule.upcoming(Utc::now(), count);
                if ticks.is_empty() {
                    bail!("Cron expression '{}' has no upcoming ticks", schedule.expr());
                }
                for tick in ticks {
                    println!("{}", tick.to_rfc3339());
                }
            }
        }

        Ok(())
    }
}
