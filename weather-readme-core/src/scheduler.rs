//! Cron-driven loop around [`RefreshCycle`].
//!
//! One job, one task: each tick runs the cycle to completion before the next
//! occurrence is computed, so runs never overlap.

use chrono::{DateTime, Utc};
use std::{str::FromStr, time::Duration};

use crate::{
    config::FailurePolicy,
    cycle::RefreshCycle,
    error::{ConfigError, CycleError},
};

/// A parsed cron expression, evaluated in UTC.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expr: String,
    schedule: cron::Schedule,
}

impl CronSchedule {
    /// Accepts both standard 5-field expressions (`min hr dom month dow`) and
    /// the 6/7-field form with seconds understood by the `cron` crate.
    pub fn parse(expr: &str) -> Result<Self, ConfigError> {
        let normalized = normalize_cron_expr(expr);
        let schedule = cron::Schedule::from_str(&normalized).map_err(|e| ConfigError::Cron {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            expr: expr.trim().to_string(),
            schedule,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule.after(&after).take(count).collect()
    }
}

/// Standard cron has no seconds field; pin it to zero. Its day-of-week field
/// counts 0 (or 7) = Sunday, while the `cron` crate counts 1 = Sunday.
fn normalize_cron_expr(expr: &str) -> String {
    let trimmed = expr.trim();
    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, dom, month, dow] => {
            format!("0 {minute} {hour} {dom} {month} {}", standard_dow_to_cron(dow))
        }
        _ => trimmed.to_string(),
    }
}

/// Rewrite numeric days of a standard day-of-week field as `cron` crate days.
///
/// Lists, ranges and steps are expanded into an explicit list. Names and
/// anything unparsable are passed through for the `cron` crate to judge.
fn standard_dow_to_cron(field: &str) -> String {
    if field == "*" || field == "?" {
        return field.to_string();
    }

    let mut days = [false; 7];
    let mut passthrough = Vec::new();

    for item in field.split(',') {
        match standard_days(item) {
            Some(expanded) => expanded.into_iter().for_each(|day| days[day % 7] = true),
            None => passthrough.push(item.to_string()),
        }
    }

    let mut items: Vec<String> = days
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .map(|(day, _)| (day + 1).to_string())
        .collect();
    items.extend(passthrough);
    items.join(",")
}

/// Days (0..=7, Sunday = 0 or 7) named by one list item such as `1-5` or `*/2`.
fn standard_days(item: &str) -> Option<Vec<usize>> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, step.parse::<usize>().ok().filter(|s| *s > 0)?),
        None => (item, 1),
    };

    let (start, end) = if range == "*" {
        (0, 6)
    } else if let Some((start, end)) = range.split_once('-') {
        (start.parse::<usize>().ok()?, end.parse::<usize>().ok()?)
    } else {
        let start = range.parse::<usize>().ok()?;
        // `n/step` runs to the end of the week.
        (start, if item.contains('/') { 7 } else { start })
    };

    if start > end || end > 7 {
        return None;
    }
    Some((start..=end).step_by(step).collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl TickSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    schedule: CronSchedule,
    policy: FailurePolicy,
}

impl Scheduler {
    pub fn new(schedule: CronSchedule, policy: FailurePolicy) -> Self {
        Self { schedule, policy }
    }

    /// Run until the schedule is exhausted or, with [`FailurePolicy::Abort`],
    /// a cycle fails.
    pub async fn run_forever(&self, cycle: &RefreshCycle) -> Result<TickSummary, CycleError> {
        self.run_ticks(cycle, None).await
    }

    /// Like [`Scheduler::run_forever`] but stops after `limit` ticks.
    pub async fn run_ticks(
        &self,
        cycle: &RefreshCycle,
        limit: Option<usize>,
    ) -> Result<TickSummary, CycleError> {
        let mut summary = TickSummary::default();

        tracing::info!(
            cron = %self.schedule.expr(),
            policy = %self.policy,
            "Scheduler started"
        );

        while limit.is_none_or(|max| summary.total() < max) {
            let now = Utc::now();
            let Some(next) = self.schedule.next_after(now) else {
                tracing::warn!(cron = %self.schedule.expr(), "Schedule has no further occurrences");
                break;
            };

            tracing::debug!(next = %next, "Waiting for next tick");
            let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(delay).await;

            match cycle.run().await {
                Ok(report) => {
                    summary.succeeded += 1;
                    tracing::info!(
                        previous_sha = %report.previous_sha,
                        bytes = report.bytes_written,
                        "Refresh cycle completed"
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    tracing::error!(stage = %err.stage(), error = %err, "Refresh cycle failed");

                    if self.policy == FailurePolicy::Abort {
                        return Err(err);
                    }
                }
            }
        }

        Ok(summary)
    }
}
