use std::{fmt, path::PathBuf};

use reqwest::StatusCode;

/// Problems with the local credential file. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read credential file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credential file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Credential field `{0}` must not be empty")]
    MissingField(&'static str),

    #[error("Invalid cron expression '{expr}': {reason}")]
    Cron { expr: String, reason: String },

    #[error("Unknown failure policy '{0}'. Supported policies: skip, abort.")]
    UnknownPolicy(String),
}

/// Problems with the README template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unterminated placeholder starting at byte {0}")]
    Unterminated(usize),

    #[error("Unknown placeholder '{0}'")]
    UnknownPlaceholder(String),
}

/// Step of the refresh cycle an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Weather,
    Render,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Weather => "weather",
            Stage::Render => "render",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("{stage}: request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage}: unexpected status {status}: {body}")]
    Status {
        stage: Stage,
        status: StatusCode,
        body: String,
    },

    #[error("{stage}: failed to decode response: {reason}")]
    Decode { stage: Stage, reason: String },

    #[error("render: {0}")]
    Template(#[from] TemplateError),
}

impl CycleError {
    pub fn stage(&self) -> Stage {
        match self {
            CycleError::Transport { stage, .. }
            | CycleError::Status { stage, .. }
            | CycleError::Decode { stage, .. } => *stage,
            CycleError::Template(_) => Stage::Render,
        }
    }

    pub(crate) fn transport(stage: Stage, source: reqwest::Error) -> Self {
        CycleError::Transport { stage, source }
    }

    pub(crate) fn status(stage: Stage, status: StatusCode, body: &str) -> Self {
        CycleError::Status {
            stage,
            status,
            body: truncate_body(body),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
