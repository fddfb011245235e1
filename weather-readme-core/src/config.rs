use serde::Deserialize;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{error::ConfigError, scheduler::CronSchedule};

/// Default location of the credential file, relative to the working directory.
pub const DEFAULT_CREDENTIALS_PATH: &str = ".credentials";

/// What the scheduler does when a refresh cycle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum FailurePolicy {
    /// Log the failure and wait for the next tick.
    #[default]
    SkipCycle,
    /// Stop scheduling and surface the error to the caller.
    Abort,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::SkipCycle => "skip",
            FailurePolicy::Abort => "abort",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FailurePolicy {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::SkipCycle),
            "abort" => Ok(FailurePolicy::Abort),
            _ => Err(ConfigError::UnknownPolicy(value.to_string())),
        }
    }
}

impl TryFrom<String> for FailurePolicy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Everything the job needs, loaded once at startup.
///
/// Example TOML:
/// ```toml
/// default_message = "Update weather"
/// username = "octocat"
/// email = "octocat@example.com"
/// name = "Octo Cat"
/// repo = "octocat"
/// file_path = "README.md"
/// token = "ghp_..."
/// cron_expression = "0 * * * *"
/// ```
#[derive(Clone, Deserialize)]
pub struct Credential {
    pub default_message: String,
    pub username: String,
    pub email: String,
    /// Display name used for both committer and author.
    pub name: String,
    pub repo: String,
    pub file_path: String,
    pub token: String,
    pub cron_expression: String,

    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn default_location() -> String {
    "Danang".to_string()
}

fn default_weather_base_url() -> String {
    "https://wttr.in".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_template_path() -> PathBuf {
    PathBuf::from("README.md.tmpl")
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("default_message", &self.default_message)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("repo", &self.repo)
            .field("file_path", &self.file_path)
            .field("token", &"<redacted>")
            .field("cron_expression", &self.cron_expression)
            .field("location", &self.location)
            .field("weather_base_url", &self.weather_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("template_path", &self.template_path)
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

impl Credential {
    /// Load and validate the credential file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let credential = Self::from_toml(&contents).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            repo = %credential.repo_slug(),
            file = %credential.file_path,
            "Loaded credentials"
        );

        Ok(credential)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let credential: Credential = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        credential.validate()?;
        Ok(credential)
    }

    /// Reject empty required fields and unparsable cron expressions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("default_message", &self.default_message),
            ("username", &self.username),
            ("email", &self.email),
            ("name", &self.name),
            ("repo", &self.repo),
            ("file_path", &self.file_path),
            ("token", &self.token),
            ("cron_expression", &self.cron_expression),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(field));
            }
        }

        CronSchedule::parse(&self.cron_expression)?;
        Ok(())
    }

    /// `owner/repo`, for log fields.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.username, self.repo)
    }

    /// URL of the contents endpoint for the configured file.
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base_url.trim_end_matches('/'),
            self.username,
            self.repo,
            self.file_path.trim_start_matches('/')
        )
    }

    /// URL of the plain-text weather page for the configured location.
    pub fn weather_url(&self) -> String {
        format!(
            "{}/{}?format=v2",
            self.weather_base_url.trim_end_matches('/'),
            self.location
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const SAMPLE: &str = r#"
default_message = "Update weather"
username = "octocat"
email = "octocat@example.com"
name = "Octo Cat"
repo = "octocat"
file_path = "README.md"
token = "secret-token"
cron_expression = "0 * * * *"
"#;

    #[test]
    fn parses_required_fields_and_applies_defaults() {
        let cred = Credential::from_toml(SAMPLE).expect("sample must parse");

        assert_eq!(cred.username, "octocat");
        assert_eq!(cred.name, "Octo Cat");
        assert_eq!(cred.location, "Danang");
        assert_eq!(cred.template_path, PathBuf::from("README.md.tmpl"));
        assert_eq!(cred.on_failure, FailurePolicy::SkipCycle);
        assert_eq!(
            cred.contents_url(),
            "https://api.github.com/repos/octocat/octocat/contents/README.md"
        );
        assert_eq!(cred.weather_url(), "https://wttr.in/Danang?format=v2");
    }

    #[test]
    fn optional_fields_override_defaults() {
        let toml = format!(
            "{SAMPLE}location = \"Hanoi\"\napi_base_url = \"http://127.0.0.1:9000/\"\non_failure = \"abort\"\n"
        );
        let cred = Credential::from_toml(&toml).expect("must parse");

        assert_eq!(cred.on_failure, FailurePolicy::Abort);
        assert_eq!(
            cred.contents_url(),
            "http://127.0.0.1:9000/repos/octocat/octocat/contents/README.md"
        );
        assert_eq!(cred.weather_url(), "https://wttr.in/Hanoi?format=v2");
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let toml = SAMPLE.replace("token = \"secret-token\"\n", "");
        let err = Credential::from_toml(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_field_is_rejected() {
        let toml = SAMPLE.replace("repo = \"octocat\"", "repo = \"  \"");
        let err = Credential::from_toml(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("repo")));
    }

    #[test]
    fn bad_cron_is_rejected() {
        let toml = SAMPLE.replace("0 * * * *", "every now and then");
        let err = Credential::from_toml(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Cron { .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let cred = Credential::from_toml(SAMPLE).expect("sample must parse");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn load_reports_path_of_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing");

        let err = Credential::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(SAMPLE.as_bytes()).expect("write");

        let cred = Credential::load(file.path()).expect("must load");
        assert_eq!(cred.repo_slug(), "octocat/octocat");
    }

    #[test]
    fn on_failure_in_file_ignores_case() {
        let cred = Credential::from_toml(&format!("{SAMPLE}on_failure = \"Abort\"\n")).unwrap();
        assert_eq!(cred.on_failure, FailurePolicy::Abort);

        let err = Credential::from_toml(&format!("{SAMPLE}on_failure = \"retry\"\n")).unwrap_err();
        assert!(err.to_string().contains("Unknown failure policy 'retry'"));
    }

    #[test]
    fn failure_policy_parses_case_insensitively() {
        assert_eq!(FailurePolicy::try_from("SKIP").unwrap(), FailurePolicy::SkipCycle);
        assert_eq!(FailurePolicy::try_from("abort").unwrap(), FailurePolicy::Abort);
        assert!(FailurePolicy::try_from("retry").is_err());
    }
}
