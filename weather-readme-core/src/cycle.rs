use std::path::PathBuf;

use crate::{
    config::Credential,
    error::CycleError,
    model::{CommitRequest, CycleReport},
    store::ContentStore,
    template,
    weather::WeatherSource,
};

/// One read → weather → render → write pass.
///
/// Nothing is carried over between runs apart from the credential record.
#[derive(Debug)]
pub struct RefreshCycle {
    credential: Credential,
    template_path: PathBuf,
    weather: Box<dyn WeatherSource>,
    store: Box<dyn ContentStore>,
}

impl RefreshCycle {
    pub fn new(
        credential: Credential,
        weather: Box<dyn WeatherSource>,
        store: Box<dyn ContentStore>,
    ) -> Self {
        let template_path = credential.template_path.clone();
        Self {
            credential,
            template_path,
            weather,
            store,
        }
    }

    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Run the cycle; the first failing step ends it.
    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        let descriptor = self.store.read_file(&self.credential).await?;

        let weather = self.weather.fetch_weather().await?;
        let rendered = template::render_file(&self.template_path, &weather)?;

        let request = CommitRequest::new(&self.credential, &descriptor.sha, &rendered);
        self.store.write_file(&self.credential, &request).await?;

        Ok(CycleReport {
            previous_sha: descriptor.sha,
            bytes_written: rendered.len(),
        })
    }
}
