use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode, header};

use crate::{
    config::Credential,
    error::{CycleError, Stage},
};

use super::{PreBlockExtractor, TextExtractor, WeatherSource, WeatherText};

/// Rotated per request so the upstream is less likely to block us.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Scrapes the v2 text rendering of wttr.in.
#[derive(Debug, Clone)]
pub struct WttrSource<E = PreBlockExtractor> {
    url: String,
    extractor: E,
    http: Client,
}

impl WttrSource {
    pub fn new(credential: &Credential) -> Self {
        Self::with_extractor(credential.weather_url(), PreBlockExtractor)
    }
}

impl<E: TextExtractor> WttrSource<E> {
    pub fn with_extractor(url: String, extractor: E) -> Self {
        Self {
            url,
            extractor,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl<E: TextExtractor> WeatherSource for WttrSource<E> {
    async fn fetch_weather(&self) -> Result<WeatherText, CycleError> {
        let res = self
            .http
            .get(&self.url)
            .header(header::USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(|e| CycleError::transport(Stage::Weather, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| CycleError::transport(Stage::Weather, e))?;

        if status != StatusCode::OK {
            return Err(CycleError::status(Stage::Weather, status, &body));
        }

        match self.extractor.extract(&body) {
            Some(text) => {
                tracing::debug!(stage = %Stage::Weather, chars = text.len(), "Scraped weather block");
                Ok(WeatherText::from_block(&text))
            }
            None => {
                tracing::warn!(
                    stage = %Stage::Weather,
                    url = %self.url,
                    "No preformatted block in weather page; rendering without weather"
                );
                Ok(WeatherText::empty())
            }
        }
    }
}
