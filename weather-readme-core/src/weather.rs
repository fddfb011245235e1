use async_trait::async_trait;
use std::fmt::{self, Debug};

use crate::error::CycleError;

pub mod extract;
pub mod wttr;

pub use extract::{PreBlockExtractor, TextExtractor};
pub use wttr::WttrSource;

/// Weather block ready to be dropped into the README.
///
/// Either `<pre>…</pre>` around the scraped text, or empty when the page
/// had nothing to scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherText(String);

impl WeatherText {
    pub fn from_block(text: &str) -> Self {
        Self(format!("<pre>{text}</pre>"))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for WeatherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_weather(&self) -> Result<WeatherText, CycleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_wrapped_in_pre_tag() {
        let text = WeatherText::from_block("sunny 20C");
        assert_eq!(text.as_str(), "<pre>sunny 20C</pre>");
        assert!(!text.is_empty());
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert_eq!(WeatherText::empty().to_string(), "");
    }
}
