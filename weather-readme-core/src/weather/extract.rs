use scraper::{Html, Selector};
use std::fmt::Debug;

/// Pulls the weather text out of a fetched page.
pub trait TextExtractor: Send + Sync + Debug {
    /// `None` when the page has nothing usable.
    fn extract(&self, body: &str) -> Option<String>;
}

/// Text content of the first `<pre>` element in an HTML document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreBlockExtractor;

impl TextExtractor for PreBlockExtractor {
    fn extract(&self, body: &str) -> Option<String> {
        let selector = Selector::parse("pre").ok()?;
        let document = Html::parse_document(body);

        document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }
}
