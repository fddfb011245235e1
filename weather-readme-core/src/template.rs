//! README template rendering.
//!
//! Templates are plain text with `{{Weather}}` placeholders. The Go-template
//! spelling `{{ .Weather }}` is accepted too, so existing `README.md.tmpl`
//! files keep working. Everything outside a placeholder is copied verbatim.

use regex::Regex;
use std::{fs, path::Path, sync::LazyLock};

use crate::{error::TemplateError, weather::WeatherText};

/// Name of the only placeholder the README template may use.
pub const WEATHER_PLACEHOLDER: &str = "Weather";

static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Weather,
}

/// A parsed template, ready to be rendered any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for caps in PLACEHOLDER_PATTERN.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            check_literal(&source[cursor..whole.start()], cursor)?;
            if whole.start() > cursor {
                segments.push(Segment::Text(source[cursor..whole.start()].to_string()));
            }

            if name.as_str() != WEATHER_PLACEHOLDER {
                return Err(TemplateError::UnknownPlaceholder(name.as_str().to_string()));
            }
            segments.push(Segment::Weather);
            cursor = whole.end();
        }

        check_literal(&source[cursor..], cursor)?;
        if cursor < source.len() {
            segments.push(Segment::Text(source[cursor..].to_string()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, weather: &WeatherText) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Weather => weather.as_str(),
            })
            .collect()
    }
}

/// Literal text must not contain a `{{` that failed to form a placeholder.
fn check_literal(text: &str, offset: usize) -> Result<(), TemplateError> {
    let Some(pos) = text.find("{{") else {
        return Ok(());
    };

    let rest = &text[pos + 2..];
    match rest.find("}}") {
        None => Err(TemplateError::Unterminated(offset + pos)),
        Some(end) => Err(TemplateError::UnknownPlaceholder(rest[..end].trim().to_string())),
    }
}

pub fn render(source: &str, weather: &WeatherText) -> Result<String, TemplateError> {
    Ok(Template::parse(source)?.render(weather))
}

/// Read the template from disk and render it.
pub fn render_file(path: &Path, weather: &WeatherText) -> Result<String, TemplateError> {
    let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    render(&source, weather)
}
