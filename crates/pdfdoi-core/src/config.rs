use regex::Regex;
use thiserror::Error;

use crate::identifiers::{DEFAULT_MOJIBAKES, IdentifierExtractor};

/// Default number of leading pages searched per document.
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Default fragment-gap tolerance, in units of the preceding fragment's
/// smaller dimension.
pub const DEFAULT_TOLERANCE: f32 = 1.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid garbage pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("tolerance must be a finite non-negative number, got {0}")]
    InvalidTolerance(f32),
    #[error("mojibake entry has an empty source string")]
    InvalidMojibake,
}

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn map<U>(self, f: impl FnMut(T) -> U) -> ListOverride<U> {
        match self {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(v) => ListOverride::Replace(v.into_iter().map(f).collect()),
            ListOverride::Extend(v) => ListOverride::Extend(v.into_iter().map(f).collect()),
        }
    }
}

/// Settings for one document scan.
///
/// Use [`ScanConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Leading pages to visit; 0 visits none.
    pub(crate) max_pages: usize,
    /// Gap multiplier for fragment merging.
    pub(crate) tolerance: f32,
    pub(crate) mojibakes: ListOverride<(String, String)>,
    pub(crate) garbage_patterns: ListOverride<Regex>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            tolerance: DEFAULT_TOLERANCE,
            mojibakes: ListOverride::Default,
            garbage_patterns: ListOverride::Default,
        }
    }
}

impl ScanConfig {
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Build the identifier extractor described by this config.
    pub(crate) fn extractor(&self) -> IdentifierExtractor {
        if matches!(self.mojibakes, ListOverride::Default)
            && matches!(self.garbage_patterns, ListOverride::Default)
        {
            return IdentifierExtractor::default();
        }

        let default_mojibakes: Vec<(String, String)> = DEFAULT_MOJIBAKES
            .iter()
            .map(|(bad, good)| (bad.to_string(), good.to_string()))
            .collect();
        let default_garbage: Vec<Regex> = IdentifierExtractor::default_garbage().to_vec();

        IdentifierExtractor::new(
            self.mojibakes.resolve(&default_mojibakes),
            self.garbage_patterns.resolve(&default_garbage),
        )
    }
}

/// Builder for [`ScanConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    max_pages: Option<usize>,
    tolerance: Option<f32>,
    mojibakes: ListOverride<(String, String)>,
    garbage_patterns: ListOverride<String>,
}

impl ScanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = Some(n);
        self
    }

    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    // ── Mojibake table ──

    pub fn set_mojibakes(mut self, table: Vec<(String, String)>) -> Self {
        self.mojibakes = ListOverride::Replace(table);
        self
    }

    pub fn add_mojibake(mut self, bad: &str, good: &str) -> Self {
        let entry = (bad.to_string(), good.to_string());
        match &mut self.mojibakes {
            ListOverride::Default => self.mojibakes = ListOverride::Extend(vec![entry]),
            ListOverride::Replace(v) | ListOverride::Extend(v) => v.push(entry),
        }
        self
    }

    // ── Garbage trailers ──

    pub fn set_garbage_patterns(mut self, patterns: Vec<String>) -> Self {
        self.garbage_patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_garbage_pattern(mut self, pattern: &str) -> Self {
        let pattern = pattern.to_string();
        match &mut self.garbage_patterns {
            ListOverride::Default => self.garbage_patterns = ListOverride::Extend(vec![pattern]),
            ListOverride::Replace(v) | ListOverride::Extend(v) => v.push(pattern),
        }
        self
    }

    /// Validate settings, compile patterns, and produce a [`ScanConfig`].
    pub fn build(self) -> Result<ScanConfig, ConfigError> {
        let tolerance = self.tolerance.unwrap_or(DEFAULT_TOLERANCE);
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }

        let mojibakes = self.mojibakes;
        let entries = match &mojibakes {
            ListOverride::Default => &[][..],
            ListOverride::Replace(v) | ListOverride::Extend(v) => v.as_slice(),
        };
        if entries.iter().any(|(bad, _)| bad.is_empty()) {
            return Err(ConfigError::InvalidMojibake);
        }

        let garbage_patterns = match self.garbage_patterns.map(|p| Regex::new(&p)) {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(v) => {
                ListOverride::Replace(v.into_iter().collect::<Result<Vec<Regex>, _>>()?)
            }
            ListOverride::Extend(v) => {
                ListOverride::Extend(v.into_iter().collect::<Result<Vec<Regex>, _>>()?)
            }
        };

        Ok(ScanConfig {
            max_pages: self.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
            tolerance,
            mojibakes,
            garbage_patterns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.max_pages(), 5);
        assert!((config.tolerance() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builder_basic() {
        let config = ScanConfigBuilder::new()
            .max_pages(2)
            .tolerance(0.5)
            .build()
            .unwrap();
        assert_eq!(config.max_pages(), 2);
        assert!((config.tolerance() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builder_rejects_bad_tolerance() {
        for bad in [-1.0, f32::NAN, f32::INFINITY] {
            let result = ScanConfigBuilder::new().tolerance(bad).build();
            assert!(matches!(result, Err(ConfigError::InvalidTolerance(_))));
        }
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ScanConfigBuilder::new().add_garbage_pattern(r"[invalid").build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_builder_rejects_empty_mojibake() {
        let result = ScanConfigBuilder::new().add_mojibake("", "/").build();
        assert!(matches!(result, Err(ConfigError::InvalidMojibake)));
    }

    #[test]
    fn test_extended_garbage_applies_after_defaults() {
        let config = ScanConfigBuilder::new()
            .add_garbage_pattern(r"\)$")
            .build()
            .unwrap();
        let extractor = config.extractor();
        assert_eq!(extractor.cleanup("10.1000/abc)."), "10.1000/abc");
    }

    #[test]
    fn test_replaced_mojibakes_drop_defaults() {
        let config = ScanConfigBuilder::new()
            .set_mojibakes(vec![("\u{2044}".into(), "/".into())])
            .build()
            .unwrap();
        let extractor = config.extractor();
        assert_eq!(extractor.normalize("a\u{2044}b"), "a/b");
        assert_eq!(
            extractor.normalize("a\u{e5}\u{2026}\u{be}b"),
            "a\u{e5}\u{2026}\u{be}b"
        );
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
