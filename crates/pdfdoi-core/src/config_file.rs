use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ScanConfig, ScanConfigBuilder};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub scan: Option<ScanSection>,
    pub extraction: Option<ExtractionSection>,
    pub crossref: Option<CrossRefSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSection {
    pub max_pages: Option<usize>,
    pub space_tol: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// Extra garbage-trailer regexes, applied after the built-in ones.
    pub extra_garbage_patterns: Option<Vec<String>>,
    /// Extra `[from, to]` mojibake repairs, applied after the built-in ones.
    pub extra_mojibakes: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossRefSection {
    pub mailto: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Platform config directory path: `<config_dir>/pdfdoi/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfdoi").join("config.toml"))
}

/// Load config by cascading CWD `.pdfdoi.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfdoi.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_scan = base.scan.unwrap_or_default();
    let over_scan = overlay.scan.unwrap_or_default();
    let base_extraction = base.extraction.unwrap_or_default();
    let over_extraction = overlay.extraction.unwrap_or_default();
    let base_crossref = base.crossref.unwrap_or_default();
    let over_crossref = overlay.crossref.unwrap_or_default();

    ConfigFile {
        scan: Some(ScanSection {
            max_pages: over_scan.max_pages.or(base_scan.max_pages),
            space_tol: over_scan.space_tol.or(base_scan.space_tol),
        }),
        extraction: Some(ExtractionSection {
            extra_garbage_patterns: over_extraction
                .extra_garbage_patterns
                .or(base_extraction.extra_garbage_patterns),
            extra_mojibakes: over_extraction
                .extra_mojibakes
                .or(base_extraction.extra_mojibakes),
        }),
        crossref: Some(CrossRefSection {
            mailto: over_crossref.mailto.or(base_crossref.mailto),
            timeout_secs: over_crossref.timeout_secs.or(base_crossref.timeout_secs),
        }),
    }
}

impl ConfigFile {
    /// Seed a [`ScanConfigBuilder`] with the values present in this file.
    pub fn scan_builder(&self) -> ScanConfigBuilder {
        let mut builder = ScanConfigBuilder::new();
        if let Some(scan) = &self.scan {
            if let Some(n) = scan.max_pages {
                builder = builder.max_pages(n);
            }
            if let Some(tol) = scan.space_tol {
                builder = builder.tolerance(tol);
            }
        }
        if let Some(extraction) = &self.extraction {
            for pattern in extraction.extra_garbage_patterns.iter().flatten() {
                builder = builder.add_garbage_pattern(pattern);
            }
            for (bad, good) in extraction.extra_mojibakes.iter().flatten() {
                builder = builder.add_mojibake(bad, good);
            }
        }
        builder
    }

    pub fn scan_config(&self) -> Result<ScanConfig, ConfigError> {
        self.scan_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_toml() {
        let config = ConfigFile {
            scan: Some(ScanSection {
                max_pages: Some(3),
                space_tol: Some(0.5),
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        let scan = parsed.scan.unwrap();
        assert_eq!(scan.max_pages, Some(3));
        assert_eq!(scan.space_tol, Some(0.5));
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let toml_str = "[crossref]\nmailto = \"me@example.org\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(parsed.scan.is_none());
        assert_eq!(parsed.crossref.unwrap().timeout_secs, None);
    }

    #[test]
    fn mojibake_pairs_parse_from_arrays() {
        let toml_str = "[extraction]\nextra_mojibakes = [[\"\u{2215}\", \"/\"]]\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(
            parsed.extraction.unwrap().extra_mojibakes.unwrap(),
            vec![("\u{2215}".to_string(), "/".to_string())]
        );
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            scan: Some(ScanSection {
                max_pages: Some(10),
                space_tol: Some(2.0),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            scan: Some(ScanSection {
                max_pages: Some(1),
                space_tol: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let scan = merged.scan.unwrap();
        assert_eq!(scan.max_pages, Some(1));
        assert_eq!(scan.space_tol, Some(2.0));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            crossref: Some(CrossRefSection {
                mailto: Some("base@example.org".into()),
                timeout_secs: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.crossref.unwrap().mailto.as_deref(),
            Some("base@example.org")
        );
    }

    #[test]
    fn load_from_path_reads_file_and_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[scan]\nmax_pages = 2\n").unwrap();
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[scan\nmax_pages = ").unwrap();

        let loaded = load_from_path(&good).unwrap();
        assert_eq!(loaded.scan.unwrap().max_pages, Some(2));
        assert!(load_from_path(&bad).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }

    #[test]
    fn scan_config_from_file() {
        let toml_str = "[scan]\nmax_pages = 1\nspace_tol = 0.25\n\
                        [extraction]\nextra_garbage_patterns = [\"\\\\)$\"]\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = parsed.scan_config().unwrap();
        assert_eq!(config.max_pages(), 1);
        assert!((config.tolerance() - 0.25).abs() < f32::EPSILON);
        assert_eq!(config.extractor().cleanup("10.1/x)"), "10.1/x");
    }

    #[test]
    fn scan_config_rejects_negative_tolerance() {
        let parsed: ConfigFile = toml::from_str("[scan]\nspace_tol = -1.0\n").unwrap();
        assert!(matches!(
            parsed.scan_config(),
            Err(ConfigError::InvalidTolerance(_))
        ));
    }
}
