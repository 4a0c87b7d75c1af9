use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{Result, ScannerError};
use crate::generator::OUTPUT_FILE_NAME;
use crate::scanner::{ScanTarget, DEFAULT_EXTENSION};

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Base directory to scan
    pub base_dir: PathBuf,

    /// Files to scan (everything below `base_dir` by default)
    pub target: ScanTarget,

    /// Where the generated JavaScript is written
    pub output_file: PathBuf,

    /// Extension of template source files
    pub extension: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::for_base_dir(PathBuf::from("."))
    }
}

impl ScannerConfig {
    /// Default configuration for a base directory; the output lands in
    /// `<base_dir>/frontend/src/templates.js`
    pub fn for_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            output_file: default_output_file(&base_dir),
            base_dir,
            target: ScanTarget::All,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// A relative `output_file` is resolved against `base_dir`, and a missing
    /// `output_file` follows `base_dir`.
    pub fn from_file(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => {}
            _ => {
                return Err(ScannerError::ConfigError {
                    message: format!(
                        "Unsupported config file format: {}. Use .json",
                        path.display()
                    ),
                })
            }
        }

        let content = std::fs::read_to_string(path).map_err(|e| ScannerError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ScannerError::ConfigError {
                message: format!("Failed to parse JSON config: {}", e),
            })?;
        let has_output = value.get("output_file").is_some();

        let mut config: Self =
            serde_json::from_value(value).map_err(|e| ScannerError::ConfigError {
                message: format!("Invalid config {}: {}", path.display(), e),
            })?;

        if !has_output {
            config.output_file = default_output_file(&config.base_dir);
        } else if config.output_file.is_relative() {
            config.output_file = config.base_dir.join(&config.output_file);
        }

        Ok(config)
    }

    /// Whether a changed path should trigger a rescan
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

/// `<base_dir>/frontend/src/templates.js`
pub fn default_output_file(base_dir: &Path) -> PathBuf {
    base_dir.join("frontend").join("src").join(OUTPUT_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::for_base_dir("/srv/app");
        assert_eq!(config.target, ScanTarget::All);
        assert_eq!(config.extension, "py");
        assert_eq!(
            config.output_file,
            PathBuf::from("/srv/app/frontend/src/templates.js")
        );
    }

    #[test]
    fn test_json_config_loading() {
        let json_content = r#"{
  "base_dir": "/srv/app",
  "target": { "files": ["views/home.py", "views/about.py"] },
  "output_file": "static/templates.js"
}"#;

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(json_content.as_bytes()).unwrap();

        let config = ScannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/srv/app"));
        assert_eq!(
            config.target,
            ScanTarget::Files(vec!["views/home.py".into(), "views/about.py".into()])
        );
        assert_eq!(
            config.output_file,
            PathBuf::from("/srv/app/static/templates.js")
        );
    }

    #[test]
    fn test_json_config_output_follows_base_dir() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(br#"{ "base_dir": "/srv/app", "target": "all" }"#).unwrap();

        let config = ScannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.target, ScanTarget::All);
        assert_eq!(
            config.output_file,
            PathBuf::from("/srv/app/frontend/src/templates.js")
        );
    }

    #[test]
    fn test_unsupported_config_format() {
        let file = NamedTempFile::with_suffix(".yaml").unwrap();
        let err = ScannerConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported config file format"));
    }

    #[test]
    fn test_is_source_file() {
        let config = ScannerConfig::default();
        assert!(config.is_source_file(Path::new("app/views.py")));
        assert!(!config.is_source_file(Path::new("frontend/src/templates.js")));
        assert!(!config.is_source_file(Path::new("Makefile")));
    }
}
