pub mod args;
pub mod ast_visitor;
pub mod config;
pub mod errors;
pub mod generator;
pub mod gitignore;
pub mod scanner;
#[cfg(feature = "cli")]
pub mod watch;

pub use args::Cli;
pub use ast_visitor::{extract_classes_from_content, extract_classes_from_file, ClassSet, TemplateVisitor};
pub use config::ScannerConfig;
pub use errors::{Result, ScannerError};
pub use generator::{generate_template_js, render_template_js};
pub use gitignore::{should_ignore_path, GitIgnore, IgnorePattern};
pub use scanner::{scan_directory, scan_directory_with_report, ScanReport, ScanTarget};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of one scan-and-generate run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_classes: usize,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub output_file: PathBuf,
}

/// Scans templates and regenerates the JavaScript asset.
///
/// The configuration is fixed at construction; every run recomputes the
/// class set from scratch.
#[derive(Debug, Clone)]
pub struct TemplateScanner {
    config: ScannerConfig,
}

impl TemplateScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan the configured target and overwrite the output file
    pub fn run_once(&self) -> Result<RunSummary> {
        let config = &self.config;

        info!("Scanning directory: {}", config.base_dir.display());
        match &config.target {
            ScanTarget::All => info!("Template files: all"),
            ScanTarget::Files(files) => info!("Template files: {:?}", files),
        }

        let report = scan_directory_with_report(&config.base_dir, &config.target, &config.extension)?;

        if let Some(parent) = config.output_file.parent() {
            fs::create_dir_all(parent).map_err(|e| ScannerError::OutputError {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        generate_template_js(&report.classes, &config.output_file)?;

        info!(
            "Generated {} with {} unique classes",
            config.output_file.display(),
            report.classes.len()
        );

        Ok(RunSummary {
            total_classes: report.classes.len(),
            files_scanned: report.scanned_files.len(),
            files_failed: report.failed_files.len(),
            output_file: config.output_file.clone(),
        })
    }

    /// Watch callback: rescan when a template source file changed.
    ///
    /// Returns `None` when the path is not a template source file.
    pub fn on_change(&self, changed_path: &Path) -> Option<Result<RunSummary>> {
        if !self.config.is_source_file(changed_path) {
            return None;
        }
        info!("Detected change in {}", changed_path.display());
        Some(self.run_once())
    }
}
