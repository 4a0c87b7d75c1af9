use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::ast_visitor::{extract_classes_from_file, ClassSet};
use crate::errors::Result;
use crate::gitignore::{relative_to, segments, GitIgnore};

/// Extension of the template source files
pub const DEFAULT_EXTENSION: &str = "py";

/// Which files a scan looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanTarget {
    /// Every source file below the base directory
    #[default]
    All,
    /// Only these files, relative to the base directory
    Files(Vec<PathBuf>),
}

impl ScanTarget {
    /// An empty list means "scan everything"
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        if files.is_empty() {
            ScanTarget::All
        } else {
            ScanTarget::Files(files)
        }
    }
}

/// Outcome of a directory scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Union of the classes of every scanned file
    pub classes: ClassSet,
    /// Files that were scanned successfully, in scan order
    pub scanned_files: Vec<PathBuf>,
    /// Files that failed to read or parse
    pub failed_files: Vec<PathBuf>,
}

impl ScanReport {
    fn scan_file(&mut self, file_path: &Path) {
        info!("Scanning {}", file_path.display());
        match extract_classes_from_file(file_path) {
            Ok(classes) => {
                debug!("{}: {} classes", file_path.display(), classes.len());
                self.classes.extend(classes);
                self.scanned_files.push(file_path.to_path_buf());
            }
            Err(e) if e.is_parse_error() => {
                warn!("Error parsing {}", file_path.display());
                debug!("{}", e);
                self.failed_files.push(file_path.to_path_buf());
            }
            Err(e) => {
                warn!("Error scanning {}: {}", file_path.display(), e);
                self.failed_files.push(file_path.to_path_buf());
            }
        }
    }
}

/// Scan a directory for htpy templates and return the unique class names
pub fn scan_directory(base_dir: &Path, target: &ScanTarget) -> Result<ClassSet> {
    Ok(scan_directory_with_report(base_dir, target, DEFAULT_EXTENSION)?.classes)
}

/// Scan a directory, keeping track of which files were scanned.
///
/// A file that cannot be read or parsed contributes nothing; it never aborts
/// the scan. Only an unusable base directory pattern is an error.
pub fn scan_directory_with_report(
    base_dir: &Path,
    target: &ScanTarget,
    extension: &str,
) -> Result<ScanReport> {
    let mut report = ScanReport::default();

    match target {
        ScanTarget::Files(files) => {
            for file_name in files {
                let file_path = base_dir.join(file_name);
                if file_path.exists() {
                    report.scan_file(&file_path);
                } else {
                    debug!("Skipping missing template {}", file_path.display());
                }
            }
        }
        ScanTarget::All => {
            for file_path in collect_source_files(base_dir, extension)? {
                report.scan_file(&file_path);
            }
        }
    }

    Ok(report)
}

/// Collect every source file below `base_dir`, skipping hidden entries and
/// anything excluded by `.gitignore`
pub fn collect_source_files(base_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let gitignore = GitIgnore::load(base_dir);
    let pattern = format!(
        "{}/**/*.{}",
        glob::Pattern::escape(&base_dir.to_string_lossy()),
        glob::Pattern::escape(extension)
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Error scanning {}: {}", e.path().display(), e.error());
                continue;
            }
        };

        if !path.is_file() {
            continue;
        }
        // glob drops a leading `./`, so relativize component-wise
        let Some(relative) = relative_to(&path, base_dir) else {
            continue;
        };
        if is_hidden(&relative) {
            continue;
        }
        if gitignore.is_ignored_relative(&relative) {
            debug!("Ignoring {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Whether any segment of a base-relative path starts with a dot
fn is_hidden(relative: &Path) -> bool {
    segments(relative).any(|segment| segment.starts_with('.'))
}
