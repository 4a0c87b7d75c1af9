use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::{default_output_file, ScannerConfig};
use crate::errors::Result;
use crate::scanner::ScanTarget;

/// Scan HTPy templates for Tailwind classes
#[derive(Parser, Debug, Clone)]
#[command(name = "tailwind-htpy-scanner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base directory to scan
    #[arg(
        long = "dir",
        value_name = "PATH",
        help = "Base directory to scan (defaults to the parent of the install directory)"
    )]
    pub dir: Option<PathBuf>,

    /// Specific template files to scan, relative to the base directory
    #[arg(
        long = "files",
        value_name = "PATH",
        num_args = 1..,
        help = "Specific template files to scan"
    )]
    pub files: Vec<PathBuf>,

    /// Watch mode
    #[arg(
        long = "watch",
        default_value_t = false,
        help = "Watch for file changes"
    )]
    pub watch: bool,

    /// Output file path
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Path of the generated JavaScript file (defaults to <dir>/frontend/src/templates.js)"
    )]
    pub output: Option<PathBuf>,

    /// Configuration file path (JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "Path to configuration file (JSON format)"
    )]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,
}

impl Cli {
    /// Build the scanner configuration.
    ///
    /// Command line flags override the config file; `default_dir` is used
    /// when neither names a base directory.
    pub fn to_config(&self, default_dir: &Path) -> Result<ScannerConfig> {
        let mut config = match &self.config {
            Some(path) => ScannerConfig::from_file(path)?,
            None => ScannerConfig::for_base_dir(default_dir),
        };

        if let Some(dir) = &self.dir {
            let follows_base = config.output_file == default_output_file(&config.base_dir);
            config.base_dir = dir.clone();
            if follows_base {
                config.output_file = default_output_file(dir);
            }
        }
        if !self.files.is_empty() {
            config.target = ScanTarget::from_files(self.files.clone());
        }
        if let Some(output) = &self.output {
            config.output_file = output.clone();
        }

        // Walked paths are relativized against this, keep it absolute
        if let Ok(base_dir) = config.base_dir.canonicalize() {
            config.base_dir = base_dir;
        }

        Ok(config)
    }
}

/// Default base directory: the parent of the directory holding the executable
pub fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
