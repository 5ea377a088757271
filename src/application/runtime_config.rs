use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Settings;
use crate::output::{DEFAULT_INDENT, DEFAULT_OUTPUT_FILE_NAME};

/// Values taken from the command line. Anything left `None` falls back to
/// the settings file, then to the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub settings_file: Option<PathBuf>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.root,
            output: cli.output,
            max_depth: cli.max_depth,
            settings_file: cli.config,
        }
    }
}

/// Fully merged configuration for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub output: PathBuf,
    pub max_depth: Option<usize>,
    pub indent: usize,
}

impl RuntimeConfig {
    pub fn merge(&self, settings: Settings) -> ScanConfig {
        ScanConfig {
            output: self
                .output
                .clone()
                .or(settings.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE_NAME)),
            max_depth: self.max_depth.or(settings.max_depth),
            indent: settings.indent.unwrap_or(DEFAULT_INDENT),
        }
    }
}
