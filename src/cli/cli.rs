use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Write the structure of a directory tree to a JSON file.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Directory to scan. Prompted for when omitted
    pub root: Option<PathBuf>,

    /// Where to write the JSON document [default: folder_structure.json]
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Do not list directories nested deeper than this
    #[clap(long, short = 'd')]
    pub max_depth: Option<usize>,

    /// Settings file [default: folder-scan.yaml, if present]
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_prompt_and_defaults() {
        let cli = Cli::try_parse_from(["folder-scan"]).unwrap();
        assert_eq!(cli.root, None);
        assert_eq!(cli.output, None);
        assert_eq!(cli.max_depth, None);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn all_flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "folder-scan",
            "some/dir",
            "-o",
            "tree.json",
            "-d",
            "5",
            "-c",
            "alt.yaml",
            "--log-level",
            "silent",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("some/dir")));
        assert_eq!(cli.output, Some(PathBuf::from("tree.json")));
        assert_eq!(cli.max_depth, Some(5));
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        assert_eq!(cli.log_level, LogLevel::Silent);
    }

    #[test]
    fn negative_depth_is_rejected() {
        assert!(Cli::try_parse_from(["folder-scan", "-d", "-1"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
