use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::console::Console;
use crate::application::{RuntimeConfig, ScanConfig};
use crate::config::{Settings, SettingsError};
use crate::ext::BestEffortPathExt;
use crate::filesystem::TreeBuilder;
use crate::output::JsonOutput;

/// How a run ended. Every variant is a normal termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The root path did not exist; nothing was scanned or written.
    MissingRoot { root: PathBuf },
    Saved {
        output: PathBuf,
        bytes: usize,
        scan_failures: usize,
    },
    SaveFailed { output: PathBuf, scan_failures: usize },
}

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<Outcome, ApplicationError> {
        let mut input = io::stdin().lock();
        let mut output = io::stdout().lock();
        Self::run_with(app_config.into(), &mut input, &mut output).await
    }

    /// Same as [`Application::run`], with explicit console streams.
    pub async fn run_with<R: BufRead, W: Write>(
        app_config: RuntimeConfig,
        input: &mut R,
        output: &mut W,
    ) -> Result<Outcome, ApplicationError> {
        let settings = match &app_config.settings_file {
            Some(path) => Settings::from_path(path).await,
            None => Settings::read_default().await,
        }
        .context(SettingsSnafu)?;
        let scan_config = app_config.merge(settings);
        debug!("Scan configuration: {:?}", scan_config);

        let mut console = Console::new(input, output);

        let root = match &app_config.root {
            Some(root) => root.clone(),
            None => PathBuf::from(console.prompt_root().context(ConsoleSnafu)?),
        };

        if !root.exists() {
            warn!("Root path {} does not exist", root.best_effort_path_display());
            console.missing_root().context(ConsoleSnafu)?;
            return Ok(Outcome::MissingRoot { root });
        }

        Self::scan_and_save(&root, &scan_config, &mut console).await
    }

    async fn scan_and_save<R: BufRead, W: Write>(
        root: &Path,
        scan_config: &ScanConfig,
        console: &mut Console<'_, R, W>,
    ) -> Result<Outcome, ApplicationError> {
        info!("Scanning {}", root.best_effort_path_display());
        let report = TreeBuilder::new()
            .with_max_depth(scan_config.max_depth)
            .scan(root);
        info!(
            "Scan finished with depth {} and {} failure(s)",
            report.root.depth(),
            report.failures.len()
        );

        for failure in &report.failures {
            if let Err(err) = console.scan_failure(failure) {
                warn!("Failed to report scan failure on the console: {}", err);
            }
        }
        let scan_failures = report.failures.len();

        let writer = JsonOutput::new(&scan_config.output).with_indent(scan_config.indent);
        match writer.write(&report.root).await {
            Ok(bytes) => {
                info!(
                    "Wrote {} bytes to {}",
                    bytes,
                    writer.path().best_effort_path_display()
                );
                console.saved(writer.path()).context(ConsoleSnafu)?;
                Ok(Outcome::Saved {
                    output: writer.path().to_path_buf(),
                    bytes,
                    scan_failures,
                })
            }
            Err(err) => {
                warn!("{}", err);
                console.save_failed(&err).context(ConsoleSnafu)?;
                Ok(Outcome::SaveFailed {
                    output: writer.path().to_path_buf(),
                    scan_failures,
                })
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Failed to talk to the console"))]
    ConsoleError { source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{Node, NodeKind};
    use serde_json::Value;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                temp_dir: TempDir::new().expect("Failed to create temp directory"),
            }
        }

        fn root(&self) -> PathBuf {
            self.temp_dir.path().join("root")
        }

        fn output(&self) -> PathBuf {
            self.temp_dir.path().join("folder_structure.json")
        }

        fn settings_file(&self) -> PathBuf {
            let path = self.temp_dir.path().join("folder-scan.yaml");
            if !path.exists() {
                fs::write(&path, "").unwrap();
            }
            path
        }

        fn config(&self, root: Option<PathBuf>) -> RuntimeConfig {
            RuntimeConfig {
                root,
                output: Some(self.output()),
                max_depth: None,
                settings_file: Some(self.settings_file()),
            }
        }

        fn build_sample(&self) {
            let root = self.root();
            fs::create_dir_all(root.join("b")).unwrap();
            fs::write(root.join("a.txt"), "a").unwrap();
            fs::write(root.join("b").join("c.txt"), "c").unwrap();
        }

        fn read_output(&self) -> Value {
            serde_json::from_slice(&fs::read(self.output()).unwrap()).unwrap()
        }
    }

    async fn run(config: RuntimeConfig, typed: &str) -> (Outcome, String) {
        let mut input = Cursor::new(typed.as_bytes().to_vec());
        let mut output = Vec::new();
        let outcome = Application::run_with(config, &mut input, &mut output)
            .await
            .unwrap();
        (outcome, String::from_utf8(output).unwrap())
    }

    fn child<'a>(value: &'a Value, name: &str) -> &'a Value {
        value["contents"]
            .as_array()
            .unwrap()
            .iter()
            .find(|child| child["name"] == name)
            .unwrap_or_else(|| panic!("Missing child {name}"))
    }

    #[compio::test]
    async fn sample_tree_is_written_in_documented_shape() {
        let fixture = Fixture::new();
        fixture.build_sample();
        let root = fixture.root();
        let root_text = root.to_string_lossy().into_owned();

        let (outcome, console) = run(fixture.config(Some(root.clone())), "").await;

        assert!(matches!(outcome, Outcome::Saved { scan_failures: 0, .. }));
        assert!(console.contains("Folder structure saved to"));

        let value = fixture.read_output();
        assert_eq!(value["name"], "root");
        assert_eq!(value["type"], "directory");
        assert_eq!(value["path"], root_text.as_str());
        assert_eq!(value["contents"].as_array().unwrap().len(), 2);

        let a = child(&value, "a.txt");
        assert_eq!(a["type"], "file");
        assert_eq!(a["path"], format!("{root_text}/a.txt").as_str());
        assert!(a.get("contents").is_none());

        let b = child(&value, "b");
        assert_eq!(b["type"], "directory");
        assert_eq!(b["path"], format!("{root_text}/b").as_str());
        let c = child(b, "c.txt");
        assert_eq!(c["type"], "file");
        assert_eq!(c["path"], format!("{root_text}/b/c.txt").as_str());
    }

    #[compio::test]
    async fn root_is_prompted_for_when_not_given() {
        let fixture = Fixture::new();
        fixture.build_sample();
        let typed = format!("{}\n", fixture.root().display());

        let (outcome, console) = run(fixture.config(None), &typed).await;

        assert!(console.starts_with("Enter the folder path to scan: "));
        assert!(matches!(outcome, Outcome::Saved { .. }));
        assert!(fixture.output().exists());
    }

    #[compio::test]
    async fn written_file_round_trips_to_the_scanned_tree() {
        let fixture = Fixture::new();
        fixture.build_sample();
        fs::create_dir_all(fixture.root().join("b").join("d").join("e")).unwrap();

        run(fixture.config(Some(fixture.root())), "").await;

        let parsed: Node =
            Node::from_json_slice(&fs::read(fixture.output()).unwrap()).unwrap();
        let rescanned = TreeBuilder::new().scan(&fixture.root()).root;
        assert_eq!(parsed, rescanned);
        assert_eq!(parsed.kind(), NodeKind::Directory);
        assert_eq!(parsed.depth(), 3);
    }

    #[compio::test]
    async fn missing_root_writes_nothing_and_keeps_existing_output() {
        let fixture = Fixture::new();
        fs::write(fixture.output(), "previous run").unwrap();
        let missing = fixture.temp_dir.path().join("nope");

        let (outcome, console) = run(fixture.config(Some(missing.clone())), "").await;

        assert_eq!(outcome, Outcome::MissingRoot { root: missing });
        assert!(console.contains("The specified folder does not exist!"));
        assert_eq!(fs::read_to_string(fixture.output()).unwrap(), "previous run");
    }

    #[compio::test]
    async fn empty_prompt_answer_is_a_missing_root() {
        let fixture = Fixture::new();

        let (outcome, _) = run(fixture.config(None), "\n").await;

        assert_eq!(
            outcome,
            Outcome::MissingRoot {
                root: PathBuf::new()
            }
        );
        assert!(!fixture.output().exists());
    }

    #[compio::test]
    async fn unwritable_output_is_reported_not_raised() {
        let fixture = Fixture::new();
        fixture.build_sample();
        let mut config = fixture.config(Some(fixture.root()));
        config.output = Some(fixture.temp_dir.path().join("missing").join("out.json"));

        let (outcome, console) = run(config, "").await;

        assert!(matches!(outcome, Outcome::SaveFailed { .. }));
        assert!(console.contains("Error saving JSON file:"));
    }

    #[compio::test]
    async fn settings_file_supplies_output_and_depth() {
        let fixture = Fixture::new();
        fixture.build_sample();
        let elsewhere = fixture.temp_dir.path().join("elsewhere.json");
        fs::write(
            fixture.settings_file(),
            format!("output: {}\nmax_depth: 1\n", elsewhere.display()),
        )
        .unwrap();
        let mut config = fixture.config(Some(fixture.root()));
        config.output = None;

        let (outcome, console) = run(config, "").await;

        assert!(matches!(outcome, Outcome::Saved { scan_failures: 1, .. }));
        assert!(console.contains("Depth limit reached at"));
        let value: Value = serde_json::from_slice(&fs::read(&elsewhere).unwrap()).unwrap();
        assert_eq!(child(&value, "b")["contents"], Value::Array(Vec::new()));
    }

    #[compio::test]
    async fn broken_settings_file_is_an_error() {
        let fixture = Fixture::new();
        fs::write(fixture.settings_file(), "- not\n- a map\n").unwrap();
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();

        let result = Application::run_with(
            fixture.config(Some(fixture.root())),
            &mut input,
            &mut output,
        )
        .await;

        assert!(matches!(result, Err(ApplicationError::SettingsError { .. })));
    }

    /// Console that refuses any write containing `rejected`.
    struct RejectingConsole {
        rejected: &'static str,
        accepted: Vec<u8>,
    }

    impl Write for RejectingConsole {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(buf).contains(self.rejected) {
                return Err(io::Error::other("console closed"));
            }
            self.accepted.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[compio::test]
    async fn broken_console_does_not_prevent_the_write() {
        let fixture = Fixture::new();
        fixture.build_sample();
        let mut config = fixture.config(Some(fixture.root()));
        config.max_depth = Some(1);
        let mut input = Cursor::new(Vec::new());
        let mut console = RejectingConsole {
            rejected: "Depth limit reached",
            accepted: Vec::new(),
        };

        let outcome = Application::run_with(config, &mut input, &mut console)
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Saved { scan_failures: 1, .. }));
        assert!(fixture.output().exists());
        let printed = String::from_utf8(console.accepted).unwrap();
        assert!(printed.contains("Folder structure saved to"));
    }

    #[cfg(unix)]
    #[compio::test]
    async fn unreadable_subdirectory_still_produces_output() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = Fixture::new();
        fixture.build_sample();
        let locked = fixture.root().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Permission bits are not enforced for privileged users.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let (outcome, console) = run(fixture.config(Some(fixture.root())), "").await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(outcome, Outcome::Saved { scan_failures: 1, .. }));
        assert!(console.contains("Permission denied accessing"));
        let value = fixture.read_output();
        let locked_value = child(&value, "locked");
        assert_eq!(locked_value["type"], "directory");
        assert_eq!(locked_value["contents"], Value::Array(Vec::new()));
        assert_eq!(child(&value, "b")["contents"].as_array().unwrap().len(), 1);
    }
}
