use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::BestEffortPathExt;

pub const SETTINGS_FILE_NAME: &str = "folder-scan.yaml";

const OUTPUT_KEY: &str = "output";
const MAX_DEPTH_KEY: &str = "max_depth";
const INDENT_KEY: &str = "indent";
const KNOWN_KEYS: [&str; 3] = [OUTPUT_KEY, MAX_DEPTH_KEY, INDENT_KEY];

/// Optional settings from `folder-scan.yaml`. Every key may be omitted; command
/// line flags take precedence over whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub output: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub indent: Option<usize>,
}

impl Settings {
    /// Reads `folder-scan.yaml` from the working directory. A missing file
    /// yields the defaults.
    pub async fn read_default() -> Result<Self, SettingsError> {
        let path = Path::new(SETTINGS_FILE_NAME);
        if !path.exists() {
            info!(
                "No settings file at {}, using defaults",
                path.best_effort_path_display()
            );
            return Ok(Self::default());
        }
        Self::from_path(path).await
    }

    pub async fn from_path(path: &Path) -> Result<Self, SettingsError> {
        debug!("Reading settings file: {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        let settings = Self::try_from(contents.as_str())?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    fn parse_mapping(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, SettingsError> {
        for key in top_level.keys() {
            let known = match key {
                Yaml::Value(Scalar::String(name)) => {
                    let name: &str = name;
                    KNOWN_KEYS.contains(&name)
                }
                _ => false,
            };
            if !known {
                debug!("Ignoring unknown settings key: {:?}", key);
            }
        }

        Ok(Settings {
            output: Self::string_value(top_level, OUTPUT_KEY)?.map(PathBuf::from),
            max_depth: Self::count_value(top_level, MAX_DEPTH_KEY)?,
            indent: Self::count_value(top_level, INDENT_KEY)?,
        })
    }

    fn lookup<'a, 'input>(
        top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        key: &'static str,
    ) -> Option<&'a Yaml<'input>> {
        top_level
            .get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
            .filter(|value| !matches!(value, Yaml::Value(Scalar::Null)))
    }

    fn string_value(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<String>, SettingsError> {
        match Self::lookup(top_level, key) {
            None => Ok(None),
            Some(Yaml::Value(Scalar::String(value))) => Ok(Some(value.to_string())),
            Some(_) => InvalidValueSnafu {
                key,
                expected: "a string",
            }
            .fail(),
        }
    }

    fn count_value(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<usize>, SettingsError> {
        match Self::lookup(top_level, key) {
            None => Ok(None),
            Some(Yaml::Value(Scalar::Integer(value))) => usize::try_from(*value)
                .map(Some)
                .map_err(|_| SettingsError::InvalidValue {
                    key,
                    expected: "a non-negative integer",
                }),
            Some(_) => InvalidValueSnafu {
                key,
                expected: "a non-negative integer",
            }
            .fail(),
        }
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Settings::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        Self::parse_mapping(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: io::Error,
    },
    #[snafu(display("Settings file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: FromUtf8Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Setting '{}' should be {}", key, expected))]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },
}
